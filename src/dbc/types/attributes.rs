use serde::Serialize;
use std::fmt;

use crate::dbc::core::strings::{parse_field, parse_int, un_quote};
use crate::dbc::types::{errors::RecordError, pending::MessageRef};

/// Object class an attribute definition applies to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub enum AttributeTarget {
    Network,
    Node,
    Message,
    Signal,
}

impl AttributeTarget {
    /// Maps the object keyword of `BA_DEF_` / `BA_`.
    pub fn from_keyword(keyword: &str) -> Option<Self> {
        match keyword {
            "BU_" => Some(AttributeTarget::Node),
            "BO_" => Some(AttributeTarget::Message),
            "SG_" => Some(AttributeTarget::Signal),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeTarget::Network => "network",
            AttributeTarget::Node => "node",
            AttributeTarget::Message => "message",
            AttributeTarget::Signal => "signal",
        }
    }
}

impl fmt::Display for AttributeTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Value type of a definition, with its bounds and its default.
///
/// Enum defaults and values are stored as indices into `values`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum AttributeKind {
    Int {
        min: i64,
        max: i64,
        default: Option<i64>,
    },
    Hex {
        min: i64,
        max: i64,
        default: Option<i64>,
    },
    Float {
        min: f64,
        max: f64,
        default: Option<f64>,
    },
    String {
        default: Option<String>,
    },
    Enum {
        values: Vec<String>,
        default: Option<usize>,
    },
}

/// A typed attribute value.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub enum AttributeValue {
    Int(i64),
    Hex(i64),
    Float(f64),
    String(String),
    Enum { index: usize, label: String },
}

impl AttributeValue {
    /// Integer view of numeric and enum values. Floats are rounded.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            AttributeValue::Int(v) | AttributeValue::Hex(v) => Some(*v),
            AttributeValue::Float(v) => Some(v.round() as i64),
            AttributeValue::Enum { index, .. } => i64::try_from(*index).ok(),
            AttributeValue::String(_) => None,
        }
    }

    /// Text view of string and enum values.
    pub fn as_label(&self) -> Option<&str> {
        match self {
            AttributeValue::String(s) => Some(s),
            AttributeValue::Enum { label, .. } => Some(label),
            _ => None,
        }
    }
}

/// A `BA_DEF_` declaration, completed by its `BA_DEF_DEF_` default.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct AttributeDefinition {
    pub name: String,
    pub target: AttributeTarget,
    pub kind: AttributeKind,
}

impl AttributeDefinition {
    /// Parses a value literal according to the definition type.
    ///
    /// INT and HEX accept floating-point literals and round them. ENUM accepts either
    /// a label or an index.
    pub fn parse_value(&self, raw: &str) -> Result<AttributeValue, RecordError> {
        let raw: &str = un_quote(raw.trim());
        match &self.kind {
            AttributeKind::Int { .. } => Ok(AttributeValue::Int(parse_int("attribute value", raw)?)),
            AttributeKind::Hex { .. } => Ok(AttributeValue::Hex(parse_int("attribute value", raw)?)),
            AttributeKind::Float { .. } => {
                Ok(AttributeValue::Float(parse_field("attribute value", raw)?))
            }
            AttributeKind::String { .. } => Ok(AttributeValue::String(raw.to_string())),
            AttributeKind::Enum { values, .. } => {
                let index: usize = match values.iter().position(|v| v == raw) {
                    Some(i) => i,
                    None => raw
                        .parse::<usize>()
                        .ok()
                        .filter(|i| *i < values.len())
                        .ok_or_else(|| RecordError::InvalidEnumValue {
                            name: self.name.clone(),
                            value: raw.to_string(),
                        })?,
                };
                Ok(AttributeValue::Enum {
                    index,
                    label: values[index].clone(),
                })
            }
        }
    }

    /// Stores a `BA_DEF_DEF_` literal as the default of this definition.
    pub fn set_default(&mut self, raw: &str) -> Result<(), RecordError> {
        let value: AttributeValue = self.parse_value(raw)?;
        match (&mut self.kind, value) {
            (AttributeKind::Int { default, .. }, AttributeValue::Int(v))
            | (AttributeKind::Hex { default, .. }, AttributeValue::Hex(v)) => *default = Some(v),
            (AttributeKind::Float { default, .. }, AttributeValue::Float(v)) => *default = Some(v),
            (AttributeKind::String { default }, AttributeValue::String(v)) => *default = Some(v),
            (AttributeKind::Enum { default, .. }, AttributeValue::Enum { index, .. }) => {
                *default = Some(index)
            }
            _ => {}
        }
        Ok(())
    }

    /// The default as a typed value, when one was declared.
    pub fn default_value(&self) -> Option<AttributeValue> {
        match &self.kind {
            AttributeKind::Int { default, .. } => default.map(AttributeValue::Int),
            AttributeKind::Hex { default, .. } => default.map(AttributeValue::Hex),
            AttributeKind::Float { default, .. } => default.map(AttributeValue::Float),
            AttributeKind::String { default } => default.clone().map(AttributeValue::String),
            AttributeKind::Enum { values, default } => default.and_then(|index| {
                values.get(index).map(|label| AttributeValue::Enum {
                    index,
                    label: label.clone(),
                })
            }),
        }
    }
}

/// The object an attribute instance is attached to.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub enum AttributeRef {
    Network,
    Node { name: String },
    Message(MessageRef),
    Signal { message: MessageRef, signal: String },
}

impl AttributeRef {
    pub fn target(&self) -> AttributeTarget {
        match self {
            AttributeRef::Network => AttributeTarget::Network,
            AttributeRef::Node { .. } => AttributeTarget::Node,
            AttributeRef::Message(_) => AttributeTarget::Message,
            AttributeRef::Signal { .. } => AttributeTarget::Signal,
        }
    }

    pub fn message(&self) -> Option<MessageRef> {
        match self {
            AttributeRef::Message(m) | AttributeRef::Signal { message: m, .. } => Some(*m),
            _ => None,
        }
    }
}

/// A `BA_` instance: a typed value bound to one definition and one object.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Attribute {
    pub name: String,
    pub target: AttributeRef,
    pub value: AttributeValue,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn enum_def() -> AttributeDefinition {
        AttributeDefinition {
            name: "VFrameFormat".into(),
            target: AttributeTarget::Message,
            kind: AttributeKind::Enum {
                values: vec!["StandardCAN".into(), "ExtendedCAN".into(), "StandardCAN_FD".into()],
                default: None,
            },
        }
    }

    #[test]
    fn test_enum_value_by_label_or_index() {
        let def = enum_def();
        assert_eq!(
            def.parse_value("\"StandardCAN_FD\"").unwrap(),
            AttributeValue::Enum {
                index: 2,
                label: "StandardCAN_FD".into()
            }
        );
        assert_eq!(def.parse_value("1").unwrap().as_label(), Some("ExtendedCAN"));
        assert!(matches!(
            def.parse_value("7"),
            Err(RecordError::InvalidEnumValue { .. })
        ));
    }

    #[test]
    fn test_int_default_rounded_from_float_literal() {
        let mut def = AttributeDefinition {
            name: "GenMsgCycleTime".into(),
            target: AttributeTarget::Message,
            kind: AttributeKind::Int {
                min: 0,
                max: 65535,
                default: None,
            },
        };
        def.set_default("99.6").unwrap();
        assert_eq!(def.default_value(), Some(AttributeValue::Int(100)));
        assert!(def.set_default("fast").is_err());
    }

    #[test]
    fn test_enum_default_by_label() {
        let mut def = enum_def();
        def.set_default("\"StandardCAN_FD\"").unwrap();
        assert_eq!(
            def.default_value().unwrap().as_label(),
            Some("StandardCAN_FD")
        );
    }
}
