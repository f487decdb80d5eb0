use tracing::debug;

use crate::dbc::core::strings::{parse_field, parse_int, record_body, split_fields, un_quote};
use crate::dbc::types::{
    attributes::{AttributeDefinition, AttributeKind, AttributeTarget},
    diagnostics::DiagnosticKind,
    errors::RecordError,
    pending::PendingDefault,
    state::ParseState,
};

/// Decode a `BA_DEF_` line.
/// Expected formats:
/// BA_DEF_  "DBName" STRING;
/// BA_DEF_ BO_ "GenMsgCycleTime" INT 0 65535;
/// BA_DEF_ SG_ "GenSigStartValue" FLOAT 0 1E+100;
/// BA_DEF_ BO_ "VFrameFormat" ENUM "StandardCAN","ExtendedCAN","StandardCAN_FD","ExtendedCAN_FD";
///
/// Network definitions omit the object keyword, so every field shifts left by one.
pub(crate) fn decode(state: &mut ParseState, text: &str) -> Result<(), RecordError> {
    if text.trim_start().starts_with("BA_DEF_REL_") {
        let fields: Vec<String> = split_fields(record_body(text, "BA_DEF_REL_"));
        let name: &str = fields.iter().find(|f| f.starts_with('"')).map_or("", |f| un_quote(f));
        return Err(RecordError::RelationAttribute {
            name: name.to_string(),
        });
    }

    let fields: Vec<String> = split_fields(record_body(text, "BA_DEF_"));
    let first: &str = fields
        .first()
        .ok_or(RecordError::MissingField { field: "attribute name" })?;

    let (target, rest): (AttributeTarget, &[String]) = if first.starts_with('"') {
        (AttributeTarget::Network, &fields[..])
    } else {
        let target: AttributeTarget = AttributeTarget::from_keyword(first).ok_or_else(|| {
            RecordError::UnknownAttributeTarget {
                target: first.to_string(),
            }
        })?;
        (target, &fields[1..])
    };

    let name: &str = rest
        .first()
        .map(|f| un_quote(f))
        .ok_or(RecordError::MissingField { field: "attribute name" })?;
    let kind_token: &str = rest
        .get(1)
        .map(String::as_str)
        .ok_or(RecordError::MissingField { field: "attribute type" })?;
    let params: &[String] = &rest[2..];

    let kind: AttributeKind = match kind_token {
        "INT" => AttributeKind::Int {
            min: parse_int("attribute minimum", bound(params, 0)?)?,
            max: parse_int("attribute maximum", bound(params, 1)?)?,
            default: None,
        },
        "HEX" => AttributeKind::Hex {
            min: parse_int("attribute minimum", bound(params, 0)?)?,
            max: parse_int("attribute maximum", bound(params, 1)?)?,
            default: None,
        },
        "FLOAT" => AttributeKind::Float {
            min: parse_field("attribute minimum", bound(params, 0)?)?,
            max: parse_field("attribute maximum", bound(params, 1)?)?,
            default: None,
        },
        "STRING" => AttributeKind::String { default: None },
        "ENUM" => AttributeKind::Enum {
            values: params.iter().map(|v| un_quote(v).to_string()).collect(),
            default: None,
        },
        other => {
            return Err(RecordError::UnknownAttributeType {
                kind: other.to_string(),
            });
        }
    };

    let mut definition: AttributeDefinition = AttributeDefinition {
        name: name.to_string(),
        target,
        kind,
    };

    // defaults that arrived before their definition
    for PendingDefault { raw, line, .. } in state.pending.take_defaults(name) {
        if let Err(e) = definition.set_default(&raw) {
            state.warn_at(
                DiagnosticKind::MalformedRecord,
                line,
                format!("default of attribute '{name}': {e}"),
            );
        }
    }

    debug!(line = state.line, name, target = %target, "attribute definition");
    state.definitions.insert(name.to_string(), definition);
    Ok(())
}

fn bound(params: &[String], i: usize) -> Result<&str, RecordError> {
    params
        .get(i)
        .map(String::as_str)
        .ok_or(RecordError::MissingField { field: "attribute bound" })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dbc::types::{attributes::AttributeValue, options::ParseOptions};

    fn state() -> ParseState {
        ParseState::new("a.dbc", ParseOptions::default())
    }

    #[test]
    fn test_decode_targets_and_types() {
        let mut state = state();
        decode(&mut state, "BA_DEF_  \"DBName\" STRING ;").unwrap();
        decode(&mut state, "BA_DEF_ BO_ \"GenMsgCycleTime\" INT 0 65535;").unwrap();
        decode(&mut state, "BA_DEF_ BU_ \"NmAddress\" HEX 0 255;").unwrap();
        decode(&mut state, "BA_DEF_ SG_ \"GenSigStartValue\" FLOAT -1E+10 1E+10;").unwrap();
        decode(
            &mut state,
            "BA_DEF_ BO_ \"VFrameFormat\" ENUM \"StandardCAN\",\"ExtendedCAN\",\"StandardCAN_FD\";",
        )
        .unwrap();

        let defs = &state.definitions;
        assert_eq!(defs["DBName"].target, AttributeTarget::Network);
        assert_eq!(defs["DBName"].kind, AttributeKind::String { default: None });
        assert_eq!(defs["GenMsgCycleTime"].target, AttributeTarget::Message);
        assert_eq!(
            defs["GenMsgCycleTime"].kind,
            AttributeKind::Int { min: 0, max: 65535, default: None }
        );
        assert_eq!(defs["NmAddress"].target, AttributeTarget::Node);
        assert_eq!(defs["GenSigStartValue"].target, AttributeTarget::Signal);
        assert_eq!(
            defs["VFrameFormat"].kind,
            AttributeKind::Enum {
                values: vec!["StandardCAN".into(), "ExtendedCAN".into(), "StandardCAN_FD".into()],
                default: None
            }
        );
    }

    #[test]
    fn test_decode_errors() {
        let mut state = state();
        assert!(matches!(
            decode(&mut state, "BA_DEF_ BO_ \"X\" BOOL;"),
            Err(RecordError::UnknownAttributeType { .. })
        ));
        assert!(matches!(
            decode(&mut state, "BA_DEF_ EV_ \"X\" INT 0 1;"),
            Err(RecordError::UnknownAttributeTarget { .. })
        ));
        assert!(matches!(
            decode(&mut state, "BA_DEF_ BO_ \"X\" INT 0;"),
            Err(RecordError::MissingField { .. })
        ));
        assert_eq!(
            decode(&mut state, "BA_DEF_REL_ BU_SG_REL_ \"Rel\" INT 0 1;"),
            Err(RecordError::RelationAttribute { name: "Rel".into() })
        );
        assert!(state.definitions.is_empty());
    }

    #[test]
    fn test_pending_default_applied_on_definition() {
        let mut state = state();
        state.pending.defaults.push(PendingDefault {
            name: "GenMsgCycleTime".into(),
            raw: "100".into(),
            line: 3,
        });
        decode(&mut state, "BA_DEF_ BO_ \"GenMsgCycleTime\" INT 0 65535;").unwrap();
        assert!(state.pending.defaults.is_empty());
        assert_eq!(
            state.definitions["GenMsgCycleTime"].default_value(),
            Some(AttributeValue::Int(100))
        );
    }
}
