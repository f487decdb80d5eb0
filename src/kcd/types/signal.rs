use serde::Serialize;

/// Bit numbering convention of a signal inside the payload.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Endianness {
    /// Intel byte order (DBC flag `1`).
    #[default]
    Little,
    /// Motorola byte order (DBC flag `0`).
    Big,
}

impl Endianness {
    /// Maps the DBC byte-order flag (`0` = Motorola, `1` = Intel).
    pub fn from_dbc_flag(flag: &str) -> Option<Self> {
        match flag {
            "0" => Some(Endianness::Big),
            "1" => Some(Endianness::Little),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Endianness::Little => "little",
            Endianness::Big => "big",
        }
    }
}

/// Numeric interpretation of the raw signal bits.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueType {
    #[default]
    Unsigned,
    Signed,
    /// IEEE 754 single precision.
    Single,
    /// IEEE 754 double precision.
    Double,
}

impl ValueType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ValueType::Unsigned => "unsigned",
            ValueType::Signed => "signed",
            ValueType::Single => "single",
            ValueType::Double => "double",
        }
    }
}

/// Physical conversion of a signal.
///
/// Every field is optional: `None` means the KCD default
/// (slope 1, intercept 0, min 0, max 1, no unit, unsigned).
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Value {
    pub value_type: ValueType,
    pub slope: Option<f64>,
    pub intercept: Option<f64>,
    pub unit: Option<String>,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Value {
    /// Builds the value part of a DBC signal, keeping only non-default fields.
    ///
    /// Returns `None` when every field equals its default, so that nothing is persisted.
    pub fn from_dbc(signed: bool, slope: f64, intercept: f64, min: f64, max: f64, unit: &str) -> Option<Self> {
        let value = Value {
            value_type: if signed {
                ValueType::Signed
            } else {
                ValueType::Unsigned
            },
            slope: (slope != 1.0).then_some(slope),
            intercept: (intercept != 0.0).then_some(intercept),
            unit: (!unit.is_empty()).then(|| unit.to_string()),
            min: (min != 0.0).then_some(min),
            max: (max != 1.0).then_some(max),
        };
        (!value.is_default()).then_some(value)
    }

    pub fn is_default(&self) -> bool {
        self.value_type == ValueType::Unsigned
            && self.slope.is_none()
            && self.intercept.is_none()
            && self.unit.is_none()
            && self.min.is_none()
            && self.max.is_none()
    }
}

/// One entry of a value table.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct Label {
    pub value: i64,
    pub name: String,
}

/// Value-to-name map of a signal, ordered by value.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct LabelSet {
    labels: Vec<Label>,
}

impl LabelSet {
    /// Collects labels sorted by value. On duplicate values the first label wins.
    pub fn from_labels<I: IntoIterator<Item = Label>>(labels: I) -> Self {
        let mut out: Vec<Label> = Vec::new();
        for label in labels {
            if let Err(pos) = out.binary_search_by_key(&label.value, |l| l.value) {
                out.insert(pos, label);
            }
        }
        LabelSet { labels: out }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Label> {
        self.labels.iter()
    }

    pub fn get(&self, value: i64) -> Option<&str> {
        self.labels
            .binary_search_by_key(&value, |l| l.value)
            .ok()
            .map(|i| self.labels[i].name.as_str())
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }
}

/// A signal of a CAN message.
///
/// `offset` is always the canonical position of the least significant bit,
/// counted from bit 0 of byte 0, whatever the source byte order was.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Signal {
    pub name: String,
    pub offset: u16,
    pub length: u16,
    pub endianness: Endianness,
    pub value: Option<Value>,
    /// Receiving nodes, by node id.
    pub consumers: Vec<String>,
    pub labels: Option<LabelSet>,
    pub notes: Option<String>,
}

impl Signal {
    pub fn new(name: &str, offset: u16, length: u16, endianness: Endianness) -> Self {
        Signal {
            name: name.to_string(),
            offset,
            length,
            endianness,
            value: None,
            consumers: Vec::new(),
            labels: None,
            notes: None,
        }
    }

    /// Overrides the numeric interpretation, creating the value part if needed.
    pub fn set_value_type(&mut self, value_type: ValueType) {
        let value = self.value.get_or_insert_with(Value::default);
        value.value_type = value_type;
        if value.is_default() {
            self.value = None;
        }
    }
}

/// Signals that are valid while the multiplexor holds `count`.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct MuxGroup {
    pub count: u64,
    pub signals: Vec<Signal>,
}

/// A multiplexor signal together with the groups it selects.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Multiplex {
    #[serde(flatten)]
    pub signal: Signal,
    pub groups: Vec<MuxGroup>,
}

impl Multiplex {
    pub fn new(signal: Signal) -> Self {
        Multiplex {
            signal,
            groups: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_value_defaults_are_omitted() {
        assert_eq!(Value::from_dbc(false, 1.0, 0.0, 0.0, 1.0, ""), None);
    }

    #[test]
    fn test_value_keeps_only_changed_fields() {
        let value = Value::from_dbc(false, 0.5, 0.0, 0.0, 1.0, "").unwrap();
        assert_eq!(value.slope, Some(0.5));
        assert_eq!(value.intercept, None);
        assert_eq!(value.min, None);
        assert_eq!(value.max, None);
        assert_eq!(value.unit, None);
        assert_eq!(value.value_type, ValueType::Unsigned);

        let value = Value::from_dbc(false, 1.0, 0.0, 0.0, 255.0, "km/h").unwrap();
        assert_eq!(value.max, Some(255.0));
        assert_eq!(value.unit.as_deref(), Some("km/h"));
        assert_eq!(value.slope, None);

        let value = Value::from_dbc(true, 1.0, 0.0, 0.0, 1.0, "").unwrap();
        assert_eq!(value.value_type, ValueType::Signed);
        assert!(!value.is_default());
    }

    #[test]
    fn test_label_set_sorted_first_wins() {
        let set = LabelSet::from_labels([
            Label { value: 2, name: "two".into() },
            Label { value: 0, name: "zero".into() },
            Label { value: 2, name: "again".into() },
        ]);
        let values: Vec<i64> = set.iter().map(|l| l.value).collect();
        assert_eq!(values, vec![0, 2]);
        assert_eq!(set.get(2), Some("two"));
        assert_eq!(set.get(5), None);
    }

    #[test]
    fn test_set_value_type() {
        let mut signal = Signal::new("Speed", 0, 32, Endianness::Little);
        signal.set_value_type(ValueType::Single);
        assert_eq!(signal.value.as_ref().unwrap().value_type, ValueType::Single);
        signal.set_value_type(ValueType::Unsigned);
        assert_eq!(signal.value, None);
    }
}
