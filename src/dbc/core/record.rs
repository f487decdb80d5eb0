use crate::dbc::core::lines::KEYWORDS;

/// Kind of a logical record, decided from its leading tokens.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum RecordKind {
    MessageDefinition,
    ValueTable,
    ValueDescription,
    AttributeDefinition,
    AttributeDefault,
    AttributeInstance,
    SignalComment,
    MessageComment,
    Comment,
    MessageTransmitter,
    NodeDeclaration,
    NewSymbols,
    BitTiming,
    Version,
    EnvironmentVariable,
    EnvironmentVariableDescription,
    SignalValueType,
    /// Known DBC statement with no KCD counterpart.
    Unsupported,
}

fn is_number(token: &str) -> bool {
    !token.is_empty() && token.bytes().all(|b| b.is_ascii_digit())
}

/// Classifies a logical record. `None` means no rule matched.
///
/// Keywords are compared as whole tokens, so `CM_ SG_` never falls into the
/// generic comment rule and `VAL_TABLE_` never into `VAL_`.
pub(crate) fn classify(text: &str) -> Option<RecordKind> {
    let mut tokens = text
        .split(|c: char| c.is_ascii_whitespace() || c == ':')
        .filter(|t| !t.is_empty());
    let first: &str = tokens.next()?;
    let second: &str = tokens.next().unwrap_or("");

    let kind: RecordKind = match first {
        "BO_" if is_number(second) => RecordKind::MessageDefinition,
        "VAL_TABLE_" => RecordKind::ValueTable,
        "VAL_" if is_number(second) => RecordKind::ValueDescription,
        "VAL_" => RecordKind::EnvironmentVariableDescription,
        "BA_DEF_" | "BA_DEF_REL_" if text.contains('"') => RecordKind::AttributeDefinition,
        "BA_DEF_DEF_" | "BA_DEF_DEF_REL_" if second.starts_with('"') => {
            RecordKind::AttributeDefault
        }
        "BA_" | "BA_REL_" if second.starts_with('"') => RecordKind::AttributeInstance,
        "CM_" => match second {
            "SG_" => RecordKind::SignalComment,
            "BO_" => RecordKind::MessageComment,
            _ => RecordKind::Comment,
        },
        "BO_TX_BU_" => RecordKind::MessageTransmitter,
        "BU_" => RecordKind::NodeDeclaration,
        "NS_" => RecordKind::NewSymbols,
        "BS_" => RecordKind::BitTiming,
        "VERSION" => RecordKind::Version,
        "EV_" => RecordKind::EnvironmentVariable,
        "SIG_VALTYPE_" => RecordKind::SignalValueType,
        "BO_" | "BA_DEF_" | "BA_DEF_REL_" | "BA_DEF_DEF_" | "BA_DEF_DEF_REL_" | "BA_"
        | "BA_REL_" => return None,
        other if KEYWORDS.contains(&other) => RecordKind::Unsupported,
        _ => return None,
    };
    Some(kind)
}
