use crate::dbc::core::strings::{record_body, split_fields, un_quote};
use crate::dbc::types::{
    attributes::{Attribute, AttributeDefinition, AttributeRef, AttributeValue},
    errors::RecordError,
    pending::{MessageRef, PendingAttribute},
    state::ParseState,
};

/// Decode a `BA_` line.
/// Expected formats:
/// BA_ "DBName" "Powertrain";
/// BA_ "NmAddress" BU_ Gateway 12;
/// BA_ "GenMsgCycleTime" BO_ 2527679645 100;
/// BA_ "GenSigStartValue" SG_ 2527679645 Engine_Speed 0;
///
/// The instance is applied by the resolution pass.
pub(crate) fn decode(state: &mut ParseState, text: &str) -> Result<(), RecordError> {
    let relation: bool = text.trim_start().starts_with("BA_REL_");
    let keyword: &str = if relation { "BA_REL_" } else { "BA_" };
    let fields: Vec<String> = split_fields(record_body(text, keyword));

    let name: &str = fields
        .first()
        .map(|f| un_quote(f))
        .ok_or(RecordError::MissingField { field: "attribute name" })?;
    if relation {
        return Err(RecordError::RelationAttribute {
            name: name.to_string(),
        });
    }
    let definition: &AttributeDefinition =
        state
            .definitions
            .get(name)
            .ok_or_else(|| RecordError::UndefinedAttribute {
                name: name.to_string(),
            })?;

    let (target, raw): (AttributeRef, &String) = match fields.get(1).map(String::as_str) {
        Some("BU_") => (
            AttributeRef::Node {
                name: field(&fields, 2, "node name")?.clone(),
            },
            field(&fields, 3, "attribute value")?,
        ),
        Some("BO_") => (
            AttributeRef::Message(MessageRef::from_raw(field(&fields, 2, "message id")?)?),
            field(&fields, 3, "attribute value")?,
        ),
        Some("SG_") => (
            AttributeRef::Signal {
                message: MessageRef::from_raw(field(&fields, 2, "message id")?)?,
                signal: field(&fields, 3, "signal name")?.clone(),
            },
            field(&fields, 4, "attribute value")?,
        ),
        _ => (AttributeRef::Network, field(&fields, 1, "attribute value")?),
    };

    if target.target() != definition.target {
        return Err(RecordError::TargetMismatch {
            name: name.to_string(),
            expected: definition.target.as_str(),
        });
    }
    let value: AttributeValue = definition.parse_value(raw)?;

    if target.message().is_some_and(|m| m.is_orphan_container()) {
        return Ok(());
    }
    let line: usize = state.line;
    state.pending.attributes.push(PendingAttribute {
        attribute: Attribute {
            name: name.to_string(),
            target,
            value,
        },
        line,
    });
    Ok(())
}

fn field<'a>(fields: &'a [String], i: usize, what: &'static str) -> Result<&'a String, RecordError> {
    fields.get(i).ok_or(RecordError::MissingField { field: what })
}
