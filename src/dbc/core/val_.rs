use crate::dbc::core::strings::{parse_int, record_body, split_fields, un_quote};
use crate::dbc::types::{
    errors::RecordError,
    pending::{LabelDescription, MessageRef},
    state::ParseState,
};
use crate::kcd::types::signal::Label;

/// Decode a `VAL_` line for a signal.
/// Format: `VAL_ <msg_id> <signal> <value> "<label>" <value> "<label>" ... ;`
///
/// Labels are attached by the resolution pass.
pub(crate) fn decode(state: &mut ParseState, text: &str) -> Result<(), RecordError> {
    let fields: Vec<String> = split_fields(record_body(text, "VAL_"));
    let mut it = fields.iter();

    let message: MessageRef = MessageRef::from_raw(
        it.next()
            .ok_or(RecordError::MissingField { field: "message id" })?,
    )?;
    let signal: &String = it
        .next()
        .ok_or(RecordError::MissingField { field: "signal name" })?;

    let mut labels: Vec<Label> = Vec::new();
    while let Some(value) = it.next() {
        let name: &String = it
            .next()
            .ok_or(RecordError::MissingField { field: "label" })?;
        labels.push(Label {
            value: parse_int("label value", value)?,
            name: un_quote(name).to_string(),
        });
    }

    if message.is_orphan_container() {
        return Ok(());
    }
    let line: usize = state.line;
    state.pending.labels.push(LabelDescription {
        message,
        signal: signal.clone(),
        labels,
        line,
    });
    Ok(())
}
