use crate::dbc::core::strings::record_body;
use crate::dbc::types::{
    errors::RecordError,
    pending::{MessageRef, SignalValueType},
    state::ParseState,
};
use crate::kcd::types::signal::ValueType;

/// Decode a `SIG_VALTYPE_` line.
/// Format: `SIG_VALTYPE_ <msg_id> <signal> : <0|1|2>;` (1 = IEEE float, 2 = IEEE double)
pub(crate) fn decode(state: &mut ParseState, text: &str) -> Result<(), RecordError> {
    let body: &str = record_body(text, "SIG_VALTYPE_");
    let mut parts = body
        .split(|c: char| c.is_ascii_whitespace() || c == ':')
        .filter(|p| !p.is_empty());

    let message: MessageRef = MessageRef::from_raw(
        parts
            .next()
            .ok_or(RecordError::MissingField { field: "message id" })?,
    )?;
    let signal: &str = parts
        .next()
        .ok_or(RecordError::MissingField { field: "signal name" })?;
    let value_type: ValueType = match parts.next() {
        Some("0") => return Ok(()),
        Some("1") => ValueType::Single,
        Some("2") => ValueType::Double,
        Some(other) => {
            return Err(RecordError::InvalidNumber {
                field: "signal value type",
                value: other.to_string(),
            });
        }
        None => {
            return Err(RecordError::MissingField {
                field: "signal value type",
            });
        }
    };

    if message.is_orphan_container() {
        return Ok(());
    }
    let line: usize = state.line;
    state.pending.value_types.push(SignalValueType {
        message,
        signal: signal.to_string(),
        value_type,
        line,
    });
    Ok(())
}
