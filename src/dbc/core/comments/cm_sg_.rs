use crate::dbc::core::strings::{next_token, quoted_text, record_body};
use crate::dbc::types::{
    errors::RecordError,
    pending::{MessageRef, SignalComment},
    state::ParseState,
};

/// Decode a `CM_ SG_` comment (may span multiple lines).
/// Format: `CM_ SG_ <msg_id> <signal> "<text>";`
pub(crate) fn decode(state: &mut ParseState, text: &str) -> Result<(), RecordError> {
    let body: &str = record_body(text, "CM_");
    let rest: &str = body.trim_start().strip_prefix("SG_").unwrap_or(body);

    let (id_str, rest) = next_token(rest).ok_or(RecordError::MissingField { field: "message id" })?;
    let message: MessageRef = MessageRef::from_raw(id_str)?;
    let (signal, rest) = next_token(rest).ok_or(RecordError::MissingField { field: "signal name" })?;
    let comment: String = quoted_text(rest).ok_or(RecordError::MissingField { field: "comment" })?;

    if message.is_orphan_container() {
        return Ok(());
    }
    let line: usize = state.line;
    state.pending.signal_comments.push(SignalComment {
        message,
        signal: signal.to_string(),
        text: comment,
        line,
    });
    Ok(())
}
