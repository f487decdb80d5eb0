use crate::dbc::core::strings::{next_token, quoted_text, record_body};
use crate::dbc::types::{
    errors::RecordError,
    pending::{MessageComment, MessageRef},
    state::ParseState,
};

/// Decode a `CM_ BO_` comment.
/// Format: `CM_ BO_ <msg_id> "<text>";`
pub(crate) fn decode(state: &mut ParseState, text: &str) -> Result<(), RecordError> {
    let body: &str = record_body(text, "CM_");
    let rest: &str = body.trim_start().strip_prefix("BO_").unwrap_or(body);

    let (id_str, rest) = next_token(rest).ok_or(RecordError::MissingField { field: "message id" })?;
    let message: MessageRef = MessageRef::from_raw(id_str)?;
    let comment: String = quoted_text(rest).ok_or(RecordError::MissingField { field: "comment" })?;

    if message.is_orphan_container() {
        return Ok(());
    }
    let line: usize = state.line;
    state.pending.message_comments.push(MessageComment {
        message,
        text: comment,
        line,
    });
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dbc::types::options::ParseOptions;

    #[test]
    fn test_decode_message_comment() {
        let mut state = ParseState::new("a.dbc", ParseOptions::default());
        decode(&mut state, "CM_ BO_ 708 \"Door lock status\";").unwrap();
        let comment = &state.pending.message_comments[0];
        assert_eq!(comment.message, MessageRef { id: 708, extended: false });
        assert_eq!(comment.text, "Door lock status");

        assert!(decode(&mut state, "CM_ BO_ 708 no quotes;").is_err());
    }
}
