use crate::dbc::core::strings::{record_body, un_quote};
use crate::dbc::types::{errors::RecordError, state::ParseState};

/// `VERSION "<text>"` fills the document version.
pub(crate) fn decode(state: &mut ParseState, text: &str) -> Result<(), RecordError> {
    let body: &str = record_body(text, "VERSION");
    state.network.document.version = un_quote(body).to_string();
    Ok(())
}
