use crate::dbc::core::strings::record_body;
use crate::dbc::types::{errors::RecordError, state::ParseState};
use crate::kcd::types::node::Node;

/// Decode a `BU_` line.
/// Format: `BU_: <node> <node> ...` (the colon may be detached or absent).
pub(crate) fn decode(state: &mut ParseState, text: &str) -> Result<(), RecordError> {
    let body: &str = record_body(text, "BU_");
    let body: &str = body.trim_start_matches(':');

    for name in body.split_ascii_whitespace() {
        state.network.add_node(Node::new(name));
        state.nodes.push(name.to_string());
    }
    Ok(())
}
