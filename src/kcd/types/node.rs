use serde::Serialize;

/// Network node (ECU). DBC has no separate node id, so `id` and `name` are identical.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Node {
    pub id: String,
    pub name: String,
}

impl Node {
    pub fn new(name: &str) -> Self {
        Node {
            id: name.to_string(),
            name: name.to_string(),
        }
    }
}
