use chrono::Local;
use serde::Serialize;

/// Metadata of the generated network description.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize)]
pub struct Document {
    /// Source file name.
    pub name: String,
    /// `VERSION` string of the source.
    pub version: String,
    pub author: String,
    pub company: String,
    pub date: String,
    /// Free text body.
    pub content: String,
}

impl Document {
    /// Document describing a conversion of `name` performed now.
    pub fn converted(name: &str) -> Self {
        Document {
            name: name.to_string(),
            date: Local::now().format("%a %b %d %H:%M:%S %Y").to_string(),
            content: format!(
                "Converted with {} {}",
                env!("CARGO_PKG_NAME"),
                env!("CARGO_PKG_VERSION")
            ),
            ..Default::default()
        }
    }
}
