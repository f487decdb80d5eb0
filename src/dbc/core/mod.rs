pub(crate) mod attributes;
pub(crate) mod bo_;
pub(crate) mod bu_;
pub(crate) mod comments;
pub(crate) mod lines;
pub(crate) mod message_layout;
pub(crate) mod record;
pub(crate) mod resolve;
pub(crate) mod sg_;
pub(crate) mod sig_valtype_;
pub(crate) mod strings;
pub(crate) mod val_;
pub(crate) mod version;
