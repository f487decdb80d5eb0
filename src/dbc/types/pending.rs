//! Records that reference messages or signals and are resolved after the whole file is read.

use serde::Serialize;

use crate::dbc::types::{attributes::Attribute, errors::RecordError};
use crate::kcd::types::signal::{Label, ValueType};

/// Mask of the arbitration id inside a raw DBC message id.
pub const CAN_ID_MASK: u64 = 0x1FFF_FFFF;
/// Bit 31 of a raw DBC message id flags the extended format.
pub const EXTENDED_FLAG: u64 = 1 << 31;

/// Lookup key of a message: arbitration id plus format.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
pub struct MessageRef {
    pub id: u32,
    pub extended: bool,
}

impl MessageRef {
    /// Decodes a raw DBC message id (`2566861823` is extended id `0x18FFFFFF`).
    pub fn from_raw(raw: &str) -> Result<Self, RecordError> {
        let value: u64 = raw
            .trim()
            .parse::<u64>()
            .map_err(|_| RecordError::InvalidNumber {
                field: "message id",
                value: raw.to_string(),
            })?;
        Ok(MessageRef {
            id: (value & CAN_ID_MASK) as u32,
            extended: value & EXTENDED_FLAG != 0,
        })
    }

    /// `VECTOR__INDEPENDENT_SIG_MSG` style container of signals without a message.
    pub fn is_orphan_container(&self) -> bool {
        self.id == 0 && self.extended
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct LabelDescription {
    pub message: MessageRef,
    pub signal: String,
    pub labels: Vec<Label>,
    pub line: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SignalComment {
    pub message: MessageRef,
    pub signal: String,
    pub text: String,
    pub line: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct MessageComment {
    pub message: MessageRef,
    pub text: String,
    pub line: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct SignalValueType {
    pub message: MessageRef,
    pub signal: String,
    pub value_type: ValueType,
    pub line: usize,
}

#[derive(Clone, Debug, PartialEq)]
pub struct PendingAttribute {
    pub attribute: Attribute,
    pub line: usize,
}

/// `BA_DEF_DEF_` seen before the matching `BA_DEF_`.
#[derive(Clone, Debug, PartialEq)]
pub struct PendingDefault {
    pub name: String,
    pub raw: String,
    pub line: usize,
}

/// Everything waiting for the resolution pass, in encounter order.
#[derive(Clone, Debug, Default)]
pub struct PendingPool {
    pub labels: Vec<LabelDescription>,
    pub signal_comments: Vec<SignalComment>,
    pub message_comments: Vec<MessageComment>,
    pub value_types: Vec<SignalValueType>,
    pub attributes: Vec<PendingAttribute>,
    pub defaults: Vec<PendingDefault>,
}

impl PendingPool {
    /// Removes and returns the held defaults of attribute `name`.
    pub fn take_defaults(&mut self, name: &str) -> Vec<PendingDefault> {
        let (matching, rest): (Vec<PendingDefault>, Vec<PendingDefault>) =
            std::mem::take(&mut self.defaults)
                .into_iter()
                .partition(|d| d.name == name);
        self.defaults = rest;
        matching
    }
}
