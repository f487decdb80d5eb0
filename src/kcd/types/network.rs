//! Network model (SlotMap-backed).
//!
//! A [`Network`] is what the DBC decoder hands to the KCD writer: document metadata,
//! the node list and a single [`Bus`] carrying the messages.
//! Messages live in a SlotMap arena with stable [`MessageKey`]s; iteration follows
//! `messages_order` (declaration order) and lookups by (id, format) are O(1).

use serde::ser::{Serialize, SerializeStruct, Serializer};
use slotmap::{SlotMap, new_key_type};
use std::collections::HashMap;

use crate::kcd::types::{
    document::Document,
    message::{IdFormat, Message},
    node::Node,
};

// --- Stable keys (SlotMap) ---
new_key_type! { pub struct MessageKey; }

/// Bus name used when the DBC does not carry a `DBName` attribute.
pub const DEFAULT_BUS_NAME: &str = "Private";

/// In-memory CAN network description.
#[derive(Clone, Debug, Default, serde::Serialize)]
pub struct Network {
    pub document: Document,
    pub nodes: Vec<Node>,
    pub bus: Bus,
}

impl Network {
    pub fn add_node(&mut self, node: Node) {
        self.nodes.push(node);
    }

    pub fn get_node_by_name(&self, name: &str) -> Option<&Node> {
        self.nodes.iter().find(|n| n.name == name)
    }
}

/// The bus carrying all messages of the network.
#[derive(Clone, Debug)]
pub struct Bus {
    pub name: String,
    /// Bit rate in bit/s, when known.
    pub baudrate: Option<u32>,

    // --- Main storage (stable-key map) ---
    pub messages: SlotMap<MessageKey, Message>,
    // --- Order "view" ---
    pub messages_order: Vec<MessageKey>,
    // --- Lookup ---
    pub(crate) msg_key_by_id: HashMap<(u32, IdFormat), MessageKey>,
}

impl Default for Bus {
    fn default() -> Self {
        Bus {
            name: DEFAULT_BUS_NAME.to_string(),
            baudrate: None,
            messages: SlotMap::with_key(),
            messages_order: Vec::new(),
            msg_key_by_id: HashMap::new(),
        }
    }
}

impl Bus {
    /// Inserts a message unless one with the same (id, format) already exists.
    ///
    /// Returns the new key, or `None` for a duplicate (the message is dropped).
    pub fn add_message(&mut self, message: Message) -> Option<MessageKey> {
        let lookup = (message.id, message.format);
        if self.msg_key_by_id.contains_key(&lookup) {
            return None;
        }
        let key: MessageKey = self.messages.insert(message);
        self.messages_order.push(key);
        self.msg_key_by_id.insert(lookup, key);
        Some(key)
    }

    pub fn get_message_key(&self, id: u32, extended: bool) -> Option<MessageKey> {
        self.msg_key_by_id
            .get(&(id, IdFormat::from_extended(extended)))
            .copied()
    }

    /// Returns a `&Message` given the arbitration id and the frame format.
    pub fn get_message(&self, id: u32, extended: bool) -> Option<&Message> {
        let key: MessageKey = self.get_message_key(id, extended)?;
        self.messages.get(key)
    }

    /// Returns a `&mut Message` given the arbitration id and the frame format.
    pub fn get_message_mut(&mut self, id: u32, extended: bool) -> Option<&mut Message> {
        let key: MessageKey = self.get_message_key(id, extended)?;
        self.messages.get_mut(key)
    }

    pub fn get_message_by_name(&self, name: &str) -> Option<&Message> {
        self.iter_messages().find(|m| m.name == name)
    }

    /// Iterates messages in declaration order.
    pub fn iter_messages(&self) -> impl Iterator<Item = &Message> {
        self.messages_order
            .iter()
            .filter_map(|&key| self.messages.get(key))
    }

    /// Mutable access to every message, in arena order.
    pub fn iter_messages_mut(&mut self) -> impl Iterator<Item = &mut Message> {
        self.messages.values_mut()
    }

    pub fn message_count(&self) -> usize {
        self.messages_order.len()
    }
}

impl Serialize for Bus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let messages: Vec<&Message> = self.iter_messages().collect();
        let mut state = serializer.serialize_struct("Bus", 3)?;
        state.serialize_field("name", &self.name)?;
        state.serialize_field("baudrate", &self.baudrate)?;
        state.serialize_field("messages", &messages)?;
        state.end()
    }
}
