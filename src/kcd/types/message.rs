use serde::Serialize;
use std::fmt;

use crate::kcd::types::signal::{Multiplex, Signal};

/// Arbitration id format. Standard and extended ids are separate numbering spaces.
#[derive(Default, Copy, Clone, PartialEq, Eq, Hash, Debug, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum IdFormat {
    #[default]
    Standard,
    Extended,
}

impl IdFormat {
    pub fn from_extended(extended: bool) -> Self {
        if extended {
            IdFormat::Extended
        } else {
            IdFormat::Standard
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            IdFormat::Standard => "standard",
            IdFormat::Extended => "extended",
        }
    }
}

impl fmt::Display for IdFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// CAN message of the network.
///
/// Identity is the pair (`id`, `format`). The optional flags mirror KCD:
/// `None` means "not stated", `Some(false)` an explicit negative.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct Message {
    /// Arbitration id (29 bits at most).
    pub id: u32,
    pub format: IdFormat,
    pub name: String,
    /// Payload length in bytes.
    pub length: u16,
    /// Producing node id.
    pub producer: Option<String>,
    /// Cycle time in milliseconds.
    pub interval: Option<u32>,
    pub fd: Option<bool>,
    pub bitrate_switch: Option<bool>,
    pub notes: Option<String>,
    pub signals: Vec<Signal>,
    pub multiplexes: Vec<Multiplex>,
}

impl Message {
    pub fn is_extended(&self) -> bool {
        self.format == IdFormat::Extended
    }

    /// Uppercase hexadecimal id with `0x` prefix, as written to KCD.
    pub fn id_hex(&self) -> String {
        format!("0x{:X}", self.id)
    }

    /// Iterates every signal of the message: plain signals, multiplexors and mux-group members.
    pub fn iter_signals(&self) -> impl Iterator<Item = &Signal> {
        self.signals
            .iter()
            .chain(self.multiplexes.iter().map(|m| &m.signal))
            .chain(
                self.multiplexes
                    .iter()
                    .flat_map(|m| m.groups.iter())
                    .flat_map(|g| g.signals.iter()),
            )
    }

    pub fn find_signal(&self, name: &str) -> Option<&Signal> {
        self.iter_signals().find(|s| s.name == name)
    }

    /// Looks a signal up by name among plain signals, multiplexors and mux groups.
    pub fn find_signal_mut(&mut self, name: &str) -> Option<&mut Signal> {
        if let Some(i) = self.signals.iter().position(|s| s.name == name) {
            return self.signals.get_mut(i);
        }
        if let Some(i) = self.multiplexes.iter().position(|m| m.signal.name == name) {
            return self.multiplexes.get_mut(i).map(|m| &mut m.signal);
        }
        self.multiplexes
            .iter_mut()
            .flat_map(|m| m.groups.iter_mut())
            .flat_map(|g| g.signals.iter_mut())
            .find(|s| s.name == name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::kcd::types::signal::{Endianness, MuxGroup};

    fn muxed_message() -> Message {
        let mut mux = Multiplex::new(Signal::new("Mode", 0, 2, Endianness::Little));
        mux.groups.push(MuxGroup {
            count: 1,
            signals: vec![Signal::new("Temp", 8, 8, Endianness::Little)],
        });
        Message {
            id: 0x1AB,
            name: "Status".into(),
            length: 8,
            signals: vec![Signal::new("Alive", 63, 1, Endianness::Little)],
            multiplexes: vec![mux],
            ..Default::default()
        }
    }

    #[test]
    fn test_id_hex() {
        assert_eq!(muxed_message().id_hex(), "0x1AB");
    }

    #[test]
    fn test_find_signal_everywhere() {
        let mut msg = muxed_message();
        assert!(msg.find_signal("Alive").is_some());
        assert!(msg.find_signal("Mode").is_some());
        assert!(msg.find_signal("Temp").is_some());
        assert!(msg.find_signal("Nope").is_none());

        msg.find_signal_mut("Temp").unwrap().notes = Some("deg C".into());
        assert_eq!(msg.find_signal("Temp").unwrap().notes.as_deref(), Some("deg C"));
        assert_eq!(msg.iter_signals().count(), 3);
    }
}
