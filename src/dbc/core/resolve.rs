//! Resolution pass: attaches pending labels, comments, value types and attributes
//! to the messages and signals built while reading.

use tracing::debug;

use crate::dbc::types::{
    attributes::{AttributeRef, AttributeTarget, AttributeValue},
    diagnostics::DiagnosticKind,
    pending::{MessageRef, PendingPool},
    state::ParseState,
};
use crate::kcd::types::{message::Message, signal::LabelSet, signal::Signal};

const CYCLE_TIME: &str = "GenMsgCycleTime";
const FRAME_FORMAT: &str = "VFrameFormat";
const BITRATE_SWITCH: &str = "CANFD_BRS";
const BUS_NAME: &str = "DBName";
const BAUDRATE: &str = "Baudrate";

fn is_fd(value: &AttributeValue) -> bool {
    value.as_label().is_some_and(|l| l.ends_with("_FD"))
}

fn is_brs(value: &AttributeValue) -> bool {
    match value {
        AttributeValue::Enum { label, .. } | AttributeValue::String(label) => label == "1",
        other => other.as_i64() == Some(1),
    }
}

fn find_message<'a>(state: &'a mut ParseState, message: MessageRef) -> Option<&'a mut Message> {
    state
        .network
        .bus
        .get_message_mut(message.id, message.extended)
}

fn find_signal<'a>(
    state: &'a mut ParseState,
    message: MessageRef,
    signal: &str,
) -> Option<&'a mut Signal> {
    find_message(state, message)?.find_signal_mut(signal)
}

fn describe(message: MessageRef) -> String {
    if message.extended {
        format!("extended message 0x{:X}", message.id)
    } else {
        format!("message 0x{:X}", message.id)
    }
}

/// Runs the whole pass. Called once, after the last record.
pub(crate) fn finalize(state: &mut ParseState) {
    let pending: PendingPool = std::mem::take(&mut state.pending);
    state.line = 0;

    for entry in pending.labels {
        match find_signal(state, entry.message, &entry.signal) {
            Some(signal) => signal.labels = Some(LabelSet::from_labels(entry.labels)),
            None => state.warn_at(
                DiagnosticKind::UnresolvedReference,
                entry.line,
                format!("labels for unknown signal '{}' of {}", entry.signal, describe(entry.message)),
            ),
        }
    }

    for entry in pending.signal_comments {
        match find_signal(state, entry.message, &entry.signal) {
            Some(signal) => signal.notes = Some(entry.text),
            None => state.warn_at(
                DiagnosticKind::UnresolvedReference,
                entry.line,
                format!("comment for unknown signal '{}' of {}", entry.signal, describe(entry.message)),
            ),
        }
    }

    for entry in pending.message_comments {
        match find_message(state, entry.message) {
            Some(message) => message.notes = Some(entry.text),
            None => state.warn_at(
                DiagnosticKind::UnresolvedReference,
                entry.line,
                format!("comment for unknown {}", describe(entry.message)),
            ),
        }
    }

    for entry in pending.value_types {
        match find_signal(state, entry.message, &entry.signal) {
            Some(signal) => signal.set_value_type(entry.value_type),
            None => state.warn_at(
                DiagnosticKind::UnresolvedReference,
                entry.line,
                format!("value type for unknown signal '{}' of {}", entry.signal, describe(entry.message)),
            ),
        }
    }

    // (a) declaration-level defaults of the FD flags
    let fd_default: bool = default_of(state, FRAME_FORMAT).is_some_and(|v| is_fd(&v));
    let brs_default: bool = default_of(state, BITRATE_SWITCH).is_some_and(|v| is_brs(&v));
    if fd_default || brs_default {
        for message in state.network.bus.iter_messages_mut() {
            if fd_default {
                message.fd = Some(true);
            }
            if brs_default {
                message.bitrate_switch = Some(true);
            }
        }
    }

    // (b) per-instance values
    for entry in pending.attributes {
        let attribute = entry.attribute;
        match &attribute.target {
            AttributeRef::Network => match attribute.name.as_str() {
                BUS_NAME => {
                    if let Some(name) = attribute.value.as_label()
                        && !name.is_empty()
                    {
                        state.network.bus.name = name.to_string();
                    }
                }
                BAUDRATE => {
                    state.network.bus.baudrate =
                        attribute.value.as_i64().and_then(|v| u32::try_from(v).ok());
                }
                _ => {}
            },
            AttributeRef::Message(message_ref) => {
                let Some(message) = find_message(state, *message_ref) else {
                    state.warn_at(
                        DiagnosticKind::UnresolvedReference,
                        entry.line,
                        format!("attribute '{}' for unknown {}", attribute.name, describe(*message_ref)),
                    );
                    continue;
                };
                match attribute.name.as_str() {
                    CYCLE_TIME => {
                        message.interval = attribute
                            .value
                            .as_i64()
                            .and_then(|v| u32::try_from(v).ok())
                            .filter(|v| *v != 0);
                    }
                    FRAME_FORMAT => message.fd = Some(is_fd(&attribute.value)),
                    BITRATE_SWITCH => message.bitrate_switch = Some(is_brs(&attribute.value)),
                    _ => {}
                }
            }
            AttributeRef::Signal { message, signal } => {
                if find_signal(state, *message, signal).is_none() {
                    state.warn_at(
                        DiagnosticKind::UnresolvedReference,
                        entry.line,
                        format!(
                            "attribute '{}' for unknown signal '{}' of {}",
                            attribute.name,
                            signal,
                            describe(*message)
                        ),
                    );
                }
            }
            AttributeRef::Node { name } => {
                if !state.nodes.iter().any(|n| n == name) {
                    state.warn_at(
                        DiagnosticKind::UnresolvedReference,
                        entry.line,
                        format!("attribute '{}' for unknown node '{}'", attribute.name, name),
                    );
                }
            }
        }
    }

    // (c) bit rate switching only exists on FD frames
    for message in state.network.bus.iter_messages_mut() {
        if message.fd != Some(true) {
            message.bitrate_switch = None;
        }
    }

    for default in pending.defaults {
        state.warn_at(
            DiagnosticKind::MissingAttributeDefinition,
            default.line,
            format!("default for undefined attribute '{}'", default.name),
        );
    }

    debug!(
        messages = state.network.bus.message_count(),
        bus = %state.network.bus.name,
        "resolution pass finished"
    );
}

fn default_of(state: &ParseState, name: &str) -> Option<AttributeValue> {
    state
        .definitions
        .get(name)
        .filter(|d| d.target == AttributeTarget::Message)
        .and_then(|d| d.default_value())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dbc::core::{
        attributes::{ba_, ba_def_, ba_def_def_},
        bo_,
        comments::{cm_bo_, cm_sg_},
        sig_valtype_, val_,
    };
    use crate::dbc::types::options::ParseOptions;
    use crate::kcd::types::signal::ValueType;

    fn fd_state() -> ParseState {
        let mut state = ParseState::new("fd.dbc", ParseOptions::default());
        bo_::decode(&mut state, "BO_ 1 Classic: 8 X").unwrap();
        bo_::decode(&mut state, "BO_ 2 Fast: 64 X").unwrap();
        bo_::decode(&mut state, "BO_ 3 Other: 64 X").unwrap();
        ba_def_::decode(
            &mut state,
            "BA_DEF_ BO_ \"VFrameFormat\" ENUM \"StandardCAN\",\"ExtendedCAN\",\"StandardCAN_FD\",\"ExtendedCAN_FD\";",
        )
        .unwrap();
        ba_def_::decode(&mut state, "BA_DEF_ BO_ \"CANFD_BRS\" ENUM \"0\",\"1\";").unwrap();
        ba_def_def_::decode(&mut state, "BA_DEF_DEF_ \"VFrameFormat\" \"StandardCAN_FD\";").unwrap();
        ba_def_def_::decode(&mut state, "BA_DEF_DEF_ \"CANFD_BRS\" \"1\";").unwrap();
        state
    }

    #[test]
    fn test_fd_default_and_overrides() {
        let mut state = fd_state();
        ba_::decode(&mut state, "BA_ \"VFrameFormat\" BO_ 1 0;").unwrap();
        ba_::decode(&mut state, "BA_ \"CANFD_BRS\" BO_ 1 1;").unwrap();
        ba_::decode(&mut state, "BA_ \"CANFD_BRS\" BO_ 3 0;").unwrap();
        finalize(&mut state);

        let bus = &state.network.bus;
        let classic = bus.get_message(1, false).unwrap();
        assert_eq!(classic.fd, Some(false));
        // BRS is cleared on non-FD frames whatever its attribute says
        assert_eq!(classic.bitrate_switch, None);

        let fast = bus.get_message(2, false).unwrap();
        assert_eq!(fast.fd, Some(true));
        assert_eq!(fast.bitrate_switch, Some(true));

        let other = bus.get_message(3, false).unwrap();
        assert_eq!(other.fd, Some(true));
        assert_eq!(other.bitrate_switch, Some(false));
    }

    #[test]
    fn test_no_fd_default_leaves_flags_unset() {
        let mut state = ParseState::new("can.dbc", ParseOptions::default());
        bo_::decode(&mut state, "BO_ 1 Classic: 8 X").unwrap();
        ba_def_::decode(&mut state, "BA_DEF_ BO_ \"VFrameFormat\" ENUM \"StandardCAN\",\"StandardCAN_FD\";").unwrap();
        ba_def_def_::decode(&mut state, "BA_DEF_DEF_ \"VFrameFormat\" \"StandardCAN\";").unwrap();
        finalize(&mut state);
        let classic = state.network.bus.get_message(1, false).unwrap();
        assert_eq!(classic.fd, None);
        assert_eq!(classic.bitrate_switch, None);
    }

    #[test]
    fn test_cycle_time_bus_name_and_baudrate() {
        let mut state = ParseState::new("a.dbc", ParseOptions::default());
        bo_::decode(&mut state, "BO_ 10 A: 8 X").unwrap();
        bo_::decode(&mut state, "BO_ 11 B: 8 X").unwrap();
        ba_def_::decode(&mut state, "BA_DEF_ BO_ \"GenMsgCycleTime\" INT 0 65535;").unwrap();
        ba_def_::decode(&mut state, "BA_DEF_ \"DBName\" STRING;").unwrap();
        ba_def_::decode(&mut state, "BA_DEF_ \"Baudrate\" INT 0 1000000;").unwrap();
        ba_::decode(&mut state, "BA_ \"GenMsgCycleTime\" BO_ 10 100;").unwrap();
        ba_::decode(&mut state, "BA_ \"GenMsgCycleTime\" BO_ 11 0;").unwrap();
        ba_::decode(&mut state, "BA_ \"GenMsgCycleTime\" BO_ 99 50;").unwrap();
        ba_::decode(&mut state, "BA_ \"DBName\" \"Powertrain\";").unwrap();
        ba_::decode(&mut state, "BA_ \"Baudrate\" 500000;").unwrap();
        finalize(&mut state);

        let bus = &state.network.bus;
        assert_eq!(bus.get_message(10, false).unwrap().interval, Some(100));
        assert_eq!(bus.get_message(11, false).unwrap().interval, None);
        assert_eq!(bus.name, "Powertrain");
        assert_eq!(bus.baudrate, Some(500000));
        assert_eq!(state.diagnostics.len(), 1);
        assert_eq!(state.diagnostics[0].kind, DiagnosticKind::UnresolvedReference);
    }

    #[test]
    fn test_labels_comments_and_value_types() {
        let mut state = ParseState::new("a.dbc", ParseOptions::default());
        bo_::decode(
            &mut state,
            "BO_ 20 Muxed: 8 X\n SG_ Mode M : 0|8@1+ (1,0) [0|1] \"\" X\n SG_ Temp m0 : 8|32@1+ (1,0) [0|0] \"\" X",
        )
        .unwrap();
        val_::decode(&mut state, "VAL_ 20 Mode 1 \"B\" 0 \"A\" 1 \"dup\";").unwrap();
        cm_sg_::decode(&mut state, "CM_ SG_ 20 Temp \"Coolant\";").unwrap();
        cm_bo_::decode(&mut state, "CM_ BO_ 20 \"Muxed frame\";").unwrap();
        sig_valtype_::decode(&mut state, "SIG_VALTYPE_ 20 Temp : 1;").unwrap();
        cm_sg_::decode(&mut state, "CM_ SG_ 20 Missing \"nobody\";").unwrap();
        ba_def_def_::decode(&mut state, "BA_DEF_DEF_ \"Orphan\" 1;").unwrap();
        finalize(&mut state);

        let msg = state.network.bus.get_message(20, false).unwrap();
        assert_eq!(msg.notes.as_deref(), Some("Muxed frame"));
        let mode = msg.find_signal("Mode").unwrap();
        let labels: Vec<(i64, &str)> = mode
            .labels
            .as_ref()
            .unwrap()
            .iter()
            .map(|l| (l.value, l.name.as_str()))
            .collect();
        assert_eq!(labels, vec![(0, "A"), (1, "B")]);
        let temp = msg.find_signal("Temp").unwrap();
        assert_eq!(temp.notes.as_deref(), Some("Coolant"));
        assert_eq!(temp.value.as_ref().unwrap().value_type, ValueType::Single);

        let kinds: Vec<DiagnosticKind> = state.diagnostics.iter().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            vec![
                DiagnosticKind::UnresolvedReference,
                DiagnosticKind::MissingAttributeDefinition
            ]
        );
    }
}
