use std::collections::BTreeMap;

use tracing::debug;

use crate::dbc::core::message_layout::check_signal_fits;
use crate::dbc::core::sg_::{self, MuxRole, NO_NODE, SignalClause};
use crate::dbc::core::strings::{next_token, parse_field, record_body};
use crate::dbc::types::{
    diagnostics::DiagnosticKind, errors::RecordError, pending::MessageRef, state::ParseState,
};
use crate::kcd::types::{
    message::{IdFormat, Message},
    signal::{Multiplex, MuxGroup, Signal},
};

/// Decode a `BO_` record together with its `SG_` clauses.
/// Accepts both: `BO_ 123 NAME: 8 Node` and `BO_ 123 NAME : 8 Node`.
///
/// Any malformed clause rejects the whole message.
pub(crate) fn decode(state: &mut ParseState, text: &str) -> Result<(), RecordError> {
    let body: &str = record_body(text, "BO_");
    let (header, clauses) = split_clauses(body);

    // 1) ID (first token)
    let (id_str, rest) = next_token(header).ok_or(RecordError::MissingField { field: "message id" })?;
    let message_ref: MessageRef = MessageRef::from_raw(id_str)?;

    // 2) NAME (everything up to the first ':')
    let (name, after) = rest
        .split_once(':')
        .ok_or(RecordError::MissingField { field: "message length" })?;
    let name: &str = name.trim();
    if name.is_empty() {
        return Err(RecordError::MissingField { field: "message name" });
    }

    // 3) After ':' → <len> <sender?>
    let mut it = after.split_ascii_whitespace();
    let length: u16 = parse_field(
        "message length",
        it.next()
            .ok_or(RecordError::MissingField { field: "message length" })?,
    )?;
    let producer: Option<String> = it
        .next()
        .filter(|p| *p != NO_NODE)
        .map(str::to_string);

    if message_ref.is_orphan_container() {
        debug!(line = state.line, name, "dropping container of unassigned signals");
        return Ok(());
    }
    let format: IdFormat = IdFormat::from_extended(message_ref.extended);
    if state
        .network
        .bus
        .get_message(message_ref.id, message_ref.extended)
        .is_some()
    {
        return Err(RecordError::DuplicateMessage {
            id: message_ref.id,
            format: format.as_str(),
        });
    }

    let decoded: Vec<SignalClause> = clauses
        .into_iter()
        .map(sg_::decode)
        .collect::<Result<_, _>>()?;

    if state.options.check_layout {
        for clause in &decoded {
            if let Err(e) = check_signal_fits(
                length,
                clause.raw_start,
                clause.signal.length,
                clause.signal.endianness,
            ) {
                state.warn(
                    DiagnosticKind::SignalOutOfBounds,
                    format!("signal '{}' of message '{}': {}", clause.signal.name, name, e),
                );
            }
        }
    }

    let mut message: Message = Message {
        id: message_ref.id,
        format,
        name: name.to_string(),
        length,
        producer,
        ..Default::default()
    };
    assemble_signals(state, &mut message, decoded);
    state.network.bus.add_message(message);
    Ok(())
}

/// Splits the record body at every standalone `SG_` token.
fn split_clauses(body: &str) -> (&str, Vec<&str>) {
    let bytes: &[u8] = body.as_bytes();
    let mut cuts: Vec<usize> = Vec::new();
    let mut from: usize = 0;
    while let Some(pos) = body[from..].find("SG_") {
        let at: usize = from + pos;
        let before_ok: bool = at == 0 || bytes[at - 1].is_ascii_whitespace();
        let after_ok: bool = bytes.get(at + 3).is_none_or(|b| b.is_ascii_whitespace());
        if before_ok && after_ok {
            cuts.push(at);
        }
        from = at + 3;
    }

    let header_end: usize = cuts.first().copied().unwrap_or(body.len());
    let clauses: Vec<&str> = cuts
        .iter()
        .enumerate()
        .map(|(i, &at)| {
            let end: usize = cuts.get(i + 1).copied().unwrap_or(body.len());
            body[at + 3..end].trim()
        })
        .collect();
    (&body[..header_end], clauses)
}

/// Sorts clauses into plain signals and multiplexes.
///
/// Groups are folded into the multiplexor only when the message declares exactly
/// one. Otherwise the grouping is discarded and its members stay as plain signals.
/// A multiplexor left without groups becomes a plain signal. Plain signals keep
/// their clause order.
fn assemble_signals(state: &mut ParseState, message: &mut Message, clauses: Vec<SignalClause>) {
    let mut plain: Vec<(usize, Signal)> = Vec::new();
    let mut multiplexors: Vec<(usize, Multiplex)> = Vec::new();
    let mut groups: BTreeMap<u64, Vec<(usize, Signal)>> = BTreeMap::new();

    for (i, clause) in clauses.into_iter().enumerate() {
        match clause.role {
            MuxRole::Plain => plain.push((i, clause.signal)),
            MuxRole::Multiplexor => multiplexors.push((i, Multiplex::new(clause.signal))),
            MuxRole::Multiplexed(selector) => {
                groups.entry(selector).or_default().push((i, clause.signal))
            }
        }
    }

    if !groups.is_empty() {
        if let [(_, multiplexor)] = multiplexors.as_mut_slice() {
            multiplexor.groups = groups
                .into_iter()
                .map(|(count, members)| MuxGroup {
                    count,
                    signals: members.into_iter().map(|(_, s)| s).collect(),
                })
                .collect();
        } else {
            let ungrouped: usize = groups.values().map(Vec::len).sum();
            state.warn(
                DiagnosticKind::DiscardedMultiplex,
                format!(
                    "message '{}' declares {} multiplexors; {} multiplexed signals kept ungrouped",
                    message.name,
                    multiplexors.len(),
                    ungrouped
                ),
            );
            plain.extend(groups.into_values().flatten());
        }
    }

    for (i, multiplexor) in multiplexors {
        if multiplexor.groups.is_empty() {
            plain.push((i, multiplexor.signal));
        } else {
            message.multiplexes.push(multiplexor);
        }
    }

    plain.sort_by_key(|(i, _)| *i);
    message.signals.extend(plain.into_iter().map(|(_, s)| s));
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dbc::types::options::ParseOptions;
    use crate::kcd::types::signal::Endianness;

    fn state() -> ParseState {
        ParseState::new("test.dbc", ParseOptions::default())
    }

    #[test]
    fn test_decode_message_header_and_signals() {
        let mut state = state();
        decode(
            &mut state,
            "BO_ 2566861823 Motor_01: 8 Motor\n SG_ Status : 61|1@1+ (1,0) [0|1] \"\"  Dash\n SG_ Speed : 7|16@0+ (0.5,0) [0|300] \"km/h\" Vector__XXX",
        )
        .unwrap();

        let msg = state.network.bus.get_message(419378175, true).unwrap();
        assert_eq!(msg.name, "Motor_01");
        assert_eq!(msg.length, 8);
        assert_eq!(msg.producer.as_deref(), Some("Motor"));
        assert_eq!(msg.signals.len(), 2);
        assert_eq!(msg.signals[1].offset, 8);
        assert_eq!(msg.signals[1].endianness, Endianness::Big);
        assert!(state.diagnostics.is_empty());
    }

    #[test]
    fn test_byte_aligned_motorola_signals() {
        let mut state = state();
        decode(
            &mut state,
            "BO_ 1 M: 8 X\n SG_ B : 7|8@0+ (1,0) [0|255] \"\" X\n SG_ Bit : 8|1@0+ (1,0) [0|1] \"\" X",
        )
        .unwrap();

        let msg = state.network.bus.get_message(1, false).unwrap();
        assert_eq!(msg.find_signal("B").unwrap().offset, 0);
        assert_eq!(msg.find_signal("Bit").unwrap().offset, 8);
        assert!(state.diagnostics.is_empty());
    }

    #[test]
    fn test_multiplex_groups_folded_into_single_multiplexor() {
        let mut state = state();
        decode(
            &mut state,
            "BO_ 300 Muxed : 8 Vector__XXX\n SG_ Mode M : 0|8@1+ (1,0) [0|1] \"\" X\n SG_ B m1 : 8|8@1+ (1,0) [0|1] \"\" X\n SG_ A m0 : 8|8@1+ (1,0) [0|1] \"\" X\n SG_ C m1 : 16|8@1+ (1,0) [0|1] \"\" X\n SG_ Plain : 63|1@1+ (1,0) [0|1] \"\" X",
        )
        .unwrap();

        let msg = state.network.bus.get_message(300, false).unwrap();
        assert_eq!(msg.producer, None);
        assert_eq!(msg.signals.len(), 1);
        assert_eq!(msg.multiplexes.len(), 1);
        let mux = &msg.multiplexes[0];
        assert_eq!(mux.signal.name, "Mode");
        assert_eq!(mux.groups.len(), 2);
        assert_eq!(mux.groups[0].count, 0);
        let g0: Vec<&str> = mux.groups[0].signals.iter().map(|s| s.name.as_str()).collect();
        let g1: Vec<&str> = mux.groups[1].signals.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(g0, vec!["A"]);
        assert_eq!(g1, vec!["B", "C"]);
    }

    #[test]
    fn test_multiplex_groups_discarded_without_single_multiplexor() {
        let mut state = state();
        decode(
            &mut state,
            "BO_ 301 NoMux: 8 X\n SG_ A m0 : 8|8@1+ (1,0) [0|1] \"\" X\n SG_ B m1 : 16|8@1+ (1,0) [0|1] \"\" X\n SG_ P : 0|8@1+ (1,0) [0|1] \"\" X",
        )
        .unwrap();
        decode(
            &mut state,
            "BO_ 302 TwoMux: 8 X\n SG_ M1 M : 0|4@1+ (1,0) [0|1] \"\" X\n SG_ M2 M : 4|4@1+ (1,0) [0|1] \"\" X\n SG_ A m0 : 8|8@1+ (1,0) [0|1] \"\" X",
        )
        .unwrap();

        let no_mux = state.network.bus.get_message(301, false).unwrap();
        assert!(no_mux.multiplexes.is_empty());
        let names: Vec<&str> = no_mux.signals.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["A", "B", "P"]);
        assert_eq!(no_mux.find_signal("B").unwrap().offset, 16);

        let two_mux = state.network.bus.get_message(302, false).unwrap();
        assert!(two_mux.multiplexes.is_empty());
        let names: Vec<&str> = two_mux.signals.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["M1", "M2", "A"]);

        let kinds: Vec<DiagnosticKind> = state.diagnostics.iter().map(|d| d.kind).collect();
        assert_eq!(
            kinds,
            vec![DiagnosticKind::DiscardedMultiplex, DiagnosticKind::DiscardedMultiplex]
        );
    }

    #[test]
    fn test_orphan_container_and_duplicates() {
        let mut state = state();
        decode(
            &mut state,
            "BO_ 3221225472 VECTOR__INDEPENDENT_SIG_MSG: 0 Vector__XXX\n SG_ Lost : 0|8@1+ (1,0) [0|1] \"\" X",
        )
        .unwrap();
        assert_eq!(state.network.bus.message_count(), 0);

        decode(&mut state, "BO_ 100 First: 8 X").unwrap();
        assert_eq!(
            decode(&mut state, "BO_ 100 Second: 8 X"),
            Err(RecordError::DuplicateMessage {
                id: 100,
                format: "standard"
            })
        );
        decode(&mut state, "BO_ 2147483748 Extended100: 8 X").unwrap();
        assert_eq!(state.network.bus.message_count(), 2);
    }

    #[test]
    fn test_bad_clause_rejects_message_and_layout_is_reported() {
        let mut state = state();
        let result = decode(
            &mut state,
            "BO_ 5 Bad: 8 X\n SG_ Ok : 0|8@1+ (1,0) [0|1] \"\" X\n SG_ Broken : 8|8@1+ (1,0)",
        );
        assert!(result.is_err());
        assert_eq!(state.network.bus.message_count(), 0);

        decode(&mut state, "BO_ 6 Short: 1 X\n SG_ Wide : 0|16@1+ (1,0) [0|1] \"\" X").unwrap();
        assert_eq!(state.network.bus.message_count(), 1);
        assert_eq!(state.diagnostics[0].kind, DiagnosticKind::SignalOutOfBounds);
    }

    #[test]
    fn test_split_clauses_ignores_embedded_sg() {
        let (header, clauses) = split_clauses("1 A: 8 X\n SG_ MSG_SG_ : 0|1@1+ (1,0) [0|1] \"\" X");
        assert_eq!(header, "1 A: 8 X\n ");
        assert_eq!(clauses, vec!["MSG_SG_ : 0|1@1+ (1,0) [0|1] \"\" X"]);
    }
}
