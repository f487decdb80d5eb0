use crate::dbc::core::message_layout::motorola_lsb;
use crate::dbc::core::strings::{parse_field, split_fields, un_quote};
use crate::dbc::types::errors::{MessageLayoutError, RecordError};
use crate::kcd::types::signal::{Endianness, Signal, Value};

/// Node name DBC uses for "no node".
pub(crate) const NO_NODE: &str = "Vector__XXX";

/// Multiplexing role declared on the left side of a signal clause.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub(crate) enum MuxRole {
    Plain,
    Multiplexor,
    Multiplexed(u64),
}

/// A decoded `SG_` clause, before mux-group assembly.
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct SignalClause {
    pub signal: Signal,
    pub role: MuxRole,
    /// Start bit as written in the source (MSB position for Motorola).
    pub raw_start: u16,
}

/// Decode one signal clause (the text following `SG_`).
/// Format (typical):
/// <name> [M|mX] : <bit_start>|<bit_length>@<endian><sign> (<factor>,<offset>) [<min>|<max>] "<unit>" <receivers...>
pub(crate) fn decode(clause: &str) -> Result<SignalClause, RecordError> {
    let (left, right) = clause
        .split_once(':')
        .ok_or(RecordError::MissingField { field: "signal layout" })?;

    // Left part analysis NAME [M|mX]
    let mut left_it = left.split_ascii_whitespace();
    let name: &str = left_it
        .next()
        .ok_or(RecordError::MissingField { field: "signal name" })?;
    let role: MuxRole = match left_it.next() {
        None => MuxRole::Plain,
        Some(tag) => mux_role(tag)?,
    };

    let fields: Vec<String> = split_fields(right);
    if fields.len() < 9 {
        return Err(RecordError::MissingField {
            field: "signal value list",
        });
    }

    let raw_start: u16 = parse_field("start bit", &fields[0])?;
    let length: u16 = parse_field("bit length", &fields[1])?;
    if length == 0 {
        return Err(MessageLayoutError::ZeroBitLength.into());
    }
    let endianness: Endianness =
        Endianness::from_dbc_flag(&fields[2]).ok_or_else(|| RecordError::InvalidNumber {
            field: "byte order",
            value: fields[2].clone(),
        })?;
    let signed: bool = match fields[3].as_str() {
        "-" => true,
        "+" => false,
        other => {
            return Err(RecordError::InvalidNumber {
                field: "sign flag",
                value: other.to_string(),
            });
        }
    };
    let slope: f64 = parse_field("factor", &fields[4])?;
    let intercept: f64 = parse_field("offset", &fields[5])?;
    let min: f64 = parse_field("minimum", &fields[6])?;
    let max: f64 = parse_field("maximum", &fields[7])?;
    let unit: &str = un_quote(&fields[8]);

    let offset: u16 = match endianness {
        Endianness::Little => raw_start,
        Endianness::Big => motorola_lsb(raw_start, length)?,
    };

    let mut signal: Signal = Signal::new(name, offset, length, endianness);
    signal.value = Value::from_dbc(signed, slope, intercept, min, max, unit);
    signal.consumers = fields[9..]
        .iter()
        .filter(|n| n.as_str() != NO_NODE)
        .cloned()
        .collect();

    Ok(SignalClause {
        signal,
        role,
        raw_start,
    })
}

// "M" marks the multiplexor; "m<N>" (optionally followed by "M") a member of group N.
fn mux_role(tag: &str) -> Result<MuxRole, RecordError> {
    if tag == "M" {
        return Ok(MuxRole::Multiplexor);
    }
    let selector: &str = tag
        .trim_end_matches('M')
        .rsplit_once('m')
        .map(|(_, n)| n)
        .unwrap_or("");
    selector
        .parse::<u64>()
        .map(MuxRole::Multiplexed)
        .map_err(|_| RecordError::InvalidNumber {
            field: "multiplexer indicator",
            value: tag.to_string(),
        })
}
