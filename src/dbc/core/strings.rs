// Field-level helpers shared by the record decoders.

use std::str::FromStr;

use crate::dbc::types::errors::RecordError;

// Characters that end a field outside a quoted string.
fn is_divider(c: char) -> bool {
    matches!(c, '[' | ']' | '(' | ')' | '|' | ',' | '@' | ';') || c.is_ascii_whitespace()
}

/// Splits a value list such as `56|8@1+ (1,0) [0|255] "km/h" Motor` into fields.
///
/// Quoted strings are one field each, quotes included, so an empty unit `""` is kept.
/// A `+` or `-` two characters after an `@` is the sign flag and becomes its own field;
/// anywhere else a sign belongs to the running field (`-40`, `1E-05`).
pub(crate) fn split_fields(s: &str) -> Vec<String> {
    let chars: Vec<char> = s.chars().collect();
    let mut fields: Vec<String> = Vec::new();
    let mut current: String = String::new();
    let mut quoted: bool = false;

    for (i, &c) in chars.iter().enumerate() {
        if quoted {
            current.push(c);
            if c == '"' {
                fields.push(std::mem::take(&mut current));
                quoted = false;
            }
            continue;
        }
        match c {
            '"' => {
                flush(&mut current, &mut fields);
                current.push(c);
                quoted = true;
            }
            '+' | '-' if i >= 2 && chars[i - 2] == '@' => {
                flush(&mut current, &mut fields);
                fields.push(c.to_string());
            }
            c if is_divider(c) => flush(&mut current, &mut fields),
            c => current.push(c),
        }
    }
    flush(&mut current, &mut fields);
    fields
}

fn flush(current: &mut String, fields: &mut Vec<String>) {
    if !current.is_empty() {
        fields.push(std::mem::take(current));
    }
}

/// Strips one pair of surrounding quotes. Anything else is returned unchanged.
pub(crate) fn un_quote(s: &str) -> &str {
    if s.len() >= 2 && s.starts_with('"') && s.ends_with('"') {
        &s[1..s.len() - 1]
    } else {
        s
    }
}

/// Splits off the first whitespace-delimited token.
pub(crate) fn next_token(s: &str) -> Option<(&str, &str)> {
    let s: &str = s.trim_start();
    if s.is_empty() {
        return None;
    }
    match s.find(|c: char| c.is_ascii_whitespace()) {
        Some(end) => Some((&s[..end], &s[end..])),
        None => Some((s, "")),
    }
}

/// Text between the first and the last unescaped quote, with `\"` unescaped.
pub(crate) fn quoted_text(s: &str) -> Option<String> {
    let start: usize = s.find('"')?;
    let end: usize = s.rfind('"')?;
    if end <= start {
        return None;
    }
    Some(s[start + 1..end].replace("\\\"", "\""))
}

/// Removes the leading keyword token and the statement terminator.
pub(crate) fn record_body<'a>(text: &'a str, keyword: &str) -> &'a str {
    let body: &str = text.trim().strip_prefix(keyword).unwrap_or(text);
    body.trim().trim_end_matches(';').trim_end()
}

pub(crate) fn parse_field<T: FromStr>(field: &'static str, raw: &str) -> Result<T, RecordError> {
    raw.trim().parse::<T>().map_err(|_| RecordError::InvalidNumber {
        field,
        value: raw.to_string(),
    })
}

/// Integer literal, accepting a floating-point spelling (`100.0`) that is rounded.
pub(crate) fn parse_int(field: &'static str, raw: &str) -> Result<i64, RecordError> {
    let raw: &str = raw.trim();
    if let Ok(v) = raw.parse::<i64>() {
        return Ok(v);
    }
    if let Some(hex) = raw.strip_prefix("0x").or_else(|| raw.strip_prefix("0X"))
        && let Ok(v) = i64::from_str_radix(hex, 16)
    {
        return Ok(v);
    }
    match raw.parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v.round() as i64),
        _ => Err(RecordError::InvalidNumber {
            field,
            value: raw.to_string(),
        }),
    }
}
