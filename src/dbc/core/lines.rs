use std::io::{self, BufRead};

use encoding_rs::WINDOWS_1252;

/// Every DBC statement keyword. A physical line starting with one of them at
/// column 0 opens a new logical record.
pub(crate) const KEYWORDS: &[&str] = &[
    "VERSION",
    "NS_",
    "NS_DESC_",
    "BS_",
    "BU_",
    "BO_",
    "BO_TX_BU_",
    "CM_",
    "BA_DEF_",
    "BA_DEF_REL_",
    "BA_DEF_DEF_",
    "BA_DEF_DEF_REL_",
    "BA_DEF_SGTYPE_",
    "BA_",
    "BA_REL_",
    "BA_SGTYPE_",
    "VAL_",
    "VAL_TABLE_",
    "EV_",
    "EV_DATA_",
    "ENVVAR_DATA_",
    "CAT_DEF_",
    "CAT_",
    "FILTER",
    "SGTYPE_",
    "SGTYPE_VAL_",
    "SIG_TYPE_REF_",
    "SIG_VALTYPE_",
    "SIGTYPE_VALTYPE_",
    "SIG_GROUP_",
    "SG_MUL_VAL_",
    "BU_SG_REL_",
    "BU_EV_REL_",
    "BU_BO_REL_",
];

/// Leading keyword of a physical line, if the line opens a record.
pub(crate) fn leading_keyword(line: &str) -> Option<&str> {
    let end: usize = line
        .find(|c: char| c.is_ascii_whitespace() || c == ':')
        .unwrap_or(line.len());
    let token: &str = &line[..end];
    KEYWORDS.iter().copied().find(|k| *k == token)
}

/// One keyword-introduced statement; continuation lines are joined with `'\n'`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub(crate) struct LogicalRecord {
    /// 1-based physical line of the keyword.
    pub line: usize,
    pub text: String,
}

/// Regroups the physical lines of a Windows-1252 stream into logical records.
///
/// The pending record is always yielded at end of input.
pub(crate) struct LogicalLines<R: BufRead> {
    reader: R,
    buf: Vec<u8>,
    physical: usize,
    current: Option<LogicalRecord>,
    done: bool,
}

impl<R: BufRead> LogicalLines<R> {
    pub fn new(reader: R) -> Self {
        LogicalLines {
            reader,
            buf: Vec::with_capacity(256),
            physical: 0,
            current: None,
            done: false,
        }
    }
}

impl<R: BufRead> Iterator for LogicalLines<R> {
    type Item = io::Result<LogicalRecord>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        loop {
            self.buf.clear();
            match self.reader.read_until(b'\n', &mut self.buf) {
                Ok(0) => {
                    self.done = true;
                    return self.current.take().map(Ok);
                }
                Ok(_) => {}
                Err(e) => {
                    self.done = true;
                    return Some(Err(e));
                }
            }
            self.physical += 1;

            let (decoded, _, _) = WINDOWS_1252.decode(&self.buf);
            let line: &str = decoded.trim_end_matches(['\r', '\n']);

            if leading_keyword(line).is_some() {
                let next: LogicalRecord = LogicalRecord {
                    line: self.physical,
                    text: line.to_string(),
                };
                if let Some(previous) = self.current.replace(next) {
                    return Some(Ok(previous));
                }
                continue;
            }

            match &mut self.current {
                Some(record) => {
                    record.text.push('\n');
                    record.text.push_str(line);
                }
                None => {
                    self.current = Some(LogicalRecord {
                        line: self.physical,
                        text: line.to_string(),
                    })
                }
            }
        }
    }
}
