//! `name: offset` sidecar format, one label per line.

use super::LabelTable;
use crate::error::{Result, SeqError};

pub fn to_text(table: &LabelTable) -> String {
    table.iter().map(|l| format!("{}: {}\n", l.name, l.offset)).collect()
}

/// Parse sidecar text.  Blank lines are ignored; the offset follows the last `:`.
pub fn from_text(text: &str) -> Result<LabelTable> {
    let mut table = LabelTable::new();
    for (i, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let bad_line = || SeqError::InvalidLabelLine { line: i + 1, text: line.to_string() };
        let (name, offset) = line.rsplit_once(':').ok_or_else(bad_line)?;
        let offset = offset.trim().parse::<u32>().map_err(|_| bad_line())?;
        table.insert(name.trim(), offset)?;
    }
    Ok(table)
}
