//! Label table: named offsets into the sequence payload.

mod text;

pub use text::{from_text, to_text};

use std::io::{Cursor, Read, Seek, Write};

use crate::endian::{pad_to, read_u32, write_u16, write_u32, ByteOrder};
use crate::error::{Result, SeqError};
use crate::reference::{reserve, NullPolicy, Reference, REFERENCE_SIZE};

/// Reference identifier of a label entry.
pub const LABEL_REF_ID: u16 = 0x5100;
/// Data-reference identifier written at the head of each entry.
pub const LABEL_DATA_REF_ID: u16 = 0x1F00;
/// Label references treat -1 as "no target".
pub const LABEL_NULL_POLICY: NullPolicy = NullPolicy::NegativeOne;

const ENTRY_FIXED_SIZE: u64 = 12;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Label {
    pub name: String,
    pub offset: u32,
}

/// Ordered name → offset mapping with unique names.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelTable {
    labels: Vec<Label>,
}

impl LabelTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_pairs<I, S>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (S, u32)>,
        S: Into<String>,
    {
        let mut table = Self::new();
        for (name, offset) in pairs {
            table.insert(name, offset)?;
        }
        Ok(table)
    }

    /// Append a label.  Names must be printable ASCII without `:` or
    /// surrounding spaces, so every table survives the sidecar text format.
    pub fn insert(&mut self, name: impl Into<String>, offset: u32) -> Result<()> {
        let name = name.into();
        if !valid_name(&name) {
            return Err(SeqError::InvalidLabelName(name));
        }
        if self.get(&name).is_some() {
            return Err(SeqError::DuplicateLabel(name));
        }
        self.labels.push(Label { name, offset });
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<u32> {
        self.labels.iter().find(|l| l.name == name).map(|l| l.offset)
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Label> {
        self.labels.iter()
    }

    /// Decode a label block body.
    pub fn decode(body: &[u8], order: ByteOrder) -> Result<Self> {
        let available = body.len() as u64;
        SeqError::ensure_available("label count", 0, 4, available)?;
        let mut r = Cursor::new(body);
        let count = read_u32(&mut r, order)?;
        SeqError::ensure_available("label references", 4, REFERENCE_SIZE * count as u64, available)?;

        let mut references = Vec::with_capacity(count as usize);
        for _ in 0..count {
            references.push(Reference::read(&mut r, order)?);
        }

        let mut table = Self::new();
        for (i, reference) in references.iter().enumerate() {
            let Some(at) = reference.resolve(0) else {
                log::warn!("label reference {i} is null or points before the table; skipped");
                continue;
            };
            if reference.identifier != LABEL_REF_ID {
                log::debug!("label reference {i} has identifier 0x{:04X}", reference.identifier);
            }
            let (name, offset) = read_entry(body, at, order)?;
            table.insert(name, offset)?;
        }
        Ok(table)
    }

    /// Encode the table body at the current position.
    pub fn encode<W: Write + Seek>(&self, w: &mut W, order: ByteOrder) -> Result<()> {
        let table_start = w.stream_position()?;
        let count = u32::try_from(self.labels.len()).map_err(|_| SeqError::Overflow("label count"))?;
        write_u32(w, order, count)?;

        let mut slots = Vec::with_capacity(self.labels.len());
        for _ in &self.labels {
            slots.push(reserve(w, table_start)?);
        }

        for (label, slot) in self.labels.iter().zip(slots) {
            slot.close(w, order, LABEL_REF_ID, LABEL_NULL_POLICY)?;
            write_entry(w, order, label)?;
        }
        Ok(())
    }
}

impl<'a> IntoIterator for &'a LabelTable {
    type Item = &'a Label;
    type IntoIter = std::slice::Iter<'a, Label>;

    fn into_iter(self) -> Self::IntoIter {
        self.labels.iter()
    }
}

fn valid_name(name: &str) -> bool {
    name.bytes().all(|b| (b' '..=b'~').contains(&b) && b != b':') && name.trim() == name
}

fn read_entry(body: &[u8], at: u64, order: ByteOrder) -> Result<(String, u32)> {
    let available = body.len() as u64;
    SeqError::ensure_available("label entry", at, ENTRY_FIXED_SIZE, available)?;
    let mut r = Cursor::new(body);
    r.set_position(at + 4);
    let offset = read_u32(&mut r, order)?;
    let len = read_u32(&mut r, order)? as u64;
    SeqError::ensure_available("label name", at + ENTRY_FIXED_SIZE, len, available)?;

    let mut raw = vec![0u8; len as usize];
    r.read_exact(&mut raw)?;
    let name = String::from_utf8(raw)
        .map_err(|e| SeqError::InvalidLabelName(String::from_utf8_lossy(e.as_bytes()).into_owned()))?;
    Ok((name, offset))
}

fn write_entry<W: Write + Seek>(w: &mut W, order: ByteOrder, label: &Label) -> Result<()> {
    let len = u32::try_from(label.name.len()).map_err(|_| SeqError::Overflow("label name length"))?;
    write_u16(w, order, LABEL_DATA_REF_ID)?;
    write_u16(w, order, 0)?;
    write_u32(w, order, label.offset)?;
    write_u32(w, order, len)?;
    w.write_all(label.name.as_bytes())?;
    w.write_all(&[0])?;
    pad_to(w, 4)?;
    Ok(())
}
