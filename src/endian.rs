//! Byte-order detection and byte-order-threaded primitive I/O.
//!
//! Every read and write takes the [`ByteOrder`] explicitly.  Nothing in this
//! crate stores a "current" byte order on a stream; the order detected from a
//! header is passed down by value to each block codec.

use byteorder::{BigEndian, LittleEndian, ReadBytesExt, WriteBytesExt};
use serde::Serialize;
use std::fmt;
use std::io::{self, Read, Seek, Write};
use std::str::FromStr;

use crate::error::{Result, SeqError};

/// Byte-order mark as it reads in forward (big-endian) order.
pub const BOM: u16 = 0xFEFF;
/// Byte-order mark as it reads when the file is byte-swapped.
pub const BOM_SWAPPED: u16 = 0xFFFE;
/// Universal block and header alignment.
pub const ALIGNMENT: u64 = 0x20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ByteOrder {
    /// Forward order: the mark reads as `0xFEFF`.
    Big,
    /// Reversed order: the mark reads as `0xFFFE`.
    Little,
}

impl ByteOrder {
    /// Detect the byte order from the two raw mark bytes.
    pub fn from_bom(raw: [u8; 2]) -> Result<Self> {
        match u16::from_be_bytes(raw) {
            BOM => Ok(ByteOrder::Big),
            BOM_SWAPPED => Ok(ByteOrder::Little),
            other => Err(SeqError::InvalidBom(other)),
        }
    }

    /// The mark as it must appear on disk for this order.
    pub fn bom_bytes(self) -> [u8; 2] {
        match self {
            ByteOrder::Big => BOM.to_be_bytes(),
            ByteOrder::Little => BOM.to_le_bytes(),
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            ByteOrder::Big => "big",
            ByteOrder::Little => "little",
        }
    }
}

impl fmt::Display for ByteOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ByteOrder {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "big" | "be" => Ok(ByteOrder::Big),
            "little" | "le" => Ok(ByteOrder::Little),
            other => Err(format!("unknown byte order '{other}' (expected big or little)")),
        }
    }
}

// ── Primitive reads ──────────────────────────────────────────────────────────

pub fn read_u16<R: Read>(r: &mut R, order: ByteOrder) -> io::Result<u16> {
    match order {
        ByteOrder::Big => r.read_u16::<BigEndian>(),
        ByteOrder::Little => r.read_u16::<LittleEndian>(),
    }
}

pub fn read_u32<R: Read>(r: &mut R, order: ByteOrder) -> io::Result<u32> {
    match order {
        ByteOrder::Big => r.read_u32::<BigEndian>(),
        ByteOrder::Little => r.read_u32::<LittleEndian>(),
    }
}

pub fn read_i32<R: Read>(r: &mut R, order: ByteOrder) -> io::Result<i32> {
    match order {
        ByteOrder::Big => r.read_i32::<BigEndian>(),
        ByteOrder::Little => r.read_i32::<LittleEndian>(),
    }
}

pub fn read_magic<R: Read>(r: &mut R) -> io::Result<[u8; 4]> {
    let mut magic = [0u8; 4];
    r.read_exact(&mut magic)?;
    Ok(magic)
}

// ── Primitive writes ─────────────────────────────────────────────────────────

pub fn write_u16<W: Write>(w: &mut W, order: ByteOrder, value: u16) -> io::Result<()> {
    match order {
        ByteOrder::Big => w.write_u16::<BigEndian>(value),
        ByteOrder::Little => w.write_u16::<LittleEndian>(value),
    }
}

pub fn write_u32<W: Write>(w: &mut W, order: ByteOrder, value: u32) -> io::Result<()> {
    match order {
        ByteOrder::Big => w.write_u32::<BigEndian>(value),
        ByteOrder::Little => w.write_u32::<LittleEndian>(value),
    }
}

pub fn write_i32<W: Write>(w: &mut W, order: ByteOrder, value: i32) -> io::Result<()> {
    match order {
        ByteOrder::Big => w.write_i32::<BigEndian>(value),
        ByteOrder::Little => w.write_i32::<LittleEndian>(value),
    }
}

// ── Alignment ────────────────────────────────────────────────────────────────

/// Round `value` up to the next multiple of `alignment`.
pub fn align_up(value: u64, alignment: u64) -> u64 {
    value.div_ceil(alignment) * alignment
}

/// Zero-fill from the current position up to the next multiple of `alignment`
/// (absolute stream position).
pub fn pad_to<W: Write + Seek>(w: &mut W, alignment: u64) -> io::Result<()> {
    let pos = w.stream_position()?;
    let pad = align_up(pos, alignment) - pos;
    if pad > 0 {
        w.write_all(&vec![0u8; pad as usize])?;
    }
    Ok(())
}
