//! Typed sequence container (`CSEQ` / `FSEQ`).
//!
//! # Layout
//! ```text
//! 0x00  typed header, padded to 0x20
//!       DATA block (0x5000)  payload, zero-padded to 0x20
//!       LABL block (0x5001)  label table, zero-padded to 0x20
//! ```
//!
//! # Writer
//! The header size depends only on the block count, so [`SequenceContainer::to_bytes`]
//! reserves it up front, writes each block, then patches the header at
//! offset 0 with the real block offsets, sizes and file size.  Output is
//! built entirely in memory.
//!
//! # Reader
//! Blocks are located through the header's descriptor table and dispatched by
//! type tag.  Trailing zero bytes of the data block are treated as padding and
//! removed.

use std::fmt;
use std::io::{Cursor, Read, Seek, SeekFrom, Write};
use std::str::FromStr;

use crate::block::{self, BlockType};
use crate::endian::ByteOrder;
use crate::error::{magic_text, Result, SeqError};
use crate::header::{Header, HeaderKind, TYPED_C_MAGIC, TYPED_F_MAGIC};
use crate::label::LabelTable;
use crate::version::{Version, VersionLayout};

/// Magic prefix family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Family {
    /// `FSEQ`: primary version layout, big-endian by default.
    F,
    /// `CSEQ`: secondary version layout, little-endian by default.
    C,
}

impl Family {
    pub fn from_magic(magic: &[u8; 4]) -> Result<Self> {
        match *magic {
            TYPED_F_MAGIC => Ok(Family::F),
            TYPED_C_MAGIC => Ok(Family::C),
            _ => Err(SeqError::UnknownMagic(magic_text(magic))),
        }
    }

    pub fn magic(self) -> [u8; 4] {
        match self {
            Family::F => TYPED_F_MAGIC,
            Family::C => TYPED_C_MAGIC,
        }
    }

    pub fn version_layout(self) -> VersionLayout {
        match self {
            Family::F => VersionLayout::Primary,
            Family::C => VersionLayout::Secondary,
        }
    }

    pub fn default_byte_order(self) -> ByteOrder {
        match self {
            Family::F => ByteOrder::Big,
            Family::C => ByteOrder::Little,
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&magic_text(&self.magic()))
    }
}

impl FromStr for Family {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "f" | "fseq" | "bfseq" => Ok(Family::F),
            "c" | "cseq" | "bcseq" => Ok(Family::C),
            other => Err(format!("unknown family '{other}' (expected f or c)")),
        }
    }
}

/// Hardware generation a container targets.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Platform {
    /// 3DS and Wii U.
    CtrCafe,
    /// Switch: `F` family stored little-endian.
    Nx,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SequenceContainer {
    pub family: Family,
    pub byte_order: ByteOrder,
    pub version: Version,
    /// Opaque command stream.
    pub payload: Vec<u8>,
    pub labels: LabelTable,
}

impl SequenceContainer {
    pub fn new(family: Family) -> Self {
        Self {
            family,
            byte_order: family.default_byte_order(),
            version: Version::default(),
            payload: Vec::new(),
            labels: LabelTable::new(),
        }
    }

    pub fn platform(&self) -> Platform {
        if self.family == Family::F && self.byte_order == ByteOrder::Little {
            Platform::Nx
        } else {
            Platform::CtrCafe
        }
    }

    // ── Read ─────────────────────────────────────────────────────────────────

    pub fn read(bytes: &[u8]) -> Result<Self> {
        let header = Header::read(bytes)?;
        if header.kind != HeaderKind::Typed {
            return Err(SeqError::UnknownMagic(header.magic_str()));
        }
        let family = Family::from_magic(&header.magic)?;
        let order = header.byte_order;

        let mut payload = None;
        let mut labels = None;
        for desc in &header.blocks {
            let block_type = BlockType::try_from(desc.block_type.unwrap_or(0))?;
            let seen = match block_type {
                BlockType::Data => payload.is_some(),
                BlockType::Label => labels.is_some(),
            };
            if seen {
                return Err(SeqError::DuplicateBlock(block_type.name()));
            }
            let body = block::body(bytes, desc, order, block_type)?;
            match block_type {
                BlockType::Data => payload = Some(block::trim_padding(body).to_vec()),
                BlockType::Label => labels = Some(LabelTable::decode(body, order)?),
            }
        }

        let payload = payload.ok_or(SeqError::MissingBlock("DATA"))?;
        let labels = labels.ok_or(SeqError::MissingBlock("LABL"))?;
        log::info!(
            "read {} container: {} payload byte(s), {} label(s)",
            family,
            payload.len(),
            labels.len()
        );
        Ok(Self { family, byte_order: order, version: header.version, payload, labels })
    }

    pub fn from_reader<R: Read>(mut reader: R) -> Result<Self> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;
        Self::read(&bytes)
    }

    // ── Write ────────────────────────────────────────────────────────────────

    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let order = self.byte_order;
        let header_size = HeaderKind::Typed.header_size(2)?;

        let mut w = Cursor::new(Vec::new());
        w.write_all(&vec![0u8; header_size as usize])?;

        let data = block::write_data(&mut w, order, &self.payload)?;

        let label_block = block::open(&mut w, order, BlockType::Label)?;
        self.labels.encode(&mut w, order)?;
        let labels = label_block.close(&mut w, order)?;

        let file_size = u32::try_from(w.stream_position()?).map_err(|_| SeqError::Overflow("file size"))?;
        let header = Header {
            kind: HeaderKind::Typed,
            magic: self.family.magic(),
            byte_order: order,
            version: self.version,
            file_size,
            header_size,
            blocks: vec![data, labels],
        };
        w.seek(SeekFrom::Start(0))?;
        header.write(&mut w)?;

        log::debug!("wrote {} container: {} bytes", self.family, file_size);
        Ok(w.into_inner())
    }

    /// Serialize fully, then hand the bytes to `writer` in one call.
    pub fn write<W: Write>(&self, mut writer: W) -> Result<()> {
        let bytes = self.to_bytes()?;
        writer.write_all(&bytes)?;
        Ok(())
    }
}
