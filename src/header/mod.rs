//! File headers for the three container generations (`SSEQ`, `RSEQ`,
//! `CSEQ`/`FSEQ`).  Block table offsets are absolute.

mod indexed;
mod legacy;
mod typed;

use serde::{Serialize, Serializer};
use std::io::{Seek, Write};

use crate::endian::ByteOrder;
use crate::error::{magic_text, Result, SeqError};
use crate::version::{Version, VersionLayout};

pub const LEGACY_MAGIC: [u8; 4] = *b"SSEQ";
pub const INDEXED_MAGIC: [u8; 4] = *b"RSEQ";
pub const TYPED_F_MAGIC: [u8; 4] = *b"FSEQ";
pub const TYPED_C_MAGIC: [u8; 4] = *b"CSEQ";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderKind {
    /// Single fixed block.
    Legacy,
    /// Multi-block with an offset/size table.
    Indexed,
    /// Multi-block with per-block type tags.
    Typed,
}

impl HeaderKind {
    pub fn from_magic(magic: &[u8; 4]) -> Result<Self> {
        match magic {
            m if *m == LEGACY_MAGIC => Ok(HeaderKind::Legacy),
            m if *m == INDEXED_MAGIC => Ok(HeaderKind::Indexed),
            m if *m == TYPED_F_MAGIC || *m == TYPED_C_MAGIC => Ok(HeaderKind::Typed),
            other => Err(SeqError::UnknownMagic(magic_text(other))),
        }
    }

    /// Encoded header size for `block_count` blocks, padding included.
    pub fn header_size(self, block_count: usize) -> Result<u16> {
        match self {
            HeaderKind::Legacy => Ok(legacy::HEADER_SIZE),
            HeaderKind::Indexed => indexed::header_size(block_count),
            HeaderKind::Typed => typed::header_size(block_count),
        }
    }

    fn read(self, bytes: &[u8]) -> Result<Header> {
        match self {
            HeaderKind::Legacy => legacy::read(bytes),
            HeaderKind::Indexed => indexed::read(bytes),
            HeaderKind::Typed => typed::read(bytes),
        }
    }
}

/// Version layout a typed header uses: primary for `F`-prefixed magics,
/// secondary otherwise.
pub fn typed_version_layout(magic: &[u8; 4]) -> VersionLayout {
    if magic[0] == b'F' {
        VersionLayout::Primary
    } else {
        VersionLayout::Secondary
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BlockDescriptor {
    /// Present only in typed headers.
    pub block_type: Option<u16>,
    pub offset: u32,
    pub size: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Header {
    pub kind: HeaderKind,
    #[serde(serialize_with = "serialize_magic")]
    pub magic: [u8; 4],
    pub byte_order: ByteOrder,
    pub version: Version,
    pub file_size: u32,
    pub header_size: u16,
    pub blocks: Vec<BlockDescriptor>,
}

fn serialize_magic<S: Serializer>(magic: &[u8; 4], s: S) -> std::result::Result<S::Ok, S::Error> {
    s.serialize_str(&magic_text(magic))
}

impl Header {
    /// Parse whichever header kind the magic names.
    pub fn read(bytes: &[u8]) -> Result<Self> {
        SeqError::ensure_available("header magic", 0, 4, bytes.len() as u64)?;
        let mut magic = [0u8; 4];
        magic.copy_from_slice(&bytes[..4]);
        let header = HeaderKind::from_magic(&magic)?.read(bytes)?;
        SeqError::ensure_available("file", 0, header.file_size as u64, bytes.len() as u64)?;
        log::debug!(
            "read {:?} header {} ({}, v{}, {} block(s))",
            header.kind,
            header.magic_str(),
            header.byte_order,
            header.version,
            header.blocks.len()
        );
        Ok(header)
    }

    /// Write the header at the current position.  The header size field is
    /// recomputed from the block count and the output is padded to it.
    pub fn write<W: Write + Seek>(&self, w: &mut W) -> Result<()> {
        match self.kind {
            HeaderKind::Legacy => legacy::write(self, w),
            HeaderKind::Indexed => indexed::write(self, w),
            HeaderKind::Typed => typed::write(self, w),
        }
    }

    pub fn magic_str(&self) -> String {
        magic_text(&self.magic)
    }

    /// First descriptor carrying the given type tag.
    pub fn find_block(&self, block_type: u16) -> Option<&BlockDescriptor> {
        self.blocks.iter().find(|b| b.block_type == Some(block_type))
    }
}
