//! Block framing for the typed container.
//!
//! Each block starts with an 8-byte frame (`magic[4]`, `size:u32`) where
//! `size` covers frame, body and trailing padding.  Blocks are always padded
//! to [`ALIGNMENT`], so the next block starts on a 32-byte boundary.

use std::io::{Cursor, Seek, SeekFrom, Write};

use crate::endian::{pad_to, read_magic, read_u32, write_u32, ByteOrder, ALIGNMENT};
use crate::error::{magic_text, Result, SeqError};
use crate::header::BlockDescriptor;

pub const BLOCK_FRAME_SIZE: u64 = 8;
pub const DATA_MAGIC: [u8; 4] = *b"DATA";
pub const LABEL_MAGIC: [u8; 4] = *b"LABL";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum BlockType {
    Data = 0x5000,
    Label = 0x5001,
}

impl BlockType {
    pub fn tag(self) -> u16 {
        self as u16
    }

    pub fn magic(self) -> [u8; 4] {
        match self {
            BlockType::Data => DATA_MAGIC,
            BlockType::Label => LABEL_MAGIC,
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            BlockType::Data => "DATA",
            BlockType::Label => "LABL",
        }
    }
}

impl TryFrom<u16> for BlockType {
    type Error = SeqError;

    fn try_from(tag: u16) -> Result<Self> {
        match tag {
            0x5000 => Ok(BlockType::Data),
            0x5001 => Ok(BlockType::Label),
            other => Err(SeqError::UnknownBlockType(other)),
        }
    }
}

// ── Writing ──────────────────────────────────────────────────────────────────

/// A block whose frame has been emitted but whose size is not yet known.
#[derive(Debug)]
#[must_use = "an open block must be closed to fill in its size"]
pub struct OpenBlock {
    block_type: BlockType,
    start: u64,
}

/// Start a block at the current position, which must already be aligned.
pub fn open<W: Write + Seek>(w: &mut W, order: ByteOrder, block_type: BlockType) -> Result<OpenBlock> {
    let start = w.stream_position()?;
    debug_assert_eq!(start % ALIGNMENT, 0, "block start must be aligned");
    w.write_all(&block_type.magic())?;
    write_u32(w, order, 0)?;
    Ok(OpenBlock { block_type, start })
}

impl OpenBlock {
    /// Pad to the alignment boundary, patch the frame size and return the
    /// descriptor for the header's block table.
    pub fn close<W: Write + Seek>(self, w: &mut W, order: ByteOrder) -> Result<BlockDescriptor> {
        pad_to(w, ALIGNMENT)?;
        let end = w.stream_position()?;
        let size = u32::try_from(end - self.start).map_err(|_| SeqError::Overflow("block size"))?;
        let offset = u32::try_from(self.start).map_err(|_| SeqError::Overflow("block offset"))?;

        w.seek(SeekFrom::Start(self.start + 4))?;
        write_u32(w, order, size)?;
        w.seek(SeekFrom::Start(end))?;

        log::debug!("closed {} block at 0x{:X} ({} bytes)", self.block_type.name(), offset, size);
        Ok(BlockDescriptor { block_type: Some(self.block_type.tag()), offset, size })
    }
}

/// Write a data block: the payload verbatim, zero-padded to the boundary.
pub fn write_data<W: Write + Seek>(w: &mut W, order: ByteOrder, payload: &[u8]) -> Result<BlockDescriptor> {
    let block = open(w, order, BlockType::Data)?;
    w.write_all(payload)?;
    block.close(w, order)
}

// ── Reading ──────────────────────────────────────────────────────────────────

/// Body bytes of the block `desc` points at.  The frame size must agree with
/// the descriptor.
pub fn body<'a>(
    bytes: &'a [u8],
    desc: &BlockDescriptor,
    order: ByteOrder,
    block_type: BlockType,
) -> Result<&'a [u8]> {
    let available = bytes.len() as u64;
    let start = desc.offset as u64;
    SeqError::ensure_available("block frame", start, BLOCK_FRAME_SIZE, available)?;

    let mut r = Cursor::new(&bytes[start as usize..]);
    let magic = read_magic(&mut r)?;
    if magic != block_type.magic() {
        return Err(SeqError::BlockMagicMismatch {
            offset: start,
            expected: block_type.name().to_string(),
            found: magic_text(&magic),
        });
    }
    let frame = read_u32(&mut r, order)?;
    if frame != desc.size {
        return Err(SeqError::BlockSizeMismatch { offset: start, declared: desc.size, frame });
    }
    let size = frame as u64;
    if size < BLOCK_FRAME_SIZE {
        return Err(SeqError::Truncated { what: "block frame", offset: start, needed: BLOCK_FRAME_SIZE, available: size });
    }
    SeqError::ensure_available("block body", start, size, available)?;
    Ok(&bytes[(start + BLOCK_FRAME_SIZE) as usize..(start + size) as usize])
}

/// Strip write-time padding: drop trailing zero bytes.  A body that is all
/// zeros trims to empty.  Payloads that genuinely end in zero lose those bytes.
pub fn trim_padding(body: &[u8]) -> &[u8] {
    let end = body.iter().rposition(|&b| b != 0).map_or(0, |i| i + 1);
    &body[..end]
}
