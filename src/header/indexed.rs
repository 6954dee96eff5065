use std::io::{Cursor, Seek, Write};

use super::{BlockDescriptor, Header, HeaderKind};
use crate::endian::{align_up, pad_to, read_magic, read_u16, read_u32, write_u16, write_u32, ByteOrder, ALIGNMENT};
use crate::error::{Result, SeqError};
use crate::version::Version;

const FIXED_SIZE: u64 = 0x10;
const ENTRY_SIZE: u64 = 8;

pub(super) fn header_size(block_count: usize) -> Result<u16> {
    let raw = FIXED_SIZE + ENTRY_SIZE * block_count as u64;
    u16::try_from(align_up(raw, ALIGNMENT)).map_err(|_| SeqError::TooManyBlocks(block_count))
}

pub(super) fn read(bytes: &[u8]) -> Result<Header> {
    let available = bytes.len() as u64;
    SeqError::ensure_available("indexed header", 0, FIXED_SIZE, available)?;
    let mut r = Cursor::new(bytes);
    let magic = read_magic(&mut r)?;
    let byte_order = ByteOrder::from_bom([bytes[4], bytes[5]])?;
    r.set_position(6);
    let version = Version::from_u16(read_u16(&mut r, byte_order)?);
    let file_size = read_u32(&mut r, byte_order)?;
    let header_size = read_u16(&mut r, byte_order)?;
    let count = read_u16(&mut r, byte_order)?;

    SeqError::ensure_available("block table", FIXED_SIZE, ENTRY_SIZE * count as u64, available)?;
    let mut blocks = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let offset = read_u32(&mut r, byte_order)?;
        let size = read_u32(&mut r, byte_order)?;
        blocks.push(BlockDescriptor { block_type: None, offset, size });
    }

    Ok(Header { kind: HeaderKind::Indexed, magic, byte_order, version, file_size, header_size, blocks })
}

pub(super) fn write<W: Write + Seek>(header: &Header, w: &mut W) -> Result<()> {
    let order = header.byte_order;
    let size = header_size(header.blocks.len())?;
    let count = u16::try_from(header.blocks.len()).map_err(|_| SeqError::TooManyBlocks(header.blocks.len()))?;

    w.write_all(&header.magic)?;
    w.write_all(&order.bom_bytes())?;
    write_u16(w, order, header.version.to_u16())?;
    write_u32(w, order, header.file_size)?;
    write_u16(w, order, size)?;
    write_u16(w, order, count)?;
    for block in &header.blocks {
        write_u32(w, order, block.offset)?;
        write_u32(w, order, block.size)?;
    }
    pad_to(w, ALIGNMENT)?;
    Ok(())
}
