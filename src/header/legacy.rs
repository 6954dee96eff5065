use std::io::{Cursor, Seek, Write};

use super::{BlockDescriptor, Header, HeaderKind};
use crate::endian::{read_magic, read_u16, read_u32, write_u16, write_u32, ByteOrder};
use crate::error::{Result, SeqError};
use crate::version::Version;

pub(super) const HEADER_SIZE: u16 = 0x10;
/// Value of the version field on disk; it never varies and is not decoded.
const CONSTANT_VERSION: u16 = 0x0100;

pub(super) fn read(bytes: &[u8]) -> Result<Header> {
    SeqError::ensure_available("legacy header", 0, HEADER_SIZE as u64, bytes.len() as u64)?;
    let mut r = Cursor::new(bytes);
    let magic = read_magic(&mut r)?;
    let byte_order = ByteOrder::from_bom([bytes[4], bytes[5]])?;
    r.set_position(6);
    let _constant = read_u16(&mut r, byte_order)?;
    let file_size = read_u32(&mut r, byte_order)?;
    let header_size = read_u16(&mut r, byte_order)?;
    let _reserved = read_u16(&mut r, byte_order)?;

    Ok(Header {
        kind: HeaderKind::Legacy,
        magic,
        byte_order,
        version: Version::from_u16(CONSTANT_VERSION),
        file_size,
        header_size,
        blocks: vec![BlockDescriptor {
            block_type: None,
            offset: HEADER_SIZE as u32,
            size: file_size.saturating_sub(HEADER_SIZE as u32),
        }],
    })
}

/// Legacy files are always emitted little-endian.
pub(super) fn write<W: Write + Seek>(header: &Header, w: &mut W) -> Result<()> {
    let order = ByteOrder::Little;
    w.write_all(&header.magic)?;
    w.write_all(&order.bom_bytes())?;
    write_u16(w, order, CONSTANT_VERSION)?;
    write_u32(w, order, header.file_size)?;
    write_u16(w, order, HEADER_SIZE)?;
    write_u16(w, order, 1)?;
    Ok(())
}
