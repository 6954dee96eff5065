//! 8-byte references (`identifier:u16, reserved:u16, offset:i32`), written
//! with [`reserve`] and patched later by [`Reservation::close`].

use std::io::{self, Read, Seek, SeekFrom, Write};

use crate::endian::{read_i32, read_u16, write_i32, write_u16, ByteOrder};
use crate::error::{Result, SeqError};

pub const REFERENCE_SIZE: u64 = 8;
pub const NULL_IDENTIFIER: u16 = 0;
pub const NULL_OFFSET: i32 = -1;

/// Which in-memory offset means "no target".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullPolicy {
    Zero,
    NegativeOne,
}

impl NullPolicy {
    pub fn sentinel(self) -> i32 {
        match self {
            NullPolicy::Zero => 0,
            NullPolicy::NegativeOne => -1,
        }
    }

    pub fn is_null(self, offset: i32) -> bool {
        offset == self.sentinel()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Reference {
    pub identifier: u16,
    pub offset: i32,
}

impl Reference {
    pub const NULL: Reference = Reference { identifier: NULL_IDENTIFIER, offset: NULL_OFFSET };

    pub fn new(identifier: u16, offset: i32) -> Self {
        Self { identifier, offset }
    }

    pub fn read<R: Read>(r: &mut R, order: ByteOrder) -> io::Result<Self> {
        let identifier = read_u16(r, order)?;
        let _reserved = read_u16(r, order)?;
        let offset = read_i32(r, order)?;
        Ok(Self { identifier, offset })
    }

    /// Write the record, collapsing it to the canonical null pattern when the
    /// offset equals `policy`'s sentinel.
    pub fn write<W: Write>(&self, w: &mut W, order: ByteOrder, policy: NullPolicy) -> io::Result<()> {
        let record = if policy.is_null(self.offset) { Reference::NULL } else { *self };
        write_u16(w, order, record.identifier)?;
        write_u16(w, order, 0)?;
        write_i32(w, order, record.offset)
    }

    /// True for the on-disk null pattern.
    pub fn is_null(&self) -> bool {
        *self == Reference::NULL
    }

    /// Absolute position of the target, or `None` for a null reference or one
    /// that points before position zero.
    pub fn resolve(&self, base: u64) -> Option<u64> {
        if self.is_null() {
            return None;
        }
        base.checked_add_signed(self.offset as i64)
    }
}

/// Placeholder slot produced by [`reserve`], consumed by [`Reservation::close`].
#[derive(Debug)]
#[must_use = "a reserved reference must be closed or the slot stays zeroed"]
pub struct Reservation {
    slot: u64,
    base: u64,
}

/// Emit an 8-byte placeholder at the current position.  `base` is the
/// position the eventual offset is measured from.
pub fn reserve<W: Write + Seek>(w: &mut W, base: u64) -> io::Result<Reservation> {
    let slot = w.stream_position()?;
    w.write_all(&[0u8; REFERENCE_SIZE as usize])?;
    Ok(Reservation { slot, base })
}

impl Reservation {
    pub fn slot(&self) -> u64 {
        self.slot
    }

    /// Point the reserved slot at the current cursor position.
    pub fn close<W: Write + Seek>(
        self,
        w: &mut W,
        order: ByteOrder,
        identifier: u16,
        policy: NullPolicy,
    ) -> Result<Reference> {
        let target = w.stream_position()?;
        let relative = target
            .checked_sub(self.base)
            .and_then(|d| i32::try_from(d).ok())
            .ok_or(SeqError::Overflow("reference offset"))?;
        let reference = Reference::new(identifier, relative);
        self.close_with(w, order, reference, policy)?;
        Ok(reference)
    }

    /// Patch the slot with an explicit record, then return to the end of the
    /// stream.  Offsets equal to the policy's sentinel become the null record.
    pub fn close_with<W: Write + Seek>(
        self,
        w: &mut W,
        order: ByteOrder,
        reference: Reference,
        policy: NullPolicy,
    ) -> io::Result<()> {
        w.seek(SeekFrom::Start(self.slot))?;
        reference.write(w, order, policy)?;
        w.seek(SeekFrom::End(0))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn encode(reference: Reference, order: ByteOrder, policy: NullPolicy) -> Vec<u8> {
        let mut out = Vec::new();
        reference.write(&mut out, order, policy).unwrap();
        out
    }

    #[test]
    fn record_layout() {
        let bytes = encode(Reference::new(0x5100, 0x14), ByteOrder::Big, NullPolicy::NegativeOne);
        assert_eq!(bytes, [0x51, 0x00, 0, 0, 0, 0, 0, 0x14]);
        let bytes = encode(Reference::new(0x5100, 0x14), ByteOrder::Little, NullPolicy::NegativeOne);
        assert_eq!(bytes, [0x00, 0x51, 0, 0, 0x14, 0, 0, 0]);
    }

    #[test]
    fn null_sentinel_serializes_canonically_under_both_policies() {
        let canonical = [0, 0, 0, 0, 0xFF, 0xFF, 0xFF, 0xFF];
        let zero = encode(Reference::new(0x5100, 0), ByteOrder::Big, NullPolicy::Zero);
        let minus_one = encode(Reference::new(0x5100, -1), ByteOrder::Big, NullPolicy::NegativeOne);
        assert_eq!(zero, canonical);
        assert_eq!(minus_one, canonical);
    }

    #[test]
    fn zero_offset_is_valid_under_negative_one_policy() {
        let bytes = encode(Reference::new(0x5100, 0), ByteOrder::Big, NullPolicy::NegativeOne);
        assert_eq!(bytes, [0x51, 0x00, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn reserve_then_close_backpatches() {
        let mut c = Cursor::new(Vec::new());
        c.write_all(&[0xEE; 4]).unwrap();
        let res = reserve(&mut c, 4).unwrap();
        assert_eq!(res.slot(), 4);
        c.write_all(&[0xAB; 6]).unwrap();
        let reference = res.close(&mut c, ByteOrder::Big, 0x5100, NullPolicy::NegativeOne).unwrap();
        assert_eq!(reference, Reference::new(0x5100, 14));
        assert_eq!(c.position(), 18);
        c.write_all(&[0xCD]).unwrap();

        let bytes = c.into_inner();
        assert_eq!(bytes.len(), 19);
        let mut r = Cursor::new(&bytes[4..12]);
        let back = Reference::read(&mut r, ByteOrder::Big).unwrap();
        assert_eq!(back.resolve(4), Some(18));
        assert_eq!(bytes[18], 0xCD);
    }

    #[test]
    fn null_does_not_resolve() {
        assert_eq!(Reference::NULL.resolve(0x40), None);
        assert_eq!(Reference::new(1, -8).resolve(4), None);
        assert_eq!(Reference::new(1, -4).resolve(4), Some(0));
    }
}
