//! Version packing.
//!
//! A version is three unsigned bytes.  The typed header stores it in 32 bits
//! using one of two incompatible layouts, chosen by the header's family; the
//! indexed header stores only major/minor in 16 bits.  The layout is always
//! passed in by the caller.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
pub struct Version {
    pub major: u8,
    pub minor: u8,
    pub revision: u8,
}

/// 32-bit packing layouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VersionLayout {
    /// `major << 16 | minor << 8 | revision`.
    Primary,
    /// `major << 24 | minor << 16 | revision << 8`; the low byte is unused.
    Secondary,
}

impl Version {
    pub const fn new(major: u8, minor: u8, revision: u8) -> Self {
        Self { major, minor, revision }
    }

    pub fn to_u32(self, layout: VersionLayout) -> u32 {
        let (major, minor, revision) = (self.major as u32, self.minor as u32, self.revision as u32);
        match layout {
            VersionLayout::Primary => major << 16 | minor << 8 | revision,
            VersionLayout::Secondary => major << 24 | minor << 16 | revision << 8,
        }
    }

    pub fn from_u32(word: u32, layout: VersionLayout) -> Self {
        match layout {
            VersionLayout::Primary => Self::new(
                ((word & 0x00FF_0000) >> 16) as u8,
                ((word & 0x0000_FF00) >> 8) as u8,
                (word & 0x0000_00FF) as u8,
            ),
            VersionLayout::Secondary => Self::new(
                ((word & 0xFF00_0000) >> 24) as u8,
                ((word & 0x00FF_0000) >> 16) as u8,
                ((word & 0x0000_FF00) >> 8) as u8,
            ),
        }
    }

    /// 16-bit packing; the revision is dropped.
    pub fn to_u16(self) -> u16 {
        (self.major as u16) << 8 | self.minor as u16
    }

    pub fn from_u16(word: u16) -> Self {
        Self::new((word >> 8) as u8, (word & 0xFF) as u8, 0)
    }
}

impl Default for Version {
    fn default() -> Self {
        Self::new(1, 0, 0)
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.revision)
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum VersionParseError {
    #[error("expected MAJOR.MINOR.REVISION, got '{0}'")]
    Shape(String),
    #[error("version component '{0}' is not a number in 0..=255")]
    Component(String),
}

impl FromStr for Version {
    type Err = VersionParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split('.').collect();
        if parts.len() != 3 {
            return Err(VersionParseError::Shape(s.to_string()));
        }
        let component = |p: &str| p.parse::<u8>().map_err(|_| VersionParseError::Component(p.to_string()));
        Ok(Self::new(component(parts[0])?, component(parts[1])?, component(parts[2])?))
    }
}
