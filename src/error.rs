use std::io;
use thiserror::Error;

/// Coarse classification of a [`SeqError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Unrecognized magic, byte-order mark or block type tag.
    Format,
    /// A declared size runs past the end of the input.
    Truncation,
    /// A structural limit was violated (duplicate label, too many blocks, overflow).
    Constraint,
    /// Underlying I/O failure.
    Io,
}

#[derive(Error, Debug)]
pub enum SeqError {
    #[error("Unrecognized magic {0:?}")]
    UnknownMagic(String),
    #[error("Unrecognized byte-order mark 0x{0:04X}")]
    InvalidBom(u16),
    #[error("Unrecognized block type 0x{0:04X}")]
    UnknownBlockType(u16),
    #[error("Block at 0x{offset:X} has magic {found:?}, expected {expected:?}")]
    BlockMagicMismatch { offset: u64, expected: String, found: String },
    #[error("Block at 0x{offset:X} is 0x{frame:X} bytes but the header says 0x{declared:X}")]
    BlockSizeMismatch { offset: u64, declared: u32, frame: u32 },
    #[error("Missing {0} block")]
    MissingBlock(&'static str),
    #[error("Header lists more than one {0} block")]
    DuplicateBlock(&'static str),
    #[error("Label name must be printable ASCII without ':' or surrounding spaces: {0:?}")]
    InvalidLabelName(String),
    #[error("Malformed label sidecar line {line}: {text:?}")]
    InvalidLabelLine { line: usize, text: String },
    #[error("{what} needs {needed} bytes at 0x{offset:X}, only {available} available")]
    Truncated { what: &'static str, offset: u64, needed: u64, available: u64 },
    #[error("Duplicate label name '{0}'")]
    DuplicateLabel(String),
    #[error("Block count {0} does not fit in the header")]
    TooManyBlocks(usize),
    #[error("{0} does not fit in its on-disk field")]
    Overflow(&'static str),
    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

impl SeqError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SeqError::UnknownMagic(_)
            | SeqError::InvalidBom(_)
            | SeqError::UnknownBlockType(_)
            | SeqError::BlockMagicMismatch { .. }
            | SeqError::BlockSizeMismatch { .. }
            | SeqError::MissingBlock(_)
            | SeqError::DuplicateBlock(_)
            | SeqError::InvalidLabelLine { .. } => ErrorKind::Format,
            SeqError::Truncated { .. } => ErrorKind::Truncation,
            SeqError::InvalidLabelName(_)
            | SeqError::DuplicateLabel(_)
            | SeqError::TooManyBlocks(_)
            | SeqError::Overflow(_) => ErrorKind::Constraint,
            SeqError::Io(_) => ErrorKind::Io,
        }
    }

    /// Fail with [`SeqError::Truncated`] unless `offset + needed <= available`.
    pub(crate) fn ensure_available(
        what: &'static str,
        offset: u64,
        needed: u64,
        available: u64,
    ) -> Result<()> {
        match offset.checked_add(needed) {
            Some(end) if end <= available => Ok(()),
            _ => Err(SeqError::Truncated { what, offset, needed, available }),
        }
    }
}

pub type Result<T> = std::result::Result<T, SeqError>;

/// Render a 4-byte tag for messages, escaping anything non-printable.
pub(crate) fn magic_text(magic: &[u8; 4]) -> String {
    magic.iter().flat_map(|b| std::ascii::escape_default(*b)).map(char::from).collect()
}
