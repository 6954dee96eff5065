pub mod error;
pub mod endian;
pub mod version;
pub mod reference;
pub mod header;
pub mod block;
pub mod label;
pub mod container;
pub mod convert;

pub use error::{ErrorKind, Result, SeqError};
pub use endian::ByteOrder;
pub use version::{Version, VersionLayout};
pub use header::{BlockDescriptor, Header, HeaderKind};
pub use label::{Label, LabelTable};
pub use container::{Family, Platform, SequenceContainer};
