//! File-level conversion.
//!
//! ```no_run
//! use seqconv::convert::{convert, ConvertOptions};
//! use seqconv::container::Family;
//!
//! let opts = ConvertOptions { family: Some(Family::F), export_labels: true, ..Default::default() };
//! convert("in.bcseq".as_ref(), "out.bfseq".as_ref(), &opts)?;
//! # Ok::<(), seqconv::SeqError>(())
//! ```
//!
//! Inputs are read whole before anything is written.  Outputs (the container
//! and its optional label sidecar) are staged as temporary files in the
//! destination directory and persisted only once all of them are written, so
//! a failed conversion leaves nothing at the output paths.

use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;

use crate::container::{Family, SequenceContainer};
use crate::endian::ByteOrder;
use crate::error::Result;
use crate::header::Header;
use crate::label;
use crate::version::Version;

/// Output settings for [`convert`].
#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    /// Target family; the input's family when `None`.
    pub family: Option<Family>,
    /// Target byte order; the family's default when `None`.
    pub byte_order: Option<ByteOrder>,
    /// Target version; 1.0.0 when `None`.
    pub version: Option<Version>,
    /// Also write `<stem>Labels.txt` next to the output.
    pub export_labels: bool,
}

impl ConvertOptions {
    pub fn apply(&self, container: &mut SequenceContainer) {
        let family = self.family.unwrap_or(container.family);
        container.family = family;
        container.byte_order = self.byte_order.unwrap_or_else(|| family.default_byte_order());
        container.version = self.version.unwrap_or_default();
    }
}

/// Outcome of a successful [`convert`].
#[derive(Debug, Clone)]
pub struct ConvertReport {
    pub output: PathBuf,
    pub bytes_written: u64,
    pub labels_path: Option<PathBuf>,
}

pub fn load(path: &Path) -> Result<SequenceContainer> {
    let bytes = fs::read(path)?;
    SequenceContainer::read(&bytes)
}

/// Parse only the header; works for all three header kinds.
pub fn inspect(path: &Path) -> Result<Header> {
    let bytes = fs::read(path)?;
    Header::read(&bytes)
}

/// Serialize and commit atomically.  Returns the number of bytes written.
pub fn store(container: &SequenceContainer, path: &Path) -> Result<u64> {
    let bytes = container.to_bytes()?;
    commit(stage(path, &bytes)?, path)?;
    Ok(bytes.len() as u64)
}

/// Sidecar path: `<dir>/<stem>Labels.txt`.
pub fn labels_path(output: &Path) -> PathBuf {
    let stem = output.file_stem().map(|s| s.to_string_lossy().into_owned()).unwrap_or_default();
    output.with_file_name(format!("{stem}Labels.txt"))
}

pub fn export_labels(container: &SequenceContainer, path: &Path) -> Result<()> {
    commit(stage(path, label::to_text(&container.labels).as_bytes())?, path)
}

pub fn convert(input: &Path, output: &Path, opts: &ConvertOptions) -> Result<ConvertReport> {
    let mut container = load(input)?;
    opts.apply(&mut container);
    log::info!(
        "converting {} -> {} ({}, {}, v{})",
        input.display(),
        output.display(),
        container.family,
        container.byte_order,
        container.version
    );

    let bytes = container.to_bytes()?;
    let staged_output = stage(output, &bytes)?;
    let sidecar = if opts.export_labels {
        let path = labels_path(output);
        let staged = stage(&path, label::to_text(&container.labels).as_bytes())?;
        Some((path, staged))
    } else {
        None
    };

    // Every file is fully written at this point; only the renames remain.
    commit(staged_output, output)?;
    let labels_path = match sidecar {
        Some((path, staged)) => {
            if let Err(e) = commit(staged, &path) {
                if let Err(cleanup) = fs::remove_file(output) {
                    log::warn!("could not remove {} after failed sidecar write: {cleanup}", output.display());
                }
                return Err(e);
            }
            Some(path)
        }
        None => None,
    };
    Ok(ConvertReport { output: output.to_path_buf(), bytes_written: bytes.len() as u64, labels_path })
}

/// Write `bytes` to a synced temporary file next to `path`.
fn stage(path: &Path, bytes: &[u8]) -> Result<NamedTempFile> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    let mut tmp = NamedTempFile::new_in(dir)?;
    tmp.write_all(bytes)?;
    tmp.as_file().sync_all()?;
    Ok(tmp)
}

fn commit(tmp: NamedTempFile, path: &Path) -> Result<()> {
    tmp.persist(path).map_err(|e| e.error)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sidecar_name() {
        assert_eq!(labels_path(Path::new("out/song.bfseq")), PathBuf::from("out/songLabels.txt"));
        assert_eq!(labels_path(Path::new("song.bcseq")), PathBuf::from("songLabels.txt"));
    }

    #[test]
    fn export_labels_writes_sidecar_text() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("songLabels.txt");
        let mut c = SequenceContainer::new(Family::C);
        c.labels = label::LabelTable::from_pairs([("start", 4)]).unwrap();
        export_labels(&c, &path).unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "start: 4\n");
    }

    #[test]
    fn options_defaults() {
        let mut c = SequenceContainer::new(Family::F);
        c.version = Version::new(3, 0, 0);
        ConvertOptions { family: Some(Family::C), ..Default::default() }.apply(&mut c);
        assert_eq!(c.family, Family::C);
        assert_eq!(c.byte_order, ByteOrder::Little);
        assert_eq!(c.version, Version::new(1, 0, 0));

        let opts = ConvertOptions {
            byte_order: Some(ByteOrder::Little),
            version: Some(Version::new(2, 1, 0)),
            ..Default::default()
        };
        opts.apply(&mut c);
        assert_eq!(c.family, Family::C);
        assert_eq!(c.version, Version::new(2, 1, 0));
    }
}
