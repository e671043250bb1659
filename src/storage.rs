//! Blob persistence
//!
//! Every persisted structure is one bincode blob behind a buffered
//! reader/writer. Blob names are derived from a caller-chosen prefix.

use std::ffi::OsString;
use std::fs::File;
use std::io::{self, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::{Error, Result};

/// `prefix` with `suffix` appended to its final component.
pub fn with_suffix(prefix: &Path, suffix: &str) -> PathBuf {
    let mut name = OsString::from(prefix.as_os_str());
    name.push(suffix);
    PathBuf::from(name)
}

pub fn write_blob<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    bincode::serialize_into(&mut writer, value)?;
    writer.flush()?;
    tracing::debug!(path = %path.display(), "blob written");
    Ok(())
}

pub fn read_blob<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let file = open_artifact(path)?;
    let value = bincode::deserialize_from(BufReader::new(file))?;
    tracing::debug!(path = %path.display(), "blob loaded");
    Ok(value)
}

/// Open an input file, reporting absence as [`Error::MissingArtifact`].
pub fn open_artifact(path: &Path) -> Result<File> {
    File::open(path).map_err(|e| missing_or_io(path, e))
}

/// Read a whole input file, reporting absence as [`Error::MissingArtifact`].
pub fn read_artifact(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).map_err(|e| missing_or_io(path, e))
}

fn missing_or_io(path: &Path, err: io::Error) -> Error {
    if err.kind() == io::ErrorKind::NotFound {
        Error::MissingArtifact(path.to_path_buf())
    } else {
        Error::Io(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_with_suffix() {
        let path = with_suffix(Path::new("/data/chr19"), "_pars_sa.bin");
        assert_eq!(path, PathBuf::from("/data/chr19_pars_sa.bin"));
    }

    #[test]
    fn test_blob_roundtrip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("blob.bin");

        write_blob(&path, &vec![3usize, 1, 4, 1, 5]).unwrap();
        let back: Vec<usize> = read_blob(&path).unwrap();
        assert_eq!(back, vec![3, 1, 4, 1, 5]);
    }

    #[test]
    fn test_missing_blob() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("absent.bin");

        let err = read_blob::<Vec<u8>>(&path).unwrap_err();
        assert!(matches!(err, Error::MissingArtifact(p) if p == path));
    }
}
