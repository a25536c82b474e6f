//! Filesystem access used by discovery. Swappable so tests can fake file
//! contents and modification stamps.

use std::fs;
use std::path::Path;
use std::time::SystemTime;

use crate::error::{Error, Result};

pub trait SourceReader: Send + Sync {
    fn read_all(&self, path: &Path) -> Result<String>;
    fn last_write_time(&self, path: &Path) -> Result<SystemTime>;
}

#[derive(Debug, Default)]
pub struct FsReader;

impl SourceReader for FsReader {
    fn read_all(&self, path: &Path) -> Result<String> {
        fs::read_to_string(path).map_err(|source| Error::read(path, source))
    }

    fn last_write_time(&self, path: &Path) -> Result<SystemTime> {
        fs::metadata(path)
            .and_then(|metadata| metadata.modified())
            .map_err(|source| Error::stat(path, source))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_all_missing_file_is_an_error() {
        let reader = FsReader;
        let err = reader
            .read_all(Path::new("/definitely/not/here.sql"))
            .unwrap_err();
        assert!(matches!(err, Error::Read { .. }));
    }

    #[test]
    fn test_last_write_time_missing_file_is_an_error() {
        let reader = FsReader;
        let err = reader
            .last_write_time(Path::new("/definitely/not/here.sql"))
            .unwrap_err();
        assert!(matches!(err, Error::Stat { .. }));
    }

    #[test]
    fn test_reads_real_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.sql");
        std::fs::write(&path, "select 1;").unwrap();

        let reader = FsReader;
        assert_eq!(reader.read_all(&path).unwrap(), "select 1;");
        assert!(reader.last_write_time(&path).is_ok());
    }
}
