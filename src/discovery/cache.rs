//! Incremental per-file discovery cache.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

use tracing::{debug, trace};

use crate::discovery::correlate::correlate;
use crate::discovery::fs::{FsReader, SourceReader};
use crate::discovery::TestClass;
use crate::error::Result;
use crate::parser::TSqlGateway;
use crate::scanner::{CodeScanner, FileScanner, ScanResults};

/// Tracks a modification stamp per submitted file and keeps the correlated
/// hierarchy cached between changes. Stamps are never evicted, only
/// updated. Not internally synchronized: callers wrap the whole
/// submit/correlate sequence in one critical section (see
/// [`crate::discovery::TestDiscoverer`]).
pub struct TestCache {
    scanner: Box<dyn CodeScanner>,
    reader: Box<dyn SourceReader>,
    stamps: HashMap<PathBuf, SystemTime>,
    results: ScanResults,
    tests: Vec<TestClass>,
    dirty: bool,
}

impl TestCache {
    pub fn new() -> Self {
        Self::with_parts(
            Box::new(FileScanner::new(TSqlGateway::new())),
            Box::new(FsReader),
        )
    }

    pub fn with_parts(scanner: Box<dyn CodeScanner>, reader: Box<dyn SourceReader>) -> Self {
        Self {
            scanner,
            reader,
            stamps: HashMap::new(),
            results: ScanResults::new(),
            tests: Vec::new(),
            dirty: true,
        }
    }

    /// Submits a file for discovery. The file is re-scanned and merged when
    /// it is unseen or its stamp has not advanced past the recorded one;
    /// the recorded stamp is refreshed on every call. Read and stat
    /// failures abort the whole call.
    pub fn add_path(&mut self, path: &Path) -> Result<()> {
        let stamp = self.reader.last_write_time(path)?;
        let advanced = self
            .stamps
            .get(path)
            .is_some_and(|previous| stamp > *previous);
        self.stamps.insert(path.to_path_buf(), stamp);

        if advanced {
            trace!(path = %path.display(), "stamp advanced past the recorded one, not re-scanning");
            return Ok(());
        }

        let code = self.reader.read_all(path)?;
        self.scanner.scan_code(&code, &mut self.results, path);
        self.dirty = true;
        debug!(path = %path.display(), "merged scan results");
        Ok(())
    }

    /// Returns the correlated hierarchy. When nothing was merged since the
    /// last call this is a cached read; otherwise the hierarchy is rebuilt
    /// from the full observation set, which is then cleared so stale
    /// entries cannot leak into the next read.
    pub fn get_tests(&mut self) -> &[TestClass] {
        if !self.dirty {
            return &self.tests;
        }

        self.tests = correlate(&self.results);
        self.results = ScanResults::new();
        self.dirty = false;
        &self.tests
    }
}

impl Default for TestCache {
    fn default() -> Self {
        Self::new()
    }
}
