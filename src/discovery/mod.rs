//! Discovery driver: the class/test model, the incremental cache, and the
//! host-facing entry point.

pub mod cache;
pub mod correlate;
pub mod filter;
pub mod fs;
pub mod source_index;

use std::path::PathBuf;
use std::sync::{Mutex, PoisonError};

use serde::Serialize;
use tracing::{debug, info};

use crate::error::Result;

pub use cache::TestCache;
pub use filter::PathFilter;
pub use source_index::{SourceLocation, SourceLocationIndex};

/// A schema that qualified as a test class, with its tests in scan order.
/// Always derived fresh from the full observation set, never patched
/// incrementally.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestClass {
    pub name: String,
    pub path: PathBuf,
    pub tests: Vec<Test>,
}

/// A single test procedure. `line` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Test {
    pub name: String,
    pub path: PathBuf,
    pub line: usize,
}

/// Host-facing record for one discovered test.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TestCaseRecord {
    pub full_name: String,
    pub path: PathBuf,
    pub line: usize,
}

/// Discovery entry point shared with the host.
///
/// The cache sits behind an explicit mutex and the entire
/// submit-paths/correlate/clear sequence runs as one critical section, so
/// concurrent discovery calls always observe a hierarchy consistent with
/// the aggregate that produced it.
pub struct TestDiscoverer {
    cache: Mutex<TestCache>,
    filter: PathFilter,
}

impl TestDiscoverer {
    pub fn new() -> Self {
        Self::with_cache(TestCache::new(), PathFilter::default())
    }

    pub fn with_cache(cache: TestCache, filter: PathFilter) -> Self {
        Self {
            cache: Mutex::new(cache),
            filter,
        }
    }

    /// Submits every admitted source path and returns the discovered tests
    /// as host records. Paths rejected by a non-empty include filter are
    /// never submitted to the cache at all. An unreadable file aborts the
    /// whole call.
    pub fn discover(&self, sources: &[PathBuf]) -> Result<Vec<TestCaseRecord>> {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);

        for source in sources {
            if !self.filter.admits(source) {
                debug!(path = %source.display(), "path excluded by include filter");
                continue;
            }
            cache.add_path(source)?;
        }

        let records: Vec<TestCaseRecord> = cache
            .get_tests()
            .iter()
            .flat_map(|class| {
                class.tests.iter().map(move |test| TestCaseRecord {
                    full_name: format!("{}.{}", class.name, test.name),
                    path: test.path.clone(),
                    line: test.line,
                })
            })
            .collect();

        info!(count = records.len(), "discovery finished");
        Ok(records)
    }

    /// Snapshot of the correlated hierarchy.
    pub fn classes(&self) -> Vec<TestClass> {
        let mut cache = self.cache.lock().unwrap_or_else(PoisonError::into_inner);
        cache.get_tests().to_vec()
    }
}

impl Default for TestDiscoverer {
    fn default() -> Self {
        Self::new()
    }
}
