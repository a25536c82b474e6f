//! Source scanning: batch splitting, the statement walk, and the
//! per-scan observation accumulator.

pub mod batch;
pub mod visitor;

use std::path::{Path, PathBuf};

use tracing::debug;

use crate::parser::{QualifiedName, SqlParser};
use batch::split_batches;
use visitor::StatementVisitor;

/// A schema-creation statement seen in `path`, name as written (unquoted,
/// not normalized).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SchemaObservation {
    pub name: String,
    pub path: PathBuf,
}

/// A candidate test procedure: object name starts with `test`. Offsets and
/// line are file-absolute; `line` is 1-based.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProcedureObservation {
    pub name: QualifiedName,
    pub path: PathBuf,
    pub start_offset: usize,
    pub end_offset: usize,
    pub line: usize,
}

/// A schema tagged as a test class, via extended property or class
/// registration. Recorded but not consulted by correlation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TestClassMarker {
    pub schema: String,
    pub path: PathBuf,
}

/// Accumulated observations for one scan pass across any number of files.
#[derive(Debug, Default, Clone)]
pub struct ScanResults {
    pub schemas: Vec<SchemaObservation>,
    pub procedures: Vec<ProcedureObservation>,
    pub markers: Vec<TestClassMarker>,
}

impl ScanResults {
    pub fn new() -> Self {
        Self::default()
    }

    /// Concatenates another pass's observations onto this one. Nothing is
    /// deduplicated here: correlation needs every location.
    pub fn absorb(&mut self, other: ScanResults) {
        self.schemas.extend(other.schemas);
        self.procedures.extend(other.procedures);
        self.markers.extend(other.markers);
    }

    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty() && self.procedures.is_empty() && self.markers.is_empty()
    }
}

/// Scans raw SQL text into observations. Swappable so the cache can be
/// driven by a fake in tests.
pub trait CodeScanner: Send + Sync {
    fn scan_code(&self, code: &str, results: &mut ScanResults, path: &Path);
}

/// Splits a file into batches, parses each one, and walks the statements.
/// A batch the grammar rejects contributes whatever was salvaged (usually
/// nothing) and the scan moves on.
pub struct FileScanner<P: SqlParser> {
    parser: P,
}

impl<P: SqlParser> FileScanner<P> {
    pub fn new(parser: P) -> Self {
        Self { parser }
    }
}

impl<P: SqlParser> CodeScanner for FileScanner<P> {
    fn scan_code(&self, code: &str, results: &mut ScanResults, path: &Path) {
        for batch in split_batches(code) {
            let outcome = self.parser.parse(&batch.text);
            for issue in &outcome.issues {
                debug!(path = %path.display(), "batch failed to parse cleanly: {}", issue.message);
            }
            let visitor = StatementVisitor::new(path, batch.offset, batch.line_offset);
            results.absorb(visitor.scan(&outcome.statements));
        }
    }
}
