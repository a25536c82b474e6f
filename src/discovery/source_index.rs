//! Source location lookup for tests discovered without location data.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use tracing::{info, warn};
use walkdir::WalkDir;

use crate::discovery::fs::{FsReader, SourceReader};
use crate::parser::{SqlParser, SqlStatement, TSqlGateway};
use crate::scanner::batch::split_batches;

const SQL_EXTENSION: &str = "sql";
const DEFAULT_SCHEMA: &str = "dbo";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceLocation {
    pub schema: String,
    pub procedure: String,
    pub path: PathBuf,
    pub line: usize,
}

/// Maps `(schema, procedure)` to a source file and line, built by an
/// independent scan of declared root folders. Consulted when tests arrive
/// through a channel that has no location information of its own (compiled
/// artifacts such as DACPACs); a lookup miss leaves the caller to fall back
/// to a coarser location.
pub struct SourceLocationIndex {
    parser: Box<dyn SqlParser>,
    reader: Box<dyn SourceReader>,
    locations: HashMap<String, SourceLocation>,
}

impl SourceLocationIndex {
    pub fn new() -> Self {
        Self::with_parts(Box::new(TSqlGateway::new()), Box::new(FsReader))
    }

    pub fn with_parts(parser: Box<dyn SqlParser>, reader: Box<dyn SourceReader>) -> Self {
        Self {
            parser,
            reader,
            locations: HashMap::new(),
        }
    }

    /// Walks each root recursively for `.sql` files and indexes every test
    /// procedure found. Unlike the primary cache, a file that cannot be
    /// read is only logged: this channel is best-effort.
    pub fn build(&mut self, roots: &[PathBuf]) {
        if roots.is_empty() {
            warn!("no source folders provided to build the location index");
            return;
        }

        for root in roots {
            if !root.is_dir() {
                warn!(root = %root.display(), "source folder does not exist or is not a directory");
                continue;
            }
            for entry in WalkDir::new(root)
                .into_iter()
                .filter_map(|entry| entry.ok())
            {
                if !entry.file_type().is_file() || !is_sql_file(entry.path()) {
                    continue;
                }
                if let Err(err) = self.index_file(entry.path()) {
                    warn!(path = %entry.path().display(), "skipping unreadable file: {err}");
                }
            }
        }

        info!(indexed = self.locations.len(), "source location index built");
    }

    fn index_file(&mut self, path: &Path) -> crate::error::Result<()> {
        let code = self.reader.read_all(path)?;
        for batch in split_batches(&code) {
            let outcome = self.parser.parse(&batch.text);
            for statement in &outcome.statements {
                let SqlStatement::ProcedureCreation { name, position } = statement else {
                    continue;
                };
                if !name.object.to_lowercase().starts_with("test") {
                    continue;
                }
                let schema = name
                    .schema
                    .clone()
                    .unwrap_or_else(|| DEFAULT_SCHEMA.to_string());
                let location = SourceLocation {
                    schema: schema.clone(),
                    procedure: name.object.clone(),
                    path: path.to_path_buf(),
                    line: batch.line_offset + position.line,
                };
                // last write wins, mirroring scan order
                self.locations
                    .insert(location_key(&schema, &name.object), location);
            }
        }
        Ok(())
    }

    pub fn locate(&self, schema: &str, procedure: &str) -> Option<&SourceLocation> {
        self.locations.get(&location_key(schema, procedure))
    }

    /// Resolves to the indexed location, or to `(fallback, 1)` when the
    /// index has never seen the procedure.
    pub fn resolve_or(&self, schema: &str, procedure: &str, fallback: &Path) -> (PathBuf, usize) {
        match self.locate(schema, procedure) {
            Some(location) => (location.path.clone(), location.line),
            None => (fallback.to_path_buf(), 1),
        }
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

impl Default for SourceLocationIndex {
    fn default() -> Self {
        Self::new()
    }
}

fn is_sql_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case(SQL_EXTENSION))
}

fn location_key(schema: &str, procedure: &str) -> String {
    format!("{schema}.{procedure}").to_lowercase()
}
