//! Statement model produced by the external grammar parser.
//!
//! The grammar library lives behind [`SqlParser`], so the rest of the
//! engine only ever sees the three statement kinds discovery cares about:
//! procedure creations, schema creations, and procedure calls. Everything
//! else a batch contains is dropped at this boundary.

mod tsql;

pub use tsql::TSqlGateway;

/// A possibly schema-qualified object name, unquoted as written.
/// An absent schema falls back to the source convention downstream and
/// never matches during correlation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QualifiedName {
    pub schema: Option<String>,
    pub object: String,
}

/// Position of a statement within the batch it was parsed from.
/// `offset` is a byte offset, `line` is 1-based.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourcePosition {
    pub offset: usize,
    pub line: usize,
    pub length: usize,
}

/// One argument of a procedure call. `name` is the `@param` label when the
/// call uses named form; `value` is the argument's string literal, if it
/// has one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallArg {
    pub name: Option<String>,
    pub value: Option<String>,
}

impl CallArg {
    pub fn named(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            value: Some(value.into()),
        }
    }

    pub fn positional(value: impl Into<String>) -> Self {
        Self {
            name: None,
            value: Some(value.into()),
        }
    }
}

/// The closed set of statement kinds the discovery walk dispatches over.
/// Calls are only surfaced when the parser resolved a procedure reference.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SqlStatement {
    ProcedureCreation {
        name: QualifiedName,
        position: SourcePosition,
    },
    SchemaCreation {
        name: String,
    },
    ProcedureCall {
        target: QualifiedName,
        args: Vec<CallArg>,
    },
}

/// A structural error reported by the grammar parser. Never fatal: the
/// scan records it and moves on to the next batch.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyntaxIssue {
    pub message: String,
}

/// Statements salvaged from one batch plus whatever errors the grammar
/// parser reported along the way.
#[derive(Debug, Default, Clone)]
pub struct ParseOutcome {
    pub statements: Vec<SqlStatement>,
    pub issues: Vec<SyntaxIssue>,
}

/// External grammar parser boundary. Tests substitute fakes; production
/// uses [`TSqlGateway`].
pub trait SqlParser: Send + Sync {
    fn parse(&self, batch: &str) -> ParseOutcome;
}
