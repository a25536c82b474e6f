//! Production gateway over the `sqlparser` crate.
//!
//! All `sqlparser` types stay inside this module; the rest of the crate
//! works with the narrow statement model from [`super`]. A fresh parse is
//! run per batch, so the gateway carries no state and is freely shareable
//! across threads.

use sqlparser::ast::{
    BinaryOperator, Expr, Ident, ObjectName, ObjectNamePart, SchemaName, Spanned, Statement, Value,
};
use sqlparser::dialect::MsSqlDialect;
use sqlparser::parser::Parser;
use sqlparser::tokenizer::Span;
use tracing::trace;

use super::{CallArg, ParseOutcome, QualifiedName, SourcePosition, SqlParser, SqlStatement, SyntaxIssue};

#[derive(Debug, Default)]
pub struct TSqlGateway;

impl TSqlGateway {
    pub fn new() -> Self {
        Self
    }
}

impl SqlParser for TSqlGateway {
    fn parse(&self, batch: &str) -> ParseOutcome {
        let dialect = MsSqlDialect {};
        let parsed = match Parser::parse_sql(&dialect, batch) {
            Ok(statements) => statements,
            Err(err) => {
                trace!("batch rejected by grammar: {err}");
                return ParseOutcome {
                    statements: Vec::new(),
                    issues: vec![SyntaxIssue {
                        message: err.to_string(),
                    }],
                };
            }
        };

        let mut outcome = ParseOutcome::default();
        for statement in &parsed {
            map_statement(statement, batch, &mut outcome.statements);
        }
        outcome
    }
}

fn map_statement(statement: &Statement, batch: &str, out: &mut Vec<SqlStatement>) {
    match statement {
        Statement::CreateProcedure { name, .. } => {
            if let Some(qualified) = qualified_name(name) {
                let position = statement_position(statement, name, batch);
                out.push(SqlStatement::ProcedureCreation {
                    name: qualified,
                    position,
                });
            }
        }
        Statement::CreateSchema { schema_name, .. } => {
            if let Some(name) = schema_base_name(schema_name) {
                out.push(SqlStatement::SchemaCreation { name });
            }
        }
        Statement::Execute {
            name, parameters, ..
        } => {
            // Calls without a resolved procedure reference (EXECUTE of a
            // string expression) carry nothing discovery can use.
            let Some(name) = name else { return };
            if let Some(target) = qualified_name(name) {
                let args = parameters.iter().map(call_arg).collect();
                out.push(SqlStatement::ProcedureCall { target, args });
            }
        }
        _ => {}
    }
}

fn part_ident(part: &ObjectNamePart) -> Option<&Ident> {
    match part {
        ObjectNamePart::Identifier(ident) => Some(ident),
        #[allow(unreachable_patterns)]
        _ => None,
    }
}

/// Schema = second-to-last part, object = last part. The parser has
/// already stripped bracket quoting from identifier values.
fn qualified_name(name: &ObjectName) -> Option<QualifiedName> {
    let idents: Vec<&Ident> = name.0.iter().filter_map(part_ident).collect();
    let object = idents.last()?;
    if object.value.is_empty() {
        return None;
    }
    let schema = (idents.len() >= 2).then(|| idents[idents.len() - 2].value.clone());
    Some(QualifiedName {
        schema,
        object: object.value.clone(),
    })
}

fn schema_base_name(schema: &SchemaName) -> Option<String> {
    match schema {
        SchemaName::Simple(name) => last_ident_value(name),
        SchemaName::NamedAuthorization(name, _) => last_ident_value(name),
        SchemaName::UnnamedAuthorization(_) => None,
    }
}

fn last_ident_value(name: &ObjectName) -> Option<String> {
    name.0
        .iter()
        .filter_map(part_ident)
        .last()
        .map(|ident| ident.value.clone())
}

/// Anchors the statement at its reported span, falling back to the span of
/// its name identifiers when the statement kind carries no span of its own.
fn statement_position(statement: &Statement, name: &ObjectName, batch: &str) -> SourcePosition {
    let mut span = statement.span();
    if is_empty_span(span) {
        span = name.span();
    }
    if is_empty_span(span) {
        return SourcePosition {
            offset: 0,
            line: 1,
            length: batch.len(),
        };
    }
    let offset = offset_at(batch, span.start.line, span.start.column);
    let end = offset_at(batch, span.end.line, span.end.column);
    SourcePosition {
        offset,
        line: span.start.line as usize,
        length: end.saturating_sub(offset),
    }
}

fn is_empty_span(span: Span) -> bool {
    span.start.line == 0
}

/// Converts a 1-based line/column location into a byte offset within the
/// batch text, clamped to its length.
fn offset_at(text: &str, line: u64, column: u64) -> usize {
    let column = column.saturating_sub(1) as usize;
    if line <= 1 {
        return column.min(text.len());
    }
    let mut newlines = 0u64;
    for (idx, byte) in text.bytes().enumerate() {
        if byte == b'\n' {
            newlines += 1;
            if newlines == line - 1 {
                return (idx + 1 + column).min(text.len());
            }
        }
    }
    text.len()
}

/// `@param = <expr>` surfaces as a named argument; anything else is
/// positional. Only string literals produce a value.
fn call_arg(expr: &Expr) -> CallArg {
    if let Expr::BinaryOp {
        left,
        op: BinaryOperator::Eq,
        right,
    } = expr
    {
        if let Expr::Identifier(ident) = left.as_ref() {
            if ident.value.starts_with('@') {
                return CallArg {
                    name: Some(ident.value.clone()),
                    value: literal_string(right),
                };
            }
        }
    }
    CallArg {
        name: None,
        value: literal_string(expr),
    }
}

fn literal_string(expr: &Expr) -> Option<String> {
    match expr {
        Expr::Value(value) => match &value.value {
            Value::SingleQuotedString(text) | Value::NationalStringLiteral(text) => {
                Some(text.clone())
            }
            _ => None,
        },
        _ => None,
    }
}
