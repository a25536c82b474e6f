//! Statement walk that turns one parsed batch into observations.

use std::path::Path;

use crate::parser::{CallArg, QualifiedName, SourcePosition, SqlStatement};
use crate::scanner::{ProcedureObservation, ScanResults, SchemaObservation, TestClassMarker};
use crate::utils::{contains_ignore_case, unquote};

const TEST_PREFIX: &str = "test";
const EXTENDED_PROPERTY_PROC: &str = "sp_addextendedproperty";
const TEST_CLASS_PROPERTY: &str = "tSQLt.TestClass";
const LEVEL0_NAME_ARG: &str = "@level0name";
const TSQLT_SCHEMA: &str = "tsqlt";
const NEW_TEST_CLASS_PROC: &str = "newtestclass";

/// Walks the statements of a single batch and emits the three observation
/// kinds. `offset`/`line_offset` are the batch's file-absolute bases.
pub struct StatementVisitor<'a> {
    path: &'a Path,
    offset: usize,
    line_offset: usize,
}

impl<'a> StatementVisitor<'a> {
    pub fn new(path: &'a Path, offset: usize, line_offset: usize) -> Self {
        Self {
            path,
            offset,
            line_offset,
        }
    }

    pub fn scan(&self, statements: &[SqlStatement]) -> ScanResults {
        let mut results = ScanResults::new();
        for statement in statements {
            self.visit(statement, &mut results);
        }
        results
    }

    fn visit(&self, statement: &SqlStatement, results: &mut ScanResults) {
        match statement {
            SqlStatement::ProcedureCreation { name, position } => {
                self.visit_procedure(name, position, results);
            }
            SqlStatement::SchemaCreation { name } => {
                results.schemas.push(SchemaObservation {
                    name: unquote(name).to_string(),
                    path: self.path.to_path_buf(),
                });
            }
            SqlStatement::ProcedureCall { target, args } => {
                self.visit_call(target, args, results);
            }
        }
    }

    fn visit_procedure(
        &self,
        name: &QualifiedName,
        position: &SourcePosition,
        results: &mut ScanResults,
    ) {
        let object = unquote(&name.object);
        if object.is_empty() || !object.to_lowercase().starts_with(TEST_PREFIX) {
            return;
        }
        let start = self.offset + position.offset;
        results.procedures.push(ProcedureObservation {
            name: QualifiedName {
                schema: name.schema.as_deref().map(|s| unquote(s).to_string()),
                object: object.to_string(),
            },
            path: self.path.to_path_buf(),
            start_offset: start,
            end_offset: start + position.length,
            line: self.line_offset + position.line,
        });
    }

    fn visit_call(&self, target: &QualifiedName, args: &[CallArg], results: &mut ScanResults) {
        if contains_ignore_case(&target.object, EXTENDED_PROPERTY_PROC) {
            self.visit_extended_property(args, results);
        }

        let registers_class = target
            .schema
            .as_deref()
            .is_some_and(|schema| schema.eq_ignore_ascii_case(TSQLT_SCHEMA))
            && target.object.eq_ignore_ascii_case(NEW_TEST_CLASS_PROC);
        if registers_class {
            self.visit_class_registration(args, results);
        }
    }

    /// `sp_addextendedproperty` tagging a schema as a test class. A missing
    /// property literal, wrong argument name, or empty value is a silent
    /// no-op.
    fn visit_extended_property(&self, args: &[CallArg], results: &mut ScanResults) {
        let tagged = args.iter().any(|arg| {
            arg.value
                .as_deref()
                .is_some_and(|value| contains_ignore_case(value, TEST_CLASS_PROPERTY))
        });
        if !tagged {
            return;
        }

        let schema = args
            .iter()
            .find(|arg| {
                arg.name
                    .as_deref()
                    .is_some_and(|name| name.eq_ignore_ascii_case(LEVEL0_NAME_ARG))
            })
            .and_then(|arg| arg.value.as_deref())
            .filter(|value| !value.is_empty());

        if let Some(schema) = schema {
            results.markers.push(TestClassMarker {
                schema: unquote(schema).to_string(),
                path: self.path.to_path_buf(),
            });
        }
    }

    /// `tSQLt.NewTestClass` both marks the class and declares its schema.
    fn visit_class_registration(&self, args: &[CallArg], results: &mut ScanResults) {
        let class_name = args
            .first()
            .and_then(|arg| arg.value.as_deref())
            .filter(|value| !value.is_empty());

        if let Some(class_name) = class_name {
            let class_name = unquote(class_name).to_string();
            results.markers.push(TestClassMarker {
                schema: class_name.clone(),
                path: self.path.to_path_buf(),
            });
            results.schemas.push(SchemaObservation {
                name: class_name,
                path: self.path.to_path_buf(),
            });
        }
    }
}
