//! Joins schema declarations against candidate procedures to produce the
//! class/test hierarchy.

use std::collections::HashSet;

use crate::discovery::{Test, TestClass};
use crate::scanner::{ProcedureObservation, ScanResults};

/// Builds the hierarchy from the full observation set.
///
/// A schema survives only if at least one candidate procedure names it;
/// survivors are deduplicated case-insensitively, first occurrence wins.
/// Tests are re-gathered per class by name match, so a discarded duplicate
/// schema record loses nothing. Output keeps scan order; nothing is sorted.
/// Markers are deliberately not consulted here.
pub fn correlate(results: &ScanResults) -> Vec<TestClass> {
    let mut seen = HashSet::new();
    let mut classes = Vec::new();

    for schema in &results.schemas {
        if !results
            .procedures
            .iter()
            .any(|proc| schema_matches(proc, &schema.name))
        {
            continue;
        }
        if !seen.insert(schema.name.to_ascii_lowercase()) {
            continue;
        }

        let tests: Vec<Test> = results
            .procedures
            .iter()
            .filter(|proc| schema_matches(proc, &schema.name))
            .map(|proc| Test {
                name: proc.name.object.clone(),
                path: proc.path.clone(),
                line: proc.line,
            })
            .collect();

        if tests.is_empty() {
            continue;
        }

        classes.push(TestClass {
            name: schema.name.clone(),
            path: schema.path.clone(),
            tests,
        });
    }

    classes
}

/// An absent schema part never matches any class.
fn schema_matches(proc: &ProcedureObservation, schema_name: &str) -> bool {
    proc.name
        .schema
        .as_deref()
        .is_some_and(|schema| schema.eq_ignore_ascii_case(schema_name))
}
