//! Rendering of the discovered hierarchy.

use anyhow::Result;
use serde::Serialize;

use crate::cli::OutputFormat;
use crate::discovery::TestClass;

#[derive(Debug, Serialize)]
pub struct JsonOutput<'a> {
    pub total_classes: usize,
    pub total_tests: usize,
    pub classes: &'a [TestClass],
}

pub fn format(classes: &[TestClass], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let output = JsonOutput {
                total_classes: classes.len(),
                total_tests: classes.iter().map(|class| class.tests.len()).sum(),
                classes,
            };
            Ok(serde_json::to_string_pretty(&output)?)
        }
        OutputFormat::Text => Ok(render_text(classes)),
    }
}

fn render_text(classes: &[TestClass]) -> String {
    use std::fmt::Write as _;

    if classes.is_empty() {
        return "no tests found\n".to_string();
    }

    let mut out = String::new();
    for class in classes {
        let _ = writeln!(out, "{} ({} tests)", class.name, class.tests.len());
        for test in &class.tests {
            let _ = writeln!(
                out,
                "  {}.{}  {}:{}",
                class.name,
                test.name,
                test.path.display(),
                test.line
            );
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::discovery::Test;
    use std::path::PathBuf;

    fn sample() -> Vec<TestClass> {
        vec![TestClass {
            name: "ut".to_string(),
            path: PathBuf::from("tests/unit.sql"),
            tests: vec![Test {
                name: "test one".to_string(),
                path: PathBuf::from("tests/unit.sql"),
                line: 3,
            }],
        }]
    }

    #[test]
    fn test_text_output_lists_full_names_and_locations() {
        let text = format(&sample(), OutputFormat::Text).unwrap();
        assert!(text.contains("ut (1 tests)"));
        assert!(text.contains("ut.test one"));
        assert!(text.contains("tests/unit.sql:3"));
    }

    #[test]
    fn test_text_output_for_empty_result() {
        let text = format(&[], OutputFormat::Text).unwrap();
        assert_eq!(text, "no tests found\n");
    }

    #[test]
    fn test_json_output_counts() {
        let json = format(&sample(), OutputFormat::Json).unwrap();
        let value: serde_json::Value = serde_json::from_str(&json).unwrap();
        assert_eq!(value["total_classes"], 1);
        assert_eq!(value["total_tests"], 1);
        assert_eq!(value["classes"][0]["tests"][0]["line"], 3);
    }
}
