use std::fs;
use std::path::PathBuf;

use tempfile::TempDir;

use tsqlt_discovery::discovery::SourceLocationIndex;

fn write_file(dir: &TempDir, relative: &str, content: &str) -> PathBuf {
    let path = dir.path().join(relative);
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(&path, content).unwrap();
    path
}

#[test]
fn test_index_finds_test_procedures_recursively() {
    let dir = TempDir::new().unwrap();
    let nested = write_file(
        &dir,
        "tests/orders/order_tests.sql",
        "create schema [Orders];\nGO\ncreate procedure [Orders].[test order totals] as begin select 1; end",
    );
    write_file(&dir, "tests/readme.txt", "not sql");

    let mut index = SourceLocationIndex::new();
    index.build(&[dir.path().to_path_buf()]);

    assert_eq!(index.len(), 1);
    let location = index.locate("orders", "TEST ORDER TOTALS").unwrap();
    assert_eq!(location.path, nested);
    assert_eq!(location.line, 2);
}

#[test]
fn test_unqualified_procedure_defaults_to_dbo() {
    let dir = TempDir::new().unwrap();
    write_file(
        &dir,
        "loose.sql",
        "create procedure [test loose end] as select 1;",
    );

    let mut index = SourceLocationIndex::new();
    index.build(&[dir.path().to_path_buf()]);

    assert!(index.locate("dbo", "test loose end").is_some());
}

#[test]
fn test_non_test_procedures_are_not_indexed() {
    let dir = TempDir::new().unwrap();
    write_file(
        &dir,
        "helpers.sql",
        "create procedure [Orders].[recalculate totals] as select 1;",
    );

    let mut index = SourceLocationIndex::new();
    index.build(&[dir.path().to_path_buf()]);

    assert!(index.is_empty());
}

#[test]
fn test_missing_root_is_not_fatal() {
    let dir = TempDir::new().unwrap();
    write_file(
        &dir,
        "tests.sql",
        "create procedure [Orders].[test a] as select 1;",
    );

    let mut index = SourceLocationIndex::new();
    index.build(&[
        PathBuf::from("/no/such/folder"),
        dir.path().to_path_buf(),
    ]);

    assert_eq!(index.len(), 1);
}

#[test]
fn test_miss_falls_back_to_artifact_location() {
    let dir = TempDir::new().unwrap();
    write_file(
        &dir,
        "tests.sql",
        "create procedure [Orders].[test a] as select 1;",
    );

    let mut index = SourceLocationIndex::new();
    index.build(&[dir.path().to_path_buf()]);

    let artifact = PathBuf::from("build/model.dacpac");
    let (path, line) = index.resolve_or("Orders", "test missing", &artifact);
    assert_eq!(path, artifact);
    assert_eq!(line, 1);

    let (path, line) = index.resolve_or("Orders", "test a", &artifact);
    assert!(path.ends_with("tests.sql"));
    assert_eq!(line, 1);
}
