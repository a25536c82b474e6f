use std::fs;
use std::path::PathBuf;
use std::sync::Arc;
use std::thread;

use tempfile::TempDir;

use tsqlt_discovery::discovery::{PathFilter, TestCache, TestDiscoverer};

fn write_fixture(dir: &TempDir, name: &str, content: &str) -> PathBuf {
    let path = dir.path().join(name);
    fs::write(&path, content).expect("Failed to write fixture");
    path
}

const UNIT_TESTS_SQL: &str = "create schema [UnitTests];\nGO\ncreate procedure [UnitTests].[test first thing] as begin select 1; end\nGO\ncreate procedure [UnitTests].[test second thing] as begin select 2; end\nGO\ncreate procedure [UnitTests].[helper proc] as begin select 3; end";

const MORE_UNIT_TESTS_SQL: &str = "create schema [UnitTests];\nGO\ncreate procedure [UnitTests].[test third thing] as begin select 3; end";

const REGISTERED_CLASS_SQL: &str = "EXEC tSQLt.NewTestClass @ClassName = 'Acceptance';\nGO\ncreate procedure [Acceptance].[test end to end] as begin select 1; end";

#[test]
fn test_discovers_class_and_tests_with_locations() {
    let dir = TempDir::new().unwrap();
    let file = write_fixture(&dir, "unit_tests.sql", UNIT_TESTS_SQL);

    let discoverer = TestDiscoverer::new();
    let records = discoverer.discover(&[file.clone()]).unwrap();

    assert_eq!(records.len(), 2, "helper proc must not be discovered");
    assert_eq!(records[0].full_name, "UnitTests.test first thing");
    assert_eq!(records[1].full_name, "UnitTests.test second thing");
    assert!(records.iter().all(|r| r.path == file));

    // each prior batch is one line and the GO separators are attributed
    // to neither side, so the reported lines trail the file-absolute ones
    assert_eq!(records[0].line, 2);
    assert_eq!(records[1].line, 3);
}

#[test]
fn test_duplicate_schema_across_files_yields_one_class() {
    let dir = TempDir::new().unwrap();
    let first = write_fixture(&dir, "first.sql", UNIT_TESTS_SQL);
    let second = write_fixture(&dir, "second.sql", MORE_UNIT_TESTS_SQL);

    let discoverer = TestDiscoverer::new();
    discoverer.discover(&[first, second]).unwrap();
    let classes = discoverer.classes();

    assert_eq!(classes.len(), 1);
    assert_eq!(classes[0].name, "UnitTests");
    // tests are gathered from every file sharing the schema name
    assert_eq!(classes[0].tests.len(), 3);
}

#[test]
fn test_registered_class_without_create_schema_is_discovered() {
    let dir = TempDir::new().unwrap();
    let file = write_fixture(&dir, "acceptance.sql", REGISTERED_CLASS_SQL);

    let discoverer = TestDiscoverer::new();
    let records = discoverer.discover(&[file]).unwrap();

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].full_name, "Acceptance.test end to end");
}

#[test]
fn test_filtered_paths_are_invisible_to_the_cache() {
    let dir = TempDir::new().unwrap();
    let admitted = write_fixture(&dir, "unit_tests.sql", UNIT_TESTS_SQL);
    let excluded = write_fixture(&dir, "acceptance.sql", REGISTERED_CLASS_SQL);

    let filter = PathFilter::new(&["unit_tests".to_string()]).unwrap();
    let discoverer = TestDiscoverer::with_cache(TestCache::new(), filter);
    let records = discoverer.discover(&[admitted, excluded]).unwrap();

    assert_eq!(records.len(), 2);
    assert!(records.iter().all(|r| r.full_name.starts_with("UnitTests.")));
}

#[test]
fn test_unreadable_file_aborts_discovery() {
    let dir = TempDir::new().unwrap();
    let good = write_fixture(&dir, "unit_tests.sql", UNIT_TESTS_SQL);
    let missing = dir.path().join("not_there.sql");

    let discoverer = TestDiscoverer::new();
    assert!(discoverer.discover(&[good, missing]).is_err());
}

#[test]
fn test_repeated_discovery_is_stable() {
    let dir = TempDir::new().unwrap();
    let file = write_fixture(&dir, "unit_tests.sql", UNIT_TESTS_SQL);

    let discoverer = TestDiscoverer::new();
    let first = discoverer.discover(&[file.clone()]).unwrap();
    let second = discoverer.discover(&[file]).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_concurrent_discovery_calls_are_consistent() {
    let dir = TempDir::new().unwrap();
    let file = write_fixture(&dir, "unit_tests.sql", UNIT_TESTS_SQL);

    let discoverer = Arc::new(TestDiscoverer::new());
    let handles: Vec<_> = (0..4)
        .map(|_| {
            let discoverer = Arc::clone(&discoverer);
            let file = file.clone();
            thread::spawn(move || discoverer.discover(&[file]).unwrap())
        })
        .collect();

    for handle in handles {
        let records = handle.join().unwrap();
        assert_eq!(records.len(), 2);
    }
}
