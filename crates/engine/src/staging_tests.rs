use super::*;
use tempfile::tempdir;

fn now() -> chrono::DateTime<chrono::Utc> {
    chrono::DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z").unwrap().with_timezone(&chrono::Utc)
}

#[test]
fn writes_files_and_manifest() {
    let dir = tempdir().unwrap();
    let files = vec![
        FileEntry { path: "main.py".into(), content: "print('hi')".into() },
        FileEntry { path: "tests/test_main.py".into(), content: "def test_x(): pass".into() },
    ];
    write_staging(dir.path(), &files, now()).unwrap();

    assert_eq!(std::fs::read_to_string(dir.path().join("main.py")).unwrap(), "print('hi')");
    assert_eq!(std::fs::read_to_string(dir.path().join("tests/test_main.py")).unwrap(), "def test_x(): pass");
    assert!(manifest_exists(dir.path()));
}

#[test]
fn empty_file_list_still_writes_manifest() {
    let dir = tempdir().unwrap();
    write_staging(dir.path(), &[], now()).unwrap();
    assert!(manifest_exists(dir.path()));
}

#[test]
fn read_listing_excludes_manifest_and_sorts_by_path() {
    let dir = tempdir().unwrap();
    let files = vec![
        FileEntry { path: "b.py".into(), content: "2".into() },
        FileEntry { path: "a.py".into(), content: "1".into() },
    ];
    write_staging(dir.path(), &files, now()).unwrap();

    let listing = read_staging_listing(dir.path()).unwrap();
    assert_eq!(listing.len(), 2);
    assert_eq!(listing[0].path, "a.py");
    assert_eq!(listing[1].path, "b.py");
}

#[test]
fn read_listing_on_missing_dir_is_empty() {
    let dir = tempdir().unwrap();
    let listing = read_staging_listing(&dir.path().join("nope")).unwrap();
    assert!(listing.is_empty());
}

#[test]
fn manifest_absent_before_engineer_writes() {
    let dir = tempdir().unwrap();
    std::fs::create_dir_all(dir.path()).unwrap();
    assert!(!manifest_exists(dir.path()));
}
