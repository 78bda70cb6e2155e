use apod_desktop::cache::{CacheError, CacheManager, CacheSettings, MetadataStore};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::{tempdir, NamedTempFile};

use super::mock_provider::MockProvider;

const HASH: &str = "0000000000000000000000000000000000000000000000000000000000000001";

#[test]
fn test_open_corrupted_database() {
    let temp_file = NamedTempFile::new().unwrap();
    let path = temp_file.path();

    {
        let mut f = fs::File::create(path).unwrap();
        f.write_all(b"not a sqlite database").unwrap();
    }

    let res = MetadataStore::open(path);
    assert!(matches!(res, Err(CacheError::Database(_))));
}

#[test]
fn test_recovery_after_removing_corrupted_file() {
    let temp_file = NamedTempFile::new().unwrap();
    let path = temp_file.path();

    {
        let mut f = fs::File::create(path).unwrap();
        f.write_all(b"corrupted garbage").unwrap();
    }
    assert!(MetadataStore::open(path).is_err());

    fs::remove_file(path).unwrap();
    let store = MetadataStore::open(path).expect("Should succeed after deleting corrupted file");
    assert_eq!(store.count().unwrap(), 0);
    store
        .insert("Recovered", "", Path::new("/c/Recovered.jpg"), HASH)
        .unwrap();
    assert_eq!(store.count().unwrap(), 1);
}

#[test]
fn test_manager_open_fails_on_corrupted_database() {
    let dir = tempdir().unwrap();
    let settings = CacheSettings::in_root(dir.path());
    fs::write(&settings.db_path, b"definitely not sqlite").unwrap();

    let result = CacheManager::open(&settings, MockProvider::new());
    assert!(matches!(result, Err(CacheError::Database(_))));
}

#[test]
fn test_database_path_is_directory() {
    let dir = tempdir().unwrap();
    let settings = CacheSettings::in_root(dir.path());
    fs::create_dir_all(&settings.db_path).unwrap();

    assert!(CacheManager::open(&settings, MockProvider::new()).is_err());
}

#[test]
fn test_database_outside_root_gets_parent_created() {
    let dir = tempdir().unwrap();
    let settings = CacheSettings {
        root: dir.path().join("images"),
        db_path: dir.path().join("state").join("apod.db"),
    };

    let cache = CacheManager::open(&settings, MockProvider::new()).unwrap();
    assert!(settings.db_path.is_file());
    assert!(cache.list_titles().unwrap().is_empty());
}
