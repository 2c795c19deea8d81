use encore_infra_storage_fs::FsStorage;
use encore_ports::storage::{SettingsDto, StorageError, StoragePort};
use encore_ports::types::{Difficulty, PercentVolume};
use pretty_assertions::assert_eq;
use std::fs;

#[test]
fn missing_file_loads_defaults() {
    let dir = tempfile::tempdir().expect("temp dir");
    let storage = FsStorage::new(dir.path().join("nested"));

    assert_eq!(storage.load_settings().expect("load"), SettingsDto::default());
}

#[test]
fn saved_settings_are_loaded_back() {
    let dir = tempfile::tempdir().expect("temp dir");
    let storage = FsStorage::new(dir.path().join("nested"));
    let settings = SettingsDto {
        music_volume_percent: PercentVolume::new(70),
        vocals_volume_percent: PercentVolume::new(100),
        mic_delay_millis: 120,
        difficulty: Difficulty::Easy,
        ..SettingsDto::default()
    };

    storage.save_settings(&settings).expect("save");

    assert_eq!(storage.load_settings().expect("load"), settings);
    assert!(!storage.settings_path().with_extension("json.tmp").exists());
}

#[test]
fn partial_file_fills_in_defaults_and_clamps_volumes() {
    let dir = tempfile::tempdir().expect("temp dir");
    let storage = FsStorage::new(dir.path().to_path_buf());
    fs::write(
        storage.settings_path(),
        r#"{ "vocals_volume_percent": 250, "difficulty": "Medium" }"#,
    )
    .expect("write");

    let settings = storage.load_settings().expect("load");

    assert_eq!(settings.vocals_volume_percent, PercentVolume::new(100));
    assert_eq!(settings.music_volume_percent, PercentVolume::new(100));
    assert_eq!(settings.difficulty, Difficulty::Medium);
    assert_eq!(settings.countdown_seconds, 3);
}

#[test]
fn corrupt_file_is_a_serde_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let storage = FsStorage::new(dir.path().to_path_buf());
    fs::write(storage.settings_path(), b"{ not json").expect("write");

    assert!(matches!(storage.load_settings(), Err(StorageError::Serde(_))));
}

#[test]
fn unreadable_settings_are_an_io_error() {
    let dir = tempfile::tempdir().expect("temp dir");
    let storage = FsStorage::new(dir.path().to_path_buf());
    fs::create_dir(storage.settings_path()).expect("dir in place of file");

    assert!(matches!(storage.load_settings(), Err(StorageError::Io(_))));
}
