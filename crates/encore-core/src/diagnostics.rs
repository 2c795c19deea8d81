use encore_domain_eval::{RecordedNote, ScoreSnapshot, SentenceScore};
use encore_ports::storage::{SettingsDto, StorageError};
use serde::Serialize;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;

/// Everything needed to replay how a performance was judged.
#[derive(Serialize)]
pub struct PerformanceDump<'a> {
    pub title: Option<&'a str>,
    pub voice: &'a str,
    pub recorded_notes: &'a [RecordedNote],
    pub sentences: &'a [SentenceScore],
    pub score: ScoreSnapshot,
}

/// File name and JSON body of every entry in a diagnostics bundle.
pub fn diagnostics_entries(
    settings: &SettingsDto,
    performance: &PerformanceDump<'_>,
) -> Result<Vec<(&'static str, Value)>, StorageError> {
    Ok(vec![
        (
            "app_version.json",
            json!({ "name": "Encore", "version": env!("CARGO_PKG_VERSION") }),
        ),
        (
            "platform.json",
            json!({ "os": std::env::consts::OS, "arch": std::env::consts::ARCH }),
        ),
        ("settings.json", to_json(settings)?),
        ("performance.json", to_json(performance)?),
    ])
}

pub fn export_diagnostics(
    dir: &Path,
    settings: &SettingsDto,
    performance: &PerformanceDump<'_>,
) -> Result<(), StorageError> {
    fs::create_dir_all(dir).map_err(|e| StorageError::Io(e.to_string()))?;
    for (name, body) in diagnostics_entries(settings, performance)? {
        let data =
            serde_json::to_vec_pretty(&body).map_err(|e| StorageError::Serde(e.to_string()))?;
        fs::write(dir.join(name), data).map_err(|e| StorageError::Io(e.to_string()))?;
    }
    Ok(())
}

fn to_json<T: Serialize + ?Sized>(value: &T) -> Result<Value, StorageError> {
    serde_json::to_value(value).map_err(|e| StorageError::Serde(e.to_string()))
}
