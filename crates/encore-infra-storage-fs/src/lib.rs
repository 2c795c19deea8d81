use encore_ports::storage::{SettingsDto, StorageError, StoragePort};
use encore_ports::types::PercentVolume;
use log::{debug, warn};
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

const APP_DIR: &str = "Encore";
const SETTINGS_FILE: &str = "settings.json";

/// Settings persisted as one pretty JSON file.
pub struct FsStorage {
    settings_path: PathBuf,
}

impl FsStorage {
    /// Keeps `settings.json` directly inside `dir`.
    pub fn new(dir: PathBuf) -> Self {
        Self {
            settings_path: dir.join(SETTINGS_FILE),
        }
    }

    /// The per-user config location, e.g. `~/.config/Encore` on Linux.
    pub fn from_config_dir() -> Result<Self, StorageError> {
        let base = dirs_next::config_dir()
            .ok_or_else(|| StorageError::Io("config dir not found".to_string()))?;
        Ok(Self::new(base.join(APP_DIR)))
    }

    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }
}

impl Default for FsStorage {
    fn default() -> Self {
        Self::from_config_dir().unwrap_or_else(|err| {
            warn!("{err}, storing settings in the working directory");
            Self::new(PathBuf::from("."))
        })
    }
}

impl StoragePort for FsStorage {
    fn load_settings(&self) -> Result<SettingsDto, StorageError> {
        let data = match fs::read(&self.settings_path) {
            Ok(data) => data,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("no settings at {}, using defaults", self.settings_path.display());
                return Ok(SettingsDto::default());
            }
            Err(err) => return Err(StorageError::Io(err.to_string())),
        };
        let settings: SettingsDto =
            serde_json::from_slice(&data).map_err(|e| StorageError::Serde(e.to_string()))?;
        Ok(normalized(settings))
    }

    fn save_settings(&self, s: &SettingsDto) -> Result<(), StorageError> {
        let data = serde_json::to_vec_pretty(s).map_err(|e| StorageError::Serde(e.to_string()))?;
        replace_file(&self.settings_path, &data)?;
        debug!("settings saved to {}", self.settings_path.display());
        Ok(())
    }
}

/// Hand-edited files may carry percentages beyond the slider range.
fn normalized(mut settings: SettingsDto) -> SettingsDto {
    settings.music_volume_percent = PercentVolume::new(settings.music_volume_percent.get());
    settings.vocals_volume_percent = PercentVolume::new(settings.vocals_volume_percent.get());
    settings
}

/// Writes a sibling temp file and renames it over `path`.
fn replace_file(path: &Path, data: &[u8]) -> Result<(), StorageError> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).map_err(|e| StorageError::Io(e.to_string()))?;
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, data).map_err(|e| StorageError::Io(e.to_string()))?;
    fs::rename(&tmp, path).map_err(|e| StorageError::Io(e.to_string()))
}
