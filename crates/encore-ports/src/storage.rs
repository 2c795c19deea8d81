use crate::types::*;
use serde::{Deserialize, Serialize};

fn default_music_volume() -> PercentVolume {
    PercentVolume::new(100)
}

fn default_vocals_volume() -> PercentVolume {
    PercentVolume::new(100)
}

fn default_medley_target_duration_seconds() -> u32 {
    30
}

fn default_countdown_seconds() -> u32 {
    3
}

fn default_fade_in_millis() -> u32 {
    1000
}

fn default_fade_out_millis() -> u32 {
    2000
}

#[derive(thiserror::Error, Debug)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(String),
    #[error("serialization error: {0}")]
    Serde(String),
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SettingsDto {
    #[serde(default = "default_music_volume")]
    pub music_volume_percent: PercentVolume,
    #[serde(default = "default_vocals_volume")]
    pub vocals_volume_percent: PercentVolume,
    pub mic_delay_millis: i32,
    pub difficulty: Difficulty,
    #[serde(default = "default_medley_target_duration_seconds")]
    pub medley_target_duration_seconds: u32,
    #[serde(default = "default_countdown_seconds")]
    pub countdown_seconds: u32,
    #[serde(default = "default_fade_in_millis")]
    pub fade_in_millis: u32,
    #[serde(default = "default_fade_out_millis")]
    pub fade_out_millis: u32,
}

impl Default for SettingsDto {
    fn default() -> Self {
        Self {
            music_volume_percent: default_music_volume(),
            vocals_volume_percent: default_vocals_volume(),
            mic_delay_millis: 0,
            difficulty: Difficulty::default(),
            medley_target_duration_seconds: default_medley_target_duration_seconds(),
            countdown_seconds: default_countdown_seconds(),
            fade_in_millis: default_fade_in_millis(),
            fade_out_millis: default_fade_out_millis(),
        }
    }
}

pub trait StoragePort: Send + Sync {
    fn load_settings(&self) -> Result<SettingsDto, StorageError>;
    fn save_settings(&self, s: &SettingsDto) -> Result<(), StorageError>;
}
