use crate::types::*;

#[derive(thiserror::Error, Debug)]
pub enum TrackError {
    #[error("track unavailable: {0}")]
    Unavailable(TrackKind),
    #[error("backend error: {0}")]
    Backend(String),
}

/// Audio or video player driven by the synchronizer. Positions are in the
/// track's own time base, i.e. without any gap applied.
pub trait TrackPort: Send {
    fn kind(&self) -> TrackKind;

    /// False when the clip is missing or failed to load.
    fn is_available(&self) -> bool;
    fn is_playing(&self) -> bool;

    fn play(&mut self) -> Result<(), TrackError>;
    fn pause(&mut self) -> Result<(), TrackError>;
    fn seek(&mut self, millis: Millis) -> Result<(), TrackError>;

    fn position_millis(&self) -> Millis;
    fn set_playback_speed(&mut self, factor: f64) -> Result<(), TrackError>;
    fn set_volume(&mut self, volume: Volume01) -> Result<(), TrackError>;
}
