use serde::{Deserialize, Serialize};
use std::fmt;

pub type Beat = f64; // chart-relative musical time, fractional while playing
pub type Millis = f64; // position in the song audio, gap included
pub type FrameId = i64; // host tick identifier, monotonic while a session runs

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct VoiceId(pub String);

impl VoiceId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TrackKind {
    /// Full song with vocals.
    OriginalMix,
    Instrumental,
    Vocals,
    Video,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, Default)]
pub struct Volume01(pub f32);

impl Volume01 {
    pub fn new(value: f32) -> Self {
        Self(value.clamp(0.0, 1.0))
    }

    pub fn get(self) -> f32 {
        self.0
    }
}

/// Integer percentage as shown in the options UI.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct PercentVolume(pub u16);

impl PercentVolume {
    pub const MAX: u16 = 100;

    pub fn new(value: u16) -> Self {
        Self(value.min(Self::MAX))
    }

    pub fn get(self) -> u16 {
        self.0
    }

    pub fn as_volume(self) -> Volume01 {
        Volume01::new(self.0 as f32 / 100.0)
    }
}

impl fmt::Display for VoiceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl fmt::Display for TrackKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TrackKind::OriginalMix => "original-mix",
            TrackKind::Instrumental => "instrumental",
            TrackKind::Vocals => "vocals",
            TrackKind::Video => "video",
        };
        f.write_str(name)
    }
}

/// Pitch tolerance applied when comparing sung and authored notes.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Easy,
    Medium,
    #[default]
    Hard,
}

impl Difficulty {
    /// Accepted distance in semitones, measured within one octave.
    pub fn pitch_tolerance(self) -> i32 {
        match self {
            Difficulty::Easy => 2,
            Difficulty::Medium => 1,
            Difficulty::Hard => 0,
        }
    }
}
