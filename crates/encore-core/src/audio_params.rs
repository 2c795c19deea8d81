use encore_ports::storage::SettingsDto;
use encore_ports::types::{PercentVolume, TrackKind, Volume01};
use serde::{Deserialize, Serialize};

/// Vocals volume from which the separated tracks replace the original mix.
pub const SPLIT_TRACKS_VOCALS_THRESHOLD: PercentVolume = PercentVolume(100);

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoudnessSource {
    OriginalMix,
    SplitTracks,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct TrackVolumes {
    pub original_mix: Volume01,
    pub instrumental: Volume01,
    pub vocals: Volume01,
}

impl TrackVolumes {
    pub fn get(&self, kind: TrackKind) -> Option<Volume01> {
        match kind {
            TrackKind::OriginalMix => Some(self.original_mix),
            TrackKind::Instrumental => Some(self.instrumental),
            TrackKind::Vocals => Some(self.vocals),
            TrackKind::Video => None,
        }
    }
}

pub fn loudness_source(vocals_volume: PercentVolume, has_split_tracks: bool) -> LoudnessSource {
    if has_split_tracks && vocals_volume >= SPLIT_TRACKS_VOCALS_THRESHOLD {
        LoudnessSource::SplitTracks
    } else {
        LoudnessSource::OriginalMix
    }
}

/// Exactly one of the original mix or the split pair is audible.
/// `fade` scales everything, e.g. at medley edges.
pub fn mix_volumes(settings: &SettingsDto, has_split_tracks: bool, fade: f32) -> TrackVolumes {
    let music = settings.music_volume_percent.as_volume().get() * fade.clamp(0.0, 1.0);
    let vocals = settings.vocals_volume_percent.as_volume().get();
    match loudness_source(settings.vocals_volume_percent, has_split_tracks) {
        LoudnessSource::OriginalMix => TrackVolumes {
            original_mix: Volume01::new(music),
            instrumental: Volume01::new(0.0),
            vocals: Volume01::new(0.0),
        },
        LoudnessSource::SplitTracks => TrackVolumes {
            original_mix: Volume01::new(0.0),
            instrumental: Volume01::new(music),
            vocals: Volume01::new(music * vocals),
        },
    }
}
