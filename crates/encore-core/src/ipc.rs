use crate::transport::TransportState;
use encore_domain_eval::{ScoreSnapshot, SentenceRating};
use encore_ports::types::{Beat, Difficulty, Millis, PercentVolume};
use serde::{Deserialize, Serialize};

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Command {
    Play,
    Pause,
    Stop,
    Seek { millis: Millis },
    Restart,
    SetVolumes { music: PercentVolume, vocals: PercentVolume },
    SetDifficulty { difficulty: Difficulty },
    SetMicDelay { millis: i32 },
    SetMedleyMode { enabled: bool },
}

#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum Event {
    SessionStateUpdated { state: TransportState, medley: bool },
    TransportUpdated { position_millis: Millis, beat: Beat, playing: bool },
    RecordedNoteStarted { midi_note: i32, start_beat: Beat },
    SentenceRated { sentence_id: u32, rating: SentenceRating, percentage: f64 },
    ScoreUpdated { score: ScoreSnapshot },
    Finished { score: ScoreSnapshot },
}
