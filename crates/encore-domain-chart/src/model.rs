use crate::timing::TimeModel;
use encore_ports::types::{Millis, VoiceId};
use serde::{Deserialize, Serialize};

/// Voice used for single-singer play and as the medley reference.
pub const FIRST_VOICE_ID: &str = "P1";

#[derive(thiserror::Error, Debug, Clone, PartialEq)]
pub enum ChartError {
    #[error("invalid tempo: {0} bpm")]
    InvalidTempo(f64),
    #[error("voice not found: {0}")]
    MissingVoice(String),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum NoteType {
    #[default]
    Normal,
    Golden,
    Freestyle,
    Rap,
}

impl NoteType {
    /// Freestyle and rap notes are never scored.
    pub fn is_scorable(self) -> bool {
        matches!(self, NoteType::Normal | NoteType::Golden)
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Note {
    pub start_beat: i32,
    pub length: i32,
    pub midi_note: i32,
    pub text: String,
    pub kind: NoteType,
}

impl Note {
    pub fn new(kind: NoteType, start_beat: i32, length: i32, midi_note: i32, text: &str) -> Self {
        Self {
            start_beat,
            length,
            midi_note,
            text: text.to_string(),
            kind,
        }
    }

    pub fn end_beat(&self) -> i32 {
        self.start_beat + self.length
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Sentence {
    pub id: u32,
    pub notes: Vec<Note>,
    /// Beat at which the lyrics display switches to the next line.
    pub line_break_beat: Option<i32>,
}

impl Sentence {
    pub fn new(id: u32, notes: Vec<Note>) -> Self {
        Self {
            id,
            notes,
            line_break_beat: None,
        }
    }

    pub fn min_beat(&self) -> i32 {
        self.notes
            .iter()
            .map(|note| note.start_beat)
            .min()
            .unwrap_or_else(|| self.line_break_beat.unwrap_or(0))
    }

    pub fn max_beat(&self) -> i32 {
        self.notes
            .iter()
            .map(Note::end_beat)
            .max()
            .unwrap_or_else(|| self.line_break_beat.unwrap_or(0))
    }

    /// Half-open beat ranges `[min, max)` intersect.
    pub fn overlaps(&self, other: &Sentence) -> bool {
        self.min_beat() < other.max_beat() && other.min_beat() < self.max_beat()
    }

    pub fn has_scorable_notes(&self) -> bool {
        self.notes.iter().any(|note| note.kind.is_scorable())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Voice {
    pub id: VoiceId,
    pub sentences: Vec<Sentence>,
}

impl Voice {
    pub fn new(id: &str, sentences: Vec<Sentence>) -> Self {
        Self {
            id: VoiceId::new(id),
            sentences,
        }
    }

    /// Sentences ordered by start beat.
    pub fn sorted_sentences(&self) -> Vec<&Sentence> {
        let mut sentences: Vec<&Sentence> = self.sentences.iter().collect();
        sentences.sort_by_key(|sentence| sentence.min_beat());
        sentences
    }

    pub fn notes(&self) -> impl Iterator<Item = &Note> {
        self.sentences.iter().flat_map(|sentence| sentence.notes.iter())
    }

    pub fn min_beat(&self) -> Option<i32> {
        self.sentences
            .iter()
            .filter(|sentence| !sentence.notes.is_empty())
            .map(Sentence::min_beat)
            .min()
    }

    pub fn max_beat(&self) -> Option<i32> {
        self.sentences
            .iter()
            .filter(|sentence| !sentence.notes.is_empty())
            .map(Sentence::max_beat)
            .max()
    }
}

/// Explicit medley bounds authored in the song file. The start is a chart
/// beat; the end is a song position in millis, gap included.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize, Default)]
pub struct MedleyOverrides {
    pub start_beat: Option<i32>,
    pub end_millis: Option<Millis>,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SongMeta {
    pub title: Option<String>,
    pub artist: Option<String>,
    pub bpm: f64,
    pub gap_millis: Millis,
    pub video_gap_millis: Millis,
    pub duration_millis: Millis,
    pub medley: MedleyOverrides,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Chart {
    pub meta: SongMeta,
    pub voices: Vec<Voice>,
}

impl SongMeta {
    pub fn new(bpm: f64, gap_millis: Millis, duration_millis: Millis) -> Self {
        Self {
            title: None,
            artist: None,
            bpm,
            gap_millis,
            video_gap_millis: 0.0,
            duration_millis,
            medley: MedleyOverrides::default(),
        }
    }

    pub fn time_model(&self) -> Result<TimeModel, ChartError> {
        TimeModel::new(self.bpm, self.gap_millis)
    }
}

impl Chart {
    pub fn new(meta: SongMeta, voices: Vec<Voice>) -> Self {
        Self { meta, voices }
    }

    pub fn voice(&self, id: &str) -> Result<&Voice, ChartError> {
        self.voices
            .iter()
            .find(|voice| voice.id.as_str() == id)
            .ok_or_else(|| ChartError::MissingVoice(id.to_string()))
    }

    pub fn first_voice(&self) -> Result<&Voice, ChartError> {
        self.voice(FIRST_VOICE_ID)
    }

    pub fn time_model(&self) -> Result<TimeModel, ChartError> {
        self.meta.time_model()
    }
}
