use crate::rating::SentenceRating;
use crate::segmenter::{NoteSegmenter, RecordedNote};
use encore_domain_chart::{is_beat_in_range, MedleyWindow, Note, NoteType, Sentence, Voice};
use encore_ports::types::{Beat, Difficulty};
use log::{debug, info};
use serde::{Deserialize, Serialize};

pub const MAX_SCORE: f64 = 10_000.0;
pub const MAX_PERFECT_SENTENCE_BONUS: f64 = 1_000.0;
pub const MAX_NOTES_SCORE: f64 = MAX_SCORE - MAX_PERFECT_SENTENCE_BONUS;
pub const GOLDEN_NOTE_WEIGHT: f64 = 2.0;

#[derive(Clone, Copy, Debug, Default)]
pub struct ScorerConfig {
    pub difficulty: Difficulty,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoreSnapshot {
    pub total: f64,
    pub normal_notes: f64,
    pub golden_notes: f64,
    pub perfect_sentence_bonus: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SentenceScore {
    pub sentence_id: u32,
    pub percentage: f64,
    pub rating: SentenceRating,
    pub perfect: bool,
    pub normal_notes: f64,
    pub golden_notes: f64,
}

pub struct PerformanceScorer {
    cfg: ScorerConfig,
    sentences: Vec<Sentence>,
    medley: Option<MedleyWindow>,
    cursor: usize,
    next_beat_to_score: Beat,
    score_per_weighted_beat: f64,
    bonus_per_perfect_sentence: f64,
    normal_notes: f64,
    golden_notes: f64,
    perfect_sentence_bonus: f64,
    current_rating: Option<SentenceRating>,
}

impl PerformanceScorer {
    pub fn new(voice: &Voice, cfg: ScorerConfig, medley: Option<MedleyWindow>) -> Self {
        let sentences: Vec<Sentence> = voice.sorted_sentences().into_iter().cloned().collect();

        let mut weighted_beats = 0.0;
        let mut scorable_sentences = 0u32;
        for sentence in &sentences {
            let mut any = false;
            for note in sentence.notes.iter().filter(|n| is_scored(n, medley.as_ref())) {
                weighted_beats += note_weight(note.kind) * note.length as f64;
                any = true;
            }
            if any {
                scorable_sentences += 1;
            }
        }

        let score_per_weighted_beat = if weighted_beats > 0.0 {
            MAX_NOTES_SCORE / weighted_beats
        } else {
            0.0
        };
        let bonus_per_perfect_sentence = if scorable_sentences > 0 {
            MAX_PERFECT_SENTENCE_BONUS / scorable_sentences as f64
        } else {
            0.0
        };

        Self {
            cfg,
            sentences,
            medley,
            cursor: 0,
            next_beat_to_score: f64::NEG_INFINITY,
            score_per_weighted_beat,
            bonus_per_perfect_sentence,
            normal_notes: 0.0,
            golden_notes: 0.0,
            perfect_sentence_bonus: 0.0,
            current_rating: None,
        }
    }

    pub fn set_difficulty(&mut self, difficulty: Difficulty) {
        self.cfg.difficulty = difficulty;
    }

    /// Scores every sentence that ended before `current_beat`.
    pub fn advance_to(&mut self, current_beat: Beat, segmenter: &NoteSegmenter) -> Vec<SentenceScore> {
        let mut finished = Vec::new();
        while self.cursor < self.sentences.len() {
            let sentence = &self.sentences[self.cursor];
            if current_beat <= sentence.max_beat() as Beat {
                break;
            }
            let sentence = sentence.clone();
            self.cursor += 1;

            let recorded = segmenter.notes_for_sentence(sentence.id);
            if let Some(score) = self.on_sentence_finished(&sentence, &recorded) {
                finished.push(score);
            }
        }
        finished
    }

    /// Rates every sentence not yet rated. Called once playback has ended,
    /// since no later beat will pass the last sentence's end.
    pub fn finish(&mut self, segmenter: &NoteSegmenter) -> Vec<SentenceScore> {
        self.advance_to(f64::INFINITY, segmenter)
    }

    /// Scores one finished sentence against the notes recorded for it.
    /// Returns `None` when nothing in the sentence is left to score.
    pub fn on_sentence_finished(
        &mut self,
        sentence: &Sentence,
        recorded: &[&RecordedNote],
    ) -> Option<SentenceScore> {
        if sentence.max_beat() as Beat <= self.next_beat_to_score {
            return None;
        }

        let tolerance = self.cfg.difficulty.pitch_tolerance();
        let mut possible = 0.0;
        let mut achieved = 0.0;
        let mut normal_notes = 0.0;
        let mut golden_notes = 0.0;
        for note in sentence.notes.iter().filter(|note| {
            is_scored(note, self.medley.as_ref()) && note.start_beat as Beat >= self.next_beat_to_score
        }) {
            let weight = note_weight(note.kind);
            let matched = best_matching_note(note, recorded, tolerance)
                .map(|(_, overlap)| overlap.min(note.length as Beat))
                .unwrap_or(0.0);

            possible += weight * note.length as f64;
            achieved += weight * matched;

            let points = weight * matched * self.score_per_weighted_beat;
            match note.kind {
                NoteType::Golden => golden_notes += points,
                _ => normal_notes += points,
            }
        }

        self.next_beat_to_score = self.next_beat_to_score.max(sentence.max_beat() as Beat);
        if possible <= 0.0 {
            return None;
        }

        let percentage = (achieved / possible).clamp(0.0, 1.0);
        let rating = SentenceRating::from_percentage(percentage);
        let perfect = rating == SentenceRating::Perfect;

        self.normal_notes += normal_notes;
        self.golden_notes += golden_notes;
        if perfect {
            self.perfect_sentence_bonus += self.bonus_per_perfect_sentence;
        }
        self.current_rating = Some(rating);

        debug!(
            "sentence {} scored {:.1}% ({})",
            sentence.id,
            percentage * 100.0,
            rating.name()
        );

        Some(SentenceScore {
            sentence_id: sentence.id,
            percentage,
            rating,
            perfect,
            normal_notes,
            golden_notes,
        })
    }

    /// Forward seeks skip the jumped-over beats; backward seeks never re-score.
    pub fn on_seek(&mut self, beat: Beat) {
        if beat > self.next_beat_to_score {
            self.next_beat_to_score = beat;
        }
        self.cursor = self
            .sentences
            .iter()
            .position(|sentence| sentence.max_beat() as Beat >= beat)
            .unwrap_or(self.sentences.len());
        info!("scorer resumes at beat {:.2}", self.next_beat_to_score);
    }

    pub fn next_beat_to_score(&self) -> Beat {
        self.next_beat_to_score
    }

    pub fn current_rating(&self) -> Option<SentenceRating> {
        self.current_rating
    }

    pub fn total_score(&self) -> f64 {
        self.normal_notes + self.golden_notes + self.perfect_sentence_bonus
    }

    pub fn snapshot(&self) -> ScoreSnapshot {
        ScoreSnapshot {
            total: self.total_score(),
            normal_notes: self.normal_notes,
            golden_notes: self.golden_notes,
            perfect_sentence_bonus: self.perfect_sentence_bonus,
        }
    }
}

/// Index into `recorded` of the note with the largest pitch-matching overlap,
/// and that overlap in beats. The earlier-started note wins ties.
pub fn best_matching_note(
    note: &Note,
    recorded: &[&RecordedNote],
    tolerance: i32,
) -> Option<(usize, Beat)> {
    let mut best: Option<(usize, Beat)> = None;
    for (idx, candidate) in recorded.iter().enumerate() {
        if !pitch_matches(candidate.midi_note, note.midi_note, tolerance) {
            continue;
        }
        let overlap = overlap_beats(candidate, note);
        if overlap <= 0.0 {
            continue;
        }
        let better = match best {
            None => true,
            Some((current, current_overlap)) => {
                overlap > current_overlap
                    || (overlap == current_overlap
                        && candidate.start_beat < recorded[current].start_beat)
            }
        };
        if better {
            best = Some((idx, overlap));
        }
    }
    best
}

fn is_scored(note: &Note, medley: Option<&MedleyWindow>) -> bool {
    note.kind.is_scorable() && note.length > 0 && is_beat_in_range(medley, note.start_beat as Beat)
}

fn note_weight(kind: NoteType) -> f64 {
    match kind {
        NoteType::Golden => GOLDEN_NOTE_WEIGHT,
        _ => 1.0,
    }
}

/// Octave-insensitive: compares pitch classes, wrapping around the octave.
pub fn pitch_matches(sung: i32, authored: i32, tolerance: i32) -> bool {
    let diff = (sung.rem_euclid(12) - authored.rem_euclid(12)).abs();
    diff.min(12 - diff) <= tolerance
}

fn overlap_beats(recorded: &RecordedNote, note: &Note) -> Beat {
    let start = recorded.start_beat.max(note.start_beat as Beat);
    let end = recorded.end_beat.min(note.end_beat() as Beat);
    (end - start).max(0.0)
}
