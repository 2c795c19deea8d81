use crate::model::{Sentence, Voice};
use log::debug;

/// Combines all voices into one timeline. A sentence is taken only if it does
/// not overlap a sentence already taken, so earlier voices win.
pub fn merge_voices(voices: &[Voice], merged_id: &str) -> Voice {
    let mut merged: Vec<Sentence> = Vec::new();
    let mut dropped = 0usize;

    for voice in voices {
        for sentence in &voice.sentences {
            if merged.iter().any(|existing| existing.overlaps(sentence)) {
                dropped += 1;
                continue;
            }
            let mut sentence = sentence.clone();
            sentence.line_break_beat = None;
            merged.push(sentence);
        }
    }

    merged.sort_by_key(|sentence| sentence.min_beat());
    debug!(
        "merged {} voices into {} sentences ({} overlapping dropped)",
        voices.len(),
        merged.len(),
        dropped
    );

    Voice::new(merged_id, merged)
}
