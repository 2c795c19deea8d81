use encore_domain_chart::{is_beat_in_range, MedleyWindow, Sentence, Voice};
use encore_ports::types::{Beat, FrameId, Millis};
use log::debug;
use serde::{Deserialize, Serialize};

/// A stretch of constant sung pitch.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecordedNote {
    pub midi_note: i32,
    pub start_beat: Beat,
    pub end_beat: Beat,
    pub start_millis: Millis,
    pub end_millis: Millis,
}

impl RecordedNote {
    fn new(midi_note: i32, beat: Beat, millis: Millis) -> Self {
        Self {
            midi_note,
            start_beat: beat,
            end_beat: beat,
            start_millis: millis,
            end_millis: millis,
        }
    }

    pub fn length_in_beats(&self) -> Beat {
        self.end_beat - self.start_beat
    }

    /// The note end is inclusive so a freshly started zero-length note
    /// still counts when it begins exactly on the sentence start.
    pub fn overlaps_sentence(&self, sentence: &Sentence) -> bool {
        self.start_beat < sentence.max_beat() as Beat && self.end_beat >= sentence.min_beat() as Beat
    }
}

/// The recorded notes sung while an authored sentence was active.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecordedSentence {
    pub sentence_id: u32,
    sentence_index: usize,
    notes: Vec<usize>,
}

impl RecordedSentence {
    pub fn note_indices(&self) -> &[usize] {
        &self.notes
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum IgnoreReason {
    StaleFrame,
    InvalidFrame,
    InvalidPosition,
    OutOfMedleyRange,
}

/// What a pitch sample did to the recording. Indices point into
/// [`NoteSegmenter::recorded_notes`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SampleOutcome {
    Ignored(IgnoreReason),
    Silent { closed: Option<usize> },
    Started { note: usize, closed: Option<usize> },
    Extended { note: usize },
}

pub struct NoteSegmenter {
    sentences: Vec<Sentence>,
    medley: Option<MedleyWindow>,
    notes: Vec<RecordedNote>,
    recorded_sentences: Vec<RecordedSentence>,
    last_recorded_note: Option<usize>,
    last_recorded_sentence: Option<usize>,
    last_processed_frame: Option<FrameId>,
    sentence_cursor: usize,
}

impl NoteSegmenter {
    pub fn new(voice: &Voice, medley: Option<MedleyWindow>) -> Self {
        let sentences = voice.sorted_sentences().into_iter().cloned().collect();
        Self {
            sentences,
            medley,
            notes: Vec::new(),
            recorded_sentences: Vec::new(),
            last_recorded_note: None,
            last_recorded_sentence: None,
            last_processed_frame: None,
            sentence_cursor: 0,
        }
    }

    pub fn on_pitch_sample(
        &mut self,
        midi_note: i32,
        current_beat: Beat,
        current_millis: Millis,
        frame: FrameId,
    ) -> SampleOutcome {
        if frame < 0 {
            return SampleOutcome::Ignored(IgnoreReason::InvalidFrame);
        }
        if !current_beat.is_finite() || !current_millis.is_finite() {
            return SampleOutcome::Ignored(IgnoreReason::InvalidPosition);
        }
        if self.last_processed_frame.is_some_and(|last| frame <= last) {
            return SampleOutcome::Ignored(IgnoreReason::StaleFrame);
        }
        self.last_processed_frame = Some(frame);

        if !is_beat_in_range(self.medley.as_ref(), current_beat) {
            self.close_open_note();
            return SampleOutcome::Ignored(IgnoreReason::OutOfMedleyRange);
        }

        if midi_note <= 0 {
            return SampleOutcome::Silent {
                closed: self.close_open_note(),
            };
        }

        match self.last_recorded_note {
            Some(idx) if self.notes[idx].midi_note == midi_note => {
                let note = &mut self.notes[idx];
                if current_beat > note.end_beat {
                    note.end_beat = current_beat;
                    note.end_millis = current_millis;
                }
                SampleOutcome::Extended { note: idx }
            }
            _ => {
                let closed = self.close_open_note();
                let note = self.start_note(midi_note, current_beat, current_millis);
                SampleOutcome::Started { note, closed }
            }
        }
    }

    /// Closes the open note and re-derives the active sentence for `beat`.
    /// Recorded notes are kept.
    pub fn on_seek(&mut self, beat: Beat) {
        self.close_open_note();
        self.last_recorded_sentence = None;
        self.sentence_cursor = self
            .sentences
            .iter()
            .position(|sentence| sentence.max_beat() as Beat > beat)
            .unwrap_or(self.sentences.len());
    }

    pub fn reset(&mut self) {
        self.notes.clear();
        self.recorded_sentences.clear();
        self.last_recorded_note = None;
        self.last_recorded_sentence = None;
        self.last_processed_frame = None;
        self.sentence_cursor = 0;
    }

    pub fn recorded_notes(&self) -> &[RecordedNote] {
        &self.notes
    }

    pub fn open_note(&self) -> Option<&RecordedNote> {
        self.last_recorded_note.map(|idx| &self.notes[idx])
    }

    pub fn recorded_sentences(&self) -> &[RecordedSentence] {
        &self.recorded_sentences
    }

    pub fn current_recorded_sentence(&self) -> Option<&RecordedSentence> {
        self.last_recorded_sentence
            .map(|idx| &self.recorded_sentences[idx])
    }

    pub fn sentence_of(&self, recorded: &RecordedSentence) -> &Sentence {
        &self.sentences[recorded.sentence_index]
    }

    /// Notes attached to the sentence with `sentence_id`, in recording order.
    pub fn notes_for_sentence(&self, sentence_id: u32) -> Vec<&RecordedNote> {
        self.recorded_sentences
            .iter()
            .find(|recorded| recorded.sentence_id == sentence_id)
            .map(|recorded| recorded.notes.iter().map(|idx| &self.notes[*idx]).collect())
            .unwrap_or_default()
    }

    fn close_open_note(&mut self) -> Option<usize> {
        let closed = self.last_recorded_note.take();
        if let Some(idx) = closed {
            let note = &self.notes[idx];
            debug!(
                "closed note {} beats {:.2}..{:.2}",
                note.midi_note, note.start_beat, note.end_beat
            );
        }
        closed
    }

    fn start_note(&mut self, midi_note: i32, beat: Beat, millis: Millis) -> usize {
        let idx = self.notes.len();
        self.notes.push(RecordedNote::new(midi_note, beat, millis));
        self.last_recorded_note = Some(idx);
        self.attach_to_sentence(idx, beat);
        idx
    }

    fn attach_to_sentence(&mut self, note_idx: usize, beat: Beat) {
        let Some(sentence_index) = self.active_sentence_index(beat) else {
            return;
        };

        let recorded_idx = match self.last_recorded_sentence {
            Some(idx) if self.recorded_sentences[idx].sentence_index == sentence_index => idx,
            _ => self.recorded_sentence_for(sentence_index),
        };
        self.last_recorded_sentence = Some(recorded_idx);

        let sentence = &self.sentences[sentence_index];
        if self.notes[note_idx].overlaps_sentence(sentence) {
            self.recorded_sentences[recorded_idx].notes.push(note_idx);
        }
    }

    fn recorded_sentence_for(&mut self, sentence_index: usize) -> usize {
        if let Some(idx) = self
            .recorded_sentences
            .iter()
            .position(|recorded| recorded.sentence_index == sentence_index)
        {
            return idx;
        }
        self.recorded_sentences.push(RecordedSentence {
            sentence_id: self.sentences[sentence_index].id,
            sentence_index,
            notes: Vec::new(),
        });
        self.recorded_sentences.len() - 1
    }

    /// First sentence, in start order, that has not ended at `beat`.
    fn active_sentence_index(&mut self, beat: Beat) -> Option<usize> {
        while let Some(sentence) = self.sentences.get(self.sentence_cursor) {
            if sentence.max_beat() as Beat > beat {
                return Some(self.sentence_cursor);
            }
            self.sentence_cursor += 1;
        }
        None
    }
}
