use crate::audio_params::{mix_volumes, TrackVolumes};
use crate::diagnostics::{export_diagnostics, PerformanceDump};
use crate::fade::medley_fade;
use crate::ipc::{Command, Event};
use crate::sync::{PlaybackSynchronizer, SyncConfig};
use crate::transport::{PlaybackClock, TransportState};
use encore_domain_chart::{
    compute_medley_window, merge_voices, Chart, ChartError, MedleyConfig, MedleyWindow, TimeModel,
    Voice, FIRST_VOICE_ID,
};
use encore_domain_eval::{
    NoteSegmenter, PerformanceScorer, RecordedNote, SampleOutcome, ScoreSnapshot, ScorerConfig,
    SentenceRating, SentenceScore,
};
use encore_ports::pitch::{PitchSample, PitchSampleCallback};
use encore_ports::storage::{SettingsDto, StorageError, StoragePort};
use encore_ports::track::TrackPort;
use encore_ports::types::{Beat, Millis, TrackKind};
use log::{info, warn};
use parking_lot::Mutex;
use rtrb::{Consumer, Producer, RingBuffer};
use std::collections::VecDeque;
use std::path::Path;
use std::sync::Arc;

const PITCH_QUEUE_CAPACITY: usize = 256;
const TRANSPORT_EMIT_INTERVAL_MILLIS: Millis = 33.0;

#[derive(thiserror::Error, Debug)]
pub enum SessionError {
    #[error("chart error: {0}")]
    Chart(#[from] ChartError),
    #[error("storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Which authored voice the singer is scored against.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum VoiceSelection {
    Voice(String),
    /// All voices folded into one timeline.
    Merged,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TickReport {
    /// Host tick counter, independent of detector frame ids.
    pub tick: u64,
    pub position_millis: Millis,
    pub beat: Beat,
    pub sample: Option<SampleOutcome>,
    pub rated: Vec<SentenceScore>,
    pub finished: bool,
}

pub struct SingSession {
    chart: Chart,
    voice: Voice,
    time: TimeModel,
    storage: Option<Box<dyn StoragePort>>,
    settings: SettingsDto,
    medley: Option<MedleyWindow>,
    sync: PlaybackSynchronizer,
    segmenter: NoteSegmenter,
    scorer: PerformanceScorer,
    sentence_scores: Vec<SentenceScore>,
    pitch_tx: Arc<Mutex<Producer<PitchSample>>>,
    pitch_rx: Consumer<PitchSample>,
    tick: u64,
    volumes: Option<TrackVolumes>,
    events: VecDeque<Event>,
    since_transport_emit: Millis,
}

impl SingSession {
    pub fn new(
        chart: Chart,
        selection: VoiceSelection,
        storage: Option<Box<dyn StoragePort>>,
    ) -> Result<Self, SessionError> {
        let settings = match storage.as_ref() {
            Some(storage) => storage.load_settings().unwrap_or_else(|err| {
                warn!("settings not loaded, using defaults: {err}");
                SettingsDto::default()
            }),
            None => SettingsDto::default(),
        };

        let time = chart.time_model()?;
        let voice = match &selection {
            VoiceSelection::Voice(id) => chart.voice(id)?.clone(),
            VoiceSelection::Merged => merge_voices(&chart.voices, FIRST_VOICE_ID),
        };

        let duration = if chart.meta.duration_millis > 0.0 {
            chart.meta.duration_millis
        } else {
            let last_beat = voice.max_beat().unwrap_or(0);
            time.beats_to_millis(last_beat as Beat) + 1.0
        };
        let clock = PlaybackClock::new(time, duration);
        let sync = PlaybackSynchronizer::new(clock, SyncConfig::default());

        let scorer_cfg = ScorerConfig {
            difficulty: settings.difficulty,
        };
        let segmenter = NoteSegmenter::new(&voice, None);
        let scorer = PerformanceScorer::new(&voice, scorer_cfg, None);

        let (producer, consumer) = RingBuffer::new(PITCH_QUEUE_CAPACITY);

        info!(
            "session ready: voice {} with {} sentences, {:.0}ms",
            voice.id,
            voice.sentences.len(),
            duration
        );

        Ok(Self {
            chart,
            voice,
            time,
            storage,
            settings,
            medley: None,
            sync,
            segmenter,
            scorer,
            sentence_scores: Vec::new(),
            pitch_tx: Arc::new(Mutex::new(producer)),
            pitch_rx: consumer,
            tick: 0,
            volumes: None,
            events: VecDeque::new(),
            since_transport_emit: 0.0,
        })
    }

    pub fn add_track(&mut self, port: Box<dyn TrackPort>) {
        let gap = match port.kind() {
            TrackKind::Video => self.chart.meta.video_gap_millis,
            _ => 0.0,
        };
        self.sync.add_track(port, gap);
        self.volumes = None;
    }

    /// Hands out the entry point for the pitch detector. Samples are queued
    /// and at most the newest one is consumed per tick.
    pub fn pitch_callback(&self) -> PitchSampleCallback {
        let producer = self.pitch_tx.clone();
        Arc::new(move |sample: PitchSample| {
            if let Some(mut guard) = producer.try_lock() {
                let _ = guard.push(sample);
            }
        })
    }

    pub fn handle_command(&mut self, cmd: Command) -> Result<(), SessionError> {
        match cmd {
            Command::Play => {
                self.sync.play();
                self.emit_session_state();
            }
            Command::Pause => {
                self.sync.pause();
                self.emit_session_state();
            }
            Command::Stop => {
                self.sync.stop();
                self.emit_session_state();
            }
            Command::Seek { millis } => {
                self.seek(millis);
            }
            Command::Restart => {
                self.restart();
            }
            Command::SetVolumes { music, vocals } => {
                self.settings.music_volume_percent = music;
                self.settings.vocals_volume_percent = vocals;
                self.volumes = None;
                self.save_settings();
            }
            Command::SetDifficulty { difficulty } => {
                self.settings.difficulty = difficulty;
                self.scorer.set_difficulty(difficulty);
                self.save_settings();
            }
            Command::SetMicDelay { millis } => {
                self.settings.mic_delay_millis = millis;
                self.save_settings();
            }
            Command::SetMedleyMode { enabled } => {
                self.set_medley_mode(enabled)?;
            }
        }
        Ok(())
    }

    /// One host frame: clock, track sync, one pitch sample, scoring.
    pub fn advance(&mut self, delta_millis: Millis) -> TickReport {
        let finished = self.sync.advance(delta_millis);
        self.tick += 1;

        let clock = self.sync.clock();
        let position = clock.position_millis();
        let beat = clock.current_beat();
        let listening = clock.is_playing() || finished;

        let sample = self
            .take_latest_sample()
            .filter(|_| listening)
            .map(|sample| self.record_sample(sample, position));

        // Sentences finish on the singer's timeline, which trails the clock
        // by the mic delay.
        let rated = if finished {
            self.scorer.finish(&self.segmenter)
        } else {
            let sung_beat = self.time.millis_to_beats(self.sung_millis(position));
            self.scorer.advance_to(sung_beat, &self.segmenter)
        };
        for score in &rated {
            self.events.push_back(Event::SentenceRated {
                sentence_id: score.sentence_id,
                rating: score.rating,
                percentage: score.percentage,
            });
        }
        self.sentence_scores.extend(rated.iter().cloned());
        if !rated.is_empty() {
            self.events.push_back(Event::ScoreUpdated {
                score: self.scorer.snapshot(),
            });
        }

        self.apply_volumes();
        self.since_transport_emit += delta_millis.max(0.0);
        self.emit_transport(false);

        if finished {
            info!("performance finished with {:.0} points", self.scorer.total_score());
            self.events.push_back(Event::Finished {
                score: self.scorer.snapshot(),
            });
            self.emit_session_state();
        }

        TickReport {
            tick: self.tick,
            position_millis: position,
            beat,
            sample,
            rated,
            finished,
        }
    }

    /// Moves clock, segmenter and scorer together before the next tick.
    pub fn seek(&mut self, millis: Millis) -> Millis {
        let position = self.sync.seek(millis);
        let beat = self.time.millis_to_beats(position);
        self.segmenter.on_seek(beat);
        self.scorer.on_seek(beat);
        self.discard_pending_samples();
        self.emit_transport(true);
        position
    }

    /// Starts the performance over from the beginning (or the medley
    /// countdown) with an empty recording and score.
    pub fn restart(&mut self) {
        self.rebuild_evaluation();
        let start = self.start_millis();
        self.sync.seek(start);
        self.discard_pending_samples();
        self.sync.play();
        self.emit_session_state();
        self.emit_transport(true);
    }

    pub fn drain_events(&mut self) -> Vec<Event> {
        self.events.drain(..).collect()
    }

    pub fn settings(&self) -> &SettingsDto {
        &self.settings
    }

    pub fn voice(&self) -> &Voice {
        &self.voice
    }

    pub fn medley_window(&self) -> Option<&MedleyWindow> {
        self.medley.as_ref()
    }

    pub fn state(&self) -> TransportState {
        self.sync.clock().state()
    }

    pub fn position_millis(&self) -> Millis {
        self.sync.clock().position_millis()
    }

    pub fn current_beat(&self) -> Beat {
        self.sync.clock().current_beat()
    }

    pub fn score(&self) -> ScoreSnapshot {
        self.scorer.snapshot()
    }

    pub fn current_rating(&self) -> Option<SentenceRating> {
        self.scorer.current_rating()
    }

    pub fn recorded_notes(&self) -> &[RecordedNote] {
        self.segmenter.recorded_notes()
    }

    /// Finished sentences of the current attempt, in the order they were rated.
    pub fn sentence_scores(&self) -> &[SentenceScore] {
        &self.sentence_scores
    }

    pub fn synchronizer(&self) -> &PlaybackSynchronizer {
        &self.sync
    }

    pub fn export_diagnostics(&self, dir: &Path) -> Result<(), SessionError> {
        let performance = PerformanceDump {
            title: self.chart.meta.title.as_deref(),
            voice: self.voice.id.as_str(),
            recorded_notes: self.segmenter.recorded_notes(),
            sentences: &self.sentence_scores,
            score: self.scorer.snapshot(),
        };
        export_diagnostics(dir, &self.settings, &performance)?;
        info!("diagnostics written to {}", dir.display());
        Ok(())
    }

    fn sung_millis(&self, position: Millis) -> Millis {
        position - self.settings.mic_delay_millis as Millis
    }

    /// The detector's own frame id drives de-duplication, so a frame
    /// delivered again on a later tick is ignored.
    fn record_sample(&mut self, sample: PitchSample, position: Millis) -> SampleOutcome {
        let sample_millis = self.sung_millis(position);
        let sample_beat = self.time.millis_to_beats(sample_millis);
        let outcome = self.segmenter.on_pitch_sample(
            sample.midi_note,
            sample_beat,
            sample_millis,
            sample.frame,
        );
        if let SampleOutcome::Started { note, .. } = outcome {
            let note = &self.segmenter.recorded_notes()[note];
            self.events.push_back(Event::RecordedNoteStarted {
                midi_note: note.midi_note,
                start_beat: note.start_beat,
            });
        }
        outcome
    }

    fn take_latest_sample(&mut self) -> Option<PitchSample> {
        let mut latest = None;
        while let Ok(sample) = self.pitch_rx.pop() {
            latest = Some(sample);
        }
        latest
    }

    fn discard_pending_samples(&mut self) {
        while self.pitch_rx.pop().is_ok() {}
    }

    fn set_medley_mode(&mut self, enabled: bool) -> Result<(), SessionError> {
        self.medley = if enabled {
            let cfg = MedleyConfig {
                target_duration_seconds: self.settings.medley_target_duration_seconds,
                countdown_seconds: self.settings.countdown_seconds,
            };
            Some(compute_medley_window(&self.chart, cfg)?)
        } else {
            None
        };
        self.sync
            .clock_mut()
            .set_end_millis(self.medley.map(|window| window.end_millis));
        self.rebuild_evaluation();
        let start = self.start_millis();
        self.sync.seek(start);
        self.discard_pending_samples();
        self.volumes = None;
        self.emit_session_state();
        Ok(())
    }

    fn rebuild_evaluation(&mut self) {
        let cfg = ScorerConfig {
            difficulty: self.settings.difficulty,
        };
        self.segmenter = NoteSegmenter::new(&self.voice, self.medley);
        self.scorer = PerformanceScorer::new(&self.voice, cfg, self.medley);
        self.sentence_scores.clear();
    }

    fn start_millis(&self) -> Millis {
        self.medley
            .map(|window| window.start_with_countdown_millis)
            .unwrap_or(0.0)
    }

    fn apply_volumes(&mut self) {
        let fade = match self.medley.as_ref() {
            Some(window) => medley_fade(
                window,
                self.sync.clock().position_millis(),
                self.settings.fade_in_millis as Millis,
                self.settings.fade_out_millis as Millis,
            ),
            None => 1.0,
        };
        let has_split = self.sync.has_track(TrackKind::Instrumental)
            && self.sync.has_track(TrackKind::Vocals);
        let volumes = mix_volumes(&self.settings, has_split, fade);
        if self.volumes == Some(volumes) {
            return;
        }
        for kind in [TrackKind::OriginalMix, TrackKind::Instrumental, TrackKind::Vocals] {
            if let Some(volume) = volumes.get(kind) {
                self.sync.set_volume(kind, volume);
            }
        }
        self.volumes = Some(volumes);
    }

    fn emit_session_state(&mut self) {
        self.events.push_back(Event::SessionStateUpdated {
            state: self.sync.clock().state(),
            medley: self.medley.is_some(),
        });
    }

    fn emit_transport(&mut self, force: bool) {
        if !force && self.since_transport_emit < TRANSPORT_EMIT_INTERVAL_MILLIS {
            return;
        }
        let clock = self.sync.clock();
        self.events.push_back(Event::TransportUpdated {
            position_millis: clock.position_millis(),
            beat: clock.current_beat(),
            playing: clock.is_playing(),
        });
        self.since_transport_emit = 0.0;
    }

    fn save_settings(&self) {
        if let Some(storage) = self.storage.as_ref() {
            if let Err(err) = storage.save_settings(&self.settings) {
                warn!("settings not saved: {err}");
            }
        }
    }
}
