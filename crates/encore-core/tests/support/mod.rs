#![allow(dead_code)]

use encore_ports::track::{TrackError, TrackPort};
use encore_ports::types::{Millis, TrackKind, Volume01};
use parking_lot::Mutex;
use std::sync::Arc;

#[derive(Debug)]
pub struct FakeTrackState {
    pub available: bool,
    pub playing: bool,
    pub position_millis: Millis,
    pub speed: f64,
    pub volume: Volume01,
    pub seeks: Vec<Millis>,
    pub fail_seek: bool,
}

/// In-memory player. The test moves its position explicitly.
#[derive(Clone)]
pub struct FakeTrack {
    kind: TrackKind,
    pub state: Arc<Mutex<FakeTrackState>>,
}

impl FakeTrack {
    pub fn new(kind: TrackKind) -> Self {
        Self {
            kind,
            state: Arc::new(Mutex::new(FakeTrackState {
                available: true,
                playing: false,
                position_millis: 0.0,
                speed: 1.0,
                volume: Volume01::new(1.0),
                seeks: Vec::new(),
                fail_seek: false,
            })),
        }
    }

    pub fn missing(kind: TrackKind) -> Self {
        let track = Self::new(kind);
        track.state.lock().available = false;
        track
    }

    pub fn boxed(&self) -> Box<dyn TrackPort> {
        Box::new(self.clone())
    }

    /// Plays `millis` of wall time at the current speed.
    pub fn run(&self, millis: Millis) {
        let mut state = self.state.lock();
        if state.playing {
            state.position_millis += millis * state.speed;
        }
    }

    pub fn set_position(&self, millis: Millis) {
        self.state.lock().position_millis = millis;
    }

    pub fn playing(&self) -> bool {
        self.state.lock().playing
    }

    pub fn position(&self) -> Millis {
        self.state.lock().position_millis
    }

    pub fn speed(&self) -> f64 {
        self.state.lock().speed
    }

    pub fn volume(&self) -> f32 {
        self.state.lock().volume.get()
    }

    pub fn seeks(&self) -> Vec<Millis> {
        self.state.lock().seeks.clone()
    }
}

impl TrackPort for FakeTrack {
    fn kind(&self) -> TrackKind {
        self.kind
    }

    fn is_available(&self) -> bool {
        self.state.lock().available
    }

    fn is_playing(&self) -> bool {
        self.state.lock().playing
    }

    fn play(&mut self) -> Result<(), TrackError> {
        let mut state = self.state.lock();
        if !state.available {
            return Err(TrackError::Unavailable(self.kind));
        }
        state.playing = true;
        Ok(())
    }

    fn pause(&mut self) -> Result<(), TrackError> {
        self.state.lock().playing = false;
        Ok(())
    }

    fn seek(&mut self, millis: Millis) -> Result<(), TrackError> {
        let mut state = self.state.lock();
        if state.fail_seek {
            return Err(TrackError::Backend("decoder gone".to_string()));
        }
        state.position_millis = millis;
        state.seeks.push(millis);
        Ok(())
    }

    fn position_millis(&self) -> Millis {
        self.state.lock().position_millis
    }

    fn set_playback_speed(&mut self, factor: f64) -> Result<(), TrackError> {
        self.state.lock().speed = factor;
        Ok(())
    }

    fn set_volume(&mut self, volume: Volume01) -> Result<(), TrackError> {
        self.state.lock().volume = volume;
        Ok(())
    }
}
