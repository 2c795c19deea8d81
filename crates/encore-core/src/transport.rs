use encore_domain_chart::TimeModel;
use encore_ports::types::{Beat, Millis};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum TransportState {
    Stopped,
    Playing,
    Paused,
}

/// Authoritative playback position. Moves forward only while playing and
/// otherwise changes only through [`PlaybackClock::seek`].
#[derive(Clone, Debug)]
pub struct PlaybackClock {
    state: TransportState,
    time: TimeModel,
    position_millis: Millis,
    duration_millis: Millis,
    end_millis: Millis,
}

impl PlaybackClock {
    pub fn new(time: TimeModel, duration_millis: Millis) -> Self {
        let duration_millis = duration_millis.max(1.0);
        Self {
            state: TransportState::Stopped,
            time,
            position_millis: 0.0,
            duration_millis,
            end_millis: duration_millis,
        }
    }

    pub fn state(&self) -> TransportState {
        self.state
    }

    pub fn is_playing(&self) -> bool {
        self.state == TransportState::Playing
    }

    pub fn play(&mut self) {
        self.state = TransportState::Playing;
    }

    pub fn pause(&mut self) {
        if self.state == TransportState::Playing {
            self.state = TransportState::Paused;
        }
    }

    pub fn stop(&mut self) {
        self.state = TransportState::Stopped;
    }

    /// Clamps into `[0, duration - 1]` and returns the applied position.
    pub fn seek(&mut self, target_millis: Millis) -> Millis {
        let last = (self.duration_millis - 1.0).max(0.0);
        self.position_millis = if target_millis.is_nan() {
            0.0
        } else {
            target_millis.clamp(0.0, last)
        };
        self.position_millis
    }

    /// Moves the position by `delta_millis` while playing. Returns true when
    /// this call reached the end and stopped the clock.
    pub fn advance(&mut self, delta_millis: Millis) -> bool {
        if self.state != TransportState::Playing || !(delta_millis > 0.0) {
            return false;
        }
        self.position_millis += delta_millis;
        if self.position_millis >= self.end_millis {
            self.position_millis = self.end_millis;
            self.state = TransportState::Stopped;
            return true;
        }
        false
    }

    /// Playback finishes here instead of at the end of the audio.
    pub fn set_end_millis(&mut self, end_millis: Option<Millis>) {
        self.end_millis = end_millis
            .map(|end| end.min(self.duration_millis))
            .unwrap_or(self.duration_millis);
    }

    pub fn position_millis(&self) -> Millis {
        self.position_millis
    }

    pub fn current_beat(&self) -> Beat {
        self.time.millis_to_beats(self.position_millis)
    }

    pub fn duration_millis(&self) -> Millis {
        self.duration_millis
    }

    pub fn end_millis(&self) -> Millis {
        self.end_millis
    }

    pub fn time_model(&self) -> &TimeModel {
        &self.time
    }
}
