use crate::transport::{PlaybackClock, TransportState};
use encore_ports::track::{TrackError, TrackPort};
use encore_ports::types::{Millis, TrackKind, Volume01};
use log::{debug, info, warn};
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug)]
pub struct SyncConfig {
    /// Minimum playback time between two smooth corrections.
    pub smooth_interval_millis: Millis,
    /// Drift that takes this long to absorb at `1 + drift / divisor`.
    pub smoothing_divisor_millis: Millis,
    pub min_speed: f64,
    pub max_speed: f64,
    pub negligible_drift_millis: Millis,
    /// Larger drift is corrected by seeking instead of speeding up.
    pub hard_resync_drift_millis: Millis,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            smooth_interval_millis: 500.0,
            smoothing_divisor_millis: 2000.0,
            min_speed: 0.5,
            max_speed: 1.5,
            negligible_drift_millis: 40.0,
            hard_resync_drift_millis: 3000.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncMode {
    /// Jump the track to the target immediately.
    Hard,
    /// Bend the track's playback speed towards the target.
    Smooth,
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum SyncAction {
    Unchanged,
    /// Negative gap not reached yet; the track waits at its start.
    WaitingForGap,
    HardSynced { position_millis: Millis },
    Smoothing { drift_millis: Millis, speed: f64 },
    SpeedRestored,
    Paused,
    Unavailable,
}

struct SecondaryTrack {
    port: Box<dyn TrackPort>,
    gap_millis: Millis,
    needs_hard_sync: bool,
    speed: f64,
    unavailable: bool,
}

impl SecondaryTrack {
    fn kind(&self) -> TrackKind {
        self.port.kind()
    }
}

pub struct PlaybackSynchronizer {
    cfg: SyncConfig,
    clock: PlaybackClock,
    tracks: Vec<SecondaryTrack>,
    since_smooth_sync_millis: Millis,
}

impl PlaybackSynchronizer {
    pub fn new(clock: PlaybackClock, cfg: SyncConfig) -> Self {
        Self {
            cfg,
            clock,
            tracks: Vec::new(),
            since_smooth_sync_millis: 0.0,
        }
    }

    /// `gap_millis` is added to the clock position to get the track position.
    pub fn add_track(&mut self, port: Box<dyn TrackPort>, gap_millis: Millis) {
        let unavailable = !port.is_available();
        if unavailable {
            warn!("{} track unavailable, playing without it", port.kind());
        }
        self.tracks.push(SecondaryTrack {
            port,
            gap_millis,
            needs_hard_sync: true,
            speed: 1.0,
            unavailable,
        });
    }

    pub fn clock(&self) -> &PlaybackClock {
        &self.clock
    }

    pub fn clock_mut(&mut self) -> &mut PlaybackClock {
        &mut self.clock
    }

    pub fn has_track(&self, kind: TrackKind) -> bool {
        self.tracks
            .iter()
            .any(|track| track.kind() == kind && !track.unavailable)
    }

    pub fn track_speed(&self, kind: TrackKind) -> Option<f64> {
        self.tracks
            .iter()
            .find(|track| track.kind() == kind)
            .map(|track| track.speed)
    }

    pub fn play(&mut self) {
        if self.clock.state() != TransportState::Playing {
            info!("playback starts at {:.0}ms", self.clock.position_millis());
        }
        self.clock.play();
        self.request_hard_sync();
        self.sync_all(false);
    }

    pub fn pause(&mut self) {
        self.clock.pause();
        self.sync_all(false);
    }

    pub fn stop(&mut self) {
        self.clock.stop();
        self.sync_all(false);
    }

    /// Applies the new position and drops any speed correction in one step;
    /// tracks are re-aligned on the next sync.
    pub fn seek(&mut self, target_millis: Millis) -> Millis {
        let position = self.clock.seek(target_millis);
        for idx in 0..self.tracks.len() {
            self.tracks[idx].needs_hard_sync = true;
            if self.tracks[idx].speed != 1.0 {
                self.set_speed(idx, 1.0);
            }
        }
        self.since_smooth_sync_millis = 0.0;
        info!("seek to {:.0}ms", position);
        position
    }

    /// Advances the clock and reconciles every track. Returns true when the
    /// clock reached its end on this tick.
    pub fn advance(&mut self, delta_millis: Millis) -> bool {
        let finished = self.clock.advance(delta_millis);
        if delta_millis > 0.0 && self.clock.is_playing() {
            self.since_smooth_sync_millis += delta_millis;
        }
        let smooth_due = self.since_smooth_sync_millis >= self.cfg.smooth_interval_millis;
        self.sync_all(smooth_due);
        if smooth_due {
            self.since_smooth_sync_millis = 0.0;
        }
        finished
    }

    pub fn set_volume(&mut self, kind: TrackKind, volume: Volume01) {
        for idx in 0..self.tracks.len() {
            if self.tracks[idx].kind() != kind || self.tracks[idx].unavailable {
                continue;
            }
            let result = self.tracks[idx].port.set_volume(volume);
            self.check(idx, result);
        }
    }

    /// Runs one sync step for `kind` against the clock.
    pub fn sync_track(&mut self, kind: TrackKind, mode: SyncMode) -> SyncAction {
        let Some(idx) = self.tracks.iter().position(|track| track.kind() == kind) else {
            return SyncAction::Unavailable;
        };
        if mode == SyncMode::Hard {
            self.tracks[idx].needs_hard_sync = true;
        }
        self.sync_secondary_track(idx, mode == SyncMode::Smooth)
    }

    fn request_hard_sync(&mut self) {
        for track in &mut self.tracks {
            track.needs_hard_sync = true;
        }
    }

    fn sync_all(&mut self, smooth_due: bool) {
        for idx in 0..self.tracks.len() {
            let action = self.sync_secondary_track(idx, smooth_due);
            if !matches!(action, SyncAction::Unchanged | SyncAction::WaitingForGap) {
                debug!("{} track: {:?}", self.tracks[idx].kind(), action);
            }
        }
    }

    fn sync_secondary_track(&mut self, idx: usize, smooth: bool) -> SyncAction {
        if self.tracks[idx].unavailable || !self.tracks[idx].port.is_available() {
            self.tracks[idx].unavailable = true;
            return SyncAction::Unavailable;
        }

        let target = self.clock.position_millis() + self.tracks[idx].gap_millis;

        if !self.clock.is_playing() {
            if self.tracks[idx].port.is_playing() {
                let result = self.tracks[idx].port.pause();
                if !self.check(idx, result) {
                    return SyncAction::Unavailable;
                }
                return SyncAction::Paused;
            }
            return SyncAction::Unchanged;
        }

        if target < 0.0 {
            return self.wait_for_gap(idx);
        }

        if self.tracks[idx].needs_hard_sync {
            return self.hard_sync(idx, target);
        }

        if !smooth || !self.tracks[idx].port.is_playing() {
            return SyncAction::Unchanged;
        }

        let drift = target - self.tracks[idx].port.position_millis();
        if drift.abs() > self.cfg.hard_resync_drift_millis {
            return self.hard_sync(idx, target);
        }
        if drift.abs() < self.cfg.negligible_drift_millis {
            if self.tracks[idx].speed != 1.0 {
                self.set_speed(idx, 1.0);
                return SyncAction::SpeedRestored;
            }
            return SyncAction::Unchanged;
        }

        let speed = smoothing_speed(drift, &self.cfg);
        if !self.set_speed(idx, speed) {
            return SyncAction::Unavailable;
        }
        SyncAction::Smoothing {
            drift_millis: drift,
            speed,
        }
    }

    fn wait_for_gap(&mut self, idx: usize) -> SyncAction {
        let track = &mut self.tracks[idx];
        // Keep the hard sync pending so the track starts at its beginning.
        track.needs_hard_sync = true;
        let mut result = Ok(());
        if track.port.is_playing() {
            result = track.port.pause();
        }
        if result.is_ok() && track.port.position_millis() != 0.0 {
            result = track.port.seek(0.0);
        }
        if !self.check(idx, result) {
            return SyncAction::Unavailable;
        }
        SyncAction::WaitingForGap
    }

    fn hard_sync(&mut self, idx: usize, target: Millis) -> SyncAction {
        if self.tracks[idx].speed != 1.0 && !self.set_speed(idx, 1.0) {
            return SyncAction::Unavailable;
        }
        let track = &mut self.tracks[idx];
        let mut result = track.port.seek(target);
        if result.is_ok() && !track.port.is_playing() {
            result = track.port.play();
        }
        if !self.check(idx, result) {
            return SyncAction::Unavailable;
        }
        self.tracks[idx].needs_hard_sync = false;
        SyncAction::HardSynced {
            position_millis: target,
        }
    }

    fn set_speed(&mut self, idx: usize, speed: f64) -> bool {
        let result = self.tracks[idx].port.set_playback_speed(speed);
        if self.check(idx, result) {
            self.tracks[idx].speed = speed;
            return true;
        }
        false
    }

    /// A failing track is dropped from syncing for the rest of the session.
    fn check(&mut self, idx: usize, result: Result<(), TrackError>) -> bool {
        match result {
            Ok(()) => true,
            Err(err) => {
                let track = &mut self.tracks[idx];
                warn!("{} track failed, disabling it: {}", track.kind(), err);
                track.unavailable = true;
                false
            }
        }
    }
}

pub fn smoothing_speed(drift_millis: Millis, cfg: &SyncConfig) -> f64 {
    (1.0 + drift_millis / cfg.smoothing_divisor_millis).clamp(cfg.min_speed, cfg.max_speed)
}
