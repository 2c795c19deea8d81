use crate::model::ChartError;
use encore_ports::types::{Beat, Millis};

/// Tempos closer than this to zero have no defined beat length.
pub const MIN_BPM_MAGNITUDE: f64 = 1.0;

const MILLIS_PER_MINUTE: f64 = 60_000.0;

pub fn beats_to_millis(bpm: f64, gap_millis: Millis, beats: Beat) -> Result<Millis, ChartError> {
    Ok(beats_to_millis_without_gap(bpm, beats)? + gap_millis)
}

pub fn beats_to_millis_without_gap(bpm: f64, beats: Beat) -> Result<Millis, ChartError> {
    check_bpm(bpm)?;
    Ok(beats * MILLIS_PER_MINUTE / bpm)
}

pub fn millis_to_beats(bpm: f64, gap_millis: Millis, millis: Millis) -> Result<Beat, ChartError> {
    millis_to_beats_without_gap(bpm, millis - gap_millis)
}

pub fn millis_to_beats_without_gap(bpm: f64, millis: Millis) -> Result<Beat, ChartError> {
    check_bpm(bpm)?;
    Ok(millis * bpm / MILLIS_PER_MINUTE)
}

pub fn millis_per_beat(bpm: f64) -> Result<Millis, ChartError> {
    Ok(beats_to_millis_without_gap(bpm, 1.0)? - beats_to_millis_without_gap(bpm, 0.0)?)
}

fn check_bpm(bpm: f64) -> Result<(), ChartError> {
    // NaN fails the comparison as well.
    if bpm.abs() >= MIN_BPM_MAGNITUDE {
        Ok(())
    } else {
        Err(ChartError::InvalidTempo(bpm))
    }
}

/// Tempo and gap validated once, for conversions on the per-tick path.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TimeModel {
    bpm: f64,
    gap_millis: Millis,
}

impl TimeModel {
    pub fn new(bpm: f64, gap_millis: Millis) -> Result<Self, ChartError> {
        check_bpm(bpm)?;
        Ok(Self { bpm, gap_millis })
    }

    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    pub fn gap_millis(&self) -> Millis {
        self.gap_millis
    }

    pub fn beats_to_millis(&self, beats: Beat) -> Millis {
        beats * MILLIS_PER_MINUTE / self.bpm + self.gap_millis
    }

    pub fn beats_to_millis_without_gap(&self, beats: Beat) -> Millis {
        beats * MILLIS_PER_MINUTE / self.bpm
    }

    pub fn millis_to_beats(&self, millis: Millis) -> Beat {
        (millis - self.gap_millis) * self.bpm / MILLIS_PER_MINUTE
    }

    pub fn millis_to_beats_without_gap(&self, millis: Millis) -> Beat {
        millis * self.bpm / MILLIS_PER_MINUTE
    }

    pub fn millis_per_beat(&self) -> Millis {
        MILLIS_PER_MINUTE / self.bpm
    }
}
