use crate::model::{Chart, ChartError, Voice};
use crate::timing::TimeModel;
use encore_ports::types::{Beat, Millis};
use log::debug;
use serde::{Deserialize, Serialize};

#[derive(Clone, Copy, Debug)]
pub struct MedleyConfig {
    pub target_duration_seconds: u32,
    pub countdown_seconds: u32,
}

/// Beat window of a partial playthrough, fixed once the song is loaded.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct MedleyWindow {
    pub start_beat: i32,
    pub end_beat: i32,
    pub start_millis: Millis,
    pub start_with_countdown_millis: Millis,
    pub end_millis: Millis,
}

impl MedleyWindow {
    /// Inclusive on both ends.
    pub fn contains(&self, beat: Beat) -> bool {
        self.start_beat as Beat <= beat && beat <= self.end_beat as Beat
    }

    pub fn duration_with_countdown_millis(&self) -> Millis {
        self.end_millis - self.start_with_countdown_millis
    }
}

/// Without an active medley every beat is in range.
pub fn is_beat_in_range(window: Option<&MedleyWindow>, beat: Beat) -> bool {
    window.map_or(true, |window| window.contains(beat))
}

pub fn compute_medley_window(chart: &Chart, cfg: MedleyConfig) -> Result<MedleyWindow, ChartError> {
    let time = chart.time_model()?;
    let voice = chart.first_voice()?;
    let overrides = chart.meta.medley;

    let start_beat = match overrides.start_beat.filter(|beat| *beat > 0) {
        Some(beat) => beat,
        None => {
            let midpoint = song_midpoint_beat(voice, &time, chart.meta.duration_millis);
            default_medley_start_beat(voice, midpoint)
        }
    };

    // An authored end keeps its exact millis; its beat is rounded up so the
    // inclusive beat range still covers everything played.
    let (end_beat, end_millis) = match overrides.end_millis.filter(|millis| *millis > 0.0) {
        Some(millis) => (time.millis_to_beats(millis).ceil() as i32, millis),
        None => {
            let target_millis = cfg.target_duration_seconds as Millis * 1000.0;
            let target_end = start_beat as Beat + time.millis_to_beats_without_gap(target_millis);
            let beat = default_medley_end_beat(voice, start_beat, target_end);
            (beat, time.beats_to_millis(beat as Beat))
        }
    };

    let start_millis = time.beats_to_millis(start_beat as Beat);
    let countdown_millis = cfg.countdown_seconds as Millis * 1000.0;
    let window = MedleyWindow {
        start_beat,
        end_beat,
        start_millis,
        start_with_countdown_millis: (start_millis - countdown_millis).max(0.0),
        end_millis,
    };
    debug!(
        "medley window beats {}..={} ({:.0}ms..{:.0}ms)",
        window.start_beat, window.end_beat, window.start_with_countdown_millis, window.end_millis
    );
    Ok(window)
}

/// Half of the audio length when known, otherwise the middle of the sung range.
pub fn song_midpoint_beat(voice: &Voice, time: &TimeModel, duration_millis: Millis) -> Beat {
    if duration_millis > 0.0 {
        return time.millis_to_beats(duration_millis / 2.0);
    }
    match (voice.min_beat(), voice.max_beat()) {
        (Some(min), Some(max)) => (min + max) as Beat / 2.0,
        _ => 0.0,
    }
}

/// Start of the last sentence that ends before the midpoint.
pub fn default_medley_start_beat(voice: &Voice, midpoint_beat: Beat) -> i32 {
    voice
        .sorted_sentences()
        .into_iter()
        .filter(|sentence| (sentence.max_beat() as Beat) < midpoint_beat)
        .last()
        .map(|sentence| sentence.min_beat())
        .unwrap_or_else(|| midpoint_beat.floor() as i32)
}

/// End of the later sentence whose end is closest to `target_end_beat`.
/// Ties keep the first sentence in chart order.
pub fn default_medley_end_beat(voice: &Voice, start_beat: i32, target_end_beat: Beat) -> i32 {
    let mut best: Option<(i32, Beat)> = None;
    for sentence in &voice.sentences {
        if sentence.min_beat() <= start_beat {
            continue;
        }
        let end = sentence.max_beat();
        let distance = (end as Beat - target_end_beat).abs();
        match best {
            Some((_, best_distance)) if distance >= best_distance => {}
            _ => best = Some((end, distance)),
        }
    }
    best.map(|(end, _)| end).unwrap_or(start_beat + 1)
}
