use crate::types::*;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// One observation from the external pitch detector.
/// `midi_note <= 0` means silence or no detection. `frame` is the detector's
/// analysis frame; a frame is consumed at most once.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PitchSample {
    pub midi_note: i32,
    pub frame: FrameId,
}

/// Detector callback: may be invoked from any thread at any cadence.
pub type PitchSampleCallback = Arc<dyn Fn(PitchSample) + Send + Sync + 'static>;
