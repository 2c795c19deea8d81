use serde::{Deserialize, Serialize};

/// Qualitative band for a finished sentence. Declared worst to best, so the
/// derived ordering ranks `Perfect` highest.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SentenceRating {
    Awful,
    Poor,
    Bad,
    NotBad,
    Good,
    Great,
    Cool,
    Perfect,
}

impl SentenceRating {
    /// Best band first.
    pub const ALL: [SentenceRating; 8] = [
        SentenceRating::Perfect,
        SentenceRating::Cool,
        SentenceRating::Great,
        SentenceRating::Good,
        SentenceRating::NotBad,
        SentenceRating::Bad,
        SentenceRating::Poor,
        SentenceRating::Awful,
    ];

    pub fn percentage_threshold(self) -> f64 {
        match self {
            SentenceRating::Perfect => 0.95,
            SentenceRating::Cool => 0.8,
            SentenceRating::Great => 0.65,
            SentenceRating::Good => 0.5,
            SentenceRating::NotBad => 0.35,
            SentenceRating::Bad => 0.2,
            SentenceRating::Poor => 0.1,
            SentenceRating::Awful => 0.0,
        }
    }

    /// Highest band whose threshold does not exceed `percentage`.
    pub fn from_percentage(percentage: f64) -> Self {
        Self::ALL
            .into_iter()
            .find(|rating| rating.percentage_threshold() <= percentage)
            .unwrap_or(SentenceRating::Awful)
    }

    pub fn name(self) -> &'static str {
        match self {
            SentenceRating::Perfect => "perfect",
            SentenceRating::Cool => "cool",
            SentenceRating::Great => "great",
            SentenceRating::Good => "good",
            SentenceRating::NotBad => "not bad",
            SentenceRating::Bad => "bad",
            SentenceRating::Poor => "poor",
            SentenceRating::Awful => "awful",
        }
    }
}
