pub mod rating;
pub mod scorer;
pub mod segmenter;

pub use rating::*;
pub use scorer::*;
pub use segmenter::*;
