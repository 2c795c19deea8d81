pub mod pitch;
pub mod storage;
pub mod track;
pub mod types;

pub use pitch::*;
pub use storage::*;
pub use track::*;
pub use types::*;
