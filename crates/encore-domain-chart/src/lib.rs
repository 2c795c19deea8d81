pub mod medley;
pub mod model;
pub mod timing;
pub mod voices;

pub use medley::*;
pub use model::*;
pub use timing::*;
pub use voices::*;
