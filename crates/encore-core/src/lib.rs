pub mod app;
pub mod audio_params;
pub mod diagnostics;
pub mod fade;
pub mod ipc;
pub mod sync;
pub mod transport;

pub use app::*;
pub use audio_params::*;
pub use diagnostics::*;
pub use fade::*;
pub use ipc::*;
pub use sync::*;
pub use transport::*;
