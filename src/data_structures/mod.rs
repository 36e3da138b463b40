mod signal;
mod state;
mod timeline;
pub use signal::*;
pub use state::*;
pub use timeline::*;
