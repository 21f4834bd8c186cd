pub mod config;
pub mod snapshot;
pub mod watch;

pub use config::*;
pub use snapshot::*;
pub use watch::*;
