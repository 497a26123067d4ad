pub mod config;
pub mod error;
pub mod status;

pub use config::{Config, SchedulerConfig, ServerConfig};
pub use error::*;
pub use status::*;
