pub mod analysis;
pub mod config;
pub mod error;
pub mod pipeline;
pub mod process;
pub mod render;
pub mod report;

pub use config::Config;
pub use error::{ErrorKind, Result, TrackerError};
pub use pipeline::{run, RunSummary};
