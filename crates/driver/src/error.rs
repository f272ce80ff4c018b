use std::io;
use std::path::PathBuf;

use thiserror::Error;
use typefuzz_engine::{ConfigError, RunError};

/// Anything that stops a run before a report exists.
#[derive(Debug, Error)]
pub enum DriverError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Run(#[from] RunError),

    #[error("cannot open JSON log {}: {source}", path.display())]
    Log {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
