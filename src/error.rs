use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SummaryError {
    /// The input file could not be opened or read.
    #[error("failed to read {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Argument(String),

    /// The document store rejected a write or could not be reached.
    #[error("persistence failed")]
    Persistence(#[from] sqlx::Error),

    #[error("failed to apply store migrations")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("failed to write report {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

pub type Result<T> = std::result::Result<T, SummaryError>;
