//! Errors reported while loading the input or running a simulation.
//!
//! Every error is fatal: the simulation does not start, or stops at the
//! cycle that hit it.

use std::io;
use std::path::PathBuf;

use scheduler::SchedulerError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// A line of an arrival or instruction file is malformed.
    #[error("{origin}, line {line}: {message}")]
    Format {
        origin: String,
        line: usize,
        message: String,
    },

    /// An arrival file or a process instruction file does not exist.
    #[error("`{}` not found", path.display())]
    NotFound { path: PathBuf },

    /// The termination probability is outside `[0, 1]`.
    #[error("termination probability must be between 0 and 1, got {0}")]
    InvalidProbability(f64),

    #[error("cannot read `{}`: {source}", path.display())]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The trace sink cannot be written.
    #[error("trace output failed: {0}")]
    Io(#[from] io::Error),

    #[error(transparent)]
    Scheduler(#[from] SchedulerError),
}

impl Error {
    pub(crate) fn format(origin: &str, line: usize, message: impl Into<String>) -> Self {
        Error::Format {
            origin: origin.to_string(),
            line,
            message: message.into(),
        }
    }

    /// Replaces the origin of a format error, other errors are returned unchanged.
    pub(crate) fn with_origin(self, origin: impl Into<String>) -> Self {
        match self {
            Error::Format { line, message, .. } => Error::Format {
                origin: origin.into(),
                line,
                message,
            },
            other => other,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
