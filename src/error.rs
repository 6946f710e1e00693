//! Error type shared by the katas and the command line front end.

use thiserror::Error;

/// Errors that can occur while reading instances, solving them or rendering plots.
#[derive(Debug, Error)]
pub enum KataError {
    /// Reading an instance file failed.
    #[error("i/o error: {0}")]
    Io(#[from] std::io::Error),

    /// An instance file contained a line that could not be parsed.
    #[error("line {line}: {message}")]
    Parse {
        /// 1-based line number, or 0 when the whole file is at fault.
        line: usize,
        /// What was wrong with the line.
        message: String,
    },

    /// The operation needs at least one item of the given kind.
    #[error("no {0} given")]
    EmptyInstance(&'static str),

    /// The number of tiles does not fill the requested grid.
    #[error("board needs {expected} tiles, got {got}")]
    InvalidBoard {
        /// Cells in the grid.
        expected: usize,
        /// Squares supplied.
        got: usize,
    },

    /// A numeric option is out of range.
    #[error("invalid parameter: {0}")]
    InvalidParameter(String),

    /// Rendering a plot image failed.
    #[error("plot failed: {0}")]
    Plot(String),

    /// A result did not agree with its brute-force reference.
    #[error("verification failed: {0}")]
    Verification(String),
}

impl KataError {
    pub(crate) fn parse(line: usize, message: impl Into<String>) -> Self {
        Self::Parse {
            line,
            message: message.into(),
        }
    }
}

/// Result type for kata operations.
pub type Result<T> = std::result::Result<T, KataError>;
