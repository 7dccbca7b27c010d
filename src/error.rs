//! Error types for puzzle loading and solver setup.

use std::fmt;
use std::io;

/// Failures surfaced while loading a puzzle or preparing the solver. The
/// search itself cannot fail; every precondition is checked here first.
#[derive(Debug)]
pub enum Error {
    /// The pieces file could not be read.
    Io(io::Error),

    /// The pieces file held no usable piece lines.
    NoPieces,

    /// More pieces than the widest piece mask can track.
    TooManyPieces { count: usize, max: usize },

    /// An edge color beyond what the widest edge class can encode.
    TooManyColors { max_color: u64, limit: u64 },
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Io(e) => write!(f, "failed to read pieces file: {}", e),
            Error::NoPieces => write!(f, "pieces file contains no pieces"),
            Error::TooManyPieces { count, max } => {
                write!(f, "too many pieces: {} loaded, at most {} supported", count, max)
            }
            Error::TooManyColors { max_color, limit } => {
                write!(
                    f,
                    "too many edge colors: {} used, at most {} supported",
                    max_color, limit
                )
            }
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Error::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Error::Io(e)
    }
}
