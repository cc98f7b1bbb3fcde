//! Error types for the simulation.

use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Parse error on line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Unexpected end of input on line {line}: expected {expected}")]
    UnexpectedEof { line: usize, expected: String },

    #[error("Invalid state: {0}")]
    InvalidState(String),

    #[error(
        "Bookkeeping mismatch: {old_age} old age + {starvation} starvation + {crowding} crowding != {removed} removed"
    )]
    Bookkeeping {
        old_age: usize,
        starvation: usize,
        crowding: usize,
        removed: usize,
    },
}

impl Error {
    pub fn parse(line: usize, message: impl Into<String>) -> Self {
        Error::Parse {
            line,
            message: message.into(),
        }
    }

    pub fn eof(line: usize, expected: impl Into<String>) -> Self {
        Error::UnexpectedEof {
            line,
            expected: expected.into(),
        }
    }

    /// True for errors produced while reading an ecosystem description.
    pub fn is_load_error(&self) -> bool {
        matches!(
            self,
            Error::Io(_)
                | Error::Parse { .. }
                | Error::UnexpectedEof { .. }
                | Error::InvalidArgument(_)
        )
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Serialization(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_messages() {
        let err = Error::parse(4, "invalid float literal");
        assert_eq!(err.to_string(), "Parse error on line 4: invalid float literal");

        let err = Error::eof(14, "species");
        assert!(err.to_string().contains("expected species"));
        assert!(err.is_load_error());

        let err = Error::Bookkeeping {
            old_age: 1,
            starvation: 2,
            crowding: 3,
            removed: 7,
        };
        assert!(!err.is_load_error());
        assert!(err.to_string().contains("!= 7 removed"));
    }
}
