//! Errors shared by all colframe crates.

use std::fmt;

#[derive(Debug, thiserror::Error)]
pub enum FrameError {
    #[error("Length mismatch for column '{column}': expected {expected} rows, got {got}")]
    LengthMismatch {
        column: String,
        expected: usize,
        got: usize,
    },

    #[error("Shape error: {0}")]
    Shape(String),

    #[error("Type mismatch ({context}): expected {expected}, got {got}")]
    TypeMismatch {
        context: String,
        expected: String,
        got: String,
    },

    #[error("{0}")]
    Parse(String),

    #[error("Column not found: '{0}'")]
    ColumnNotFound(String),

    #[error("Duplicate column name: '{0}'")]
    DuplicateColumn(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("Not implemented: {0}")]
    NotImplemented(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Coarse classification of an error.
///
/// Lets callers branch on the class of failure without inspecting payloads.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Lengths or shapes don't line up.
    Shape,
    /// Incompatible data types.
    Type,
    /// Malformed external data.
    Parse,
    /// Unknown or ambiguous column labels.
    Lookup,
    /// Bad arguments to an otherwise valid operation.
    Argument,
    NotImplemented,
    Io,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Shape => write!(f, "shape"),
            Self::Type => write!(f, "type"),
            Self::Parse => write!(f, "parse"),
            Self::Lookup => write!(f, "lookup"),
            Self::Argument => write!(f, "argument"),
            Self::NotImplemented => write!(f, "not implemented"),
            Self::Io => write!(f, "io"),
        }
    }
}

impl FrameError {
    pub fn type_mismatch(
        context: impl Into<String>,
        expected: impl fmt::Display,
        got: impl fmt::Display,
    ) -> Self {
        FrameError::TypeMismatch {
            context: context.into(),
            expected: expected.to_string(),
            got: got.to_string(),
        }
    }

    /// Create a parse error. The message is always prefixed with the format
    /// marker so that callers can recognize which reader rejected the input.
    pub fn parse(format: &str, msg: impl fmt::Display) -> Self {
        FrameError::Parse(format!("Invalid {format}: {msg}"))
    }

    pub const fn kind(&self) -> ErrorKind {
        match self {
            Self::LengthMismatch { .. } | Self::Shape(_) => ErrorKind::Shape,
            Self::TypeMismatch { .. } => ErrorKind::Type,
            Self::Parse(_) => ErrorKind::Parse,
            Self::ColumnNotFound(_) | Self::DuplicateColumn(_) => ErrorKind::Lookup,
            Self::InvalidArgument(_) => ErrorKind::Argument,
            Self::NotImplemented(_) => ErrorKind::NotImplemented,
            Self::Io(_) => ErrorKind::Io,
        }
    }
}

pub type Result<T, E = FrameError> = std::result::Result<T, E>;

/// Return early with a `NotImplemented` error.
#[macro_export]
macro_rules! not_implemented {
    ($($arg:tt)*) => {
        return Err($crate::FrameError::NotImplemented(std::format!($($arg)*)))
    };
}

/// Build a `Shape` error from a format string.
#[macro_export]
macro_rules! shape_err {
    ($($arg:tt)*) => {
        $crate::FrameError::Shape(std::format!($($arg)*))
    };
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_error_has_marker() {
        let err = FrameError::parse("CSV", "unexpected end of record");
        assert_eq!(ErrorKind::Parse, err.kind());
        assert!(err.to_string().starts_with("Invalid CSV"));
    }

    #[test]
    fn kinds_are_distinguishable() {
        let errs = [
            FrameError::LengthMismatch {
                column: "a".to_string(),
                expected: 3,
                got: 4,
            },
            FrameError::type_mismatch("eq", "Int64", "Utf8"),
            FrameError::parse("CSV", "bad"),
        ];

        let kinds: Vec<_> = errs.iter().map(|e| e.kind()).collect();
        assert_eq!(vec![ErrorKind::Shape, ErrorKind::Type, ErrorKind::Parse], kinds);
    }

    #[test]
    fn not_implemented_macro() {
        fn f() -> Result<()> {
            not_implemented!("native mapping for {}", "Utf8");
        }

        let err = f().unwrap_err();
        assert_eq!("Not implemented: native mapping for Utf8", err.to_string());
    }
}
