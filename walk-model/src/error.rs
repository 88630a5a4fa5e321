use std::fmt::{self, Display};

/// Errors produced by model constructors and code conversions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelError {
    UnknownCode { kind: &'static str, code: i16 },
    InvalidId(String),
}

impl Display for ModelError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ModelError::UnknownCode { kind, code } => {
                write!(f, "unknown {kind} code: {code}")
            }
            ModelError::InvalidId(msg) => write!(f, "invalid id: {msg}"),
        }
    }
}

impl std::error::Error for ModelError {}

pub type Result<T> = std::result::Result<T, ModelError>;
