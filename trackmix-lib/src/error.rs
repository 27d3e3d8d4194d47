use std::fmt::{Display, Formatter};

/// Error type for instance acquisition, sample loading and curve configuration.
#[derive(Debug)]
pub enum AudioError {
    Io(std::io::Error),
    Acquire(String),
    Sample(String),
    Curve(String),
}

impl Display for AudioError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io(err) => write!(f, "io error: {}", err),
            Self::Acquire(err) => write!(f, "instance acquisition failed: {}", err),
            Self::Sample(err) => write!(f, "sample error: {}", err),
            Self::Curve(err) => write!(f, "invalid curve: {}", err),
        }
    }
}

impl std::error::Error for AudioError {}

impl From<std::io::Error> for AudioError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}
