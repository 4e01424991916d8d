use thiserror::Error;

/// Why a level could not be produced
#[derive(Debug, Error)]
pub enum LevelError {
    #[error("level {0:?} not found")]
    NotFound(String),
    #[error("unrecognised level version tag {tag:?}")]
    BadVersion { tag: Option<char> },
    #[error("corrupt level data at character {offset}: {reason}")]
    Corrupt { offset: usize, reason: &'static str },
    #[error("level storage error: {0}")]
    Io(#[from] std::io::Error),
}

impl LevelError {
    pub(crate) fn corrupt(offset: usize, reason: &'static str) -> Self {
        LevelError::Corrupt { offset, reason }
    }
}
