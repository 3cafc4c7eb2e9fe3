use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid touch id: {0} (must be 0-15)")]
    InvalidTouchId(u8),

    #[error("Invalid point count: {0} (must be 0-10)")]
    InvalidPointCount(u8),

    #[error("Point record too short: expected {expected} bytes, got {actual}")]
    ShortPointRecord { expected: usize, actual: usize },

    #[error("Register frame is full ({0} points)")]
    FrameFull(usize),
}

pub type Result<T> = std::result::Result<T, Error>;
