use thiserror::Error;

use crate::maze::Pos;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("grid must be at least 3x3, got {width}x{height}")]
    GridTooSmall { width: usize, height: usize },
    #[error("start {0:?} must sit on an odd cell inside the border")]
    BadStart(Pos),
    #[error("phrase has no letters to collect")]
    EmptyPhrase,
    #[error("open chance {0} is outside 0.0..=1.0")]
    BadOpenChance(f64),
}

#[derive(Debug, Error, PartialEq)]
pub enum GenerateError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error("start {0:?} is not an open cell")]
    StartBlocked(Pos),
    #[error("a letter sits on the start {0:?}")]
    LetterOnStart(Pos),
    #[error("maze has {available} free cells but the phrase needs {needed}")]
    NotEnoughCells { needed: usize, available: usize },
}
