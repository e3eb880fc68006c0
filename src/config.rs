use std::time::Duration;

use crate::error::ConfigError;
use crate::maze::{Connectivity, Pos};

pub const DEFAULT_GRID_W: usize = 20;
pub const DEFAULT_GRID_H: usize = 15;
pub const DEFAULT_PHRASE: &str = "HELLO MERGEFUND";
pub const DEFAULT_OPEN_CHANCE: f64 = 0.7;

#[derive(Debug, Clone)]
pub struct GameConfig {
    pub width: usize,
    pub height: usize,
    pub start: Pos,
    pub phrase: String,
    /// Chance of opening the passage right of (and, separately, below) each lattice cell.
    pub open_chance: f64,
    pub connectivity: Connectivity,
    /// Fixed rng seed; `None` seeds from entropy.
    pub seed: Option<u64>,
    pub pace: Pace,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            width: DEFAULT_GRID_W,
            height: DEFAULT_GRID_H,
            start: Pos { x: 1, y: 1 },
            phrase: DEFAULT_PHRASE.to_string(),
            open_chance: DEFAULT_OPEN_CHANCE,
            connectivity: Connectivity::Repair,
            seed: None,
            pace: Pace::default(),
        }
    }
}

impl GameConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.width < 3 || self.height < 3 {
            return Err(ConfigError::GridTooSmall {
                width: self.width,
                height: self.height,
            });
        }
        let Pos { x, y } = self.start;
        if x % 2 == 0 || y % 2 == 0 || x >= self.width - 1 || y >= self.height - 1 {
            return Err(ConfigError::BadStart(self.start));
        }
        if letters_of(&self.phrase).is_empty() {
            return Err(ConfigError::EmptyPhrase);
        }
        if !(0.0..=1.0).contains(&self.open_chance) {
            return Err(ConfigError::BadOpenChance(self.open_chance));
        }
        Ok(())
    }
}

/// The letters a player has to collect: the phrase without whitespace.
pub fn letters_of(phrase: &str) -> Vec<char> {
    phrase.chars().filter(|c| !c.is_whitespace()).collect()
}

/// Cosmetic delays. None of them affect game state.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pace {
    pub intro: Duration,
    pub collect_pause: Duration,
    pub banner_line: Duration,
    pub reveal_char: Duration,
    pub reveal_pause: Duration,
    pub closing_line: Duration,
}

impl Default for Pace {
    fn default() -> Self {
        Self {
            intro: Duration::from_millis(1000),
            collect_pause: Duration::from_millis(500),
            banner_line: Duration::from_millis(300),
            reveal_char: Duration::from_millis(100),
            reveal_pause: Duration::from_millis(500),
            closing_line: Duration::from_millis(1000),
        }
    }
}

impl Pace {
    pub fn instant() -> Self {
        Self {
            intro: Duration::ZERO,
            collect_pause: Duration::ZERO,
            banner_line: Duration::ZERO,
            reveal_char: Duration::ZERO,
            reveal_pause: Duration::ZERO,
            closing_line: Duration::ZERO,
        }
    }
}
