use std::collections::HashMap;

use rand::Rng;
use tracing::{debug, info};

use crate::config::GameConfig;
use crate::error::GenerateError;
use crate::input::Key;
use crate::maze::{generate, Board, Dir, Grid, Pos};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    AwaitingStart,
    Playing,
    Won,
    Quit(QuitReason),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuitReason {
    Player,
    Interrupted,
    InputFailed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Move(Dir),
    Quit,
    Interrupt,
    Ignore,
}

impl From<Key> for Command {
    fn from(key: Key) -> Self {
        match key {
            Key::Char(c) => match c.to_ascii_lowercase() {
                'w' => Command::Move(Dir::Up),
                's' => Command::Move(Dir::Down),
                'a' => Command::Move(Dir::Left),
                'd' => Command::Move(Dir::Right),
                'q' => Command::Quit,
                _ => Command::Ignore,
            },
            Key::Arrow(dir) => Command::Move(dir),
            Key::Interrupt => Command::Interrupt,
            Key::Other => Command::Ignore,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MoveOutcome {
    Blocked,
    Moved,
    Collected(char),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayerState {
    pub pos: Pos,
    /// Letters in the order they were picked up.
    pub collected: Vec<char>,
}

/// Steps the player one cell in `dir`. Either nothing changes (wall or edge)
/// or the position moves and any letter on the new cell is taken.
pub fn resolve_move(
    grid: &Grid,
    letters: &mut HashMap<Pos, char>,
    player: &mut PlayerState,
    dir: Dir,
) -> MoveOutcome {
    let Some(next) = grid.neighbor(player.pos, dir) else {
        return MoveOutcome::Blocked;
    };
    if !grid.is_open(next) {
        return MoveOutcome::Blocked;
    }
    player.pos = next;
    match letters.remove(&next) {
        Some(letter) => {
            player.collected.push(letter);
            MoveOutcome::Collected(letter)
        }
        None => MoveOutcome::Moved,
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Game {
    grid: Grid,
    letters: HashMap<Pos, char>,
    player: PlayerState,
    total: usize,
    phase: Phase,
}

impl Game {
    pub fn new(config: &GameConfig, rng: &mut impl Rng) -> Result<Self, GenerateError> {
        let board = generate(config, rng)?;
        Self::from_board(board, config.start)
    }

    /// Starts a game on a prepared board. The start must be an open cell
    /// without a letter on it.
    pub fn from_board(board: Board, start: Pos) -> Result<Self, GenerateError> {
        if !board.grid.is_open(start) {
            return Err(GenerateError::StartBlocked(start));
        }
        if board.letters.contains_key(&start) {
            return Err(GenerateError::LetterOnStart(start));
        }
        let total = board.letters.len();
        Ok(Self {
            grid: board.grid,
            letters: board.letters,
            player: PlayerState {
                pos: start,
                collected: Vec::with_capacity(total),
            },
            total,
            phase: Phase::AwaitingStart,
        })
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn letter_at(&self, pos: Pos) -> Option<char> {
        self.letters.get(&pos).copied()
    }

    pub fn player(&self) -> &PlayerState {
        &self.player
    }

    pub fn collected(&self) -> &[char] {
        &self.player.collected
    }

    pub fn remaining(&self) -> usize {
        self.letters.len()
    }

    pub fn total(&self) -> usize {
        self.total
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_over(&self) -> bool {
        matches!(self.phase, Phase::Won | Phase::Quit(_))
    }

    pub fn start(&mut self) {
        if self.phase == Phase::AwaitingStart {
            self.phase = Phase::Playing;
            info!(total = self.total, "game started");
            self.check_win();
        }
    }

    /// Applies one key while playing. Returns the move outcome for movement keys.
    pub fn handle(&mut self, key: Key) -> Option<MoveOutcome> {
        if self.phase != Phase::Playing {
            return None;
        }
        match Command::from(key) {
            Command::Move(dir) => {
                let outcome = self.try_move(dir);
                self.check_win();
                Some(outcome)
            }
            Command::Quit => {
                self.quit(QuitReason::Player);
                None
            }
            Command::Interrupt => {
                self.quit(QuitReason::Interrupted);
                None
            }
            Command::Ignore => None,
        }
    }

    pub fn try_move(&mut self, dir: Dir) -> MoveOutcome {
        let outcome = resolve_move(&self.grid, &mut self.letters, &mut self.player, dir);
        match outcome {
            MoveOutcome::Collected(letter) => debug!(
                %letter,
                x = self.player.pos.x,
                y = self.player.pos.y,
                progress = self.player.collected.len(),
                "letter collected"
            ),
            MoveOutcome::Blocked => debug!(?dir, "move blocked"),
            MoveOutcome::Moved => {}
        }
        outcome
    }

    pub fn quit(&mut self, reason: QuitReason) {
        if !self.is_over() {
            info!(?reason, collected = self.player.collected.len(), "game quit");
            self.phase = Phase::Quit(reason);
        }
    }

    /// Moves to `Won` once every letter has been collected.
    pub fn check_win(&mut self) -> bool {
        if self.phase == Phase::Playing && self.player.collected.len() == self.total {
            info!(total = self.total, "all letters collected");
            self.phase = Phase::Won;
        }
        self.phase == Phase::Won
    }
}
