//! Game state: the board plus scoring and the Playing/GameOver machine.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{Board, Direction};

/// Where a game is in its lifecycle.
///
/// ```text
///   Playing ──(move leaves no legal move)──→ GameOver
///      ↑                                         │
///      └───────────────(new game)────────────────┘
/// ```
///
/// There is no transition out of `GameOver` other than starting a new
/// game. Moves made while `GameOver` are ignored entirely.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Phase {
    Playing,
    GameOver,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Playing => write!(f, "Playing"),
            Self::GameOver => write!(f, "GameOver"),
        }
    }
}

/// One game of 2048.
///
/// Serialized with camelCase keys because that is the shape clients read:
///
/// ```json
/// { "grid": [[2,0,0,0], ...], "score": 0, "bestScore": 0, "gameOver": false }
/// ```
///
/// `best_score` belongs to the player, not the board: [`new_game`]
/// resets everything else but carries it over.
///
/// Randomness is always passed in. The state never stores or seeds a
/// generator, so a seeded `StdRng` makes a whole game reproducible.
///
/// Deserializing goes through [`from_board`], so `gameOver` is always
/// recomputed from the board and `bestScore` is never below `score`,
/// whatever the input claims.
///
/// [`new_game`]: GameState::new_game
/// [`from_board`]: GameState::from_board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", from = "StateFields")]
pub struct GameState {
    grid: Board,
    score: u64,
    best_score: u64,
    game_over: bool,
}

/// The stored fields of a [`GameState`]. `gameOver` is derived, so it is
/// not read back.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct StateFields {
    grid: Board,
    score: u64,
    #[serde(default)]
    best_score: u64,
}

impl From<StateFields> for GameState {
    fn from(fields: StateFields) -> Self {
        Self::from_board(fields.grid, fields.score, fields.best_score)
    }
}

impl GameState {
    /// Starts a fresh game: empty board, two spawned tiles, score 0.
    pub fn new<R: Rng + ?Sized>(rng: &mut R) -> Self {
        Self::with_best_score(0, rng)
    }

    /// Starts a fresh game that remembers a previous best score.
    pub fn with_best_score<R: Rng + ?Sized>(best_score: u64, rng: &mut R) -> Self {
        let mut grid = Board::EMPTY;
        grid.spawn_tile(rng);
        grid.spawn_tile(rng);
        Self {
            grid,
            score: 0,
            best_score,
            game_over: false,
        }
    }

    /// Wraps an existing board, e.g. a position loaded for analysis.
    ///
    /// `game_over` is derived from the board, and `best_score` is raised to
    /// at least `score`.
    pub fn from_board(grid: Board, score: u64, best_score: u64) -> Self {
        Self {
            grid,
            score,
            best_score: best_score.max(score),
            game_over: !grid.can_move(),
        }
    }

    /// Replaces this game with a fresh one, keeping the best score.
    pub fn new_game<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        *self = Self::with_best_score(self.best_score, rng);
    }

    /// Applies one move. Returns `true` if any tile moved or merged.
    ///
    /// A move that changes nothing spawns nothing and scores nothing.
    /// Once the game is over this returns `false` without looking at the
    /// board at all.
    pub fn apply_move<R: Rng + ?Sized>(
        &mut self,
        direction: Direction,
        rng: &mut R,
    ) -> bool {
        if self.game_over {
            return false;
        }

        let before = self.grid;
        let gained = self.grid.slide(direction);
        self.score += u64::from(gained);

        let moved = self.grid != before;
        if moved {
            self.grid.spawn_tile(rng);
            self.best_score = self.best_score.max(self.score);
        }

        self.game_over = !self.grid.can_move();
        if self.game_over {
            tracing::debug!(
                score = self.score,
                max_tile = self.grid.max_tile(),
                "no moves left"
            );
        }

        moved
    }

    pub fn board(&self) -> &Board {
        &self.grid
    }

    pub fn score(&self) -> u64 {
        self.score
    }

    pub fn best_score(&self) -> u64 {
        self.best_score
    }

    pub fn is_game_over(&self) -> bool {
        self.game_over
    }

    pub fn phase(&self) -> Phase {
        if self.game_over {
            Phase::GameOver
        } else {
            Phase::Playing
        }
    }
}
