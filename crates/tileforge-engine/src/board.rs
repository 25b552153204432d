//! The 4×4 grid and the operations that act on it directly.

use std::fmt;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{resolve_line, Direction, EngineError, BOARD_SIZE, SPAWN_TWO_PROBABILITY};

/// Raw row-major cell values. `grid[row][col]`, 0 means empty.
pub type Grid = [[u32; BOARD_SIZE]; BOARD_SIZE];

/// A 4×4 board of tiles.
///
/// Invariant: every cell is 0 or a power of two. The constructors enforce
/// it and every mutation preserves it (merges double a power of two, spawns
/// write 2 or 4).
///
/// On the wire a board is just its rows: `[[2,0,0,0],[0,0,0,0],...]`.
/// Deserializing goes through [`Board::from_rows`], so a client-supplied
/// grid with a 3 in it is rejected rather than smuggled in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(try_from = "Grid", into = "Grid")]
pub struct Board(Grid);

impl Board {
    /// A board with no tiles.
    pub const EMPTY: Board = Board([[0; BOARD_SIZE]; BOARD_SIZE]);

    /// Builds a board from explicit rows, checking the tile invariant.
    ///
    /// # Errors
    /// Returns [`EngineError::InvalidTile`] for the first cell that is
    /// neither 0 nor a power of two.
    pub fn from_rows(rows: Grid) -> Result<Self, EngineError> {
        for (row, cells) in rows.iter().enumerate() {
            for (col, &value) in cells.iter().enumerate() {
                if value != 0 && !value.is_power_of_two() {
                    return Err(EngineError::InvalidTile { row, col, value });
                }
            }
        }
        Ok(Self(rows))
    }

    /// The rows of the board.
    pub fn rows(&self) -> &Grid {
        &self.0
    }

    /// Value at `(row, col)`, or `None` if out of range.
    pub fn cell(&self, row: usize, col: usize) -> Option<u32> {
        self.0.get(row).and_then(|cells| cells.get(col)).copied()
    }

    /// Coordinates of every empty cell, row-major.
    pub fn empty_cells(&self) -> Vec<(usize, usize)> {
        let mut cells = Vec::new();
        for (row, values) in self.0.iter().enumerate() {
            for (col, &value) in values.iter().enumerate() {
                if value == 0 {
                    cells.push((row, col));
                }
            }
        }
        cells
    }

    /// Number of non-empty cells.
    pub fn tile_count(&self) -> usize {
        self.0.iter().flatten().filter(|&&v| v != 0).count()
    }

    /// The largest tile on the board (0 for an empty board).
    pub fn max_tile(&self) -> u32 {
        self.0.iter().flatten().copied().max().unwrap_or(0)
    }

    /// Returns `true` if at least one move would change the board.
    ///
    /// That is the case when a cell is empty, or when two horizontally or
    /// vertically adjacent cells hold the same nonzero value.
    pub fn can_move(&self) -> bool {
        let g = &self.0;
        for row in 0..BOARD_SIZE {
            for col in 0..BOARD_SIZE {
                let value = g[row][col];
                if value == 0 {
                    return true;
                }
                if col + 1 < BOARD_SIZE && g[row][col + 1] == value {
                    return true;
                }
                if row + 1 < BOARD_SIZE && g[row + 1][col] == value {
                    return true;
                }
            }
        }
        false
    }

    /// Slides and merges every line in `direction`. No tile is spawned.
    ///
    /// Returns the points scored by the merges.
    pub fn slide(&mut self, direction: Direction) -> u32 {
        let mut score = 0;
        for line in 0..BOARD_SIZE {
            let (resolved, gained) = resolve_line(self.read_line(direction, line));
            self.write_line(direction, line, resolved);
            score += gained;
        }
        score
    }

    /// Places a 2 (90%) or a 4 (10%) on a uniformly chosen empty cell.
    ///
    /// Returns the cell and value placed, or `None` if the board is full.
    pub fn spawn_tile<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
    ) -> Option<(usize, usize, u32)> {
        let empty = self.empty_cells();
        if empty.is_empty() {
            return None;
        }
        let (row, col) = empty[rng.random_range(0..empty.len())];
        let value = if rng.random_bool(SPAWN_TWO_PROBABILITY) { 2 } else { 4 };
        self.0[row][col] = value;
        Some((row, col, value))
    }

    /// Maps position `pos` along line `line` to grid coordinates.
    ///
    /// Position 0 is where tiles slide to: column 0 for Left, column 3 for
    /// Right, row 0 for Up, row 3 for Down.
    fn coords(direction: Direction, line: usize, pos: usize) -> (usize, usize) {
        let pos = if direction.is_reversed() {
            BOARD_SIZE - 1 - pos
        } else {
            pos
        };
        if direction.is_horizontal() {
            (line, pos)
        } else {
            (pos, line)
        }
    }

    fn read_line(&self, direction: Direction, line: usize) -> [u32; BOARD_SIZE] {
        std::array::from_fn(|pos| {
            let (row, col) = Self::coords(direction, line, pos);
            self.0[row][col]
        })
    }

    fn write_line(
        &mut self,
        direction: Direction,
        line: usize,
        values: [u32; BOARD_SIZE],
    ) {
        for (pos, value) in values.into_iter().enumerate() {
            let (row, col) = Self::coords(direction, line, pos);
            self.0[row][col] = value;
        }
    }
}

impl TryFrom<Grid> for Board {
    type Error = EngineError;

    fn try_from(rows: Grid) -> Result<Self, Self::Error> {
        Self::from_rows(rows)
    }
}

impl From<Board> for Grid {
    fn from(board: Board) -> Self {
        board.0
    }
}

/// Fixed-width text grid, one row per line. Handy in logs and assertion
/// failures.
impl fmt::Display for Board {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, row) in self.0.iter().enumerate() {
            if i > 0 {
                writeln!(f)?;
            }
            for (j, value) in row.iter().enumerate() {
                if j > 0 {
                    f.write_str(" ")?;
                }
                match value {
                    0 => write!(f, "{:>5}", ".")?,
                    v => write!(f, "{v:>5}")?,
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;

    fn board(rows: Grid) -> Board {
        Board::from_rows(rows).expect("test board must be valid")
    }

    /// No two neighbours equal, no empty cell.
    fn checkerboard() -> Board {
        board([
            [2, 4, 2, 4],
            [4, 2, 4, 2],
            [2, 4, 2, 4],
            [4, 2, 4, 2],
        ])
    }

    // =====================================================================
    // construction
    // =====================================================================

    #[test]
    fn test_from_rows_rejects_non_power_of_two() {
        let err = Board::from_rows([
            [0, 0, 0, 0],
            [0, 0, 3, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
        ])
        .unwrap_err();
        assert_eq!(err, EngineError::InvalidTile { row: 1, col: 2, value: 3 });
    }

    #[test]
    fn test_from_rows_accepts_large_powers() {
        let b = board([
            [2048, 0, 0, 0],
            [0, 65536, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 1 << 17],
        ]);
        assert_eq!(b.max_tile(), 1 << 17);
        assert_eq!(b.tile_count(), 3);
    }

    #[test]
    fn test_cell_out_of_range_is_none() {
        assert_eq!(Board::EMPTY.cell(0, 0), Some(0));
        assert_eq!(Board::EMPTY.cell(4, 0), None);
        assert_eq!(Board::EMPTY.cell(0, 4), None);
    }

    #[test]
    fn test_serde_grid_shape() {
        let b = board([
            [2, 0, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 4, 0],
            [0, 0, 0, 0],
        ]);
        let json = serde_json::to_value(b).unwrap();
        assert_eq!(
            json,
            serde_json::json!([[2, 0, 0, 0], [0, 0, 0, 0], [0, 0, 4, 0], [0, 0, 0, 0]])
        );
    }

    #[test]
    fn test_deserialize_rejects_invalid_tile() {
        let json = "[[5,0,0,0],[0,0,0,0],[0,0,0,0],[0,0,0,0]]";
        assert!(serde_json::from_str::<Board>(json).is_err());
    }

    // =====================================================================
    // can_move()
    // =====================================================================

    #[test]
    fn test_can_move_empty_cell_is_enough() {
        let mut rows = *checkerboard().rows();
        rows[3][3] = 0;
        assert!(board(rows).can_move());
    }

    #[test]
    fn test_can_move_checkerboard_is_stuck() {
        assert!(!checkerboard().can_move());
    }

    #[test]
    fn test_can_move_horizontal_pair() {
        let mut rows = *checkerboard().rows();
        rows[2][3] = 2; // row 2 now ends ... 2, 2
        assert!(board(rows).can_move());
    }

    #[test]
    fn test_can_move_vertical_pair() {
        let mut rows = *checkerboard().rows();
        rows[1][0] = 2; // column 0 now starts 2, 2
        assert!(board(rows).can_move());
    }

    // =====================================================================
    // slide()
    // =====================================================================

    #[test]
    fn test_slide_left() {
        let mut b = board([
            [2, 2, 0, 0],
            [0, 4, 0, 4],
            [2, 4, 8, 16],
            [0, 0, 0, 2],
        ]);
        let score = b.slide(Direction::Left);
        assert_eq!(
            b.rows(),
            &[[4, 0, 0, 0], [8, 0, 0, 0], [2, 4, 8, 16], [2, 0, 0, 0]]
        );
        assert_eq!(score, 12);
    }

    #[test]
    fn test_slide_right_reverses_lines() {
        let mut b = board([
            [2, 2, 2, 0],
            [0, 0, 0, 0],
            [4, 0, 0, 0],
            [0, 0, 0, 0],
        ]);
        let score = b.slide(Direction::Right);
        // Tiles travel right, so the rightmost pair merges first.
        assert_eq!(
            b.rows(),
            &[[0, 0, 2, 4], [0, 0, 0, 0], [0, 0, 0, 4], [0, 0, 0, 0]]
        );
        assert_eq!(score, 4);
    }

    #[test]
    fn test_slide_up() {
        let mut b = board([
            [2, 0, 0, 0],
            [2, 0, 4, 0],
            [0, 0, 4, 0],
            [4, 8, 0, 0],
        ]);
        let score = b.slide(Direction::Up);
        assert_eq!(
            b.rows(),
            &[[4, 8, 8, 0], [4, 0, 0, 0], [0, 0, 0, 0], [0, 0, 0, 0]]
        );
        assert_eq!(score, 12);
    }

    #[test]
    fn test_slide_down() {
        let mut b = board([
            [2, 0, 0, 0],
            [2, 0, 0, 0],
            [2, 0, 0, 0],
            [0, 0, 0, 16],
        ]);
        let score = b.slide(Direction::Down);
        assert_eq!(
            b.rows(),
            &[[0, 0, 0, 0], [0, 0, 0, 0], [2, 0, 0, 0], [4, 0, 0, 16]]
        );
        assert_eq!(score, 4);
    }

    #[test]
    fn test_slide_blocked_direction_leaves_board_alone() {
        let original = board([
            [2, 4, 0, 0],
            [8, 0, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
        ]);
        let mut b = original;
        assert_eq!(b.slide(Direction::Left), 0);
        assert_eq!(b, original);
        assert_eq!(b.slide(Direction::Up), 0);
        assert_eq!(b, original);
    }

    // =====================================================================
    // spawn_tile()
    // =====================================================================

    #[test]
    fn test_spawn_tile_fills_one_empty_cell() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut b = Board::EMPTY;
        let (row, col, value) = b.spawn_tile(&mut rng).expect("board has room");
        assert!(value == 2 || value == 4);
        assert_eq!(b.cell(row, col), Some(value));
        assert_eq!(b.tile_count(), 1);
    }

    #[test]
    fn test_spawn_tile_full_board_is_noop() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut b = checkerboard();
        assert_eq!(b.spawn_tile(&mut rng), None);
        assert_eq!(b, checkerboard());
    }

    #[test]
    fn test_spawn_tile_only_touches_empty_cells() {
        let mut rng = StdRng::seed_from_u64(99);
        let mut rows = *checkerboard().rows();
        rows[1][2] = 0;
        let mut b = board(rows);
        assert_eq!(b.spawn_tile(&mut rng).map(|(r, c, _)| (r, c)), Some((1, 2)));
    }

    #[test]
    fn test_spawn_tile_value_distribution() {
        let mut rng = StdRng::seed_from_u64(2048);
        let trials = 20_000;
        let mut twos = 0;
        for _ in 0..trials {
            let mut b = Board::EMPTY;
            let (_, _, value) = b.spawn_tile(&mut rng).unwrap();
            if value == 2 {
                twos += 1;
            }
        }
        let ratio = twos as f64 / trials as f64;
        assert!((0.88..0.92).contains(&ratio), "ratio of 2s was {ratio}");
    }

    #[test]
    fn test_spawn_tile_same_seed_same_result() {
        let mut a = Board::EMPTY;
        let mut b = Board::EMPTY;
        a.spawn_tile(&mut StdRng::seed_from_u64(5));
        b.spawn_tile(&mut StdRng::seed_from_u64(5));
        assert_eq!(a, b);
    }

    #[test]
    fn test_display_renders_rows() {
        let b = board([
            [2, 0, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 0],
            [0, 0, 0, 2048],
        ]);
        let text = b.to_string();
        assert_eq!(text.lines().count(), 4);
        assert!(text.lines().next().unwrap().trim_start().starts_with('2'));
        assert!(text.ends_with("2048"));
    }
}
