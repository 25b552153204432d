//! The four move directions.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::EngineError;

/// A direction to slide tiles in.
///
/// This is a closed set: there is no "none" or "unknown" variant. Anything
/// that is not one of these four is rejected at parse time, so the engine
/// never has to decide what an invalid move means.
///
/// The serde representation is the lowercase token (`"up"`, `"left"`, ...),
/// matching what clients send on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Right,
    Down,
    Left,
}

impl Direction {
    /// All four directions, in clockwise order starting from `Up`.
    pub const ALL: [Direction; 4] =
        [Direction::Up, Direction::Right, Direction::Down, Direction::Left];

    /// The wire token for this direction.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Up => "up",
            Self::Right => "right",
            Self::Down => "down",
            Self::Left => "left",
        }
    }

    /// Returns `true` if this move slides along rows (Left/Right) rather
    /// than columns (Up/Down).
    pub fn is_horizontal(self) -> bool {
        matches!(self, Self::Left | Self::Right)
    }

    /// Returns `true` if tiles slide toward the high index (Right/Down),
    /// which means lines are read back-to-front before resolution.
    pub fn is_reversed(self) -> bool {
        matches!(self, Self::Right | Self::Down)
    }
}

/// Parses exactly the four lowercase tokens. There is no fallback: `"Up"`,
/// `" up"` and `""` are all errors.
impl FromStr for Direction {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "up" => Ok(Self::Up),
            "right" => Ok(Self::Right),
            "down" => Ok(Self::Down),
            "left" => Ok(Self::Left),
            other => Err(EngineError::UnknownDirection(other.to_string())),
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_str_accepts_all_four_tokens() {
        assert_eq!("up".parse::<Direction>(), Ok(Direction::Up));
        assert_eq!("right".parse::<Direction>(), Ok(Direction::Right));
        assert_eq!("down".parse::<Direction>(), Ok(Direction::Down));
        assert_eq!("left".parse::<Direction>(), Ok(Direction::Left));
    }

    #[test]
    fn test_from_str_rejects_other_spellings() {
        for bad in ["", "Up", "LEFT", " left", "north", "0"] {
            assert_eq!(
                bad.parse::<Direction>(),
                Err(EngineError::UnknownDirection(bad.to_string())),
                "{bad:?} must not parse"
            );
        }
    }

    #[test]
    fn test_display_matches_wire_token() {
        for dir in Direction::ALL {
            assert_eq!(dir.to_string().parse::<Direction>(), Ok(dir));
        }
    }

    #[test]
    fn test_serde_uses_lowercase_tokens() {
        let json = serde_json::to_string(&Direction::Right).unwrap();
        assert_eq!(json, "\"right\"");
    }

    #[test]
    fn test_orientation_helpers() {
        assert!(Direction::Left.is_horizontal());
        assert!(Direction::Right.is_horizontal());
        assert!(!Direction::Up.is_horizontal());
        assert!(Direction::Right.is_reversed());
        assert!(Direction::Down.is_reversed());
        assert!(!Direction::Left.is_reversed());
        assert!(!Direction::Up.is_reversed());
    }
}
