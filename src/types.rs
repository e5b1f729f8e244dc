//! Shared primitive IDs, the player pair, and best-of counts.

use std::fmt;
use std::ops::{Index, IndexMut};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Season year.
pub type Season = i32;
/// 1-based frame sequence number within a match.
pub type FrameNo = u32;

/// Minimum points for a break to be recorded.
pub const TEN_PLUS_THRESHOLD: u32 = 10;

macro_rules! row_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(pub Uuid);

        impl $name {
            /// Generates a fresh random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }
    };
}

row_id!(
    /// Opaque match identifier.
    MatchId
);
row_id!(
    /// Opaque frame identifier.
    FrameId
);
row_id!(
    /// Opaque break identifier.
    BreakId
);

/// One of the two fixed players.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Player {
    /// First player.
    A,
    /// Second player.
    B,
}

impl Player {
    /// Both players, `A` first.
    pub const BOTH: [Player; 2] = [Player::A, Player::B];

    /// Returns the opponent.
    pub fn other(self) -> Self {
        match self {
            Player::A => Player::B,
            Player::B => Player::A,
        }
    }

    /// Short storage code.
    pub fn code(self) -> &'static str {
        match self {
            Player::A => "a",
            Player::B => "b",
        }
    }

    /// Parses a storage code; anything else is not a player.
    pub fn from_code(code: &str) -> Option<Self> {
        match code {
            "a" => Some(Player::A),
            "b" => Some(Player::B),
            _ => None,
        }
    }
}

impl fmt::Display for Player {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// A value kept once per player.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct PerPlayer<T> {
    /// Value for [`Player::A`].
    pub a: T,
    /// Value for [`Player::B`].
    pub b: T,
}

impl<T> PerPlayer<T> {
    /// Builds a pair from both sides.
    pub fn new(a: T, b: T) -> Self {
        Self { a, b }
    }
}

impl<T> Index<Player> for PerPlayer<T> {
    type Output = T;

    fn index(&self, player: Player) -> &T {
        match player {
            Player::A => &self.a,
            Player::B => &self.b,
        }
    }
}

impl<T> IndexMut<Player> for PerPlayer<T> {
    fn index_mut(&mut self, player: Player) -> &mut T {
        match player {
            Player::A => &mut self.a,
            Player::B => &mut self.b,
        }
    }
}

impl PerPlayer<u32> {
    /// The player with the strictly higher count, if any.
    pub fn leader(&self) -> Option<Player> {
        match self.a.cmp(&self.b) {
            std::cmp::Ordering::Greater => Some(Player::A),
            std::cmp::Ordering::Less => Some(Player::B),
            std::cmp::Ordering::Equal => None,
        }
    }

    /// Sum of both sides.
    pub fn total(&self) -> u32 {
        self.a.saturating_add(self.b)
    }
}

/// Number of frames a match is played over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum BestOf {
    /// Best of three.
    Three,
    /// Best of five.
    Five,
    /// Best of seven.
    Seven,
}

impl BestOf {
    /// Frame count.
    pub fn frames(self) -> u32 {
        match self {
            BestOf::Three => 3,
            BestOf::Five => 5,
            BestOf::Seven => 7,
        }
    }
}

impl TryFrom<u8> for BestOf {
    type Error = crate::guard::ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            3 => Ok(BestOf::Three),
            5 => Ok(BestOf::Five),
            7 => Ok(BestOf::Seven),
            other => Err(crate::guard::ValidationError::InvalidBestOf(other)),
        }
    }
}

impl From<BestOf> for u8 {
    fn from(value: BestOf) -> Self {
        value.frames() as u8
    }
}

impl fmt::Display for BestOf {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "best of {}", self.frames())
    }
}
