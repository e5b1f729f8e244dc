//! Row-store contract shared by the in-memory and SQLite backends.

pub mod sqlite;

use thiserror::Error;

use crate::{
    record::{BreakRecord, FramePatch, FrameRecord, MatchRecord},
    types::{BreakId, FrameId, FrameNo, MatchId, Player, Season},
};

/// Failure reported by a row store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// A frame with this number already exists for the match.
    #[error("duplicate key: frame {frame_no} of match {match_id}")]
    Conflict {
        /// Match targeted.
        match_id: MatchId,
        /// Colliding frame number.
        frame_no: FrameNo,
    },
    /// An update targeted a row that does not exist.
    #[error("{table} row {id} not found")]
    MissingRow {
        /// Table name.
        table: &'static str,
        /// Row identifier.
        id: String,
    },
    /// SQLite backend failure.
    #[error("sqlite: {0}")]
    Sqlite(#[from] rusqlite::Error),
    /// Any other backend fault.
    #[error("{0}")]
    Backend(String),
}

/// Result alias for row-store calls.
pub type StoreResult<T> = Result<T, StoreError>;

/// Match query; unset fields match everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MatchFilter {
    /// Only this season.
    pub season: Option<Season>,
    /// Only this match.
    pub id: Option<MatchId>,
}

impl MatchFilter {
    /// All matches of a season.
    pub fn season(season: Season) -> Self {
        Self {
            season: Some(season),
            ..Self::default()
        }
    }

    /// A single match.
    pub fn id(id: MatchId) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    /// True when `m` passes the filter.
    pub fn matches(&self, m: &MatchRecord) -> bool {
        self.season.is_none_or(|s| m.season == s) && self.id.is_none_or(|id| m.id == id)
    }
}

/// Frame query; unset fields match everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct FrameFilter {
    /// Only this season.
    pub season: Option<Season>,
    /// Only frames of this match.
    pub match_id: Option<MatchId>,
    /// Only this frame number.
    pub frame_no: Option<FrameNo>,
    /// Only this frame.
    pub id: Option<FrameId>,
}

impl FrameFilter {
    /// All frames of a season.
    pub fn season(season: Season) -> Self {
        Self {
            season: Some(season),
            ..Self::default()
        }
    }

    /// All frames of a match.
    pub fn match_id(match_id: MatchId) -> Self {
        Self {
            match_id: Some(match_id),
            ..Self::default()
        }
    }

    /// The frame with a given number in a match.
    pub fn frame_no(match_id: MatchId, frame_no: FrameNo) -> Self {
        Self {
            match_id: Some(match_id),
            frame_no: Some(frame_no),
            ..Self::default()
        }
    }

    /// A single frame.
    pub fn id(id: FrameId) -> Self {
        Self {
            id: Some(id),
            ..Self::default()
        }
    }

    /// True when `f` passes the filter.
    pub fn matches(&self, f: &FrameRecord) -> bool {
        self.season.is_none_or(|s| f.season == s)
            && self.match_id.is_none_or(|id| f.match_id == id)
            && self.frame_no.is_none_or(|no| f.frame_no == no)
            && self.id.is_none_or(|id| f.id == id)
    }
}

/// Break query; unset fields match everything.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct BreakFilter {
    /// Only this season.
    pub season: Option<Season>,
    /// Only breaks of this match.
    pub match_id: Option<MatchId>,
    /// Only breaks of this frame.
    pub frame_id: Option<FrameId>,
}

impl BreakFilter {
    /// All breaks of a season.
    pub fn season(season: Season) -> Self {
        Self {
            season: Some(season),
            ..Self::default()
        }
    }

    /// All breaks of a match.
    pub fn match_id(match_id: MatchId) -> Self {
        Self {
            match_id: Some(match_id),
            ..Self::default()
        }
    }

    /// All breaks of a frame.
    pub fn frame_id(frame_id: FrameId) -> Self {
        Self {
            frame_id: Some(frame_id),
            ..Self::default()
        }
    }

    /// True when `b` passes the filter.
    pub fn matches(&self, b: &BreakRecord) -> bool {
        self.season.is_none_or(|s| b.season == s)
            && self.match_id.is_none_or(|id| b.match_id == id)
            && self.frame_id.is_none_or(|id| b.frame_id == Some(id))
    }
}

/// Persistence collaborator holding raw match, frame, and break rows.
///
/// Fetches return rows in display order: matches newest first, frames by
/// match then frame number, breaks by points descending. Callers must not
/// rely on that order for correctness.
pub trait RowStore: Send + Sync {
    /// Matches passing `filter`.
    fn fetch_matches(&self, filter: &MatchFilter) -> StoreResult<Vec<MatchRecord>>;
    /// Frames passing `filter`.
    fn fetch_frames(&self, filter: &FrameFilter) -> StoreResult<Vec<FrameRecord>>;
    /// Breaks passing `filter`.
    fn fetch_breaks(&self, filter: &BreakFilter) -> StoreResult<Vec<BreakRecord>>;
    /// Distinct seasons with at least one match.
    fn fetch_seasons(&self) -> StoreResult<Vec<Season>> {
        let mut seasons: Vec<Season> = self
            .fetch_matches(&MatchFilter::default())?
            .into_iter()
            .map(|m| m.season)
            .collect();
        seasons.sort_unstable();
        seasons.dedup();
        Ok(seasons)
    }

    /// Stores a new match.
    fn insert_match(&self, row: &MatchRecord) -> StoreResult<()>;
    /// Stores a new frame; fails with [`StoreError::Conflict`] when the
    /// frame number is taken.
    fn insert_frame(&self, row: &FrameRecord) -> StoreResult<()>;
    /// Overwrites a frame's scores, winner, and breaker.
    fn update_frame(&self, id: FrameId, patch: &FramePatch) -> StoreResult<FrameRecord>;
    /// Stores a new break.
    fn insert_break(&self, row: &BreakRecord) -> StoreResult<()>;
    /// Overwrites a break's point value.
    fn update_break_points(&self, id: BreakId, points: u32) -> StoreResult<BreakRecord>;
    /// Sets or clears a match's explicit winner.
    fn update_match_winner(&self, id: MatchId, winner: Option<Player>) -> StoreResult<MatchRecord>;
}
