//! Match, frame, and break rows plus the drafts and edits that create them.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::types::{BestOf, BreakId, FrameId, FrameNo, MatchId, Player, Season};

/// Stored match row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchRecord {
    /// Stable match identifier.
    pub id: MatchId,
    /// Season the match counts towards.
    pub season: Season,
    /// Day the match was played.
    pub date: NaiveDate,
    /// Best-of frame count.
    pub best_of: BestOf,
    /// Player who broke off in frame 1.
    pub first_breaker: Option<Player>,
    /// Explicit winner; normally derived from frames instead.
    pub winner: Option<Player>,
    /// Free-text note.
    pub notes: Option<String>,
}

/// Stored frame row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameRecord {
    /// Stable frame identifier.
    pub id: FrameId,
    /// Owning match.
    pub match_id: MatchId,
    /// Season copied from the owning match.
    pub season: Season,
    /// 1-based sequence number, unique within the match.
    pub frame_no: FrameNo,
    /// Points scored by [`Player::A`].
    pub score_a: u32,
    /// Points scored by [`Player::B`].
    pub score_b: u32,
    /// Explicit winner; takes precedence over the scores.
    pub winner: Option<Player>,
    /// Player who broke off.
    pub breaker: Option<Player>,
}

impl FrameRecord {
    /// Zero-score placeholder for the next frame to be played.
    pub fn placeholder(m: &MatchRecord, frame_no: FrameNo, breaker: Option<Player>) -> Self {
        Self {
            id: FrameId::new(),
            match_id: m.id,
            season: m.season,
            frame_no,
            score_a: 0,
            score_b: 0,
            winner: None,
            breaker,
        }
    }
}

/// Stored 10+ break row.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakRecord {
    /// Stable break identifier.
    pub id: BreakId,
    /// Owning match.
    pub match_id: MatchId,
    /// Frame the break was made in, when known.
    pub frame_id: Option<FrameId>,
    /// Season copied from the owning match.
    pub season: Season,
    /// Player who made the break.
    pub player: Player,
    /// Break value; never below ten.
    pub points: u32,
}

/// Input for creating a match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchDraft {
    /// Day the match is played.
    pub date: NaiveDate,
    /// Requested best-of count; must be 3, 5 or 7.
    pub best_of: u8,
    /// Season override; defaults to the year of `date`.
    pub season: Option<Season>,
    /// Player breaking off in frame 1.
    pub first_breaker: Option<Player>,
    /// Free-text note.
    pub notes: Option<String>,
}

impl MatchDraft {
    /// Draft with no optional fields set.
    pub fn new(date: NaiveDate, best_of: u8) -> Self {
        Self {
            date,
            best_of,
            season: None,
            first_breaker: None,
            notes: None,
        }
    }
}

/// Input for creating a frame at a caller-chosen number.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameDraft {
    /// Owning match.
    pub match_id: MatchId,
    /// Requested sequence number.
    pub frame_no: FrameNo,
    /// Points for [`Player::A`].
    pub score_a: u32,
    /// Points for [`Player::B`].
    pub score_b: u32,
    /// Player who broke off.
    pub breaker: Option<Player>,
}

/// Score edit applied to an existing frame.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct FrameEdit {
    /// New points for [`Player::A`].
    pub score_a: u32,
    /// New points for [`Player::B`].
    pub score_b: u32,
    /// New breaker; `None` clears it.
    pub breaker: Option<Player>,
    /// Explicit winner; when `None` the winner follows the scores.
    pub winner: Option<Player>,
}

impl FrameEdit {
    /// Edit that only changes the scores.
    pub fn scores(score_a: u32, score_b: u32) -> Self {
        Self {
            score_a,
            score_b,
            ..Self::default()
        }
    }
}

/// Fields written by a frame update.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FramePatch {
    /// Points for [`Player::A`].
    pub score_a: u32,
    /// Points for [`Player::B`].
    pub score_b: u32,
    /// Winner consistent with the scores unless explicitly overridden.
    pub winner: Option<Player>,
    /// Breaker.
    pub breaker: Option<Player>,
}

impl FramePatch {
    /// Applies this patch in place to `rec`.
    pub fn apply_to(&self, rec: &mut FrameRecord) {
        rec.score_a = self.score_a;
        rec.score_b = self.score_b;
        rec.winner = self.winner;
        rec.breaker = self.breaker;
    }
}

/// Which frame a new break is attached to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BreakTarget {
    /// The match's active frame, created when none is open.
    Active,
    /// The frame with this number; left unassigned when it does not exist.
    FrameNo(FrameNo),
    /// A specific frame of the same match.
    Frame(FrameId),
    /// No frame.
    Unassigned,
}

/// Input for recording a 10+ break.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BreakDraft {
    /// Owning match.
    pub match_id: MatchId,
    /// Frame the break belongs to.
    pub target: BreakTarget,
    /// Player who made the break.
    pub player: Player,
    /// Break value.
    pub points: u32,
}
