//! Per-match frame tally and winner derivation.

use serde::{Deserialize, Serialize};

use crate::{
    record::{FrameRecord, MatchRecord},
    types::{BestOf, PerPlayer, Player},
};

use super::outcome::frame_winner;

/// Frames won per player within one match.
pub type FrameTally = PerPlayer<u32>;

/// Derived state of one match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchOutcome {
    /// Frames won per player.
    pub tally: FrameTally,
    /// Match winner, explicit or derived.
    pub winner: Option<Player>,
    /// Winner of a compact best-of-3 entry, when the match is one.
    pub compact_winner: Option<Player>,
    /// Frames with a determinable winner.
    pub decided_frames: u32,
    /// True once no further frames may be created.
    pub reached_best_of: bool,
}

/// Counts frames won per player. Undecided frames and frames of other
/// matches count for nobody.
pub fn match_frame_tally(m: &MatchRecord, frames: &[FrameRecord]) -> FrameTally {
    tally_frames(frames.iter().filter(|f| f.match_id == m.id))
}

fn tally_frames<'a>(frames: impl IntoIterator<Item = &'a FrameRecord>) -> FrameTally {
    let mut tally = FrameTally::default();
    for frame in frames {
        if let Some(winner) = frame_winner(frame) {
            tally[winner] += 1;
        }
    }
    tally
}

/// Explicit winner if set, otherwise the player with strictly more frames.
pub fn match_winner(m: &MatchRecord, frames: &[FrameRecord]) -> Option<Player> {
    m.winner.or_else(|| match_frame_tally(m, frames).leader())
}

/// Implicit best-of-3 completion rule.
///
/// Older matches were logged as a single frame holding the frame counts of a
/// whole best-of-3 (2-1 or 1-2). Such an entry is recognised when the match
/// is best of 3 with no explicit winner and exactly one frame exists, that
/// frame carries no explicit winner, and its scores are 2-1 or 1-2.
pub fn compact_best_of_three(m: &MatchRecord, frames: &[FrameRecord]) -> Option<Player> {
    compact_among(m, frames.iter().filter(|f| f.match_id == m.id))
}

fn compact_among<'a>(
    m: &MatchRecord,
    own: impl IntoIterator<Item = &'a FrameRecord>,
) -> Option<Player> {
    if m.best_of != BestOf::Three || m.winner.is_some() {
        return None;
    }
    let mut own = own.into_iter();
    let (Some(only), None) = (own.next(), own.next()) else {
        return None;
    };
    compact_frame_winner(only)
}

fn compact_frame_winner(frame: &FrameRecord) -> Option<Player> {
    match (frame.winner, frame.score_a, frame.score_b) {
        (None, 2, 1) => Some(Player::A),
        (None, 1, 2) => Some(Player::B),
        _ => None,
    }
}

/// Full derived view of one match.
pub fn match_outcome(m: &MatchRecord, frames: &[FrameRecord]) -> MatchOutcome {
    let own: Vec<&FrameRecord> = frames.iter().filter(|f| f.match_id == m.id).collect();
    outcome_among(m, &own)
}

pub(crate) fn outcome_among(m: &MatchRecord, own: &[&FrameRecord]) -> MatchOutcome {
    let tally = tally_frames(own.iter().copied());
    let decided_frames = tally.total();
    MatchOutcome {
        tally,
        winner: m.winner.or_else(|| tally.leader()),
        compact_winner: compact_among(m, own.iter().copied()),
        decided_frames,
        reached_best_of: decided_frames >= m.best_of.frames(),
    }
}
