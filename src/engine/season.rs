//! Season-level aggregation across matches, frames, and breaks.
//!
//! Every metric is a commutative fold, so the three collections may be
//! fetched independently and combined in any order.

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::{
    record::{BreakRecord, FrameRecord, MatchRecord},
    types::{MatchId, PerPlayer, TEN_PLUS_THRESHOLD},
};

use super::{
    outcome::frame_winner,
    tally::{outcome_among, MatchOutcome},
};

/// The four published per-player metrics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct Metrics {
    /// Matches won.
    pub matches: u32,
    /// Frames won.
    pub frames: u32,
    /// Highest recorded break, 0 when none.
    pub highest_break: u32,
    /// Number of recorded breaks of ten or more.
    pub ten_plus_breaks: u32,
}

/// Metrics for both players.
pub type SeasonStats = PerPlayer<Metrics>;

/// A match with its derived outcome.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSummary {
    /// The stored match.
    #[serde(rename = "match")]
    pub record: MatchRecord,
    /// Derived outcome.
    pub outcome: MatchOutcome,
}

fn group_by_match(frames: &[FrameRecord]) -> HashMap<MatchId, Vec<&FrameRecord>> {
    let mut grouped: HashMap<MatchId, Vec<&FrameRecord>> = HashMap::new();
    for frame in frames {
        grouped.entry(frame.match_id).or_default().push(frame);
    }
    grouped
}

/// Computes both players' season metrics.
///
/// A match is credited to its explicit winner, else to its frame-tally
/// leader. A compact best-of-3 entry's single frame already makes its winner
/// the tally leader, so such a match is credited exactly once.
pub fn compute_season_stats(
    matches: &[MatchRecord],
    frames: &[FrameRecord],
    breaks: &[BreakRecord],
) -> SeasonStats {
    let mut stats = SeasonStats::default();
    let grouped = group_by_match(frames);

    for m in matches {
        let own = grouped.get(&m.id).map(Vec::as_slice).unwrap_or_default();
        let outcome = outcome_among(m, own);
        if let Some(winner) = outcome.winner {
            stats[winner].matches += 1;
        }
    }

    for frame in frames {
        if let Some(winner) = frame_winner(frame) {
            stats[winner].frames += 1;
        }
    }

    for b in breaks {
        if b.points < TEN_PLUS_THRESHOLD {
            continue;
        }
        let metrics = &mut stats[b.player];
        metrics.ten_plus_breaks += 1;
        metrics.highest_break = metrics.highest_break.max(b.points);
    }

    stats
}

/// Derives every match's outcome, newest match first.
pub fn summarize_matches(matches: &[MatchRecord], frames: &[FrameRecord]) -> Vec<MatchSummary> {
    let grouped = group_by_match(frames);
    let mut out: Vec<MatchSummary> = matches
        .iter()
        .map(|m| {
            let own = grouped.get(&m.id).map(Vec::as_slice).unwrap_or_default();
            MatchSummary {
                record: m.clone(),
                outcome: outcome_among(m, own),
            }
        })
        .collect();
    out.sort_by(|x, y| {
        y.record
            .date
            .cmp(&x.record.date)
            .then_with(|| x.record.id.cmp(&y.record.id))
    });
    out
}
