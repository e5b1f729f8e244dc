//! Validation and conflict policy applied before any write reaches a store.

use chrono::Datelike;
use thiserror::Error;

use crate::{
    engine::{
        outcome::{is_decided, score_winner},
        tally::match_outcome,
    },
    record::{FrameEdit, FramePatch, FrameRecord, MatchDraft, MatchRecord},
    types::{BestOf, FrameId, FrameNo, MatchId, Season, TEN_PLUS_THRESHOLD},
};

/// Input rejected before any write was attempted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Best-of must be 3, 5 or 7.
    #[error("best-of must be 3, 5 or 7, got {0}")]
    InvalidBestOf(u8),
    /// Breaks below ten points are not recorded.
    #[error("break must be at least {TEN_PLUS_THRESHOLD} points, got {points}")]
    BreakBelowThreshold {
        /// Rejected value.
        points: u32,
    },
    /// Frame numbers start at 1.
    #[error("frame numbers start at 1")]
    FrameNumberZero,
    /// The match already has as many decided frames as it is played over.
    #[error("match {match_id} already has {decided} decided frames ({best_of})")]
    BestOfReached {
        /// Match that is complete.
        match_id: MatchId,
        /// Its best-of count.
        best_of: BestOf,
        /// Decided frames found.
        decided: u32,
    },
    /// The match is logged as a single compact best-of-3 entry.
    #[error("match {0} is recorded as a compact best-of-3 entry")]
    CompactEntry(MatchId),
    /// The referenced frame belongs to another match.
    #[error("frame {frame_id} does not belong to match {match_id}")]
    FrameNotInMatch {
        /// Frame referenced.
        frame_id: FrameId,
        /// Match expected.
        match_id: MatchId,
    },
}

/// Why a frame creation was refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FrameRejection {
    /// Bad input or a complete match.
    #[error(transparent)]
    Invalid(#[from] ValidationError),
    /// The frame number is already taken.
    #[error("frame {frame_no} already exists for match {match_id}")]
    Duplicate {
        /// Match targeted.
        match_id: MatchId,
        /// Number requested.
        frame_no: FrameNo,
    },
}

/// Validated match fields ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewMatch {
    /// Parsed best-of.
    pub best_of: BestOf,
    /// Season from the override or the date's year.
    pub season: Season,
}

/// Checks a match draft and resolves its season.
pub fn check_new_match(draft: &MatchDraft) -> Result<NewMatch, ValidationError> {
    let best_of = BestOf::try_from(draft.best_of)?;
    let season = draft.season.unwrap_or_else(|| draft.date.year());
    Ok(NewMatch { best_of, season })
}

/// Checks that a frame numbered `frame_no` may be created in `m`.
///
/// `frames` is the match's current frame collection.
pub fn check_new_frame(
    m: &MatchRecord,
    frames: &[FrameRecord],
    frame_no: FrameNo,
) -> Result<(), FrameRejection> {
    if frame_no == 0 {
        return Err(ValidationError::FrameNumberZero.into());
    }
    check_frame_capacity(m, frames)?;
    if frames
        .iter()
        .any(|f| f.match_id == m.id && f.frame_no == frame_no)
    {
        return Err(FrameRejection::Duplicate {
            match_id: m.id,
            frame_no,
        });
    }
    Ok(())
}

/// Checks that `m` can still take another frame at all.
pub fn check_frame_capacity(m: &MatchRecord, frames: &[FrameRecord]) -> Result<(), ValidationError> {
    let outcome = match_outcome(m, frames);
    if outcome.compact_winner.is_some() {
        return Err(ValidationError::CompactEntry(m.id));
    }
    if outcome.reached_best_of {
        return Err(ValidationError::BestOfReached {
            match_id: m.id,
            best_of: m.best_of,
            decided: outcome.decided_frames,
        });
    }
    Ok(())
}

/// Checks that applying `patch` to `frame` keeps `m` within its best-of.
///
/// Only an edit that turns an undecided frame into a decided one is
/// limited; rescoring a frame that already had a winner is always allowed.
pub fn check_frame_finalize(
    m: &MatchRecord,
    frames: &[FrameRecord],
    frame: &FrameRecord,
    patch: &FramePatch,
) -> Result<(), ValidationError> {
    if is_decided(frame) || patch.winner.is_none() {
        return Ok(());
    }
    let others: Vec<FrameRecord> = frames
        .iter()
        .filter(|f| f.match_id == m.id && f.id != frame.id)
        .cloned()
        .collect();
    let outcome = match_outcome(m, &others);
    if outcome.reached_best_of {
        return Err(ValidationError::BestOfReached {
            match_id: m.id,
            best_of: m.best_of,
            decided: outcome.decided_frames,
        });
    }
    Ok(())
}

/// Rejects break values below the ten-point threshold.
pub fn check_break_points(points: u32) -> Result<(), ValidationError> {
    if points < TEN_PLUS_THRESHOLD {
        return Err(ValidationError::BreakBelowThreshold { points });
    }
    Ok(())
}

/// A break's frame must belong to the break's match.
pub fn check_break_frame(m: &MatchRecord, frame: &FrameRecord) -> Result<(), ValidationError> {
    if frame.match_id != m.id {
        return Err(ValidationError::FrameNotInMatch {
            frame_id: frame.id,
            match_id: m.id,
        });
    }
    Ok(())
}

/// Turns a score edit into the stored patch, recomputing the winner from the
/// new scores unless the edit names one.
pub fn rescore(edit: &FrameEdit) -> FramePatch {
    FramePatch {
        score_a: edit.score_a,
        score_b: edit.score_b,
        winner: edit
            .winner
            .or_else(|| score_winner(edit.score_a, edit.score_b)),
        breaker: edit.breaker,
    }
}
