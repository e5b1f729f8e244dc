//! Runtime event stream payloads.

use crate::types::{BreakId, FrameId, FrameNo, MatchId, Season};

/// Events emitted after a write has reached the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScoreEvent {
    /// A match was created.
    MatchCreated {
        /// New match id.
        id: MatchId,
        /// Its season.
        season: Season,
    },
    /// A frame was created, explicitly or as a placeholder.
    FrameCreated {
        /// Owning match.
        match_id: MatchId,
        /// New frame id.
        id: FrameId,
        /// Its number.
        frame_no: FrameNo,
    },
    /// A frame's scores were edited.
    FrameUpdated {
        /// Owning match.
        match_id: MatchId,
        /// Edited frame.
        id: FrameId,
    },
    /// A break was recorded.
    BreakRecorded {
        /// Owning match.
        match_id: MatchId,
        /// New break id.
        id: BreakId,
    },
    /// A break's points were corrected.
    BreakUpdated {
        /// Owning match.
        match_id: MatchId,
        /// Edited break.
        id: BreakId,
    },
    /// A match's explicit winner was set or cleared.
    MatchWinnerChanged {
        /// Edited match.
        id: MatchId,
    },
}
