//! Guarded reads and writes against a [`RowStore`].
//!
//! Every write passes the [`crate::guard`] checks first; every read returns
//! fully derived views. Calls are synchronous; [`crate::runtime`] moves them
//! onto the blocking pool.

use std::sync::Arc;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::{
    engine::{
        active::{find_active_frame, next_frame_number},
        season::{compute_season_stats, summarize_matches, MatchSummary, SeasonStats},
        suggest::{season_choices, suggested_breaker, suggested_first_breaker},
        tally::{match_outcome, MatchOutcome},
    },
    guard::{self, FrameRejection, ValidationError},
    persist::{BreakFilter, FrameFilter, MatchFilter, RowStore, StoreError},
    record::{
        BreakDraft, BreakRecord, BreakTarget, FrameDraft, FrameEdit, FrameRecord, MatchDraft,
        MatchRecord,
    },
    types::{BreakId, FrameId, FrameNo, MatchId, Player, Season},
};

/// Failure of a service operation.
#[derive(Debug, Error)]
pub enum ScoreError {
    /// Input rejected before any write.
    #[error(transparent)]
    Validation(#[from] ValidationError),
    /// The requested frame number is already taken.
    #[error("frame {frame_no} already exists for match {match_id}")]
    DuplicateFrame {
        /// Match targeted.
        match_id: MatchId,
        /// Number requested.
        frame_no: FrameNo,
    },
    /// A referenced row does not exist.
    #[error("{kind} {id} not found")]
    NotFound {
        /// Row kind.
        kind: &'static str,
        /// Row identifier.
        id: String,
    },
    /// The store failed; not retried.
    #[error("store failure: {0}")]
    Transport(#[source] StoreError),
}

impl From<StoreError> for ScoreError {
    fn from(value: StoreError) -> Self {
        match value {
            StoreError::Conflict { match_id, frame_no } => Self::DuplicateFrame { match_id, frame_no },
            StoreError::MissingRow { table, id } => Self::NotFound { kind: table, id },
            other => Self::Transport(other),
        }
    }
}

impl From<FrameRejection> for ScoreError {
    fn from(value: FrameRejection) -> Self {
        match value {
            FrameRejection::Invalid(err) => Self::Validation(err),
            FrameRejection::Duplicate { match_id, frame_no } => {
                Self::DuplicateFrame { match_id, frame_no }
            }
        }
    }
}

/// Result alias for service calls.
pub type ScoreResult<T> = Result<T, ScoreError>;

/// Tunables for [`ScoreService`].
#[derive(Debug, Clone)]
pub struct ScoreConfig {
    /// Seasons offered when the store knows none.
    pub season_fallback_span: u32,
}

impl Default for ScoreConfig {
    fn default() -> Self {
        Self {
            season_fallback_span: 7,
        }
    }
}

/// Stats and match list for one season.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeasonOverview {
    /// Season shown.
    pub season: Season,
    /// Per-player metrics.
    pub stats: SeasonStats,
    /// Matches, newest first.
    pub matches: Vec<MatchSummary>,
    /// Who should break off in the next match.
    pub next_first_breaker: Option<Player>,
}

/// Everything shown for a single match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchDetail {
    /// The match row.
    #[serde(rename = "match")]
    pub record: MatchRecord,
    /// Frames ordered by number.
    pub frames: Vec<FrameRecord>,
    /// Breaks, highest first.
    pub breaks: Vec<BreakRecord>,
    /// Derived outcome.
    pub outcome: MatchOutcome,
    /// Number of the active frame, if one is open.
    pub active_frame_no: Option<FrameNo>,
    /// Number a newly added frame would get.
    pub next_frame_no: FrameNo,
    /// Expected breaker of the next frame.
    pub next_breaker: Option<Player>,
}

/// Result of [`ScoreService::ensure_active_frame`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveFrame {
    /// The active frame.
    pub frame: FrameRecord,
    /// True when this call inserted it.
    pub created: bool,
}

/// Guarded operations over a shared row store.
#[derive(Clone)]
pub struct ScoreService {
    store: Arc<dyn RowStore>,
    config: ScoreConfig,
}

impl ScoreService {
    /// Wraps `store` with default configuration.
    pub fn new(store: Arc<dyn RowStore>) -> Self {
        Self::with_config(store, ScoreConfig::default())
    }

    /// Wraps `store` with `config`.
    pub fn with_config(store: Arc<dyn RowStore>, config: ScoreConfig) -> Self {
        Self { store, config }
    }

    /// Underlying store.
    pub fn store(&self) -> &Arc<dyn RowStore> {
        &self.store
    }

    /// Validates and stores a new match.
    pub fn create_match(&self, draft: MatchDraft) -> ScoreResult<MatchRecord> {
        let checked = guard::check_new_match(&draft)?;
        let rec = MatchRecord {
            id: MatchId::new(),
            season: checked.season,
            date: draft.date,
            best_of: checked.best_of,
            first_breaker: draft.first_breaker,
            winner: None,
            notes: draft.notes,
        };
        self.store.insert_match(&rec)?;
        tracing::debug!(match_id = %rec.id, season = rec.season, "match created");
        Ok(rec)
    }

    /// Creates a frame at the caller's chosen number. The winner is left
    /// unset and resolved from the scores on read.
    ///
    /// A taken number is reported as [`ScoreError::DuplicateFrame`] whether
    /// the guard or the store catches it.
    pub fn create_frame(&self, draft: FrameDraft) -> ScoreResult<FrameRecord> {
        let m = self.load_match(draft.match_id)?;
        let frames = self.store.fetch_frames(&FrameFilter::match_id(m.id))?;
        if let Err(rejection) = guard::check_new_frame(&m, &frames, draft.frame_no) {
            tracing::warn!(match_id = %m.id, frame_no = draft.frame_no, %rejection, "frame rejected");
            return Err(rejection.into());
        }
        let rec = FrameRecord {
            id: FrameId::new(),
            match_id: m.id,
            season: m.season,
            frame_no: draft.frame_no,
            score_a: draft.score_a,
            score_b: draft.score_b,
            winner: None,
            breaker: draft.breaker,
        };
        self.store.insert_frame(&rec)?;
        tracing::debug!(match_id = %m.id, frame_no = rec.frame_no, "frame created");
        Ok(rec)
    }

    /// Appends a frame after the highest existing one. The breaker defaults
    /// to the alternation implied by the match's first breaker.
    pub fn record_next_frame(
        &self,
        match_id: MatchId,
        score_a: u32,
        score_b: u32,
        breaker: Option<Player>,
    ) -> ScoreResult<FrameRecord> {
        let m = self.load_match(match_id)?;
        let frames = self.store.fetch_frames(&FrameFilter::match_id(match_id))?;
        let frame_no = next_frame_number(&frames);
        self.create_frame(FrameDraft {
            match_id,
            frame_no,
            score_a,
            score_b,
            breaker: breaker.or_else(|| suggested_breaker(&m, frame_no)),
        })
    }

    /// Applies a score edit; the stored winner is recomputed from the new
    /// scores unless the edit names one.
    ///
    /// Deciding a previously open frame fails once the rest of the match
    /// already holds `best_of` decided frames.
    pub fn update_frame(&self, frame_id: FrameId, edit: FrameEdit) -> ScoreResult<FrameRecord> {
        let patch = guard::rescore(&edit);
        let frame = self
            .store
            .fetch_frames(&FrameFilter::id(frame_id))?
            .into_iter()
            .next()
            .ok_or_else(|| ScoreError::NotFound {
                kind: "frames",
                id: frame_id.to_string(),
            })?;
        let m = self.load_match(frame.match_id)?;
        let frames = self.store.fetch_frames(&FrameFilter::match_id(m.id))?;
        if let Err(err) = guard::check_frame_finalize(&m, &frames, &frame, &patch) {
            tracing::warn!(%frame_id, match_id = %m.id, %err, "frame edit rejected");
            return Err(err.into());
        }
        let rec = self.store.update_frame(frame_id, &patch)?;
        tracing::debug!(%frame_id, winner = ?rec.winner, "frame rescored");
        Ok(rec)
    }

    /// Returns the match's active frame, creating a placeholder when none is
    /// open.
    ///
    /// When the placeholder's number was taken by a concurrent writer, the
    /// frame holding that number is fetched once and returned instead.
    pub fn get_or_create_active_frame(&self, match_id: MatchId) -> ScoreResult<FrameRecord> {
        self.ensure_active_frame(match_id).map(|active| active.frame)
    }

    /// Like [`Self::get_or_create_active_frame`], also reporting whether this
    /// call inserted the frame.
    pub fn ensure_active_frame(&self, match_id: MatchId) -> ScoreResult<ActiveFrame> {
        let m = self.load_match(match_id)?;
        let frames = self.store.fetch_frames(&FrameFilter::match_id(match_id))?;
        if let Some(active) = find_active_frame(&frames) {
            return Ok(ActiveFrame {
                frame: active.clone(),
                created: false,
            });
        }
        guard::check_frame_capacity(&m, &frames)?;

        let frame_no = next_frame_number(&frames);
        let placeholder = FrameRecord::placeholder(&m, frame_no, suggested_breaker(&m, frame_no));
        match self.store.insert_frame(&placeholder) {
            Ok(()) => {
                tracing::debug!(%match_id, frame_no, "placeholder frame created");
                Ok(ActiveFrame {
                    frame: placeholder,
                    created: true,
                })
            }
            Err(StoreError::Conflict { .. }) => {
                tracing::warn!(%match_id, frame_no, "frame number taken concurrently, refetching");
                let frame = self
                    .store
                    .fetch_frames(&FrameFilter::frame_no(match_id, frame_no))?
                    .into_iter()
                    .next()
                    .ok_or_else(|| ScoreError::NotFound {
                        kind: "frame",
                        id: format!("{match_id}#{frame_no}"),
                    })?;
                Ok(ActiveFrame {
                    frame,
                    created: false,
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Validates and stores a 10+ break.
    pub fn create_break(&self, draft: BreakDraft) -> ScoreResult<BreakRecord> {
        guard::check_break_points(draft.points)?;
        let m = self.load_match(draft.match_id)?;
        let frame_id = match draft.target {
            BreakTarget::Active => Some(self.get_or_create_active_frame(m.id)?.id),
            BreakTarget::FrameNo(frame_no) => self
                .store
                .fetch_frames(&FrameFilter::frame_no(m.id, frame_no))?
                .first()
                .map(|f| f.id),
            BreakTarget::Frame(frame_id) => {
                let frames = self.store.fetch_frames(&FrameFilter::match_id(m.id))?;
                match frames.iter().find(|f| f.id == frame_id) {
                    Some(frame) => guard::check_break_frame(&m, frame)?,
                    None => {
                        return Err(ValidationError::FrameNotInMatch {
                            frame_id,
                            match_id: m.id,
                        }
                        .into());
                    }
                }
                Some(frame_id)
            }
            BreakTarget::Unassigned => None,
        };
        let rec = BreakRecord {
            id: BreakId::new(),
            match_id: m.id,
            frame_id,
            season: m.season,
            player: draft.player,
            points: draft.points,
        };
        self.store.insert_break(&rec)?;
        tracing::debug!(match_id = %m.id, player = %rec.player, points = rec.points, "break recorded");
        Ok(rec)
    }

    /// Corrects a break's point value.
    pub fn update_break(&self, break_id: BreakId, points: u32) -> ScoreResult<BreakRecord> {
        guard::check_break_points(points)?;
        Ok(self.store.update_break_points(break_id, points)?)
    }

    /// Sets or clears a match's explicit winner.
    pub fn set_match_winner(
        &self,
        match_id: MatchId,
        winner: Option<Player>,
    ) -> ScoreResult<MatchRecord> {
        Ok(self.store.update_match_winner(match_id, winner)?)
    }

    /// Season metrics from independently fetched collections.
    pub fn season_stats(&self, season: Season) -> ScoreResult<SeasonStats> {
        let matches = self.store.fetch_matches(&MatchFilter::season(season))?;
        let frames = self.store.fetch_frames(&FrameFilter::season(season))?;
        let breaks = self.store.fetch_breaks(&BreakFilter::season(season))?;
        Ok(compute_season_stats(&matches, &frames, &breaks))
    }

    /// Season metrics plus match summaries.
    pub fn season_overview(&self, season: Season) -> ScoreResult<SeasonOverview> {
        let matches = self.store.fetch_matches(&MatchFilter::season(season))?;
        let frames = self.store.fetch_frames(&FrameFilter::season(season))?;
        let breaks = self.store.fetch_breaks(&BreakFilter::season(season))?;
        Ok(SeasonOverview {
            season,
            stats: compute_season_stats(&matches, &frames, &breaks),
            matches: summarize_matches(&matches, &frames),
            next_first_breaker: suggested_first_breaker(&matches),
        })
    }

    /// Match, frames, breaks, and derived state.
    pub fn match_detail(&self, match_id: MatchId) -> ScoreResult<MatchDetail> {
        let record = self.load_match(match_id)?;
        let mut frames = self.store.fetch_frames(&FrameFilter::match_id(match_id))?;
        frames.sort_by_key(|f| f.frame_no);
        let mut breaks = self.store.fetch_breaks(&BreakFilter::match_id(match_id))?;
        breaks.sort_by(|x, y| y.points.cmp(&x.points));

        let outcome = match_outcome(&record, &frames);
        let active_frame_no = find_active_frame(&frames).map(|f| f.frame_no);
        let next_frame_no = next_frame_number(&frames);
        let next_breaker = suggested_breaker(&record, next_frame_no);
        Ok(MatchDetail {
            record,
            frames,
            breaks,
            outcome,
            active_frame_no,
            next_frame_no,
            next_breaker,
        })
    }

    /// Seasons to offer, newest first.
    pub fn seasons(&self, current_year: Season) -> ScoreResult<Vec<Season>> {
        let known = self.store.fetch_seasons()?;
        Ok(season_choices(
            known,
            current_year,
            self.config.season_fallback_span,
        ))
    }

    fn load_match(&self, match_id: MatchId) -> ScoreResult<MatchRecord> {
        self.store
            .fetch_matches(&MatchFilter::id(match_id))?
            .into_iter()
            .next()
            .ok_or_else(|| ScoreError::NotFound {
                kind: "match",
                id: match_id.to_string(),
            })
    }
}
