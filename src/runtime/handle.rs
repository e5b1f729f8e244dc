use std::sync::Arc;

use chrono::Datelike;
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot};

use crate::{
    engine::season::SeasonStats,
    persist::RowStore,
    record::{BreakDraft, BreakRecord, FrameDraft, FrameEdit, FrameRecord, MatchDraft, MatchRecord},
    service::{MatchDetail, ScoreConfig, ScoreError, ScoreResult, ScoreService, SeasonOverview},
    types::{BreakId, FrameId, MatchId, Player, Season},
};

use super::events::ScoreEvent;

/// Failure of a runtime call.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// The service rejected or failed the operation.
    #[error(transparent)]
    Score(#[from] ScoreError),
    /// The command loop has stopped.
    #[error("scorekeeper channel closed")]
    ChannelClosed,
    /// The blocking task panicked or was cancelled.
    #[error("blocking task failed: {0}")]
    Join(String),
}

/// Runtime tunables.
#[derive(Debug, Clone)]
pub struct RuntimeConfig {
    /// Capacity of the command channel.
    pub command_queue_bound: usize,
    /// Capacity of the event broadcast channel.
    pub event_capacity: usize,
    /// Settings passed to the wrapped [`ScoreService`].
    pub service: ScoreConfig,
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            command_queue_bound: 256,
            event_capacity: 1024,
            service: ScoreConfig::default(),
        }
    }
}

/// Cloneable handle to one scorekeeping session.
///
/// Commands are executed one at a time in submission order. Separate
/// sessions sharing a store are not coordinated with each other.
pub struct ScoresHandle {
    cmd_tx: mpsc::Sender<Command>,
    events_tx: broadcast::Sender<ScoreEvent>,
}

impl Clone for ScoresHandle {
    fn clone(&self) -> Self {
        Self {
            cmd_tx: self.cmd_tx.clone(),
            events_tx: self.events_tx.clone(),
        }
    }
}

type Reply<T> = oneshot::Sender<Result<T, RuntimeError>>;

enum Command {
    CreateMatch {
        draft: MatchDraft,
        resp: Reply<MatchRecord>,
    },
    CreateFrame {
        draft: FrameDraft,
        resp: Reply<FrameRecord>,
    },
    RecordNextFrame {
        match_id: MatchId,
        score_a: u32,
        score_b: u32,
        breaker: Option<Player>,
        resp: Reply<FrameRecord>,
    },
    UpdateFrame {
        frame_id: FrameId,
        edit: FrameEdit,
        resp: Reply<FrameRecord>,
    },
    ActiveFrame {
        match_id: MatchId,
        resp: Reply<FrameRecord>,
    },
    CreateBreak {
        draft: BreakDraft,
        resp: Reply<BreakRecord>,
    },
    UpdateBreak {
        break_id: BreakId,
        points: u32,
        resp: Reply<BreakRecord>,
    },
    SetMatchWinner {
        match_id: MatchId,
        winner: Option<Player>,
        resp: Reply<MatchRecord>,
    },
    SeasonStats {
        season: Season,
        resp: Reply<SeasonStats>,
    },
    SeasonOverview {
        season: Season,
        resp: Reply<SeasonOverview>,
    },
    MatchDetail {
        match_id: MatchId,
        resp: Reply<MatchDetail>,
    },
    Seasons {
        current_year: Season,
        resp: Reply<Vec<Season>>,
    },
    Shutdown {
        resp: oneshot::Sender<()>,
    },
}

/// Starts the command loop over `store` and returns its handle.
pub fn spawn_scorekeeper(store: Arc<dyn RowStore>, config: RuntimeConfig) -> ScoresHandle {
    let (cmd_tx, mut cmd_rx) = mpsc::channel::<Command>(config.command_queue_bound);
    let (events_tx, _) = broadcast::channel::<ScoreEvent>(config.event_capacity);

    let service = ScoreService::with_config(store, config.service);
    let events_tx_loop = events_tx.clone();

    tokio::spawn(async move {
        tracing::info!("scorekeeper started");
        while let Some(cmd) = cmd_rx.recv().await {
            if handle_command(cmd, &service, &events_tx_loop).await {
                break;
            }
        }
        tracing::info!("scorekeeper stopped");
    });

    ScoresHandle { cmd_tx, events_tx }
}

impl ScoresHandle {
    /// Subscribes to events emitted after successful writes.
    pub fn subscribe(&self) -> broadcast::Receiver<ScoreEvent> {
        self.events_tx.subscribe()
    }

    async fn request<T>(&self, build: impl FnOnce(Reply<T>) -> Command) -> Result<T, RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(build(tx))
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)?
    }

    /// Creates a match.
    pub async fn create_match(&self, draft: MatchDraft) -> Result<MatchRecord, RuntimeError> {
        self.request(|resp| Command::CreateMatch { draft, resp }).await
    }

    /// Creates a frame at an explicit number.
    pub async fn create_frame(&self, draft: FrameDraft) -> Result<FrameRecord, RuntimeError> {
        self.request(|resp| Command::CreateFrame { draft, resp }).await
    }

    /// Appends a frame after the highest existing one.
    pub async fn record_next_frame(
        &self,
        match_id: MatchId,
        score_a: u32,
        score_b: u32,
        breaker: Option<Player>,
    ) -> Result<FrameRecord, RuntimeError> {
        self.request(|resp| Command::RecordNextFrame {
            match_id,
            score_a,
            score_b,
            breaker,
            resp,
        })
        .await
    }

    /// Edits a frame's scores.
    pub async fn update_frame(&self, frame_id: FrameId, edit: FrameEdit) -> Result<FrameRecord, RuntimeError> {
        self.request(|resp| Command::UpdateFrame { frame_id, edit, resp }).await
    }

    /// Returns the active frame, inserting a placeholder if none is open.
    /// [`ScoreEvent::FrameCreated`] is emitted only when one was inserted.
    pub async fn get_or_create_active_frame(&self, match_id: MatchId) -> Result<FrameRecord, RuntimeError> {
        self.request(|resp| Command::ActiveFrame { match_id, resp }).await
    }

    /// Records a 10+ break.
    pub async fn create_break(&self, draft: BreakDraft) -> Result<BreakRecord, RuntimeError> {
        self.request(|resp| Command::CreateBreak { draft, resp }).await
    }

    /// Corrects a break's points.
    pub async fn update_break(&self, break_id: BreakId, points: u32) -> Result<BreakRecord, RuntimeError> {
        self.request(|resp| Command::UpdateBreak { break_id, points, resp }).await
    }

    /// Sets or clears a match's explicit winner.
    pub async fn set_match_winner(
        &self,
        match_id: MatchId,
        winner: Option<Player>,
    ) -> Result<MatchRecord, RuntimeError> {
        self.request(|resp| Command::SetMatchWinner { match_id, winner, resp }).await
    }

    /// Per-player metrics for a season.
    pub async fn season_stats(&self, season: Season) -> Result<SeasonStats, RuntimeError> {
        self.request(|resp| Command::SeasonStats { season, resp }).await
    }

    /// Season metrics plus match summaries.
    pub async fn season_overview(&self, season: Season) -> Result<SeasonOverview, RuntimeError> {
        self.request(|resp| Command::SeasonOverview { season, resp }).await
    }

    /// Match with frames, breaks, and derived state.
    pub async fn match_detail(&self, match_id: MatchId) -> Result<MatchDetail, RuntimeError> {
        self.request(|resp| Command::MatchDetail { match_id, resp }).await
    }

    /// Seasons to offer, relative to today's year.
    pub async fn seasons(&self) -> Result<Vec<Season>, RuntimeError> {
        let current_year = chrono::Local::now().year();
        self.request(|resp| Command::Seasons { current_year, resp }).await
    }

    /// Stops the command loop after queued commands drain.
    pub async fn shutdown(&self) -> Result<(), RuntimeError> {
        let (tx, rx) = oneshot::channel();
        self.cmd_tx
            .send(Command::Shutdown { resp: tx })
            .await
            .map_err(|_| RuntimeError::ChannelClosed)?;
        rx.await.map_err(|_| RuntimeError::ChannelClosed)
    }
}

async fn blocking<T, F>(service: &ScoreService, f: F) -> Result<T, RuntimeError>
where
    T: Send + 'static,
    F: FnOnce(&ScoreService) -> ScoreResult<T> + Send + 'static,
{
    let service = service.clone();
    tokio::task::spawn_blocking(move || f(&service))
        .await
        .map_err(|e| RuntimeError::Join(e.to_string()))?
        .map_err(RuntimeError::from)
}

fn emit(events_tx: &broadcast::Sender<ScoreEvent>, event: ScoreEvent) {
    let _ = events_tx.send(event);
}

async fn handle_command(
    cmd: Command,
    service: &ScoreService,
    events_tx: &broadcast::Sender<ScoreEvent>,
) -> bool {
    match cmd {
        Command::CreateMatch { draft, resp } => {
            let res = blocking(service, move |s| s.create_match(draft)).await;
            if let Ok(m) = &res {
                emit(events_tx, ScoreEvent::MatchCreated {
                    id: m.id,
                    season: m.season,
                });
            }
            let _ = resp.send(res);
        }
        Command::CreateFrame { draft, resp } => {
            let res = blocking(service, move |s| s.create_frame(draft)).await;
            if let Ok(f) = &res {
                emit(events_tx, frame_created(f));
            }
            let _ = resp.send(res);
        }
        Command::RecordNextFrame {
            match_id,
            score_a,
            score_b,
            breaker,
            resp,
        } => {
            let res = blocking(service, move |s| {
                s.record_next_frame(match_id, score_a, score_b, breaker)
            })
            .await;
            if let Ok(f) = &res {
                emit(events_tx, frame_created(f));
            }
            let _ = resp.send(res);
        }
        Command::UpdateFrame { frame_id, edit, resp } => {
            let res = blocking(service, move |s| s.update_frame(frame_id, edit)).await;
            if let Ok(f) = &res {
                emit(events_tx, ScoreEvent::FrameUpdated {
                    match_id: f.match_id,
                    id: f.id,
                });
            }
            let _ = resp.send(res);
        }
        Command::ActiveFrame { match_id, resp } => {
            let res = blocking(service, move |s| s.ensure_active_frame(match_id)).await;
            if let Ok(active) = &res {
                if active.created {
                    emit(events_tx, frame_created(&active.frame));
                }
            }
            let _ = resp.send(res.map(|active| active.frame));
        }
        Command::CreateBreak { draft, resp } => {
            let res = blocking(service, move |s| s.create_break(draft)).await;
            if let Ok(b) = &res {
                emit(events_tx, ScoreEvent::BreakRecorded {
                    match_id: b.match_id,
                    id: b.id,
                });
            }
            let _ = resp.send(res);
        }
        Command::UpdateBreak {
            break_id,
            points,
            resp,
        } => {
            let res = blocking(service, move |s| s.update_break(break_id, points)).await;
            if let Ok(b) = &res {
                emit(events_tx, ScoreEvent::BreakUpdated {
                    match_id: b.match_id,
                    id: b.id,
                });
            }
            let _ = resp.send(res);
        }
        Command::SetMatchWinner {
            match_id,
            winner,
            resp,
        } => {
            let res = blocking(service, move |s| s.set_match_winner(match_id, winner)).await;
            if res.is_ok() {
                emit(events_tx, ScoreEvent::MatchWinnerChanged { id: match_id });
            }
            let _ = resp.send(res);
        }
        Command::SeasonStats { season, resp } => {
            let _ = resp.send(blocking(service, move |s| s.season_stats(season)).await);
        }
        Command::SeasonOverview { season, resp } => {
            let _ = resp.send(blocking(service, move |s| s.season_overview(season)).await);
        }
        Command::MatchDetail { match_id, resp } => {
            let _ = resp.send(blocking(service, move |s| s.match_detail(match_id)).await);
        }
        Command::Seasons { current_year, resp } => {
            let _ = resp.send(blocking(service, move |s| s.seasons(current_year)).await);
        }
        Command::Shutdown { resp } => {
            let _ = resp.send(());
            return true;
        }
    }

    false
}

fn frame_created(f: &FrameRecord) -> ScoreEvent {
    ScoreEvent::FrameCreated {
        match_id: f.match_id,
        id: f.id,
        frame_no: f.frame_no,
    }
}
