//! Season overview loader whose published state only ever moves forward.

use std::sync::Arc;

use tokio::{sync::watch, task::JoinHandle};

use crate::{
    service::{ScoreService, SeasonOverview},
    types::Season,
};

/// Snapshot published by a [`SeasonView`].
#[derive(Debug, Clone, Default)]
pub struct ViewState {
    /// Bumped by every `select` and by `close`.
    pub generation: u64,
    /// Season most recently selected.
    pub season: Option<Season>,
    /// Loaded overview for `season`, once available.
    pub overview: Option<Arc<SeasonOverview>>,
    /// Message of the last failed load for `season`.
    pub error: Option<String>,
    /// Set once the view is torn down; nothing is published afterwards.
    pub closed: bool,
}

impl ViewState {
    /// True while the selected season has neither loaded nor failed.
    pub fn is_loading(&self) -> bool {
        !self.closed && self.season.is_some() && self.overview.is_none() && self.error.is_none()
    }
}

/// Loads season overviews off the async runtime and publishes them on a
/// watch channel.
///
/// Loads run concurrently. A load publishes only if no later `select` or
/// `close` happened after it was started.
#[derive(Clone)]
pub struct SeasonView {
    service: ScoreService,
    state: Arc<watch::Sender<ViewState>>,
}

impl SeasonView {
    /// New view with nothing selected.
    pub fn new(service: ScoreService) -> Self {
        let (state, _) = watch::channel(ViewState::default());
        Self {
            service,
            state: Arc::new(state),
        }
    }

    /// Receiver for published states.
    pub fn subscribe(&self) -> watch::Receiver<ViewState> {
        self.state.subscribe()
    }

    /// Current published state.
    pub fn current(&self) -> ViewState {
        self.state.borrow().clone()
    }

    /// Switches to `season` and starts loading it.
    ///
    /// The returned task resolves to whether its result was published.
    pub fn select(&self, season: Season) -> JoinHandle<bool> {
        let mut generation = 0;
        self.state.send_if_modified(|s| {
            if s.closed {
                return false;
            }
            s.generation += 1;
            s.season = Some(season);
            s.overview = None;
            s.error = None;
            generation = s.generation;
            true
        });

        let service = self.service.clone();
        let state = Arc::clone(&self.state);
        tokio::spawn(async move {
            if generation == 0 {
                return false;
            }
            let loaded = tokio::task::spawn_blocking(move || service.season_overview(season))
                .await
                .map_err(|e| e.to_string())
                .and_then(|res| res.map_err(|e| e.to_string()));

            state.send_if_modified(|s| {
                if s.closed || s.generation != generation {
                    tracing::debug!(
                        season,
                        generation,
                        current = s.generation,
                        "discarding stale season load"
                    );
                    return false;
                }
                match loaded {
                    Ok(overview) => s.overview = Some(Arc::new(overview)),
                    Err(err) => {
                        tracing::warn!(season, error = %err, "season load failed");
                        s.error = Some(err);
                    }
                }
                true
            })
        })
    }

    /// Reloads the selected season, if any.
    pub fn refresh(&self) -> Option<JoinHandle<bool>> {
        let season = self.state.borrow().season?;
        Some(self.select(season))
    }

    /// Tears the view down; in-flight loads are discarded.
    pub fn close(&self) {
        self.state.send_modify(|s| {
            s.generation += 1;
            s.closed = true;
        });
    }
}
