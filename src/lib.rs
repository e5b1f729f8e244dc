//! Head-to-head snooker scorekeeping: derived frame, match, and season views
//! over a pluggable row store.
//!
//! # Examples
//!
//! Recording a best-of-3 with the in-memory store:
//! ```
//! use std::sync::Arc;
//!
//! use chrono::NaiveDate;
//! use snookerlog::{
//!     core::store::MemoryRowStore,
//!     record::{BreakDraft, BreakTarget, MatchDraft},
//!     service::ScoreService,
//!     types::Player,
//! };
//!
//! let service = ScoreService::new(Arc::new(MemoryRowStore::new()));
//! let date = NaiveDate::from_ymd_opt(2024, 3, 9).expect("date");
//! let m = service.create_match(MatchDraft::new(date, 3)).expect("match");
//! assert_eq!(m.season, 2024);
//!
//! service.record_next_frame(m.id, 64, 12, None).expect("frame 1");
//! service.record_next_frame(m.id, 71, 40, None).expect("frame 2");
//! service
//!     .create_break(BreakDraft {
//!         match_id: m.id,
//!         target: BreakTarget::FrameNo(2),
//!         player: Player::A,
//!         points: 27,
//!     })
//!     .expect("break");
//!
//! let stats = service.season_stats(2024).expect("stats");
//! assert_eq!(stats[Player::A].matches, 1);
//! assert_eq!(stats[Player::A].frames, 2);
//! assert_eq!(stats[Player::A].highest_break, 27);
//! ```
//!
//! Runtime usage with the SQLite store:
//! ```no_run
//! use std::sync::Arc;
//!
//! use chrono::NaiveDate;
//! use snookerlog::{
//!     persist::sqlite::SqliteRowStore,
//!     record::MatchDraft,
//!     runtime::handle::{spawn_scorekeeper, RuntimeConfig},
//! };
//!
//! # #[tokio::main]
//! # async fn main() {
//! let store = SqliteRowStore::open("snooker.db").expect("open sqlite");
//! let handle = spawn_scorekeeper(Arc::new(store), RuntimeConfig::default());
//! let date = NaiveDate::from_ymd_opt(2024, 3, 9).expect("date");
//! let m = handle.create_match(MatchDraft::new(date, 5)).await.expect("match");
//! let frame = handle.get_or_create_active_frame(m.id).await.expect("active frame");
//! assert_eq!(frame.frame_no, 1);
//! handle.shutdown().await.expect("shutdown");
//! # }
//! ```
#![deny(missing_docs)]

/// In-memory row store and index helpers.
pub mod core;
/// Pure derivation of outcomes, tallies, active frames, and season stats.
pub mod engine;
/// Validation and conflict policy for writes.
pub mod guard;
/// Row-store contract and SQLite implementation.
pub mod persist;
/// Stored rows, drafts, and edits.
pub mod record;
/// Single-writer runtime handle, events, and season view.
pub mod runtime;
/// Guarded operations combining the store and the engine.
pub mod service;
/// Shared primitive types and enums.
pub mod types;
