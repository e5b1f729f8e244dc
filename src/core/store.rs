use std::sync::{Mutex, MutexGuard};

use hashbrown::HashMap;
use serde::{Deserialize, Serialize};

use crate::{
    persist::{BreakFilter, FrameFilter, MatchFilter, RowStore, StoreError, StoreResult},
    record::{BreakRecord, FramePatch, FrameRecord, MatchRecord},
    types::{BreakId, FrameId, MatchId, Player},
};

use super::indices::{FrameNoIndex, VecIndex};

/// Full copy of every table, in fetch order.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StoreSnapshot {
    /// Match rows.
    pub matches: Vec<MatchRecord>,
    /// Frame rows.
    pub frames: Vec<FrameRecord>,
    /// Break rows.
    pub breaks: Vec<BreakRecord>,
}

#[derive(Debug, Default)]
struct Tables {
    matches: HashMap<MatchId, MatchRecord>,
    frames: HashMap<FrameId, FrameRecord>,
    breaks: HashMap<BreakId, BreakRecord>,
    frame_nos: FrameNoIndex,
    breaks_by_match: VecIndex<MatchId, BreakId>,
}

/// Row store kept entirely in memory.
///
/// Enforces the same constraints as the SQLite schema: unique
/// `(match, frame number)` pairs and rows referencing existing matches.
#[derive(Debug, Default)]
pub struct MemoryRowStore {
    tables: Mutex<Tables>,
}

impl MemoryRowStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Rebuilds a store from a snapshot, enforcing the usual constraints.
    pub fn from_snapshot(snapshot: StoreSnapshot) -> StoreResult<Self> {
        let store = Self::new();
        for m in &snapshot.matches {
            store.insert_match(m)?;
        }
        for f in &snapshot.frames {
            store.insert_frame(f)?;
        }
        for b in &snapshot.breaks {
            store.insert_break(b)?;
        }
        Ok(store)
    }

    /// Copies every row out.
    pub fn export_snapshot(&self) -> StoreResult<StoreSnapshot> {
        Ok(StoreSnapshot {
            matches: self.fetch_matches(&MatchFilter::default())?,
            frames: self.fetch_frames(&FrameFilter::default())?,
            breaks: self.fetch_breaks(&BreakFilter::default())?,
        })
    }

    /// Number of stored frames.
    pub fn frame_count(&self) -> StoreResult<usize> {
        Ok(self.lock()?.frames.len())
    }

    fn lock(&self) -> StoreResult<MutexGuard<'_, Tables>> {
        self.tables
            .lock()
            .map_err(|_| StoreError::Backend("memory store lock poisoned".to_string()))
    }
}

fn require_match(tables: &Tables, id: MatchId) -> StoreResult<()> {
    if tables.matches.contains_key(&id) {
        Ok(())
    } else {
        Err(StoreError::MissingRow {
            table: "matches",
            id: id.to_string(),
        })
    }
}

fn duplicate_id(table: &str, id: impl std::fmt::Display) -> StoreError {
    StoreError::Backend(format!("duplicate {table} id {id}"))
}

impl RowStore for MemoryRowStore {
    fn fetch_matches(&self, filter: &MatchFilter) -> StoreResult<Vec<MatchRecord>> {
        let tables = self.lock()?;
        let mut out: Vec<MatchRecord> = match filter.id {
            Some(id) => tables.matches.get(&id).into_iter().cloned().collect(),
            None => tables.matches.values().cloned().collect(),
        };
        out.retain(|m| filter.matches(m));
        out.sort_by(|x, y| y.date.cmp(&x.date).then_with(|| x.id.cmp(&y.id)));
        Ok(out)
    }

    fn fetch_frames(&self, filter: &FrameFilter) -> StoreResult<Vec<FrameRecord>> {
        let tables = self.lock()?;
        let mut out: Vec<FrameRecord> = match (filter.id, filter.match_id) {
            (Some(id), _) => tables.frames.get(&id).into_iter().cloned().collect(),
            (None, Some(match_id)) => tables
                .frame_nos
                .get(&match_id)
                .into_iter()
                .flat_map(|by_no| by_no.values())
                .filter_map(|id| tables.frames.get(id).cloned())
                .collect(),
            (None, None) => tables.frames.values().cloned().collect(),
        };
        out.retain(|f| filter.matches(f));
        out.sort_by(|x, y| {
            x.match_id
                .cmp(&y.match_id)
                .then_with(|| x.frame_no.cmp(&y.frame_no))
        });
        Ok(out)
    }

    fn fetch_breaks(&self, filter: &BreakFilter) -> StoreResult<Vec<BreakRecord>> {
        let tables = self.lock()?;
        let mut out: Vec<BreakRecord> = match filter.match_id {
            Some(match_id) => tables
                .breaks_by_match
                .get(&match_id)
                .into_iter()
                .flatten()
                .filter_map(|id| tables.breaks.get(id).cloned())
                .collect(),
            None => tables.breaks.values().cloned().collect(),
        };
        out.retain(|b| filter.matches(b));
        out.sort_by(|x, y| y.points.cmp(&x.points).then_with(|| x.id.cmp(&y.id)));
        Ok(out)
    }

    fn insert_match(&self, row: &MatchRecord) -> StoreResult<()> {
        let mut tables = self.lock()?;
        if tables.matches.contains_key(&row.id) {
            return Err(duplicate_id("match", row.id));
        }
        tables.matches.insert(row.id, row.clone());
        Ok(())
    }

    fn insert_frame(&self, row: &FrameRecord) -> StoreResult<()> {
        let mut tables = self.lock()?;
        require_match(&tables, row.match_id)?;
        if tables.frames.contains_key(&row.id) {
            return Err(duplicate_id("frame", row.id));
        }
        let by_no = tables.frame_nos.entry(row.match_id).or_default();
        if by_no.contains_key(&row.frame_no) {
            return Err(StoreError::Conflict {
                match_id: row.match_id,
                frame_no: row.frame_no,
            });
        }
        by_no.insert(row.frame_no, row.id);
        tables.frames.insert(row.id, row.clone());
        Ok(())
    }

    fn update_frame(&self, id: FrameId, patch: &FramePatch) -> StoreResult<FrameRecord> {
        let mut tables = self.lock()?;
        let rec = tables.frames.get_mut(&id).ok_or_else(|| StoreError::MissingRow {
            table: "frames",
            id: id.to_string(),
        })?;
        patch.apply_to(rec);
        Ok(rec.clone())
    }

    fn insert_break(&self, row: &BreakRecord) -> StoreResult<()> {
        let mut tables = self.lock()?;
        require_match(&tables, row.match_id)?;
        if tables.breaks.contains_key(&row.id) {
            return Err(duplicate_id("break", row.id));
        }
        tables
            .breaks_by_match
            .entry(row.match_id)
            .or_default()
            .push(row.id);
        tables.breaks.insert(row.id, row.clone());
        Ok(())
    }

    fn update_break_points(&self, id: BreakId, points: u32) -> StoreResult<BreakRecord> {
        let mut tables = self.lock()?;
        let rec = tables.breaks.get_mut(&id).ok_or_else(|| StoreError::MissingRow {
            table: "breaks",
            id: id.to_string(),
        })?;
        rec.points = points;
        Ok(rec.clone())
    }

    fn update_match_winner(&self, id: MatchId, winner: Option<Player>) -> StoreResult<MatchRecord> {
        let mut tables = self.lock()?;
        let rec = tables.matches.get_mut(&id).ok_or_else(|| StoreError::MissingRow {
            table: "matches",
            id: id.to_string(),
        })?;
        rec.winner = winner;
        Ok(rec.clone())
    }
}
