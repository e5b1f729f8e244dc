//! SQLite-backed row store.

use std::path::Path;
use std::sync::{Mutex, MutexGuard};

use rusqlite::{
    Connection, ErrorCode, OptionalExtension, Row, params,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use uuid::Uuid;

use crate::{
    record::{BreakRecord, FramePatch, FrameRecord, MatchRecord},
    types::{BestOf, BreakId, FrameId, MatchId, Player, Season},
};

use super::{BreakFilter, FrameFilter, MatchFilter, RowStore, StoreError, StoreResult};

const MATCH_COLUMNS: &str = "id, season, date, best_of, first_breaker, winner, notes";
const FRAME_COLUMNS: &str = "id, match_id, season, frame_no, score_a, score_b, winner, breaker";
const BREAK_COLUMNS: &str = "id, match_id, frame_id, season, player, points";

macro_rules! uuid_column {
    ($($name:ident),* $(,)?) => {
        $(
            impl ToSql for $name {
                fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
                    Ok(ToSqlOutput::from(self.0.to_string()))
                }
            }

            impl FromSql for $name {
                fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
                    Uuid::parse_str(value.as_str()?)
                        .map($name)
                        .map_err(|e| FromSqlError::Other(Box::new(e)))
                }
            }
        )*
    };
}

uuid_column!(MatchId, FrameId, BreakId);

impl ToSql for Player {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.code()))
    }
}

impl FromSql for Player {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let code = value.as_str()?;
        Player::from_code(code).ok_or_else(|| {
            FromSqlError::Other(format!("unknown player code {code:?}").into())
        })
    }
}

impl ToSql for BestOf {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(i64::from(self.frames())))
    }
}

impl FromSql for BestOf {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let raw = u8::try_from(value.as_i64()?).map_err(|e| FromSqlError::Other(Box::new(e)))?;
        BestOf::try_from(raw).map_err(|e| FromSqlError::Other(Box::new(e)))
    }
}

/// SQLite implementation of [`crate::persist::RowStore`].
pub struct SqliteRowStore {
    conn: Mutex<Connection>,
}

impl SqliteRowStore {
    /// Opens or creates a database at `path`.
    ///
    /// Enables WAL mode, `synchronous=NORMAL`, and foreign keys.
    pub fn open(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        tracing::info!(path = %path.display(), "opening sqlite row store");
        let conn = Connection::open(path)?;
        Self::init_connection(conn)
    }

    /// Opens a private in-memory database.
    pub fn open_in_memory() -> StoreResult<Self> {
        let conn = Connection::open_in_memory()?;
        Self::init_connection(conn)
    }

    fn init_connection(conn: Connection) -> StoreResult<Self> {
        conn.execute_batch(include_str!("schema.sql"))?;
        conn.pragma_update(None, "journal_mode", "WAL")?;
        conn.pragma_update(None, "synchronous", "NORMAL")?;
        conn.pragma_update(None, "foreign_keys", "ON")?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn conn(&self) -> StoreResult<MutexGuard<'_, Connection>> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Backend("sqlite connection lock poisoned".to_string()))
    }
}

fn match_from_row(row: &Row<'_>) -> rusqlite::Result<MatchRecord> {
    Ok(MatchRecord {
        id: row.get("id")?,
        season: row.get("season")?,
        date: row.get("date")?,
        best_of: row.get("best_of")?,
        first_breaker: row.get("first_breaker")?,
        winner: row.get("winner")?,
        notes: row.get("notes")?,
    })
}

fn frame_from_row(row: &Row<'_>) -> rusqlite::Result<FrameRecord> {
    Ok(FrameRecord {
        id: row.get("id")?,
        match_id: row.get("match_id")?,
        season: row.get("season")?,
        frame_no: row.get("frame_no")?,
        score_a: row.get("score_a")?,
        score_b: row.get("score_b")?,
        winner: row.get("winner")?,
        breaker: row.get("breaker")?,
    })
}

fn break_from_row(row: &Row<'_>) -> rusqlite::Result<BreakRecord> {
    Ok(BreakRecord {
        id: row.get("id")?,
        match_id: row.get("match_id")?,
        frame_id: row.get("frame_id")?,
        season: row.get("season")?,
        player: row.get("player")?,
        points: row.get("points")?,
    })
}

fn constraint_code(err: &rusqlite::Error) -> Option<std::ffi::c_int> {
    match err {
        rusqlite::Error::SqliteFailure(e, _) if e.code == ErrorCode::ConstraintViolation => {
            Some(e.extended_code)
        }
        _ => None,
    }
}

impl RowStore for SqliteRowStore {
    fn fetch_matches(&self, filter: &MatchFilter) -> StoreResult<Vec<MatchRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {MATCH_COLUMNS} FROM matches \
             WHERE (?1 IS NULL OR season = ?1) AND (?2 IS NULL OR id = ?2) \
             ORDER BY date DESC, id ASC"
        ))?;
        let rows = stmt.query_map(params![filter.season, filter.id], match_from_row)?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn fetch_frames(&self, filter: &FrameFilter) -> StoreResult<Vec<FrameRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {FRAME_COLUMNS} FROM frames \
             WHERE (?1 IS NULL OR season = ?1) AND (?2 IS NULL OR match_id = ?2) \
             AND (?3 IS NULL OR frame_no = ?3) AND (?4 IS NULL OR id = ?4) \
             ORDER BY match_id ASC, frame_no ASC"
        ))?;
        let rows = stmt.query_map(
            params![filter.season, filter.match_id, filter.frame_no, filter.id],
            frame_from_row,
        )?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn fetch_breaks(&self, filter: &BreakFilter) -> StoreResult<Vec<BreakRecord>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare(&format!(
            "SELECT {BREAK_COLUMNS} FROM breaks \
             WHERE (?1 IS NULL OR season = ?1) AND (?2 IS NULL OR match_id = ?2) \
             AND (?3 IS NULL OR frame_id = ?3) \
             ORDER BY points DESC, id ASC"
        ))?;
        let rows = stmt.query_map(
            params![filter.season, filter.match_id, filter.frame_id],
            break_from_row,
        )?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn fetch_seasons(&self) -> StoreResult<Vec<Season>> {
        let conn = self.conn()?;
        let mut stmt = conn.prepare("SELECT DISTINCT season FROM matches ORDER BY season ASC")?;
        let rows = stmt.query_map([], |row| row.get(0))?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn insert_match(&self, row: &MatchRecord) -> StoreResult<()> {
        self.conn()?.execute(
            &format!("INSERT INTO matches({MATCH_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)"),
            params![
                row.id,
                row.season,
                row.date,
                row.best_of,
                row.first_breaker,
                row.winner,
                row.notes,
            ],
        )?;
        Ok(())
    }

    fn insert_frame(&self, row: &FrameRecord) -> StoreResult<()> {
        let res = self.conn()?.execute(
            &format!("INSERT INTO frames({FRAME_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)"),
            params![
                row.id,
                row.match_id,
                row.season,
                row.frame_no,
                row.score_a,
                row.score_b,
                row.winner,
                row.breaker,
            ],
        );
        match res {
            Ok(_) => Ok(()),
            Err(err) => match constraint_code(&err) {
                Some(rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE) => Err(StoreError::Conflict {
                    match_id: row.match_id,
                    frame_no: row.frame_no,
                }),
                Some(rusqlite::ffi::SQLITE_CONSTRAINT_FOREIGNKEY) => Err(StoreError::MissingRow {
                    table: "matches",
                    id: row.match_id.to_string(),
                }),
                _ => Err(err.into()),
            },
        }
    }

    fn update_frame(&self, id: FrameId, patch: &FramePatch) -> StoreResult<FrameRecord> {
        self.conn()?
            .query_row(
                &format!(
                    "UPDATE frames SET score_a = ?1, score_b = ?2, winner = ?3, breaker = ?4 \
                     WHERE id = ?5 RETURNING {FRAME_COLUMNS}"
                ),
                params![patch.score_a, patch.score_b, patch.winner, patch.breaker, id],
                frame_from_row,
            )
            .optional()?
            .ok_or_else(|| StoreError::MissingRow {
                table: "frames",
                id: id.to_string(),
            })
    }

    fn insert_break(&self, row: &BreakRecord) -> StoreResult<()> {
        self.conn()?.execute(
            &format!("INSERT INTO breaks({BREAK_COLUMNS}) VALUES (?1, ?2, ?3, ?4, ?5, ?6)"),
            params![
                row.id,
                row.match_id,
                row.frame_id,
                row.season,
                row.player,
                row.points,
            ],
        )?;
        Ok(())
    }

    fn update_break_points(&self, id: BreakId, points: u32) -> StoreResult<BreakRecord> {
        self.conn()?
            .query_row(
                &format!("UPDATE breaks SET points = ?1 WHERE id = ?2 RETURNING {BREAK_COLUMNS}"),
                params![points, id],
                break_from_row,
            )
            .optional()?
            .ok_or_else(|| StoreError::MissingRow {
                table: "breaks",
                id: id.to_string(),
            })
    }

    fn update_match_winner(&self, id: MatchId, winner: Option<Player>) -> StoreResult<MatchRecord> {
        self.conn()?
            .query_row(
                &format!("UPDATE matches SET winner = ?1 WHERE id = ?2 RETURNING {MATCH_COLUMNS}"),
                params![winner, id],
                match_from_row,
            )
            .optional()?
            .ok_or_else(|| StoreError::MissingRow {
                table: "matches",
                id: id.to_string(),
            })
    }
}
