use std::path::Path;
use std::str::FromStr;
use std::sync::{Mutex, MutexGuard};

use chrono::{SecondsFormat, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::Serialize;
use serde_json::Value;
use uuid::Uuid;

use crate::db::sqlite::{current_schema_version, open_database, open_memory_database};
use crate::db::DatabaseError;
use crate::models::{DrillDocument, GoalMode, QaReport};
use crate::pipeline::generation::DrillStore;

/// Page size used when the caller gives none.
pub const DEFAULT_PAGE_SIZE: u32 = 20;

/// Largest page `list_drills` returns.
pub const MAX_PAGE_SIZE: u32 = 50;

/// One row of the drill listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrillSummary {
    pub id: String,
    pub title: String,
    pub game_model_id: Option<String>,
    pub age_group: Option<String>,
    pub goal_mode: GoalMode,
    pub goals_supported: Vec<i64>,
    pub qa_score: Option<f64>,
    pub approved: bool,
    pub created_at: String,
}

/// A stored drill with its full JSON and latest QA report.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StoredDrill {
    #[serde(flatten)]
    pub summary: DrillSummary,
    pub json: Value,
    pub qa: Option<QaReport>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DrillPage {
    pub items: Vec<DrillSummary>,
    pub next_cursor: Option<String>,
}

/// Store a normalized drill and its QA report in one transaction.
/// Returns the new drill id.
pub fn insert_drill(conn: &Connection, drill: &DrillDocument) -> Result<String, DatabaseError> {
    let created_at = Utc::now().to_rfc3339_opts(SecondsFormat::Micros, true);
    insert_drill_at(conn, drill, &created_at)
}

/// `insert_drill` with an explicit RFC 3339 creation time.
pub fn insert_drill_at(
    conn: &Connection,
    drill: &DrillDocument,
    created_at: &str,
) -> Result<String, DatabaseError> {
    let goal_mode = drill.goal_mode.ok_or_else(|| {
        DatabaseError::ConstraintViolation("drill must be normalized before storage".into())
    })?;

    let id = Uuid::new_v4().to_string();
    let title = drill
        .title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .unwrap_or("Untitled");
    let age_group = drill.extra.get("ageGroup").and_then(Value::as_str);
    let goals_supported = serde_json::to_string(&drill.goals_supported)?;
    let json = serde_json::to_string(&drill.to_value())?;

    let tx = conn.unchecked_transaction()?;
    tx.execute(
        "INSERT INTO drills (id, title, game_model_id, age_group, goal_mode, goals_supported,
         qa_score, approved, json, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)",
        params![
            id,
            title,
            drill.game_model_id,
            age_group,
            goal_mode.as_str(),
            goals_supported,
            drill.qa.as_ref().and_then(QaReport::average),
            drill.qa.as_ref().is_some_and(|qa| qa.pass),
            json,
            created_at,
        ],
    )?;

    if let Some(qa) = &drill.qa {
        tx.execute(
            "INSERT INTO qa_reports (id, drill_id, pass, scores, notes, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                Uuid::new_v4().to_string(),
                id,
                qa.pass,
                serde_json::to_string(&qa.scores)?,
                serde_json::to_string(&qa.notes)?,
                created_at,
            ],
        )?;
    }

    tx.commit()?;
    Ok(id)
}

const SUMMARY_COLUMNS: &str = "id, title, game_model_id, age_group, goal_mode, goals_supported,
     qa_score, approved, created_at";

struct SummaryRow {
    id: String,
    title: String,
    game_model_id: Option<String>,
    age_group: Option<String>,
    goal_mode: String,
    goals_supported: String,
    qa_score: Option<f64>,
    approved: bool,
    created_at: String,
}

impl SummaryRow {
    fn read(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            title: row.get(1)?,
            game_model_id: row.get(2)?,
            age_group: row.get(3)?,
            goal_mode: row.get(4)?,
            goals_supported: row.get(5)?,
            qa_score: row.get(6)?,
            approved: row.get(7)?,
            created_at: row.get(8)?,
        })
    }

    fn into_summary(self) -> Result<DrillSummary, DatabaseError> {
        Ok(DrillSummary {
            goal_mode: GoalMode::from_str(&self.goal_mode)?,
            goals_supported: serde_json::from_str(&self.goals_supported)?,
            id: self.id,
            title: self.title,
            game_model_id: self.game_model_id,
            age_group: self.age_group,
            qa_score: self.qa_score,
            approved: self.approved,
            created_at: self.created_at,
        })
    }
}

/// Fetch one drill with its most recent QA report.
pub fn get_drill(conn: &Connection, id: &str) -> Result<StoredDrill, DatabaseError> {
    let row = conn
        .query_row(
            &format!("SELECT {SUMMARY_COLUMNS}, json FROM drills WHERE id = ?1"),
            params![id],
            |row| Ok((SummaryRow::read(row)?, row.get::<_, String>(9)?)),
        )
        .optional()?;
    let Some((summary, json)) = row else {
        return Err(DatabaseError::NotFound {
            entity_type: "drill".into(),
            id: id.into(),
        });
    };

    let qa = conn
        .query_row(
            "SELECT pass, scores, notes FROM qa_reports WHERE drill_id = ?1
             ORDER BY created_at DESC LIMIT 1",
            params![id],
            |row| {
                Ok((
                    row.get::<_, bool>(0)?,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                ))
            },
        )
        .optional()?
        .map(|(pass, scores, notes)| -> Result<QaReport, DatabaseError> {
            let scores: Value = serde_json::from_str(&scores)?;
            let notes: Value = serde_json::from_str(&notes)?;
            let mut qa = QaReport::from_value(&serde_json::json!({
                "scores": scores,
                "notes": notes,
            }));
            qa.pass = pass;
            Ok(qa)
        })
        .transpose()?;

    Ok(StoredDrill {
        summary: summary.into_summary()?,
        json: serde_json::from_str(&json)?,
        qa,
    })
}

/// Newest-first page of drills. `limit` is clamped to 1..=50; `cursor` is
/// the id of the last drill of the previous page.
pub fn list_drills(
    conn: &Connection,
    limit: u32,
    cursor: Option<&str>,
) -> Result<DrillPage, DatabaseError> {
    let limit = limit.clamp(1, MAX_PAGE_SIZE);
    let fetch = i64::from(limit) + 1;

    let rows: Vec<SummaryRow> = match cursor {
        Some(cursor) => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SUMMARY_COLUMNS} FROM drills
                 WHERE (created_at, id) < (SELECT created_at, id FROM drills WHERE id = ?1)
                 ORDER BY created_at DESC, id DESC LIMIT ?2"
            ))?;
            let rows = stmt.query_map(params![cursor, fetch], SummaryRow::read)?;
            rows.collect::<Result<_, _>>()?
        }
        None => {
            let mut stmt = conn.prepare(&format!(
                "SELECT {SUMMARY_COLUMNS} FROM drills
                 ORDER BY created_at DESC, id DESC LIMIT ?1"
            ))?;
            let rows = stmt.query_map(params![fetch], SummaryRow::read)?;
            rows.collect::<Result<_, _>>()?
        }
    };

    let mut items = rows
        .into_iter()
        .map(SummaryRow::into_summary)
        .collect::<Result<Vec<_>, _>>()?;
    let next_cursor = if items.len() > limit as usize {
        items.truncate(limit as usize);
        items.last().map(|d| d.id.clone())
    } else {
        None
    };

    Ok(DrillPage { items, next_cursor })
}

pub fn count_drills(conn: &Connection) -> Result<i64, DatabaseError> {
    Ok(conn.query_row("SELECT COUNT(*) FROM drills", [], |row| row.get(0))?)
}

/// Database status for the health endpoint.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DbHealth {
    pub ok: bool,
    pub schema_version: i64,
    pub drills: i64,
}

/// SQLite-backed drill store shared between request handlers.
pub struct SqliteDrillStore {
    conn: Mutex<Connection>,
}

impl SqliteDrillStore {
    pub fn open(path: &Path) -> Result<Self, DatabaseError> {
        Ok(Self::from_connection(open_database(path)?))
    }

    pub fn in_memory() -> Result<Self, DatabaseError> {
        Ok(Self::from_connection(open_memory_database()?))
    }

    pub fn from_connection(conn: Connection) -> Self {
        Self {
            conn: Mutex::new(conn),
        }
    }

    fn conn(&self) -> MutexGuard<'_, Connection> {
        self.conn.lock().unwrap_or_else(|e| e.into_inner())
    }

    pub fn get(&self, id: &str) -> Result<StoredDrill, DatabaseError> {
        get_drill(&self.conn(), id)
    }

    pub fn list(&self, limit: u32, cursor: Option<&str>) -> Result<DrillPage, DatabaseError> {
        list_drills(&self.conn(), limit, cursor)
    }

    pub fn health(&self) -> Result<DbHealth, DatabaseError> {
        let conn = self.conn();
        Ok(DbHealth {
            ok: true,
            schema_version: current_schema_version(&conn),
            drills: count_drills(&conn)?,
        })
    }
}

impl DrillStore for SqliteDrillStore {
    fn save(&self, drill: &DrillDocument) -> Result<String, DatabaseError> {
        insert_drill(&self.conn(), drill)
    }
}
