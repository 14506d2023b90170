//! Persistent event storage on SQLite.
//!
//! Every operation is a single statement (or, for seeding, a single
//! transaction), so SQLite serializes concurrent writers and readers always
//! observe the latest committed row.

use std::str::FromStr;

use sqlx::sqlite::{SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use sqlx::{Executor, Sqlite};
use uuid::Uuid;

use crate::config::Config;
use crate::models::{Event, EventPatch, NewEvent};

pub mod error;
mod seed;

pub use error::{StoreError, StoreResult};
pub use seed::seed_events;

const CREATE_EVENTS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS events (
        id TEXT PRIMARY KEY,
        title TEXT NOT NULL,
        background_color TEXT NOT NULL,
        start TEXT NOT NULL,
        "end" TEXT NOT NULL,
        description TEXT
    )
"#;

const SELECT_EVENTS: &str =
    r#"SELECT id, title, background_color, start, "end", description FROM events"#;

const INSERT_EVENT: &str = r#"
    INSERT INTO events (id, title, background_color, start, "end", description)
    VALUES (?, ?, ?, ?, ?, ?)
    RETURNING id, title, background_color, start, "end", description
"#;

// Absent fields bind as NULL and keep the stored value. Description carries
// an explicit presence flag because NULL is also a legal new value for it.
const UPDATE_EVENT: &str = r#"
    UPDATE events SET
        title = COALESCE(?, title),
        background_color = COALESCE(?, background_color),
        start = COALESCE(?, start),
        "end" = COALESCE(?, "end"),
        description = CASE WHEN ? THEN ? ELSE description END
    WHERE id = ?
    RETURNING id, title, background_color, start, "end", description
"#;

#[derive(Debug, Clone)]
pub struct EventStore {
    pool: SqlitePool,
}

impl EventStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Opens (creating if needed) the database named by `config.database_url`.
    pub async fn connect(config: &Config) -> StoreResult<Self> {
        let options = SqliteConnectOptions::from_str(&config.database_url)?.create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(config.max_connections)
            .connect_with(options)
            .await?;

        tracing::info!(database_url = %config.database_url, "Connected to event database");
        Ok(Self::new(pool))
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Creates the schema and seeds an empty table. Returns how many events
    /// were seeded, which is zero on every run after the first.
    pub async fn initialize(&self) -> StoreResult<usize> {
        sqlx::query(CREATE_EVENTS_TABLE).execute(&self.pool).await?;

        let mut tx = self.pool.begin().await?;
        let (existing,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM events")
            .fetch_one(&mut *tx)
            .await?;

        let mut seeded = 0;
        if existing == 0 {
            for new_event in seed_events() {
                insert_row(&mut *tx, &new_event).await?;
                seeded += 1;
            }
        }
        tx.commit().await?;

        if seeded > 0 {
            tracing::info!(seeded, "Seeded empty event table");
        } else {
            tracing::debug!(existing, "Event table already populated");
        }
        Ok(seeded)
    }

    pub async fn insert(&self, new_event: &NewEvent) -> StoreResult<Event> {
        let event = insert_row(&self.pool, new_event).await?;
        tracing::debug!(id = %event.id, "Inserted event");
        Ok(event)
    }

    /// All events, in no particular order.
    pub async fn get_all(&self) -> StoreResult<Vec<Event>> {
        let events = sqlx::query_as::<_, Event>(SELECT_EVENTS)
            .fetch_all(&self.pool)
            .await?;
        Ok(events)
    }

    pub async fn get_by_id(&self, id: &str) -> StoreResult<Event> {
        let sql = format!("{SELECT_EVENTS} WHERE id = ?");
        sqlx::query_as::<_, Event>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))
    }

    pub async fn update_partial(&self, id: &str, patch: &EventPatch) -> StoreResult<Event> {
        let event = sqlx::query_as::<_, Event>(UPDATE_EVENT)
            .bind(patch.title.as_deref())
            .bind(patch.background_color.as_deref())
            .bind(patch.start.as_deref())
            .bind(patch.end.as_deref())
            .bind(patch.description.is_some())
            .bind(patch.description.clone().flatten())
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| StoreError::NotFound(id.to_string()))?;

        tracing::debug!(id, "Updated event");
        Ok(event)
    }

    pub async fn delete(&self, id: &str) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM events WHERE id = ?")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound(id.to_string()));
        }
        tracing::debug!(id, "Deleted event");
        Ok(())
    }

    pub async fn count(&self) -> StoreResult<i64> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM events")
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }
}

async fn insert_row<'e, E>(executor: E, new_event: &NewEvent) -> Result<Event, sqlx::Error>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, Event>(INSERT_EVENT)
        .bind(Uuid::new_v4().to_string())
        .bind(&new_event.title)
        .bind(&new_event.background_color)
        .bind(&new_event.start)
        .bind(&new_event.end)
        .bind(&new_event.description)
        .fetch_one(executor)
        .await
}
