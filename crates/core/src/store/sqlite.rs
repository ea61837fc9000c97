//! SQLite-backed aggregate store implementation.

use std::path::Path;
use std::sync::Mutex;

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};

use crate::catalog::ImageSource;
use crate::scrape::{EpisodeRecord, SeasonRecord, TitleMetadata};

use super::{MetadataStore, StoreError};

/// SQLite-backed aggregate store.
pub struct SqliteMetadataStore {
    conn: Mutex<Connection>,
    pending: Mutex<Vec<TitleMetadata>>,
}

impl SqliteMetadataStore {
    /// Create a new store, creating the database file and tables if needed.
    pub fn new(path: &Path) -> Result<Self, StoreError> {
        let conn = Connection::open(path).map_err(|e| StoreError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            pending: Mutex::new(Vec::new()),
        })
    }

    /// Create an in-memory store (useful for testing).
    pub fn in_memory() -> Result<Self, StoreError> {
        let conn =
            Connection::open_in_memory().map_err(|e| StoreError::Database(e.to_string()))?;
        Self::initialize_schema(&conn)?;
        Ok(Self {
            conn: Mutex::new(conn),
            pending: Mutex::new(Vec::new()),
        })
    }

    fn initialize_schema(conn: &Connection) -> Result<(), StoreError> {
        conn.execute_batch(
            r#"
            -- One row per scraped title and locale
            CREATE TABLE IF NOT EXISTS title_metadata (
                id TEXT NOT NULL,
                external_id TEXT NOT NULL,
                locale TEXT NOT NULL,
                title TEXT NOT NULL,
                slug_title TEXT NOT NULL,
                description TEXT NOT NULL,
                studio TEXT NOT NULL,
                rating REAL NOT NULL,
                poster_tall TEXT NOT NULL,
                poster_wide TEXT NOT NULL,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL,
                PRIMARY KEY (external_id, locale)
            );

            -- Seasons for each title
            CREATE TABLE IF NOT EXISTS title_seasons (
                title_external_id TEXT NOT NULL,
                locale TEXT NOT NULL,
                external_id TEXT NOT NULL,
                position INTEGER NOT NULL,
                title TEXT NOT NULL,
                slug_title TEXT NOT NULL,
                season_number INTEGER NOT NULL,
                sequence_number INTEGER NOT NULL,
                display_number TEXT NOT NULL,
                identifier TEXT NOT NULL,
                PRIMARY KEY (title_external_id, locale, external_id)
            );

            CREATE INDEX IF NOT EXISTS idx_title_seasons_title
                ON title_seasons(title_external_id, locale);

            -- Episodes for each season
            CREATE TABLE IF NOT EXISTS season_episodes (
                title_external_id TEXT NOT NULL,
                locale TEXT NOT NULL,
                season_external_id TEXT NOT NULL,
                external_id TEXT NOT NULL,
                position INTEGER NOT NULL,
                title TEXT NOT NULL,
                slug_title TEXT NOT NULL,
                description TEXT NOT NULL,
                ordinal TEXT NOT NULL,
                episode_number INTEGER,
                sequence_number INTEGER NOT NULL,
                thumbnails TEXT NOT NULL,
                PRIMARY KEY (title_external_id, locale, season_external_id, external_id)
            );

            CREATE INDEX IF NOT EXISTS idx_season_episodes_season
                ON season_episodes(title_external_id, locale, season_external_id);
            "#,
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;

        Ok(())
    }

    fn load_seasons(
        conn: &Connection,
        title_id: &str,
        locale: &str,
    ) -> Result<Vec<SeasonRecord>, StoreError> {
        let mut stmt = conn
            .prepare(
                "SELECT external_id, title, slug_title, season_number, sequence_number,
                        display_number, identifier
                 FROM title_seasons
                 WHERE title_external_id = ? AND locale = ?
                 ORDER BY position",
            )
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![title_id, locale], |row| {
                Ok(SeasonRecord {
                    external_id: row.get(0)?,
                    title: row.get(1)?,
                    slug_title: row.get(2)?,
                    season_number: row.get(3)?,
                    sequence_number: row.get(4)?,
                    display_number: row.get(5)?,
                    identifier: row.get(6)?,
                    episodes: Vec::new(),
                })
            })
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let mut seasons = Vec::new();
        for row in rows {
            let mut season = row.map_err(|e| StoreError::Database(e.to_string()))?;
            season.episodes = Self::load_episodes(conn, title_id, locale, &season.external_id)?;
            seasons.push(season);
        }
        Ok(seasons)
    }

    fn load_episodes(
        conn: &Connection,
        title_id: &str,
        locale: &str,
        season_id: &str,
    ) -> Result<Vec<EpisodeRecord>, StoreError> {
        let mut stmt = conn
            .prepare(
                "SELECT external_id, title, slug_title, description, ordinal,
                        episode_number, sequence_number, thumbnails
                 FROM season_episodes
                 WHERE title_external_id = ? AND locale = ? AND season_external_id = ?
                 ORDER BY position",
            )
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let rows = stmt
            .query_map(params![title_id, locale, season_id], |row| {
                let thumbnails_json: String = row.get(7)?;
                Ok(EpisodeRecord {
                    external_id: row.get(0)?,
                    title: row.get(1)?,
                    slug_title: row.get(2)?,
                    description: row.get(3)?,
                    ordinal: row.get(4)?,
                    episode_number: row.get(5)?,
                    sequence_number: row.get(6)?,
                    thumbnails: serde_json::from_str(&thumbnails_json).unwrap_or_default(),
                })
            })
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let mut episodes = Vec::new();
        for row in rows {
            episodes.push(row.map_err(|e| StoreError::Database(e.to_string()))?);
        }
        Ok(episodes)
    }

    fn write_aggregate(
        tx: &rusqlite::Transaction<'_>,
        aggregate: &TitleMetadata,
    ) -> Result<(), StoreError> {
        let poster_tall = images_json(&aggregate.poster_tall)?;
        let poster_wide = images_json(&aggregate.poster_wide)?;

        tx.execute(
            "INSERT OR REPLACE INTO title_metadata
             (id, external_id, locale, title, slug_title, description, studio, rating,
              poster_tall, poster_wide, created_at, updated_at)
             VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
            params![
                aggregate.id.to_string(),
                aggregate.external_id,
                aggregate.locale,
                aggregate.title,
                aggregate.slug_title,
                aggregate.description,
                aggregate.studio,
                aggregate.rating as f64,
                poster_tall,
                poster_wide,
                aggregate.created_at.to_rfc3339(),
                aggregate.updated_at.to_rfc3339(),
            ],
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;

        // The in-memory aggregate is the merged superset, so child rows are
        // rewritten wholesale within the transaction.
        tx.execute(
            "DELETE FROM title_seasons WHERE title_external_id = ? AND locale = ?",
            params![aggregate.external_id, aggregate.locale],
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;
        tx.execute(
            "DELETE FROM season_episodes WHERE title_external_id = ? AND locale = ?",
            params![aggregate.external_id, aggregate.locale],
        )
        .map_err(|e| StoreError::Database(e.to_string()))?;

        for (season_pos, season) in aggregate.seasons.iter().enumerate() {
            tx.execute(
                "INSERT INTO title_seasons
                 (title_external_id, locale, external_id, position, title, slug_title,
                  season_number, sequence_number, display_number, identifier)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    aggregate.external_id,
                    aggregate.locale,
                    season.external_id,
                    season_pos as i64,
                    season.title,
                    season.slug_title,
                    season.season_number,
                    season.sequence_number,
                    season.display_number,
                    season.identifier,
                ],
            )
            .map_err(|e| StoreError::Database(e.to_string()))?;

            for (episode_pos, episode) in season.episodes.iter().enumerate() {
                let thumbnails = images_json(&episode.thumbnails)?;
                tx.execute(
                    "INSERT INTO season_episodes
                     (title_external_id, locale, season_external_id, external_id, position,
                      title, slug_title, description, ordinal, episode_number,
                      sequence_number, thumbnails)
                     VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)",
                    params![
                        aggregate.external_id,
                        aggregate.locale,
                        season.external_id,
                        episode.external_id,
                        episode_pos as i64,
                        episode.title,
                        episode.slug_title,
                        episode.description,
                        episode.ordinal,
                        episode.episode_number,
                        episode.sequence_number,
                        thumbnails,
                    ],
                )
                .map_err(|e| StoreError::Database(e.to_string()))?;
            }
        }

        Ok(())
    }
}

fn images_json(images: &[ImageSource]) -> Result<String, StoreError> {
    serde_json::to_string(images).map_err(|e| StoreError::Serialization(e.to_string()))
}

fn parse_timestamp(value: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|_| Utc::now())
}

impl MetadataStore for SqliteMetadataStore {
    fn load(&self, title_id: &str, locale: &str) -> Result<Option<TitleMetadata>, StoreError> {
        let conn = self
            .conn
            .lock()
            .map_err(|_| StoreError::Internal("connection lock poisoned".to_string()))?;

        let mut stmt = conn
            .prepare(
                "SELECT id, title, slug_title, description, studio, rating,
                        poster_tall, poster_wide, created_at, updated_at
                 FROM title_metadata
                 WHERE external_id = ? AND locale = ?",
            )
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let row = stmt
            .query_row(params![title_id, locale], |row| {
                let id: String = row.get(0)?;
                let poster_tall: String = row.get(6)?;
                let poster_wide: String = row.get(7)?;
                let created_at: String = row.get(8)?;
                let updated_at: String = row.get(9)?;
                Ok((
                    id,
                    row.get::<_, String>(1)?,
                    row.get::<_, String>(2)?,
                    row.get::<_, String>(3)?,
                    row.get::<_, String>(4)?,
                    row.get::<_, f64>(5)?,
                    poster_tall,
                    poster_wide,
                    created_at,
                    updated_at,
                ))
            })
            .map(Some)
            .or_else(|e| match e {
                rusqlite::Error::QueryReturnedNoRows => Ok(None),
                other => Err(StoreError::Database(other.to_string())),
            })?;

        let Some((id, title, slug_title, description, studio, rating, tall, wide, created, updated)) =
            row
        else {
            return Ok(None);
        };

        let aggregate = TitleMetadata {
            id: id
                .parse()
                .map_err(|_| StoreError::Internal(format!("invalid aggregate id: {}", id)))?,
            external_id: title_id.to_string(),
            locale: locale.to_string(),
            title,
            slug_title,
            description,
            studio,
            rating: rating as f32,
            poster_tall: serde_json::from_str(&tall).unwrap_or_default(),
            poster_wide: serde_json::from_str(&wide).unwrap_or_default(),
            seasons: Self::load_seasons(&conn, title_id, locale)?,
            created_at: parse_timestamp(&created),
            updated_at: parse_timestamp(&updated),
        };

        Ok(Some(aggregate))
    }

    fn upsert(&self, aggregate: &TitleMetadata) -> Result<(), StoreError> {
        let mut pending = self
            .pending
            .lock()
            .map_err(|_| StoreError::Internal("pending lock poisoned".to_string()))?;

        pending.retain(|a| {
            !(a.external_id == aggregate.external_id && a.locale == aggregate.locale)
        });
        pending.push(aggregate.clone());
        Ok(())
    }

    fn commit(&self) -> Result<(), StoreError> {
        let staged: Vec<TitleMetadata> = {
            let mut pending = self
                .pending
                .lock()
                .map_err(|_| StoreError::Internal("pending lock poisoned".to_string()))?;
            std::mem::take(&mut *pending)
        };

        if staged.is_empty() {
            return Ok(());
        }

        let mut conn = self
            .conn
            .lock()
            .map_err(|_| StoreError::Internal("connection lock poisoned".to_string()))?;

        let tx = conn
            .transaction()
            .map_err(|e| StoreError::Database(e.to_string()))?;

        for aggregate in &staged {
            Self::write_aggregate(&tx, aggregate)?;
        }

        tx.commit().map_err(|e| StoreError::Database(e.to_string()))
    }
}
