// SPDX-FileCopyrightText: 2026 Devmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `ReminderStore` over SQLite.

use std::fmt::Display;
use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rusqlite::params;
use tokio_rusqlite::Connection;
use tracing::{debug, info};

use devmatch_core::{DevmatchError, ReminderStore, TrialUser};

use crate::migrations::run_migrations;

fn storage_err(e: impl Display) -> DevmatchError {
    DevmatchError::Storage {
        source: Box::new(std::io::Error::other(e.to_string())),
    }
}

fn map_tr_err(e: tokio_rusqlite::Error<rusqlite::Error>) -> DevmatchError {
    storage_err(e)
}

/// Reminder bookkeeping backed by the `users` table.
#[derive(Clone)]
pub struct SqliteReminderStore {
    conn: Arc<Connection>,
}

impl SqliteReminderStore {
    /// Opens (creating if needed) the database at `path` and migrates it.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self, DevmatchError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent).map_err(|e| DevmatchError::Storage {
                source: Box::new(e),
            })?;
        }
        let conn = Connection::open(path).await.map_err(storage_err)?;
        let store = Self::migrate(conn).await?;
        info!(path = %path.display(), "reminder store opened");
        Ok(store)
    }

    pub async fn open_in_memory() -> Result<Self, DevmatchError> {
        let conn = Connection::open_in_memory().await.map_err(storage_err)?;
        Self::migrate(conn).await
    }

    async fn migrate(conn: Connection) -> Result<Self, DevmatchError> {
        let migrated = conn
            .call(|conn| Ok::<_, rusqlite::Error>(run_migrations(conn)))
            .await
            .map_err(map_tr_err)?;
        migrated?;
        Ok(Self {
            conn: Arc::new(conn),
        })
    }

    /// Inserts or replaces a user with a fresh, unreminded trial.
    pub async fn upsert_user(&self, user: &TrialUser) -> Result<(), DevmatchError> {
        let TrialUser {
            id,
            username,
            email,
            free_trial,
        } = user.clone();
        self.conn
            .call(move |conn| {
                conn.execute(
                    "INSERT INTO users (id, username, email, free_trial, reminder_sent)
                     VALUES (?1, ?2, ?3, ?4, 0)
                     ON CONFLICT(id) DO UPDATE SET
                        username = excluded.username,
                        email = excluded.email,
                        free_trial = excluded.free_trial,
                        reminder_sent = 0",
                    params![id, username, email, free_trial.timestamp()],
                )?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)
    }

    /// Starts a new trial ending at `ends_at`, re-arming the reminder.
    ///
    /// Returns `false` if no such user exists.
    pub async fn start_trial(&self, id: &str, ends_at: DateTime<Utc>) -> Result<bool, DevmatchError> {
        let id = id.to_string();
        let changed = self
            .conn
            .call(move |conn| {
                conn.execute(
                    "UPDATE users SET free_trial = ?2, reminder_sent = 0 WHERE id = ?1",
                    params![id, ends_at.timestamp()],
                )
            })
            .await
            .map_err(map_tr_err)?;
        Ok(changed > 0)
    }

    pub async fn reminder_sent(&self, id: &str) -> Result<Option<bool>, DevmatchError> {
        let id = id.to_string();
        self.conn
            .call(move |conn| {
                let mut stmt = conn.prepare("SELECT reminder_sent FROM users WHERE id = ?1")?;
                let mut rows = stmt.query(params![id])?;
                match rows.next()? {
                    Some(row) => Ok(Some(row.get::<_, i64>(0)? != 0)),
                    None => Ok(None),
                }
            })
            .await
            .map_err(map_tr_err)
    }
}

#[async_trait]
impl ReminderStore for SqliteReminderStore {
    async fn fetch_trial_ending_users(
        &self,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<Vec<TrialUser>, DevmatchError> {
        let (start, end) = (window_start.timestamp(), window_end.timestamp());
        let rows = self
            .conn
            .call(move |conn| {
                let mut stmt = conn.prepare(
                    "SELECT id, username, email, free_trial FROM users
                     WHERE free_trial BETWEEN ?1 AND ?2 AND reminder_sent = 0
                     ORDER BY free_trial, id",
                )?;
                let rows = stmt
                    .query_map(params![start, end], |row| {
                        Ok((
                            row.get::<_, String>(0)?,
                            row.get::<_, String>(1)?,
                            row.get::<_, String>(2)?,
                            row.get::<_, i64>(3)?,
                        ))
                    })?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(rows)
            })
            .await
            .map_err(map_tr_err)?;

        rows.into_iter()
            .map(|(id, username, email, secs)| {
                let free_trial = DateTime::from_timestamp(secs, 0)
                    .ok_or_else(|| storage_err(format!("user {id} has invalid free_trial {secs}")))?;
                Ok(TrialUser {
                    id,
                    username,
                    email,
                    free_trial,
                })
            })
            .collect()
    }

    async fn update_sent_reminder(&self, user_ids: &[String]) -> Result<(), DevmatchError> {
        if user_ids.is_empty() {
            return Ok(());
        }
        let ids = user_ids.to_vec();
        let count = ids.len();
        self.conn
            .call(move |conn| {
                let tx = conn.transaction()?;
                {
                    let mut stmt = tx.prepare("UPDATE users SET reminder_sent = 1 WHERE id = ?1")?;
                    for id in &ids {
                        stmt.execute(params![id])?;
                    }
                }
                tx.commit()?;
                Ok(())
            })
            .await
            .map_err(map_tr_err)?;
        debug!(count, "reminder flags set");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeDelta, TimeZone};

    fn user(id: &str, free_trial: DateTime<Utc>) -> TrialUser {
        TrialUser {
            id: id.to_string(),
            username: id.to_string(),
            email: format!("{id}@example.com"),
            free_trial,
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap()
    }

    #[tokio::test]
    async fn fetch_returns_unreminded_users_in_window() {
        let store = SqliteReminderStore::open_in_memory().await.unwrap();
        let now = now();
        store.upsert_user(&user("soon", now + TimeDelta::hours(36))).await.unwrap();
        store.upsert_user(&user("edge", now + TimeDelta::hours(48))).await.unwrap();
        store.upsert_user(&user("far", now + TimeDelta::hours(72))).await.unwrap();
        store.upsert_user(&user("past", now - TimeDelta::hours(2))).await.unwrap();

        let users = store
            .fetch_trial_ending_users(now, now + TimeDelta::hours(48))
            .await
            .unwrap();
        let ids: Vec<_> = users.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["soon", "edge"]);
        assert_eq!(users[0].free_trial, now + TimeDelta::hours(36));
    }

    #[tokio::test]
    async fn flagged_users_are_not_fetched_again() {
        let store = SqliteReminderStore::open_in_memory().await.unwrap();
        let now = now();
        store.upsert_user(&user("u1", now + TimeDelta::hours(10))).await.unwrap();
        store.upsert_user(&user("u2", now + TimeDelta::hours(20))).await.unwrap();

        store
            .update_sent_reminder(&["u1".to_string(), "u2".to_string()])
            .await
            .unwrap();
        assert_eq!(store.reminder_sent("u1").await.unwrap(), Some(true));

        let users = store
            .fetch_trial_ending_users(now, now + TimeDelta::hours(48))
            .await
            .unwrap();
        assert!(users.is_empty());
    }

    #[tokio::test]
    async fn restarting_a_trial_rearms_the_reminder() {
        let store = SqliteReminderStore::open_in_memory().await.unwrap();
        let now = now();
        store.upsert_user(&user("u1", now + TimeDelta::hours(10))).await.unwrap();
        store.update_sent_reminder(&["u1".to_string()]).await.unwrap();

        assert!(store.start_trial("u1", now + TimeDelta::hours(30)).await.unwrap());
        assert!(!store.start_trial("ghost", now).await.unwrap());
        assert_eq!(store.reminder_sent("u1").await.unwrap(), Some(false));
        assert_eq!(store.reminder_sent("ghost").await.unwrap(), None);
    }

    #[tokio::test]
    async fn reopening_a_file_database_keeps_data() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("devmatch.db");
        let now = now();
        {
            let store = SqliteReminderStore::open(&path).await.unwrap();
            store.upsert_user(&user("u1", now + TimeDelta::hours(1))).await.unwrap();
        }
        let store = SqliteReminderStore::open(&path).await.unwrap();
        let users = store
            .fetch_trial_ending_users(now, now + TimeDelta::hours(2))
            .await
            .unwrap();
        assert_eq!(users.len(), 1);
    }
}
