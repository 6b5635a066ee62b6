// SPDX-FileCopyrightText: 2026 Devmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory collaborators for the reminder sweep.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use devmatch_core::{DevmatchError, EmailQueue, ReminderStore, TrialEndingNotice, TrialUser};

fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

#[derive(Debug, Clone)]
struct StoredUser {
    user: TrialUser,
    reminder_sent: bool,
}

/// An in-memory users table.
#[derive(Clone, Default)]
pub struct MemoryReminderStore {
    users: Arc<Mutex<Vec<StoredUser>>>,
    fail_fetches: Arc<AtomicUsize>,
    fail_updates: Arc<AtomicUsize>,
    fetches: Arc<AtomicUsize>,
    updates: Arc<Mutex<Vec<Vec<String>>>>,
}

impl MemoryReminderStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a user who has not been reminded yet.
    pub fn insert(&self, user: TrialUser) {
        lock(&self.users).push(StoredUser {
            user,
            reminder_sent: false,
        });
    }

    /// Starts a new trial for `id`, clearing its reminder flag.
    pub fn restart_trial(&self, id: &str, free_trial: DateTime<Utc>) {
        for stored in lock(&self.users).iter_mut() {
            if stored.user.id == id {
                stored.user.free_trial = free_trial;
                stored.reminder_sent = false;
            }
        }
    }

    pub fn reminder_sent(&self, id: &str) -> bool {
        lock(&self.users)
            .iter()
            .any(|s| s.user.id == id && s.reminder_sent)
    }

    /// The next `n` fetches fail.
    pub fn fail_next_fetches(&self, n: usize) {
        self.fail_fetches.store(n, Ordering::SeqCst);
    }

    /// The next `n` flag updates fail.
    pub fn fail_next_updates(&self, n: usize) {
        self.fail_updates.store(n, Ordering::SeqCst);
    }

    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }

    /// Id batches passed to `update_sent_reminder`, in call order.
    pub fn updates(&self) -> Vec<Vec<String>> {
        lock(&self.updates).clone()
    }
}

fn take_one(counter: &AtomicUsize) -> bool {
    counter
        .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
        .is_ok()
}

fn storage_error(message: &str) -> DevmatchError {
    DevmatchError::Storage {
        source: Box::new(std::io::Error::other(message.to_string())),
    }
}

#[async_trait]
impl ReminderStore for MemoryReminderStore {
    async fn fetch_trial_ending_users(
        &self,
        window_start: DateTime<Utc>,
        window_end: DateTime<Utc>,
    ) -> Result<Vec<TrialUser>, DevmatchError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if take_one(&self.fail_fetches) {
            return Err(storage_error("mock fetch failure"));
        }
        Ok(lock(&self.users)
            .iter()
            .filter(|s| {
                !s.reminder_sent
                    && s.user.free_trial >= window_start
                    && s.user.free_trial <= window_end
            })
            .map(|s| s.user.clone())
            .collect())
    }

    async fn update_sent_reminder(&self, user_ids: &[String]) -> Result<(), DevmatchError> {
        if take_one(&self.fail_updates) {
            return Err(storage_error("mock update failure"));
        }
        lock(&self.updates).push(user_ids.to_vec());
        for stored in lock(&self.users).iter_mut() {
            if user_ids.contains(&stored.user.id) {
                stored.reminder_sent = true;
            }
        }
        Ok(())
    }
}

/// An email queue that records notices instead of sending them.
#[derive(Clone, Default)]
pub struct CapturingEmailQueue {
    sent: Arc<Mutex<Vec<TrialEndingNotice>>>,
    rejected: Arc<Mutex<Vec<String>>>,
}

impl CapturingEmailQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Enqueues addressed to `email` fail.
    pub fn reject(&self, email: &str) {
        lock(&self.rejected).push(email.to_string());
    }

    pub fn notices(&self) -> Vec<TrialEndingNotice> {
        lock(&self.sent).clone()
    }

    pub fn count(&self) -> usize {
        lock(&self.sent).len()
    }
}

impl EmailQueue for CapturingEmailQueue {
    fn queue_notify_free_trial_ending(
        &self,
        notice: TrialEndingNotice,
    ) -> Result<(), DevmatchError> {
        if lock(&self.rejected).contains(&notice.email) {
            return Err(DevmatchError::Email {
                message: format!("mock rejected {}", notice.email),
                source: None,
            });
        }
        lock(&self.sent).push(notice);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn user(id: &str, free_trial: DateTime<Utc>) -> TrialUser {
        TrialUser {
            id: id.to_string(),
            username: id.to_string(),
            email: format!("{id}@example.com"),
            free_trial,
        }
    }

    #[tokio::test]
    async fn fetch_honours_window_and_flag() {
        let now = Utc::now();
        let store = MemoryReminderStore::new();
        store.insert(user("inside", now + Duration::hours(10)));
        store.insert(user("outside", now + Duration::hours(100)));
        store.insert(user("reminded", now + Duration::hours(20)));
        store
            .update_sent_reminder(&["reminded".to_string()])
            .await
            .unwrap();

        let found = store
            .fetch_trial_ending_users(now, now + Duration::hours(48))
            .await
            .unwrap();
        let ids: Vec<_> = found.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["inside"]);
    }

    #[test]
    fn rejected_addresses_fail() {
        let queue = CapturingEmailQueue::new();
        queue.reject("bad@example.com");
        let notice = TrialEndingNotice {
            username: "bad".into(),
            trial_end: "March 1, 2026".into(),
            time_left: "1 day".into(),
            email: "bad@example.com".into(),
        };
        assert!(queue.queue_notify_free_trial_ending(notice).is_err());
        assert_eq!(queue.count(), 0);
    }
}
