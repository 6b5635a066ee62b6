// SPDX-FileCopyrightText: 2026 Devmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the hubs and their collaborators.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};

/// Health status reported by hubs and adapters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    /// Fully operational.
    Healthy,
    /// Operational but experiencing issues.
    Degraded(String),
    /// Not operational.
    Unhealthy(String),
}

/// Identifies which external RPC service an error came from.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize,
)]
#[strum(serialize_all = "lowercase")]
pub enum RpcService {
    Embedding,
    Recommendation,
}

/// The user facet of an embedding job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserFacet {
    pub id: String,
    pub bio: String,
    /// Whether the profile is active and should appear in search.
    pub status: bool,
    pub skills: Vec<String>,
    pub interests: Vec<String>,
}

/// The project facet of an embedding job.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectFacet {
    pub id: String,
    pub title: String,
    pub description: String,
    /// Whether the project is open and should appear in search.
    pub status: bool,
    pub skills: Vec<String>,
    pub owner_user_id: String,
}

/// A user whose free trial is about to end.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialUser {
    pub id: String,
    pub username: String,
    pub email: String,
    pub free_trial: DateTime<Utc>,
}

/// Payload handed to the email queue for a trial-ending reminder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrialEndingNotice {
    pub username: String,
    /// Human-readable trial end date, e.g. `March 4, 2026`.
    pub trial_end: String,
    /// Human-readable time remaining, e.g. `1 day and 12 hours`.
    pub time_left: String,
    pub email: String,
}
