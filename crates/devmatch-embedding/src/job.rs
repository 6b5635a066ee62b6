// SPDX-FileCopyrightText: 2026 Devmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding jobs.

use devmatch_core::{EmbeddingRequest, ProjectFacet, UserFacet};
use strum::Display;

/// Attempt bound for create, update and delete jobs.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

/// Attempt bound for status-only jobs.
pub const STATUS_MAX_ATTEMPTS: u32 = 2;

/// Discriminator of an embedding job.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum EmbeddingKind {
    UserCreate,
    UserUpdate,
    UserStatus,
    UserDelete,
    ProjectCreate,
    ProjectUpdate,
    ProjectStatus,
    ProjectDelete,
}

/// A user or project mutation together with the facet its kind requires.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmbeddingEvent {
    UserCreate(UserFacet),
    UserUpdate(UserFacet),
    UserStatus { id: String, status: bool },
    UserDelete { id: String },
    ProjectCreate(ProjectFacet),
    ProjectUpdate(ProjectFacet),
    ProjectStatus { id: String, status: bool },
    ProjectDelete { id: String },
}

impl EmbeddingEvent {
    pub fn kind(&self) -> EmbeddingKind {
        match self {
            Self::UserCreate(_) => EmbeddingKind::UserCreate,
            Self::UserUpdate(_) => EmbeddingKind::UserUpdate,
            Self::UserStatus { .. } => EmbeddingKind::UserStatus,
            Self::UserDelete { .. } => EmbeddingKind::UserDelete,
            Self::ProjectCreate(_) => EmbeddingKind::ProjectCreate,
            Self::ProjectUpdate(_) => EmbeddingKind::ProjectUpdate,
            Self::ProjectStatus { .. } => EmbeddingKind::ProjectStatus,
            Self::ProjectDelete { .. } => EmbeddingKind::ProjectDelete,
        }
    }

    /// Id of the user or project the event concerns.
    pub fn subject_id(&self) -> &str {
        match self {
            Self::UserCreate(user) | Self::UserUpdate(user) => &user.id,
            Self::ProjectCreate(project) | Self::ProjectUpdate(project) => &project.id,
            Self::UserStatus { id, .. }
            | Self::UserDelete { id }
            | Self::ProjectStatus { id, .. }
            | Self::ProjectDelete { id } => id,
        }
    }

    /// Attempt bound assigned at enqueue time.
    pub fn default_max_attempts(&self) -> u32 {
        match self {
            Self::UserStatus { .. } | Self::ProjectStatus { .. } => STATUS_MAX_ATTEMPTS,
            _ => DEFAULT_MAX_ATTEMPTS,
        }
    }
}

/// A unit of work for the embedding workers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EmbeddingJob {
    pub event: EmbeddingEvent,
    /// Failed calls so far. Never decreases.
    pub attempts: u32,
    pub max_attempts: u32,
}

impl EmbeddingJob {
    /// A fresh job with the default attempt bound for its kind.
    pub fn new(event: EmbeddingEvent) -> Self {
        let max_attempts = event.default_max_attempts();
        Self {
            event,
            attempts: 0,
            max_attempts,
        }
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts;
        self
    }

    pub fn kind(&self) -> EmbeddingKind {
        self.event.kind()
    }

    /// The RPC this job dispatches to, with only the fields that method takes.
    pub fn request(&self) -> EmbeddingRequest {
        match &self.event {
            EmbeddingEvent::UserCreate(user) => EmbeddingRequest::CreateUser {
                user_id: user.id.clone(),
                bio: user.bio.clone(),
                skills: user.skills.clone(),
                interests: user.interests.clone(),
            },
            EmbeddingEvent::UserUpdate(user) => EmbeddingRequest::UpdateUser {
                user_id: user.id.clone(),
                bio: user.bio.clone(),
                skills: user.skills.clone(),
                interests: user.interests.clone(),
            },
            EmbeddingEvent::UserStatus { id, status } => EmbeddingRequest::UpdateUserStatus {
                id: id.clone(),
                status: *status,
            },
            EmbeddingEvent::UserDelete { id } => EmbeddingRequest::DeleteUser { id: id.clone() },
            EmbeddingEvent::ProjectCreate(project) => EmbeddingRequest::CreateProject {
                project_id: project.id.clone(),
                title: project.title.clone(),
                description: project.description.clone(),
                skills: project.skills.clone(),
                user_id: project.owner_user_id.clone(),
            },
            EmbeddingEvent::ProjectUpdate(project) => EmbeddingRequest::UpdateProject {
                project_id: project.id.clone(),
                title: project.title.clone(),
                description: project.description.clone(),
                skills: project.skills.clone(),
            },
            EmbeddingEvent::ProjectStatus { id, status } => {
                EmbeddingRequest::UpdateProjectStatus {
                    id: id.clone(),
                    status: *status,
                }
            }
            EmbeddingEvent::ProjectDelete { id } => {
                EmbeddingRequest::DeleteProject { id: id.clone() }
            }
        }
    }
}
