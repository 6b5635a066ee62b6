// SPDX-FileCopyrightText: 2026 Devmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Embedding service traits.
//!
//! The embedding service keeps vector representations of user profiles and
//! projects in sync with the relational database. Every call is an idempotent
//! upsert or delete on the remote side, so at-least-once delivery is safe.

use async_trait::async_trait;

use crate::error::DevmatchError;

/// One call against the embedding service, carrying exactly the fields that
/// the remote method accepts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EmbeddingRequest {
    CreateUser {
        user_id: String,
        bio: String,
        skills: Vec<String>,
        interests: Vec<String>,
    },
    UpdateUser {
        user_id: String,
        bio: String,
        skills: Vec<String>,
        interests: Vec<String>,
    },
    UpdateUserStatus {
        id: String,
        status: bool,
    },
    DeleteUser {
        id: String,
    },
    CreateProject {
        project_id: String,
        title: String,
        description: String,
        skills: Vec<String>,
        user_id: String,
    },
    UpdateProject {
        project_id: String,
        title: String,
        description: String,
        skills: Vec<String>,
    },
    UpdateProjectStatus {
        id: String,
        status: bool,
    },
    DeleteProject {
        id: String,
    },
}

impl EmbeddingRequest {
    /// Name of the remote method this request maps to.
    pub fn method(&self) -> &'static str {
        match self {
            Self::CreateUser { .. } => "CreateUserEmbedding",
            Self::UpdateUser { .. } => "UpdateUserEmbedding",
            Self::UpdateUserStatus { .. } => "UpdateUserStatus",
            Self::DeleteUser { .. } => "DeleteUserEmbedding",
            Self::CreateProject { .. } => "CreateProjectEmbedding",
            Self::UpdateProject { .. } => "UpdateProjectEmbedding",
            Self::UpdateProjectStatus { .. } => "UpdateProjectStatus",
            Self::DeleteProject { .. } => "DeleteProjectEmbedding",
        }
    }
}

/// A live connection to the embedding service.
///
/// Each hub worker owns one of these exclusively; implementations do not
/// need to be shareable.
#[async_trait]
pub trait EmbeddingService: Send {
    /// Issues one call and waits for the acknowledgement.
    async fn call(&mut self, request: EmbeddingRequest) -> Result<(), DevmatchError>;
}

/// Opens connections to the embedding service.
#[async_trait]
pub trait EmbeddingConnector: Send + Sync + 'static {
    /// Establishes a new dedicated connection.
    async fn connect(&self) -> Result<Box<dyn EmbeddingService>, DevmatchError>;
}
