// SPDX-FileCopyrightText: 2026 Devmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Recommendation service traits.

use async_trait::async_trait;

use crate::error::DevmatchError;

/// A recompute request for the recommendation service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RecommendationRequest {
    /// Recompute recommendations for a user.
    User { id: String },
    /// Recompute recommendations for a project.
    Project { id: String },
}

impl RecommendationRequest {
    /// Name of the remote method this request maps to.
    pub fn method(&self) -> &'static str {
        match self {
            Self::User { .. } => "UserRecommendation",
            Self::Project { .. } => "ProjectRecommendation",
        }
    }
}

/// A live, worker-owned connection to the recommendation service.
#[async_trait]
pub trait RecommendationService: Send {
    async fn call(&mut self, request: RecommendationRequest) -> Result<(), DevmatchError>;
}

/// Opens connections to the recommendation service.
#[async_trait]
pub trait RecommendationConnector: Send + Sync + 'static {
    async fn connect(&self) -> Result<Box<dyn RecommendationService>, DevmatchError>;
}
