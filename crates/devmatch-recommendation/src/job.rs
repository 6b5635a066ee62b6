// SPDX-FileCopyrightText: 2026 Devmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

use devmatch_core::RecommendationRequest;
use strum::Display;

/// Attempt bound for recommendation jobs.
pub const DEFAULT_MAX_ATTEMPTS: u32 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display)]
pub enum RecommendationKind {
    UserRec,
    ProjectRec,
}

/// A recompute request waiting for a worker.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecommendationJob {
    pub kind: RecommendationKind,
    pub id: String,
    /// Failed calls so far. Never decreases.
    pub attempts: u32,
    pub max_attempts: u32,
}

impl RecommendationJob {
    pub fn new(kind: RecommendationKind, id: impl Into<String>, max_attempts: u32) -> Self {
        Self {
            kind,
            id: id.into(),
            attempts: 0,
            max_attempts,
        }
    }

    pub fn request(&self) -> RecommendationRequest {
        let id = self.id.clone();
        match self.kind {
            RecommendationKind::UserRec => RecommendationRequest::User { id },
            RecommendationKind::ProjectRec => RecommendationRequest::Project { id },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_map_to_their_methods() {
        let user = RecommendationJob::new(RecommendationKind::UserRec, "u1", 3);
        assert_eq!(user.request().method(), "UserRecommendation");
        assert_eq!(user.attempts, 0);

        let project = RecommendationJob::new(RecommendationKind::ProjectRec, "p1", 3);
        assert_eq!(
            project.request(),
            RecommendationRequest::Project { id: "p1".into() }
        );
    }

    #[test]
    fn kind_display_names() {
        assert_eq!(RecommendationKind::UserRec.to_string(), "UserRec");
        assert_eq!(RecommendationKind::ProjectRec.to_string(), "ProjectRec");
    }
}
