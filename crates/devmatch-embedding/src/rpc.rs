// SPDX-FileCopyrightText: 2026 Devmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! gRPC client for the embedding service.
//!
//! The client stubs are generated from `proto/embedding.proto` at build time.
//! The service is assumed to be co-located, so connections use plaintext
//! HTTP/2.

use async_trait::async_trait;
use tonic::transport::{Channel, Endpoint};

use devmatch_core::{
    DevmatchError, EmbeddingConnector, EmbeddingRequest, EmbeddingService, RpcService,
};

/// Messages and client stubs generated from `proto/embedding.proto`.
pub mod proto {
    tonic::include_proto!("embedding");
}

use proto::embedding_service_client::EmbeddingServiceClient;

/// Sends one request to the method it names.
async fn send(
    client: &mut EmbeddingServiceClient<Channel>,
    request: EmbeddingRequest,
) -> Result<(), tonic::Status> {
    match request {
        EmbeddingRequest::CreateUser {
            user_id,
            bio,
            skills,
            interests,
        } => {
            let message = proto::UserEmbeddingRequest {
                user_id,
                bio,
                skills,
                interests,
            };
            client.create_user_embedding(message).await?;
        }
        EmbeddingRequest::UpdateUser {
            user_id,
            bio,
            skills,
            interests,
        } => {
            let message = proto::UserEmbeddingRequest {
                user_id,
                bio,
                skills,
                interests,
            };
            client.update_user_embedding(message).await?;
        }
        EmbeddingRequest::UpdateUserStatus { id, status } => {
            client
                .update_user_status(proto::StatusRequest { id, status })
                .await?;
        }
        EmbeddingRequest::DeleteUser { id } => {
            client.delete_user_embedding(proto::IdRequest { id }).await?;
        }
        EmbeddingRequest::CreateProject {
            project_id,
            title,
            description,
            skills,
            user_id,
        } => {
            let message = proto::CreateProjectEmbeddingRequest {
                project_id,
                title,
                description,
                skills,
                user_id,
            };
            client.create_project_embedding(message).await?;
        }
        EmbeddingRequest::UpdateProject {
            project_id,
            title,
            description,
            skills,
        } => {
            let message = proto::UpdateProjectEmbeddingRequest {
                project_id,
                title,
                description,
                skills,
            };
            client.update_project_embedding(message).await?;
        }
        EmbeddingRequest::UpdateProjectStatus { id, status } => {
            client
                .update_project_status(proto::StatusRequest { id, status })
                .await?;
        }
        EmbeddingRequest::DeleteProject { id } => {
            client
                .delete_project_embedding(proto::IdRequest { id })
                .await?;
        }
    }
    Ok(())
}

struct GrpcEmbeddingService {
    client: EmbeddingServiceClient<Channel>,
}

#[async_trait]
impl EmbeddingService for GrpcEmbeddingService {
    async fn call(&mut self, request: EmbeddingRequest) -> Result<(), DevmatchError> {
        let method = request.method();
        send(&mut self.client, request)
            .await
            .map_err(|status| DevmatchError::Rpc {
                service: RpcService::Embedding,
                message: format!("{method}: {}", status.message()),
                source: Some(Box::new(status)),
            })
    }
}

/// Opens plaintext gRPC connections to the embedding service.
#[derive(Debug, Clone)]
pub struct GrpcEmbeddingConnector {
    endpoint: Endpoint,
}

impl GrpcEmbeddingConnector {
    /// Validates `address` (e.g. `http://127.0.0.1:50051`) without connecting.
    pub fn new(address: &str) -> Result<Self, DevmatchError> {
        let endpoint = Endpoint::from_shared(address.to_string()).map_err(|e| {
            DevmatchError::Config(format!("invalid embedding rpc address `{address}`: {e}"))
        })?;
        Ok(Self { endpoint })
    }
}

#[async_trait]
impl EmbeddingConnector for GrpcEmbeddingConnector {
    async fn connect(&self) -> Result<Box<dyn EmbeddingService>, DevmatchError> {
        let channel = self
            .endpoint
            .connect()
            .await
            .map_err(|e| DevmatchError::Rpc {
                service: RpcService::Embedding,
                message: format!("connect to {} failed: {e}", self.endpoint.uri()),
                source: Some(Box::new(e)),
            })?;
        Ok(Box::new(GrpcEmbeddingService {
            client: EmbeddingServiceClient::new(channel),
        }))
    }
}
