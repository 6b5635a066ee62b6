// SPDX-FileCopyrightText: 2026 Devmatch Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! gRPC client for the recommendation service, generated from
//! `proto/recommendation.proto`.

use async_trait::async_trait;
use tonic::transport::{Channel, Endpoint};

use devmatch_core::{
    DevmatchError, RecommendationConnector, RecommendationRequest, RecommendationService,
    RpcService,
};

pub mod proto {
    tonic::include_proto!("recommendation");
}

use proto::recommendation_service_client::RecommendationServiceClient;

struct GrpcRecommendationService {
    client: RecommendationServiceClient<Channel>,
}

#[async_trait]
impl RecommendationService for GrpcRecommendationService {
    async fn call(&mut self, request: RecommendationRequest) -> Result<(), DevmatchError> {
        let method = request.method();
        let result = match request {
            RecommendationRequest::User { id } => {
                self.client
                    .user_recommendation(proto::IdRequest { id })
                    .await
            }
            RecommendationRequest::Project { id } => {
                self.client
                    .project_recommendation(proto::IdRequest { id })
                    .await
            }
        };
        result
            .map(|_| ())
            .map_err(|status| DevmatchError::Rpc {
                service: RpcService::Recommendation,
                message: format!("{method}: {}", status.message()),
                source: Some(Box::new(status)),
            })
    }
}

/// Opens plaintext gRPC connections to the recommendation service.
#[derive(Debug, Clone)]
pub struct GrpcRecommendationConnector {
    endpoint: Endpoint,
}

impl GrpcRecommendationConnector {
    pub fn new(address: &str) -> Result<Self, DevmatchError> {
        let endpoint = Endpoint::from_shared(address.to_string()).map_err(|e| {
            DevmatchError::Config(format!(
                "invalid recommendation rpc address `{address}`: {e}"
            ))
        })?;
        Ok(Self { endpoint })
    }
}

#[async_trait]
impl RecommendationConnector for GrpcRecommendationConnector {
    async fn connect(&self) -> Result<Box<dyn RecommendationService>, DevmatchError> {
        let channel = self
            .endpoint
            .connect()
            .await
            .map_err(|e| DevmatchError::Rpc {
                service: RpcService::Recommendation,
                message: format!("connect to {} failed: {e}", self.endpoint.uri()),
                source: Some(Box::new(e)),
            })?;
        Ok(Box::new(GrpcRecommendationService {
            client: RecommendationServiceClient::new(channel),
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proto::recommendation_service_server::{
        RecommendationService as RecommendationServer, RecommendationServiceServer,
    };
    use tonic::{Request, Response, Status};

    #[derive(Default, Clone)]
    struct Recorder {
        calls: std::sync::Arc<std::sync::Mutex<Vec<String>>>,
    }

    #[tonic::async_trait]
    impl RecommendationServer for Recorder {
        async fn user_recommendation(
            &self,
            request: Request<proto::IdRequest>,
        ) -> Result<Response<proto::Ack>, Status> {
            let id = request.into_inner().id;
            self.calls.lock().unwrap().push(format!("user:{id}"));
            Ok(Response::new(proto::Ack {}))
        }

        async fn project_recommendation(
            &self,
            request: Request<proto::IdRequest>,
        ) -> Result<Response<proto::Ack>, Status> {
            let id = request.into_inner().id;
            self.calls.lock().unwrap().push(format!("project:{id}"));
            Ok(Response::new(proto::Ack {}))
        }
    }

    #[tokio::test]
    async fn requests_reach_the_matching_method() {
        let recorder = Recorder::default();
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let address = format!("http://{}", listener.local_addr().unwrap());
        tokio::spawn(
            tonic::transport::Server::builder()
                .add_service(RecommendationServiceServer::new(recorder.clone()))
                .serve_with_incoming(tokio_stream::wrappers::TcpListenerStream::new(listener)),
        );

        let mut service = GrpcRecommendationConnector::new(&address)
            .unwrap()
            .connect()
            .await
            .unwrap();
        service
            .call(RecommendationRequest::User { id: "u1".into() })
            .await
            .unwrap();
        service
            .call(RecommendationRequest::Project { id: "p1".into() })
            .await
            .unwrap();

        assert_eq!(*recorder.calls.lock().unwrap(), vec!["user:u1", "project:p1"]);
    }

    #[test]
    fn address_must_be_a_uri() {
        assert!(GrpcRecommendationConnector::new("::nope::").is_err());
        assert!(GrpcRecommendationConnector::new("http://127.0.0.1:50052").is_ok());
    }

    #[tokio::test]
    async fn connect_failure_names_the_service() {
        let connector = GrpcRecommendationConnector::new("http://127.0.0.1:1").unwrap();
        let err = match connector.connect().await {
            Err(e) => e,
            Ok(_) => panic!("connecting to port 1 should fail"),
        };
        assert!(err.to_string().starts_with("recommendation rpc error"));
    }
}
