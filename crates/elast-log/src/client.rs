// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Elasticsearch client for the two calls the pipeline makes: cluster health and
//! single-document indexing with an explicit id.

use crate::error::ElastError;
use opensearch::cluster::ClusterHealthParts;
use opensearch::http::transport::{SingleNodeConnectionPool, TransportBuilder};
use opensearch::http::{StatusCode, Url};
use opensearch::params::Refresh;
use opensearch::{IndexParts, OpenSearch};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

/// Subset of the index API response we report on.
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct IndexResponse {
    /// `created`, `updated`, ...
    pub result: String,
    #[serde(rename = "_version")]
    pub version: i64,
}

/// Outcome of a successful index request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Indexed {
    pub status: StatusCode,
    pub response: IndexResponse,
}

#[derive(Debug, Clone)]
pub struct ElastClient {
    client: OpenSearch,
    base_url: String,
}

impl ElastClient {
    /// Creates a client for a single `scheme://host:port` node.
    ///
    /// `timeout` bounds every request, connection setup included.
    pub fn new(address: &str, timeout: Duration) -> Result<Self, ElastError> {
        let url: Url = address
            .parse()
            .map_err(|_| ElastError::InvalidAddress(address.to_string()))?;
        if url.host_str().map_or(true, str::is_empty) {
            return Err(ElastError::InvalidAddress(address.to_string()));
        }

        let conn_pool = SingleNodeConnectionPool::new(url);
        let transport = TransportBuilder::new(conn_pool)
            .timeout(timeout)
            .build()
            .map_err(ElastError::ClientBuild)?;

        Ok(Self {
            client: OpenSearch::new(transport),
            base_url: address.trim_end_matches('/').to_string(),
        })
    }

    #[must_use]
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Cluster health; any non-success status counts as unhealthy.
    pub async fn health(&self) -> Result<(), ElastError> {
        let response = self
            .client
            .cluster()
            .health(ClusterHealthParts::None)
            .send()
            .await
            .map_err(ElastError::HealthCheck)?;

        let status = response.status_code();
        if !status.is_success() {
            return Err(ElastError::HealthStatus(status));
        }
        debug!("Cluster health check at {} returned {status}", self.base_url);
        Ok(())
    }

    /// Indexes `document` under an explicit id.
    ///
    /// With `refresh` the document is searchable as soon as the call returns.
    pub async fn index<T>(
        &self,
        index: &str,
        id: &str,
        document: T,
        refresh: bool,
    ) -> Result<Indexed, ElastError>
    where
        T: Serialize,
    {
        let mut request = self
            .client
            .index(IndexParts::IndexId(index, id))
            .body(document);
        if refresh {
            request = request.refresh(Refresh::True);
        }

        let response = request.send().await.map_err(ElastError::Transport)?;

        let status = response.status_code();
        if status.is_client_error() || status.is_server_error() {
            return Err(ElastError::IndexStatus {
                status,
                id: id.to_string(),
                body: response.text().await.unwrap_or_default(),
            });
        }

        let response = response
            .json::<IndexResponse>()
            .await
            .map_err(ElastError::Decode)?;
        Ok(Indexed { status, response })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::{Matcher, Server};
    use serde_json::json;

    #[test]
    fn test_new_rejects_bad_address() {
        assert!(matches!(
            ElastClient::new("not an address", Duration::from_secs(1)),
            Err(ElastError::InvalidAddress(_))
        ));
    }

    #[test]
    fn test_new_trims_trailing_slash() {
        let client = ElastClient::new("http://localhost:9200/", Duration::from_secs(1)).unwrap();
        assert_eq!(client.base_url(), "http://localhost:9200");
    }

    #[tokio::test]
    async fn test_health_ok() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("GET", "/_cluster/health")
            .with_status(200)
            .with_body(r#"{"status":"green"}"#)
            .create_async()
            .await;

        let client = ElastClient::new(&server.url(), Duration::from_secs(1)).unwrap();

        assert!(client.health().await.is_ok());
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_health_error_status() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("GET", "/_cluster/health")
            .with_status(503)
            .create_async()
            .await;

        let client = ElastClient::new(&server.url(), Duration::from_secs(1)).unwrap();

        assert!(matches!(
            client.health().await,
            Err(ElastError::HealthStatus(StatusCode::SERVICE_UNAVAILABLE))
        ));
    }

    #[tokio::test]
    async fn test_health_unreachable() {
        let client = ElastClient::new("http://127.0.0.1:1", Duration::from_secs(1)).unwrap();

        assert!(matches!(
            client.health().await,
            Err(ElastError::HealthCheck(_))
        ));
    }

    #[tokio::test]
    async fn test_index_with_refresh() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("PUT", Matcher::Regex(r"^/application/_doc/abc".to_string()))
            .match_query(Matcher::UrlEncoded("refresh".into(), "true".into()))
            .match_body(Matcher::JsonString(r#"{"Code":"E1"}"#.to_string()))
            .with_status(201)
            .with_body(r#"{"_index":"application","_id":"abc","_version":1,"result":"created"}"#)
            .create_async()
            .await;

        let client = ElastClient::new(&server.url(), Duration::from_secs(1)).unwrap();
        let indexed = client
            .index("application", "abc", json!({"Code": "E1"}), true)
            .await
            .unwrap();

        assert_eq!(indexed.status, StatusCode::CREATED);
        assert_eq!(indexed.response.result, "created");
        assert_eq!(indexed.response.version, 1);
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_index_error_status() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("PUT", Matcher::Regex(r"^/application/_doc/".to_string()))
            .with_status(400)
            .with_body("mapper_parsing_exception")
            .create_async()
            .await;

        let client = ElastClient::new(&server.url(), Duration::from_secs(1)).unwrap();
        let result = client.index("application", "abc", json!({}), true).await;

        match result {
            Err(ElastError::IndexStatus { status, id, body }) => {
                assert_eq!(status, StatusCode::BAD_REQUEST);
                assert_eq!(id, "abc");
                assert_eq!(body, "mapper_parsing_exception");
            }
            other => panic!("unexpected result {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_index_undecodable_body() {
        let mut server = Server::new_async().await;
        let _mock = server
            .mock("PUT", Matcher::Regex(r"^/application/_doc/".to_string()))
            .with_status(200)
            .with_body("not json")
            .create_async()
            .await;

        let client = ElastClient::new(&server.url(), Duration::from_secs(1)).unwrap();
        let result = client.index("application", "abc", json!({}), false).await;

        assert!(matches!(result, Err(ElastError::Decode(_))));
    }

    #[tokio::test]
    async fn test_index_transport_error() {
        let client = ElastClient::new("http://127.0.0.1:1", Duration::from_secs(1)).unwrap();
        let result = client.index("application", "abc", json!({}), true).await;

        assert!(matches!(result, Err(ElastError::Transport(_))));
    }
}
