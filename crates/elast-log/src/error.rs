// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use opensearch::http::transport::BuildError;
use opensearch::http::StatusCode;

/// Errors raised while talking to the Elasticsearch backend.
///
/// None of these reach the callers of [`crate::log`]: the pipeline logs them locally and
/// carries on.
#[derive(Debug, thiserror::Error)]
pub enum ElastError {
    #[error("Invalid backend address: {0}")]
    InvalidAddress(String),

    #[error("Failed to build Elasticsearch transport: {0}")]
    ClientBuild(#[source] BuildError),

    #[error("Cluster health check failed: {0}")]
    HealthCheck(#[source] opensearch::Error),

    #[error("Cluster health check returned {0}")]
    HealthStatus(StatusCode),

    #[error("Error getting response from backend: {0}")]
    Transport(#[source] opensearch::Error),

    #[error("[{status}] Error indexing document ID={id}: {body}")]
    IndexStatus {
        status: StatusCode,
        id: String,
        body: String,
    },

    #[error("Error parsing the response body: {0}")]
    Decode(#[source] opensearch::Error),

    #[error("Failed to serialize document: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("Failed to initialize local logging: {0}")]
    LoggerInit(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let error = ElastError::InvalidAddress("http://:9200".to_string());
        assert_eq!(error.to_string(), "Invalid backend address: http://:9200");
    }

    #[test]
    fn test_index_status_display() {
        let error = ElastError::IndexStatus {
            status: StatusCode::BAD_REQUEST,
            id: "1a2b".to_string(),
            body: "mapper_parsing_exception".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "[400 Bad Request] Error indexing document ID=1a2b: mapper_parsing_exception"
        );
    }

    #[test]
    fn test_health_status_display() {
        let error = ElastError::HealthStatus(StatusCode::SERVICE_UNAVAILABLE);
        assert!(error.to_string().contains("503"));
    }
}
