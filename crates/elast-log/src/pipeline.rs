// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Best-effort delivery of log documents.
//!
//! ```text
//!   log / log_easy / log_sys
//!            │
//!            v
//!   ┌─────────────────┐   disabled / unreachable
//!   │ resolve client  │ ───────────────────────────> local debug line
//!   └────────┬────────┘
//!            v
//!   ┌─────────────────┐
//!   │ format document │
//!   └────────┬────────┘
//!            v
//!   ┌─────────────────┐   any failure
//!   │ PUT _doc/{id}   │ ───────────────────────────> local error line
//!   └────────┬────────┘
//!            v
//!      local info line
//! ```
//!
//! Nothing here returns an error or spawns a task: each call runs to completion in the
//! caller's task and swallows backend failures after logging them.

use crate::client::ElastClient;
use crate::config::ElastConfig;
use crate::context::RequestContext;
use crate::document::{document_id, Clock, DocumentFormatter};
use crate::message::{LogMessage, Params};
use crate::{INDEX, KAIROS, KAIROS_SERVICE};
use std::sync::Arc;
use tokio::sync::OnceCell;
use tracing::{debug, error, info};

/// Ships log documents to the backend described by an [`ElastConfig`].
///
/// The backend client is resolved lazily on first use (including the health check)
/// and reused for the lifetime of the logger. A disabled or unconfigured backend is
/// remembered as such; a failed health check is not, so the next call checks again.
pub struct ElastLogger {
    config: ElastConfig,
    formatter: DocumentFormatter,
    client: OnceCell<Option<ElastClient>>,
}

impl ElastLogger {
    #[must_use]
    pub fn new(config: ElastConfig) -> Self {
        ElastLogger {
            config,
            formatter: DocumentFormatter::default(),
            client: OnceCell::new(),
        }
    }

    #[must_use]
    pub fn from_env() -> Self {
        Self::new(ElastConfig::from_env())
    }

    /// Replaces the clock used for timestamps and document ids.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.formatter = DocumentFormatter::new(clock);
        self
    }

    #[must_use]
    pub fn config(&self) -> &ElastConfig {
        &self.config
    }

    async fn get_client(&self) -> Option<&ElastClient> {
        match self.client.get_or_try_init(|| self.config.connect()).await {
            Ok(client) => client.as_ref(),
            Err(e) => {
                error!("Elasticsearch unavailable, logging locally only: {e}");
                None
            }
        }
    }

    /// Formats `message` and indexes it. Never fails; problems are logged locally.
    pub async fn log(&self, request: Option<&RequestContext>, message: &LogMessage) {
        let Some(client) = self.get_client().await else {
            debug!("{message}");
            return;
        };

        let document = self.formatter.document(message, request);
        let id = document_id(&document.recorded_at);

        match client.index(INDEX, &id, &document, true).await {
            Ok(indexed) => info!(
                index = INDEX,
                id = %id,
                "[{}] {}; version={} with timestamp: {}",
                indexed.status,
                indexed.response.result,
                indexed.response.version,
                document.timestamp
            ),
            Err(e) => error!(index = INDEX, id = %id, "{e}"),
        }
    }

    /// Logs an application event, product [`KAIROS`].
    pub async fn log_easy(
        &self,
        request: Option<&RequestContext>,
        code: &str,
        message: &str,
        params: Params,
        component: &str,
    ) {
        let message = build_message(code, message, params, KAIROS, component);
        self.log(request, &message).await;
    }

    /// Logs a platform service event, product [`KAIROS_SERVICE`].
    pub async fn log_sys(
        &self,
        request: Option<&RequestContext>,
        code: &str,
        message: &str,
        params: Params,
        component: &str,
    ) {
        let message = build_message(code, message, params, KAIROS_SERVICE, component);
        self.log(request, &message).await;
    }
}

impl std::fmt::Debug for ElastLogger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ElastLogger")
            .field("config", &self.config)
            .field("resolved", &self.client.initialized())
            .finish()
    }
}

fn build_message(
    code: &str,
    message: &str,
    params: Params,
    product: &str,
    component: &str,
) -> LogMessage {
    LogMessage {
        code: code.to_string(),
        message: message.to_string(),
        parameter: String::new(),
        product: product.to_string(),
        component: component.to_string(),
        data: params,
    }
}

/// Logs `message`, resolving the environment and probing the backend for this call only.
pub async fn log(request: Option<&RequestContext>, message: LogMessage) {
    ElastLogger::from_env().log(request, &message).await;
}

/// [`log`] with product [`KAIROS`].
pub async fn log_easy(
    request: Option<&RequestContext>,
    code: &str,
    message: &str,
    params: Params,
    component: &str,
) {
    ElastLogger::from_env()
        .log_easy(request, code, message, params, component)
        .await;
}

/// [`log`] with product [`KAIROS_SERVICE`].
pub async fn log_sys(
    request: Option<&RequestContext>,
    code: &str,
    message: &str,
    params: Params,
    component: &str,
) {
    ElastLogger::from_env()
        .log_sys(request, code, message, params, component)
        .await;
}
