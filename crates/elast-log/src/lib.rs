// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! # elast-log
//!
//! Best-effort shipping of application log events to Elasticsearch.
//!
//! Every call turns a [`LogMessage`] plus an optional [`RequestContext`] into a
//! timestamped JSON document and indexes it into the `application` index. When the
//! backend is unconfigured, disabled or unreachable the event only reaches the local
//! `tracing` output. Nothing in the caller-facing API returns an error: logging must
//! never fail a business request.
//!
//! ## Modules
//!
//! - [`config`]: environment driven configuration (`elast_*` variables)
//! - [`client`]: `opensearch` client for the health and index endpoints
//! - [`message`]: the log message value objects
//! - [`context`]: typed request context (user id, forwarded client IP)
//! - [`document`]: JSON document construction and timestamp formatting
//! - [`pipeline`]: the delivery pipeline and convenience wrappers
//! - [`logger`]: local `tracing` output used as the fallback sink

#![cfg_attr(not(test), deny(clippy::panic))]
#![cfg_attr(not(test), deny(clippy::unwrap_used))]
#![cfg_attr(not(test), deny(clippy::expect_used))]
#![cfg_attr(not(test), deny(clippy::todo))]
#![cfg_attr(not(test), deny(clippy::unimplemented))]

pub mod client;
pub mod config;
pub mod context;
pub mod document;
pub mod error;
pub mod logger;
pub mod message;
pub mod pipeline;

pub use config::{configure, ElastConfig};
pub use context::RequestContext;
pub use error::ElastError;
pub use message::{LogMessage, Param, Params};
pub use pipeline::{log, log_easy, log_sys, ElastLogger};

/// Product name for events raised by the application itself.
pub const KAIROS: &str = "Kairos Drive";

/// Product name for events raised by the underlying platform service.
pub const KAIROS_SERVICE: &str = "Kairos Drive OS Service";

/// Index every document is written to.
pub const INDEX: &str = "application";
