// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Turns a [`LogMessage`] into the JSON document indexed by the backend.
//!
//! # Document layout
//!
//! ```text
//! {
//!   "@timestamp": "2024-03-05T14:07:09.123456+0100",
//!   "Time":       "2024-03-05T14:07:09.123456+0100",
//!   "Code":       "E1",
//!   "UserID":     "0",
//!   "Message":    "failed",
//!   "Parameter":  "",
//!   "Product":    "Kairos Drive",
//!   "Component":  "auth",
//!   "RemoteIP":   "10.1.2.3",
//!   "ClientIP":   "",
//!   "Data":       { "attempt": "3" }
//! }
//! ```
//!
//! All values go through `serde_json`, so quotes and control characters in messages
//! are escaped instead of corrupting the document.

use crate::context::{client_ip_of, user_id_of, RequestContext};
use crate::error::ElastError;
use crate::message::{LogMessage, Params};
use chrono::{DateTime, FixedOffset, Local};
use serde::Serialize;
use std::net::IpAddr;
use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::{Arc, OnceLock};
use tracing::debug;

/// `YYYY-MM-DDTHH:MM:SS.ffffff±HHMM`
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6f%z";

/// Radix of document ids.
pub const DOCUMENT_ID_RADIX: u32 = 20;

/// Source of the current time, injectable for tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> DateTime<FixedOffset>;
}

/// Wall clock in the local timezone.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<FixedOffset> {
        Local::now().fixed_offset()
    }
}

/// Formats a time the way the backend mapping expects it.
#[must_use]
pub fn format_timestamp(time: &DateTime<FixedOffset>) -> String {
    time.format(TIMESTAMP_FORMAT).to_string()
}

/// First non-loopback IPv4 address of this host, or an empty string.
#[must_use]
pub fn local_ip() -> String {
    let interfaces = match if_addrs::get_if_addrs() {
        Ok(interfaces) => interfaces,
        Err(e) => {
            debug!("Unable to enumerate network interfaces: {e}");
            return String::new();
        }
    };
    interfaces
        .iter()
        .filter(|iface| !iface.is_loopback())
        .find_map(|iface| match iface.ip() {
            IpAddr::V4(ip) => Some(ip.to_string()),
            IpAddr::V6(_) => None,
        })
        .unwrap_or_default()
}

/// Renders a non-negative integer in the given radix with `0-9a-z` digits.
#[must_use]
pub fn format_radix(mut value: u64, radix: u32) -> String {
    const DIGITS: &[u8; 36] = b"0123456789abcdefghijklmnopqrstuvwxyz";
    debug_assert!((2..=36).contains(&radix));
    if value == 0 {
        return "0".to_string();
    }
    let radix = u64::from(radix);
    let mut out = Vec::new();
    while value > 0 {
        let digit = usize::try_from(value % radix).unwrap_or_default();
        out.push(DIGITS[digit]);
        value /= radix;
    }
    out.reverse();
    out.into_iter().map(char::from).collect()
}

static LAST_DOCUMENT_NANOS: AtomicI64 = AtomicI64::new(0);

/// Base-20 document id derived from the nanosecond timestamp of `time`.
///
/// Ids are strictly increasing within the process: two calls landing on the same
/// nanosecond (or a clock stepping backwards) still get distinct ids.
#[must_use]
pub fn document_id(time: &DateTime<FixedOffset>) -> String {
    let nanos = time.timestamp_nanos_opt().unwrap_or_default().max(0);
    let mut last = LAST_DOCUMENT_NANOS.load(Ordering::Relaxed);
    let assigned = loop {
        let candidate = nanos.max(last.saturating_add(1));
        match LAST_DOCUMENT_NANOS.compare_exchange_weak(
            last,
            candidate,
            Ordering::Relaxed,
            Ordering::Relaxed,
        ) {
            Ok(_) => break candidate,
            Err(current) => last = current,
        }
    };
    format_radix(assigned.unsigned_abs(), DOCUMENT_ID_RADIX)
}

/// The indexed JSON document. Field order is the serialization order.
#[derive(Debug, Clone, Serialize)]
pub struct Document<'a> {
    #[serde(rename = "@timestamp")]
    pub timestamp: String,
    #[serde(rename = "Time")]
    pub time: String,
    #[serde(rename = "Code")]
    pub code: &'a str,
    #[serde(rename = "UserID")]
    pub user_id: &'a str,
    #[serde(rename = "Message")]
    pub message: &'a str,
    #[serde(rename = "Parameter")]
    pub parameter: &'a str,
    #[serde(rename = "Product")]
    pub product: &'a str,
    #[serde(rename = "Component")]
    pub component: &'a str,
    #[serde(rename = "RemoteIP")]
    pub remote_ip: String,
    #[serde(rename = "ClientIP")]
    pub client_ip: &'a str,
    #[serde(rename = "Data")]
    pub data: &'a Params,
    #[serde(skip)]
    pub recorded_at: DateTime<FixedOffset>,
}

impl Document<'_> {
    pub fn to_json(&self) -> Result<String, ElastError> {
        Ok(serde_json::to_string(self)?)
    }
}

/// Builds [`Document`]s using an injectable clock.
///
/// The host address is looked up once per formatter, on the first document.
#[derive(Clone)]
pub struct DocumentFormatter {
    clock: Arc<dyn Clock>,
    remote_ip: Arc<OnceLock<String>>,
}

impl Default for DocumentFormatter {
    fn default() -> Self {
        Self::new(Arc::new(SystemClock))
    }
}

impl std::fmt::Debug for DocumentFormatter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "DocumentFormatter")
    }
}

impl DocumentFormatter {
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            clock,
            remote_ip: Arc::new(OnceLock::new()),
        }
    }

    /// Uses `ip` as `RemoteIP` instead of looking up the host interfaces.
    #[must_use]
    pub fn with_remote_ip(mut self, ip: impl Into<String>) -> Self {
        self.remote_ip = Arc::new(OnceLock::from(ip.into()));
        self
    }

    fn remote_ip(&self) -> String {
        self.remote_ip.get_or_init(local_ip).clone()
    }

    #[must_use]
    pub fn document<'a>(
        &self,
        message: &'a LogMessage,
        request: Option<&'a RequestContext>,
    ) -> Document<'a> {
        let recorded_at = self.clock.now();
        let timestamp = format_timestamp(&recorded_at);
        Document {
            time: timestamp.clone(),
            timestamp,
            code: &message.code,
            user_id: user_id_of(request),
            message: &message.message,
            parameter: &message.parameter,
            product: &message.product,
            component: &message.component,
            remote_ip: self.remote_ip(),
            client_ip: client_ip_of(request),
            data: &message.data,
            recorded_at,
        }
    }

    /// Formats `message` straight to its JSON body.
    pub fn format(
        &self,
        message: &LogMessage,
        request: Option<&RequestContext>,
    ) -> Result<String, ElastError> {
        self.document(message, request).to_json()
    }
}
