// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use opensearch::http::headers::HeaderMap;

/// Header carrying the originating client address behind a proxy.
pub const FORWARDED_FOR_HEADER: &str = "X-Forwarded-For";

/// User id recorded when the request carries no identity.
pub const ANONYMOUS_USER_ID: &str = "0";

/// Identity of the inbound request that triggered a log call.
///
/// Callers build it from whatever their HTTP framework exposes. A missing context and a
/// context without identity are recorded the same way: `UserID` `"0"` and an empty
/// `ClientIP`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequestContext {
    user_id: Option<String>,
    client_ip: Option<String>,
}

impl RequestContext {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reads the client IP from the `X-Forwarded-For` header, verbatim.
    #[must_use]
    pub fn from_headers(headers: &HeaderMap) -> Self {
        let client_ip = headers
            .get(FORWARDED_FOR_HEADER)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        Self {
            user_id: None,
            client_ip,
        }
    }

    #[must_use]
    pub fn with_user_id(mut self, user_id: impl ToString) -> Self {
        self.user_id = Some(user_id.to_string());
        self
    }

    #[must_use]
    pub fn with_client_ip(mut self, client_ip: impl Into<String>) -> Self {
        self.client_ip = Some(client_ip.into());
        self
    }

    /// The user id, or [`ANONYMOUS_USER_ID`] when absent or blank.
    #[must_use]
    pub fn user_id(&self) -> &str {
        match self.user_id.as_deref() {
            Some(id) if !id.trim().is_empty() => id,
            _ => ANONYMOUS_USER_ID,
        }
    }

    #[must_use]
    pub fn client_ip(&self) -> &str {
        self.client_ip.as_deref().unwrap_or_default()
    }
}

/// User id for an optional context.
#[must_use]
pub fn user_id_of(request: Option<&RequestContext>) -> &str {
    request.map_or(ANONYMOUS_USER_ID, RequestContext::user_id)
}

/// Client IP for an optional context.
#[must_use]
pub fn client_ip_of(request: Option<&RequestContext>) -> &str {
    request.map_or("", RequestContext::client_ip)
}
