// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

use serde::ser::{Serialize, SerializeMap, Serializer};
use std::fmt;

/// A single `key: value` entry of [`Params`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Param {
    pub key: String,
    pub value: String,
}

/// Ordered list of free-form parameters attached to a [`LogMessage`].
///
/// Keys are not deduplicated; every pair added shows up in the indexed document.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Params(Vec<Param>);

impl Params {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a pair and hands the list back, so calls can be chained.
    #[must_use]
    pub fn add(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.0.push(Param {
            key: key.into(),
            value: value.into(),
        });
        self
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Param> {
        self.0.iter()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for Params {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        iter.into_iter()
            .fold(Params::new(), |params, (k, v)| params.add(k, v))
    }
}

/// Serialized as a JSON object, one entry per pair in insertion order.
impl Serialize for Params {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for param in &self.0 {
            map.serialize_entry(&param.key, &param.value)?;
        }
        map.end()
    }
}

/// Human readable summary used in the local log output: `key: value, ` per pair.
impl fmt::Display for Params {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for param in &self.0 {
            write!(f, "{}: {}, ", param.key, param.value)?;
        }
        Ok(())
    }
}

/// A structured application event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LogMessage {
    /// Category or error code, e.g. `E1`.
    pub code: String,
    pub message: String,
    pub parameter: String,
    /// Originating product, usually [`crate::KAIROS`] or [`crate::KAIROS_SERVICE`].
    pub product: String,
    /// Subsystem that raised the event.
    pub component: String,
    pub data: Params,
}

impl fmt::Display for LogMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {}/{}: {}",
            self.code, self.product, self.component, self.message
        )?;
        if !self.parameter.is_empty() {
            write!(f, " ({})", self.parameter)?;
        }
        if !self.data.is_empty() {
            write!(f, " {{{}}}", self.data.to_string().trim_end_matches(", "))?;
        }
        Ok(())
    }
}
