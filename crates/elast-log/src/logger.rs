// Copyright 2025-Present Datadog, Inc. https://www.datadoghq.com/
// SPDX-License-Identifier: Apache-2.0

//! Local log output, the fallback sink when documents cannot be shipped.
//!
//! Lines look like:
//!
//! ```text
//! ELAST | WARN | elast_host environment variable required but not set. Elasticsearch feature will be disabled
//! ELAST | INFO | application/2j8d1c4e0a7b3 | [201 Created] created; version=1 with timestamp: 2024-03-05T14:07:09.123456+0100
//! ```
//!
//! Events carrying `index` and `id` fields name the document they are about right after
//! the level. Applications that already install a `tracing` subscriber get these events
//! through it; [`init`] is for those that don't.

use crate::error::ElastError;
use std::fmt::{self, Write as _};
use tracing_core::field::{Field, Visit};
use tracing_core::{Event, Subscriber};
use tracing_subscriber::fmt::{
    format::{self, FormatEvent, FormatFields},
    FmtContext,
};
use tracing_subscriber::registry::LookupSpan;
use tracing_subscriber::EnvFilter;

/// Event formatter: `ELAST | LEVEL | [index/id | ]spans: message fields`.
#[derive(Debug, Clone, Copy)]
pub struct Formatter;

/// Splits the document coordinates out of an event's fields.
#[derive(Default)]
struct DocumentFields {
    index: Option<String>,
    id: Option<String>,
    message: String,
    rest: String,
}

impl DocumentFields {
    fn target(&self) -> Option<String> {
        match (&self.index, &self.id) {
            (Some(index), Some(id)) => Some(format!("{index}/{id}")),
            (Some(index), None) => Some(index.clone()),
            (None, Some(id)) => Some(id.clone()),
            (None, None) => None,
        }
    }
}

impl Visit for DocumentFields {
    fn record_str(&mut self, field: &Field, value: &str) {
        match field.name() {
            "index" => self.index = Some(value.to_string()),
            "id" => self.id = Some(value.to_string()),
            _ => self.record_debug(field, &value),
        }
    }

    fn record_debug(&mut self, field: &Field, value: &dyn fmt::Debug) {
        match field.name() {
            "message" => self.message = format!("{value:?}"),
            "index" => self.index = Some(format!("{value:?}")),
            "id" => self.id = Some(format!("{value:?}")),
            name => {
                let _ = write!(self.rest, " {name}={value:?}");
            }
        }
    }
}

impl<S, N> FormatEvent<S, N> for Formatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: format::Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let mut fields = DocumentFields::default();
        event.record(&mut fields);

        write!(writer, "ELAST | {} | ", event.metadata().level())?;
        if let Some(target) = fields.target() {
            write!(writer, "{target} | ")?;
        }

        if let Some(scope) = ctx.event_scope() {
            for span in scope.from_root() {
                write!(writer, "{}: ", span.name())?;
            }
        }

        writeln!(writer, "{}{}", fields.message, fields.rest)
    }
}

/// Installs a global subscriber writing [`Formatter`] lines to stdout.
///
/// `level` is an `EnvFilter` directive such as `info` or `elast_log=debug`. HTTP stack
/// internals are silenced.
pub fn init(level: &str) -> Result<(), ElastError> {
    let env_filter = format!("h2=off,hyper=off,rustls=off,{}", level.to_lowercase());
    let filter = EnvFilter::try_new(env_filter).map_err(|e| ElastError::LoggerInit(e.to_string()))?;

    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_env_filter(filter)
        .with_ansi(false)
        .event_format(Formatter)
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .map_err(|e| ElastError::LoggerInit(e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct Captured(Arc<Mutex<Vec<u8>>>);

    impl io::Write for Captured {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    impl Captured {
        fn contents(&self) -> String {
            String::from_utf8(self.0.lock().unwrap().clone()).unwrap()
        }
    }

    fn capture<F: FnOnce()>(f: F) -> String {
        let captured = Captured::default();
        let writer = captured.clone();
        let subscriber = tracing_subscriber::fmt::Subscriber::builder()
            .with_env_filter(EnvFilter::new("trace"))
            .with_ansi(false)
            .event_format(Formatter)
            .with_writer(move || writer.clone())
            .finish();
        tracing::subscriber::with_default(subscriber, f);
        captured.contents()
    }

    #[test]
    fn test_format_prefix_and_level() {
        let output = capture(|| tracing::warn!("elast_host not set"));
        assert_eq!(output, "ELAST | WARN | elast_host not set\n");
    }

    #[test]
    fn test_format_document_target() {
        let output = capture(|| {
            tracing::error!(index = "application", id = %"2j8d", status = 500, "Error indexing document");
        });
        assert_eq!(
            output,
            "ELAST | ERROR | application/2j8d | Error indexing document status=500\n"
        );
    }

    #[test]
    fn test_format_index_without_id() {
        let output = capture(|| tracing::info!(index = "application", "created"));
        assert_eq!(output, "ELAST | INFO | application | created\n");
    }

    #[test]
    fn test_format_span_names() {
        let output = capture(|| {
            let span = tracing::info_span!("ship", attempt = 1);
            let _guard = span.enter();
            tracing::debug!(retries = 0, "Cluster health check returned 200 OK");
        });
        assert_eq!(
            output,
            "ELAST | DEBUG | ship: Cluster health check returned 200 OK retries=0\n"
        );
    }

    #[test]
    fn test_init_rejects_bad_filter() {
        assert!(matches!(init("elast_log=loudest"), Err(ElastError::LoggerInit(_))));
    }
}
