//! Logging setup and synchronization metrics.
//!
//! Library code only emits `tracing` events. Binaries and tests that want
//! output call [`init_logging`] once.

mod metrics;

pub use metrics::{Counter, Gauge, SyncMetrics, SyncMetricsSummary};

use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::{Event, Subscriber};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

const DEFAULT_FILTER: &str = "info";
const LOG_TAG: &str = "[ botfleet ]";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    /// Compact single-line output without targets.
    #[default]
    Compact,
    /// `[ botfleet ] <timestamp> <LEVEL> <fields>`, used in debug mode.
    Tagged,
}

/// Install a global fmt subscriber honoring `RUST_LOG` (default `info`).
///
/// Returns `false` when a global subscriber is already set.
pub fn init_logging(format: LogFormat) -> bool {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    let result = match format {
        LogFormat::Compact => tracing_subscriber::fmt()
            .compact()
            .with_target(false)
            .with_env_filter(filter)
            .try_init(),
        LogFormat::Tagged => tracing_subscriber::fmt()
            .event_format(TaggedFormatter)
            .with_env_filter(filter)
            .try_init(),
    };
    result.is_ok()
}

pub struct TaggedFormatter;

impl<S, N> FormatEvent<S, N> for TaggedFormatter
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let now = chrono::Utc::now().format("%Y-%m-%dT%H:%M:%S%.3fZ");
        write!(writer, "{} {} {} ", LOG_TAG, now, event.metadata().level())?;
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        writeln!(writer)
    }
}
