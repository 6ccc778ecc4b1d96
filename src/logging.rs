use std::path::Path;
#[cfg(test)]
use std::sync::LazyLock;

use anyhow::{Context, Result};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::Rotation;
use tracing_subscriber::EnvFilter;
#[cfg(test)]
use tracing::level_filters::LevelFilter;

const LOG_PREFIX: &str = "life_heatmap";

/// Sends tracing output to daily-rotated files under `<state_dir>/logs`.
/// The terminal belongs to the dashboard, so nothing is written to stdout.
///
/// `RUST_LOG` takes precedence over the configured level and an invalid
/// filter is an error, not a silent fallback. Keep the returned
/// guard alive until exit so buffered lines are flushed.
pub fn enable_logging(state_dir: &Path, log_level: Option<&str>) -> Result<WorkerGuard> {
	let appender = tracing_appender::rolling::Builder::new()
		.rotation(Rotation::DAILY)
		.max_log_files(5)
		.filename_prefix(LOG_PREFIX)
		.build(state_dir.join("logs"))?;
	let (writer, guard) = tracing_appender::non_blocking(appender);

	let rust_log = std::env::var("RUST_LOG").ok();
	let filter = log_filter(rust_log.as_deref(), log_level)?;

	tracing_subscriber::fmt()
		.with_env_filter(filter)
		.with_writer(writer)
		.with_ansi(false)
		.try_init()
		.map_err(|err| anyhow::anyhow!("failed to install logger: {err}"))?;

	Ok(guard)
}

/// A non-blank `RUST_LOG` is taken as full filter directives. Otherwise the
/// configured bare level (default `info`) applies to this crate only.
fn log_filter(rust_log: Option<&str>, log_level: Option<&str>) -> Result<EnvFilter> {
	if let Some(directives) = rust_log.filter(|raw| !raw.trim().is_empty()) {
		return EnvFilter::try_new(directives)
			.with_context(|| format!("invalid RUST_LOG {directives:?}"));
	}

	let level = log_level.map(str::trim).unwrap_or("info");
	EnvFilter::try_new(format!("{LOG_PREFIX}={level}"))
		.with_context(|| format!("invalid log_level {level:?}"))
}

#[cfg(test)]
pub static TEST_LOGGING: LazyLock<()> = LazyLock::new(|| {
	let _ = tracing_subscriber::fmt()
		.with_max_level(LevelFilter::TRACE)
		.with_test_writer()
		.try_init();
});

#[cfg(test)]
mod tests {
	use super::log_filter;

	#[test]
	fn rust_log_directives_are_used_as_given() {
		let filter = log_filter(Some("life_heatmap=debug"), Some("warn")).expect("valid directives");
		assert_eq!(filter.to_string().to_lowercase(), "life_heatmap=debug");
	}

	#[test]
	fn configured_level_is_scoped_to_this_crate() {
		let filter = log_filter(None, Some("trace")).expect("valid level");
		assert_eq!(filter.to_string().to_lowercase(), "life_heatmap=trace");

		let filter = log_filter(Some("  "), None).expect("default level");
		assert_eq!(filter.to_string().to_lowercase(), "life_heatmap=info");
	}

	#[test]
	fn bad_levels_are_reported() {
		assert!(log_filter(None, Some("loud")).is_err());
		assert!(log_filter(Some("life_heatmap=loud"), None).is_err());
	}
}
