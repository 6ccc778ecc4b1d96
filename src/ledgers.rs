use std::env;
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use chrono::NaiveDate;

const RECENT_LEDGERS_FILE: &str = "recent_ledgers.txt";
const MAX_RECENT_LEDGERS: usize = 50;

/// Picks the month ledger to open: `--ledger`, then `LIFE_HEATMAP_LEDGER`,
/// then the most recently used one, then `<state dir>/YYYY-MM.ledger` for `today`.
pub fn resolve_ledger_path(cli_path: Option<PathBuf>, today: NaiveDate) -> PathBuf {
	if let Some(path) = cli_path {
		return absolutize(path);
	}

	if let Some(path) = env::var_os("LIFE_HEATMAP_LEDGER") {
		let path = PathBuf::from(path);
		if !path.as_os_str().is_empty() {
			return absolutize(path);
		}
	}

	match recent_ledgers(MAX_RECENT_LEDGERS) {
		Ok(recent) => {
			if let Some(path) = recent.into_iter().next() {
				return path;
			}
		}
		Err(err) => tracing::warn!(%err, "failed to read recent ledgers"),
	}

	default_ledger_path(today)
}

pub fn default_ledger_path(month: NaiveDate) -> PathBuf {
	state_dir().join(format!("{}.ledger", month.format("%Y-%m")))
}

pub fn remember_ledger(path: &Path) -> Result<(), std::io::Error> {
	let path = absolutize(path.to_path_buf());
	let mut entries = recent_ledgers(MAX_RECENT_LEDGERS)?;
	entries.retain(|entry| entry != &path);
	entries.insert(0, path);
	entries.truncate(MAX_RECENT_LEDGERS);
	save_recent_ledgers(&entries)
}

pub fn recent_ledgers(limit: usize) -> Result<Vec<PathBuf>, std::io::Error> {
	let path = recent_ledgers_path();
	let raw = match fs::read_to_string(path) {
		Ok(raw) => raw,
		Err(err) if err.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
		Err(err) => return Err(err),
	};

	Ok(raw
		.lines()
		.map(str::trim)
		.filter(|line| !line.is_empty())
		.map(PathBuf::from)
		.take(limit)
		.collect())
}

fn save_recent_ledgers(entries: &[PathBuf]) -> Result<(), std::io::Error> {
	fs::create_dir_all(state_dir())?;

	let mut file = fs::File::create(recent_ledgers_path())?;
	for path in entries {
		writeln!(file, "{}", path.display())?;
	}

	Ok(())
}

fn recent_ledgers_path() -> PathBuf {
	state_dir().join(RECENT_LEDGERS_FILE)
}

/// Directory for recents, config and logs. `LIFE_HEATMAP_STATE_DIR` overrides.
pub fn state_dir() -> PathBuf {
	if let Some(path) = env::var_os("LIFE_HEATMAP_STATE_DIR") {
		return PathBuf::from(path);
	}

	#[cfg(target_os = "windows")]
	{
		if let Some(path) = env::var_os("LOCALAPPDATA") {
			return PathBuf::from(path).join("life_heatmap");
		}
	}

	if let Some(path) = env::var_os("XDG_STATE_HOME") {
		return PathBuf::from(path).join("life_heatmap");
	}

	if let Some(path) = env::var_os("HOME") {
		return PathBuf::from(path)
			.join(".local")
			.join("state")
			.join("life_heatmap");
	}

	PathBuf::from(".life_heatmap")
}

fn absolutize(path: PathBuf) -> PathBuf {
	let path = if path.is_absolute() {
		path
	} else if let Ok(cwd) = env::current_dir() {
		cwd.join(path)
	} else {
		path
	};

	if path.exists() {
		fs::canonicalize(&path).unwrap_or(path)
	} else {
		path
	}
}

#[cfg(test)]
mod tests {
	use std::path::PathBuf;

	use chrono::NaiveDate;

	use super::{default_ledger_path, resolve_ledger_path};

	#[test]
	fn explicit_path_wins_and_is_absolute() {
		let today = NaiveDate::from_ymd_opt(2026, 2, 14).expect("valid date");
		let path = resolve_ledger_path(Some(PathBuf::from("feb.ledger")), today);
		assert!(path.is_absolute());
		assert!(path.ends_with("feb.ledger"));
	}

	#[test]
	fn default_path_is_named_after_the_month() {
		let day = NaiveDate::from_ymd_opt(2026, 2, 14).expect("valid date");
		let path = default_ledger_path(day);
		assert_eq!(path.file_name().and_then(|name| name.to_str()), Some("2026-02.ledger"));
	}
}
