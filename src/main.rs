mod aggregate;
mod category;
mod config;
mod domain;
mod error;
mod ledgers;
mod logging;
mod month;
mod session;
mod storage;
mod ui;

use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use chrono::{Datelike, Local, NaiveDate};
use clap::{Parser, Subcommand};

use crate::category::{label_for_id, list_categories};
use crate::config::{load_settings, resolve_config_path};
use crate::domain::format_hours;
use crate::error::LedgerError;
use crate::ledgers::{default_ledger_path, recent_ledgers, remember_ledger, resolve_ledger_path, state_dir};
use crate::logging::enable_logging;
use crate::month::{MonthLedger, MonthView};
use crate::session::Session;
use crate::storage::{load_month, save_month};
use crate::ui::{print_heatmap, run_dashboard};

#[derive(Debug, Parser)]
#[command(name = "life-heatmap", about = "Monthly life heatmap and activity ledger")]
struct Cli {
	#[arg(long)]
	ledger: Option<PathBuf>,
	#[arg(long)]
	config: Option<PathBuf>,
	#[arg(long)]
	user: Option<String>,
	#[command(subcommand)]
	command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
	Init {
		/// Month to create, as YYYY-MM. Defaults to the current month.
		#[arg(long)]
		month: Option<String>,
	},
	Dashboard,
	Categories {
		/// Print only the label for this category id.
		#[arg(long)]
		id: Option<String>,
	},
	Add {
		#[arg(long)]
		day: u32,
		#[arg(long)]
		category: String,
		#[arg(long)]
		hours: String,
	},
	Remove {
		#[arg(long)]
		day: u32,
		#[arg(long)]
		id: String,
	},
	Reset {
		#[arg(long)]
		day: u32,
	},
	Show {
		#[arg(long)]
		day: u32,
	},
	Heatmap,
	Summary,
	Config,
	Ledgers {
		#[arg(long, default_value_t = 20)]
		limit: usize,
	},
}

fn main() {
	if let Err(err) = run() {
		eprintln!("error: {err:#}");
		std::process::exit(1);
	}
}

fn run() -> Result<()> {
	let cli = Cli::parse();

	match &cli.command {
		Some(Command::Ledgers { limit }) => return print_recent_ledgers(*limit),
		Some(Command::Categories { id: Some(id) }) => {
			println!("{}", label_for_id(id)?);
			return Ok(());
		}
		Some(Command::Categories { id: None }) => {
			for category in list_categories() {
				println!("{} | {}", category.id, category.label);
			}
			return Ok(());
		}
		_ => {}
	}

	let config_path = resolve_config_path(cli.config);
	let settings = load_settings(&config_path)
		.with_context(|| format!("loading {}", config_path.display()))?;

	if let Some(Command::Config) = &cli.command {
		println!("# {}", config_path.display());
		print!("{}", settings.to_toml()?);
		return Ok(());
	}

	let _log_guard = match enable_logging(&state_dir(), settings.log_level.as_deref()) {
		Ok(guard) => Some(guard),
		Err(err) => {
			eprintln!("warning: logging disabled: {err:#}");
			None
		}
	};

	let session = Session::local(cli.user);
	let user = session.require()?;
	tracing::debug!(user, "session ready");

	let today = Local::now().date_naive();
	let command = cli.command.unwrap_or(Command::Dashboard);

	if let Command::Init { month } = &command {
		let month = match month {
			Some(raw) => parse_month(raw)?,
			None => today,
		};
		let path = cli.ledger.unwrap_or_else(|| default_ledger_path(month));
		if path.exists() {
			bail!("ledger already exists at {}", path.display());
		}
		save_month(&path, &MonthLedger::for_date(month))?;
		if let Err(err) = remember_ledger(&path) {
			eprintln!("warning: failed to store recent ledger: {err}");
		}
		println!("initialized {} at {}", month.format("%B %Y"), path.display());
		return Ok(());
	}

	let ledger_path = resolve_ledger_path(cli.ledger, today);
	let ledger = load_month(&ledger_path, today)
		.with_context(|| format!("loading {}", ledger_path.display()))?;
	if let Err(err) = remember_ledger(&ledger_path) {
		eprintln!("warning: failed to store recent ledger: {err}");
	}

	let mut month = MonthView::new(ledger, settings.scale, settings.ceilings);
	let view = month.gate(&session)?;

	match command {
		Command::Init { .. } | Command::Categories { .. } | Command::Config | Command::Ledgers { .. } => {}
		Command::Dashboard => {
			run_dashboard(view, &ledger_path)?;
		}
		Command::Add {
			day,
			category,
			hours,
		} => {
			let entry = view.add_entry(day, &category, &hours)?;
			save_month(&ledger_path, view.ledger())?;
			println!(
				"added {} {} to day {day} ({})",
				format_hours(entry.hours),
				entry.category.label(),
				entry.id
			);
		}
		Command::Remove { day, id } => match view.remove_entry(day, &id) {
			Ok(entry) => {
				save_month(&ledger_path, view.ledger())?;
				println!(
					"removed {} {} from day {day}",
					format_hours(entry.hours),
					entry.category.label()
				);
			}
			Err(LedgerError::NotFound { day, entry_id }) => {
				tracing::debug!(day, %entry_id, "nothing to remove");
				println!("no changes");
			}
			Err(err) => return Err(err.into()),
		},
		Command::Reset { day } => {
			view.reset_day(day)?;
			save_month(&ledger_path, view.ledger())?;
			println!("reset day {day}");
		}
		Command::Show { day } => {
			print_day(view, day)?;
		}
		Command::Heatmap => {
			print_heatmap(view);
		}
		Command::Summary => {
			print_summary(view)?;
		}
	}

	Ok(())
}

fn print_recent_ledgers(limit: usize) -> Result<()> {
	let rows = recent_ledgers(limit)?;
	if rows.is_empty() {
		println!("no recent ledgers");
		return Ok(());
	}

	for (index, path) in rows.iter().enumerate() {
		println!("{:>2}. {}", index + 1, path.display());
	}

	Ok(())
}

fn parse_month(input: &str) -> Result<NaiveDate> {
	NaiveDate::parse_from_str(&format!("{}-01", input.trim()), "%Y-%m-%d")
		.with_context(|| format!("expected YYYY-MM, got {input:?}"))
}

fn print_day(view: &MonthView, day: u32) -> Result<()> {
	let record = view.select_day(day)?;
	let totals = view.day_totals(day)?;
	let date = view
		.ledger()
		.first_day()
		.with_day(day)
		.map(|date| date.format("%A, %d %B %Y").to_string())
		.unwrap_or_else(|| format!("day {day}"));

	println!("{date}");
	println!("total {} | level {}", format_hours(totals.total_hours), totals.level);
	if record.is_empty() {
		println!("no activities logged");
		return Ok(());
	}

	for entry in record.entries() {
		println!(
			"{} | {:<10} | {}",
			entry.id,
			entry.category.label(),
			format_hours(entry.hours)
		);
	}

	Ok(())
}

fn print_summary(view: &MonthView) -> Result<()> {
	let summary = view.summary()?;
	println!(
		"summary for {} | total {}",
		view.ledger().first_day().format("%B %Y"),
		format_hours(view.month_total()?)
	);

	for row in summary.rows() {
		println!(
			"{:<10} | {:>7} | {:>3}%",
			row.category.label(),
			format_hours(row.total_hours),
			row.progress_percent()
		);
	}

	Ok(())
}
