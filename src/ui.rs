use std::io;
use std::path::Path;
use std::time::Duration as StdDuration;

use anyhow::Result;
use chrono::{Datelike, Local, Weekday};
use crossterm::event::{self, Event as CEvent, KeyCode, KeyEventKind};
use crossterm::terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen};
use crossterm::{execute, ExecutableCommand};
use ratatui::backend::CrosstermBackend;
use ratatui::layout::{Constraint, Direction, Layout, Rect};
use ratatui::style::{Color, Modifier, Style};
use ratatui::text::{Line, Span};
use ratatui::widgets::{Block, Borders, Clear, List, ListItem, ListState, Paragraph, Wrap};
use ratatui::{Frame, Terminal};
use rust_decimal::Decimal;

use crate::aggregate::{DayTotals, HeatmapCell, MonthSummary, SummaryRow, active_days};
use crate::category::{CategoryKey, list_categories};
use crate::domain::{ActivityEntry, format_hours};
use crate::error::{AggregateError, LedgerError};
use crate::month::MonthView;
use crate::storage::save_month;

const FOCUSED_PANEL_BORDER_COLOR: Color = Color::Yellow;
const INACTIVE_PANEL_BORDER_COLOR: Color = Color::DarkGray;
const HIGHLIGHT_BACKGROUND_COLOR: Color = Color::Rgb(42, 45, 52);
const LEVEL_COLORS: [Option<Color>; 4] = [
	None,
	Some(Color::Rgb(220, 252, 231)),
	Some(Color::Rgb(134, 239, 172)),
	Some(Color::Rgb(34, 197, 94)),
];
const CELL_WIDTH: usize = 6;
const BAR_WIDTH: usize = 20;
const DEFAULT_HOURS_INPUT: &str = "1";

pub fn run_dashboard(view: &mut MonthView, ledger_path: &Path) -> Result<()> {
	enable_raw_mode()?;
	let mut stdout = io::stdout();
	stdout.execute(EnterAlternateScreen)?;
	let backend = CrosstermBackend::new(stdout);
	let mut terminal = Terminal::new(backend)?;

	let result = run_event_loop(&mut terminal, view, ledger_path);

	disable_raw_mode()?;
	execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
	terminal.show_cursor()?;

	result
}

fn run_event_loop(
	terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
	view: &mut MonthView,
	ledger_path: &Path,
) -> Result<()> {
	let mut app = App::new(view);

	loop {
		let screen = build_screen(&app, view);
		app.clamp_selection(&screen);
		terminal.draw(|frame| draw_dashboard(frame, &app, &screen))?;

		if event::poll(StdDuration::from_millis(250))? {
			if let CEvent::Key(key) = event::read()? {
				if key.kind != KeyEventKind::Press {
					continue;
				}

				let should_quit = match &app.mode {
					InputMode::Prompt(_) => handle_prompt_key(&mut app, key.code, view, ledger_path),
					InputMode::Select(_) => handle_select_key(&mut app, key.code, view, ledger_path),
					InputMode::Normal => handle_normal_key(&mut app, key.code, view, ledger_path, &screen),
				};

				if should_quit {
					break;
				}
			}
		}
	}

	Ok(())
}

fn draw_dashboard(frame: &mut Frame, app: &App, screen: &Screen) {
	let layout = Layout::default()
		.direction(Direction::Vertical)
		.constraints([Constraint::Min(14), Constraint::Length(5)])
		.split(frame.area());

	let body = Layout::default()
		.direction(Direction::Horizontal)
		.constraints([
			Constraint::Percentage(36),
			Constraint::Percentage(34),
			Constraint::Percentage(30),
		])
		.split(layout[0]);

	let left = Layout::default()
		.direction(Direction::Vertical)
		.constraints([Constraint::Length(4), Constraint::Min(10)])
		.split(body[0]);

	render_legend_panel(frame, left[0]);
	render_calendar_panel(frame, left[1], app, screen);
	render_selected_day_panel(frame, body[1], app, screen);
	render_summary_panel(frame, body[2], screen);
	render_footer(frame, layout[1], app);

	if let InputMode::Select(select) = &app.mode {
		render_select_popup(frame, select);
	}
}

fn render_legend_panel(frame: &mut Frame, area: Rect) {
	let mut spans = Vec::new();
	for category in list_categories() {
		spans.push(Span::styled("● ", Style::default().fg(category_color(category.id))));
		spans.push(Span::raw(format!("{}  ", category.label)));
	}

	let legend = Paragraph::new(Line::from(spans))
		.wrap(Wrap { trim: true })
		.block(Block::default().borders(Borders::ALL).title("Life Heatmap"));
	frame.render_widget(legend, area);
}

fn render_calendar_panel(frame: &mut Frame, area: Rect, app: &App, screen: &Screen) {
	let mut lines = Vec::new();
	lines.push(Line::from(Span::styled(
		screen.month_title.clone(),
		Style::default().add_modifier(Modifier::BOLD),
	)));
	lines.push(Line::from(
		["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"]
			.iter()
			.map(|name| format!("{name:^CELL_WIDTH$}"))
			.collect::<String>(),
	));

	for week in calendar_weeks(&screen.cells) {
		let mut day_spans = Vec::new();
		let mut hour_spans = Vec::new();
		for slot in week {
			let Some(cell) = slot else {
				day_spans.push(Span::raw(" ".repeat(CELL_WIDTH)));
				hour_spans.push(Span::raw(" ".repeat(CELL_WIDTH)));
				continue;
			};

			let mut style = level_style(cell.level, screen.max_level);
			if cell.day == app.selected_day {
				style = style.add_modifier(Modifier::REVERSED | Modifier::BOLD);
			}
			let hours = if cell.level == 0 {
				String::new()
			} else {
				format_hours(cell.total_hours)
			};
			day_spans.push(Span::styled(format!("{:^CELL_WIDTH$}", cell.day), style));
			hour_spans.push(Span::styled(format!("{hours:^CELL_WIDTH$}"), style));
		}
		lines.push(Line::from(day_spans));
		lines.push(Line::from(hour_spans));
	}

	let block = Block::default()
		.borders(Borders::ALL)
		.title("Calendar")
		.border_style(border_style(app.focus == FocusPane::Calendar));
	frame.render_widget(Paragraph::new(lines).block(block), area);
}

fn render_selected_day_panel(frame: &mut Frame, area: Rect, app: &App, screen: &Screen) {
	let mut items = screen
		.day_entries
		.iter()
		.map(|entry| {
			ListItem::new(Line::from(vec![
				Span::styled("● ", Style::default().fg(category_color(entry.category))),
				Span::styled(
					format!("{:<10}", entry.category.label()),
					Style::default().add_modifier(Modifier::BOLD),
				),
				Span::raw(format_hours(entry.hours)),
			]))
		})
		.collect::<Vec<_>>();

	if items.is_empty() {
		items.push(ListItem::new("(no activities yet, press a to add)"));
	}

	let mut state = ListState::default();
	if app.focus == FocusPane::Entries && !screen.day_entries.is_empty() {
		state.select(Some(app.entry_index.min(screen.day_entries.len() - 1)));
	}

	let title = format!(
		"{} | total {} | level {}",
		screen.day_title,
		format_hours(screen.day_total.total_hours),
		screen.day_total.level
	);
	let list = List::new(items)
		.block(
			Block::default()
				.borders(Borders::ALL)
				.title(title)
				.border_style(border_style(app.focus == FocusPane::Entries)),
		)
		.highlight_style(Style::default().bg(HIGHLIGHT_BACKGROUND_COLOR).add_modifier(Modifier::BOLD));

	frame.render_stateful_widget(list, area, &mut state);
}

fn render_summary_panel(frame: &mut Frame, area: Rect, screen: &Screen) {
	let mut lines = Vec::new();
	let month_total = match &screen.month_total {
		Ok(total) => format_hours(*total),
		Err(err) => format!("error: {err}"),
	};
	lines.push(Line::from(format!("Total: {month_total}")));
	lines.push(Line::from(format!("Active days: {}", screen.active_days)));
	lines.push(Line::from(""));

	match &screen.summary {
		Ok(summary) => {
			for row in summary.rows() {
				lines.push(Line::from(vec![
					Span::styled(
						format!("{:<10}", row.category.label()),
						Style::default().add_modifier(Modifier::BOLD),
					),
					Span::raw(format!("{:>7}", format_hours(row.total_hours))),
				]));
				lines.push(Line::from(vec![
					Span::styled(progress_bar(&row), Style::default().fg(category_color(row.category))),
					Span::raw(format!(" {:>3}%", row.progress_percent())),
				]));
			}
		}
		Err(err) => {
			lines.push(Line::from(Span::styled(
				format!("error: {err}"),
				Style::default().fg(Color::Red),
			)));
		}
	}

	let panel = Paragraph::new(lines).block(Block::default().borders(Borders::ALL).title("Summary"));
	frame.render_widget(panel, area);
}

fn render_footer(frame: &mut Frame, area: Rect, app: &App) {
	let footer_lines = match &app.mode {
		InputMode::Normal => vec![
			Line::from("Tab pane | arrows/hjkl move day (calendar) or entry (day) | q quit"),
			Line::from("a add activity | d delete entry (day pane) | r reset day"),
			Line::from(app.status.clone()),
		],
		InputMode::Prompt(prompt) => vec![
			Line::from(prompt.title.clone()),
			Line::from(format!("> {}", prompt.input)),
			Line::from(format!("Enter submit | Esc cancel | {}", app.status)),
		],
		InputMode::Select(select) => vec![
			Line::from(select.title.clone()),
			Line::from(format!(
				"Selected: {}",
				select
					.selected_option()
					.map(|option| option.label.as_str())
					.unwrap_or("(none)")
			)),
			Line::from("j/k or arrows move | Enter choose | Esc cancel"),
		],
	};

	let footer = Paragraph::new(footer_lines).block(Block::default().borders(Borders::ALL).title("Shortcuts"));
	frame.render_widget(footer, area);
}

fn render_select_popup(frame: &mut Frame, select: &SelectState) {
	let area = centered_rect(40, 45, frame.area());
	frame.render_widget(Clear, area);

	let items = select
		.options
		.iter()
		.map(|option| ListItem::new(option.label.clone()).style(option.style))
		.collect::<Vec<_>>();

	let current = select.selected.saturating_add(1);
	let total = select.options.len();
	let list = List::new(items)
		.block(
			Block::default()
				.borders(Borders::ALL)
				.title(format!("{} ({current}/{total})", select.title)),
		)
		.highlight_symbol(">> ")
		.highlight_style(Style::default().bg(HIGHLIGHT_BACKGROUND_COLOR));

	let mut state = ListState::default();
	if !select.options.is_empty() {
		state.select(Some(select.selected.min(select.options.len() - 1)));
	}
	frame.render_stateful_widget(list, area, &mut state);
}

fn centered_rect(percent_x: u16, percent_y: u16, area: Rect) -> Rect {
	let popup_layout = Layout::default()
		.direction(Direction::Vertical)
		.constraints([
			Constraint::Percentage((100 - percent_y) / 2),
			Constraint::Percentage(percent_y),
			Constraint::Percentage((100 - percent_y) / 2),
		])
		.split(area);
	Layout::default()
		.direction(Direction::Horizontal)
		.constraints([
			Constraint::Percentage((100 - percent_x) / 2),
			Constraint::Percentage(percent_x),
			Constraint::Percentage((100 - percent_x) / 2),
		])
		.split(popup_layout[1])[1]
}

fn handle_normal_key(
	app: &mut App,
	code: KeyCode,
	view: &mut MonthView,
	ledger_path: &Path,
	screen: &Screen,
) -> bool {
	match code {
		KeyCode::Char('q') | KeyCode::Esc => true,
		KeyCode::Tab | KeyCode::BackTab => {
			app.focus = app.focus.toggle();
			false
		}
		KeyCode::Up | KeyCode::Char('k') => {
			match app.focus {
				FocusPane::Calendar => app.shift_selected_day(-7, screen.days_in_month),
				FocusPane::Entries => app.move_entry_selection(-1, screen),
			}
			false
		}
		KeyCode::Down | KeyCode::Char('j') => {
			match app.focus {
				FocusPane::Calendar => app.shift_selected_day(7, screen.days_in_month),
				FocusPane::Entries => app.move_entry_selection(1, screen),
			}
			false
		}
		KeyCode::Left | KeyCode::Char('h') => {
			if app.focus == FocusPane::Calendar {
				app.shift_selected_day(-1, screen.days_in_month);
			}
			false
		}
		KeyCode::Right | KeyCode::Char('l') => {
			if app.focus == FocusPane::Calendar {
				app.shift_selected_day(1, screen.days_in_month);
			}
			false
		}
		KeyCode::Char('a') => {
			app.mode = InputMode::Select(build_category_select(view));
			false
		}
		KeyCode::Char('r') => {
			app.mode = InputMode::Select(build_reset_confirm_select(app.selected_day));
			false
		}
		KeyCode::Char('d') => {
			if app.focus != FocusPane::Entries {
				app.status = "Focus the day pane to delete an entry".to_string();
				return false;
			}

			let Some(entry) = screen.day_entries.get(app.entry_index) else {
				app.status = "No selected entry to delete".to_string();
				return false;
			};

			app.status = match remove_entry(view, ledger_path, app.selected_day, &entry.id) {
				Ok(message) => message,
				Err(err) => format!("error: {err}"),
			};
			false
		}
		_ => false,
	}
}

fn handle_prompt_key(app: &mut App, code: KeyCode, view: &mut MonthView, ledger_path: &Path) -> bool {
	match code {
		KeyCode::Esc => {
			app.mode = InputMode::Normal;
			app.status = "Input cancelled".to_string();
		}
		KeyCode::Backspace => {
			if let InputMode::Prompt(prompt) = &mut app.mode {
				prompt.input.pop();
			}
		}
		KeyCode::Char(value) => {
			if let InputMode::Prompt(prompt) = &mut app.mode {
				prompt.input.push(value);
			}
		}
		KeyCode::Enter => {
			let prompt = match std::mem::replace(&mut app.mode, InputMode::Normal) {
				InputMode::Prompt(prompt) => prompt,
				InputMode::Normal | InputMode::Select(_) => return false,
			};

			match submit_prompt(&prompt, app.selected_day, view, ledger_path) {
				Ok(message) => {
					app.entry_index = 0;
					app.status = message;
				}
				Err(err) => {
					app.mode = InputMode::Prompt(prompt);
					app.status = format!("error: {err}");
				}
			}
		}
		_ => {}
	}

	false
}

fn handle_select_key(app: &mut App, code: KeyCode, view: &mut MonthView, ledger_path: &Path) -> bool {
	match code {
		KeyCode::Esc => {
			app.mode = InputMode::Normal;
			app.status = "Selection cancelled".to_string();
		}
		KeyCode::Up | KeyCode::Char('k') => {
			if let InputMode::Select(select) = &mut app.mode {
				select.move_selection(-1);
			}
		}
		KeyCode::Down | KeyCode::Char('j') => {
			if let InputMode::Select(select) = &mut app.mode {
				select.move_selection(1);
			}
		}
		KeyCode::Enter => {
			let select = match std::mem::replace(&mut app.mode, InputMode::Normal) {
				InputMode::Select(select) => select,
				_ => return false,
			};

			match submit_select(&select, view, ledger_path) {
				Ok(SelectOutcome::NextPrompt(prompt)) => app.mode = InputMode::Prompt(prompt),
				Ok(SelectOutcome::Done(message)) => {
					app.mode = InputMode::Normal;
					app.status = message;
				}
				Err(err) => {
					app.mode = InputMode::Select(select);
					app.status = format!("error: {err}");
				}
			}
		}
		_ => {}
	}

	false
}

fn submit_prompt(
	prompt: &PromptState,
	day: u32,
	view: &mut MonthView,
	ledger_path: &Path,
) -> Result<String, LedgerError> {
	match prompt.kind {
		PromptKind::EntryHours { category } => {
			let entry = view.add_entry(day, category.id(), &prompt.input)?;
			let message = format!(
				"added {} {} to day {day}",
				format_hours(entry.hours),
				category.label()
			);
			Ok(persist_with_status(view, ledger_path, message))
		}
	}
}

fn submit_select(select: &SelectState, view: &mut MonthView, ledger_path: &Path) -> Result<SelectOutcome, LedgerError> {
	let Some(option) = select.selected_option() else {
		return Ok(SelectOutcome::Done("Nothing selected".to_string()));
	};

	match &select.kind {
		SelectKind::EntryCategory => {
			let category = option.value.as_deref().unwrap_or_default().parse::<CategoryKey>()?;
			let mut prompt = PromptState::new(
				format!("Amount of hours for {}", category.label()),
				PromptKind::EntryHours { category },
			);
			prompt.input = DEFAULT_HOURS_INPUT.to_string();
			Ok(SelectOutcome::NextPrompt(prompt))
		}
		SelectKind::ResetConfirm { day } => {
			if option.value.as_deref() == Some("reset") {
				view.reset_day(*day)?;
				let message = format!("reset day {day}");
				Ok(SelectOutcome::Done(persist_with_status(view, ledger_path, message)))
			} else {
				Ok(SelectOutcome::Done("Reset cancelled".to_string()))
			}
		}
	}
}

fn remove_entry(view: &mut MonthView, ledger_path: &Path, day: u32, entry_id: &str) -> Result<String, LedgerError> {
	match view.remove_entry(day, entry_id) {
		Ok(entry) => {
			let message = format!(
				"removed {} {} from day {day}",
				format_hours(entry.hours),
				entry.category.label()
			);
			Ok(persist_with_status(view, ledger_path, message))
		}
		Err(LedgerError::NotFound { day, entry_id }) => {
			tracing::debug!(day, %entry_id, "entry already gone");
			Ok("Ready".to_string())
		}
		Err(err) => Err(err),
	}
}

/// Saves after a mutation. A failed write is reported in the status line; the
/// in-memory month keeps the change.
fn persist_with_status(view: &MonthView, ledger_path: &Path, message: String) -> String {
	match save_month(ledger_path, view.ledger()) {
		Ok(()) => message,
		Err(err) => {
			tracing::error!(%err, path = %ledger_path.display(), "failed to save ledger");
			format!("{message} (warning: not saved: {err})")
		}
	}
}

fn build_category_select(view: &MonthView) -> SelectState {
	let options = view
		.categories()
		.into_iter()
		.map(|category| {
			SelectOption::new(
				category.label,
				Some(category.id.id().to_string()),
				Style::default().fg(category_color(category.id)),
			)
		})
		.collect();
	SelectState::new("Category", SelectKind::EntryCategory, options)
}

fn build_reset_confirm_select(day: u32) -> SelectState {
	SelectState::new(
		format!("Reset day {day}?"),
		SelectKind::ResetConfirm { day },
		vec![
			SelectOption::new("Cancel", Some("cancel".to_string()), Style::default()),
			SelectOption::new(
				"Clear all activities",
				Some("reset".to_string()),
				Style::default().fg(Color::Red),
			),
		],
	)
}

fn build_screen(app: &App, view: &MonthView) -> Screen {
	let ledger = view.ledger();
	let record = view.select_day(app.selected_day).ok();
	let day_entries = record.map(|record| record.entries().to_vec()).unwrap_or_default();
	let day_total = view.day_totals(app.selected_day).unwrap_or(DayTotals {
		total_hours: Decimal::ZERO,
		level: 0,
	});
	let day_title = ledger
		.first_day()
		.with_day(app.selected_day)
		.map(|date| date.format("%A, %d %B").to_string())
		.unwrap_or_else(|| format!("Day {}", app.selected_day));

	Screen {
		month_title: ledger.first_day().format("%B %Y").to_string(),
		days_in_month: ledger.days_in_month(),
		cells: view.heatmap(),
		max_level: view.scale().max_level(),
		day_title,
		day_entries,
		day_total,
		summary: view.summary(),
		month_total: view.month_total(),
		active_days: active_days(ledger.days()),
	}
}

/// Lays the month out in Sunday-first weeks, padding before the 1st and after the last day.
fn calendar_weeks(cells: &[HeatmapCell]) -> Vec<[Option<&HeatmapCell>; 7]> {
	let mut weeks = Vec::new();
	let mut week: [Option<&HeatmapCell>; 7] = [None; 7];
	for cell in cells {
		let column = cell.weekday.num_days_from_sunday() as usize;
		week[column] = Some(cell);
		if cell.weekday == Weekday::Sat {
			weeks.push(week);
			week = [None; 7];
		}
	}
	if week.iter().any(Option::is_some) {
		weeks.push(week);
	}
	weeks
}

/// Maps a level onto the four-step palette, spreading longer scales evenly.
fn palette_index(level: u8, max_level: u8) -> usize {
	let top = LEVEL_COLORS.len() - 1;
	if level == 0 || max_level == 0 {
		return 0;
	}
	let level = usize::from(level.min(max_level));
	let max_level = usize::from(max_level);
	((level * top).div_ceil(max_level)).clamp(1, top)
}

fn level_style(level: u8, max_level: u8) -> Style {
	match LEVEL_COLORS[palette_index(level, max_level)] {
		Some(color) => Style::default().fg(Color::Black).bg(color),
		None => Style::default(),
	}
}

fn progress_bar(row: &SummaryRow) -> String {
	let filled = (usize::from(row.progress_percent()) * BAR_WIDTH / 100).min(BAR_WIDTH);
	format!("{}{}", "█".repeat(filled), "░".repeat(BAR_WIDTH - filled))
}

fn category_color(category: CategoryKey) -> Color {
	match category {
		CategoryKey::Deep => Color::LightBlue,
		CategoryKey::Study => Color::LightMagenta,
		CategoryKey::Gym => Color::LightGreen,
		CategoryKey::Social => Color::LightYellow,
		CategoryKey::Rest => Color::LightCyan,
	}
}

fn border_style(focused: bool) -> Style {
	if focused {
		Style::default()
			.fg(FOCUSED_PANEL_BORDER_COLOR)
			.add_modifier(Modifier::BOLD)
	} else {
		Style::default().fg(INACTIVE_PANEL_BORDER_COLOR)
	}
}

#[derive(Debug, Clone)]
enum SelectOutcome {
	NextPrompt(PromptState),
	Done(String),
}

#[derive(Debug, Clone)]
struct PromptState {
	title: String,
	input: String,
	kind: PromptKind,
}

impl PromptState {
	fn new(title: impl Into<String>, kind: PromptKind) -> Self {
		Self {
			title: title.into(),
			input: String::new(),
			kind,
		}
	}
}

#[derive(Debug, Clone)]
struct SelectState {
	title: String,
	options: Vec<SelectOption>,
	selected: usize,
	kind: SelectKind,
}

impl SelectState {
	fn new(title: impl Into<String>, kind: SelectKind, options: Vec<SelectOption>) -> Self {
		Self {
			title: title.into(),
			options,
			selected: 0,
			kind,
		}
	}

	fn move_selection(&mut self, delta: i32) {
		if self.options.is_empty() {
			self.selected = 0;
			return;
		}

		if delta > 0 {
			self.selected = (self.selected + delta as usize).min(self.options.len() - 1);
		} else {
			self.selected = self.selected.saturating_sub(delta.unsigned_abs() as usize);
		}
	}

	fn selected_option(&self) -> Option<&SelectOption> {
		self.options.get(self.selected)
	}
}

#[derive(Debug, Clone)]
struct SelectOption {
	label: String,
	value: Option<String>,
	style: Style,
}

impl SelectOption {
	fn new(label: impl Into<String>, value: Option<String>, style: Style) -> Self {
		Self {
			label: label.into(),
			value,
			style,
		}
	}
}

#[derive(Debug, Clone, Copy)]
enum PromptKind {
	EntryHours { category: CategoryKey },
}

#[derive(Debug, Clone)]
enum SelectKind {
	EntryCategory,
	ResetConfirm { day: u32 },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum FocusPane {
	Calendar,
	Entries,
}

impl FocusPane {
	fn toggle(self) -> Self {
		match self {
			FocusPane::Calendar => FocusPane::Entries,
			FocusPane::Entries => FocusPane::Calendar,
		}
	}
}

#[derive(Debug, Clone)]
enum InputMode {
	Normal,
	Prompt(PromptState),
	Select(SelectState),
}

#[derive(Debug, Clone)]
struct App {
	focus: FocusPane,
	selected_day: u32,
	entry_index: usize,
	mode: InputMode,
	status: String,
}

impl App {
	fn new(view: &MonthView) -> Self {
		let today = Local::now().date_naive();
		let ledger = view.ledger();
		let selected_day = if today.year() == ledger.year() && today.month() == ledger.month() {
			today.day()
		} else {
			1
		};
		Self {
			focus: FocusPane::Calendar,
			selected_day,
			entry_index: 0,
			mode: InputMode::Normal,
			status: "Ready".to_string(),
		}
	}

	fn clamp_selection(&mut self, screen: &Screen) {
		self.selected_day = self.selected_day.clamp(1, screen.days_in_month.max(1));
		if screen.day_entries.is_empty() {
			self.entry_index = 0;
		} else {
			self.entry_index = self.entry_index.min(screen.day_entries.len() - 1);
		}
	}

	fn shift_selected_day(&mut self, delta: i64, days_in_month: u32) {
		let target = i64::from(self.selected_day) + delta;
		if (1..=i64::from(days_in_month)).contains(&target) {
			self.selected_day = target as u32;
			self.entry_index = 0;
		}
	}

	fn move_entry_selection(&mut self, delta: i32, screen: &Screen) {
		if screen.day_entries.is_empty() {
			self.entry_index = 0;
			return;
		}

		if delta > 0 {
			self.entry_index = (self.entry_index + delta as usize).min(screen.day_entries.len() - 1);
		} else {
			self.entry_index = self.entry_index.saturating_sub(delta.unsigned_abs() as usize);
		}
	}
}

struct Screen {
	month_title: String,
	days_in_month: u32,
	cells: Vec<HeatmapCell>,
	max_level: u8,
	day_title: String,
	day_entries: Vec<ActivityEntry>,
	day_total: DayTotals,
	summary: Result<MonthSummary, AggregateError>,
	month_total: Result<Decimal, AggregateError>,
	active_days: usize,
}

/// Plain-text heatmap for the `heatmap` command: day number, total and level per cell.
pub fn print_heatmap(view: &MonthView) {
	let ledger = view.ledger();
	println!("{}", ledger.first_day().format("%B %Y"));
	println!(
		"{}",
		["Su", "Mo", "Tu", "We", "Th", "Fr", "Sa"]
			.iter()
			.map(|name| format!("{name:^8}"))
			.collect::<String>()
	);

	let cells = view.heatmap();
	for week in calendar_weeks(&cells) {
		let line = week
			.iter()
			.map(|slot| match slot {
				Some(cell) => format!("{:>2}:{:<5}", cell.day, level_marker(cell.level)),
				None => " ".repeat(8),
			})
			.collect::<String>();
		println!("{}", line.trim_end());
	}
}

fn level_marker(level: u8) -> String {
	if level == 0 {
		".".to_string()
	} else {
		"#".repeat(usize::from(level).min(5))
	}
}
