use crate::bank::Bank;
use crate::dates::{current_week_range, format_date, DateRange};
use crate::entry::Entry;
use crate::ledger::filter_history;
use crate::summary::{summarize, Summary};
use anyhow::Result;
use chrono::NaiveDate;
use crossterm::{
    event::{self, Event, KeyCode, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, Cell, Paragraph, Row, Table, TableState},
    Frame, Terminal,
};
use std::io;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Page {
    History,
    Summary,
}

impl Page {
    pub fn next(&self) -> Self {
        match self {
            Page::History => Page::Summary,
            Page::Summary => Page::History,
        }
    }

    pub fn title(&self) -> &str {
        match self {
            Page::History => "History",
            Page::Summary => "Summary",
        }
    }
}

pub struct App {
    pub entries: Vec<Entry>,
    /// Visible rows with their position in `entries`
    pub filtered: Vec<(usize, Entry)>,
    pub state: TableState,
    pub current_page: Page,
    pub users: Vec<String>,
    pub bank_filter: Option<Bank>,
    pub person_filter: Option<String>,
    pub week: DateRange,
    /// Summary over the current week instead of all data
    pub week_only: bool,
}

impl App {
    pub fn new(entries: Vec<Entry>, users: Vec<String>, today: NaiveDate) -> Self {
        let mut app = Self {
            entries,
            filtered: Vec::new(),
            state: TableState::default(),
            current_page: Page::History,
            users,
            bank_filter: None,
            person_filter: None,
            week: current_week_range(today),
            week_only: true,
        };
        app.refilter();
        app
    }

    fn refilter(&mut self) {
        let bank = self.bank_filter.map(|b| b.as_str());
        self.filtered = filter_history(&self.entries, bank, self.person_filter.as_deref())
            .into_iter()
            .map(|(i, e)| (i, e.clone()))
            .collect();

        // Reset selection to first item
        if self.filtered.is_empty() {
            self.state.select(None);
        } else {
            self.state.select(Some(0));
        }
    }

    /// None → first bank → ... → last bank → None
    pub fn cycle_bank(&mut self) {
        self.bank_filter = match self.bank_filter {
            None => Some(Bank::ALL[0]),
            Some(bank) => Bank::ALL.get(bank.index() + 1).copied(),
        };
        self.refilter();
    }

    /// None → first user → ... → last user → None
    pub fn cycle_person(&mut self) {
        let next = match &self.person_filter {
            None => self.users.first(),
            Some(current) => self
                .users
                .iter()
                .position(|u| u == current)
                .and_then(|i| self.users.get(i + 1)),
        };
        self.person_filter = next.cloned();
        self.refilter();
    }

    pub fn clear_filter(&mut self) {
        self.bank_filter = None;
        self.person_filter = None;
        self.refilter();
    }

    pub fn toggle_range(&mut self) {
        self.week_only = !self.week_only;
    }

    pub fn summary(&self) -> Summary {
        let range = self.week_only.then_some(self.week);
        summarize(&self.entries, self.person_filter.as_deref(), range)
    }

    pub fn selected_entry(&self) -> Option<&Entry> {
        self.state.selected().and_then(|i| self.filtered.get(i)).map(|(_, e)| e)
    }

    pub fn next(&mut self) {
        let len = self.filtered.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self) {
        let len = self.filtered.len();
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }

    pub fn page_down(&mut self) {
        let len = self.filtered.len();
        if len == 0 {
            return;
        }
        let i = self.state.selected().map_or(0, |i| (i + 20).min(len - 1));
        self.state.select(Some(i));
    }

    pub fn page_up(&mut self) {
        if self.filtered.is_empty() {
            return;
        }
        let i = self.state.selected().map_or(0, |i| i.saturating_sub(20));
        self.state.select(Some(i));
    }
}

pub fn run_ui(app: &mut App) -> Result<()> {
    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let res = run_app(&mut terminal, app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> io::Result<()> {
    loop {
        terminal.draw(|f| ui(f, app))?;

        if let Event::Key(key) = event::read()? {
            match key.code {
                KeyCode::Char('q') | KeyCode::Esc => return Ok(()),
                KeyCode::Char('c') if key.modifiers.contains(KeyModifiers::CONTROL) => return Ok(()),
                KeyCode::Tab => app.current_page = app.current_page.next(),
                KeyCode::Char('b') => app.cycle_bank(),
                KeyCode::Char('p') => app.cycle_person(),
                KeyCode::Char('c') => app.clear_filter(),
                KeyCode::Char('w') => app.toggle_range(),
                KeyCode::Down | KeyCode::Char('j') => app.next(),
                KeyCode::Up | KeyCode::Char('k') => app.previous(),
                KeyCode::PageDown => app.page_down(),
                KeyCode::PageUp => app.page_up(),
                KeyCode::Home if !app.filtered.is_empty() => app.state.select(Some(0)),
                KeyCode::End if !app.filtered.is_empty() => app.state.select(Some(app.filtered.len() - 1)),
                _ => {}
            }
        }
    }
}

fn ui(f: &mut Frame, app: &mut App) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3), // Header with navigation
            Constraint::Min(0),    // Content area
            Constraint::Length(3), // Status bar
        ])
        .split(f.size());

    render_header(f, chunks[0], app);

    match app.current_page {
        Page::History => render_history(f, chunks[1], app),
        Page::Summary => render_summary(f, chunks[1], app),
    }

    render_status_bar(f, chunks[2], app);
}

fn render_header(f: &mut Frame, area: Rect, app: &App) {
    let mut spans = vec![];
    for (i, page) in [Page::History, Page::Summary].iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" │ "));
        }

        let style = if *page == app.current_page {
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD | Modifier::UNDERLINED)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        spans.push(Span::styled(page.title().to_string(), style));
    }

    spans.push(Span::raw("  |  "));
    spans.push(Span::styled(
        format!("Entries: {}", app.entries.len()),
        Style::default().fg(Color::White),
    ));
    spans.push(Span::raw("  |  "));
    spans.push(Span::styled(
        format!("Week: {} – {}", format_date(app.week.start), format_date(app.week.end)),
        Style::default().fg(Color::Cyan),
    ));

    let header = Paragraph::new(vec![Line::from(spans)])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::Cyan)));

    f.render_widget(header, area);
}

fn header_row(titles: &[&'static str]) -> Row<'static> {
    let cells = titles
        .iter()
        .map(|h| Cell::from(*h).style(Style::default().fg(Color::Yellow).add_modifier(Modifier::BOLD)));

    Row::new(cells).style(Style::default().bg(Color::DarkGray)).height(1)
}

fn render_history(f: &mut Frame, area: Rect, app: &mut App) {
    let rows = app.filtered.iter().map(|(index, entry)| {
        // Unknown banks are shown but never counted
        let bank_style = match entry.bank() {
            Some(_) => Style::default(),
            None => Style::default().fg(Color::Red),
        };
        let values: Vec<String> = entry.entries.iter().map(|e| e.value.to_string()).collect();

        Row::new(vec![
            Cell::from(index.to_string()),
            Cell::from(format_date(entry.date)),
            Cell::from(entry.person.clone().unwrap_or_default()),
            Cell::from(entry.bank_name().to_string()).style(bank_style),
            Cell::from(values.join(" / ")),
            Cell::from(entry.total_value().to_string()).style(Style::default().fg(Color::Green)),
        ])
        .height(1)
    });

    let table = Table::new(
        rows,
        [
            Constraint::Length(6),
            Constraint::Length(12),
            Constraint::Length(12),
            Constraint::Length(12),
            Constraint::Length(18),
            Constraint::Length(8),
        ],
    )
    .header(header_row(&["#", "Date", "Person", "Bank", "Values", "Total"]))
    .block(
        Block::default()
            .borders(Borders::ALL)
            .border_style(Style::default().fg(Color::White))
            .title(" Entries "),
    )
    .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD))
    .highlight_symbol("→ ");

    f.render_stateful_widget(table, area, &mut app.state);
}

fn render_summary(f: &mut Frame, area: Rect, app: &App) {
    let summary = app.summary();

    let mut rows: Vec<Row> = summary
        .iter()
        .map(|(bank, totals)| {
            let color = if totals.count > 0 { Color::Green } else { Color::DarkGray };
            Row::new(vec![
                Cell::from(bank.as_str()),
                Cell::from(totals.count.to_string()).style(Style::default().fg(color)),
                Cell::from(totals.total_value.to_string()).style(Style::default().fg(color)),
            ])
        })
        .collect();

    let total = summary.grand_total();
    rows.push(
        Row::new(vec![
            Cell::from("Total"),
            Cell::from(total.count.to_string()),
            Cell::from(total.total_value.to_string()),
        ])
        .style(Style::default().add_modifier(Modifier::BOLD)),
    );

    let scope = if app.week_only {
        format!("{} – {}", format_date(app.week.start), format_date(app.week.end))
    } else {
        "all dates".to_string()
    };
    let who = app.person_filter.as_deref().unwrap_or("everyone");

    let table = Table::new(rows, [Constraint::Length(14), Constraint::Length(8), Constraint::Length(12)])
        .header(header_row(&["Bank", "Count", "Total value"]))
        .block(
            Block::default()
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::White))
                .title(format!(" Summary: {who}, {scope} ")),
        );

    f.render_widget(table, area);
}

fn render_status_bar(f: &mut Frame, area: Rect, app: &App) {
    let selected = app.state.selected().map(|i| i + 1).unwrap_or(0);

    let mut spans = vec![Span::styled(
        format!(" Row: {}/{} ", selected, app.filtered.len()),
        Style::default().fg(Color::Cyan),
    )];

    if let Some(bank) = app.bank_filter {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(format!("Bank: {bank}"), Style::default().fg(Color::Green)));
    }
    if let Some(person) = &app.person_filter {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(format!("Person: {person}"), Style::default().fg(Color::Green)));
    }

    for (key, label, color) in [
        ("b", " Bank", Color::Yellow),
        ("p", " Person", Color::Yellow),
        ("w", " Week/All", Color::Yellow),
        ("c", " Clear", Color::Yellow),
        ("Tab", " Page", Color::Yellow),
        ("q", " Quit", Color::Red),
    ] {
        spans.push(Span::raw(" | "));
        spans.push(Span::styled(key, Style::default().fg(color)));
        spans.push(Span::raw(label));
    }

    let status_bar = Paragraph::new(vec![Line::from(spans)])
        .block(Block::default().borders(Borders::ALL).border_style(Style::default().fg(Color::White)));

    f.render_widget(status_bar, area);
}
