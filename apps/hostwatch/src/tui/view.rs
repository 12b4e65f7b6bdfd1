use std::fmt::Write as _;
use std::io::{self, Write};
use std::path::PathBuf;
use std::time::Duration;

use chrono::{DateTime, Local, Utc};
use crossterm::cursor::MoveTo;
use crossterm::execute;
use crossterm::terminal::{Clear, ClearType};

use crate::monitoring::types::Target;

const NAME_WIDTH: usize = 32;
const STATUS_WIDTH: usize = 10;
const LATENCY_WIDTH: usize = 14;
const CHECKED_WIDTH: usize = 20;

/// Shown in place of a missing latency or timestamp
const PLACEHOLDER: &str = "-";

pub const PROMPT: &str = "Add host (ENTER to refresh): ";

/// Receives the full target list once per cycle
pub trait Presenter {
    fn present(&mut self, targets: &[Target]) -> io::Result<()>;
}

/// Static context printed above the table
#[derive(Debug, Clone)]
pub struct ViewHeader {
    pub check_interval: Duration,
    pub store_path: PathBuf,
}

impl ViewHeader {
    fn interval_text(&self) -> String {
        let secs = self.check_interval.as_secs();
        if secs >= 60 && secs % 60 == 0 { format!("{} min", secs / 60) } else { format!("{} s", secs) }
    }
}

fn truncate(name: &str, max_chars: usize) -> String {
    name.chars().take(max_chars).collect()
}

fn format_latency(latency_ms: Option<f64>) -> String {
    latency_ms.map_or_else(|| PLACEHOLDER.to_string(), |ms| format!("{:.3}", ms))
}

fn format_checked(at: Option<DateTime<Utc>>) -> String {
    at.map_or_else(
        || PLACEHOLDER.to_string(),
        |at| at.with_timezone(&Local).format("%Y-%m-%d %H:%M:%S").to_string(),
    )
}

/// Render the header, table and prompt as plain text
pub fn format_table(targets: &[Target], header: &ViewHeader) -> String {
    let mut out = String::new();

    let _ = writeln!(out, "Host monitor (probe every {})", header.interval_text());
    let _ = writeln!(
        out,
        "Store: {}   |   Add a host: type it below and press ENTER\n",
        header.store_path.display()
    );

    let _ = writeln!(
        out,
        "{:<NAME_WIDTH$}{:<STATUS_WIDTH$}{:<LATENCY_WIDTH$}{:<CHECKED_WIDTH$}",
        "Name", "Status", "Latency(ms)", "Last check"
    );
    let _ = writeln!(out, "{}", "-".repeat(NAME_WIDTH + STATUS_WIDTH + LATENCY_WIDTH + CHECKED_WIDTH));

    for target in targets {
        let _ = writeln!(
            out,
            "{:<NAME_WIDTH$}{:<STATUS_WIDTH$}{:<LATENCY_WIDTH$}{:<CHECKED_WIDTH$}",
            truncate(&target.name, NAME_WIDTH - 1),
            target.status.to_string(),
            format_latency(target.latency_ms),
            format_checked(target.last_checked_at),
        );
    }

    let _ = write!(out, "\n{}", PROMPT);
    out
}

/// Clears the terminal and redraws the table each cycle
pub struct TerminalView<W: Write> {
    out: W,
    header: ViewHeader,
}

impl TerminalView<io::Stdout> {
    pub fn stdout(header: ViewHeader) -> Self {
        Self::new(io::stdout(), header)
    }
}

impl<W: Write> TerminalView<W> {
    pub fn new(out: W, header: ViewHeader) -> Self {
        Self { out, header }
    }
}

impl<W: Write> Presenter for TerminalView<W> {
    fn present(&mut self, targets: &[Target]) -> io::Result<()> {
        execute!(self.out, Clear(ClearType::All), MoveTo(0, 0))?;
        self.out.write_all(format_table(targets, &self.header).as_bytes())?;
        self.out.flush()
    }
}
