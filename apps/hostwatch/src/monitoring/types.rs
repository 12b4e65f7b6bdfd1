use std::time::Duration;

use chrono::{DateTime, Utc};
use tokio::time::Instant;

/// Last known state of a monitored host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TargetStatus {
    #[default]
    Unknown,
    Up,
    Down,
}

impl std::fmt::Display for TargetStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TargetStatus::Unknown => write!(f, "N/A"),
            TargetStatus::Up => write!(f, "UP"),
            TargetStatus::Down => write!(f, "DOWN"),
        }
    }
}

/// Outcome of a single reachability check
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProbeResult {
    /// Whether the host answered
    pub reachable: bool,

    /// Round-trip time, when the check reported one
    pub latency_ms: Option<f64>,
}

impl ProbeResult {
    /// Host answered with a measured round trip
    pub fn up(latency_ms: f64) -> Self {
        Self { reachable: true, latency_ms: Some(latency_ms) }
    }

    /// Host answered but no timing was available
    pub fn up_without_latency() -> Self {
        Self { reachable: true, latency_ms: None }
    }

    /// Host did not answer, or the check could not run at all
    pub fn down() -> Self {
        Self { reachable: false, latency_ms: None }
    }
}

/// A moment as seen by the scheduler.
///
/// Deadlines are computed on the monotonic clock so a stepped system clock
/// never delays or bunches probes. The wall clock is only shown to the operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Tick {
    pub monotonic: Instant,
    pub wall: DateTime<Utc>,
}

impl Tick {
    pub fn now() -> Self {
        Self { monotonic: Instant::now(), wall: Utc::now() }
    }

    /// The same tick moved forward on both clocks
    #[cfg(test)]
    pub(crate) fn after(self, elapsed: Duration) -> Self {
        let wall_elapsed = chrono::Duration::from_std(elapsed).unwrap();
        Self { monotonic: self.monotonic + elapsed, wall: self.wall + wall_elapsed }
    }
}

/// One monitored host
#[derive(Debug, Clone, PartialEq)]
pub struct Target {
    /// Host identifier, unique within a registry
    pub name: String,

    /// Status after the most recent probe
    pub status: TargetStatus,

    /// Latency from the most recent probe; only ever set while `Up`
    pub latency_ms: Option<f64>,

    /// When the most recent probe completed
    pub last_checked_at: Option<DateTime<Utc>>,

    /// Deadline for the next probe; `None` until the first probe, which
    /// makes a new target due immediately
    pub next_due_at: Option<Instant>,
}

impl Target {
    /// Create a target that has never been probed and is due immediately
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            status: TargetStatus::Unknown,
            latency_ms: None,
            last_checked_at: None,
            next_due_at: None,
        }
    }

    pub fn is_due(&self, now: Instant) -> bool {
        self.next_due_at.is_none_or(|due| due <= now)
    }

    /// Apply a probe outcome observed at `at`
    pub fn apply(&mut self, result: ProbeResult, at: Tick, interval: Duration) {
        if result.reachable {
            self.status = TargetStatus::Up;
            self.latency_ms = result.latency_ms;
        } else {
            self.status = TargetStatus::Down;
            self.latency_ms = None;
        }
        self.last_checked_at = Some(at.wall);
        self.next_due_at = Some(at.monotonic + interval);
    }
}
