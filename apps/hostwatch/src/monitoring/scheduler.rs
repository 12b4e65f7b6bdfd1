use tracing::{debug, error, info, trace, warn};

use super::prober::Prober;
use super::registry::Registry;
use super::store::TargetStore;
use super::types::{TargetStatus, Tick};
use crate::tui::input::InputGate;
use crate::tui::view::Presenter;

/// Where the scheduler is within a cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Idle,
    Probing,
    Rendering,
    AwaitingInput,
}

/// What happened during one cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CycleReport {
    /// Number of targets probed
    pub probed: usize,
    /// Whether operator input added a target
    pub added: bool,
}

/// Monitoring scheduler - drives the probe, render and input cycle.
///
/// Owns the registry outright; the presenter only ever sees it between
/// probing and the input wait, so no locking is involved.
pub struct Scheduler<P, V, S: TargetStore> {
    registry: Registry<S>,
    prober: P,
    presenter: V,
    input: InputGate,
    phase: Phase,
}

impl<P, V, S> Scheduler<P, V, S>
where
    P: Prober,
    V: Presenter,
    S: TargetStore,
{
    pub fn new(registry: Registry<S>, prober: P, presenter: V, input: InputGate) -> Self {
        Self { registry, prober, presenter, input, phase: Phase::Idle }
    }

    fn enter(&mut self, phase: Phase) {
        trace!(from = ?self.phase, to = ?phase, "Scheduler phase");
        self.phase = phase;
    }

    #[cfg(test)]
    pub(crate) fn phase(&self) -> Phase {
        self.phase
    }

    pub fn registry(&self) -> &Registry<S> {
        &self.registry
    }

    /// Probe every due target, one after another, in registry order.
    ///
    /// All results of a cycle are recorded against the same clock `now`.
    /// Returns how many targets were probed.
    pub async fn probe_due(&mut self, now: Tick) -> usize {
        self.enter(Phase::Probing);

        let due: Vec<String> =
            self.registry.due_now(now.monotonic).iter().map(|t| t.name.clone()).collect();

        for name in &due {
            let previous = self.registry.get(name).map(|t| t.status);
            let result = self.prober.probe(name).await;
            self.registry.record_result(name, result, now);

            let status = if result.reachable { TargetStatus::Up } else { TargetStatus::Down };
            debug!(target_name = %name, %status, latency_ms = ?result.latency_ms, "Probe completed");

            if previous != Some(status) {
                let msg = format!("[CHANGE] {} -> {}", name, status);
                if status == TargetStatus::Down {
                    warn!("{}", msg);
                } else {
                    info!("{}", msg);
                }
            }
        }

        due.len()
    }

    /// Hand the current target list to the presenter
    pub fn render(&mut self) {
        self.enter(Phase::Rendering);
        if let Err(e) = self.presenter.present(self.registry.targets()) {
            warn!("Failed to draw status table: {}", e);
        }
    }

    /// Handle one line of operator input.
    ///
    /// Blank lines only refresh; malformed or duplicate names are ignored.
    /// An accepted name is persisted right away, and a failed save keeps it
    /// in memory. Returns true when a target was added.
    pub fn accept_input(&mut self, line: &str) -> bool {
        let name = line.trim();
        if name.is_empty() {
            return false;
        }

        if !self.registry.insert(name) {
            debug!(%name, "Ignoring operator input");
            return false;
        }

        info!(%name, "Added target");
        if let Err(e) = self.registry.save_all() {
            error!("Target list not persisted, keeping it in memory: {}", e);
        }
        true
    }

    /// Wait the bounded input window and apply any line received
    pub async fn await_input(&mut self) -> bool {
        self.enter(Phase::AwaitingInput);
        let added = match self.input.wait().await {
            Some(line) => self.accept_input(&line),
            None => false,
        };
        self.enter(Phase::Idle);
        added
    }

    /// Run one full cycle using `now` as the scheduling clock
    pub async fn cycle_at(&mut self, now: Tick) -> CycleReport {
        let probed = self.probe_due(now).await;
        self.render();
        let added = self.await_input().await;
        CycleReport { probed, added }
    }

    pub async fn cycle(&mut self) -> CycleReport {
        self.cycle_at(Tick::now()).await
    }

    /// Cycle forever. Only returns if the surrounding task is dropped.
    pub async fn run(&mut self) {
        info!(
            targets = self.registry.len(),
            interval_secs = self.registry.check_interval().as_secs(),
            window_ms = self.input.window().as_millis() as u64,
            "Scheduler started"
        );
        loop {
            let report = self.cycle().await;
            debug!(probed = report.probed, added = report.added, "Cycle finished");
        }
    }
}
