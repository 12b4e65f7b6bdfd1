/// Integration tests for the monitoring cycle
///
/// These tests drive a full scheduler with an in-memory prober and presenter:
/// - Seeding an empty store with the default hosts
/// - Sequential probing of due targets
/// - Operator input accepted during the bounded wait
use std::collections::HashMap;
use std::io;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tempfile::tempdir;
use tokio::sync::mpsc;

use super::prober::Prober;
use super::registry::Registry;
use super::scheduler::{CycleReport, Scheduler};
use super::store::{FileStore, TargetStore};
use super::types::{ProbeResult, Target, TargetStatus, Tick};
use crate::tui::input::InputGate;
use crate::tui::view::Presenter;

/// Prober with canned results that records every host it is asked about
#[derive(Clone, Default)]
pub struct FakeProber {
    results: HashMap<String, ProbeResult>,
    calls: Arc<Mutex<Vec<String>>>,
}

impl FakeProber {
    pub fn with(mut self, host: &str, result: ProbeResult) -> Self {
        self.results.insert(host.to_string(), result);
        self
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait::async_trait]
impl Prober for FakeProber {
    async fn probe(&self, host: &str) -> ProbeResult {
        self.calls.lock().unwrap().push(host.to_string());
        self.results.get(host).copied().unwrap_or(ProbeResult::up(1.0))
    }
}

/// Presenter that keeps a copy of every frame
#[derive(Clone, Default)]
pub struct RecordingView {
    frames: Arc<Mutex<Vec<Vec<Target>>>>,
}

impl RecordingView {
    pub fn frames(&self) -> Vec<Vec<Target>> {
        self.frames.lock().unwrap().clone()
    }
}

impl Presenter for RecordingView {
    fn present(&mut self, targets: &[Target]) -> io::Result<()> {
        self.frames.lock().unwrap().push(targets.to_vec());
        Ok(())
    }
}

const DEFAULTS: [&str; 2] = ["example.com", "google.com"];

#[tokio::test(start_paused = true)]
async fn test_first_run_to_operator_added_target() {
    let dir = tempdir().unwrap();
    let store_path = dir.path().join("domains.txt");
    let interval = Duration::from_secs(600);

    // Empty store: defaults are seeded and persisted
    let mut registry = Registry::load(FileStore::new(&store_path), interval);
    assert!(registry.is_empty());
    assert!(registry.seed_defaults(DEFAULTS));
    registry.save_all().unwrap();
    assert_eq!(std::fs::read_to_string(&store_path).unwrap(), "example.com\ngoogle.com\n");

    let prober = FakeProber::default()
        .with("example.com", ProbeResult::up(11.4))
        .with("google.com", ProbeResult::down())
        .with("test.example", ProbeResult::up_without_latency());
    let view = RecordingView::default();
    let (tx, rx) = mpsc::channel(4);
    let gate = InputGate::new(rx, Duration::from_secs(3));
    let mut scheduler = Scheduler::new(registry, prober.clone(), view.clone(), gate);

    // First cycle probes both defaults in order, no input arrives
    let t0 = Tick::now();
    let report = scheduler.cycle_at(t0).await;
    assert_eq!(report, CycleReport { probed: 2, added: false });
    assert_eq!(prober.calls(), vec!["example.com", "google.com"]);

    let frame = &view.frames()[0];
    assert_eq!(frame.len(), 2);
    assert_eq!(frame[0].status, TargetStatus::Up);
    assert_eq!(frame[0].latency_ms, Some(11.4));
    assert_eq!(frame[0].last_checked_at, Some(t0.wall));
    assert_eq!(frame[1].status, TargetStatus::Down);
    assert!(frame[1].latency_ms.is_none());

    // Operator types a host during the next input window
    tx.send("test.example".to_string()).await.unwrap();
    let t1 = t0.after(Duration::from_secs(3));
    let report = scheduler.cycle_at(t1).await;
    assert_eq!(report, CycleReport { probed: 0, added: true });

    let registry = scheduler.registry();
    assert_eq!(registry.len(), 3);
    let added = registry.get("test.example").unwrap();
    assert_eq!(added.status, TargetStatus::Unknown);
    assert!(added.last_checked_at.is_none());
    assert_eq!(
        FileStore::new(&store_path).load_names().unwrap(),
        vec!["example.com", "google.com", "test.example"]
    );

    // Next cycle probes only the new host and shows all three
    let t2 = t1.after(Duration::from_secs(3));
    let report = scheduler.cycle_at(t2).await;
    assert_eq!(report.probed, 1);
    assert_eq!(prober.calls(), vec!["example.com", "google.com", "test.example"]);

    let frames = view.frames();
    let last = frames.last().unwrap();
    let names: Vec<&str> = last.iter().map(|t| t.name.as_str()).collect();
    assert_eq!(names, vec!["example.com", "google.com", "test.example"]);
    assert_eq!(last[2].status, TargetStatus::Up);
    assert!(last[2].latency_ms.is_none());
    assert_eq!(last[2].next_due_at, Some(t2.monotonic + interval));
    assert_eq!(last[0].next_due_at, Some(t0.monotonic + interval));
}

#[tokio::test(start_paused = true)]
async fn test_restart_reloads_persisted_targets_due_immediately() {
    let dir = tempdir().unwrap();
    let store_path = dir.path().join("domains.txt");
    std::fs::write(&store_path, "alpha.example\n\n  beta.example  \n").unwrap();

    let registry = Registry::load(FileStore::new(&store_path), Duration::from_secs(600));
    let prober = FakeProber::default();
    let (_tx, rx) = mpsc::channel(1);
    let gate = InputGate::new(rx, Duration::from_secs(3));
    let mut scheduler = Scheduler::new(registry, prober.clone(), RecordingView::default(), gate);

    let report = scheduler.cycle_at(Tick::now()).await;

    assert_eq!(report.probed, 2);
    assert_eq!(prober.calls(), vec!["alpha.example", "beta.example"]);
}

#[tokio::test(start_paused = true)]
async fn test_rejected_input_changes_nothing() {
    let dir = tempdir().unwrap();
    let store_path = dir.path().join("domains.txt");
    let mut registry = Registry::new(FileStore::new(&store_path), Duration::from_secs(600));
    registry.insert("example.com");

    let (tx, rx) = mpsc::channel(4);
    let gate = InputGate::new(rx, Duration::from_secs(3));
    let mut scheduler =
        Scheduler::new(registry, FakeProber::default(), RecordingView::default(), gate);

    for line in ["foo bar", "a/b", "example.com", ""] {
        tx.send(line.to_string()).await.unwrap();
        let report = scheduler.cycle_at(Tick::now()).await;
        assert!(!report.added);
    }

    assert_eq!(scheduler.registry().len(), 1);
    assert!(!store_path.exists());
}

#[tokio::test(start_paused = true)]
async fn test_live_cycles_follow_the_monotonic_clock() {
    let dir = tempdir().unwrap();
    let interval = Duration::from_secs(600);
    let mut registry = Registry::new(FileStore::new(dir.path().join("domains.txt")), interval);
    registry.insert("example.com");

    let prober = FakeProber::default();
    let (_tx, rx) = mpsc::channel(1);
    let gate = InputGate::new(rx, Duration::from_secs(3));
    let mut scheduler = Scheduler::new(registry, prober.clone(), RecordingView::default(), gate);

    assert_eq!(scheduler.cycle().await.probed, 1);
    // Only the input window has passed on the paused clock
    assert_eq!(scheduler.cycle().await.probed, 0);

    // The wall clock barely moves here; only the runtime clock reaches the deadline
    tokio::time::advance(interval).await;
    assert_eq!(scheduler.cycle().await.probed, 1);
    assert_eq!(prober.calls(), vec!["example.com", "example.com"]);
}
