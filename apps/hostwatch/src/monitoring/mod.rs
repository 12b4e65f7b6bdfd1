/// Monitoring engine module - owns the probe/render/input cycle
///
/// This module is responsible for:
/// - Probing hosts (system `ping` or TCP connect)
/// - Keeping the ordered target registry and its persisted name list
/// - Scheduling due probes and feeding the presenter and input gate
pub mod prober;
pub mod registry;
pub mod scheduler;
pub mod store;
pub mod types;

#[cfg(test)]
mod tests;

pub use prober::{PingProber, ProbeKind, Prober, TcpProber};
pub use registry::Registry;
pub use scheduler::Scheduler;
pub use store::{FileStore, TargetStore};
