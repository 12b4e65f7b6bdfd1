//! hostwatch - terminal host availability monitor.
//!
//! Keeps an ordered list of hosts, probes each one when it falls due and
//! redraws a status table between bounded waits for operator input.
//!
//! ```text
//! Scheduler (one cycle)
//!   ├── Probing:       Registry::due_now → Prober::probe → Registry::record_result
//!   ├── Rendering:     Presenter::present(targets)
//!   └── AwaitingInput: InputGate::wait → Registry::insert → Registry::save_all
//! ```

pub mod config;
pub mod error;
pub mod monitoring;
pub mod tui;
