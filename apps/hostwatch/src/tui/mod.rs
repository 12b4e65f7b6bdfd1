/// Operator-facing side of the monitor: the status table and line input
pub mod input;
pub mod view;

pub use input::InputGate;
pub use view::{Presenter, TerminalView};
