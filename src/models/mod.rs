mod intersection;
mod phase;
mod signal_group;
mod signal_state;

pub use intersection::{intersection_label, Intersection};
pub use phase::{MergedPhase, TlLogic};
pub use signal_group::{SignalGroup, StateProgram, TimedState};
pub use signal_state::{StateSymbol, SumoState};
