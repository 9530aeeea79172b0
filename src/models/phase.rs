use chrono::Duration;
use std::collections::BTreeMap;

/// One SUMO phase: how long it lasts and the state of every connection
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedPhase {
    pub duration: Duration,
    /// One character per connection index, index 0 first
    pub state: String,
}

impl MergedPhase {
    #[must_use]
    pub fn new(duration: Duration, state: impl Into<String>) -> Self {
        Self {
            duration,
            state: state.into(),
        }
    }
}

/// A synthesized traffic light program, ready to be emitted as a `tlLogic`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TlLogic {
    /// `id` attribute: the SUMO traffic light this program belongs to
    pub id: String,
    /// `programID` attribute: the OCIT signal program it was built from
    pub program_id: String,
    pub connection_count: usize,
    pub phases: Vec<MergedPhase>,
    /// Signal groups driving each connection index
    pub index_groups: BTreeMap<usize, Vec<String>>,
}

impl TlLogic {
    #[must_use]
    pub fn cycle_length(&self) -> Duration {
        self.phases
            .iter()
            .fold(Duration::zero(), |acc, phase| acc + phase.duration)
    }
}
