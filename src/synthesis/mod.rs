//! Merge per-group state programs into one phase sequence per intersection.
//!
//! Every state change of every signal group becomes a cut point of a shared
//! timeline. For each interval between cut points the state of each group is
//! written to all of its connection indices, and runs of intervals with the
//! same combined state are coalesced into one phase.

mod timeline;

pub use timeline::Timeline;

use chrono::Duration;
use crate::config::ConvertOptions;
use crate::error::ConvertError;
use crate::models::{Intersection, MergedPhase, SignalGroup, StateSymbol, SumoState};
use crate::time::format_seconds;

/// A group's program with states resolved and segment starts snapped onto the timeline
struct ResolvedProgram<'a> {
    group: &'a SignalGroup,
    starts: Vec<Duration>,
    states: Vec<SumoState>,
}

impl ResolvedProgram<'_> {
    /// State shown from `time` on; the latest segment starting at or before `time` wins
    fn state_at(&self, time: Duration) -> SumoState {
        let position = self.starts.partition_point(|&start| start <= time);
        self.states[position.saturating_sub(1)]
    }
}

fn resolve_states(group: &SignalGroup, intersection: &str) -> Result<Vec<SumoState>, ConvertError> {
    group
        .program
        .entries
        .iter()
        .map(|entry| {
            StateSymbol::from_ocit(&entry.symbol)
                .map(StateSymbol::sumo_state)
                .ok_or_else(|| ConvertError::UnknownStateSymbol {
                    intersection: intersection.to_string(),
                    group: group.id.clone(),
                    symbol: entry.symbol.clone(),
                })
        })
        .collect()
}

/// Verify all groups share one cycle length and return it
fn shared_cycle_length(intersection: &Intersection) -> Result<Duration, ConvertError> {
    let Some(first) = intersection.groups.first() else {
        return Err(ConvertError::InternalConsistency {
            intersection: intersection.label(),
            detail: "intersection has no signal groups".to_string(),
        });
    };

    for group in &intersection.groups {
        if group.program.is_empty() || group.program.cycle_length() <= Duration::zero() {
            return Err(ConvertError::MalformedInput(format!(
                "signal group '{}' has no state/duration entries",
                group.id
            )));
        }
        if let Some(entry) = group.program.entries.iter().find(|e| e.duration <= Duration::zero()) {
            return Err(ConvertError::MalformedInput(format!(
                "signal group '{}' shows '{}' for {}s in intersection '{}'",
                group.id,
                entry.symbol,
                format_seconds(entry.duration),
                intersection.label()
            )));
        }
    }

    let expected = first.program.cycle_length();
    if let Some(group) = intersection
        .groups
        .iter()
        .find(|g| g.program.cycle_length() != expected)
    {
        return Err(ConvertError::CycleLengthMismatch {
            intersection: intersection.label(),
            group: group.id.clone(),
            expected: format_seconds(expected),
            found: format_seconds(group.program.cycle_length()),
        });
    }
    Ok(expected)
}

/// Build the merged phase sequence of one intersection
///
/// The result covers exactly one cycle, never has two adjacent phases with
/// the same state, and has one state character per connection index.
///
/// # Errors
/// `CycleLengthMismatch` if the groups disagree on the cycle length,
/// `UnknownStateSymbol` for OCIT states without a SUMO equivalent,
/// `MalformedInput` for empty programs or entries without a positive
/// duration, and `InternalConsistency` if a connection index is left
/// without a state
pub fn synthesize(
    intersection: &Intersection,
    options: &ConvertOptions,
) -> Result<Vec<MergedPhase>, ConvertError> {
    let label = intersection.label();
    let cycle_length = shared_cycle_length(intersection)?;
    let tolerance = if options.cut_tolerance < cycle_length {
        options.cut_tolerance
    } else {
        Duration::zero()
    };

    let timeline = Timeline::new(
        intersection.groups.iter().flat_map(|g| g.program.breakpoints()),
        cycle_length,
        tolerance,
    );

    let programs = intersection
        .groups
        .iter()
        .map(|group| {
            let states = resolve_states(group, &label)?;
            let starts = std::iter::once(Duration::zero())
                .chain(group.program.breakpoints().into_iter().map(|p| timeline.snap(p)))
                .collect();
            Ok(ResolvedProgram { group, starts, states })
        })
        .collect::<Result<Vec<_>, ConvertError>>()?;

    let connection_count = intersection.connection_count();
    let cuts = timeline.cuts();
    let mut phases: Vec<MergedPhase> = Vec::new();

    for window in cuts.windows(2) {
        let (start, end) = (window[0], window[1]);
        let mut slots: Vec<Option<char>> = vec![None; connection_count];
        for program in &programs {
            let state = program.state_at(start);
            for &index in &program.group.indices {
                let state = if options.minor_indices.contains(&index) {
                    state.as_minor()
                } else {
                    state
                };
                slots[index] = Some(state.as_char());
            }
        }

        let state = slots
            .iter()
            .enumerate()
            .map(|(index, slot)| {
                slot.ok_or_else(|| ConvertError::InternalConsistency {
                    intersection: label.clone(),
                    detail: format!("connection index {index} has no signal group"),
                })
            })
            .collect::<Result<String, ConvertError>>()?;

        match phases.last_mut() {
            Some(last) if last.state == state => last.duration += end - start,
            _ => phases.push(MergedPhase::new(end - start, state)),
        }
    }

    log::debug!(
        "Intersection {label}: {} cut points merged into {} phases",
        cuts.len(),
        phases.len()
    );

    Ok(phases)
}
