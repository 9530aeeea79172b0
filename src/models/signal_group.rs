use chrono::Duration;
use super::StateSymbol;

const YELLOW: &str = "gelb";
const RED_YELLOW: &str = "rotgelb";

/// One entry of a signal group's cycle: the raw OCIT state and how long it is shown
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TimedState {
    pub symbol: String,
    pub duration: Duration,
}

impl TimedState {
    #[must_use]
    pub fn new(symbol: impl Into<String>, duration: Duration) -> Self {
        Self {
            symbol: symbol.into(),
            duration,
        }
    }
}

/// Ordered sequence of timed states covering one full cycle, starting at second 0
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StateProgram {
    pub entries: Vec<TimedState>,
}

impl StateProgram {
    #[must_use]
    pub fn new(entries: Vec<TimedState>) -> Self {
        Self { entries }
    }

    /// Sum of all entry durations
    #[must_use]
    pub fn cycle_length(&self) -> Duration {
        self.entries
            .iter()
            .fold(Duration::zero(), |acc, entry| acc + entry.duration)
    }

    /// Start offsets of every entry after the first, i.e. the instants where the state changes
    #[must_use]
    pub fn breakpoints(&self) -> Vec<Duration> {
        let mut elapsed = Duration::zero();
        let mut points = Vec::with_capacity(self.entries.len().saturating_sub(1));
        for entry in self.entries.iter().take(self.entries.len().saturating_sub(1)) {
            elapsed += entry.duration;
            points.push(elapsed);
        }
        points
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Insert the transition intervals of a signal group
    ///
    /// Yellow is shown for `yellow` after every switch from green to a
    /// non-green state, red-yellow for `red_yellow` before every switch to
    /// green. Both wrap around the cycle end and only ever replace
    /// non-green time; yellow wins where the two would overlap.
    #[must_use]
    pub fn with_transitions(&self, red_yellow: Duration, yellow: Duration) -> Self {
        let green: Vec<bool> = self
            .entries
            .iter()
            .map(|e| StateSymbol::from_ocit(&e.symbol) == Some(StateSymbol::Green))
            .collect();
        let no_transitions = red_yellow <= Duration::zero() && yellow <= Duration::zero();
        if no_transitions || green.iter().all(|&g| g) || !green.iter().any(|&g| g) {
            return self.clone();
        }

        let cycle = self.cycle_length();
        let mut pieces = Vec::with_capacity(self.entries.len());
        let mut elapsed = Duration::zero();
        for entry in &self.entries {
            pieces.push((elapsed, elapsed + entry.duration, entry.symbol.clone()));
            elapsed += entry.duration;
        }

        let count = self.entries.len();
        let mut overlays = Vec::new();
        for i in 0..count {
            let next = (i + 1) % count;
            if !green[i] || green[next] {
                continue;
            }
            // Non-green run between this green and the next one
            let run_start = pieces[next].0;
            let mut run_length = Duration::zero();
            let mut j = next;
            while !green[j] {
                run_length += self.entries[j].duration;
                j = (j + 1) % count;
            }
            let yellow_length = yellow.clamp(Duration::zero(), run_length);
            let red_yellow_length = red_yellow.clamp(Duration::zero(), run_length - yellow_length);
            overlays.push((run_start, yellow_length, YELLOW));
            overlays.push((run_start + run_length - red_yellow_length, red_yellow_length, RED_YELLOW));
        }

        for (start, length, symbol) in overlays {
            if length <= Duration::zero() {
                continue;
            }
            let start = if start >= cycle { start - cycle } else { start };
            let end = start + length;
            if end > cycle {
                paint(&mut pieces, start, cycle, symbol);
                paint(&mut pieces, Duration::zero(), end - cycle, symbol);
            } else {
                paint(&mut pieces, start, end, symbol);
            }
        }

        let mut entries: Vec<TimedState> = Vec::with_capacity(pieces.len());
        for (start, end, symbol) in pieces {
            match entries.last_mut() {
                Some(last) if last.symbol == symbol => last.duration += end - start,
                _ => entries.push(TimedState::new(symbol, end - start)),
            }
        }
        Self { entries }
    }
}

/// Overwrite `[start, end)` of a piecewise program with `symbol`
fn paint(pieces: &mut Vec<(Duration, Duration, String)>, start: Duration, end: Duration, symbol: &str) {
    let mut painted = Vec::with_capacity(pieces.len() + 2);
    for (piece_start, piece_end, piece_symbol) in pieces.drain(..) {
        if piece_end <= start || piece_start >= end {
            painted.push((piece_start, piece_end, piece_symbol));
            continue;
        }
        if piece_start < start {
            painted.push((piece_start, start, piece_symbol.clone()));
        }
        painted.push((piece_start.max(start), piece_end.min(end), symbol.to_string()));
        if piece_end > end {
            painted.push((end, piece_end, piece_symbol));
        }
    }
    *pieces = painted;
}

/// Signal group whose connection index annotation has been resolved
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignalGroup {
    /// `BezeichnungKurz` of the OCIT `Signalgruppe`
    pub id: String,
    pub program: StateProgram,
    /// SUMO connection indices driven by this group, in annotation order
    pub indices: Vec<usize>,
}
