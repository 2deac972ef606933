//! Reference run times between adjacent corridor stations.
//!
//! A ruler is the time profile a train "should" take along a corridor. It is
//! keyed by station identity, one entry per ordered adjacent pair, so the
//! two directions can differ.

use std::collections::HashMap;

use super::{Corridor, StationId};

/// Reference times for one directed adjacent interval.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RulerInterval {
    /// Pass-to-pass running time in seconds
    pub run_secs: i64,
    /// Extra time when starting from a stand at the interval's first station
    pub start_secs: i64,
    /// Extra time when stopping at the interval's last station
    pub stop_secs: i64,
}

impl RulerInterval {
    pub fn new(run_secs: i64) -> Self {
        Self {
            run_secs,
            start_secs: 0,
            stop_secs: 0,
        }
    }

    pub fn with_extras(mut self, start_secs: i64, stop_secs: i64) -> Self {
        self.start_secs = start_secs;
        self.stop_secs = stop_secs;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct Ruler {
    pub name: String,
    intervals: HashMap<(StationId, StationId), RulerInterval>,
}

impl Ruler {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            intervals: HashMap::new(),
        }
    }

    /// Set the reference time from `from` to `to`.
    pub fn set(&mut self, from: StationId, to: StationId, interval: RulerInterval) {
        self.intervals.insert((from, to), interval);
    }

    pub fn get(&self, from: StationId, to: StationId) -> Option<&RulerInterval> {
        self.intervals.get(&(from, to))
    }

    /// Set the same run time for every adjacent pair of a corridor, both ways.
    pub fn uniform(name: impl Into<String>, corridor: &Corridor, run_secs: i64) -> Self {
        let mut ruler = Self::new(name);
        for pair in corridor.stations().windows(2) {
            let (a, b) = (pair[0].id(), pair[1].id());
            ruler.set(a, b, RulerInterval::new(run_secs));
            ruler.set(b, a, RulerInterval::new(run_secs));
        }
        ruler
    }

    /// Cumulative pass-to-pass time from position `from` to position `to`.
    ///
    /// `None` if any adjacent interval on the way is missing or a position is
    /// out of range. Equal positions give zero.
    pub fn span_secs(&self, corridor: &Corridor, from: usize, to: usize) -> Option<i64> {
        let stations = corridor.stations();
        if from >= stations.len() || to >= stations.len() {
            return None;
        }
        let mut total = 0;
        if from <= to {
            for pos in from..to {
                total += self.get(stations[pos].id(), stations[pos + 1].id())?.run_secs;
            }
        } else {
            for pos in (to + 1..=from).rev() {
                total += self.get(stations[pos].id(), stations[pos - 1].id())?.run_secs;
            }
        }
        Some(total)
    }

    pub fn len(&self) -> usize {
        self.intervals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.intervals.is_empty()
    }
}
