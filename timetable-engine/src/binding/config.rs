//! Configuration for binding and interpolation.

use serde::{Deserialize, Serialize};

/// Parameters that change how trains are matched against corridors.
///
/// Changing any of these invalidates every binding.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BindConfig {
    /// Largest number of corridor stations a train may skip between two
    /// consecutive matched rows before the segment is split. `None` means
    /// no limit.
    pub max_passed_stations: Option<usize>,

    /// Segments with fewer matched rows are not committed.
    pub min_segment_stops: usize,
}

impl BindConfig {
    pub fn new(max_passed_stations: Option<usize>, min_segment_stops: usize) -> Self {
        Self {
            max_passed_stations,
            min_segment_stops,
        }
    }
}

impl Default for BindConfig {
    fn default() -> Self {
        Self {
            max_passed_stations: None,
            min_segment_stops: 1,
        }
    }
}

/// Parameters for synthesizing times at stations a train does not list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpolationConfig {
    /// Extend backwards from the first matched row to the corridor boundary behind it.
    pub to_corridor_start: bool,

    /// Extend forwards from the last matched row to the corridor boundary ahead of it.
    pub to_corridor_end: bool,

    /// Synthesized times are rounded to a multiple of this many seconds.
    pub precision_secs: i64,
}

impl Default for InterpolationConfig {
    fn default() -> Self {
        Self {
            to_corridor_start: false,
            to_corridor_end: false,
            precision_secs: 1,
        }
    }
}
