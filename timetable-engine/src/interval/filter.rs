//! Filters for interval queries.

use serde::{Deserialize, Serialize};

use crate::domain::{CorridorStation, PatternSet, PatternSpec, Stop, StopName, Train};

use super::info::IntervalTrainInfo;

/// Constraints on which runs an interval query reports.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct IntervalFilter {
    /// Each end must be a dwelling stop, or the run's origin or terminus.
    pub stop_only: bool,

    /// Each end must serve the public.
    pub business_only: bool,

    /// Aggregates only count stations handling passengers.
    pub passenger_station_only: bool,

    /// Aggregates only count stations handling freight.
    pub freight_station_only: bool,
}

impl IntervalFilter {
    /// Whether a station may appear as the far end in an aggregate.
    pub fn accepts_station(&self, station: &CorridorStation) -> bool {
        (!self.passenger_station_only || station.passenger)
            && (!self.freight_station_only || station.freight)
    }

    /// Whether one end of a run satisfies the stop and business constraints.
    ///
    /// `is_end` says whether the row is the origin (for a start) or the
    /// terminus (for an end).
    pub fn accepts_boundary(&self, stop: &Stop, is_end: bool) -> bool {
        (!self.stop_only || stop.is_dwelling() || is_end)
            && (!self.business_only || stop.serves_public)
    }

    /// Whether both ends of a run satisfy the constraints.
    pub fn accepts(&self, info: &IntervalTrainInfo<'_>) -> bool {
        self.accepts_boundary(info.from_stop, info.from_is_origin)
            && self.accepts_boundary(info.to_stop, info.to_is_terminus)
    }
}

/// Which trains a query looks at.
///
/// An empty filter accepts every train.
#[derive(Debug, Clone, Default)]
pub struct TrainFilter {
    kinds: Vec<String>,
    passenger_only: bool,
    names: Option<PatternSet>,
}

impl TrainFilter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Only accept trains of these kinds.
    pub fn with_kinds<I, S>(mut self, kinds: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.kinds = kinds.into_iter().map(Into::into).collect();
        self
    }

    pub fn passenger_only(mut self, on: bool) -> Self {
        self.passenger_only = on;
        self
    }

    /// Only accept trains whose name matches `spec`.
    pub fn with_names(mut self, spec: &PatternSpec) -> Self {
        self.names = Some(PatternSet::build(spec));
        self
    }

    pub fn accepts(&self, train: &Train) -> bool {
        if !self.kinds.is_empty() && !self.kinds.iter().any(|k| *k == train.kind) {
            return false;
        }
        if self.passenger_only && !train.passenger {
            return false;
        }
        match &self.names {
            Some(names) => names.matches(&StopName::parse(&train.name)),
            None => true,
        }
    }
}
