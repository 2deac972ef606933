//! Interval query results.

use indexmap::IndexMap;

use crate::domain::{CorridorStation, StationId, Stop, StopName, Train, TrainId};

/// One train running from one row to a later row.
#[derive(Debug, Clone, Copy)]
pub struct IntervalTrainInfo<'a> {
    pub train: &'a Train,
    pub from_stop: &'a Stop,
    pub to_stop: &'a Stop,
    pub from_is_origin: bool,
    pub to_is_terminus: bool,
}

impl IntervalTrainInfo<'_> {
    pub fn train_id(&self) -> TrainId {
        self.train.id()
    }

    /// Scheduled seconds from departure at the start to arrival at the end.
    pub fn run_secs(&self) -> i64 {
        self.from_stop.departure.secs_to(self.to_stop.arrival)
    }
}

/// Runs between a pivot station and one other station.
#[derive(Debug, Clone)]
pub struct IntervalCount<'a> {
    pub station: &'a CorridorStation,
    pub position: usize,
    pub infos: Vec<IntervalTrainInfo<'a>>,
}

impl<'a> IntervalCount<'a> {
    pub fn count(&self) -> usize {
        self.infos.len()
    }

    pub fn add(&mut self, info: IntervalTrainInfo<'a>) {
        self.infos.push(info);
    }
}

/// Per-station aggregates, in corridor order.
#[derive(Debug, Clone, Default)]
pub struct IntervalCountMap<'a> {
    counts: IndexMap<StationId, IntervalCount<'a>>,
}

impl<'a> IntervalCountMap<'a> {
    pub(crate) fn add(
        &mut self,
        station: &'a CorridorStation,
        position: usize,
        info: IntervalTrainInfo<'a>,
    ) {
        self.counts
            .entry(station.id())
            .or_insert_with(|| IntervalCount {
                station,
                position,
                infos: Vec::new(),
            })
            .add(info);
    }

    pub(crate) fn sort_by_position(&mut self) {
        self.counts
            .sort_by(|_, a, _, b| a.position.cmp(&b.position));
    }

    pub fn get(&self, station: StationId) -> Option<&IntervalCount<'a>> {
        self.counts.get(&station)
    }

    /// Look a station up by its exact name.
    pub fn by_name(&self, name: &str) -> Option<&IntervalCount<'a>> {
        let name = StopName::parse(name);
        self.counts.values().find(|c| c.station.name == name)
    }

    /// Count for a station, zero if absent.
    pub fn count(&self, station: StationId) -> usize {
        self.get(station).map_or(0, IntervalCount::count)
    }

    pub fn iter(&self) -> impl Iterator<Item = &IntervalCount<'a>> {
        self.counts.values()
    }

    pub fn len(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Runs over all stations.
    pub fn total(&self) -> usize {
        self.counts.values().map(IntervalCount::count).sum()
    }
}
