//! Point-to-point train listings and per-station flow counts.
//!
//! All queries are read-only. An unknown corridor or station yields an empty
//! result, never an error.

use tracing::{debug, trace};

use crate::binding::{Binding, ResolvedStop, Segment};
use crate::diagram::Diagram;
use crate::domain::{Corridor, CorridorId, PatternSet, PatternSpec, StationId, Train};

use super::candidate::StartCandidate;
use super::filter::{IntervalFilter, TrainFilter};
use super::info::{IntervalCountMap, IntervalTrainInfo};

/// Interval queries over one diagram under fixed filters.
#[derive(Debug, Clone, Copy)]
pub struct IntervalCounter<'a> {
    diagram: &'a Diagram,
    filter: &'a IntervalFilter,
    trains: &'a TrainFilter,
}

impl<'a> IntervalCounter<'a> {
    pub fn new(diagram: &'a Diagram, filter: &'a IntervalFilter, trains: &'a TrainFilter) -> Self {
        Self {
            diagram,
            filter,
            trains,
        }
    }

    /// Accepted trains bound to `corridor`, with their bindings.
    fn bound_trains(
        &self,
        corridor: &'a Corridor,
    ) -> impl Iterator<Item = (&'a Train, &'a Binding)> + 'a {
        let diagram = self.diagram;
        let trains = self.trains;
        diagram
            .trains()
            .filter(move |train| trains.accepts(train))
            .filter_map(move |train| {
                let binding = diagram.binding(train.id(), corridor.id())?;
                Some((train, binding))
            })
    }

    fn lookup(&self, corridor: CorridorId, stations: &[StationId]) -> Option<&'a Corridor> {
        let Some(corr) = self.diagram.corridor(corridor) else {
            debug!(corridor = %corridor, "interval query on unknown corridor");
            return None;
        };
        if let Some(missing) = stations.iter().find(|id| corr.position_of(**id).is_none()) {
            debug!(corridor = %corr.name, station = %missing, "interval query on unknown station");
            return None;
        }
        Some(corr)
    }

    /// Trains running from `from` to `to` along `corridor`.
    ///
    /// Each segment is scanned on its own. The latest `from` station before
    /// a `to` station is the start. Runs leave from the last row listed at
    /// the start station and arrive on the first row listed at the end. A run
    /// is reported once it passes the stop and business constraints, and only
    /// then is the start consumed.
    pub fn interval_trains(
        &self,
        corridor: CorridorId,
        from: StationId,
        to: StationId,
    ) -> Vec<IntervalTrainInfo<'a>> {
        let Some(corr) = self.lookup(corridor, &[from, to]) else {
            return Vec::new();
        };
        let mut result = Vec::new();
        for (train, binding) in self.bound_trains(corr) {
            for segment in binding.segments() {
                let mut start = StartCandidate::None;
                for (index, row) in resolved(segment, train, corr) {
                    if row.station.id() == from {
                        start = StartCandidate::pending(row.depart, segment.is_origin(index), true);
                    } else if row.station.id() == to
                        && let Some((from_stop, from_is_origin)) = start.get()
                    {
                        let info = IntervalTrainInfo {
                            train,
                            from_stop,
                            to_stop: row.stop,
                            from_is_origin,
                            to_is_terminus: segment.is_terminus(index),
                        };
                        if self.filter.accepts(&info) {
                            result.push(info);
                            start.clear();
                        }
                    }
                }
            }
        }
        debug!(corridor = %corr.name, trains = result.len(), "interval trains");
        result
    }

    /// Trains running between rows matching `from` and rows matching `to`,
    /// on any corridor or none.
    ///
    /// Works on raw timetables. A row matching both sides counts as a start.
    /// Origin and terminus are the first and last rows of the timetable.
    pub fn interval_trains_by_name(
        &self,
        from: &PatternSpec,
        to: &PatternSpec,
    ) -> Vec<IntervalTrainInfo<'a>> {
        let from_set = PatternSet::build(from);
        let to_set = PatternSet::build(to);
        if from_set.is_empty() || to_set.is_empty() {
            debug!(from = %from.input, to = %to.input, "no usable patterns");
            return Vec::new();
        }

        let mut result = Vec::new();
        let trains = self.trains;
        for train in self.diagram.trains().filter(|t| trains.accepts(t)) {
            let timetable = train.timetable();
            let mut start = StartCandidate::None;
            for row in timetable.iter() {
                if from_set.matches(&row.name) {
                    let is_origin = timetable.is_origin(&row.name);
                    let qualifies = self.filter.accepts_boundary(row, is_origin);
                    start.offer(row, is_origin, qualifies);
                } else if to_set.matches(&row.name)
                    && let Some((from_stop, from_is_origin)) = start.get()
                {
                    let info = IntervalTrainInfo {
                        train,
                        from_stop,
                        to_stop: row,
                        from_is_origin,
                        to_is_terminus: timetable.is_terminus(&row.name),
                    };
                    if self.filter.accepts(&info) {
                        result.push(info);
                        start.clear();
                    }
                }
            }
        }
        debug!(from = %from.input, to = %to.input, trains = result.len(), "interval trains by name");
        result
    }

    /// Runs starting at `center`, counted per station they reach afterwards.
    pub fn interval_count_source(
        &self,
        corridor: CorridorId,
        center: StationId,
    ) -> IntervalCountMap<'a> {
        let mut map = IntervalCountMap::default();
        let Some(corr) = self.lookup(corridor, &[center]) else {
            return map;
        };
        for (train, binding) in self.bound_trains(corr) {
            for segment in binding.segments() {
                let mut pivot = None;
                for (index, row) in resolved(segment, train, corr) {
                    if row.station.id() == center {
                        pivot = Some((row.depart, segment.is_origin(index)));
                        continue;
                    }
                    let Some((from_stop, from_is_origin)) = pivot else {
                        continue;
                    };
                    if !self.filter.accepts_station(row.station) {
                        continue;
                    }
                    let info = IntervalTrainInfo {
                        train,
                        from_stop,
                        to_stop: row.stop,
                        from_is_origin,
                        to_is_terminus: segment.is_terminus(index),
                    };
                    if self.filter.accepts(&info) {
                        map.add(row.station, row.position, info);
                    }
                }
            }
        }
        map.sort_by_position();
        debug!(corridor = %corr.name, stations = map.len(), total = map.total(), "source count");
        map
    }

    /// Runs ending at `drain`, counted per station they came from.
    pub fn interval_count_drain(
        &self,
        corridor: CorridorId,
        drain: StationId,
    ) -> IntervalCountMap<'a> {
        let mut map = IntervalCountMap::default();
        let Some(corr) = self.lookup(corridor, &[drain]) else {
            return map;
        };
        for (train, binding) in self.bound_trains(corr) {
            for segment in binding.segments().iter().rev() {
                let mut pivot = None;
                let rows: Vec<_> = resolved(segment, train, corr).collect();
                for (index, row) in rows.into_iter().rev() {
                    if row.station.id() == drain {
                        pivot = Some((row.stop, segment.is_terminus(index)));
                        continue;
                    }
                    let Some((to_stop, to_is_terminus)) = pivot else {
                        continue;
                    };
                    if !self.filter.accepts_station(row.station) {
                        continue;
                    }
                    let info = IntervalTrainInfo {
                        train,
                        from_stop: row.depart,
                        to_stop,
                        from_is_origin: segment.is_origin(index),
                        to_is_terminus,
                    };
                    if self.filter.accepts(&info) {
                        map.add(row.station, row.position, info);
                    }
                }
            }
        }
        map.sort_by_position();
        debug!(corridor = %corr.name, stations = map.len(), total = map.total(), "drain count");
        map
    }
}

/// Resolved rows of a segment with their index in it; rows that no longer
/// resolve are skipped.
fn resolved<'a>(
    segment: &'a Segment,
    train: &'a Train,
    corridor: &'a Corridor,
) -> impl Iterator<Item = (usize, ResolvedStop<'a>)> + 'a {
    segment
        .stops()
        .iter()
        .enumerate()
        .filter_map(move |(index, entry)| match entry.resolve(train.timetable(), corridor) {
            Some(row) => Some((index, row)),
            None => {
                trace!(train = %train.name, stop = %entry.stop, "dangling segment row");
                None
            }
        })
}
