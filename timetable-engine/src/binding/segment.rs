//! Segments and bindings: the derived match of a train against a corridor.

use crate::domain::{
    Corridor, CorridorId, CorridorStation, Direction, StationId, Stop, StopId, Timetable, TrainId,
};

/// One matched station: the timetable rows at it paired with a corridor station.
///
/// A station listed on consecutive rows (`B::x` then `B`) is one entry: the
/// train arrives on the first row and departs from the last. Both rows and
/// the station are held by id plus a position hint. Resolution checks the id,
/// so a hint that has gone stale falls back to a scan and a row that has
/// left the timetable resolves to nothing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SegmentStop {
    /// Row the train arrives on
    pub stop: StopId,
    /// Index of the stop in the timetable when the binding was built
    pub stop_hint: usize,
    /// Row the train departs from; equal to `stop` unless the station repeats
    pub depart_stop: StopId,
    pub depart_hint: usize,
    pub station: StationId,
    /// Corridor position of the station when the binding was built
    pub position: usize,
}

/// A resolved [`SegmentStop`].
#[derive(Debug, Clone, Copy)]
pub struct ResolvedStop<'a> {
    /// Arrival row
    pub stop: &'a Stop,
    pub stop_index: usize,
    /// Departure row
    pub depart: &'a Stop,
    pub depart_index: usize,
    pub station: &'a CorridorStation,
    pub position: usize,
}

impl SegmentStop {
    /// An entry for a single row at a station.
    pub fn new(stop: StopId, stop_hint: usize, station: StationId, position: usize) -> Self {
        Self {
            stop,
            stop_hint,
            depart_stop: stop,
            depart_hint: stop_hint,
            station,
            position,
        }
    }

    /// Make a later row at the same station the departure row.
    pub(crate) fn depart_from(&mut self, stop: StopId, hint: usize) {
        self.depart_stop = stop;
        self.depart_hint = hint;
    }

    /// Whether more than one row was merged into this entry.
    pub fn spans_rows(&self) -> bool {
        self.stop != self.depart_stop
    }

    /// Look both sides up again. `None` if the arrival row or the station
    /// has gone; a vanished departure row falls back to the arrival row.
    pub fn resolve<'a>(
        &self,
        timetable: &'a Timetable,
        corridor: &'a Corridor,
    ) -> Option<ResolvedStop<'a>> {
        let (stop_index, stop) = timetable.resolve(self.stop, self.stop_hint)?;
        let (depart_index, depart) = if self.spans_rows() {
            timetable
                .resolve(self.depart_stop, self.depart_hint)
                .unwrap_or((stop_index, stop))
        } else {
            (stop_index, stop)
        };
        let (position, station) = corridor.resolve(self.station, self.position)?;
        Some(ResolvedStop {
            stop,
            stop_index,
            depart,
            depart_index,
            station,
            position,
        })
    }
}

impl ResolvedStop<'_> {
    /// Seconds from arriving on the first row to leaving from the last.
    pub fn dwell_secs(&self) -> i64 {
        self.stop.arrival.secs_to(self.depart.departure)
    }

    pub fn is_dwelling(&self) -> bool {
        self.stop.arrival != self.depart.departure
    }
}

/// A maximal run of a train's stops matched in order against one corridor.
///
/// Corridor positions are strictly increasing for [`Direction::Down`] and
/// strictly decreasing for [`Direction::Up`]. A single-stop segment has no
/// movement to take a direction from and is tagged `Down`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    direction: Direction,
    stops: Vec<SegmentStop>,
}

impl Segment {
    pub(crate) fn new(direction: Direction, stops: Vec<SegmentStop>) -> Self {
        Self { direction, stops }
    }

    pub fn direction(&self) -> Direction {
        self.direction
    }

    pub fn stops(&self) -> &[SegmentStop] {
        &self.stops
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    pub fn first(&self) -> Option<&SegmentStop> {
        self.stops.first()
    }

    pub fn last(&self) -> Option<&SegmentStop> {
        self.stops.last()
    }

    /// Whether entry `index` is this segment's origin.
    pub fn is_origin(&self, index: usize) -> bool {
        index == 0 && !self.stops.is_empty()
    }

    /// Whether entry `index` is this segment's terminus.
    pub fn is_terminus(&self, index: usize) -> bool {
        index + 1 == self.stops.len()
    }

    /// Whether corridor positions move strictly in this segment's direction.
    pub fn is_monotonic(&self) -> bool {
        self.stops
            .windows(2)
            .all(|w| Direction::between(w[0].position, w[1].position) == Some(self.direction))
    }
}

/// All segments of one train against one corridor.
///
/// Never empty: a match that yields no segment produces no binding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Binding {
    train: TrainId,
    corridor: CorridorId,
    timetable_revision: u64,
    corridor_revision: u64,
    segments: Vec<Segment>,
}

impl Binding {
    /// Wrap segments into a binding, or `None` if there are none.
    pub(crate) fn new(
        train: TrainId,
        timetable: &Timetable,
        corridor: &Corridor,
        segments: Vec<Segment>,
    ) -> Option<Self> {
        if segments.is_empty() {
            return None;
        }
        Some(Self {
            train,
            corridor: corridor.id(),
            timetable_revision: timetable.revision(),
            corridor_revision: corridor.revision(),
            segments,
        })
    }

    pub fn train(&self) -> TrainId {
        self.train
    }

    pub fn corridor(&self) -> CorridorId {
        self.corridor
    }

    pub fn timetable_revision(&self) -> u64 {
        self.timetable_revision
    }

    pub fn corridor_revision(&self) -> u64 {
        self.corridor_revision
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    /// Whether this binding was built from exactly these inputs.
    pub fn is_current(&self, timetable: &Timetable, corridor: &Corridor) -> bool {
        self.corridor == corridor.id()
            && self.timetable_revision == timetable.revision()
            && self.corridor_revision == corridor.revision()
    }

    /// Number of matched stations over all segments.
    pub fn stop_count(&self) -> usize {
        self.segments.iter().map(Segment::len).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ClockTime;

    fn entry(position: usize) -> SegmentStop {
        SegmentStop::new(
            Stop::new("X", ClockTime::MIDNIGHT, ClockTime::MIDNIGHT).id(),
            0,
            CorridorStation::new("X", 0.0).id(),
            position,
        )
    }

    #[test]
    fn origin_and_terminus_flags() {
        let seg = Segment::new(Direction::Down, vec![entry(0), entry(1), entry(3)]);
        assert!(seg.is_origin(0));
        assert!(!seg.is_origin(1));
        assert!(seg.is_terminus(2));
        assert!(!seg.is_terminus(1));
    }

    #[test]
    fn monotonicity_check() {
        assert!(Segment::new(Direction::Down, vec![entry(0), entry(2), entry(3)]).is_monotonic());
        assert!(Segment::new(Direction::Up, vec![entry(3), entry(1)]).is_monotonic());
        assert!(!Segment::new(Direction::Down, vec![entry(0), entry(2), entry(1)]).is_monotonic());
        assert!(!Segment::new(Direction::Down, vec![entry(1), entry(1)]).is_monotonic());
    }

    #[test]
    fn repeated_station_resolves_both_rows() {
        let t = |s: &str| ClockTime::parse(s).unwrap();
        let corridor = Corridor::with_stations("Main", [CorridorStation::new("B", 0.0)]);
        let timetable = Timetable::from_stops([
            Stop::new("B::x", t("08:10"), t("08:10")),
            Stop::new("B", t("08:30"), t("08:40")),
        ]);
        let rows: Vec<_> = timetable.iter().map(Stop::id).collect();
        let mut entry = SegmentStop::new(rows[0], 0, corridor.stations()[0].id(), 0);
        entry.depart_from(rows[1], 1);
        assert!(entry.spans_rows());

        let row = entry.resolve(&timetable, &corridor).unwrap();
        assert_eq!(row.stop.arrival, t("08:10"));
        assert_eq!(row.depart.departure, t("08:40"));
        assert_eq!(row.depart_index, 1);
        assert_eq!(row.dwell_secs(), 30 * 60);
        assert!(row.is_dwelling());
    }

    #[test]
    fn empty_binding_is_not_built() {
        let timetable = Timetable::new();
        let corridor = Corridor::new("c");
        let train = crate::domain::Train::new("t");
        assert!(Binding::new(train.id(), &timetable, &corridor, vec![]).is_none());
    }
}
