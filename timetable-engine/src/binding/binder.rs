//! Matching a timetable against a corridor.
//!
//! The binder walks the train's rows in order and resolves each against the
//! corridor. Matched rows accumulate into an open segment whose direction is
//! fixed by its second row; a row that does not resolve, a station that
//! refuses the running direction, a reversal, or a jump past too many
//! stations closes the segment.

use tracing::{debug, trace};

use crate::domain::{Corridor, Direction, Train};

use super::config::BindConfig;
use super::segment::{Binding, Segment, SegmentStop};

/// Builds bindings from trains and corridors under one configuration.
#[derive(Debug, Clone, Copy)]
pub struct Binder<'a> {
    config: &'a BindConfig,
}

/// Segment under construction.
#[derive(Debug, Default)]
struct OpenSegment {
    stops: Vec<SegmentStop>,
    direction: Option<Direction>,
}

impl OpenSegment {
    fn restart_from(stop: SegmentStop) -> Self {
        Self {
            stops: vec![stop],
            direction: None,
        }
    }
}

impl<'a> Binder<'a> {
    pub fn new(config: &'a BindConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BindConfig {
        self.config
    }

    /// Match `train` against `corridor`.
    ///
    /// Returns `None` when no segment survives; absence means "not
    /// applicable", never "empty". The result depends only on the inputs,
    /// so binding twice gives equal results.
    pub fn bind(&self, train: &Train, corridor: &Corridor) -> Option<Binding> {
        let mut segments = Vec::new();
        let mut open = OpenSegment::default();

        for (index, stop) in train.timetable().iter().enumerate() {
            let Some(pos) = corridor.locate(&stop.name) else {
                trace!(train = %train.name, stop = %stop.name, "row not on corridor");
                self.commit(&mut open, &mut segments);
                continue;
            };
            let passability = corridor.stations()[pos].passability;
            if !passability.any() {
                self.commit(&mut open, &mut segments);
                continue;
            }
            let entry = SegmentStop::new(stop.id(), index, corridor.stations()[pos].id(), pos);

            let Some(last) = open.stops.last().copied() else {
                open.stops.push(entry);
                continue;
            };
            let Some(step) = Direction::between(last.position, pos) else {
                // same station on consecutive rows: the train leaves from the later one
                if let Some(tail) = open.stops.last_mut() {
                    tail.depart_from(stop.id(), index);
                }
                continue;
            };

            if let Some(max) = self.config.max_passed_stations
                && last.position.abs_diff(pos) - 1 > max
            {
                self.commit(&mut open, &mut segments);
                open.stops.push(entry);
                continue;
            }

            if open.direction.is_some_and(|dir| dir != step) {
                // turnaround: the last row closes this segment and opens the next
                self.commit(&mut open, &mut segments);
                open = OpenSegment::restart_from(last);
            }

            if open.direction.is_none() {
                let head = corridor.stations()[open.stops[0].position].passability;
                if !head.accepts(step) {
                    // the lone row cannot run this way; start over from here
                    open = OpenSegment::restart_from(entry);
                    continue;
                }
            }

            if !passability.accepts(step) {
                self.commit(&mut open, &mut segments);
                continue;
            }

            open.direction = Some(step);
            open.stops.push(entry);
        }
        self.commit(&mut open, &mut segments);

        debug!(
            train = %train.name,
            corridor = %corridor.name,
            segments = segments.len(),
            "bound train"
        );
        Binding::new(train.id(), train.timetable(), corridor, segments)
    }

    fn commit(&self, open: &mut OpenSegment, segments: &mut Vec<Segment>) {
        let done = std::mem::take(open);
        if done.stops.is_empty() || done.stops.len() < self.config.min_segment_stops {
            return;
        }
        let direction = done.direction.unwrap_or(Direction::Down);
        segments.push(Segment::new(direction, done.stops));
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{ClockTime, CorridorStation, Passability, Stop, Timetable};

    fn t(s: &str) -> ClockTime {
        ClockTime::parse(s).unwrap()
    }

    fn corridor(names: &[&str]) -> Corridor {
        Corridor::with_stations(
            "Main",
            names
                .iter()
                .enumerate()
                .map(|(i, n)| CorridorStation::new(*n, i as f64 * 10.0)),
        )
    }

    fn train(rows: &[(&str, &str, &str)]) -> Train {
        Train::with_timetable(
            "T1",
            rows.iter()
                .map(|(n, a, d)| Stop::new(*n, t(a), t(d)))
                .collect::<Timetable>(),
        )
    }

    fn positions(binding: &Binding) -> Vec<(Direction, Vec<usize>)> {
        binding
            .segments()
            .iter()
            .map(|s| (s.direction(), s.stops().iter().map(|e| e.position).collect()))
            .collect()
    }

    #[test]
    fn simple_down_run() {
        let c = corridor(&["A", "B", "C", "D"]);
        let tr = train(&[
            ("A", "08:00", "08:00"),
            ("B", "08:30", "08:31"),
            ("D", "09:10", "09:10"),
        ]);
        let config = BindConfig::default();
        let binding = Binder::new(&config).bind(&tr, &c).unwrap();
        assert_eq!(positions(&binding), vec![(Direction::Down, vec![0, 1, 3])]);
        assert!(binding.is_current(tr.timetable(), &c));
    }

    #[test]
    fn up_run() {
        let c = corridor(&["A", "B", "C"]);
        let tr = train(&[("C", "08:00", "08:00"), ("A", "08:30", "08:30")]);
        let config = BindConfig::default();
        let binding = Binder::new(&config).bind(&tr, &c).unwrap();
        assert_eq!(positions(&binding), vec![(Direction::Up, vec![2, 0])]);
    }

    #[test]
    fn no_match_means_no_binding() {
        let c = corridor(&["A", "B"]);
        let tr = train(&[("X", "08:00", "08:00"), ("Y", "08:30", "08:30")]);
        let config = BindConfig::default();
        assert!(Binder::new(&config).bind(&tr, &c).is_none());
    }

    #[test]
    fn reversal_splits_at_turnaround() {
        let c = corridor(&["A", "B", "C"]);
        let tr = train(&[
            ("A", "08:00", "08:00"),
            ("B", "08:10", "08:10"),
            ("C", "08:20", "08:40"),
            ("B", "08:50", "08:50"),
            ("A", "09:00", "09:00"),
        ]);
        let config = BindConfig::default();
        let binding = Binder::new(&config).bind(&tr, &c).unwrap();
        assert_eq!(
            positions(&binding),
            vec![
                (Direction::Down, vec![0, 1, 2]),
                (Direction::Up, vec![2, 1, 0]),
            ]
        );
        // the turnaround row is shared
        let segs = binding.segments();
        assert_eq!(segs[0].last().unwrap().stop, segs[1].first().unwrap().stop);
    }

    #[test]
    fn leaving_and_reentering_gives_two_segments() {
        let c = corridor(&["A", "B", "C", "D"]);
        let tr = train(&[
            ("A", "08:00", "08:00"),
            ("B", "08:10", "08:10"),
            ("X", "08:20", "08:20"),
            ("C", "08:30", "08:30"),
            ("D", "08:40", "08:40"),
        ]);
        let config = BindConfig::default();
        let binding = Binder::new(&config).bind(&tr, &c).unwrap();
        assert_eq!(
            positions(&binding),
            vec![(Direction::Down, vec![0, 1]), (Direction::Down, vec![2, 3])]
        );
    }

    #[test]
    fn group_member_binds_to_group_station() {
        let c = corridor(&["A", "B", "C"]);
        let tr = train(&[("A::East", "08:00", "08:00"), ("C", "08:30", "08:30")]);
        let config = BindConfig::default();
        let binding = Binder::new(&config).bind(&tr, &c).unwrap();
        assert_eq!(positions(&binding), vec![(Direction::Down, vec![0, 2])]);
    }

    #[test]
    fn repeated_station_rows_merge() {
        let c = corridor(&["A", "B", "C"]);
        let tr = train(&[
            ("A", "08:00", "08:00"),
            ("B::x", "08:10", "08:10"),
            ("B", "08:12", "08:15"),
            ("C", "08:30", "08:30"),
        ]);
        let config = BindConfig::default();
        let binding = Binder::new(&config).bind(&tr, &c).unwrap();
        assert_eq!(positions(&binding), vec![(Direction::Down, vec![0, 1, 2])]);

        // arrive on the first B row, leave from the second
        let entry = binding.segments()[0].stops()[1];
        assert_eq!((entry.stop_hint, entry.depart_hint), (1, 2));
        let row = entry.resolve(tr.timetable(), &c).unwrap();
        assert_eq!(row.stop.arrival, t("08:10"));
        assert_eq!(row.depart.departure, t("08:15"));
    }

    #[test]
    fn max_passed_stations_splits() {
        let c = corridor(&["A", "B", "C", "D", "E"]);
        let tr = train(&[("A", "08:00", "08:00"), ("E", "09:00", "09:00")]);
        let config = BindConfig::new(Some(2), 1);
        let binding = Binder::new(&config).bind(&tr, &c).unwrap();
        assert_eq!(
            positions(&binding),
            vec![(Direction::Down, vec![0]), (Direction::Down, vec![4])]
        );

        let config = BindConfig::new(Some(3), 1);
        let binding = Binder::new(&config).bind(&tr, &c).unwrap();
        assert_eq!(positions(&binding), vec![(Direction::Down, vec![0, 4])]);
    }

    #[test]
    fn min_segment_stops_drops_short_segments() {
        let c = corridor(&["A", "B", "C"]);
        let tr = train(&[("X", "08:00", "08:00"), ("B", "08:10", "08:10")]);
        let config = BindConfig::new(None, 2);
        assert!(Binder::new(&config).bind(&tr, &c).is_none());
        let config = BindConfig::default();
        assert!(Binder::new(&config).bind(&tr, &c).is_some());
    }

    #[test]
    fn one_way_station_refuses_wrong_direction() {
        let mut c = corridor(&["A", "B", "C", "D"]);
        c.update_station(2, |s| s.passability = Passability::DownOnly);
        let tr = train(&[
            ("D", "08:00", "08:00"),
            ("C", "08:10", "08:10"),
            ("B", "08:20", "08:20"),
            ("A", "08:30", "08:30"),
        ]);
        let config = BindConfig::default();
        let binding = Binder::new(&config).bind(&tr, &c).unwrap();
        // C refuses Up: D is left on its own and the run resumes at B
        assert_eq!(
            positions(&binding),
            vec![(Direction::Down, vec![3]), (Direction::Up, vec![1, 0])]
        );
    }

    #[test]
    fn binding_twice_is_identical() {
        let c = corridor(&["A", "B", "C", "D"]);
        let tr = train(&[
            ("A", "08:00", "08:00"),
            ("C", "08:20", "08:22"),
            ("B", "08:40", "08:40"),
        ]);
        let config = BindConfig::default();
        let binder = Binder::new(&config);
        assert_eq!(binder.bind(&tr, &c), binder.bind(&tr, &c));
    }
}
