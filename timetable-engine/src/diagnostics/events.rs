//! Event lists derived from bindings.
//!
//! Diagnostics work from the events and interval runs produced here rather
//! than from timetables.

use crate::binding::{Binding, ResolvedStop};
use crate::diagram::Diagram;
use crate::domain::{ClockTime, Corridor, Direction, Stop, Train, round_to};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    Arrive,
    Depart,
    Pass,
}

/// A train being at a corridor station at a time.
#[derive(Debug, Clone, Copy)]
pub struct BindingEvent<'a> {
    pub train: &'a Train,
    /// Row the event comes from: the arrival row for `Arrive` and `Pass`,
    /// the departure row for `Depart`
    pub stop: &'a Stop,
    pub kind: EventKind,
    pub time: ClockTime,
    pub position: usize,
    pub mileage: f64,
    pub direction: Direction,
    /// Index of the unbroken stretch of corridor running this event is on.
    /// Segments joined at a turnaround share a stretch; leaving the corridor
    /// starts a new one.
    pub stretch: usize,
}

/// Arrive, depart and pass events of one binding in running order.
///
/// A turnaround row shared by two segments is reported once. Returns nothing
/// if the binding's train or corridor is not in the diagram.
pub fn binding_events<'a>(diagram: &'a Diagram, binding: &'a Binding) -> Vec<BindingEvent<'a>> {
    let (Some(train), Some(corridor)) = (
        diagram.train(binding.train()),
        diagram.corridor(binding.corridor()),
    ) else {
        return Vec::new();
    };
    let mut events = Vec::new();
    let mut last_stop = None;
    let mut stretch = 0;
    for (index, segment) in binding.segments().iter().enumerate() {
        let joined = segment
            .first()
            .is_some_and(|head| last_stop == Some(head.stop));
        if index > 0 && !joined {
            stretch += 1;
        }
        for entry in segment.stops() {
            if last_stop == Some(entry.stop) {
                continue;
            }
            last_stop = Some(entry.stop);
            let Some(row) = entry.resolve(train.timetable(), corridor) else {
                continue;
            };
            let event = |kind, stop: &'a Stop, time| BindingEvent {
                train,
                stop,
                kind,
                time,
                position: row.position,
                mileage: row.station.mileage,
                direction: segment.direction(),
                stretch,
            };
            if row.is_dwelling() {
                events.push(event(EventKind::Arrive, row.stop, row.stop.arrival));
                events.push(event(EventKind::Depart, row.depart, row.depart.departure));
            } else {
                events.push(event(EventKind::Pass, row.stop, row.stop.arrival));
            }
        }
    }
    events
}

/// A train occupying one adjacent interval of a corridor.
#[derive(Debug, Clone, Copy)]
pub struct IntervalRun<'a> {
    pub train: &'a Train,
    pub lower: usize,
    pub direction: Direction,
    pub enter: ClockTime,
    pub leave: ClockTime,
}

/// Adjacent-interval occupations of one binding, in running order.
pub fn interval_runs<'a>(
    train: &'a Train,
    binding: &Binding,
    corridor: &Corridor,
) -> Vec<IntervalRun<'a>> {
    let timetable = train.timetable();
    let mut runs = Vec::new();
    for segment in binding.segments() {
        let direction = segment.direction();
        for pair in segment.stops().windows(2) {
            let (Some(a), Some(b)) = (
                pair[0].resolve(timetable, corridor),
                pair[1].resolve(timetable, corridor),
            ) else {
                continue;
            };
            split_run(train, &a, &b, direction, corridor, &mut runs);
        }
    }
    runs
}

fn split_run<'a>(
    train: &'a Train,
    a: &ResolvedStop<'_>,
    b: &ResolvedStop<'_>,
    direction: Direction,
    corridor: &Corridor,
    runs: &mut Vec<IntervalRun<'a>>,
) {
    let depart = a.depart.departure;
    let elapsed = depart.secs_to(b.stop.arrival) as f64;
    let steps = a.position.abs_diff(b.position);
    let total_km = (b.station.mileage - a.station.mileage).abs();
    let stations = corridor.stations();

    // fraction of the run completed on reaching position `pos`
    let fraction = |pos: usize, step: usize| {
        if total_km > 0.0 {
            (stations[pos].mileage - a.station.mileage).abs() / total_km
        } else {
            step as f64 / steps as f64
        }
    };

    let mut from = a.position;
    let mut enter = depart;
    for step in 1..=steps {
        let to = match direction {
            Direction::Down => a.position + step,
            Direction::Up => a.position - step,
        };
        let leave = if step == steps {
            b.stop.arrival
        } else {
            depart.add_secs(round_to(elapsed * fraction(to, step), 1))
        };
        runs.push(IntervalRun {
            train,
            lower: from.min(to),
            direction,
            enter,
            leave,
        });
        from = to;
        enter = leave;
    }
}
