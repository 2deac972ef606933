//! Synthesizing passing times from a ruler.

use tracing::{debug, warn};

use crate::domain::{ClockTime, Corridor, Direction, Ruler, Stop, StopId, Train, round_to};

use super::binder::Binder;
use super::config::InterpolationConfig;
use super::segment::{Binding, ResolvedStop, Segment};

/// Note attached to every synthesized row.
pub const INTERPOLATED_NOTE: &str = "interpolated";

/// Rows to splice in next to an existing row, in running order.
#[derive(Debug)]
struct Insertion {
    anchor: StopId,
    before: bool,
    stops: Vec<Stop>,
}

impl Binder<'_> {
    /// Insert passing rows for corridor stations the train runs through
    /// without listing.
    ///
    /// The train is bound fresh first; only stations between two rows of the
    /// same segment are filled, plus the stretches to the corridor ends when
    /// `config` asks for them. A gap whose ruler span is missing or zero is
    /// left alone. Returns the number of inserted rows. Existing bindings on
    /// the train go stale; the caller rebinds.
    pub fn interpolate(
        &self,
        train: &mut Train,
        corridor: &Corridor,
        ruler: Option<&Ruler>,
        config: &InterpolationConfig,
    ) -> usize {
        let Some(ruler) = ruler else {
            debug!(train = %train.name, corridor = %corridor.name, "no ruler, nothing to interpolate");
            return 0;
        };
        let Some(binding) = self.bind(train, corridor) else {
            return 0;
        };

        let plan = plan_insertions(&binding, train, corridor, ruler, config);
        let timetable = train.timetable_mut();
        let mut inserted = 0;
        for insertion in plan {
            let Some(index) = timetable.position_of(insertion.anchor) else {
                warn!(stop = %insertion.anchor, "interpolation anchor vanished");
                continue;
            };
            let at = if insertion.before { index } else { index + 1 };
            for (offset, stop) in insertion.stops.into_iter().enumerate() {
                timetable.insert(at + offset, stop);
                inserted += 1;
            }
        }
        debug!(train = %train.name, corridor = %corridor.name, inserted, "interpolated");
        inserted
    }
}

fn plan_insertions(
    binding: &Binding,
    train: &Train,
    corridor: &Corridor,
    ruler: &Ruler,
    config: &InterpolationConfig,
) -> Vec<Insertion> {
    let timetable = train.timetable();
    let prec = config.precision_secs;
    let mut plan = Vec::new();

    for segment in binding.segments() {
        let dir = segment.direction();
        for pair in segment.stops().windows(2) {
            let (Some(a), Some(b)) = (
                pair[0].resolve(timetable, corridor),
                pair[1].resolve(timetable, corridor),
            ) else {
                continue;
            };
            if a.position.abs_diff(b.position) < 2 {
                continue;
            }
            if let Some(stops) = fill_gap(&a, &b, dir, corridor, ruler, prec) {
                plan.push(Insertion {
                    anchor: b.stop.id(),
                    before: true,
                    stops,
                });
            }
        }
    }

    if config.to_corridor_start
        && let Some(first) = binding.segments().first()
        && let Some(stops) = extend_back(first, train, corridor, ruler)
    {
        plan.push(stops);
    }
    if config.to_corridor_end
        && let Some(last) = binding.segments().last()
        && let Some(stops) = extend_forward(last, train, corridor, ruler)
    {
        plan.push(stops);
    }
    plan
}

/// Positions strictly between `from` and `to`, in running order.
fn between(from: usize, to: usize) -> Vec<usize> {
    if from < to {
        (from + 1..to).collect()
    } else {
        (to + 1..from).rev().collect()
    }
}

fn fill_gap(
    a: &ResolvedStop<'_>,
    b: &ResolvedStop<'_>,
    dir: Direction,
    corridor: &Corridor,
    ruler: &Ruler,
    prec: i64,
) -> Option<Vec<Stop>> {
    let total = ruler.span_secs(corridor, a.position, b.position)?;
    if total <= 0 {
        debug!(from = %a.stop.name, to = %b.stop.name, "zero ruler span, gap left open");
        return None;
    }
    let elapsed = a.depart.departure.secs_to(b.stop.arrival) as f64;
    let mut stops = Vec::new();
    for pos in between(a.position, b.position) {
        let station = &corridor.stations()[pos];
        if !station.passability.accepts(dir) {
            continue;
        }
        let part = ruler.span_secs(corridor, a.position, pos)?;
        let offset = round_to(elapsed * part as f64 / total as f64, prec);
        stops.push(passing(station.name.clone(), a.depart.departure.add_secs(offset)));
    }
    Some(stops)
}

fn extend_back(
    segment: &Segment,
    train: &Train,
    corridor: &Corridor,
    ruler: &Ruler,
) -> Option<Insertion> {
    if segment.len() < 2 {
        return None;
    }
    let anchor = segment.first()?.resolve(train.timetable(), corridor)?;
    let dir = segment.direction();
    let boundary = match dir {
        Direction::Down => 0,
        Direction::Up => corridor.len().checked_sub(1)?,
    };
    if boundary == anchor.position {
        return None;
    }
    let mut positions = between(anchor.position, boundary);
    positions.push(boundary);
    // running order is boundary first
    positions.reverse();

    let mut stops = Vec::new();
    for pos in positions {
        let station = &corridor.stations()[pos];
        if !station.passability.accepts(dir) {
            continue;
        }
        let span = ruler.span_secs(corridor, pos, anchor.position)?;
        stops.push(passing(station.name.clone(), anchor.stop.arrival.add_secs(-span)));
    }
    Some(Insertion {
        anchor: anchor.stop.id(),
        before: true,
        stops,
    })
}

fn extend_forward(
    segment: &Segment,
    train: &Train,
    corridor: &Corridor,
    ruler: &Ruler,
) -> Option<Insertion> {
    if segment.len() < 2 {
        return None;
    }
    let anchor = segment.last()?.resolve(train.timetable(), corridor)?;
    let dir = segment.direction();
    let boundary = match dir {
        Direction::Down => corridor.len().checked_sub(1)?,
        Direction::Up => 0,
    };
    if boundary == anchor.position {
        return None;
    }
    let mut positions = between(anchor.position, boundary);
    positions.push(boundary);

    let mut stops = Vec::new();
    for pos in positions {
        let station = &corridor.stations()[pos];
        if !station.passability.accepts(dir) {
            continue;
        }
        let span = ruler.span_secs(corridor, anchor.position, pos)?;
        stops.push(passing(station.name.clone(), anchor.depart.departure.add_secs(span)));
    }
    Some(Insertion {
        anchor: anchor.depart.id(),
        before: false,
        stops,
    })
}

fn passing(name: crate::domain::StopName, time: ClockTime) -> Stop {
    Stop::passing(name, time).with_note(INTERPOLATED_NOTE)
}

/// Mean relative deviation of scheduled run times from the ruler.
///
/// Compares every consecutive matched pair whose ruler span is known and
/// non-zero. `None` if there is no such pair.
pub fn relative_error(
    binding: &Binding,
    train: &Train,
    corridor: &Corridor,
    ruler: &Ruler,
) -> Option<f64> {
    let timetable = train.timetable();
    let mut total = 0.0;
    let mut count = 0usize;
    for segment in binding.segments() {
        for pair in segment.stops().windows(2) {
            let (Some(a), Some(b)) = (
                pair[0].resolve(timetable, corridor),
                pair[1].resolve(timetable, corridor),
            ) else {
                continue;
            };
            let Some(reference) = ruler.span_secs(corridor, a.position, b.position) else {
                continue;
            };
            if reference == 0 {
                continue;
            }
            let actual = a.depart.departure.secs_to(b.stop.arrival);
            total += (actual - reference).abs() as f64 / reference as f64;
            count += 1;
        }
    }
    (count > 0).then(|| total / count as f64)
}
