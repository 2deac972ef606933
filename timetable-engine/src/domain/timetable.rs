//! Per-train ordered stop sequences.
//!
//! A `Timetable` is a double-ended queue of [`Stop`]s with a revision counter
//! that moves on every structural or content change. Join and interval
//! exchange move rows between timetables by splicing, so every row keeps
//! its [`StopId`].

use std::collections::VecDeque;
use std::ops::RangeInclusive;
use std::sync::atomic::{AtomicU64, Ordering};

use super::{DomainError, Stop, StopId, StopName};

/// Default overlap lookahead when joining timetables.
pub const DEFAULT_JOIN_DEPTH: usize = 10;

// Revisions are unique across all timetables, so a binding can never match a
// different timetable that happens to sit at the same count.
static NEXT_REVISION: AtomicU64 = AtomicU64::new(1);

fn next_revision() -> u64 {
    NEXT_REVISION.fetch_add(1, Ordering::Relaxed)
}

/// Which end of the receiving timetable the incoming rows go to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinSide {
    /// Incoming rows run before the receiving timetable.
    Prepend,
    /// Incoming rows run after the receiving timetable.
    Append,
}

/// An ordered, mutable list of stops owned by one train.
#[derive(Debug, Clone)]
pub struct Timetable {
    stops: VecDeque<Stop>,
    revision: u64,
}

impl Default for Timetable {
    fn default() -> Self {
        Self {
            stops: VecDeque::new(),
            revision: next_revision(),
        }
    }
}

impl Timetable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_stops(stops: impl IntoIterator<Item = Stop>) -> Self {
        Self {
            stops: stops.into_iter().collect(),
            revision: next_revision(),
        }
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// Counter bumped by every mutation; bindings compare it to detect staleness.
    pub fn revision(&self) -> u64 {
        self.revision
    }

    fn touch(&mut self) {
        self.revision = next_revision();
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &Stop> + ExactSizeIterator {
        self.stops.iter()
    }

    pub fn at(&self, index: usize) -> Option<&Stop> {
        self.stops.get(index)
    }

    /// Mutable access to a row. Counts as a mutation.
    pub fn at_mut(&mut self, index: usize) -> Option<&mut Stop> {
        self.touch();
        self.stops.get_mut(index)
    }

    pub fn first(&self) -> Option<&Stop> {
        self.stops.front()
    }

    pub fn last(&self) -> Option<&Stop> {
        self.stops.back()
    }

    pub fn push_back(&mut self, stop: Stop) {
        self.touch();
        self.stops.push_back(stop);
    }

    pub fn push_front(&mut self, stop: Stop) {
        self.touch();
        self.stops.push_front(stop);
    }

    /// Insert at `index`, shifting later rows back. Out-of-range appends.
    pub fn insert(&mut self, index: usize, stop: Stop) {
        self.touch();
        let index = index.min(self.stops.len());
        self.stops.insert(index, stop);
    }

    pub fn remove(&mut self, index: usize) -> Option<Stop> {
        self.touch();
        self.stops.remove(index)
    }

    /// Current position of a row.
    pub fn position_of(&self, id: StopId) -> Option<usize> {
        self.stops.iter().position(|s| s.id() == id)
    }

    /// Resolve a row by identity, trying `hint` first.
    ///
    /// Returns `None` if the row is no longer in this timetable.
    pub fn resolve(&self, id: StopId, hint: usize) -> Option<(usize, &Stop)> {
        match self.stops.get(hint) {
            Some(stop) if stop.id() == id => Some((hint, stop)),
            _ => {
                let index = self.position_of(id)?;
                Some((index, &self.stops[index]))
            }
        }
    }

    /// Index of the first row with exactly this name.
    pub fn find_first(&self, name: &StopName) -> Option<usize> {
        self.stops.iter().position(|s| &s.name == name)
    }

    /// Indices of all rows equal to or belonging to `name`.
    pub fn find_all_general(&self, name: &StopName) -> Vec<usize> {
        self.stops
            .iter()
            .enumerate()
            .filter(|(_, s)| s.name.equal_or_belongs_to(name))
            .map(|(i, _)| i)
            .collect()
    }

    /// Whether `name` is the train's first stop.
    pub fn is_origin(&self, name: &StopName) -> bool {
        self.first().is_some_and(|s| &s.name == name)
    }

    /// Whether `name` is the train's last stop.
    pub fn is_terminus(&self, name: &StopName) -> bool {
        self.last().is_some_and(|s| &s.name == name)
    }

    /// Shift every time by `secs`, wrapping past midnight.
    pub fn shift_all(&mut self, secs: i64) {
        self.touch();
        for stop in &mut self.stops {
            stop.arrival = stop.arrival.add_secs(secs);
            stop.departure = stop.departure.add_secs(secs);
        }
    }

    /// Total running-plus-dwelling time from first departure to last arrival.
    pub fn total_secs(&self) -> i64 {
        let mut total = 0;
        let mut prev: Option<&Stop> = None;
        for stop in &self.stops {
            if let Some(p) = prev {
                total += p.departure.secs_to(stop.arrival) + stop.dwell_secs();
            }
            prev = Some(stop);
        }
        // the last row's dwell is not part of the journey
        if let Some(last) = self.stops.back()
            && self.stops.len() > 1
        {
            total -= last.dwell_secs();
        }
        total
    }

    /// Concatenate `incoming` onto this timetable, consuming it.
    ///
    /// Before splicing, look for an overlap of length `k` (1 up to `depth`)
    /// where the rows at the meeting ends carry the same names in the same
    /// order; the first `k` found is taken and those `k` rows are dropped
    /// from `incoming`. Returns the number of rows dropped.
    ///
    /// # Examples
    ///
    /// ```
    /// use timetable_engine::domain::{ClockTime, JoinSide, Stop, Timetable};
    ///
    /// let t = ClockTime::MIDNIGHT;
    /// let mut x = Timetable::from_stops(["S1", "S2", "S3"].map(|n| Stop::new(n, t, t)));
    /// let y = Timetable::from_stops(["S2", "S3", "S4"].map(|n| Stop::new(n, t, t)));
    /// assert_eq!(x.join(y, JoinSide::Append, 10), 2);
    /// let names: Vec<_> = x.iter().map(|s| s.name.to_string()).collect();
    /// assert_eq!(names, ["S1", "S2", "S3", "S4"]);
    /// ```
    pub fn join(&mut self, incoming: Timetable, side: JoinSide, depth: usize) -> usize {
        let mut incoming = incoming.stops;
        let overlap = self.overlap_with(&incoming, side, depth);
        match side {
            JoinSide::Append => {
                incoming.drain(..overlap);
                self.stops.extend(incoming);
            }
            JoinSide::Prepend => {
                incoming.truncate(incoming.len() - overlap);
                while let Some(stop) = incoming.pop_back() {
                    self.stops.push_front(stop);
                }
            }
        }
        self.touch();
        overlap
    }

    fn overlap_with(&self, incoming: &VecDeque<Stop>, side: JoinSide, depth: usize) -> usize {
        let names_equal = |a: &Stop, b: &Stop| a.name == b.name;
        for k in 1..=depth {
            if k > self.stops.len() || k > incoming.len() {
                break;
            }
            let matched = match side {
                JoinSide::Append => self
                    .stops
                    .range(self.stops.len() - k..)
                    .zip(incoming.range(..k))
                    .all(|(a, b)| names_equal(a, b)),
                JoinSide::Prepend => self
                    .stops
                    .range(..k)
                    .zip(incoming.range(incoming.len() - k..))
                    .all(|(a, b)| names_equal(a, b)),
            };
            if matched {
                return k;
            }
        }
        0
    }

    /// Swap an inclusive row range of `self` with one of `other`.
    ///
    /// Rows outside the two ranges keep their order, and the combined row
    /// count of both timetables is unchanged.
    pub fn exchange_interval(
        &mut self,
        range1: RangeInclusive<usize>,
        other: &mut Timetable,
        range2: RangeInclusive<usize>,
    ) -> Result<(), DomainError> {
        check_range(&range1, self.len())?;
        check_range(&range2, other.len())?;

        let (start1, start2) = (*range1.start(), *range2.start());
        let holder: Vec<Stop> = self.stops.drain(range1).collect();
        let moved: Vec<Stop> = other.stops.drain(range2).collect();
        splice_in(&mut self.stops, start1, moved);
        splice_in(&mut other.stops, start2, holder);

        self.touch();
        other.touch();
        Ok(())
    }
}

fn check_range(range: &RangeInclusive<usize>, len: usize) -> Result<(), DomainError> {
    let (start, end) = (*range.start(), *range.end());
    if start > end || end >= len {
        return Err(DomainError::InvalidRange { start, end, len });
    }
    Ok(())
}

fn splice_in(stops: &mut VecDeque<Stop>, at: usize, items: Vec<Stop>) {
    let mut tail = stops.split_off(at);
    stops.extend(items);
    stops.append(&mut tail);
}

impl FromIterator<Stop> for Timetable {
    fn from_iter<I: IntoIterator<Item = Stop>>(iter: I) -> Self {
        Self::from_stops(iter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ClockTime;

    fn t(s: &str) -> ClockTime {
        ClockTime::parse(s).unwrap()
    }

    fn table(names: &[&str]) -> Timetable {
        names
            .iter()
            .map(|n| Stop::new(*n, t("08:00"), t("08:00")))
            .collect()
    }

    fn names(tt: &Timetable) -> Vec<String> {
        tt.iter().map(|s| s.name.to_string()).collect()
    }

    #[test]
    fn push_both_ends() {
        let mut tt = table(&["B"]);
        tt.push_front(Stop::new("A", t("07:00"), t("07:00")));
        tt.push_back(Stop::new("C", t("09:00"), t("09:00")));
        let rev = tt.revision();
        assert_eq!(names(&tt), ["A", "B", "C"]);
        tt.push_back(Stop::new("D", t("10:00"), t("10:00")));
        assert_ne!(tt.revision(), rev);
    }

    #[test]
    fn join_append_consumes_overlap_once() {
        let mut x = table(&["S1", "S2", "S3", "S4", "S5"]);
        let y = table(&["S3", "S4", "S5", "S6", "S7", "S8"]);
        let dropped = x.join(y, JoinSide::Append, 3);
        assert_eq!(dropped, 3);
        assert_eq!(names(&x), ["S1", "S2", "S3", "S4", "S5", "S6", "S7", "S8"]);
    }

    #[test]
    fn join_window_too_small_keeps_duplicates() {
        let mut x = table(&["S1", "S2", "S3", "S4", "S5"]);
        let y = table(&["S3", "S4", "S5", "S6"]);
        assert_eq!(x.join(y, JoinSide::Append, 2), 0);
        assert_eq!(x.len(), 9);
    }

    #[test]
    fn join_prepend_trims_incoming_tail() {
        let mut x = table(&["S3", "S4", "S5", "S6"]);
        let y = table(&["S1", "S2", "S3", "S4"]);
        assert_eq!(x.join(y, JoinSide::Prepend, 10), 2);
        assert_eq!(names(&x), ["S1", "S2", "S3", "S4", "S5", "S6"]);
    }

    #[test]
    fn join_without_overlap_concatenates() {
        let mut x = table(&["A", "B"]);
        let y = table(&["C", "D"]);
        assert_eq!(x.join(y, JoinSide::Append, 10), 0);
        assert_eq!(names(&x), ["A", "B", "C", "D"]);
    }

    #[test]
    fn join_takes_shortest_overlap() {
        let mut x = table(&["A", "B", "A"]);
        let y = table(&["A", "B", "A", "C"]);
        assert_eq!(x.join(y, JoinSide::Append, 10), 1);
        assert_eq!(names(&x), ["A", "B", "A", "B", "A", "C"]);
    }

    #[test]
    fn join_keeps_incoming_ids() {
        let mut x = table(&["A", "B"]);
        let y = table(&["B", "C"]);
        let c_id = y.at(1).unwrap().id();
        x.join(y, JoinSide::Append, 10);
        assert_eq!(x.position_of(c_id), Some(2));
    }

    #[test]
    fn exchange_swaps_ranges() {
        let mut a = table(&["A1", "A2", "A3", "A4"]);
        let mut b = table(&["B1", "B2", "B3"]);
        a.exchange_interval(1..=2, &mut b, 1..=1).unwrap();
        assert_eq!(names(&a), ["A1", "B2", "A4"]);
        assert_eq!(names(&b), ["B1", "A2", "A3", "B3"]);
    }

    #[test]
    fn exchange_rejects_bad_ranges() {
        let mut a = table(&["A1", "A2"]);
        let mut b = table(&["B1"]);
        assert!(matches!(
            a.exchange_interval(0..=2, &mut b, 0..=0),
            Err(DomainError::InvalidRange { end: 2, len: 2, .. })
        ));
        #[allow(clippy::reversed_empty_ranges)]
        let backwards = 1..=0;
        assert!(a.exchange_interval(backwards, &mut b, 0..=0).is_err());
        assert_eq!(names(&a), ["A1", "A2"]);
    }

    #[test]
    fn resolve_falls_back_when_hint_stale() {
        let mut tt = table(&["A", "B", "C"]);
        let c = tt.at(2).unwrap().id();
        tt.push_front(Stop::new("Z", t("07:00"), t("07:00")));
        let (index, stop) = tt.resolve(c, 2).unwrap();
        assert_eq!(index, 3);
        assert_eq!(stop.name.to_string(), "C");
        let gone = tt.remove(3).unwrap().id();
        assert!(tt.resolve(gone, 3).is_none());
    }

    #[test]
    fn origin_and_terminus() {
        let tt = table(&["A", "B", "C"]);
        assert!(tt.is_origin(&"A".into()));
        assert!(!tt.is_origin(&"B".into()));
        assert!(tt.is_terminus(&"C".into()));
    }

    #[test]
    fn general_lookup_includes_members() {
        let tt = table(&["A::x", "B", "A"]);
        assert_eq!(tt.find_all_general(&"A".into()), vec![0, 2]);
        assert_eq!(tt.find_first(&"A".into()), Some(2));
    }

    #[test]
    fn shift_and_total() {
        let mut tt = Timetable::from_stops([
            Stop::new("A", t("23:50"), t("23:50")),
            Stop::new("B", t("00:10"), t("00:12")),
            Stop::new("C", t("00:30"), t("00:35")),
        ]);
        assert_eq!(tt.total_secs(), 40 * 60);
        tt.shift_all(3600);
        assert_eq!(tt.at(0).unwrap().departure, t("00:50"));
        assert_eq!(tt.total_secs(), 40 * 60);
    }
}
