//! Timetable rows.
//!
//! A `Stop` is one row of a train's timetable. Its `StopId` is assigned once
//! at creation and travels with the row when it is spliced into another
//! timetable, so derived structures can find it again (or notice that it has
//! gone).

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use super::{ClockTime, StopName};

static NEXT_STOP_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identity of a [`Stop`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StopId(u64);

impl StopId {
    fn fresh() -> Self {
        StopId(NEXT_STOP_ID.fetch_add(1, Ordering::Relaxed))
    }

    pub fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for StopId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "stop#{}", self.0)
    }
}

/// A station row of a train timetable.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Stop {
    id: StopId,
    /// Station name as written in the timetable
    pub name: StopName,
    pub arrival: ClockTime,
    pub departure: ClockTime,
    /// Whether the train handles passengers or goods here
    pub serves_public: bool,
    /// Track or platform label
    pub track: String,
    pub note: String,
}

impl Stop {
    /// Create a new stop with a fresh identity, serving the public.
    pub fn new(name: impl Into<StopName>, arrival: ClockTime, departure: ClockTime) -> Self {
        Self {
            id: StopId::fresh(),
            name: name.into(),
            arrival,
            departure,
            serves_public: true,
            track: String::new(),
            note: String::new(),
        }
    }

    /// A passing point: arrival equals departure, no public service.
    pub fn passing(name: impl Into<StopName>, time: ClockTime) -> Self {
        let mut stop = Self::new(name, time, time);
        stop.serves_public = false;
        stop
    }

    pub fn with_service(mut self, serves_public: bool) -> Self {
        self.serves_public = serves_public;
        self
    }

    pub fn with_track(mut self, track: impl Into<String>) -> Self {
        self.track = track.into();
        self
    }

    pub fn with_note(mut self, note: impl Into<String>) -> Self {
        self.note = note.into();
        self
    }

    pub fn id(&self) -> StopId {
        self.id
    }

    /// True when the train stands here (arrival differs from departure).
    pub fn is_dwelling(&self) -> bool {
        self.arrival != self.departure
    }

    /// Dwell time in seconds, wrapping past midnight.
    pub fn dwell_secs(&self) -> i64 {
        self.arrival.secs_to(self.departure)
    }

    /// Copy of this row with a fresh identity, e.g. for a timetable copy.
    pub fn duplicate(&self) -> Self {
        Self {
            id: StopId::fresh(),
            ..self.clone()
        }
    }
}
