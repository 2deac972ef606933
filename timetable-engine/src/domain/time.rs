//! Wraparound time-of-day handling.
//!
//! Timetables store bare times of day. A train that departs at 23:50 and
//! arrives at 00:20 has run for thirty minutes, so every comparison and
//! duration in this crate goes through the forward (modulo 24 h) helpers
//! defined here.

use chrono::{Duration, NaiveTime, Timelike};
use std::fmt;
use std::ops::Add;

/// Number of seconds in a day.
pub const SECS_PER_DAY: i64 = 24 * 60 * 60;

/// Error returned when parsing an invalid time string.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid time: {reason}")]
pub struct TimeError {
    reason: &'static str,
}

impl TimeError {
    fn new(reason: &'static str) -> Self {
        Self { reason }
    }
}

/// A time of day with one-second precision on a 24-hour cycle, held as a
/// [`NaiveTime`] with no sub-second part.
///
/// `ClockTime` deliberately does not implement `Ord`: on a cycle there is no
/// global order. Use [`ClockTime::is_before`] for adjacent comparisons and
/// [`ClockTime::secs_to`] for durations.
///
/// # Examples
///
/// ```
/// use timetable_engine::domain::ClockTime;
///
/// let dep = ClockTime::parse("23:50").unwrap();
/// let arr = ClockTime::parse("00:20").unwrap();
/// assert_eq!(dep.secs_to(arr), 30 * 60);
/// assert!(dep.is_before(arr));
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClockTime(NaiveTime);

impl ClockTime {
    /// 00:00:00.
    pub const MIDNIGHT: ClockTime = ClockTime(NaiveTime::MIN);

    /// Build a time from hour, minute and second components.
    pub fn from_hms(hour: u32, minute: u32, second: u32) -> Result<Self, TimeError> {
        if hour > 23 {
            return Err(TimeError::new("hour must be 0-23"));
        }
        if minute > 59 {
            return Err(TimeError::new("minute must be 0-59"));
        }
        if second > 59 {
            return Err(TimeError::new("second must be 0-59"));
        }
        NaiveTime::from_hms_opt(hour, minute, second)
            .map(Self)
            .ok_or(TimeError::new("not a valid time of day"))
    }

    /// Build a time from seconds since midnight, wrapping into `[0, 86400)`.
    pub fn from_secs(secs: i64) -> Self {
        // rem_euclid keeps the value in range for negative input too
        let secs = secs.rem_euclid(SECS_PER_DAY) as u32;
        Self(NaiveTime::from_num_seconds_from_midnight_opt(secs, 0).unwrap_or(NaiveTime::MIN))
    }

    /// Parse `HH:MM` or `HH:MM:SS`.
    ///
    /// # Examples
    ///
    /// ```
    /// use timetable_engine::domain::ClockTime;
    ///
    /// assert!(ClockTime::parse("08:30").is_ok());
    /// assert!(ClockTime::parse("08:30:15").is_ok());
    /// assert!(ClockTime::parse("25:00").is_err());
    /// assert!(ClockTime::parse("0830").is_err());
    /// ```
    pub fn parse(s: &str) -> Result<Self, TimeError> {
        let format = match s.len() {
            5 => "%H:%M",
            8 => "%H:%M:%S",
            _ => return Err(TimeError::new("expected HH:MM or HH:MM:SS")),
        };
        let time = NaiveTime::parse_from_str(s, format)
            .map_err(|_| TimeError::new("not a valid time of day"))?;
        Ok(Self::from(time))
    }

    /// Seconds since midnight.
    pub fn secs_from_midnight(&self) -> i64 {
        i64::from(self.0.num_seconds_from_midnight())
    }

    pub fn hour(&self) -> u32 {
        self.0.hour()
    }

    pub fn minute(&self) -> u32 {
        self.0.minute()
    }

    pub fn second(&self) -> u32 {
        self.0.second()
    }

    /// Add a signed number of seconds, wrapping past midnight either way.
    pub fn add_secs(self, secs: i64) -> Self {
        Self::from_secs(self.secs_from_midnight() + secs)
    }

    /// Forward elapsed seconds from `self` to `later`, in `[0, 86400)`.
    ///
    /// Wraps past midnight: 23:00 → 01:00 is two hours.
    pub fn secs_to(self, later: Self) -> i64 {
        (later.secs_from_midnight() - self.secs_from_midnight()).rem_euclid(SECS_PER_DAY)
    }

    /// Whether `self` is considered earlier than `other`.
    ///
    /// Of the two ways round the clock, the shorter one wins: 23:00 is before
    /// 01:00, and 01:00 is before 11:00. Equal times, and times exactly twelve
    /// hours apart, are not before each other. This is a local relation and
    /// is not transitive.
    pub fn is_before(self, other: Self) -> bool {
        let forward = self.secs_to(other);
        forward != 0 && forward < other.secs_to(self)
    }
}

impl From<NaiveTime> for ClockTime {
    /// Drops sub-second precision, including a leap second's overflow.
    fn from(time: NaiveTime) -> Self {
        Self::from_secs(i64::from(time.num_seconds_from_midnight()))
    }
}

impl From<ClockTime> for NaiveTime {
    fn from(time: ClockTime) -> Self {
        time.0
    }
}

impl Add<Duration> for ClockTime {
    type Output = Self;

    fn add(self, rhs: Duration) -> Self::Output {
        self.add_secs(rhs.num_seconds())
    }
}

impl fmt::Debug for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ClockTime({:02}:{:02}:{:02})",
            self.hour(),
            self.minute(),
            self.second()
        )
    }
}

impl fmt::Display for ClockTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.second() == 0 {
            write!(f, "{:02}:{:02}", self.hour(), self.minute())
        } else {
            write!(
                f,
                "{:02}:{:02}:{:02}",
                self.hour(),
                self.minute(),
                self.second()
            )
        }
    }
}

/// Whether `left <= t <= right` on the cycle, boundaries included.
pub fn in_range(left: ClockTime, right: ClockTime, t: ClockTime) -> bool {
    left.secs_to(t) <= left.secs_to(right)
}

/// Whether two wraparound ranges share at least one instant, boundaries included.
pub fn ranges_intersect(
    start1: ClockTime,
    end1: ClockTime,
    start2: ClockTime,
    end2: ClockTime,
) -> bool {
    in_range(start1, end1, start2) || in_range(start2, end2, start1)
}

/// Like [`ranges_intersect`] but touching boundaries do not count.
pub fn ranges_intersect_excl(
    start1: ClockTime,
    end1: ClockTime,
    start2: ClockTime,
    end2: ClockTime,
) -> bool {
    let strictly_inside = |left: ClockTime, right: ClockTime, t: ClockTime| {
        let offset = left.secs_to(t);
        offset > 0 && offset < left.secs_to(right)
    };
    strictly_inside(start1, end1, start2)
        || strictly_inside(start2, end2, start1)
        || (start1 == start2 && start1 != end1 && start2 != end2)
}

/// Whether two same-direction runs over one interval swap order.
///
/// The runs leave at `start1`/`start2` and arrive at `end1`/`end2`. If exactly
/// one end coincides the runs only touch, which is a headway question rather
/// than a crossing, so this returns false. Both ends equal counts as crossed.
pub fn crossed(start1: ClockTime, start2: ClockTime, end1: ClockTime, end2: ClockTime) -> bool {
    match (start1 == start2, end1 == end2) {
        (true, true) => true,
        (true, false) | (false, true) => false,
        (false, false) => start1.is_before(start2) != end1.is_before(end2),
    }
}

/// Round `secs` to the nearest multiple of `prec` (`prec <= 1` rounds to whole seconds).
pub fn round_to(secs: f64, prec: i64) -> i64 {
    if prec <= 1 {
        return secs.round() as i64;
    }
    let prec = prec as f64;
    ((secs / prec).round() * prec) as i64
}
