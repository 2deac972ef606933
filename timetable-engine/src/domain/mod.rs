//! Domain types for the timetable engine.
//!
//! Clock and name utilities, timetables, corridors, rulers and trains. Rows
//! and stations carry stable ids so derived structures can refer to them
//! without borrowing.

mod corridor;
mod error;
mod name;
mod ruler;
mod stop;
mod time;
mod timetable;
mod train;

pub use corridor::{
    Corridor, CorridorId, CorridorStation, Direction, ForbiddenWindow, Passability, StationId,
};
pub use error::DomainError;
pub use name::{FIELD_SEPARATOR, MULTI_SEPARATOR, PatternError, PatternSet, PatternSpec, StopName};
pub use ruler::{Ruler, RulerInterval};
pub use stop::{Stop, StopId};
pub use time::{
    ClockTime, SECS_PER_DAY, TimeError, crossed, in_range, ranges_intersect,
    ranges_intersect_excl, round_to,
};
pub use timetable::{DEFAULT_JOIN_DEPTH, JoinSide, Timetable};
pub use train::{Train, TrainId};
