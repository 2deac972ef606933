//! Railway timetable engine.
//!
//! Matches train timetables against corridors of stations, keeps those
//! matches current while timetables are spliced and edited, and answers
//! interval queries ("which trains run from here to there, and how many")
//! over the result.
//!
//! The [`Diagram`](diagram::Diagram) owns trains and corridors and rebinds
//! after every mutation. [`IntervalCounter`](interval::IntervalCounter) and
//! [`Diagnostics`](diagnostics::Diagnostics) read from it.

pub mod binding;
pub mod config;
pub mod diagnostics;
pub mod diagram;
pub mod domain;
pub mod interval;
