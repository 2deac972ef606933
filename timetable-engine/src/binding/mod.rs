//! Binding trains to corridors.
//!
//! A [`Binding`] is a derived, disposable view of one train on one corridor.
//! It is rebuilt whole from the train's timetable whenever either side
//! changes, and refers back into both by stable id.

mod binder;
mod config;
mod interpolate;
mod segment;

pub use binder::Binder;
pub use config::{BindConfig, InterpolationConfig};
pub use interpolate::{INTERPOLATED_NOTE, relative_error};
pub use segment::{Binding, ResolvedStop, Segment, SegmentStop};
