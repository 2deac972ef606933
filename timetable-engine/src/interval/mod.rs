//! Interval queries: which trains run between two points, and how many.
//!
//! [`IntervalCounter`] works over the bindings of a [`Diagram`](crate::diagram::Diagram)
//! for corridor queries, and over raw timetables for name queries.

mod candidate;
mod counter;
mod filter;
mod info;

pub use candidate::StartCandidate;
pub use counter::IntervalCounter;
pub use filter::{IntervalFilter, TrainFilter};
pub use info::{IntervalCount, IntervalCountMap, IntervalTrainInfo};
