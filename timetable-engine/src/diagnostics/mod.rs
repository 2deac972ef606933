//! Conflict diagnostics over bound trains.
//!
//! Consumers of bindings only: events are derived per binding, and checks
//! run over those events on one corridor at a time.

mod diagnose;
pub mod events;

pub use diagnose::{Diagnostics, DiagnosticsConfig, Finding, FindingKind, Severity};
pub use events::{BindingEvent, EventKind, IntervalRun, binding_events, interval_runs};
