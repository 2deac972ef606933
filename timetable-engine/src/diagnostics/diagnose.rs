//! Scheduling anomaly checks over one corridor.

use std::cmp::Reverse;
use std::fmt;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::diagram::Diagram;
use crate::domain::{ClockTime, Corridor, CorridorId, TrainId, crossed, ranges_intersect_excl};

use super::events::{BindingEvent, EventKind, IntervalRun, binding_events, interval_runs};

const HOUR: i64 = 60 * 60;

/// Thresholds and switches for [`Diagnostics`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsConfig {
    /// Dwell longer than this is a warning (seconds).
    pub dwell_warning_secs: i64,
    /// Dwell longer than this is an error (seconds).
    pub dwell_error_secs: i64,
    /// Run between consecutive bound stations longer than this is a warning (seconds).
    pub run_warning_secs: i64,
    /// Run between consecutive bound stations longer than this is an error (seconds).
    pub run_error_secs: i64,
    /// Check for opposite-direction meets inside intervals. A meet on a
    /// single-track interval is an error, elsewhere it is informational.
    pub report_meets: bool,
}

impl Default for DiagnosticsConfig {
    fn default() -> Self {
        Self {
            dwell_warning_secs: 12 * HOUR,
            dwell_error_secs: 20 * HOUR,
            run_warning_secs: 12 * HOUR,
            run_error_secs: 20 * HOUR,
            report_meets: false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Severity {
    Info,
    Warning,
    Error,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Severity::Info => "info",
            Severity::Warning => "warning",
            Severity::Error => "error",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum FindingKind {
    /// Two same-direction trains swap order inside an interval.
    Overtake,
    /// Two opposite-direction trains share an interval at the same time.
    Meet,
    /// A train runs through a maintenance window.
    ForbiddenWindow,
    LongDwell,
    LongRun,
}

/// One reported anomaly.
#[derive(Debug, Clone)]
pub struct Finding {
    pub severity: Severity,
    pub kind: FindingKind,
    pub train: TrainId,
    /// The other train involved in an overtake or meet
    pub other: Option<TrainId>,
    pub corridor: CorridorId,
    /// Corridor position the finding is anchored at
    pub position: usize,
    pub time: ClockTime,
    pub description: String,
}

/// Conflict and plausibility checks.
#[derive(Debug, Clone, Copy, Default)]
pub struct Diagnostics;

impl Diagnostics {
    /// All findings for every train bound to `corridor`.
    ///
    /// Ordered by severity (most severe first), then corridor position, then
    /// time of day. An unknown corridor yields nothing.
    pub fn diagnose(
        diagram: &Diagram,
        corridor: CorridorId,
        config: &DiagnosticsConfig,
    ) -> Vec<Finding> {
        Self::collect(diagram, corridor, config, None)
    }

    /// Findings involving one train.
    pub fn diagnose_train(
        diagram: &Diagram,
        train: TrainId,
        corridor: CorridorId,
        config: &DiagnosticsConfig,
    ) -> Vec<Finding> {
        Self::collect(diagram, corridor, config, Some(train))
    }

    fn collect(
        diagram: &Diagram,
        corridor: CorridorId,
        config: &DiagnosticsConfig,
        only: Option<TrainId>,
    ) -> Vec<Finding> {
        let Some(corr) = diagram.corridor(corridor) else {
            debug!(corridor = %corridor, "diagnose on unknown corridor");
            return Vec::new();
        };
        let involves = |a: TrainId, b: Option<TrainId>| {
            only.is_none_or(|t| t == a || b == Some(t))
        };

        let mut findings = Vec::new();
        let mut runs = Vec::new();
        for train in diagram.trains() {
            let Some(binding) = diagram.binding(train.id(), corridor) else {
                continue;
            };
            let train_runs = interval_runs(train, binding, corr);
            if involves(train.id(), None) {
                let events = binding_events(diagram, binding);
                check_durations(&events, corr, config, &mut findings);
                check_windows(corr, &train_runs, &mut findings);
            }
            runs.extend(train_runs);
        }
        check_pairs(corr, &runs, config, &mut findings);
        findings.retain(|f| involves(f.train, f.other));

        findings.sort_by_key(|f| (Reverse(f.severity), f.position, f.time.secs_from_midnight()));
        debug!(corridor = %corr.name, findings = findings.len(), "diagnosed corridor");
        findings
    }
}

fn graded(secs: i64, warning: i64, error: i64) -> Option<Severity> {
    if secs > error {
        Some(Severity::Error)
    } else if secs > warning {
        Some(Severity::Warning)
    } else {
        None
    }
}

fn hours(secs: i64) -> String {
    format!("{}h{:02}m", secs / HOUR, secs % HOUR / 60)
}

fn check_durations(
    events: &[BindingEvent<'_>],
    corridor: &Corridor,
    config: &DiagnosticsConfig,
    findings: &mut Vec<Finding>,
) {
    let mut arrived: Option<&BindingEvent<'_>> = None;
    let mut left: Option<&BindingEvent<'_>> = None;
    for event in events {
        if matches!(event.kind, EventKind::Arrive | EventKind::Pass)
            && let Some(from) = left.filter(|from| from.stretch == event.stretch)
        {
            let run = from.time.secs_to(event.time);
            if let Some(severity) = graded(run, config.run_warning_secs, config.run_error_secs) {
                findings.push(Finding {
                    severity,
                    kind: FindingKind::LongRun,
                    train: event.train.id(),
                    other: None,
                    corridor: corridor.id(),
                    position: from.position,
                    time: from.time,
                    description: format!(
                        "{} runs {} from {} to {}",
                        event.train.name,
                        hours(run),
                        from.stop.name,
                        event.stop.name
                    ),
                });
            }
        }
        match event.kind {
            EventKind::Arrive => arrived = Some(event),
            EventKind::Depart => {
                if let Some(arrival) = arrived.take() {
                    let dwell = arrival.time.secs_to(event.time);
                    if let Some(severity) =
                        graded(dwell, config.dwell_warning_secs, config.dwell_error_secs)
                    {
                        findings.push(Finding {
                            severity,
                            kind: FindingKind::LongDwell,
                            train: event.train.id(),
                            other: None,
                            corridor: corridor.id(),
                            position: event.position,
                            time: arrival.time,
                            description: format!(
                                "{} dwells {} at {}",
                                event.train.name,
                                hours(dwell),
                                arrival.stop.name
                            ),
                        });
                    }
                }
                left = Some(event);
            }
            EventKind::Pass => left = Some(event),
        }
    }
}

fn check_windows(corridor: &Corridor, runs: &[IntervalRun<'_>], findings: &mut Vec<Finding>) {
    for run in runs {
        for window in corridor.windows() {
            if window.covers(run.lower, run.direction)
                && ranges_intersect_excl(run.enter, run.leave, window.start, window.end)
            {
                findings.push(Finding {
                    severity: Severity::Error,
                    kind: FindingKind::ForbiddenWindow,
                    train: run.train.id(),
                    other: None,
                    corridor: corridor.id(),
                    position: run.lower,
                    time: run.enter,
                    description: format!(
                        "{} runs {}-{} inside window {} ({}-{})",
                        run.train.name,
                        run.enter,
                        run.leave,
                        window.name,
                        window.start,
                        window.end
                    ),
                });
            }
        }
    }
}

fn interval_label(corridor: &Corridor, lower: usize) -> String {
    match (corridor.station(lower), corridor.station(lower + 1)) {
        (Some(a), Some(b)) => format!("{}-{}", a.name, b.name),
        _ => format!("interval {lower}"),
    }
}

fn check_pairs(
    corridor: &Corridor,
    runs: &[IntervalRun<'_>],
    config: &DiagnosticsConfig,
    findings: &mut Vec<Finding>,
) {
    for (i, a) in runs.iter().enumerate() {
        for b in &runs[i + 1..] {
            if a.lower != b.lower || a.train.id() == b.train.id() {
                continue;
            }
            let finding = if a.direction == b.direction {
                crossed(a.enter, b.enter, a.leave, b.leave)
                    .then_some((Severity::Warning, FindingKind::Overtake))
            } else if config.report_meets
                && ranges_intersect_excl(a.enter, a.leave, b.enter, b.leave)
            {
                let single = corridor
                    .station(a.lower)
                    .is_some_and(|st| st.single_track);
                let severity = if single { Severity::Error } else { Severity::Info };
                Some((severity, FindingKind::Meet))
            } else {
                None
            };
            let Some((severity, kind)) = finding else {
                continue;
            };
            let verb = match kind {
                FindingKind::Overtake => "overtakes",
                _ => "meets",
            };
            findings.push(Finding {
                severity,
                kind,
                train: a.train.id(),
                other: Some(b.train.id()),
                corridor: corridor.id(),
                position: a.lower,
                time: a.enter,
                description: format!(
                    "{} {} {} in {}",
                    a.train.name,
                    verb,
                    b.train.name,
                    interval_label(corridor, a.lower)
                ),
            });
        }
    }
}
