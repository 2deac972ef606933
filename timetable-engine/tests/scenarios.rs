//! End-to-end scenarios through the diagram, binder and interval queries.

use std::sync::Once;

use timetable_engine::binding::{BindConfig, InterpolationConfig};
use timetable_engine::config::{ConfigFile, EngineConfig};
use timetable_engine::diagnostics::{Diagnostics, FindingKind};
use timetable_engine::diagram::Diagram;
use timetable_engine::domain::{
    ClockTime, Corridor, CorridorId, CorridorStation, Direction, JoinSide, PatternSpec, Ruler,
    StationId, Stop, Timetable, Train, TrainId,
};
use timetable_engine::interval::{IntervalCounter, IntervalFilter, TrainFilter};

static INIT: Once = Once::new();

fn init_tracing() {
    INIT.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

fn t(s: &str) -> ClockTime {
    ClockTime::parse(s).unwrap()
}

fn corridor(names: &[&str]) -> Corridor {
    Corridor::with_stations(
        "Main",
        names
            .iter()
            .enumerate()
            .map(|(i, n)| CorridorStation::new(*n, i as f64 * 15.0)),
    )
}

/// Rows are (name, arrival, departure).
fn train(name: &str, rows: &[(&str, &str, &str)]) -> Train {
    Train::with_timetable(
        name,
        rows.iter()
            .map(|(n, a, d)| Stop::new(*n, t(a), t(d)))
            .collect::<Timetable>(),
    )
}

/// Rows all at 08:00, for tests that only care about names.
fn rows(names: &[&'static str]) -> Vec<(&'static str, &'static str, &'static str)> {
    names.iter().map(|n| (*n, "08:00", "08:00")).collect()
}

fn station(diagram: &Diagram, corridor: CorridorId, name: &str) -> StationId {
    let corr = diagram.corridor(corridor).unwrap();
    corr.stations()[corr.locate(&name.into()).unwrap()].id()
}

fn names(diagram: &Diagram, train: TrainId) -> Vec<String> {
    diagram
        .train(train)
        .unwrap()
        .timetable()
        .iter()
        .map(|s| s.name.literal())
        .collect()
}

#[test]
fn single_train_binds_and_counts() {
    init_tracing();
    let mut diagram = Diagram::default();
    let c = diagram.add_corridor(corridor(&["A", "B", "C", "D"]));
    let tr = diagram.add_train(train(
        "Train1",
        &[
            ("A", "08:00", "08:00"),
            ("B", "08:30", "08:31"),
            ("D", "09:10", "09:10"),
        ],
    ));

    let binding = diagram.binding(tr, c).unwrap();
    assert_eq!(binding.segments().len(), 1);
    let seg = &binding.segments()[0];
    assert_eq!(seg.direction(), Direction::Down);
    let positions: Vec<_> = seg.stops().iter().map(|e| e.position).collect();
    assert_eq!(positions, [0, 1, 3]);

    let filter = IntervalFilter::default();
    let trains = TrainFilter::default();
    let counter = IntervalCounter::new(&diagram, &filter, &trains);
    let (a, d) = (station(&diagram, c, "A"), station(&diagram, c, "D"));
    let found = counter.interval_trains(c, a, d);
    assert_eq!(found.len(), 1);
    assert!(found[0].from_is_origin);
    assert_eq!(found[0].run_secs(), 70 * 60);
}

#[test]
fn each_direction_credited_once() {
    init_tracing();
    let mut diagram = Diagram::default();
    let c = diagram.add_corridor(corridor(&["A", "B", "C"]));
    // out and back in one timetable
    diagram.add_train(train(
        "Shuttle",
        &[
            ("A", "08:00", "08:00"),
            ("B", "08:20", "08:20"),
            ("C", "08:40", "09:00"),
            ("B", "09:20", "09:20"),
            ("A", "09:40", "09:40"),
        ],
    ));
    let filter = IntervalFilter::default();
    let trains = TrainFilter::default();
    let counter = IntervalCounter::new(&diagram, &filter, &trains);
    let (a, c_st) = (station(&diagram, c, "A"), station(&diagram, c, "C"));

    let out = counter.interval_trains(c, a, c_st);
    assert_eq!(out.len(), 1);
    assert_eq!(out[0].from_stop.departure, t("08:00"));

    let back = counter.interval_trains(c, c_st, a);
    assert_eq!(back.len(), 1);
    assert_eq!(back[0].from_stop.departure, t("09:00"));
    // the turnaround row is the origin of the return segment
    assert!(back[0].from_is_origin);
}

#[test]
fn stop_only_excludes_pass_through() {
    init_tracing();
    let mut diagram = Diagram::default();
    let c = diagram.add_corridor(corridor(&["A", "B", "C"]));
    diagram.add_train(train(
        "Express",
        &[
            ("A", "08:00", "08:00"),
            ("B", "08:20", "08:20"),
            ("C", "08:40", "08:40"),
        ],
    ));
    let (a, b) = (station(&diagram, c, "A"), station(&diagram, c, "B"));
    let trains = TrainFilter::default();

    let any = IntervalFilter::default();
    assert_eq!(IntervalCounter::new(&diagram, &any, &trains).interval_trains(c, a, b).len(), 1);

    let stop_only = IntervalFilter {
        stop_only: true,
        ..IntervalFilter::default()
    };
    let counter = IntervalCounter::new(&diagram, &stop_only, &trains);
    assert!(counter.interval_trains(c, a, b).is_empty());
}

#[test]
fn multi_pattern_matches_any_listed_name() {
    init_tracing();
    let mut diagram = Diagram::default();
    diagram.add_train(train(
        "D301",
        &[("天津", "07:00", "07:00"), ("上海", "12:00", "12:00")],
    ));
    let filter = IntervalFilter::default();
    let trains = TrainFilter::default();
    let counter = IntervalCounter::new(&diagram, &filter, &trains);
    let found = counter.interval_trains_by_name(
        &PatternSpec::multi("北京|天津"),
        &PatternSpec::literal("上海"),
    );
    assert_eq!(found.len(), 1);
    assert_eq!(found[0].from_stop.name.literal(), "天津");
}

#[test]
fn join_consumes_overlap_once() {
    init_tracing();
    let mut diagram = Diagram::default();
    let x = diagram.add_train(train("X", &rows(&["S1", "S2", "S3", "S4", "S5"])));
    let y = diagram.add_train(train("Y", &rows(&["S3", "S4", "S5", "S6", "S7", "S8"])));

    let dropped = diagram.join_trains(x, y, JoinSide::Append, 3).unwrap();
    assert_eq!(dropped, 3);
    assert_eq!(
        names(&diagram, x),
        ["S1", "S2", "S3", "S4", "S5", "S6", "S7", "S8"]
    );
    assert_eq!(diagram.train_count(), 1);
    assert!(diagram.train_by_name("Y").is_none());
    assert_eq!(diagram.train_by_name("X").map(|t| t.id()), Some(x));
}

#[test]
fn exchange_preserves_rows_and_rebinds() {
    init_tracing();
    let mut diagram = Diagram::default();
    let c = diagram.add_corridor(corridor(&["A", "B", "C", "D", "E"]));
    let x = diagram.add_train(train(
        "X",
        &[
            ("A", "08:00", "08:00"),
            ("B", "08:10", "08:10"),
            ("C", "08:20", "08:20"),
        ],
    ));
    let y = diagram.add_train(train(
        "Y",
        &[
            ("C", "09:00", "09:00"),
            ("D", "09:10", "09:10"),
            ("E", "09:20", "09:20"),
        ],
    ));
    let moved = diagram.train(x).unwrap().timetable().at(2).unwrap().id();

    diagram.exchange_interval(x, 2..=2, y, 1..=2).unwrap();
    assert_eq!(names(&diagram, x), ["A", "B", "D", "E"]);
    assert_eq!(names(&diagram, y), ["C", "C"]);
    // the moved row kept its identity
    assert_eq!(
        diagram.train(y).unwrap().timetable().position_of(moved),
        Some(1)
    );

    for id in [x, y] {
        let binding = diagram.binding(id, c).unwrap();
        assert!(binding.segments().iter().all(|s| s.is_monotonic()));
    }
}

#[test]
fn rebinding_is_idempotent() {
    init_tracing();
    let mut diagram = Diagram::default();
    let c = diagram.add_corridor(corridor(&["A", "B", "C", "D"]));
    let tr = diagram.add_train(train(
        "T1",
        &[
            ("A", "08:00", "08:00"),
            ("C", "08:30", "08:32"),
            ("B", "08:50", "08:50"),
        ],
    ));
    let before = diagram.binding(tr, c).unwrap().clone();
    diagram.rebind_all();
    let after = diagram.binding(tr, c).unwrap();
    assert_eq!(before.segments(), after.segments());
}

#[test]
fn interpolate_then_diagnose() {
    init_tracing();
    let mut diagram = Diagram::new(BindConfig::default());
    let corr = corridor(&["A", "B", "C"]);
    let ruler = Ruler::uniform("standard", &corr, 600);
    let c = diagram.add_corridor(corr);
    diagram.set_ruler(c, ruler).unwrap();
    assert_eq!(diagram.corridor_by_name("Main").map(|c| c.id()), Some(c));

    let slow = diagram.add_train(train(
        "Slow",
        &[("A", "08:00", "08:00"), ("C", "09:00", "09:00")],
    ));
    diagram.add_train(train(
        "Fast",
        &[("A", "08:10", "08:10"), ("C", "08:40", "08:40")],
    ));
    let inserted = diagram
        .interpolate(slow, c, &InterpolationConfig::default())
        .unwrap();
    assert_eq!(inserted, 1);
    assert_eq!(names(&diagram, slow), ["A", "B", "C"]);

    let engine = EngineConfig::default();
    let findings = Diagnostics::diagnose(&diagram, c, &engine.diagnostics);
    assert_eq!(findings.len(), 1);
    assert_eq!(findings[0].kind, FindingKind::Overtake);
}

#[test]
fn config_drives_queries() {
    init_tracing();
    let dir = tempfile::tempdir().unwrap();
    let file = ConfigFile::new(dir.path().join("engine.json"));
    let mut config = EngineConfig::default();
    config.binding.max_passed_stations = Some(0);
    config.interval.business_only = true;
    file.save(&config).unwrap();

    let loaded = file.load().unwrap();
    let mut diagram = Diagram::new(loaded.binding.clone());
    let c = diagram.add_corridor(corridor(&["A", "B", "C"]));
    let tr = diagram.add_train(train(
        "T1",
        &[("A", "08:00", "08:00"), ("C", "08:30", "08:30")],
    ));
    // skipping B is not allowed, so A and C land in separate segments
    assert_eq!(diagram.binding(tr, c).unwrap().segments().len(), 2);

    let trains = TrainFilter::default();
    let counter = IntervalCounter::new(&diagram, &loaded.interval, &trains);
    let (a, c_st) = (station(&diagram, c, "A"), station(&diagram, c, "C"));
    assert!(counter.interval_trains(c, a, c_st).is_empty());
}
