//! Corridors: ordered station lists that trains are matched against.

use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use super::{ClockTime, StopName};

static NEXT_CORRIDOR_ID: AtomicU64 = AtomicU64::new(1);
static NEXT_STATION_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identity of a [`Corridor`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CorridorId(u64);

impl fmt::Display for CorridorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "corridor#{}", self.0)
    }
}

/// Stable identity of a [`CorridorStation`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct StationId(u64);

impl fmt::Display for StationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "station#{}", self.0)
    }
}

/// Running direction relative to corridor order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Towards increasing corridor position.
    Down,
    /// Towards decreasing corridor position.
    Up,
}

impl Direction {
    /// Direction of travel from position `from` to position `to`, if they differ.
    pub fn between(from: usize, to: usize) -> Option<Self> {
        match from.cmp(&to) {
            std::cmp::Ordering::Less => Some(Direction::Down),
            std::cmp::Ordering::Greater => Some(Direction::Up),
            std::cmp::Ordering::Equal => None,
        }
    }

    pub fn reverse(self) -> Self {
        match self {
            Direction::Down => Direction::Up,
            Direction::Up => Direction::Down,
        }
    }
}

/// Which running directions a station can be bound in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Passability {
    #[default]
    Both,
    DownOnly,
    UpOnly,
    Neither,
}

impl Passability {
    pub fn accepts(self, direction: Direction) -> bool {
        matches!(
            (self, direction),
            (Passability::Both, _)
                | (Passability::DownOnly, Direction::Down)
                | (Passability::UpOnly, Direction::Up)
        )
    }

    /// Whether the station can be bound at all.
    pub fn any(self) -> bool {
        self != Passability::Neither
    }
}

/// A maintenance window closing one interval of a corridor.
///
/// `lower` is the corridor position of the interval's first station; the
/// interval runs to `lower + 1`. A window without a direction closes both.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForbiddenWindow {
    pub name: String,
    pub lower: usize,
    pub direction: Option<Direction>,
    pub start: ClockTime,
    pub end: ClockTime,
}

impl ForbiddenWindow {
    pub fn new(name: impl Into<String>, lower: usize, start: ClockTime, end: ClockTime) -> Self {
        Self {
            name: name.into(),
            lower,
            direction: None,
            start,
            end,
        }
    }

    pub fn with_direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }

    /// Whether a run over interval `lower` in `direction` is subject to this window.
    pub fn covers(&self, lower: usize, direction: Direction) -> bool {
        self.lower == lower && self.direction.is_none_or(|d| d == direction)
    }
}

/// One station's appearance within a corridor.
#[derive(Debug, Clone, PartialEq)]
pub struct CorridorStation {
    id: StationId,
    pub name: StopName,
    /// Distance from the corridor's first station, in km
    pub mileage: f64,
    /// Handles passenger traffic
    pub passenger: bool,
    /// Handles freight traffic
    pub freight: bool,
    pub passability: Passability,
    /// The interval from this station to the next one is single track
    pub single_track: bool,
}

impl CorridorStation {
    /// A station handling both traffic kinds, passable both ways.
    pub fn new(name: impl Into<StopName>, mileage: f64) -> Self {
        Self {
            id: StationId(NEXT_STATION_ID.fetch_add(1, Ordering::Relaxed)),
            name: name.into(),
            mileage,
            passenger: true,
            freight: true,
            passability: Passability::Both,
            single_track: false,
        }
    }

    pub fn with_capability(mut self, passenger: bool, freight: bool) -> Self {
        self.passenger = passenger;
        self.freight = freight;
        self
    }

    pub fn with_passability(mut self, passability: Passability) -> Self {
        self.passability = passability;
        self
    }

    pub fn with_single_track(mut self, single_track: bool) -> Self {
        self.single_track = single_track;
        self
    }

    pub fn id(&self) -> StationId {
        self.id
    }
}

/// An ordered, directed sequence of stations.
///
/// Keeps a name index so timetable rows resolve in constant time. The index
/// and the revision counter are maintained by every mutating method.
#[derive(Debug, Clone)]
pub struct Corridor {
    id: CorridorId,
    pub name: String,
    stations: Vec<CorridorStation>,
    by_name: HashMap<StopName, usize>,
    windows: Vec<ForbiddenWindow>,
    revision: u64,
}

impl Corridor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: CorridorId(NEXT_CORRIDOR_ID.fetch_add(1, Ordering::Relaxed)),
            name: name.into(),
            stations: Vec::new(),
            by_name: HashMap::new(),
            windows: Vec::new(),
            revision: 0,
        }
    }

    /// Build a corridor from stations in order.
    pub fn with_stations(
        name: impl Into<String>,
        stations: impl IntoIterator<Item = CorridorStation>,
    ) -> Self {
        let mut corridor = Self::new(name);
        corridor.stations = stations.into_iter().collect();
        corridor.reindex();
        corridor
    }

    pub fn id(&self) -> CorridorId {
        self.id
    }

    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn len(&self) -> usize {
        self.stations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stations.is_empty()
    }

    pub fn stations(&self) -> &[CorridorStation] {
        &self.stations
    }

    pub fn station(&self, pos: usize) -> Option<&CorridorStation> {
        self.stations.get(pos)
    }

    /// Position of a station by identity.
    pub fn position_of(&self, id: StationId) -> Option<usize> {
        self.stations.iter().position(|s| s.id() == id)
    }

    /// Resolve a station by identity, trying `hint` first.
    pub fn resolve(&self, id: StationId, hint: usize) -> Option<(usize, &CorridorStation)> {
        match self.stations.get(hint) {
            Some(st) if st.id() == id => Some((hint, st)),
            _ => {
                let pos = self.position_of(id)?;
                Some((pos, &self.stations[pos]))
            }
        }
    }

    /// Position of the station a timetable name binds to.
    ///
    /// An exact name wins; otherwise a fielded name binds to the station
    /// carrying its bare group name.
    pub fn locate(&self, name: &StopName) -> Option<usize> {
        if let Some(&pos) = self.by_name.get(name) {
            return Some(pos);
        }
        if name.is_bare() {
            return None;
        }
        self.by_name.get(&name.bare()).copied()
    }

    pub fn first(&self) -> Option<&CorridorStation> {
        self.stations.first()
    }

    pub fn last(&self) -> Option<&CorridorStation> {
        self.stations.last()
    }

    pub fn push_station(&mut self, station: CorridorStation) {
        self.stations.push(station);
        self.reindex();
    }

    /// Insert at `pos`; out-of-range appends.
    pub fn insert_station(&mut self, pos: usize, station: CorridorStation) {
        let pos = pos.min(self.stations.len());
        self.stations.insert(pos, station);
        self.reindex();
    }

    pub fn remove_station(&mut self, pos: usize) -> Option<CorridorStation> {
        if pos >= self.stations.len() {
            return None;
        }
        let removed = self.stations.remove(pos);
        self.reindex();
        Some(removed)
    }

    /// Edit a station in place; the index is rebuilt afterwards.
    pub fn update_station<R>(
        &mut self,
        pos: usize,
        f: impl FnOnce(&mut CorridorStation) -> R,
    ) -> Option<R> {
        let result = f(self.stations.get_mut(pos)?);
        self.reindex();
        Some(result)
    }

    /// Maintenance windows. These do not affect binding.
    pub fn windows(&self) -> &[ForbiddenWindow] {
        &self.windows
    }

    pub fn add_window(&mut self, window: ForbiddenWindow) {
        self.windows.push(window);
    }

    pub fn clear_windows(&mut self) {
        self.windows.clear();
    }

    fn reindex(&mut self) {
        self.by_name.clear();
        for (pos, station) in self.stations.iter().enumerate() {
            // first occurrence wins for duplicate names
            self.by_name.entry(station.name.clone()).or_insert(pos);
        }
        self.revision += 1;
    }
}
