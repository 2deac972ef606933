//! The train and corridor store.
//!
//! Every mutation that can change what a train binds to rebinds the affected
//! trains before it returns, so bindings seen through `&Diagram` are never
//! stale. Queries take `&Diagram`; mutations take `&mut Diagram`.

use std::ops::RangeInclusive;

use indexmap::IndexMap;
use tracing::debug;

use crate::binding::{BindConfig, Binder, Binding, InterpolationConfig};
use crate::domain::{
    Corridor, CorridorId, DomainError, JoinSide, Ruler, Stop, StopId, Train, TrainId,
};

/// Trains, corridors and rulers, with bindings kept current.
#[derive(Debug, Default)]
pub struct Diagram {
    config: BindConfig,
    corridors: IndexMap<CorridorId, Corridor>,
    rulers: IndexMap<CorridorId, Ruler>,
    trains: IndexMap<TrainId, Train>,
}

fn rebind(train: &mut Train, corridor: &Corridor, config: &BindConfig) {
    let binding = Binder::new(config).bind(train, corridor);
    train.set_binding(corridor.id(), binding);
}

fn rebind_everywhere<'a>(
    train: &mut Train,
    corridors: impl IntoIterator<Item = &'a Corridor>,
    config: &BindConfig,
) {
    train.clear_bindings();
    for corridor in corridors {
        rebind(train, corridor, config);
    }
}

impl Diagram {
    pub fn new(config: BindConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &BindConfig {
        &self.config
    }

    /// Replace the binding configuration. Every train is rebound if it changed.
    pub fn set_config(&mut self, config: BindConfig) {
        if config == self.config {
            return;
        }
        self.config = config;
        self.rebind_all();
    }

    /// Rebuild every binding from scratch.
    pub fn rebind_all(&mut self) {
        for train in self.trains.values_mut() {
            rebind_everywhere(train, self.corridors.values(), &self.config);
        }
        debug!(
            trains = self.trains.len(),
            corridors = self.corridors.len(),
            "rebound all trains"
        );
    }

    /// Add a corridor and bind every train to it.
    pub fn add_corridor(&mut self, corridor: Corridor) -> CorridorId {
        let id = corridor.id();
        for train in self.trains.values_mut() {
            rebind(train, &corridor, &self.config);
        }
        debug!(corridor = %corridor.name, stations = corridor.len(), "added corridor");
        self.corridors.insert(id, corridor);
        id
    }

    /// Remove a corridor, its ruler and every binding to it.
    pub fn remove_corridor(&mut self, id: CorridorId) -> Option<Corridor> {
        let corridor = self.corridors.shift_remove(&id)?;
        self.rulers.shift_remove(&id);
        for train in self.trains.values_mut() {
            train.set_binding(id, None);
        }
        debug!(corridor = %corridor.name, "removed corridor");
        Some(corridor)
    }

    pub fn corridor(&self, id: CorridorId) -> Option<&Corridor> {
        self.corridors.get(&id)
    }

    pub fn corridors(&self) -> impl Iterator<Item = &Corridor> {
        self.corridors.values()
    }

    pub fn corridor_by_name(&self, name: &str) -> Option<&Corridor> {
        self.corridors.values().find(|c| c.name == name)
    }

    /// Edit a corridor, then rebind every train to it.
    pub fn update_corridor<R>(
        &mut self,
        id: CorridorId,
        f: impl FnOnce(&mut Corridor) -> R,
    ) -> Result<R, DomainError> {
        let corridor = self
            .corridors
            .get_mut(&id)
            .ok_or(DomainError::UnknownCorridor(id))?;
        let result = f(corridor);
        for train in self.trains.values_mut() {
            rebind(train, corridor, &self.config);
        }
        debug!(corridor = %corridor.name, "updated corridor");
        Ok(result)
    }

    /// Attach a ruler to a corridor, replacing any previous one.
    pub fn set_ruler(&mut self, corridor: CorridorId, ruler: Ruler) -> Result<(), DomainError> {
        if !self.corridors.contains_key(&corridor) {
            return Err(DomainError::UnknownCorridor(corridor));
        }
        self.rulers.insert(corridor, ruler);
        Ok(())
    }

    pub fn ruler(&self, corridor: CorridorId) -> Option<&Ruler> {
        self.rulers.get(&corridor)
    }

    /// Add a train and bind it to every corridor.
    pub fn add_train(&mut self, mut train: Train) -> TrainId {
        let id = train.id();
        rebind_everywhere(&mut train, self.corridors.values(), &self.config);
        debug!(train = %train.name, stops = train.timetable().len(), "added train");
        self.trains.insert(id, train);
        id
    }

    /// Remove a train with all its bindings.
    pub fn remove_train(&mut self, id: TrainId) -> Option<Train> {
        let train = self.trains.shift_remove(&id)?;
        debug!(train = %train.name, "removed train");
        Some(train)
    }

    pub fn train(&self, id: TrainId) -> Option<&Train> {
        self.trains.get(&id)
    }

    pub fn trains(&self) -> impl Iterator<Item = &Train> {
        self.trains.values()
    }

    pub fn train_by_name(&self, name: &str) -> Option<&Train> {
        self.trains.values().find(|t| t.name == name)
    }

    pub fn train_count(&self) -> usize {
        self.trains.len()
    }

    /// The binding of `train` to `corridor`, if there is one.
    pub fn binding(&self, train: TrainId, corridor: CorridorId) -> Option<&Binding> {
        let train = self.trains.get(&train)?;
        let corridor = self.corridors.get(&corridor)?;
        train
            .binding(corridor.id())
            .filter(|b| b.is_current(train.timetable(), corridor))
    }

    /// Edit a train, then rebind it everywhere.
    pub fn update_train<R>(
        &mut self,
        id: TrainId,
        f: impl FnOnce(&mut Train) -> R,
    ) -> Result<R, DomainError> {
        let train = self
            .trains
            .get_mut(&id)
            .ok_or(DomainError::UnknownTrain(id))?;
        let result = f(train);
        rebind_everywhere(train, self.corridors.values(), &self.config);
        Ok(result)
    }

    /// Edit one row of a train by its stable id.
    pub fn update_stop<R>(
        &mut self,
        train: TrainId,
        stop: StopId,
        f: impl FnOnce(&mut Stop) -> R,
    ) -> Result<R, DomainError> {
        let train = self
            .trains
            .get_mut(&train)
            .ok_or(DomainError::UnknownTrain(train))?;
        let index = train
            .timetable()
            .position_of(stop)
            .ok_or(DomainError::UnknownStop(stop))?;
        let row = train
            .timetable_mut()
            .at_mut(index)
            .ok_or(DomainError::UnknownStop(stop))?;
        let result = f(row);
        rebind_everywhere(train, self.corridors.values(), &self.config);
        Ok(result)
    }

    /// Join `source`'s timetable onto `target` and drop `source`.
    ///
    /// Returns the number of overlapping rows discarded from `source`.
    pub fn join_trains(
        &mut self,
        target: TrainId,
        source: TrainId,
        side: JoinSide,
        depth: usize,
    ) -> Result<usize, DomainError> {
        if target == source {
            return Err(DomainError::SameTrain(target));
        }
        if !self.trains.contains_key(&target) {
            return Err(DomainError::UnknownTrain(target));
        }
        let mut absorbed = self
            .trains
            .shift_remove(&source)
            .ok_or(DomainError::UnknownTrain(source))?;
        let incoming = absorbed.take_timetable();
        let train = self
            .trains
            .get_mut(&target)
            .ok_or(DomainError::UnknownTrain(target))?;
        let dropped = train.timetable_mut().join(incoming, side, depth);
        rebind_everywhere(train, self.corridors.values(), &self.config);
        debug!(
            train = %train.name,
            absorbed = %absorbed.name,
            dropped,
            "joined trains"
        );
        Ok(dropped)
    }

    /// Swap a row range of one train with a row range of another.
    pub fn exchange_interval(
        &mut self,
        first: TrainId,
        range1: RangeInclusive<usize>,
        second: TrainId,
        range2: RangeInclusive<usize>,
    ) -> Result<(), DomainError> {
        if first == second {
            return Err(DomainError::SameTrain(first));
        }
        if !self.trains.contains_key(&first) {
            return Err(DomainError::UnknownTrain(first));
        }
        let other = self
            .trains
            .get_mut(&second)
            .ok_or(DomainError::UnknownTrain(second))?;
        let mut borrowed = other.take_timetable();

        let train = self
            .trains
            .get_mut(&first)
            .ok_or(DomainError::UnknownTrain(first))?;
        let outcome = train
            .timetable_mut()
            .exchange_interval(range1, &mut borrowed, range2);
        if outcome.is_ok() {
            rebind_everywhere(train, self.corridors.values(), &self.config);
        }

        // the timetable goes back whether or not the exchange happened
        let other = self
            .trains
            .get_mut(&second)
            .ok_or(DomainError::UnknownTrain(second))?;
        *other.timetable_mut() = borrowed;
        rebind_everywhere(other, self.corridors.values(), &self.config);
        outcome
    }

    /// Fill a train's unlisted corridor stations from the corridor's ruler,
    /// then rebind it.
    pub fn interpolate(
        &mut self,
        train: TrainId,
        corridor: CorridorId,
        config: &InterpolationConfig,
    ) -> Result<usize, DomainError> {
        let corr = self
            .corridors
            .get(&corridor)
            .ok_or(DomainError::UnknownCorridor(corridor))?;
        let tr = self
            .trains
            .get_mut(&train)
            .ok_or(DomainError::UnknownTrain(train))?;
        let inserted =
            Binder::new(&self.config).interpolate(tr, corr, self.rulers.get(&corridor), config);
        if inserted > 0 {
            rebind_everywhere(tr, self.corridors.values(), &self.config);
        }
        Ok(inserted)
    }
}
