//! Trains and the bindings derived from them.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use indexmap::IndexMap;

use super::{CorridorId, Timetable};
use crate::binding::Binding;

static NEXT_TRAIN_ID: AtomicU64 = AtomicU64::new(1);

/// Stable identity of a [`Train`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TrainId(u64);

impl fmt::Display for TrainId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "train#{}", self.0)
    }
}

/// A train: identity, classification, timetable and cached bindings.
///
/// Bindings remember the timetable revision they were built from. A binding
/// whose revision no longer matches is stale and is hidden by
/// [`Train::binding`] until it is rebuilt.
#[derive(Debug, Clone)]
pub struct Train {
    id: TrainId,
    /// Train number, e.g. "G101"
    pub name: String,
    /// Classification, e.g. "EMU" or "freight"
    pub kind: String,
    pub passenger: bool,
    timetable: Timetable,
    bindings: IndexMap<CorridorId, Binding>,
}

impl Train {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_timetable(name, Timetable::new())
    }

    pub fn with_timetable(name: impl Into<String>, timetable: Timetable) -> Self {
        Self {
            id: TrainId(NEXT_TRAIN_ID.fetch_add(1, Ordering::Relaxed)),
            name: name.into(),
            kind: String::new(),
            passenger: true,
            timetable,
            bindings: IndexMap::new(),
        }
    }

    pub fn with_kind(mut self, kind: impl Into<String>) -> Self {
        self.kind = kind.into();
        self
    }

    pub fn with_passenger(mut self, passenger: bool) -> Self {
        self.passenger = passenger;
        self
    }

    pub fn id(&self) -> TrainId {
        self.id
    }

    pub fn timetable(&self) -> &Timetable {
        &self.timetable
    }

    /// Mutable timetable access. Existing bindings go stale until rebuilt.
    pub fn timetable_mut(&mut self) -> &mut Timetable {
        &mut self.timetable
    }

    /// Take the timetable out, leaving an empty one behind.
    pub(crate) fn take_timetable(&mut self) -> Timetable {
        std::mem::take(&mut self.timetable)
    }

    /// The current binding to `corridor`, if any and not stale.
    pub fn binding(&self, corridor: CorridorId) -> Option<&Binding> {
        self.bindings
            .get(&corridor)
            .filter(|b| b.timetable_revision() == self.timetable.revision())
    }

    /// All current (non-stale) bindings.
    pub fn bindings(&self) -> impl Iterator<Item = &Binding> {
        let revision = self.timetable.revision();
        self.bindings
            .values()
            .filter(move |b| b.timetable_revision() == revision)
    }

    /// Replace the binding for `corridor` whole. `None` removes it.
    pub fn set_binding(&mut self, corridor: CorridorId, binding: Option<Binding>) {
        match binding {
            Some(b) => {
                self.bindings.insert(corridor, b);
            }
            None => {
                self.bindings.shift_remove(&corridor);
            }
        }
    }

    pub fn clear_bindings(&mut self) {
        self.bindings.clear();
    }
}
