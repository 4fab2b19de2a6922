//! Change notifications emitted by the model.

use df_core::ModelPath;

use crate::projection::HierarchyProjection;

/// Attribute kinds carried by [`ModelEvent::DataChanged`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Role {
    Name,
    Expression,
    /// A link's source changed without a structural move.
    Source,
}

/// Structural and data notifications.
///
/// Rows `first..=last` are children of the item at `parent`. The
/// about-to-be events fire while the old structure is still in place,
/// the others once the new structure is.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModelEvent {
    RowsAboutToBeInserted {
        parent: ModelPath,
        first: usize,
        last: usize,
    },
    RowsInserted {
        parent: ModelPath,
        first: usize,
        last: usize,
    },
    RowsAboutToBeRemoved {
        parent: ModelPath,
        first: usize,
        last: usize,
    },
    RowsRemoved {
        parent: ModelPath,
        first: usize,
        last: usize,
    },
    DataChanged {
        path: ModelPath,
        roles: Vec<Role>,
    },
}

/// Receives model events.
///
/// The projection is lent read-only for the duration of the call, so an
/// observer cannot mutate the tree in the middle of a change bracket.
pub trait ModelObserver {
    fn notify(&mut self, model: &dyn HierarchyProjection, event: &ModelEvent);
}

impl ModelObserver for () {
    fn notify(&mut self, _model: &dyn HierarchyProjection, _event: &ModelEvent) {}
}

impl<O: ModelObserver + ?Sized> ModelObserver for Box<O> {
    fn notify(&mut self, model: &dyn HierarchyProjection, event: &ModelEvent) {
        (**self).notify(model, event);
    }
}

impl<O: ModelObserver> ModelObserver for Vec<O> {
    fn notify(&mut self, model: &dyn HierarchyProjection, event: &ModelEvent) {
        for observer in self {
            observer.notify(model, event);
        }
    }
}

impl<A: ModelObserver, B: ModelObserver> ModelObserver for (A, B) {
    fn notify(&mut self, model: &dyn HierarchyProjection, event: &ModelEvent) {
        self.0.notify(model, event);
        self.1.notify(model, event);
    }
}

/// Observer that records every event.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EventLog {
    events: Vec<ModelEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> &[ModelEvent] {
        &self.events
    }

    pub fn take(&mut self) -> Vec<ModelEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn clear(&mut self) {
        self.events.clear();
    }

    /// Number of structural insert/remove completions recorded.
    pub fn structural_changes(&self) -> usize {
        self.events
            .iter()
            .filter(|e| {
                matches!(
                    e,
                    ModelEvent::RowsInserted { .. } | ModelEvent::RowsRemoved { .. }
                )
            })
            .count()
    }
}

impl ModelObserver for EventLog {
    fn notify(&mut self, _model: &dyn HierarchyProjection, event: &ModelEvent) {
        self.events.push(event.clone());
    }
}
