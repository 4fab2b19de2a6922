//! Observer keeping a [`PositionProxyIndex`] aligned with the projection.

use std::hash::Hash;

use df_core::ModelPath;
use tracing::{debug, warn};

use crate::error::ModelResult;
use crate::events::{ModelEvent, ModelObserver, Role};
use crate::position::Position;
use crate::projection::HierarchyProjection;
use crate::proxy_index::PositionProxyIndex;

/// Creates and disposes of the rendered stand-in for a projection item.
pub trait ProxyFactory {
    type Proxy: Clone + Eq + Hash;

    fn create(&mut self, position: Position) -> Self::Proxy;

    fn destroy(&mut self, proxy: Self::Proxy);

    /// The item behind `proxy` changed the listed attributes.
    fn refresh(&mut self, _proxy: &Self::Proxy, _roles: &[Role]) {}
}

/// Creates proxies once rows are inserted and destroys them before rows
/// are removed.
pub struct ProxySync<F: ProxyFactory> {
    factory: F,
    index: PositionProxyIndex<F::Proxy>,
}

impl<F: ProxyFactory> ProxySync<F> {
    pub fn new(factory: F) -> Self {
        Self {
            factory,
            index: PositionProxyIndex::new(),
        }
    }

    pub fn factory(&self) -> &F {
        &self.factory
    }

    pub fn factory_mut(&mut self) -> &mut F {
        &mut self.factory
    }

    pub fn index(&self) -> &PositionProxyIndex<F::Proxy> {
        &self.index
    }

    /// Create proxies for every item already in `model`, replacing any
    /// previously held.
    pub fn populate(&mut self, model: &dyn HierarchyProjection) -> ModelResult<()> {
        for proxy in self.index.clear() {
            self.factory.destroy(proxy);
        }
        let count = model.row_count(Position::Subgraph)?;
        for row in 0..count {
            self.insert_subtree(model, ModelPath::root().child(row))?;
        }
        debug!(proxies = self.index.len(), "populated proxies");
        Ok(())
    }

    fn insert_subtree(&mut self, model: &dyn HierarchyProjection, path: ModelPath) -> ModelResult<()> {
        let position = model.position_at(&path)?;
        let proxy = self.factory.create(position);
        if let Err(err) = self.index.insert(&path, proxy.clone()) {
            warn!(%path, %err, "proxy index out of step");
            self.factory.destroy(proxy);
            return Ok(());
        }
        for row in 0..model.row_count(position)? {
            self.insert_subtree(model, path.child(row))?;
        }
        Ok(())
    }

    fn remove_rows(&mut self, parent: &ModelPath, first: usize, last: usize) {
        for row in (first..=last).rev() {
            let path = parent.child(row);
            match self.index.remove(&path) {
                Ok(proxies) => {
                    for proxy in proxies {
                        self.factory.destroy(proxy);
                    }
                }
                Err(err) => warn!(%path, %err, "proxy index out of step"),
            }
        }
    }
}

impl<F: ProxyFactory> ModelObserver for ProxySync<F> {
    fn notify(&mut self, model: &dyn HierarchyProjection, event: &ModelEvent) {
        match event {
            ModelEvent::RowsInserted {
                parent,
                first,
                last,
            } => {
                for row in *first..=*last {
                    if let Err(err) = self.insert_subtree(model, parent.child(row)) {
                        warn!(%parent, row, %err, "cannot create proxy");
                    }
                }
            }
            ModelEvent::RowsAboutToBeRemoved {
                parent,
                first,
                last,
            } => self.remove_rows(parent, *first, *last),
            ModelEvent::DataChanged { path, roles } => {
                if let Some(proxy) = self.index.get(path) {
                    self.factory.refresh(proxy, roles);
                }
            }
            ModelEvent::RowsAboutToBeInserted { .. } | ModelEvent::RowsRemoved { .. } => {}
        }
    }
}
