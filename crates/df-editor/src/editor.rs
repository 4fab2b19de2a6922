//! Pointer-driven editing facade.

use df_core::{InletId, LinkId, NodeId, OutletId};
use df_graph::{GraphStore, PortDiff};
use df_model::{FlowGraphModel, HierarchyProjection, Position, ProxyFactory, ProxySync};
use tracing::debug;

use crate::config::EditorConfig;
use crate::error::{EditorResult, LinkingError};
use crate::geometry::Point;
use crate::linking::{LinkOutcome, Linker, LinkingState};
use crate::scene::Scene;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PointerEvent {
    Down(Point),
    Move(Point),
    Up(Point),
    Cancel,
}

/// Owns the model, its proxies and the link gesture in progress.
///
/// Scene hits resolve through the proxy index to projection positions.
pub struct Editor<S, F>
where
    S: Scene<Proxy = F::Proxy>,
    F: ProxyFactory,
{
    model: FlowGraphModel<ProxySync<F>>,
    scene: S,
    linker: Linker,
    config: EditorConfig,
}

/// Centre of the proxy standing for `position`.
fn anchor_of<S, F>(model: &FlowGraphModel<ProxySync<F>>, scene: &S, position: Position) -> Option<Point>
where
    S: Scene<Proxy = F::Proxy>,
    F: ProxyFactory,
{
    let path = model.path(position).ok()?;
    let proxy = model.observer().index().get(&path)?;
    scene.anchor_of(proxy)
}

impl<S, F> Editor<S, F>
where
    S: Scene<Proxy = F::Proxy>,
    F: ProxyFactory,
{
    /// Editor over an empty graph.
    pub fn new(config: EditorConfig, scene: S, factory: F) -> EditorResult<Self> {
        let store = GraphStore::with_outlet_name(config.default_outlet.clone());
        Self::with_store(config, store, scene, factory)
    }

    /// Editor over an existing store; proxies are created for everything in it.
    pub fn with_store(config: EditorConfig, store: GraphStore, scene: S, factory: F) -> EditorResult<Self> {
        config.validate()?;
        let mut sync = ProxySync::new(factory);
        sync.populate(&store)?;
        let model = FlowGraphModel::with_settings(store, sync, config.model_settings());
        Ok(Self {
            model,
            scene,
            linker: Linker::new(),
            config,
        })
    }

    pub fn model(&self) -> &FlowGraphModel<ProxySync<F>> {
        &self.model
    }

    pub fn model_mut(&mut self) -> &mut FlowGraphModel<ProxySync<F>> {
        &mut self.model
    }

    pub fn store(&self) -> &GraphStore {
        self.model.store()
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn linking_state(&self) -> &LinkingState {
        self.linker.state()
    }

    pub fn linker(&self) -> &Linker {
        &self.linker
    }

    /// Projection item under `point`, if any.
    pub fn hit(&self, point: Point) -> Option<Position> {
        let proxy = self.scene.proxy_at(point)?;
        let path = self.model.observer().index().path_of(&proxy)?;
        self.model
            .position_at(&path)
            .ok()
            .filter(|p| *p != Position::Subgraph)
    }

    pub fn anchor(&self, position: Position) -> Option<Point> {
        anchor_of(&self.model, &self.scene, position)
    }

    /// Route one pointer event through the link gesture.
    ///
    /// Returns the outcome when the event finished a gesture.
    pub fn handle(&mut self, event: PointerEvent) -> EditorResult<Option<LinkOutcome>> {
        match event {
            PointerEvent::Down(point) => {
                let Some(position) = self.hit(point) else {
                    return Ok(None);
                };
                let (model, scene) = (&self.model, &self.scene);
                match self.linker.start_linking(model.store(), position, Some(point), |p| {
                    anchor_of(model, scene, p)
                }) {
                    Ok(_) | Err(LinkingError::NotDraggable { .. }) => Ok(None),
                    Err(err) => Err(err.into()),
                }
            }
            PointerEvent::Move(point) => {
                if !self.linker.is_linking() {
                    return Ok(None);
                }
                let hovered = self.hit(point);
                let (model, scene) = (&self.model, &self.scene);
                self.linker
                    .update_linking(model.store(), hovered, point, |p| anchor_of(model, scene, p))?;
                Ok(None)
            }
            PointerEvent::Up(point) => {
                if !self.linker.is_linking() {
                    return Ok(None);
                }
                let target = self.hit(point);
                let outcome = self.linker.finish_linking(&mut self.model, target)?;
                debug!(?outcome, "gesture finished");
                Ok(Some(outcome))
            }
            PointerEvent::Cancel => {
                if self.linker.is_linking() {
                    self.linker.cancel_linking()?;
                }
                Ok(None)
            }
        }
    }

    // ---- programmatic CRUD ----

    pub fn create_node(&mut self) -> EditorResult<NodeId> {
        Ok(self.model.create_node()?)
    }

    pub fn remove_node(&mut self, node: NodeId) -> EditorResult<()> {
        Ok(self.model.remove_node(node)?)
    }

    pub fn set_expression(&mut self, node: NodeId, text: &str) -> EditorResult<PortDiff> {
        Ok(self.model.set_expression(node, text)?)
    }

    pub fn set_node_name(&mut self, node: NodeId, name: &str) -> EditorResult<()> {
        Ok(self.model.set_node_name(node, name)?)
    }

    pub fn add_link(&mut self, outlet: OutletId, inlet: InletId) -> EditorResult<LinkId> {
        Ok(self.model.add_link(outlet, inlet)?)
    }

    pub fn remove_link(&mut self, link: LinkId) -> EditorResult<()> {
        Ok(self.model.remove_link(link)?)
    }

    pub fn relink_source(&mut self, link: LinkId, source: Option<OutletId>) -> EditorResult<()> {
        Ok(self.model.relink_source(link, source)?)
    }

    pub fn build_script(&self, node: NodeId) -> EditorResult<String> {
        Ok(self.model.store().build_script(node)?)
    }
}
