//! Link-dragging state machine.
//!
//! A gesture starts on an inlet, an outlet or one end of a link, previews
//! the prospective connection while the pointer moves and applies it on
//! drop. Every path out of a gesture returns to `Idle`; a drop that cannot
//! be honoured leaves the graph untouched.

use df_core::{InletId, LinkId, OutletId};
use df_graph::{GraphError, GraphStore, PortRef};
use df_model::{FlowGraphModel, HierarchyProjection, ModelError, ModelObserver, Position};
use tracing::{debug, warn};

use crate::error::{EditorResult, LinkingError};
use crate::geometry::{Point, PreviewLine, manhattan};

/// Which end of the prospective link the pointer carries.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnchorKind {
    /// Started on an inlet; looking for an outlet.
    Inlet,
    /// Started on an outlet; looking for an inlet.
    Outlet,
    /// Moving the target end of an existing link.
    LinkHead,
    /// Moving the source end of an existing link.
    LinkTail,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Preview {
    pub line: Option<PreviewLine>,
    /// Connection a drop at the current pointer would make.
    pub candidate: Option<(OutletId, InletId)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum LinkingState {
    #[default]
    Idle,
    Linking {
        anchor: Position,
        anchor_kind: AnchorKind,
        preview: Preview,
    },
}

/// Result of a finished gesture.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LinkOutcome {
    Created(LinkId),
    /// An existing link was replaced by one with a moved end.
    Moved { removed: LinkId, created: LinkId },
    /// A fully connected link was dropped on empty space.
    Removed(LinkId),
    Unchanged,
    /// The drop target was not a valid complement; nothing changed.
    Rejected,
}

/// The (outlet, inlet) pair a drop on `target` would produce, per anchor kind.
pub fn candidate(
    store: &GraphStore,
    anchor: Position,
    anchor_kind: AnchorKind,
    target: Position,
) -> Option<(OutletId, InletId)> {
    let (outlet, inlet) = match (anchor_kind, anchor, target) {
        (AnchorKind::Outlet, Position::Outlet(o), Position::Inlet(i)) => (o, i),
        (AnchorKind::Inlet, Position::Inlet(i), Position::Outlet(o)) => (o, i),
        (AnchorKind::LinkHead, Position::Link(l), Position::Inlet(i)) => (store.link_source(l)?, i),
        (AnchorKind::LinkTail, Position::Link(l), Position::Outlet(o)) => (o, store.link_target(l)?),
        _ => return None,
    };
    store.can_link(PortRef::Outlet(outlet), PortRef::Inlet(inlet))
}

/// The end that stays put while the gesture runs.
fn fixed_end(store: &GraphStore, anchor: Position, anchor_kind: AnchorKind) -> Option<Position> {
    match (anchor_kind, anchor) {
        (AnchorKind::Inlet | AnchorKind::Outlet, port) => Some(port),
        (AnchorKind::LinkHead, Position::Link(l)) => store.link_source(l).map(Position::Outlet),
        (AnchorKind::LinkTail, Position::Link(l)) => store.link_target(l).map(Position::Inlet),
        _ => None,
    }
}

/// Pick the end of `link` to drag.
///
/// With both ends connected the end nearer the pointer wins, ties and
/// missing geometry going to the tail. A link with only a source drags its
/// head; one with only a target drags its tail.
fn pick_link_end(
    store: &GraphStore,
    link: LinkId,
    pointer: Option<Point>,
    anchor_at: &impl Fn(Position) -> Option<Point>,
) -> AnchorKind {
    match (store.link_source(link), store.link_target(link)) {
        (Some(source), Some(target)) => {
            let (Some(pointer), Some(tail), Some(head)) = (
                pointer,
                anchor_at(Position::Outlet(source)),
                anchor_at(Position::Inlet(target)),
            ) else {
                return AnchorKind::LinkTail;
            };
            if manhattan(&pointer, &head) < manhattan(&pointer, &tail) {
                AnchorKind::LinkHead
            } else {
                AnchorKind::LinkTail
            }
        }
        (Some(_), None) => AnchorKind::LinkHead,
        _ => AnchorKind::LinkTail,
    }
}

fn is_refusal(err: &ModelError) -> bool {
    matches!(
        err,
        ModelError::Graph(GraphError::CannotLink { .. } | GraphError::CycleRejected { .. })
    )
}

#[derive(Debug, Clone, Default)]
pub struct Linker {
    state: LinkingState,
}

impl Linker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> &LinkingState {
        &self.state
    }

    pub fn is_linking(&self) -> bool {
        matches!(self.state, LinkingState::Linking { .. })
    }

    pub fn preview(&self) -> Option<&Preview> {
        match &self.state {
            LinkingState::Linking { preview, .. } => Some(preview),
            LinkingState::Idle => None,
        }
    }

    /// Begin dragging from `position`. A gesture already in progress is
    /// cancelled first.
    pub fn start_linking(
        &mut self,
        store: &GraphStore,
        position: Position,
        pointer: Option<Point>,
        anchor_at: impl Fn(Position) -> Option<Point>,
    ) -> Result<AnchorKind, LinkingError> {
        if self.is_linking() {
            self.cancel_linking()?;
        }
        if !store.contains(position) {
            return Err(LinkingError::NotDraggable { position });
        }
        let anchor_kind = match position {
            Position::Inlet(_) => AnchorKind::Inlet,
            Position::Outlet(_) => AnchorKind::Outlet,
            Position::Link(link) => pick_link_end(store, link, pointer, &anchor_at),
            Position::Subgraph | Position::Node(_) => {
                return Err(LinkingError::NotDraggable { position });
            }
        };

        let line = fixed_end(store, position, anchor_kind)
            .and_then(&anchor_at)
            .zip(pointer)
            .map(|(from, to)| PreviewLine::new(from, to));
        debug!(%position, ?anchor_kind, "start linking");
        self.state = LinkingState::Linking {
            anchor: position,
            anchor_kind,
            preview: Preview {
                line,
                candidate: None,
            },
        };
        Ok(anchor_kind)
    }

    /// Track the pointer over `hovered`; returns the connection a drop
    /// there would make.
    pub fn update_linking(
        &mut self,
        store: &GraphStore,
        hovered: Option<Position>,
        pointer: Point,
        anchor_at: impl Fn(Position) -> Option<Point>,
    ) -> Result<Option<(OutletId, InletId)>, LinkingError> {
        let LinkingState::Linking {
            anchor,
            anchor_kind,
            preview,
        } = &mut self.state
        else {
            return Err(LinkingError::NotLinking);
        };

        preview.candidate = hovered.and_then(|target| candidate(store, *anchor, *anchor_kind, target));
        // Snap the free end onto the hovered port when it would connect.
        let to = preview
            .candidate
            .and(hovered)
            .and_then(&anchor_at)
            .unwrap_or(pointer);
        preview.line = fixed_end(store, *anchor, *anchor_kind)
            .and_then(&anchor_at)
            .map(|from| PreviewLine::new(from, to));
        Ok(preview.candidate)
    }

    /// Apply the gesture for a drop on `target` (`None` for empty space)
    /// and return to `Idle`.
    pub fn finish_linking<O: ModelObserver>(
        &mut self,
        model: &mut FlowGraphModel<O>,
        target: Option<Position>,
    ) -> EditorResult<LinkOutcome> {
        let LinkingState::Linking {
            anchor,
            anchor_kind,
            ..
        } = std::mem::take(&mut self.state)
        else {
            return Err(LinkingError::NotLinking.into());
        };

        let outcome = match (anchor_kind, anchor, target) {
            (AnchorKind::Inlet | AnchorKind::Outlet, _, None) => LinkOutcome::Unchanged,
            (AnchorKind::Inlet | AnchorKind::Outlet, _, Some(target)) => {
                match candidate(model.store(), anchor, anchor_kind, target) {
                    Some((outlet, inlet)) => match model.add_link(outlet, inlet) {
                        Ok(link) => LinkOutcome::Created(link),
                        Err(err) if is_refusal(&err) => LinkOutcome::Rejected,
                        Err(err) => return Err(err.into()),
                    },
                    None => LinkOutcome::Rejected,
                }
            }
            (AnchorKind::LinkHead | AnchorKind::LinkTail, Position::Link(link), None) => {
                if model.store().link_source(link).is_some() {
                    model.remove_link(link)?;
                    LinkOutcome::Removed(link)
                } else {
                    LinkOutcome::Unchanged
                }
            }
            (AnchorKind::LinkHead | AnchorKind::LinkTail, Position::Link(link), Some(target)) => {
                Self::move_link(model, link, anchor_kind, target)?
            }
            _ => LinkOutcome::Rejected,
        };

        if outcome == LinkOutcome::Rejected {
            warn!(%anchor, ?anchor_kind, ?target, "link gesture rejected");
        } else {
            debug!(%anchor, ?outcome, "finish linking");
        }
        Ok(outcome)
    }

    /// Replace `link` by one with the dragged end on `target`.
    fn move_link<O: ModelObserver>(
        model: &mut FlowGraphModel<O>,
        link: LinkId,
        anchor_kind: AnchorKind,
        target: Position,
    ) -> EditorResult<LinkOutcome> {
        let Some((outlet, inlet)) = candidate(model.store(), Position::Link(link), anchor_kind, target)
        else {
            return Ok(LinkOutcome::Rejected);
        };
        let current = (model.store().link_source(link), model.store().link_target(link));
        if current == (Some(outlet), Some(inlet)) {
            return Ok(LinkOutcome::Unchanged);
        }
        match model.check_link(outlet, inlet) {
            Ok(()) => {}
            Err(err) if is_refusal(&err) => return Ok(LinkOutcome::Rejected),
            Err(err) => return Err(err.into()),
        }
        model.remove_link(link)?;
        let created = model.add_link(outlet, inlet)?;
        Ok(LinkOutcome::Moved {
            removed: link,
            created,
        })
    }

    /// Abandon the gesture; the dragged link keeps its connections.
    pub fn cancel_linking(&mut self) -> Result<(), LinkingError> {
        if !self.is_linking() {
            return Err(LinkingError::NotLinking);
        }
        debug!("cancel linking");
        self.state = LinkingState::Idle;
        Ok(())
    }
}
