//! Manipulation controller
//!
//! Turns pointer and keyboard input into scene edits. The controller is not
//! modal: what a pointer press does depends on what is under it.
//!
//! - empty canvas: box selection
//! - node body: select (unless already selected) and drag
//! - resize/rotate handle of a selected node: that gesture
//!
//! Live gesture geometry never saves. When a gesture ends every affected node
//! commits through [`Scene::set_placement_from_geometry`] and the saves of a
//! multi-node gesture are coalesced into one.

use crate::geometry::{normalize_degrees, Point, Rect};
use crate::scene::{NodeId, Scene};

use super::events::{Handle, Key, Modifiers, PointerDown, ResizeDirection};
use super::resize::ResizeSession;
use super::snapping::{snap_rect, Guide};

/// Observable state of the controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerState {
    Idle,
    Selecting,
    Dragging,
    DraggingGroup,
    Resizing,
    ResizingGroup,
    Rotating,
    RotatingGroup,
}

#[derive(Debug, Clone)]
struct DragTarget {
    node: NodeId,
    start_rect: Rect,
    container: Rect,
}

#[derive(Debug, Clone)]
struct DragGesture {
    origin: Point,
    delta: Point,
    targets: Vec<DragTarget>,
    /// Rects the dragged group can snap to
    snap_candidates: Vec<Rect>,
}

#[derive(Debug, Clone)]
struct ResizeGesture {
    origin: Point,
    direction: ResizeDirection,
    sessions: Vec<ResizeSession>,
    moved: bool,
}

#[derive(Debug, Clone)]
struct RotateGesture {
    pivot: Point,
    start_pointer_angle: f64,
    /// Persisted rotation of each node at gesture start
    start_rotations: Vec<(NodeId, Option<f64>)>,
    moved: bool,
}

#[derive(Debug, Clone)]
struct MarqueeGesture {
    origin: Point,
    current: Point,
    /// Selection kept when the box selection is additive
    base: Vec<NodeId>,
}

#[derive(Debug, Clone, Default)]
enum Gesture {
    #[default]
    Idle,
    Selecting(MarqueeGesture),
    Dragging(DragGesture),
    Resizing(ResizeGesture),
    Rotating(RotateGesture),
}

/// Pointer/keyboard state machine over a [`Scene`]
#[derive(Debug, Default)]
pub struct ManipulationController {
    gesture: Gesture,
    guides: Vec<Guide>,
}

impl ManipulationController {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> ControllerState {
        match &self.gesture {
            Gesture::Idle => ControllerState::Idle,
            Gesture::Selecting(_) => ControllerState::Selecting,
            Gesture::Dragging(drag) if drag.targets.len() > 1 => ControllerState::DraggingGroup,
            Gesture::Dragging(_) => ControllerState::Dragging,
            Gesture::Resizing(resize) if resize.sessions.len() > 1 => ControllerState::ResizingGroup,
            Gesture::Resizing(_) => ControllerState::Resizing,
            Gesture::Rotating(rotate) if rotate.start_rotations.len() > 1 => ControllerState::RotatingGroup,
            Gesture::Rotating(_) => ControllerState::Rotating,
        }
    }

    /// Snap guides of the current drag
    pub fn guides(&self) -> &[Guide] {
        &self.guides
    }

    /// Box of the current box selection
    pub fn marquee(&self) -> Option<Rect> {
        match &self.gesture {
            Gesture::Selecting(marquee) => Some(Rect::from_corners(marquee.origin, marquee.current)),
            _ => None,
        }
    }

    // ============================================
    // Pointer input
    // ============================================

    pub fn pointer_down(&mut self, scene: &mut Scene, event: PointerDown) {
        if !scene.editing_enabled() {
            return;
        }
        if !matches!(self.gesture, Gesture::Idle) {
            tracing::debug!("pointer down ignored, a gesture is already running");
            return;
        }

        let target = event
            .target
            .and_then(|handle| scene.selection_index().find_owner(handle))
            .or_else(|| scene.hit_test(event.position))
            .filter(|id| *id != scene.root());

        match (target, event.handle) {
            (Some(id), Handle::Resize(direction)) if scene.is_selected(id) => {
                self.begin_resize(scene, event.position, direction);
            }
            (Some(id), Handle::Rotate) if scene.is_selected(id) => {
                self.begin_rotate(scene, event.position);
            }
            (Some(id), _) => {
                if event.modifiers.shift {
                    let mut selection = scene.selection().to_vec();
                    if scene.is_selected(id) {
                        selection.retain(|selected| *selected != id);
                        scene.update_selection(selection);
                        return;
                    }
                    selection.push(id);
                    scene.update_selection(selection);
                } else if !scene.is_selected(id) {
                    scene.update_selection(vec![id]);
                }
                self.begin_drag(scene, event.position);
            }
            (None, _) => {
                let base = if event.modifiers.shift {
                    scene.selection().to_vec()
                } else {
                    if !scene.selection().is_empty() {
                        scene.clear_selection();
                    }
                    Vec::new()
                };
                self.gesture = Gesture::Selecting(MarqueeGesture {
                    origin: event.position,
                    current: event.position,
                    base,
                });
            }
        }
    }

    pub fn pointer_move(&mut self, scene: &mut Scene, position: Point) {
        if matches!(self.gesture, Gesture::Idle) {
            return;
        }
        if !scene.editing_enabled() {
            self.cancel(scene);
            return;
        }

        match &mut self.gesture {
            Gesture::Idle => {}
            Gesture::Selecting(marquee) => marquee.current = position,
            Gesture::Dragging(drag) => {
                let raw = position - drag.origin;
                let mut delta = raw;
                self.guides.clear();
                if scene.config().snapping {
                    let bounds = drag
                        .targets
                        .iter()
                        .map(|target| target.start_rect.translate(raw))
                        .reduce(|acc, rect| acc.union(&rect));
                    if let Some(bounds) = bounds {
                        let snap = snap_rect(&bounds, &drag.snap_candidates, scene.config().snap_threshold);
                        delta = raw + snap.offset;
                        self.guides = snap.guides;
                    }
                }
                drag.delta = delta;
                for target in &drag.targets {
                    if let Some(node) = scene.node_mut(target.node) {
                        node.set_live_offset(delta);
                    }
                }
            }
            Gesture::Resizing(resize) => {
                let delta = position - resize.origin;
                resize.moved |= !delta.is_zero();
                let min_size = scene.config().min_element_size;
                for session in &resize.sessions {
                    let rect = session.proposed_rect(resize.direction, delta, min_size);
                    scene.apply_live_placement(session.node, session.live_placement(&rect), session.session_constraint);
                }
            }
            Gesture::Rotating(rotate) => {
                let angle = pointer_angle(rotate.pivot, position) - rotate.start_pointer_angle;
                rotate.moved |= angle != 0.0;
                for (node, start) in &rotate.start_rotations {
                    if let Err(err) = scene.apply_rotation(*node, start.unwrap_or(0.0) + angle) {
                        tracing::warn!("rotation skipped: {}", err);
                    }
                }
            }
        }
    }

    pub fn pointer_up(&mut self, scene: &mut Scene, position: Point) {
        if matches!(self.gesture, Gesture::Idle) {
            return;
        }
        self.pointer_move(scene, position);
        self.guides.clear();

        match std::mem::take(&mut self.gesture) {
            Gesture::Idle => {}
            Gesture::Selecting(marquee) => {
                let area = Rect::from_corners(marquee.origin, marquee.current);
                let hits = if area.width < 1.0 && area.height < 1.0 {
                    Vec::new()
                } else {
                    scene.nodes_in_rect(&area)
                };
                if hits.is_empty() {
                    return;
                }
                let mut selection = marquee.base;
                selection.extend(hits);
                scene.update_selection(selection);
            }
            Gesture::Dragging(drag) => {
                if drag.delta.is_zero() {
                    for target in &drag.targets {
                        scene.layout_subtree(target.node);
                    }
                    return;
                }
                tracing::debug!(nodes = drag.targets.len(), dx = drag.delta.x, dy = drag.delta.y, "drag end");
                scene.batch(|scene| {
                    for target in &drag.targets {
                        let rect = target.start_rect.translate(drag.delta);
                        if let Err(err) = scene.set_placement_from_geometry(target.node, rect, target.container) {
                            tracing::warn!("drag commit skipped: {}", err);
                        }
                    }
                });
            }
            Gesture::Resizing(resize) => {
                if !resize.moved {
                    rollback_resize(scene, &resize.sessions);
                    return;
                }
                tracing::debug!(nodes = resize.sessions.len(), "resize end");
                scene.batch(|scene| {
                    for session in &resize.sessions {
                        let Some(node) = scene.node_mut(session.node) else {
                            continue;
                        };
                        node.constraint = session.original_constraint;
                        let rect = node.rect();
                        if let Err(err) = scene.set_placement_from_geometry(session.node, rect, session.container) {
                            tracing::warn!("resize commit skipped: {}", err);
                        }
                    }
                });
            }
            Gesture::Rotating(rotate) => {
                if !rotate.moved {
                    return;
                }
                tracing::debug!(nodes = rotate.start_rotations.len(), "rotate end");
                scene.batch(|scene| {
                    for (node, _) in &rotate.start_rotations {
                        let Some(rotation) = scene.node(*node).map(|n| n.placement().rotation_degrees()) else {
                            continue;
                        };
                        if let Err(err) = scene.set_rotation(*node, rotation) {
                            tracing::warn!("rotate commit skipped: {}", err);
                        }
                    }
                });
            }
        }
    }

    /// Abort the running gesture, restoring the state at its start.
    /// Nothing is saved.
    pub fn cancel(&mut self, scene: &mut Scene) {
        self.guides.clear();
        match std::mem::take(&mut self.gesture) {
            Gesture::Idle | Gesture::Selecting(_) => {}
            Gesture::Dragging(drag) => {
                for target in &drag.targets {
                    scene.layout_subtree(target.node);
                }
            }
            Gesture::Resizing(resize) => rollback_resize(scene, &resize.sessions),
            Gesture::Rotating(rotate) => {
                for (id, start) in &rotate.start_rotations {
                    if let Some(node) = scene.node_mut(*id) {
                        node.placement.rotation = *start;
                    }
                    scene.layout_subtree(*id);
                }
            }
        }
        tracing::debug!("gesture cancelled");
    }

    // ============================================
    // Keyboard input
    // ============================================

    pub fn key_down(&mut self, scene: &mut Scene, key: Key, modifiers: Modifiers) {
        if !scene.editing_enabled() {
            return;
        }
        if key == Key::Escape {
            if matches!(self.gesture, Gesture::Idle) {
                if !scene.selection().is_empty() {
                    scene.clear_selection();
                }
            } else {
                self.cancel(scene);
            }
            return;
        }
        if !matches!(self.gesture, Gesture::Idle) {
            return;
        }

        let targets = scene.selection_roots();
        if targets.is_empty() {
            return;
        }
        if matches!(key, Key::Delete | Key::Backspace) {
            scene.batch(|scene| {
                for id in &targets {
                    if let Err(err) = scene.delete(*id) {
                        tracing::warn!("delete skipped: {}", err);
                    }
                }
            });
            return;
        }
        if let Some(direction) = key.nudge_direction() {
            let step = if modifiers.shift {
                scene.config().nudge_step_large
            } else {
                scene.config().nudge_step
            };
            let offset = Point::new(direction.x * step, direction.y * step);
            scene.batch(|scene| {
                for id in &targets {
                    let Some(rect) = scene.node(*id).map(|node| node.rect().translate(offset)) else {
                        continue;
                    };
                    if let Err(err) = scene.set_geometry(*id, rect) {
                        tracing::warn!("nudge skipped: {}", err);
                    }
                }
            });
        }
    }

    // ============================================
    // Gesture setup
    // ============================================

    fn begin_drag(&mut self, scene: &Scene, origin: Point) {
        let targets: Vec<DragTarget> = scene
            .selection_roots()
            .into_iter()
            .filter_map(|id| {
                scene.node(id).map(|node| DragTarget {
                    node: id,
                    start_rect: node.rect(),
                    container: scene.container_rect(id),
                })
            })
            .collect();
        let Some(first) = targets.first() else {
            return;
        };

        let mut snap_candidates = Vec::new();
        if scene.config().snapping {
            snap_candidates.push(first.container);
            if let Some(parent) = scene.parent(first.node) {
                for sibling in scene.children(parent) {
                    let dragged = targets
                        .iter()
                        .any(|target| scene.is_ancestor_or_self(target.node, *sibling));
                    if let (false, Some(node)) = (dragged, scene.node(*sibling)) {
                        snap_candidates.push(node.rect());
                    }
                }
            }
        }

        tracing::debug!(nodes = targets.len(), "drag start");
        self.gesture = Gesture::Dragging(DragGesture {
            origin,
            delta: Point::zero(),
            targets,
            snap_candidates,
        });
    }

    fn begin_resize(&mut self, scene: &mut Scene, origin: Point, direction: ResizeDirection) {
        let sessions: Vec<ResizeSession> = scene
            .selection_roots()
            .into_iter()
            .filter_map(|id| {
                scene
                    .node(id)
                    .map(|node| ResizeSession::begin(node, scene.container_rect(id)))
            })
            .collect();
        if sessions.is_empty() {
            return;
        }
        for session in sessions.iter().filter(|s| s.swapped()) {
            scene.apply_live_placement(session.node, session.start_placement(), session.session_constraint);
        }
        tracing::debug!(nodes = sessions.len(), "resize start");
        self.gesture = Gesture::Resizing(ResizeGesture {
            origin,
            direction,
            sessions,
            moved: false,
        });
    }

    fn begin_rotate(&mut self, scene: &Scene, origin: Point) {
        let roots = scene.selection_roots();
        let start_rotations: Vec<(NodeId, Option<f64>)> = roots
            .iter()
            .filter_map(|id| scene.node(*id).map(|node| (*id, node.placement().rotation)))
            .collect();
        let Some(pivot) = roots
            .iter()
            .filter_map(|id| scene.node(*id).map(|node| node.rect()))
            .reduce(|acc, rect| acc.union(&rect))
            .map(|bounds| bounds.center())
        else {
            return;
        };
        tracing::debug!(nodes = start_rotations.len(), "rotate start");
        self.gesture = Gesture::Rotating(RotateGesture {
            pivot,
            start_pointer_angle: pointer_angle(pivot, origin),
            start_rotations,
            moved: false,
        });
    }
}

/// Angle of `point` around `pivot`, clockwise degrees (y down)
fn pointer_angle(pivot: Point, point: Point) -> f64 {
    normalize_degrees((point.y - pivot.y).atan2(point.x - pivot.x).to_degrees())
}

fn rollback_resize(scene: &mut Scene, sessions: &[ResizeSession]) {
    for session in sessions {
        scene.apply_live_placement(session.node, session.original_placement, session.original_constraint);
    }
}
