//! Structural edits of the node tree.
//!
//! Every public operation here leaves the tree and the name index consistent,
//! emits exactly one save (coalesced inside an enclosing [`Scene::batch`]) and
//! queues a selection index rebuild.

use crate::error::SceneError;
use crate::geometry::{capture, Constraint, HorizontalConstraint, Placement, Rect, VerticalConstraint};
use crate::registry::FRAME_KIND;

use super::graph::{DeferredTask, Scene};
use super::node::{ElementNode, NodeId};

/// Z-order destination for [`Scene::move_to`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZOrder {
    /// Painted last, above its siblings
    Top,
    /// Painted first, below its siblings
    Bottom,
}

/// A subtree taken out of a scene, ready to be inserted again
#[derive(Debug, Clone)]
pub struct DetachedSubtree {
    root: NodeId,
    nodes: Vec<ElementNode>,
}

impl DetachedSubtree {
    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.nodes.iter().map(|node| node.name())
    }

    /// The subtree's top node
    pub fn root_node(&self) -> Option<&ElementNode> {
        self.nodes.iter().find(|node| node.id() == self.root)
    }
}

impl From<ElementNode> for DetachedSubtree {
    fn from(node: ElementNode) -> Self {
        Self {
            root: node.id(),
            nodes: vec![node],
        }
    }
}

impl Scene {
    /// A detached node of `kind_id` with default config and placement.
    ///
    /// The name is generated when not given. Unknown kinds produce a
    /// placeholder node that still remembers `kind_id`.
    pub fn create_node(&self, kind_id: &str, name: Option<&str>) -> ElementNode {
        let kind = self.registry().get_or_not_found(kind_id);
        if kind.is_placeholder() {
            tracing::warn!(kind = kind_id, "creating element of unknown kind");
        }
        let name = match name.filter(|n| !n.trim().is_empty()) {
            Some(name) => name.to_string(),
            None => self.get_next_element_name(kind.container().is_some()),
        };
        let placement = self.default_placement(kind.as_ref());
        ElementNode::new(name, kind_id, kind, placement, Constraint::top_left())
    }

    /// Create a node of `kind_id` and append it to `parent`
    pub fn add_element(&mut self, parent: NodeId, kind_id: &str) -> Result<NodeId, SceneError> {
        let node = self.create_node(kind_id, None);
        self.insert(parent, node, None)
    }

    /// Insert a detached node (or subtree) into `parent` at `index`,
    /// appending when `index` is `None`
    pub fn insert(
        &mut self,
        parent: NodeId,
        subtree: impl Into<DetachedSubtree>,
        index: Option<usize>,
    ) -> Result<NodeId, SceneError> {
        let subtree = subtree.into();
        let len = self.child_count(parent)?;
        let index = index.unwrap_or(len);
        if index > len {
            return Err(SceneError::index_out_of_bounds(self.display_name(parent), index, len));
        }
        if let Some(taken) = subtree.names().find(|name| self.by_name.contains_key(*name)) {
            return Err(SceneError::duplicate_name(taken));
        }

        let root = subtree.root;
        for mut node in subtree.nodes {
            if node.id() == root {
                node.parent = Some(parent);
            }
            self.by_name.insert(node.name.clone(), node.id());
            self.nodes.insert(node.id(), node);
        }
        if let Some(container) = self.nodes.get_mut(&parent).and_then(|p| p.container.as_mut()) {
            container.children.insert(index, root);
        }
        self.layout_subtree(root);
        tracing::debug!(node = %root, parent = %parent, index, "inserted element");
        self.after_structural_change();
        Ok(root)
    }

    /// Take `id` and its subtree out of `parent`.
    ///
    /// The returned subtree's top node still names `parent` as its parent;
    /// [`insert`](Scene::insert) overwrites it.
    pub fn remove(&mut self, parent: NodeId, id: NodeId) -> Result<DetachedSubtree, SceneError> {
        let position = self.child_position(parent, id)?;
        let ids = self.subtree(id);
        if let Some(container) = self.nodes.get_mut(&parent).and_then(|p| p.container.as_mut()) {
            container.children.remove(position);
        }
        let mut nodes = Vec::with_capacity(ids.len());
        for node_id in ids {
            if let Some(node) = self.nodes.remove(&node_id) {
                self.by_name.remove(&node.name);
                nodes.push(node);
            }
        }
        self.prune_selection();
        tracing::debug!(node = %id, parent = %parent, "removed element");
        self.after_structural_change();
        Ok(DetachedSubtree { root: id, nodes })
    }

    /// Move the child at `from` to `to` within `parent`
    pub fn reorder(&mut self, parent: NodeId, from: usize, to: usize) -> Result<(), SceneError> {
        let len = self.child_count(parent)?;
        for index in [from, to] {
            if index >= len {
                return Err(SceneError::index_out_of_bounds(self.display_name(parent), index, len));
            }
        }
        if from == to {
            return Ok(());
        }
        if let Some(container) = self.nodes.get_mut(&parent).and_then(|p| p.container.as_mut()) {
            let child = container.children.remove(from);
            container.children.insert(to, child);
        }
        self.after_structural_change();
        Ok(())
    }

    /// Copy a leaf next to itself under a generated name.
    ///
    /// With `shift`, the copy moves by the configured offset along every
    /// edge its constraint pins. Containers are not duplicated.
    pub fn duplicate(&mut self, id: NodeId, shift: bool) -> Result<Option<NodeId>, SceneError> {
        let node = self.require(id)?;
        if node.is_container() {
            tracing::warn!(element = %node.name(), "duplicating containers is not supported");
            return Ok(None);
        }
        let Some(parent) = node.parent() else {
            return Ok(None);
        };

        let name = self.get_next_element_name(false);
        let mut copy = node.duplicate_as(name);
        if shift {
            copy.placement = shifted(copy.placement, &copy.constraint, self.config().duplicate_offset);
        }
        copy.parent = Some(parent);

        let copy_id = copy.id();
        self.by_name.insert(copy.name.clone(), copy_id);
        self.nodes.insert(copy_id, copy);
        if let Some(container) = self.nodes.get_mut(&parent).and_then(|p| p.container.as_mut()) {
            container.children.push(copy_id);
        }
        self.layout_subtree(copy_id);
        tracing::debug!(source = %id, copy = %copy_id, "duplicated element");
        self.after_structural_change();
        Ok(Some(copy_id))
    }

    /// Remove a node and its subtree for good
    pub fn delete(&mut self, id: NodeId) -> Result<(), SceneError> {
        let node = self.require(id)?;
        let Some(parent) = node.parent() else {
            tracing::warn!("the root element cannot be deleted");
            return Ok(());
        };

        let ids = self.subtree(id);
        if let Some(container) = self.nodes.get_mut(&parent).and_then(|p| p.container.as_mut()) {
            container.children.retain(|child| *child != id);
        }
        for node_id in ids {
            if let Some(node) = self.nodes.remove(&node_id) {
                self.by_name.remove(&node.name);
                if let Some(connections) = self.connections.as_mut() {
                    connections.on_delete(&node);
                }
            }
        }
        self.prune_selection();
        tracing::debug!(node = %id, "deleted element");
        self.after_structural_change();
        Ok(())
    }

    /// Move a node to the top or bottom of its siblings
    pub fn move_to(&mut self, id: NodeId, order: ZOrder) -> Result<(), SceneError> {
        let Some(parent) = self.require(id)?.parent() else {
            tracing::warn!("the root element has no z-order");
            return Ok(());
        };
        let from = self.child_position(parent, id)?;
        let to = match order {
            ZOrder::Top => self.child_count(parent)? - 1,
            ZOrder::Bottom => 0,
        };
        self.reorder(parent, from, to)
    }

    /// Move a node into another container without any visual jump.
    ///
    /// The absolute rect is captured before the move and re-expressed
    /// relative to the new container under the node's own constraint.
    pub fn reparent_preserving_geometry(
        &mut self,
        id: NodeId,
        new_parent: NodeId,
        index: Option<usize>,
    ) -> Result<(), SceneError> {
        let node = self.require(id)?;
        let Some(old_parent) = node.parent() else {
            tracing::warn!("the root element cannot be reparented");
            return Ok(());
        };
        let rect = node.rect();
        if self.is_ancestor_or_self(id, new_parent) {
            tracing::warn!(element = %node.name(), "cannot move an element into itself");
            return Ok(());
        }

        let mut len = self.child_count(new_parent)?;
        if old_parent == new_parent {
            len -= 1;
        }
        let index = index.unwrap_or(len);
        if index > len {
            return Err(SceneError::index_out_of_bounds(self.display_name(new_parent), index, len));
        }

        if let Some(container) = self.nodes.get_mut(&old_parent).and_then(|p| p.container.as_mut()) {
            container.children.retain(|child| *child != id);
        }
        if let Some(container) = self.nodes.get_mut(&new_parent).and_then(|p| p.container.as_mut()) {
            container.children.insert(index, id);
        }
        if let Some(node) = self.node_mut(id) {
            node.parent = Some(new_parent);
        }

        let container_rect = self.node(new_parent).map_or(self.viewport(), |p| p.rect());
        tracing::debug!(node = %id, from = %old_parent, to = %new_parent, "reparented element");
        self.defer(DeferredTask::RebuildSelectionIndex);
        self.set_placement_from_geometry(id, rect, container_rect)
    }

    /// Wrap the selection in a new frame.
    ///
    /// The frame covers the union of the selected rects and sits in the
    /// parent of the first selected node, right above the top-most selected
    /// sibling. Each selected node keeps its on-screen geometry and the new
    /// frame becomes the selection.
    pub fn frame_selection(&mut self) -> Result<Option<NodeId>, SceneError> {
        let selected = self.selection_roots();
        let Some(&first) = selected.first() else {
            return Ok(None);
        };
        let parent = self.parent(first).unwrap_or(self.root());

        let bounds = selected
            .iter()
            .filter_map(|id| self.node(*id).map(|node| node.rect()))
            .reduce(|acc, rect| acc.union(&rect))
            .unwrap_or_else(Rect::zero);
        let index = selected
            .iter()
            .filter_map(|id| self.child_position(parent, *id).ok())
            .max()
            .map_or(0, |position| position + 1);

        let parent_rect = self.require(parent)?.rect();
        let mut frame = self.create_node(FRAME_KIND, None);
        frame.placement = capture(&bounds, &Constraint::top_left(), &parent_rect);

        self.batch(|scene| {
            let frame_id = scene.insert(parent, frame, Some(index))?;
            for id in &selected {
                scene.reparent_preserving_geometry(*id, frame_id, None)?;
            }
            scene.update_selection(vec![frame_id]);
            tracing::debug!(frame = %frame_id, members = selected.len(), "framed selection");
            Ok(Some(frame_id))
        })
    }

    // ============================================
    // Helpers
    // ============================================

    fn child_count(&self, parent: NodeId) -> Result<usize, SceneError> {
        let node = self.require(parent)?;
        node.container
            .as_ref()
            .map(|c| c.children.len())
            .ok_or_else(|| SceneError::not_a_container(node.name()))
    }

    fn child_position(&self, parent: NodeId, id: NodeId) -> Result<usize, SceneError> {
        let node = self.require(parent)?;
        let container = node
            .container
            .as_ref()
            .ok_or_else(|| SceneError::not_a_container(node.name()))?;
        container
            .children
            .iter()
            .position(|child| *child == id)
            .ok_or_else(|| SceneError::not_found(id))
    }

    fn display_name(&self, id: NodeId) -> String {
        match self.node(id) {
            Some(node) if node.is_root() => "root".to_string(),
            Some(node) => node.name().to_string(),
            None => id.to_string(),
        }
    }

    fn after_structural_change(&mut self) {
        self.defer(DeferredTask::RebuildSelectionIndex);
        self.save();
    }
}

/// Offset a placement along the edges its constraint pins
fn shifted(placement: Placement, constraint: &Constraint, offset: f64) -> Placement {
    let mut placement = placement;
    match constraint.vertical {
        VerticalConstraint::Top | VerticalConstraint::TopBottom => {
            placement.top = Some(placement.top.unwrap_or(0.0) + offset);
        }
        VerticalConstraint::Bottom => {
            placement.bottom = Some(placement.bottom.unwrap_or(0.0) - offset);
        }
        VerticalConstraint::Center | VerticalConstraint::Scale => {}
    }
    match constraint.horizontal {
        HorizontalConstraint::Left | HorizontalConstraint::LeftRight => {
            placement.left = Some(placement.left.unwrap_or(0.0) + offset);
        }
        HorizontalConstraint::Right => {
            placement.right = Some(placement.right.unwrap_or(0.0) - offset);
        }
        HorizontalConstraint::Center | HorizontalConstraint::Scale => {}
    }
    placement
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SceneConfig;
    use crate::registry::KindRegistry;
    use crate::scene::{Connections, ElementOptions};
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::rc::Rc;
    use std::sync::Arc;

    fn rect(name: &str, top: f64, left: f64) -> ElementOptions {
        ElementOptions::new("rectangle")
            .with_name(name)
            .with_placement(Placement::sized(100.0, 50.0).with_top(top).with_left(left))
            .with_constraint(Constraint::top_left())
    }

    fn scene_with(doc: ElementOptions) -> (Scene, Rc<RefCell<usize>>) {
        let mut scene = Scene::new(Arc::new(KindRegistry::with_builtin_kinds()), SceneConfig::default())
            .with_viewport(500.0, 400.0);
        scene.load(&doc);
        let saves = Rc::new(RefCell::new(0));
        let counter = Rc::clone(&saves);
        scene.on_save(move |_| *counter.borrow_mut() += 1);
        (scene, saves)
    }

    fn names(scene: &Scene, parent: NodeId) -> Vec<String> {
        scene
            .children(parent)
            .iter()
            .map(|id| scene.node(*id).unwrap().name().to_string())
            .collect()
    }

    #[derive(Default)]
    struct Recorder {
        events: Rc<RefCell<Vec<String>>>,
    }

    impl Connections for Recorder {
        fn participates(&self, name: &str) -> bool {
            name == "A"
        }

        fn on_rename(&mut self, old: &str, new: &str) {
            self.events.borrow_mut().push(format!("rename {} {}", old, new));
        }

        fn on_placement_changed(&mut self, node: &ElementNode) {
            self.events.borrow_mut().push(format!("moved {}", node.name()));
        }

        fn on_delete(&mut self, node: &ElementNode) {
            self.events.borrow_mut().push(format!("delete {}", node.name()));
        }
    }

    #[test]
    fn test_add_element_generates_name_and_saves_once() {
        let (mut scene, saves) = scene_with(ElementOptions::frame().with_child(rect("A", 0.0, 0.0)));
        let root = scene.root();
        let id = scene.add_element(root, "icon").unwrap();
        let node = scene.node(id).unwrap();
        assert_eq!(node.name(), "Element 2");
        assert_eq!(node.rect(), Rect::new(0.0, 0.0, 50.0, 50.0));
        assert_eq!(*saves.borrow(), 1);
        assert_eq!(scene.pending_tasks().count(), 1);
    }

    #[test]
    fn test_insert_validates() {
        let (mut scene, saves) = scene_with(ElementOptions::frame().with_child(rect("A", 0.0, 0.0)));
        let root = scene.root();
        let a = scene.id_by_name("A").unwrap();

        let dup = scene.create_node("rectangle", Some("A"));
        assert!(matches!(scene.insert(root, dup, None), Err(SceneError::DuplicateName { .. })));

        let leaf_child = scene.create_node("rectangle", Some("B"));
        assert!(matches!(scene.insert(a, leaf_child, None), Err(SceneError::NotAContainer { .. })));

        let far = scene.create_node("rectangle", Some("C"));
        assert!(matches!(
            scene.insert(root, far, Some(5)),
            Err(SceneError::IndexOutOfBounds { index: 5, len: 1, .. })
        ));
        assert_eq!(*saves.borrow(), 0);
        assert_eq!(scene.len(), 1);
    }

    #[test]
    fn test_remove_then_insert_elsewhere() {
        let (mut scene, _) = scene_with(
            ElementOptions::frame()
                .with_child(rect("A", 0.0, 0.0))
                .with_child(
                    ElementOptions::frame()
                        .with_name("Frame 1")
                        .with_placement(Placement::sized(300.0, 300.0))
                        .with_child(rect("B", 0.0, 0.0)),
                ),
        );
        let root = scene.root();
        let frame = scene.id_by_name("Frame 1").unwrap();
        let detached = scene.remove(root, frame).unwrap();
        assert_eq!(detached.len(), 2);
        assert_eq!(detached.root_node().unwrap().parent(), Some(root));
        assert_eq!(scene.names(), vec!["A"]);

        let a = scene.id_by_name("A").unwrap();
        scene.insert(root, detached, Some(0)).unwrap();
        assert_eq!(names(&scene, root), vec!["Frame 1", "A"]);
        assert_eq!(scene.parent(scene.id_by_name("B").unwrap()), Some(frame));
        assert_eq!(scene.parent(a), Some(root));
    }

    #[test]
    fn test_reorder_and_move_to() {
        let (mut scene, saves) = scene_with(
            ElementOptions::frame()
                .with_child(rect("A", 0.0, 0.0))
                .with_child(rect("B", 0.0, 0.0))
                .with_child(rect("C", 0.0, 0.0)),
        );
        let root = scene.root();
        scene.reorder(root, 0, 2).unwrap();
        assert_eq!(names(&scene, root), vec!["B", "C", "A"]);

        let a = scene.id_by_name("A").unwrap();
        scene.move_to(a, ZOrder::Bottom).unwrap();
        assert_eq!(names(&scene, root), vec!["A", "B", "C"]);
        scene.move_to(a, ZOrder::Top).unwrap();
        assert_eq!(names(&scene, root), vec!["B", "C", "A"]);
        assert_eq!(*saves.borrow(), 3);

        assert!(scene.reorder(root, 3, 0).is_err());
    }

    #[test]
    fn test_duplicate_shifts_pinned_edges() {
        let (mut scene, saves) = scene_with(
            ElementOptions::frame().with_child(
                ElementOptions::new("rectangle")
                    .with_name("A")
                    .with_placement(Placement::sized(100.0, 50.0).with_bottom(40.0).with_left(20.0))
                    .with_constraint(Constraint::new(VerticalConstraint::Bottom, HorizontalConstraint::Left)),
            ),
        );
        let a = scene.id_by_name("A").unwrap();
        let copy = scene.duplicate(a, true).unwrap().unwrap();
        let node = scene.node(copy).unwrap();
        assert_eq!(node.name(), "Element 2");
        assert_eq!(node.placement().bottom, Some(30.0));
        assert_eq!(node.placement().left, Some(30.0));
        let source = scene.node(a).unwrap().rect();
        assert_eq!(node.rect(), source.translate(crate::geometry::Point::new(10.0, 10.0)));
        assert_eq!(*saves.borrow(), 1);
    }

    #[test]
    fn test_duplicate_container_is_noop() {
        let (mut scene, saves) = scene_with(
            ElementOptions::frame().with_child(
                ElementOptions::frame()
                    .with_name("Frame 1")
                    .with_placement(Placement::sized(10.0, 10.0)),
            ),
        );
        let frame = scene.id_by_name("Frame 1").unwrap();
        assert_eq!(scene.duplicate(frame, true).unwrap(), None);
        assert_eq!(scene.len(), 1);
        assert_eq!(*saves.borrow(), 0);
    }

    #[test]
    fn test_delete_removes_subtree_and_notifies() {
        let (mut scene, saves) = scene_with(
            ElementOptions::frame().with_child(
                ElementOptions::frame()
                    .with_name("Frame 1")
                    .with_placement(Placement::sized(300.0, 300.0))
                    .with_child(rect("A", 0.0, 0.0))
                    .with_child(rect("B", 0.0, 0.0)),
            ),
        );
        let recorder = Recorder::default();
        let events = Rc::clone(&recorder.events);
        scene.set_connections(Box::new(recorder));

        let frame = scene.id_by_name("Frame 1").unwrap();
        let a = scene.id_by_name("A").unwrap();
        scene.update_selection(vec![a]);
        scene.delete(frame).unwrap();

        assert!(scene.is_empty());
        assert!(scene.selection().is_empty());
        assert!(!scene.contains(a));
        assert_eq!(
            *events.borrow(),
            vec!["delete Frame 1".to_string(), "delete A".to_string(), "delete B".to_string()]
        );
        assert_eq!(*saves.borrow(), 1);
    }

    #[test]
    fn test_reparent_preserves_geometry() {
        let (mut scene, saves) = scene_with(
            ElementOptions::frame()
                .with_child(rect("A", 120.0, 150.0))
                .with_child(
                    ElementOptions::frame()
                        .with_name("Frame 1")
                        .with_placement(Placement::sized(200.0, 200.0).with_top(100.0).with_left(100.0)),
                ),
        );
        let a = scene.id_by_name("A").unwrap();
        let frame = scene.id_by_name("Frame 1").unwrap();
        let before = scene.node(a).unwrap().rect();

        scene.reparent_preserving_geometry(a, frame, None).unwrap();
        let node = scene.node(a).unwrap();
        assert_eq!(node.parent(), Some(frame));
        assert!(node.rect().max_edge_distance(&before) <= 1.0);
        assert_eq!(node.placement().top, Some(20.0));
        assert_eq!(node.placement().left, Some(50.0));
        assert_eq!(*saves.borrow(), 1);
    }

    #[test]
    fn test_reparent_into_own_subtree_is_noop() {
        let (mut scene, saves) = scene_with(
            ElementOptions::frame().with_child(
                ElementOptions::frame()
                    .with_name("Outer")
                    .with_placement(Placement::sized(300.0, 300.0))
                    .with_child(
                        ElementOptions::frame()
                            .with_name("Inner")
                            .with_placement(Placement::sized(100.0, 100.0)),
                    ),
            ),
        );
        let outer = scene.id_by_name("Outer").unwrap();
        let inner = scene.id_by_name("Inner").unwrap();
        scene.reparent_preserving_geometry(outer, inner, None).unwrap();
        scene.reparent_preserving_geometry(outer, outer, None).unwrap();
        assert_eq!(scene.parent(outer), Some(scene.root()));
        assert_eq!(scene.parent(inner), Some(outer));
        assert_eq!(*saves.borrow(), 0);
    }

    #[test]
    fn test_frame_selection_wraps_and_selects_frame() {
        let (mut scene, saves) = scene_with(
            ElementOptions::frame()
                .with_child(rect("A", 10.0, 20.0))
                .with_child(rect("Other", 300.0, 300.0))
                .with_child(rect("B", 100.0, 200.0)),
        );
        let a = scene.id_by_name("A").unwrap();
        let b = scene.id_by_name("B").unwrap();
        let a_rect = scene.node(a).unwrap().rect();
        let b_rect = scene.node(b).unwrap().rect();
        scene.update_selection(vec![b, a]);

        let frame = scene.frame_selection().unwrap().unwrap();
        let root = scene.root();
        assert_eq!(names(&scene, root), vec!["Other", "Frame 4"]);
        assert_eq!(names(&scene, frame), vec!["A", "B"]);
        assert_eq!(scene.node(frame).unwrap().rect(), Rect::new(20.0, 10.0, 280.0, 140.0));
        assert!(scene.node(a).unwrap().rect().max_edge_distance(&a_rect) <= 1.0);
        assert!(scene.node(b).unwrap().rect().max_edge_distance(&b_rect) <= 1.0);
        assert_eq!(scene.selection(), &[frame]);
        assert_eq!(*saves.borrow(), 1);
    }
}
