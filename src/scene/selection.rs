//! Selection index and hit testing.
//!
//! The index maps host surface handles back to the nodes that own them. It is
//! rebuilt breadth-first (frames expanded) whenever tree membership changes,
//! as a deferred task so a rebuild never runs in the middle of the input event
//! that caused it.

use std::collections::HashMap;

use crate::geometry::{Point, Rect};

use super::graph::Scene;
use super::node::{NodeId, SurfaceHandle};

/// Surface handle -> owning node, plus the selectable nodes in BFS order
#[derive(Debug, Clone, Default)]
pub struct SelectionIndex {
    targets: Vec<NodeId>,
    owners: HashMap<SurfaceHandle, NodeId>,
}

impl SelectionIndex {
    /// Walk the scene breadth-first from the root
    pub fn build(scene: &Scene) -> Self {
        let mut index = SelectionIndex::default();
        let mut queue: Vec<NodeId> = scene.children(scene.root()).to_vec();
        let mut head = 0;
        while head < queue.len() {
            let id = queue[head];
            head += 1;
            let Some(node) = scene.node(id) else {
                continue;
            };
            index.targets.push(id);
            if let Some(handle) = node.surface() {
                index.owners.insert(handle, id);
            }
            queue.extend_from_slice(node.children());
        }
        index
    }

    /// Node owning a surface
    pub fn find_owner(&self, handle: SurfaceHandle) -> Option<NodeId> {
        self.owners.get(&handle).copied()
    }

    /// Selectable nodes, breadth-first
    pub fn targets(&self) -> &[NodeId] {
        &self.targets
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

impl Scene {
    /// Non-root nodes in paint order (pre-order, later siblings on top)
    pub fn paint_order(&self) -> Vec<NodeId> {
        let mut order = self.subtree(self.root());
        order.retain(|id| *id != self.root());
        order
    }

    /// Selected nodes without a selected ancestor, in paint order
    pub fn selection_roots(&self) -> Vec<NodeId> {
        let selected: Vec<NodeId> = self
            .paint_order()
            .into_iter()
            .filter(|id| self.is_selected(*id))
            .collect();
        selected
            .iter()
            .copied()
            .filter(|id| {
                !selected
                    .iter()
                    .any(|other| other != id && self.is_ancestor_or_self(*other, *id))
            })
            .collect()
    }

    /// Top-most node whose rotated box contains `point`
    pub fn hit_test(&self, point: Point) -> Option<NodeId> {
        self.paint_order().into_iter().rev().find(|id| {
            self.node(*id).is_some_and(|node| {
                let bounds = node.visual_rect();
                crate::geometry::RotationTransform::around_center(
                    node.placement().rotation_degrees(),
                    &bounds,
                )
                .contains(&bounds, point)
            })
        })
    }

    /// Nodes whose on-screen footprint intersects `area`, skipping nodes
    /// whose ancestor is already included
    pub fn nodes_in_rect(&self, area: &Rect) -> Vec<NodeId> {
        let mut hits: Vec<NodeId> = Vec::new();
        for id in self.paint_order() {
            let Some(node) = self.node(id) else {
                continue;
            };
            if hits.iter().any(|hit| self.is_ancestor_or_self(*hit, id)) {
                continue;
            }
            let footprint = node.rotation().transform_bounds(&node.visual_rect());
            if footprint.intersects(area) {
                hits.push(id);
            }
        }
        hits
    }
}
