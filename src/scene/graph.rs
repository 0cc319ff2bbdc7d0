//! The scene aggregate: node arena, name index, selection channel, deferred
//! task queue and persistence hook.
//!
//! Nodes live in a `HashMap<NodeId, ElementNode>`; a node's `parent` is an id
//! and containers hold ordered child ids. The name index covers every node
//! except the root and is only ever updated together with the tree.

use std::collections::{HashMap, HashSet, VecDeque};
use std::fmt;
use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use crate::config::SceneConfig;
use crate::error::SceneError;
use crate::geometry::{capture_with_rotation, normalize_degrees, Constraint, Placement, Rect};
use crate::registry::{ElementKind, KindRegistry, FRAME_KIND};

use super::collaborators::{Connections, DataContext};
use super::document::{ElementOptions, LoadIssueKind, LoadReport};
use super::node::{ContainerKind, ContainerNode, ElementNode, NodeId, SurfaceHandle};
use super::selection::SelectionIndex;

/// Work queued during an input event and run after it (see
/// [`Scene::drain_deferred`])
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeferredTask {
    RebuildSelectionIndex,
}

type SaveCallback = Box<dyn FnMut(&ElementOptions)>;
type SelectionSubscriber = Box<dyn FnMut(&[NodeId])>;

/// Root aggregate of one canvas
pub struct Scene {
    pub(crate) nodes: HashMap<NodeId, ElementNode>,
    pub(crate) root: NodeId,
    pub(crate) by_name: HashMap<String, NodeId>,
    registry: Arc<KindRegistry>,
    config: SceneConfig,
    viewport: Rect,
    editing_enabled: bool,
    revision: u64,

    selection: Vec<NodeId>,
    subscribers: Vec<SelectionSubscriber>,
    skip_next_broadcast: bool,

    deferred: VecDeque<DeferredTask>,
    pub(crate) selection_index: SelectionIndex,

    batch_depth: usize,
    save_pending: bool,
    on_save: Option<SaveCallback>,
    pub(crate) connections: Option<Box<dyn Connections>>,
}

impl fmt::Debug for Scene {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Scene")
            .field("nodes", &self.nodes.len())
            .field("viewport", &self.viewport)
            .field("selection", &self.selection)
            .field("revision", &self.revision)
            .finish()
    }
}

impl Scene {
    /// Empty scene: a root frame and nothing else
    pub fn new(registry: Arc<KindRegistry>, config: SceneConfig) -> Self {
        let root = ElementNode::root(FRAME_KIND, registry.get_or_not_found(FRAME_KIND));
        let root_id = root.id();
        let mut nodes = HashMap::new();
        nodes.insert(root_id, root);
        Self {
            nodes,
            root: root_id,
            by_name: HashMap::new(),
            registry,
            config,
            viewport: Rect::zero(),
            editing_enabled: true,
            revision: 0,
            selection: Vec::new(),
            subscribers: Vec::new(),
            skip_next_broadcast: false,
            deferred: VecDeque::new(),
            selection_index: SelectionIndex::default(),
            batch_depth: 0,
            save_pending: false,
            on_save: None,
            connections: None,
        }
    }

    /// Set the viewport size before the first layout
    pub fn with_viewport(mut self, width: f64, height: f64) -> Self {
        self.viewport = Rect::new(0.0, 0.0, width, height);
        self.layout();
        self
    }

    /// Install the persistence callback invoked by [`Scene::save`]
    pub fn on_save(&mut self, callback: impl FnMut(&ElementOptions) + 'static) {
        self.on_save = Some(Box::new(callback));
    }

    pub fn set_connections(&mut self, connections: Box<dyn Connections>) {
        self.connections = Some(connections);
    }

    // ============================================
    // Loading
    // ============================================

    /// Replace the whole tree with the one described by `document`.
    ///
    /// Malformed nodes are recovered rather than rejected; everything that
    /// was fixed up is listed in the returned report. Loading does not save.
    pub fn load(&mut self, document: &ElementOptions) -> LoadReport {
        let mut report = LoadReport::default();

        self.nodes.clear();
        self.by_name.clear();
        self.deferred.clear();
        let had_selection = !self.selection.is_empty();
        self.selection.clear();

        let mut root = ElementNode::root(
            document.kind_id.clone(),
            self.registry.get_or_not_found(&document.kind_id),
        );
        root.name = document.name.clone().unwrap_or_default();
        root.config = document.config.clone();
        root.extra = document.extra.clone();
        root.placement = normalize_rotation(document.placement.unwrap_or_default());
        root.constraint = document.constraint.unwrap_or_default();
        let root_id = root.id();
        self.nodes.insert(root_id, root);
        self.root = root_id;

        // Explicit names win over generated ones regardless of document order
        let mut reserved = HashSet::new();
        collect_explicit_names(document, &mut reserved);

        for child in document.children() {
            self.load_node(child, root_id, &reserved, &mut report);
        }

        self.layout();
        self.selection_index = SelectionIndex::build(self);

        for issue in &report.issues {
            tracing::warn!(element = %issue.element, kind = %issue.kind, "recovered while loading scene: {}", issue.message);
        }
        tracing::debug!(nodes = report.nodes, issues = report.issues.len(), "scene loaded");

        if had_selection {
            self.publish_selection();
        }
        report
    }

    /// Parse a JSON document and [`load`](Scene::load) it
    pub fn load_json(&mut self, json: &str) -> Result<LoadReport, SceneError> {
        let document = ElementOptions::from_json(json)?;
        Ok(self.load(&document))
    }

    fn load_node(
        &mut self,
        options: &ElementOptions,
        parent: NodeId,
        reserved: &HashSet<String>,
        report: &mut LoadReport,
    ) -> NodeId {
        let (kind, unknown) = match self.registry.get(&options.kind_id) {
            Some(kind) => (kind, false),
            None => (self.registry.get_or_not_found(&options.kind_id), true),
        };
        let holds_children = kind.container().is_some() || options.elements.is_some();

        let name = match options.name.as_deref().filter(|n| !n.is_empty()) {
            Some(name) if !self.by_name.contains_key(name) => name.to_string(),
            Some(name) => {
                let renamed = self.suffixed_name(name, reserved);
                report.push(
                    LoadIssueKind::DuplicateName,
                    &renamed,
                    format!("name '{}' already used, renamed", name),
                );
                renamed
            }
            None => {
                let generated = self.next_free_name(holds_children, reserved);
                report.push(LoadIssueKind::MissingName, &generated, "name generated");
                generated
            }
        };

        if unknown {
            report.push(
                LoadIssueKind::UnknownKind,
                &name,
                format!("kind '{}' is not registered", options.kind_id),
            );
        }

        let constraint = options.constraint.unwrap_or_default();
        let placement = match options.placement {
            None => {
                report.push(LoadIssueKind::MissingPlacement, &name, "default placement used");
                self.default_placement(kind.as_ref())
            }
            Some(placement) if placement.is_missing_fields(&constraint) => {
                report.push(
                    LoadIssueKind::MissingPlacement,
                    &name,
                    "placement incomplete for its constraint, defaults filled in",
                );
                self.fill_missing(placement, &constraint, kind.as_ref())
            }
            Some(placement) => placement,
        };
        let placement = normalize_rotation(placement);

        let mut node = ElementNode::new(name.clone(), options.kind_id.clone(), kind, placement, constraint);
        node.config = options.config.clone();
        node.extra = options.extra.clone();
        node.parent = Some(parent);
        if holds_children && node.container.is_none() {
            node.container = Some(ContainerNode::new(ContainerKind::Frame));
        }

        let id = node.id();
        self.by_name.insert(name, id);
        self.nodes.insert(id, node);
        if let Some(container) = self.nodes.get_mut(&parent).and_then(|p| p.container.as_mut()) {
            container.children.push(id);
        }
        report.nodes += 1;

        if holds_children {
            for child in options.children() {
                self.load_node(child, id, reserved, report);
            }
        }
        id
    }

    fn suffixed_name(&self, name: &str, reserved: &HashSet<String>) -> String {
        (2..)
            .map(|n| format!("{} ({})", name, n))
            .find(|candidate| !self.by_name.contains_key(candidate) && !reserved.contains(candidate))
            .unwrap_or_else(|| name.to_string())
    }

    pub(crate) fn default_size(&self, kind: &dyn ElementKind) -> (f64, f64) {
        kind.default_size().unwrap_or(self.config.default_element_size)
    }

    pub(crate) fn default_placement(&self, kind: &dyn ElementKind) -> Placement {
        let (width, height) = self.default_size(kind);
        Placement::sized(width, height)
    }

    fn fill_missing(&self, placement: Placement, constraint: &Constraint, kind: &dyn ElementKind) -> Placement {
        let need = constraint.meaningful_fields();
        let (width, height) = self.default_size(kind);
        let fill = |field: Option<f64>, needed: bool, default: f64| {
            if needed {
                field.or(Some(default))
            } else {
                field
            }
        };
        Placement {
            top: fill(placement.top, need.top, 0.0),
            bottom: fill(placement.bottom, need.bottom, 0.0),
            left: fill(placement.left, need.left, 0.0),
            right: fill(placement.right, need.right, 0.0),
            width: fill(placement.width, need.width, width),
            height: fill(placement.height, need.height, height),
            rotation: placement.rotation,
        }
    }

    // ============================================
    // Accessors
    // ============================================

    pub fn root(&self) -> NodeId {
        self.root
    }

    pub fn root_node(&self) -> &ElementNode {
        &self.nodes[&self.root]
    }

    pub fn node(&self, id: NodeId) -> Option<&ElementNode> {
        self.nodes.get(&id)
    }

    pub(crate) fn node_mut(&mut self, id: NodeId) -> Option<&mut ElementNode> {
        self.nodes.get_mut(&id)
    }

    pub(crate) fn require(&self, id: NodeId) -> Result<&ElementNode, SceneError> {
        self.nodes.get(&id).ok_or_else(|| SceneError::not_found(id))
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    pub fn id_by_name(&self, name: &str) -> Option<NodeId> {
        self.by_name.get(name).copied()
    }

    pub fn node_by_name(&self, name: &str) -> Option<&ElementNode> {
        self.id_by_name(name).and_then(|id| self.node(id))
    }

    /// Number of named (non-root) nodes
    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }

    /// Every indexed name, sorted
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.by_name.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn children(&self, id: NodeId) -> &[NodeId] {
        self.nodes.get(&id).map_or(&[], |node| node.children())
    }

    pub fn parent(&self, id: NodeId) -> Option<NodeId> {
        self.nodes.get(&id).and_then(|node| node.parent)
    }

    pub fn registry(&self) -> &Arc<KindRegistry> {
        &self.registry
    }

    pub fn config(&self) -> &SceneConfig {
        &self.config
    }

    pub fn viewport(&self) -> Rect {
        self.viewport
    }

    pub fn editing_enabled(&self) -> bool {
        self.editing_enabled
    }

    /// Number of saves emitted so far
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn selection_index(&self) -> &SelectionIndex {
        &self.selection_index
    }

    /// Rect of the node's container (the viewport for top-level nodes)
    pub fn container_rect(&self, id: NodeId) -> Rect {
        self.parent(id)
            .and_then(|parent| self.node(parent))
            .map_or(self.viewport, |parent| parent.rect())
    }

    /// Whether `ancestor` is `id` or one of its ancestors
    pub fn is_ancestor_or_self(&self, ancestor: NodeId, id: NodeId) -> bool {
        let mut current = Some(id);
        while let Some(node) = current {
            if node == ancestor {
                return true;
            }
            current = self.parent(node);
        }
        false
    }

    /// Pre-order walk of a subtree
    pub fn visit(&self, id: NodeId, f: &mut impl FnMut(&ElementNode)) {
        if let Some(node) = self.nodes.get(&id) {
            f(node);
            for child in node.children() {
                self.visit(*child, f);
            }
        }
    }

    /// Ids of a subtree in pre-order, `id` first
    pub fn subtree(&self, id: NodeId) -> Vec<NodeId> {
        let mut ids = Vec::new();
        self.visit(id, &mut |node| ids.push(node.id()));
        ids
    }

    // ============================================
    // Naming
    // ============================================

    /// Next free auto-generated name.
    ///
    /// Probes `"Element {n}"` (or `"Frame {n}"`) starting after the current
    /// node count, then falls back to a millisecond timestamp.
    pub fn get_next_element_name(&self, is_frame: bool) -> String {
        self.next_free_name(is_frame, &HashSet::new())
    }

    fn next_free_name(&self, is_frame: bool, reserved: &HashSet<String>) -> String {
        let label = if is_frame { "Frame" } else { "Element" };
        let taken = |candidate: &String| self.by_name.contains_key(candidate) || reserved.contains(candidate);
        let start = self.by_name.len() + 1;
        for n in start..start + self.config.name_probe_attempts {
            let candidate = format!("{} {}", label, n);
            if !taken(&candidate) {
                return candidate;
            }
        }
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map_or(0, |d| d.as_millis());
        let candidate = format!("{} {}", label, millis);
        if taken(&candidate) {
            self.suffixed_name(&candidate, reserved)
        } else {
            candidate
        }
    }

    /// Rename a node; connections follow the new name
    pub fn rename(&mut self, id: NodeId, new_name: &str) -> Result<(), SceneError> {
        let old_name = self.require(id)?.name.clone();
        if new_name.trim().is_empty() {
            return Err(SceneError::EmptyName);
        }
        if old_name == new_name {
            return Ok(());
        }
        if self.by_name.get(new_name).is_some_and(|owner| *owner != id) {
            return Err(SceneError::duplicate_name(new_name));
        }

        let is_root = id == self.root;
        if let Some(node) = self.nodes.get_mut(&id) {
            node.name = new_name.to_string();
            node.revision += 1;
        }
        if !is_root {
            self.by_name.remove(&old_name);
            self.by_name.insert(new_name.to_string(), id);
        }
        if let Some(connections) = self.connections.as_mut() {
            connections.on_rename(&old_name, new_name);
        }
        tracing::debug!(from = %old_name, to = %new_name, "renamed element");
        self.save();
        Ok(())
    }

    // ============================================
    // Layout and geometry
    // ============================================

    /// Full top-down layout pass
    pub fn layout(&mut self) {
        self.layout_in(self.root, self.viewport);
    }

    /// Lay out one subtree inside its current container
    pub fn layout_subtree(&mut self, id: NodeId) {
        let container = if id == self.root {
            self.viewport
        } else {
            self.container_rect(id)
        };
        self.layout_in(id, container);
    }

    pub(crate) fn layout_in(&mut self, id: NodeId, container: Rect) {
        let editing = self.editing_enabled;
        let min_size = self.config.min_element_size;
        let Some(node) = self.nodes.get_mut(&id) else {
            return;
        };
        node.apply_layout(&container, editing, min_size);
        let rect = node.rect;
        let children = node.children().to_vec();
        for child in children {
            self.layout_in(child, rect);
        }
    }

    pub fn set_viewport(&mut self, width: f64, height: f64) {
        self.viewport = Rect::new(0.0, 0.0, width, height);
        self.layout();
    }

    pub fn set_editing_enabled(&mut self, enabled: bool) {
        if self.editing_enabled != enabled {
            self.editing_enabled = enabled;
            self.layout();
        }
    }

    /// Re-derive a node's placement from an absolute rect.
    ///
    /// The single choke point for committing geometry: captures under the
    /// node's constraint (keeping rotation), lays out the subtree, tells the
    /// connections collaborator and saves.
    pub fn set_placement_from_geometry(
        &mut self,
        id: NodeId,
        rect: Rect,
        container: Rect,
    ) -> Result<(), SceneError> {
        let node = self.nodes.get_mut(&id).ok_or_else(|| SceneError::not_found(id))?;
        if node.is_root() {
            tracing::warn!("the root element has no placement, geometry ignored");
            return Ok(());
        }
        node.placement = capture_with_rotation(&rect, &node.constraint, &container, node.placement.rotation);
        self.layout_in(id, container);
        self.notify_placement_changed(id);
        self.save();
        Ok(())
    }

    /// [`set_placement_from_geometry`](Scene::set_placement_from_geometry)
    /// inside the node's current container
    pub fn set_geometry(&mut self, id: NodeId, rect: Rect) -> Result<(), SceneError> {
        let container = self.container_rect(id);
        self.set_placement_from_geometry(id, rect, container)
    }

    /// Change a node's constraint without moving it
    pub fn set_constraint(&mut self, id: NodeId, constraint: Constraint) -> Result<(), SceneError> {
        let rect = self.require(id)?.rect;
        if let Some(node) = self.nodes.get_mut(&id) {
            node.constraint = constraint;
        }
        self.set_geometry(id, rect)
    }

    /// Set rotation in degrees (normalized) and save
    pub fn set_rotation(&mut self, id: NodeId, degrees: f64) -> Result<(), SceneError> {
        self.apply_rotation(id, degrees)?;
        self.notify_placement_changed(id);
        self.save();
        Ok(())
    }

    /// Rotation without save, for live gestures
    pub(crate) fn apply_rotation(&mut self, id: NodeId, degrees: f64) -> Result<(), SceneError> {
        let node = self.nodes.get_mut(&id).ok_or_else(|| SceneError::not_found(id))?;
        node.placement.rotation = Some(crate::geometry::normalize_degrees(degrees));
        self.layout_subtree(id);
        Ok(())
    }

    /// Replace placement and constraint without saving, for live gestures
    pub(crate) fn apply_live_placement(&mut self, id: NodeId, placement: Placement, constraint: Constraint) {
        if let Some(node) = self.nodes.get_mut(&id) {
            node.placement = placement;
            node.constraint = constraint;
        }
        self.layout_subtree(id);
    }

    pub(crate) fn notify_placement_changed(&mut self, id: NodeId) {
        if let (Some(connections), Some(node)) = (self.connections.as_mut(), self.nodes.get(&id)) {
            if connections.participates(&node.name) {
                connections.on_placement_changed(node);
            }
        }
    }

    // ============================================
    // Data
    // ============================================

    /// Refresh prepared data and data style of every node.
    ///
    /// Revisions are only bumped for nodes whose output changed.
    pub fn update_data(&mut self, ctx: &dyn DataContext) {
        let ids: Vec<NodeId> = self.nodes.keys().copied().collect();
        for id in ids {
            let Some(node) = self.nodes.get(&id) else {
                continue;
            };
            let data = node.kind.prepare_data(ctx, &node.config);
            let style = ctx.resolve_style(node);
            if let Some(node) = self.nodes.get_mut(&id) {
                if node.data != data || node.data_style != style {
                    node.data = data;
                    node.data_style = style;
                    node.revision += 1;
                }
            }
        }
    }

    /// Switch a node to another kind, resetting its config to the kind's
    /// default. Unknown kinds resolve to the placeholder.
    pub fn change_kind(&mut self, id: NodeId, kind_id: &str) -> Result<(), SceneError> {
        let kind = self.registry.get_or_not_found(kind_id);
        let node = self.nodes.get_mut(&id).ok_or_else(|| SceneError::not_found(id))?;
        if node.is_root() || kind.container().is_some() != node.is_container() {
            tracing::warn!(
                element = %node.name,
                kind = kind_id,
                "changing between container and leaf kinds is not supported"
            );
            return Ok(());
        }
        if kind.is_placeholder() {
            tracing::warn!(element = %node.name, kind = kind_id, "unknown element kind");
        }
        node.kind_id = kind_id.to_string();
        node.config = kind.default_config();
        node.kind = kind;
        node.data = None;
        node.revision += 1;
        self.save();
        Ok(())
    }

    /// Bind a host surface to a node; the selection index catches up on the
    /// next [`drain_deferred`](Scene::drain_deferred)
    pub fn attach_surface(&mut self, id: NodeId, handle: SurfaceHandle) -> Result<(), SceneError> {
        let node = self.nodes.get_mut(&id).ok_or_else(|| SceneError::not_found(id))?;
        node.surface = Some(handle);
        self.defer(DeferredTask::RebuildSelectionIndex);
        Ok(())
    }

    // ============================================
    // Persistence
    // ============================================

    /// Persisted form of the whole tree
    pub fn save_model(&self) -> ElementOptions {
        self.options_for(self.root).unwrap_or_else(ElementOptions::frame)
    }

    fn options_for(&self, id: NodeId) -> Option<ElementOptions> {
        let node = self.nodes.get(&id)?;
        let mut options = node.to_options();
        if node.is_container() {
            options.elements = Some(
                node.children()
                    .iter()
                    .filter_map(|child| self.options_for(*child))
                    .collect(),
            );
        }
        Some(options)
    }

    /// Hand the save model to the persistence callback.
    ///
    /// Inside a [`batch`](Scene::batch) the save is deferred to the end of
    /// the outermost batch.
    pub fn save(&mut self) {
        if self.batch_depth > 0 {
            self.save_pending = true;
            return;
        }
        self.revision += 1;
        let model = self.save_model();
        tracing::debug!(revision = self.revision, "scene saved");
        if let Some(callback) = self.on_save.as_mut() {
            callback(&model);
        }
    }

    /// Run `f` with saves coalesced into at most one
    pub fn batch<R>(&mut self, f: impl FnOnce(&mut Scene) -> R) -> R {
        self.batch_depth += 1;
        let result = f(self);
        self.batch_depth -= 1;
        if self.batch_depth == 0 && self.save_pending {
            self.save_pending = false;
            self.save();
        }
        result
    }

    // ============================================
    // Selection
    // ============================================

    pub fn selection(&self) -> &[NodeId] {
        &self.selection
    }

    pub fn is_selected(&self, id: NodeId) -> bool {
        self.selection.contains(&id)
    }

    /// Subscribe to selection changes
    pub fn subscribe_selection(&mut self, subscriber: impl FnMut(&[NodeId]) + 'static) {
        self.subscribers.push(Box::new(subscriber));
    }

    /// Suppress exactly one upcoming selection broadcast
    pub fn skip_next_selection_broadcast(&mut self) {
        self.skip_next_broadcast = true;
    }

    /// Replace the selection; unknown ids and the root are dropped
    pub fn update_selection(&mut self, targets: Vec<NodeId>) {
        let mut selection: Vec<NodeId> = Vec::with_capacity(targets.len());
        for id in targets {
            if id != self.root && self.nodes.contains_key(&id) && !selection.contains(&id) {
                selection.push(id);
            }
        }
        self.selection = selection;
        self.publish_selection();
    }

    pub fn clear_selection(&mut self) {
        self.selection.clear();
        self.publish_selection();
    }

    /// Drop selected ids that no longer exist
    pub(crate) fn prune_selection(&mut self) {
        let before = self.selection.len();
        let nodes = &self.nodes;
        self.selection.retain(|id| nodes.contains_key(id));
        if self.selection.len() != before {
            self.publish_selection();
        }
    }

    fn publish_selection(&mut self) {
        if self.skip_next_broadcast {
            self.skip_next_broadcast = false;
            tracing::debug!("selection broadcast skipped");
            return;
        }
        for subscriber in self.subscribers.iter_mut() {
            subscriber(&self.selection);
        }
    }

    // ============================================
    // Deferred work
    // ============================================

    pub(crate) fn defer(&mut self, task: DeferredTask) {
        if !self.deferred.contains(&task) {
            self.deferred.push_back(task);
        }
    }

    pub fn pending_tasks(&self) -> impl Iterator<Item = &DeferredTask> {
        self.deferred.iter()
    }

    /// Run queued tasks; returns how many ran
    pub fn drain_deferred(&mut self) -> usize {
        let mut ran = 0;
        while let Some(task) = self.deferred.pop_front() {
            match task {
                DeferredTask::RebuildSelectionIndex => {
                    self.selection_index = SelectionIndex::build(self);
                }
            }
            ran += 1;
        }
        ran
    }

    // ============================================
    // Debug output
    // ============================================

    /// Indented outline of the resolved tree
    pub fn describe(&self) -> String {
        let mut out = String::new();
        self.describe_node(self.root, 0, &mut out);
        out
    }

    fn describe_node(&self, id: NodeId, depth: usize, out: &mut String) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        let rect = node.rect();
        let label = if node.is_root() { "<root>" } else { node.name() };
        out.push_str(&format!(
            "{}{} [{}] x={} y={} w={} h={}",
            "  ".repeat(depth),
            label,
            node.kind_id(),
            rect.x,
            rect.y,
            rect.width,
            rect.height
        ));
        let rotation = node.placement().rotation_degrees();
        if rotation != 0.0 {
            out.push_str(&format!(" rot={}", rotation));
        }
        out.push('\n');
        for child in node.children() {
            self.describe_node(*child, depth + 1, out);
        }
    }
}

fn collect_explicit_names(options: &ElementOptions, names: &mut HashSet<String>) {
    for child in options.children() {
        if let Some(name) = child.name.as_deref().filter(|n| !n.is_empty()) {
            names.insert(name.to_string());
        }
        collect_explicit_names(child, names);
    }
}

fn normalize_rotation(placement: Placement) -> Placement {
    Placement {
        rotation: placement.rotation.map(normalize_degrees),
        ..placement
    }
}
