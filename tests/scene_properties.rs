//! Structural properties of the scene graph that must hold across any
//! sequence of edits.

use std::collections::HashSet;
use std::sync::Arc;

use canvas_scene::geometry::{Constraint, HorizontalConstraint, Placement, Rect, VerticalConstraint};
use canvas_scene::scene::{ElementOptions, NodeId, Scene, ZOrder};
use canvas_scene::{KindRegistry, SceneConfig};
use pretty_assertions::assert_eq;

const TOLERANCE: f64 = 0.01;

fn new_scene() -> Scene {
    Scene::new(Arc::new(KindRegistry::with_builtin_kinds()), SceneConfig::default()).with_viewport(500.0, 400.0)
}

fn rect_element(name: &str, top: f64, left: f64, width: f64, height: f64) -> ElementOptions {
    ElementOptions::new("rectangle")
        .with_name(name)
        .with_placement(Placement::sized(width, height).with_top(top).with_left(left))
        .with_constraint(Constraint::top_left())
}

fn frame_element(name: &str, top: f64, left: f64, size: f64) -> ElementOptions {
    ElementOptions::frame()
        .with_name(name)
        .with_placement(Placement::sized(size, size).with_top(top).with_left(left))
        .with_constraint(Constraint::top_left())
}

fn assert_rect_eq(actual: Rect, expected: Rect) {
    let close = (actual.x - expected.x).abs() < TOLERANCE
        && (actual.y - expected.y).abs() < TOLERANCE
        && (actual.width - expected.width).abs() < TOLERANCE
        && (actual.height - expected.height).abs() < TOLERANCE;
    assert!(close, "expected {:?}, got {:?}", expected, actual);
}

/// Every non-root node is indexed under its own name exactly once
fn assert_index_consistent(scene: &Scene) {
    let tree: Vec<NodeId> = scene
        .subtree(scene.root())
        .into_iter()
        .filter(|id| *id != scene.root())
        .collect();
    assert_eq!(tree.len(), scene.len(), "index size differs from tree size");

    let mut seen = HashSet::new();
    for id in tree {
        let node = scene.node(id).unwrap();
        assert!(seen.insert(node.name().to_string()), "duplicate name {}", node.name());
        assert_eq!(scene.id_by_name(node.name()), Some(id));
        if let Some(parent) = node.parent() {
            assert!(scene.children(parent).contains(&id));
        }
    }
}

// ============================================
// Naming
// ============================================

#[test]
fn test_names_stay_unique_under_mixed_edits() {
    let mut scene = new_scene();
    scene.load(
        &ElementOptions::frame()
            .with_child(rect_element("Element 1", 0.0, 0.0, 50.0, 50.0))
            .with_child(frame_element("Frame 2", 100.0, 100.0, 200.0)),
    );
    let root = scene.root();
    let frame = scene.id_by_name("Frame 2").unwrap();

    let a = scene.add_element(root, "rectangle").unwrap();
    let b = scene.add_element(frame, "ellipse").unwrap();
    scene.duplicate(a, true).unwrap();
    scene.duplicate(b, false).unwrap();
    scene.add_element(frame, "frame").unwrap();
    scene.delete(scene.id_by_name("Element 1").unwrap()).unwrap();
    scene.add_element(root, "text").unwrap();
    scene.add_element(root, "text").unwrap();

    assert_index_consistent(&scene);
    assert_eq!(scene.len(), 8);
}

#[test]
fn test_rename_onto_taken_name_is_rejected() {
    let mut scene = new_scene();
    scene.load(
        &ElementOptions::frame()
            .with_child(rect_element("A", 0.0, 0.0, 10.0, 10.0))
            .with_child(rect_element("B", 0.0, 0.0, 10.0, 10.0)),
    );
    let b = scene.id_by_name("B").unwrap();
    assert!(scene.rename(b, "A").is_err());
    scene.rename(b, "C").unwrap();
    assert_eq!(scene.names(), vec!["A", "C"]);
    assert_index_consistent(&scene);
}

// ============================================
// Structure
// ============================================

#[test]
fn test_delete_keeps_sibling_order() {
    let mut scene = new_scene();
    scene.load(
        &ElementOptions::frame().with_child(
            frame_element("Frame 1", 0.0, 0.0, 300.0)
                .with_child(rect_element("Element 1", 0.0, 0.0, 10.0, 10.0))
                .with_child(rect_element("Element 2", 0.0, 0.0, 10.0, 10.0))
                .with_child(rect_element("Element 3", 0.0, 0.0, 10.0, 10.0)),
        ),
    );
    let frame = scene.id_by_name("Frame 1").unwrap();
    scene.delete(scene.id_by_name("Element 2").unwrap()).unwrap();

    let names: Vec<&str> = scene
        .children(frame)
        .iter()
        .map(|id| scene.node(*id).unwrap().name())
        .collect();
    assert_eq!(names, vec!["Element 1", "Element 3"]);
    assert_eq!(scene.len(), 3);
    assert_index_consistent(&scene);
}

#[test]
fn test_deleting_a_frame_drops_its_subtree() {
    let mut scene = new_scene();
    scene.load(
        &ElementOptions::frame()
            .with_child(frame_element("Frame 1", 0.0, 0.0, 300.0).with_child(rect_element("Inner", 0.0, 0.0, 10.0, 10.0)))
            .with_child(rect_element("Outer", 0.0, 0.0, 10.0, 10.0)),
    );
    let inner = scene.id_by_name("Inner").unwrap();
    scene.delete(scene.id_by_name("Frame 1").unwrap()).unwrap();

    assert!(!scene.contains(inner));
    assert_eq!(scene.names(), vec!["Outer"]);
    assert_index_consistent(&scene);
}

#[test]
fn test_z_order_moves() {
    let mut scene = new_scene();
    scene.load(
        &ElementOptions::frame()
            .with_child(rect_element("A", 0.0, 0.0, 10.0, 10.0))
            .with_child(rect_element("B", 0.0, 0.0, 10.0, 10.0))
            .with_child(rect_element("C", 0.0, 0.0, 10.0, 10.0)),
    );
    let a = scene.id_by_name("A").unwrap();
    let c = scene.id_by_name("C").unwrap();
    scene.move_to(a, ZOrder::Top).unwrap();
    scene.move_to(c, ZOrder::Bottom).unwrap();

    let names: Vec<&str> = scene
        .children(scene.root())
        .iter()
        .map(|id| scene.node(*id).unwrap().name())
        .collect();
    assert_eq!(names, vec!["C", "B", "A"]);
}

#[test]
fn test_reparent_preserves_absolute_geometry() {
    let mut scene = new_scene();
    scene.load(
        &ElementOptions::frame()
            .with_child(frame_element("Frame 1", 100.0, 100.0, 200.0))
            .with_child(rect_element("A", 150.0, 160.0, 50.0, 40.0)),
    );
    let frame = scene.id_by_name("Frame 1").unwrap();
    let a = scene.id_by_name("A").unwrap();
    let before = scene.node(a).unwrap().rect();

    scene.reparent_preserving_geometry(a, frame, None).unwrap();

    let node = scene.node(a).unwrap();
    assert_eq!(node.parent(), Some(frame));
    assert_rect_eq(node.rect(), before);
    assert_eq!(node.placement().top, Some(50.0));
    assert_eq!(node.placement().left, Some(60.0));
    assert_index_consistent(&scene);
}

#[test]
fn test_reparent_under_right_bottom_constraint() {
    let mut scene = new_scene();
    scene.load(
        &ElementOptions::frame()
            .with_child(frame_element("Frame 1", 100.0, 100.0, 200.0))
            .with_child(
                ElementOptions::new("rectangle")
                    .with_name("A")
                    .with_placement(Placement::sized(50.0, 40.0).with_bottom(100.0).with_right(200.0))
                    .with_constraint(Constraint::new(VerticalConstraint::Bottom, HorizontalConstraint::Right)),
            ),
    );
    let frame = scene.id_by_name("Frame 1").unwrap();
    let a = scene.id_by_name("A").unwrap();
    let before = scene.node(a).unwrap().rect();
    assert_rect_eq(before, Rect::new(250.0, 260.0, 50.0, 40.0));

    scene.reparent_preserving_geometry(a, frame, Some(0)).unwrap();

    let node = scene.node(a).unwrap();
    assert_rect_eq(node.rect(), before);
    assert_eq!(node.placement().right, Some(0.0));
    assert_eq!(node.placement().bottom, Some(0.0));
}

#[test]
fn test_reparent_into_own_descendant_is_ignored() {
    let mut scene = new_scene();
    scene.load(
        &ElementOptions::frame().with_child(
            frame_element("Outer", 0.0, 0.0, 300.0).with_child(frame_element("Inner", 10.0, 10.0, 100.0)),
        ),
    );
    let outer = scene.id_by_name("Outer").unwrap();
    let inner = scene.id_by_name("Inner").unwrap();

    scene.reparent_preserving_geometry(outer, inner, None).unwrap();

    assert_eq!(scene.parent(outer), Some(scene.root()));
    assert_eq!(scene.parent(inner), Some(outer));
    assert_index_consistent(&scene);
}

#[test]
fn test_frame_selection_keeps_member_geometry() {
    let mut scene = new_scene();
    scene.load(
        &ElementOptions::frame()
            .with_child(rect_element("A", 10.0, 10.0, 50.0, 50.0))
            .with_child(rect_element("B", 100.0, 200.0, 50.0, 50.0)),
    );
    let a = scene.id_by_name("A").unwrap();
    let b = scene.id_by_name("B").unwrap();
    let rects = [scene.node(a).unwrap().rect(), scene.node(b).unwrap().rect()];
    scene.update_selection(vec![a, b]);

    let frame = scene.frame_selection().unwrap().unwrap();

    assert_rect_eq(scene.node(frame).unwrap().rect(), Rect::new(10.0, 10.0, 240.0, 140.0));
    assert_eq!(scene.children(frame), &[a, b]);
    assert_rect_eq(scene.node(a).unwrap().rect(), rects[0]);
    assert_rect_eq(scene.node(b).unwrap().rect(), rects[1]);
    assert_eq!(scene.selection(), &[frame]);
    assert_index_consistent(&scene);
}

// ============================================
// Duplicates
// ============================================

#[test]
fn test_shifted_duplicate_moves_along_pinned_edges() {
    let mut scene = new_scene();
    scene.load(
        &ElementOptions::frame()
            .with_child(rect_element("Left pinned", 20.0, 30.0, 50.0, 50.0))
            .with_child(
                ElementOptions::new("rectangle")
                    .with_name("Right pinned")
                    .with_placement(Placement::sized(50.0, 50.0).with_bottom(20.0).with_right(30.0))
                    .with_constraint(Constraint::new(VerticalConstraint::Bottom, HorizontalConstraint::Right)),
            ),
    );
    let left = scene.id_by_name("Left pinned").unwrap();
    let right = scene.id_by_name("Right pinned").unwrap();

    let left_copy = scene.duplicate(left, true).unwrap().unwrap();
    let right_copy = scene.duplicate(right, true).unwrap().unwrap();
    let plain_copy = scene.duplicate(left, false).unwrap().unwrap();

    let source = scene.node(left).unwrap().rect();
    assert_rect_eq(scene.node(left_copy).unwrap().rect(), Rect::new(40.0, 30.0, 50.0, 50.0));
    assert_rect_eq(scene.node(plain_copy).unwrap().rect(), source);

    let source = scene.node(right).unwrap().rect();
    let copy = scene.node(right_copy).unwrap().rect();
    assert_rect_eq(copy, Rect::new(source.x + 10.0, source.y + 10.0, 50.0, 50.0));
    assert_index_consistent(&scene);
}

#[test]
fn test_containers_are_not_duplicated() {
    let mut scene = new_scene();
    scene.load(&ElementOptions::frame().with_child(frame_element("Frame 1", 0.0, 0.0, 100.0)));
    let frame = scene.id_by_name("Frame 1").unwrap();
    assert_eq!(scene.duplicate(frame, false).unwrap(), None);
    assert_eq!(scene.len(), 1);
}

// ============================================
// Layout
// ============================================

#[test]
fn test_layout_is_idempotent() {
    let mut scene = new_scene();
    scene.load(
        &ElementOptions::frame()
            .with_child(
                frame_element("Frame 1", 40.0, 40.0, 300.0).with_child(
                    ElementOptions::new("ellipse")
                        .with_name("Centered")
                        .with_placement(Placement::sized(60.0, 60.0).with_top(5.0).with_left(-5.0))
                        .with_constraint(Constraint::new(VerticalConstraint::Center, HorizontalConstraint::Center)),
                ),
            )
            .with_child(
                ElementOptions::new("rectangle")
                    .with_name("Stretched")
                    .with_placement(Placement::default().with_top(10.0).with_bottom(10.0).with_left(20.0).with_right(20.0))
                    .with_constraint(Constraint::new(VerticalConstraint::TopBottom, HorizontalConstraint::LeftRight)),
            ),
    );

    let snapshot = |scene: &Scene| -> Vec<(String, Rect, String)> {
        scene
            .subtree(scene.root())
            .into_iter()
            .filter_map(|id| scene.node(id))
            .map(|node| (node.name().to_string(), node.rect(), node.css()))
            .collect()
    };
    let first = snapshot(&scene);
    scene.layout();
    scene.layout();
    assert_eq!(snapshot(&scene), first);
}

#[test]
fn test_viewport_change_relayouts_right_pinned_nodes() {
    let mut scene = new_scene();
    scene.load(
        &ElementOptions::frame().with_child(
            ElementOptions::new("rectangle")
                .with_name("A")
                .with_placement(Placement::sized(50.0, 50.0).with_top(0.0).with_right(10.0))
                .with_constraint(Constraint::new(VerticalConstraint::Top, HorizontalConstraint::Right)),
        ),
    );
    assert_rect_eq(scene.node_by_name("A").unwrap().rect(), Rect::new(440.0, 0.0, 50.0, 50.0));
    scene.set_viewport(800.0, 400.0);
    assert_rect_eq(scene.node_by_name("A").unwrap().rect(), Rect::new(740.0, 0.0, 50.0, 50.0));
}

#[test]
fn test_every_constraint_keeps_geometry_through_save_and_load() {
    let verticals = [
        VerticalConstraint::Top,
        VerticalConstraint::Bottom,
        VerticalConstraint::TopBottom,
        VerticalConstraint::Center,
        VerticalConstraint::Scale,
    ];
    let horizontals = [
        HorizontalConstraint::Left,
        HorizontalConstraint::Right,
        HorizontalConstraint::LeftRight,
        HorizontalConstraint::Center,
        HorizontalConstraint::Scale,
    ];
    let expected = Rect::new(40.0, 30.0, 100.0, 50.0);

    for vertical in verticals {
        for horizontal in horizontals {
            let constraint = Constraint::new(vertical, horizontal);
            let mut scene = new_scene();
            scene.load(&ElementOptions::frame().with_child(rect_element("A", 30.0, 40.0, 100.0, 50.0)));
            let a = scene.id_by_name("A").unwrap();

            scene.set_constraint(a, constraint).unwrap();
            assert_rect_eq(scene.node(a).unwrap().rect(), expected);

            let json = scene.save_model().to_json_pretty().unwrap();
            let mut reloaded = new_scene();
            let report = reloaded.load_json(&json).unwrap();
            assert!(report.is_clean(), "{:?}: {:?}", constraint, report.issues);
            let node = reloaded.node_by_name("A").unwrap();
            assert_eq!(*node.constraint(), constraint);
            assert_rect_eq(node.rect(), expected);
        }
    }
}
