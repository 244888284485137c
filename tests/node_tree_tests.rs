//! Node Tree Integration Tests
//!
//! Tests for:
//! - NodeTree: child creation, duplicate rejection, lookup, destruction
//! - Deferred destruction: discard marks, trim_tree unlinks
//! - World frame composition along parent chains
//! - Reparenting: cycle and sibling-name guards
//! - Scene events emitted around structural changes

use glam::{Quat, Vec3};

use sylva::math::{CartesianFrame, TransformSpace};
use sylva::scene::{NodeTree, SceneEvent};

const EPSILON: f32 = 1e-5;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

fn approx_vec(a: Vec3, b: Vec3) -> bool {
    (a - b).length() < EPSILON
}

// ============================================================================
// Creation & Lookup
// ============================================================================

#[test]
fn create_child_links_both_directions() {
    let mut tree = NodeTree::new();
    let root = tree.root();

    let child = tree
        .create_child(root, "probe", CartesianFrame::IDENTITY)
        .unwrap();

    assert_eq!(tree.get(child).unwrap().parent(), Some(root));
    assert_eq!(tree.find_child(root, "probe"), Some(child));
    assert_eq!(tree.node_count(), 2);
}

#[test]
fn duplicate_name_is_rejected_and_first_child_untouched() {
    let mut tree = NodeTree::new();
    let root = tree.root();

    let frame = CartesianFrame::from_position(Vec3::new(1.0, 2.0, 3.0));
    let first = tree.create_child(root, "probe", frame).unwrap();

    let second = tree.create_child(root, "probe", CartesianFrame::IDENTITY);
    assert!(second.is_err());

    // Same identity, same frame.
    assert_eq!(tree.find_child(root, "probe"), Some(first));
    assert!(approx_vec(
        tree.get(first).unwrap().frame.position,
        Vec3::new(1.0, 2.0, 3.0)
    ));
}

#[test]
fn root_name_is_reserved() {
    let mut tree = NodeTree::new();
    let root = tree.root();
    assert!(tree.create_child(root, "root", CartesianFrame::IDENTITY).is_err());
}

#[test]
fn find_child_returns_none_for_absent_name() {
    let tree = NodeTree::new();
    assert_eq!(tree.find_child(tree.root(), "ghost"), None);
}

#[test]
fn is_root_holds_iff_parent_is_unset() {
    let mut tree = NodeTree::new();
    let root = tree.root();
    let child = tree
        .create_child(root, "probe", CartesianFrame::IDENTITY)
        .unwrap();

    assert!(tree.get(root).unwrap().is_root());
    assert!(!tree.get(child).unwrap().is_root());
}

#[test]
fn depth_counts_edges_to_root() {
    let mut tree = NodeTree::new();
    let root = tree.root();
    let a = tree.create_child(root, "a", CartesianFrame::IDENTITY).unwrap();
    let b = tree.create_child(a, "b", CartesianFrame::IDENTITY).unwrap();

    assert_eq!(tree.depth(root), Some(0));
    assert_eq!(tree.depth(a), Some(1));
    assert_eq!(tree.depth(b), Some(2));
}

// ============================================================================
// Immediate Destruction
// ============================================================================

#[test]
fn destroy_child_removes_whole_subtree() {
    let mut tree = NodeTree::new();
    let root = tree.root();
    let a = tree.create_child(root, "a", CartesianFrame::IDENTITY).unwrap();
    let b = tree.create_child(a, "b", CartesianFrame::IDENTITY).unwrap();

    assert!(tree.destroy_child(root, "a"));

    assert!(tree.get(a).is_none());
    assert!(tree.get(b).is_none());
    assert_eq!(tree.node_count(), 1);
}

#[test]
fn destroy_child_returns_false_for_absent_name() {
    let mut tree = NodeTree::new();
    assert!(!tree.destroy_child(tree.root(), "ghost"));
}

#[test]
fn destroy_children_clears_every_subtree() {
    let mut tree = NodeTree::new();
    let root = tree.root();
    tree.create_child(root, "a", CartesianFrame::IDENTITY).unwrap();
    tree.create_child(root, "b", CartesianFrame::IDENTITY).unwrap();

    tree.destroy_children(root);
    assert_eq!(tree.node_count(), 1);
    assert!(tree.get(root).unwrap().is_leaf());
}

#[test]
fn destroy_tree_resets_to_a_bare_root() {
    let mut tree = NodeTree::new();
    let root = tree.root();
    let a = tree.create_child(root, "a", CartesianFrame::IDENTITY).unwrap();
    tree.create_child(a, "b", CartesianFrame::IDENTITY).unwrap();

    tree.destroy_tree();

    assert_eq!(tree.node_count(), 1);
    assert!(tree.contains(tree.root()));
}

// ============================================================================
// Deferred Destruction (discard / trim)
// ============================================================================

#[test]
fn discarded_node_survives_until_trim() {
    let mut tree = NodeTree::new();
    let root = tree.root();
    let child = tree
        .create_child(root, "probe", CartesianFrame::IDENTITY)
        .unwrap();

    tree.discard(child);

    // Marked, but still reachable: nothing structural happened yet.
    assert!(tree.is_discardable(child));
    assert_eq!(tree.find_child(root, "probe"), Some(child));

    tree.trim_tree();

    assert_eq!(tree.find_child(root, "probe"), None);
    assert!(tree.get(child).is_none());
}

#[test]
fn trim_destroys_descendants_of_a_discarded_node() {
    let mut tree = NodeTree::new();
    let root = tree.root();
    let a = tree.create_child(root, "a", CartesianFrame::IDENTITY).unwrap();
    let b = tree.create_child(a, "b", CartesianFrame::IDENTITY).unwrap();
    let c = tree.create_child(b, "c", CartesianFrame::IDENTITY).unwrap();

    tree.discard(a);
    tree.trim_tree();

    // No promotion to the grandparent: the whole subtree dies.
    assert!(tree.get(a).is_none());
    assert!(tree.get(b).is_none());
    assert!(tree.get(c).is_none());
}

#[test]
fn trim_only_removes_discarded_subtrees() {
    let mut tree = NodeTree::new();
    let root = tree.root();
    let doomed = tree.create_child(root, "doomed", CartesianFrame::IDENTITY).unwrap();
    let kept = tree.create_child(root, "kept", CartesianFrame::IDENTITY).unwrap();
    let nested = tree.create_child(kept, "nested", CartesianFrame::IDENTITY).unwrap();

    tree.discard(doomed);
    tree.discard(nested);
    tree.trim_tree();

    assert!(tree.get(doomed).is_none());
    assert!(tree.get(nested).is_none());
    assert!(tree.get(kept).is_some());
}

#[test]
fn root_cannot_be_discarded() {
    let mut tree = NodeTree::new();
    tree.discard(tree.root());
    tree.trim_tree();
    assert!(tree.contains(tree.root()));
}

#[test]
fn discard_works_through_a_shared_reference() {
    let mut tree = NodeTree::new();
    let child = tree
        .create_child(tree.root(), "probe", CartesianFrame::IDENTITY)
        .unwrap();

    let shared: &NodeTree = &tree;
    shared.discard(child);

    tree.trim_tree();
    assert!(tree.get(child).is_none());
}

// ============================================================================
// World Frame Composition
// ============================================================================

#[test]
fn world_frame_composes_root_to_leaf() {
    let mut tree = NodeTree::new();
    let root = tree.root();

    let a = tree
        .create_child(root, "a", CartesianFrame::from_position(Vec3::new(1.0, 0.0, 0.0)))
        .unwrap();
    let b = tree
        .create_child(a, "b", CartesianFrame::from_position(Vec3::new(0.0, 2.0, 0.0)))
        .unwrap();
    let c = tree
        .create_child(b, "c", CartesianFrame::from_position(Vec3::new(0.0, 0.0, 3.0)))
        .unwrap();

    let world = tree.world_frame(c).unwrap();
    assert!(approx_vec(world.position, Vec3::new(1.0, 2.0, 3.0)));
}

#[test]
fn world_frame_applies_ancestor_rotation() {
    let mut tree = NodeTree::new();
    let root = tree.root();

    let mut pivot_frame = CartesianFrame::IDENTITY;
    pivot_frame.rotation = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
    let pivot = tree.create_child(root, "pivot", pivot_frame).unwrap();

    let arm = tree
        .create_child(pivot, "arm", CartesianFrame::from_position(Vec3::new(0.0, 0.0, -1.0)))
        .unwrap();

    // The pivot's 90 deg yaw carries the arm's -Z offset onto world -X.
    let world = tree.world_frame(arm).unwrap();
    assert!(approx_vec(world.position, Vec3::new(-1.0, 0.0, 0.0)));
}

#[test]
fn world_frame_matches_pairwise_composition() {
    let mut tree = NodeTree::new();
    let root = tree.root();

    let mut frame_a = CartesianFrame::from_position(Vec3::new(1.0, 2.0, 3.0));
    frame_a.rotation = Quat::from_rotation_z(0.3);
    let mut frame_b = CartesianFrame::from_position(Vec3::new(-2.0, 0.5, 0.0));
    frame_b.rotation = Quat::from_rotation_x(-0.7);
    let frame_c = CartesianFrame::from_position(Vec3::new(0.0, 1.0, -4.0));

    let a = tree.create_child(root, "a", frame_a).unwrap();
    let b = tree.create_child(a, "b", frame_b).unwrap();
    let c = tree.create_child(b, "c", frame_c).unwrap();

    let expected = frame_a.compose(&frame_b).compose(&frame_c);
    let world = tree.world_frame(c).unwrap();
    assert!(approx_vec(world.position, expected.position));
}

// ============================================================================
// Spatial Mutators
// ============================================================================

#[test]
fn move_to_world_accounts_for_the_parent_chain() {
    let mut tree = NodeTree::new();
    let root = tree.root();
    let parent = tree
        .create_child(root, "parent", CartesianFrame::from_position(Vec3::new(10.0, 0.0, 0.0)))
        .unwrap();
    let child = tree.create_child(parent, "child", CartesianFrame::IDENTITY).unwrap();

    tree.move_to(child, Vec3::new(12.0, 5.0, 0.0), TransformSpace::World);

    let world = tree.world_frame(child).unwrap();
    assert!(approx_vec(world.position, Vec3::new(12.0, 5.0, 0.0)));
    assert!(approx_vec(
        tree.get(child).unwrap().frame.position,
        Vec3::new(2.0, 5.0, 0.0)
    ));
}

#[test]
fn move_by_local_follows_the_node_orientation() {
    let mut tree = NodeTree::new();
    let root = tree.root();
    let mut frame = CartesianFrame::IDENTITY;
    frame.rotation = Quat::from_rotation_y(std::f32::consts::FRAC_PI_2);
    let node = tree.create_child(root, "probe", frame).unwrap();

    tree.move_by(node, Vec3::new(0.0, 0.0, -1.0), TransformSpace::Local);

    assert!(approx_vec(
        tree.get(node).unwrap().frame.position,
        Vec3::new(-1.0, 0.0, 0.0)
    ));
}

#[test]
fn the_root_refuses_to_move() {
    let mut tree = NodeTree::new();
    let root = tree.root();

    tree.move_to(root, Vec3::ONE, TransformSpace::Parent);
    assert!(approx_vec(tree.get(root).unwrap().frame.position, Vec3::ZERO));
}

// ============================================================================
// Reparenting
// ============================================================================

#[test]
fn reparent_moves_the_subtree() {
    let mut tree = NodeTree::new();
    let root = tree.root();
    let a = tree.create_child(root, "a", CartesianFrame::IDENTITY).unwrap();
    let b = tree.create_child(root, "b", CartesianFrame::IDENTITY).unwrap();
    let child = tree.create_child(a, "child", CartesianFrame::IDENTITY).unwrap();

    tree.reparent(child, b).unwrap();

    assert_eq!(tree.get(child).unwrap().parent(), Some(b));
    assert_eq!(tree.find_child(a, "child"), None);
    assert_eq!(tree.find_child(b, "child"), Some(child));
}

#[test]
fn reparent_under_a_descendant_is_rejected() {
    let mut tree = NodeTree::new();
    let root = tree.root();
    let a = tree.create_child(root, "a", CartesianFrame::IDENTITY).unwrap();
    let b = tree.create_child(a, "b", CartesianFrame::IDENTITY).unwrap();
    let c = tree.create_child(b, "c", CartesianFrame::IDENTITY).unwrap();

    assert!(tree.reparent(a, c).is_err());
    assert!(tree.reparent(a, a).is_err());

    // Structure unchanged.
    assert_eq!(tree.get(a).unwrap().parent(), Some(root));
}

#[test]
fn reparent_rejects_sibling_name_collision() {
    let mut tree = NodeTree::new();
    let root = tree.root();
    let a = tree.create_child(root, "a", CartesianFrame::IDENTITY).unwrap();
    let b = tree.create_child(root, "b", CartesianFrame::IDENTITY).unwrap();
    tree.create_child(b, "twin", CartesianFrame::IDENTITY).unwrap();
    let twin_a = tree.create_child(a, "twin", CartesianFrame::IDENTITY).unwrap();

    assert!(tree.reparent(twin_a, b).is_err());
    assert_eq!(tree.get(twin_a).unwrap().parent(), Some(a));
}

// ============================================================================
// Degenerate Comparisons
// ============================================================================

#[test]
fn distance_to_self_is_zero() {
    let mut tree = NodeTree::new();
    let node = tree
        .create_child(tree.root(), "probe", CartesianFrame::from_position(Vec3::ONE))
        .unwrap();

    assert!(approx(tree.distance(node, node), 0.0));
    assert!(approx(tree.intersection_overlap(node, node), 0.0));
}

#[test]
fn distance_between_nodes_uses_world_positions() {
    let mut tree = NodeTree::new();
    let root = tree.root();
    let a = tree
        .create_child(root, "a", CartesianFrame::from_position(Vec3::new(-1.0, 0.0, 0.0)))
        .unwrap();
    let b = tree
        .create_child(root, "b", CartesianFrame::from_position(Vec3::new(2.0, 0.0, 0.0)))
        .unwrap();

    assert!(approx(tree.distance(a, b), 3.0));
}

// ============================================================================
// Events
// ============================================================================

#[test]
fn structural_changes_notify_observers() {
    let mut tree = NodeTree::new();
    let root = tree.root();
    let events = tree.subscribe();

    let child = tree
        .create_child(root, "probe", CartesianFrame::IDENTITY)
        .unwrap();

    assert_eq!(
        events.try_recv().unwrap(),
        SceneEvent::SubNodeCreating {
            parent: root,
            name: "probe".to_owned()
        }
    );
    assert_eq!(
        events.try_recv().unwrap(),
        SceneEvent::SubNodeCreated {
            parent: root,
            node: child
        }
    );

    tree.destroy_child(root, "probe");

    assert_eq!(
        events.try_recv().unwrap(),
        SceneEvent::SubNodeDeleting { node: child }
    );
    assert_eq!(
        events.try_recv().unwrap(),
        SceneEvent::SubNodeDeleted {
            parent: root,
            name: "probe".to_owned()
        }
    );
}

#[test]
fn trim_notifies_deletion_of_discarded_subtrees() {
    let mut tree = NodeTree::new();
    let root = tree.root();
    let child = tree
        .create_child(root, "probe", CartesianFrame::IDENTITY)
        .unwrap();

    let events = tree.subscribe();
    tree.discard(child);
    tree.trim_tree();

    assert_eq!(
        events.try_recv().unwrap(),
        SceneEvent::SubNodeDeleting { node: child }
    );
    assert_eq!(
        events.try_recv().unwrap(),
        SceneEvent::SubNodeDeleted {
            parent: root,
            name: "probe".to_owned()
        }
    );
}
