//! Animation Dispatch Tests
//!
//! Tests for:
//! - Sequence keyframe sampling and repeat budgets
//! - Node channel dispatch through the logic cycle: position channels set,
//!   translation channels accumulate
//! - Unknown channel rejection (value dropped, others keep playing)
//! - Component channel dispatch (modifier magnitude)

use glam::Vec3;

use sylva::animation::{Animation, AnimationValue, ChannelId, InterpolationType, Sequence};
use sylva::math::CartesianFrame;
use sylva::physics::EnvironmentProperties;
use sylva::scene::{Component, DirectionalPushModifier, Node, NodeTree};

const EPSILON: f32 = 1e-4;

fn approx(a: f32, b: f32) -> bool {
    (a - b).abs() < EPSILON
}

/// A sequence that holds one constant value forever.
fn constant(value: AnimationValue) -> Box<Sequence> {
    let mut sequence = Sequence::looping(1000);
    sequence.add_key_frame(0, value, InterpolationType::Linear);
    Box::new(sequence)
}

// ============================================================================
// Sequence Sampling
// ============================================================================

#[test]
fn sequence_interpolates_linearly_over_its_timeline() {
    let mut sequence = Sequence::looping(1000);
    sequence.add_key_frame(0, AnimationValue::Scalar(0.0), InterpolationType::Linear);
    sequence.add_key_frame(1000, AnimationValue::Scalar(100.0), InterpolationType::Linear);

    sequence.set_time(250);
    assert!(approx(sequence.advance().unwrap().as_scalar().unwrap(), 25.0));
}

#[test]
fn sequence_cosine_midpoint_matches_linear() {
    let mut sequence = Sequence::looping(1000);
    sequence.add_key_frame(0, AnimationValue::Scalar(0.0), InterpolationType::Cosine);
    sequence.add_key_frame(1000, AnimationValue::Scalar(10.0), InterpolationType::Cosine);

    sequence.set_time(500);
    assert!(approx(sequence.advance().unwrap().as_scalar().unwrap(), 5.0));
}

#[test]
fn sequence_vector_keyframes_interpolate_componentwise() {
    let mut sequence = Sequence::looping(1000);
    sequence.add_key_frame(0, AnimationValue::Vector(Vec3::ZERO), InterpolationType::Linear);
    sequence.add_key_frame(
        1000,
        AnimationValue::Vector(Vec3::new(10.0, 20.0, 30.0)),
        InterpolationType::Linear,
    );

    sequence.set_time(500);
    let value = sequence.advance().unwrap().as_vector().unwrap();
    assert!((value - Vec3::new(5.0, 10.0, 15.0)).length() < EPSILON);
}

// ============================================================================
// Node Channels: Position Sets, Translation Adds
// ============================================================================

#[test]
fn local_x_position_channel_sets_the_coordinate_exactly() {
    let mut tree = NodeTree::new();
    let node = tree
        .create_child(tree.root(), "probe", CartesianFrame::from_position(Vec3::new(9.0, 1.0, 2.0)))
        .unwrap();

    tree.add_node_animation(
        node,
        Node::LOCAL_X_POSITION,
        constant(AnimationValue::Scalar(4.5)),
    )
    .unwrap();

    tree.process_logics(&EnvironmentProperties::void());

    // Set, not added or composed; the other coordinates are untouched.
    let position = tree.get(node).unwrap().frame.position;
    assert!(approx(position.x, 4.5));
    assert!(approx(position.y, 1.0));
    assert!(approx(position.z, 2.0));
}

#[test]
fn local_position_channel_replaces_the_position_vector() {
    let mut tree = NodeTree::new();
    let node = tree
        .create_child(tree.root(), "probe", CartesianFrame::from_position(Vec3::ONE))
        .unwrap();

    tree.add_node_animation(
        node,
        Node::LOCAL_POSITION,
        constant(AnimationValue::Vector(Vec3::new(7.0, 8.0, 9.0))),
    )
    .unwrap();

    tree.process_logics(&EnvironmentProperties::void());

    let position = tree.get(node).unwrap().frame.position;
    assert!((position - Vec3::new(7.0, 8.0, 9.0)).length() < EPSILON);
}

#[test]
fn translation_channel_accumulates_every_cycle() {
    let mut tree = NodeTree::new();
    let node = tree
        .create_child(tree.root(), "probe", CartesianFrame::IDENTITY)
        .unwrap();

    tree.add_node_animation(
        node,
        Node::PARENT_X_TRANSLATION,
        constant(AnimationValue::Scalar(2.0)),
    )
    .unwrap();

    tree.process_logics(&EnvironmentProperties::void());
    tree.process_logics(&EnvironmentProperties::void());
    tree.process_logics(&EnvironmentProperties::void());

    assert!(approx(tree.get(node).unwrap().frame.position.x, 6.0));
}

#[test]
fn rotation_channel_spins_the_frame() {
    let mut tree = NodeTree::new();
    let node = tree
        .create_child(tree.root(), "probe", CartesianFrame::IDENTITY)
        .unwrap();

    tree.add_node_animation(
        node,
        Node::LOCAL_Y_ROTATION,
        constant(AnimationValue::Scalar(std::f32::consts::FRAC_PI_2)),
    )
    .unwrap();

    tree.process_logics(&EnvironmentProperties::void());

    // After a quarter turn around Y, local -Z faces world -X.
    let forward = tree.get(node).unwrap().frame.forward();
    assert!((forward - Vec3::new(-1.0, 0.0, 0.0)).length() < EPSILON);
}

// ============================================================================
// Unknown Channels
// ============================================================================

#[test]
fn unknown_channel_drops_the_value_but_other_channels_play() {
    let mut tree = NodeTree::new();
    let node = tree
        .create_child(tree.root(), "probe", CartesianFrame::IDENTITY)
        .unwrap();

    tree.add_node_animation(node, ChannelId(999), constant(AnimationValue::Scalar(1.0)))
        .unwrap();
    tree.add_node_animation(
        node,
        Node::PARENT_X_POSITION,
        constant(AnimationValue::Scalar(3.0)),
    )
    .unwrap();

    tree.process_logics(&EnvironmentProperties::void());

    // The bogus channel changed nothing; the valid one played.
    assert!(approx(tree.get(node).unwrap().frame.position.x, 3.0));
}

#[test]
fn mismatched_value_type_is_rejected() {
    let mut tree = NodeTree::new();
    let node = tree
        .create_child(tree.root(), "probe", CartesianFrame::IDENTITY)
        .unwrap();

    // A vector on a scalar channel.
    tree.add_node_animation(
        node,
        Node::LOCAL_X_POSITION,
        constant(AnimationValue::Vector(Vec3::ONE)),
    )
    .unwrap();

    tree.process_logics(&EnvironmentProperties::void());

    assert!(approx(tree.get(node).unwrap().frame.position.x, 0.0));
}

// ============================================================================
// Finished Animations
// ============================================================================

#[test]
fn finished_animations_are_retired_from_the_node() {
    let mut tree = NodeTree::new();
    let node = tree
        .create_child(tree.root(), "probe", CartesianFrame::IDENTITY)
        .unwrap();

    let mut one_shot = Sequence::new(32, 1);
    one_shot.add_key_frame(0, AnimationValue::Scalar(1.0), InterpolationType::Linear);
    tree.add_node_animation(node, Node::PARENT_X_TRANSLATION, Box::new(one_shot))
        .unwrap();

    for _ in 0..10 {
        tree.process_logics(&EnvironmentProperties::void());
    }

    assert!(tree.get(node).unwrap().animations().is_empty());
}

// ============================================================================
// Component Channels
// ============================================================================

#[test]
fn modifier_magnitude_follows_its_animation() {
    let mut tree = NodeTree::new();
    let carrier = tree
        .create_child(tree.root(), "carrier", CartesianFrame::IDENTITY)
        .unwrap();

    let mut modifier = DirectionalPushModifier::new("fan", 0.0);
    modifier.base_mut().animations.add(
        DirectionalPushModifier::MAGNITUDE,
        constant(AnimationValue::Scalar(12.5)),
    );
    tree.attach_component(carrier, Box::new(modifier)).unwrap();

    tree.process_logics(&EnvironmentProperties::void());

    let node = tree.get(carrier).unwrap();
    let fan = node
        .component("fan")
        .and_then(|component| component.as_any().downcast_ref::<DirectionalPushModifier>())
        .unwrap();
    assert!(approx(fan.magnitude(), 12.5));
}
