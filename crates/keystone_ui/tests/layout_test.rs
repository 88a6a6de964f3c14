//! # Layout Tests
//!
//! End-to-end checks of constraint resolution:
//! - Pinning to container edges, stretching, chains
//! - Rejected constraints leave the container untouched
//! - Hit testing through nested containers
//! - Drawing leaves no GL state behind

use std::rc::Rc;

use keystone_gl::{Context, GlCall, RecordingBackend};
use keystone_ui::{
    Anchor, Bounds, Constraint, ConstraintError, Container, Distance, Element, Location, Panel, Ui, UiConfig,
};

const WHITE: [f32; 4] = [1.0; 4];

fn panel(width: u32, height: u32) -> Panel {
    Panel::with_default_size(width, height, WHITE)
}

fn at(element: keystone_ui::ElementId, location: Location) -> Anchor {
    Anchor::new(element, location)
}

fn edge(location: Location) -> Anchor {
    Anchor::container(location)
}

/// Test: an element pinned to the top-right corner keeps its default size.
#[test]
fn test_pinned_to_top_right() {
    let mut container = Container::new();
    let e1 = container.add(panel(100, 50));

    container.constrain(at(e1, Location::East), edge(Location::East), 0).unwrap();
    container.constrain(at(e1, Location::North), edge(Location::North), 10).unwrap();
    container.layout(800, 600).unwrap();

    assert_eq!(container.bounds_of(e1), Some(Bounds::new(700, 10, 100, 50)));
}

/// Test: an element pinned on both horizontal edges stretches to fill.
#[test]
fn test_stretch_between_edges() {
    let mut container = Container::new();
    let e2 = container.add(panel(20, 20));

    container
        .add_width_relative_constraint(at(e2, Location::West), edge(Location::West), 0.0)
        .unwrap();
    container.constrain(at(e2, Location::East), edge(Location::East), 0).unwrap();
    container.layout(400, 300).unwrap();

    assert_eq!(container.bounds_of(e2).map(|b| b.width), Some(400));
}

/// Test: offsets accumulate through a chain of two intermediate hops.
#[test]
fn test_chain_resolves_transitively() {
    let mut container = Container::new();
    let a = container.add(panel(20, 20));
    let b = container.add(panel(20, 20));
    let c = container.add(panel(20, 20));

    // Added out of order; resolution follows the dependencies.
    container.constrain(at(c, Location::West), at(b, Location::West), 30).unwrap();
    container.constrain(at(b, Location::West), at(a, Location::West), 20).unwrap();
    container.constrain(at(a, Location::West), edge(Location::West), 10).unwrap();
    container.layout(800, 600).unwrap();

    assert_eq!(container.bounds_of(c).map(|b| b.x), Some(60));
}

/// Test: a row of elements each hanging off the previous one's east edge
/// resolves regardless of the order the constraints were added in.
#[test]
fn test_chain_through_opposite_edges() {
    let mut container = Container::new();
    let a = container.add(panel(20, 20));
    let b = container.add(panel(20, 20));
    let c = container.add(panel(20, 20));

    container.constrain(at(c, Location::West), at(b, Location::East), 30).unwrap();
    container.constrain(at(b, Location::West), at(a, Location::East), 20).unwrap();
    container.constrain(at(a, Location::West), edge(Location::West), 10).unwrap();
    container.layout(800, 600).unwrap();

    assert_eq!(container.bounds_of(a), Some(Bounds::new(10, 0, 20, 20)));
    assert_eq!(container.bounds_of(b), Some(Bounds::new(50, 0, 20, 20)));
    assert_eq!(container.bounds_of(c), Some(Bounds::new(100, 0, 20, 20)));
}

/// Test: a vertical stack built bottom-up matches one built top-down.
#[test]
fn test_stack_order_independent() {
    let build = |bottom_up: bool| {
        let mut container = Container::new();
        let ids: Vec<_> = (0..4).map(|_| container.add(panel(50, 10))).collect();
        let mut constraints = vec![(at(ids[0], Location::North), edge(Location::North))];
        constraints.extend(ids.windows(2).map(|pair| (at(pair[1], Location::North), at(pair[0], Location::South))));
        if bottom_up {
            constraints.reverse();
        }
        for (moving, fixed) in constraints {
            container.constrain(moving, fixed, 5).unwrap();
        }
        container.layout(200, 200).unwrap();
        ids.iter().map(|&id| container.bounds_of(id)).collect::<Vec<_>>()
    };

    let top_down = build(false);
    assert_eq!(top_down, build(true));
    assert_eq!(top_down[3], Some(Bounds::new(0, 50, 50, 10)));
}

/// Test: a loop through free opposite edges is refused up front.
#[test]
fn test_implied_cycle_rejected() {
    let mut container = Container::new();
    let a = container.add(panel(20, 20));
    let b = container.add(panel(20, 20));
    container.constrain(at(b, Location::North), at(a, Location::South), 0).unwrap();

    let result = container.constrain(at(a, Location::North), at(b, Location::South), 0);

    assert!(matches!(result, Err(ConstraintError::Cycle(_))));
    assert_eq!(container.constraint_count(), 1);
    container.layout(100, 100).unwrap();
}

/// Test: corner anchors constrain both axes at once.
#[test]
fn test_corner_constraint() {
    let mut container = Container::new();
    let e = container.add(panel(40, 30));

    container
        .constrain(at(e, Location::BOTTOM_RIGHT), edge(Location::BOTTOM_RIGHT), 5)
        .unwrap();
    container.layout(200, 100).unwrap();

    assert_eq!(container.constraint_count(), 2);
    assert_eq!(container.bounds_of(e), Some(Bounds::new(155, 65, 40, 30)));
}

/// Test: height-relative distances scale with the container.
#[test]
fn test_height_relative_follows_resize() {
    let mut ui = Ui::new(400, 200);
    let e = ui.container_mut().add(panel(10, 10));
    ui.container_mut()
        .add_height_relative_constraint(at(e, Location::North), edge(Location::North), 0.5)
        .unwrap();

    ui.layout().unwrap();
    assert_eq!(ui.container().bounds_of(e).map(|b| b.y), Some(100));

    ui.resize(400, 300).unwrap();
    assert_eq!(ui.container().bounds_of(e).map(|b| b.y), Some(150));
}

/// Test: a constraint that puts the west edge right of the east edge fails
/// and changes nothing.
#[test]
fn test_flip_detected() {
    let mut container = Container::new();
    let a = container.add(panel(20, 20));
    container.constrain(at(a, Location::East), edge(Location::West), 0).unwrap();
    container.constrain(at(a, Location::West), edge(Location::West), 100).unwrap();

    let result = container.layout(800, 600);

    assert!(matches!(result, Err(ConstraintError::Flipped(c)) if c.moving() == at(a, Location::West)));
    assert_eq!(container.bounds_of(a), Some(Bounds::new(0, 0, 20, 20)));
}

/// Test: a second incoming edge is rejected and the tree is unchanged.
#[test]
fn test_no_double_incoming_edge() {
    let mut container = Container::new();
    let a = container.add(panel(20, 20));
    container.constrain(at(a, Location::East), edge(Location::East), 0).unwrap();
    let (nodes, edges) = (container.node_count(), container.constraint_count());

    let result = container.constrain(at(a, Location::East), edge(Location::West), 5);
    let Err(error) = result else {
        panic!("second incoming edge accepted");
    };
    assert!(matches!(error, ConstraintError::AlreadyConstrained { .. }));
    assert_eq!(error.moving_anchor(), Some(at(a, Location::East)));
    assert_eq!(container.node_count(), nodes);
    assert_eq!(container.constraint_count(), edges);

    container.constrain(at(a, Location::North), edge(Location::North), 0).unwrap();
    assert_eq!(container.constraint_count(), edges + 1);
}

/// Test: a corner constraint with one conflicting axis adds neither axis.
#[test]
fn test_composite_is_all_or_nothing() {
    let mut container = Container::new();
    let a = container.add(panel(20, 20));
    container.constrain(at(a, Location::North), edge(Location::North), 0).unwrap();

    let result = container.constrain(at(a, Location::NorthWest), edge(Location::NorthWest), 5);

    assert!(matches!(result, Err(ConstraintError::AlreadyConstrained { .. })));
    assert_eq!(container.constraint_count(), 1);
    container.constrain(at(a, Location::West), edge(Location::West), 5).unwrap();
}

/// Test: axis mismatch is rejected before anything else.
#[test]
fn test_invalid_constraint() {
    let mut container = Container::new();
    let a = container.add(panel(20, 20));

    let result = container.add_constraint(Constraint::new(at(a, Location::NorthEast), edge(Location::West), 0));
    assert!(matches!(result, Err(ConstraintError::Invalid(_))));
}

/// Test: repeated layouts produce identical bounds.
#[test]
fn test_layout_is_deterministic() {
    let mut container = Container::new();
    let a = container.add(panel(30, 30));
    let b = container.add(panel(30, 30));
    container
        .add_constraint(Constraint::new(at(a, Location::West), edge(Location::West), Distance::WidthRelative(0.1)))
        .unwrap();
    container.constrain(at(a, Location::South), edge(Location::South), 7).unwrap();
    container.constrain(at(b, Location::West), at(a, Location::East), 4).unwrap();
    container.constrain(at(b, Location::East), edge(Location::East), 12).unwrap();
    container.constrain(at(b, Location::North), at(a, Location::North), 0).unwrap();

    container.layout(640, 480).unwrap();
    let first: Vec<_> = [a, b].iter().map(|&id| container.bounds_of(id)).collect();
    container.layout(640, 480).unwrap();
    let second: Vec<_> = [a, b].iter().map(|&id| container.bounds_of(id)).collect();

    assert_eq!(first, second);
    assert_eq!(first[0], Some(Bounds::new(64, 443, 30, 30)));
    assert_eq!(first[1], Some(Bounds::new(98, 443, 530, 30)));
}

/// Test: clearing constraints keeps bounds but frees every anchor.
#[test]
fn test_clear_constraints() {
    let mut container = Container::new();
    let a = container.add(panel(20, 20));
    container.constrain(at(a, Location::West), edge(Location::West), 50).unwrap();
    container.layout(100, 100).unwrap();

    container.clear_constraints();
    assert_eq!(container.constraint_count(), 0);
    assert!(container.constraints().is_empty());

    container.layout(100, 100).unwrap();
    assert_eq!(container.bounds_of(a), Some(Bounds::new(50, 0, 20, 20)));
    container.constrain(at(a, Location::West), edge(Location::West), 0).unwrap();
}

fn nested_ui() -> (Ui, [keystone_ui::ElementId; 4]) {
    let mut ui = Ui::new(800, 600);
    let root = ui.container_mut();

    let background = root.add(panel(800, 600));

    let mut nested = Container::new();
    let inner = nested.add(panel(20, 20));
    nested
        .constrain(at(inner, Location::NorthWest), edge(Location::NorthWest), 10)
        .unwrap();
    let overlay = nested.add(panel(20, 20).transparent());
    nested
        .constrain(at(overlay, Location::NorthWest), edge(Location::NorthWest), 10)
        .unwrap();

    let nested = root.add(nested);
    root.add_width_relative_constraint(at(nested, Location::West), edge(Location::West), 0.5)
        .unwrap();
    root.constrain(at(nested, Location::East), edge(Location::East), 0).unwrap();
    root.constrain(at(nested, Location::North), edge(Location::North), 0).unwrap();
    root.constrain(at(nested, Location::South), edge(Location::South), 0).unwrap();

    ui.layout().unwrap();
    (ui, [background, nested, inner, overlay])
}

/// Test: nested containers lay out inside their own bounds.
#[test]
fn test_nested_layout() {
    let (ui, [_, nested, inner, _]) = nested_ui();

    assert_eq!(ui.container().bounds_of(nested), Some(Bounds::new(400, 0, 400, 600)));
    let nested = ui.container().element(nested).and_then(Element::as_container).unwrap();
    assert_eq!(nested.bounds_of(inner), Some(Bounds::new(410, 10, 20, 20)));
}

/// Test: hit tests return the innermost element under the point.
#[test]
fn test_hit_testing() {
    let (ui, [background, nested, _, overlay]) = nested_ui();

    assert_eq!(ui.element_at(100, 100), Some(background));
    assert_eq!(ui.element_at(600, 300), Some(nested));
    assert_eq!(ui.element_at(415, 15), Some(overlay));
    assert_eq!(ui.element_at(-5, 15), None);
}

/// Test: opaque hit tests skip transparent elements and empty containers.
#[test]
fn test_opaque_hit_testing() {
    let (ui, [background, _, inner, _]) = nested_ui();

    assert_eq!(ui.opaque_element_at(415, 15), Some(inner));
    assert_eq!(ui.opaque_element_at(600, 300), Some(background));
}

/// Test: mutating a nested container through the root and laying out again.
#[test]
fn test_nested_container_mutation() {
    let (mut ui, [_, nested, inner, _]) = nested_ui();

    let container = ui
        .container_mut()
        .element_mut(nested)
        .and_then(Element::as_container_mut)
        .unwrap();
    assert!(container.remove_element(inner).is_some());
    assert_eq!(container.len(), 1);
    assert_eq!(container.constraint_count(), 2);
}

/// Test: drawing scissors each panel and restores all state afterward.
#[test]
fn test_draw_leaves_no_state() {
    let recording = Rc::new(RecordingBackend::with_viewport(800, 600));
    let mut ctx = Context::new(recording.clone(), 800, 600);
    let mut ui = Ui::from_config(&UiConfig::from_toml_str("width = 800\nheight = 600\n").unwrap());
    let a = ui.container_mut().add(panel(100, 50));
    ui.container_mut().add(Panel::new([0.0, 0.0, 1.0, 1.0]));
    ui.container_mut().constrain(at(a, Location::West), edge(Location::West), 0).unwrap();
    ui.layout().unwrap();

    let before = recording.state();
    ui.draw(&mut ctx, 0.0, 0.016);

    assert_eq!(recording.state(), before);
    assert_eq!(ctx.depth(), 1);
    assert_eq!(recording.count(|call| matches!(call, GlCall::Clear { .. })), 2);
    assert!(recording.calls().contains(&GlCall::Scissor {
        x: 0,
        y: 550,
        width: 100,
        height: 50,
    }));
}
