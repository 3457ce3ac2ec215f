use ai_bt::{BuildError, NodeRegistry, ParallelPolicy, RepeatLimit, TreeBuilder};
use ai_core::{ActionStatus, WorldView};

struct World;

impl WorldView for World {
    type Agent = u32;
}

fn builder() -> TreeBuilder<World> {
    TreeBuilder::new("test")
}

fn ok(
    _: &ai_core::TickContext,
    _: u32,
    _: &World,
    _: &ai_core::Blackboard,
) -> Result<bool, ai_core::BlackboardError> {
    Ok(true)
}

fn idle(
    _: &ai_core::TickContext,
    _: u32,
    _: &World,
    _: &mut ai_core::Blackboard,
    _: &mut ai_core::Commands,
) -> Result<ActionStatus, ai_core::BlackboardError> {
    Ok(ActionStatus::Success)
}

#[test]
fn unclosed_scope_is_rejected() {
    let err = builder()
        .selector("root")
        .sequence("inner")
        .condition("c", ok)
        .end()
        .build()
        .unwrap_err();
    assert_eq!(
        err,
        BuildError::UnclosedScope {
            tree: "test".into(),
            node: "root".into(),
            open: 1,
        }
    );
}

#[test]
fn decorator_with_two_children_is_rejected() {
    let err = builder()
        .inverter("not")
        .condition("a", ok)
        .condition("b", ok)
        .end()
        .build()
        .unwrap_err();
    assert!(matches!(err, BuildError::DecoratorArity { node, .. } if node == "not"));
}

#[test]
fn leaf_without_scope_is_rejected() {
    let err = builder().condition("lonely", ok).build().unwrap_err();
    assert!(matches!(err, BuildError::NoOpenScope { node, .. } if node == "lonely"));

    // Also after the root has been closed.
    let err = builder()
        .selector("root")
        .condition("a", ok)
        .end()
        .condition("late", ok)
        .build()
        .unwrap_err();
    assert!(matches!(err, BuildError::NoOpenScope { node, .. } if node == "late"));
}

#[test]
fn structural_mistakes_are_named() {
    assert!(matches!(
        builder().end().build(),
        Err(BuildError::UnbalancedEnd { .. })
    ));
    assert!(matches!(builder().build(), Err(BuildError::Empty { .. })));
    assert!(matches!(
        builder().sequence("empty").end().build(),
        Err(BuildError::EmptyComposite { node, .. }) if node == "empty"
    ));
    assert!(matches!(
        builder().selector("r").inverter("bare").end().end().build(),
        Err(BuildError::EmptyDecorator { node, .. }) if node == "bare"
    ));
    assert!(matches!(
        builder()
            .selector("a")
            .condition("x", ok)
            .end()
            .selector("b")
            .condition("y", ok)
            .end()
            .build(),
        Err(BuildError::MultipleRoots { node, .. }) if node == "b"
    ));
}

#[test]
fn invalid_parameters_are_rejected() {
    assert!(matches!(
        builder()
            .repeater("zero", RepeatLimit::Count(0))
            .condition("c", ok)
            .end()
            .build(),
        Err(BuildError::InvalidParameter { node, .. }) if node == "zero"
    ));
    assert!(matches!(
        builder().timeout("t", -1.0).condition("c", ok).end().build(),
        Err(BuildError::InvalidParameter { .. })
    ));
    assert!(matches!(
        builder()
            .parallel("p", ParallelPolicy::require(3))
            .condition("a", ok)
            .condition("b", ok)
            .end()
            .build(),
        Err(BuildError::InvalidParameter { node, .. }) if node == "p"
    ));
}

#[test]
fn depth_limit_is_enforced() {
    let mut b = builder().max_depth(3);
    for i in 0..4 {
        b = b.inverter(format!("level{i}"));
    }
    b = b.condition("leaf", ok);
    for _ in 0..4 {
        b = b.end();
    }
    // level0 is depth 0, so the leaf would sit at depth 4.
    assert!(matches!(
        b.build(),
        Err(BuildError::TooDeep { node, max: 3, .. }) if node == "leaf"
    ));
}

#[test]
fn first_error_wins() {
    let err = builder()
        .end()
        .condition("ignored", ok)
        .build()
        .unwrap_err();
    assert!(matches!(err, BuildError::UnbalancedEnd { .. }));
    assert!(err.to_string().contains("test"));
}

#[test]
fn registry_lookups_resolve_at_build_time() {
    let mut registry = NodeRegistry::<World>::new();
    registry.register_action("idle", || ai_core::ActionFn::new(idle));
    registry.register_condition("always", || ai_bt::ConditionFn::new(ok));
    assert!(registry.has_action("idle"));

    let tree = builder()
        .selector("root")
        .condition_from(&registry, "always")
        .action_from(&registry, "idle")
        .end()
        .build()
        .unwrap();
    assert_eq!(tree.len(), 3);
    assert!(tree.find("idle").is_some());

    let err = builder()
        .selector("root")
        .action_from(&registry, "dance")
        .end()
        .build()
        .unwrap_err();
    assert_eq!(
        err,
        BuildError::UnknownNode {
            tree: "test".into(),
            kind: "action",
            name: "dance".into(),
        }
    );
}
