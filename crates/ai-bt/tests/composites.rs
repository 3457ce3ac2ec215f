use std::cell::RefCell;
use std::rc::Rc;

use ai_bt::{BehaviorTree, BtStatus, ParallelPolicy, RepeatLimit, TreeBuilder};
use ai_core::{
    Action, ActionStatus, BbKey, Blackboard, BlackboardError, Commands, TickContext, WorldView,
};
use ai_tools::{tags, TraceLog, TRACE_LOG};

struct World;

impl WorldView for World {
    type Agent = u64;
}

type Log = Rc<RefCell<Vec<String>>>;

/// Records every tick/cancel and replays a script of statuses (the last entry repeats).
struct Scripted {
    name: &'static str,
    log: Log,
    script: Vec<ActionStatus>,
    at: usize,
    max_duration: Option<f32>,
}

impl Scripted {
    fn new(name: &'static str, log: &Log, script: &[ActionStatus]) -> Self {
        Self {
            name,
            log: log.clone(),
            script: script.to_vec(),
            at: 0,
            max_duration: None,
        }
    }
}

impl Action<World> for Scripted {
    fn tick(
        &mut self,
        _ctx: &TickContext,
        _agent: u64,
        _world: &World,
        _blackboard: &mut Blackboard,
        _commands: &mut Commands,
    ) -> Result<ActionStatus, BlackboardError> {
        self.log.borrow_mut().push(self.name.to_string());
        let status = self.script[self.at.min(self.script.len() - 1)];
        self.at += 1;
        Ok(status)
    }

    fn cancel(
        &mut self,
        _ctx: &TickContext,
        _agent: u64,
        _world: &World,
        _blackboard: &mut Blackboard,
        _commands: &mut Commands,
    ) {
        self.log.borrow_mut().push(format!("cancel:{}", self.name));
    }

    fn max_duration(&self) -> Option<f32> {
        self.max_duration
    }
}

use ActionStatus::{Failure as F, Running as R, Success as S};

struct Harness {
    tree: BehaviorTree<World>,
    bb: Blackboard,
    commands: Commands,
    tick: u64,
}

impl Harness {
    fn new(tree: BehaviorTree<World>) -> Self {
        Self {
            tree,
            bb: Blackboard::new(),
            commands: Commands::new(),
            tick: 0,
        }
    }

    fn tick(&mut self) -> BtStatus {
        let ctx = TickContext::new(self.tick, 0.1, 1);
        self.bb.begin_tick(self.tick);
        self.tick += 1;
        self.tree
            .tick(&ctx, 1, &World, &mut self.bb, &mut self.commands)
    }
}

fn counting_condition(
    name: &'static str,
    log: &Log,
    result: bool,
) -> impl FnMut(&TickContext, u64, &World, &Blackboard) -> Result<bool, BlackboardError> {
    let log = log.clone();
    move |_, _, _, _| {
        log.borrow_mut().push(name.to_string());
        Ok(result)
    }
}

fn drain(log: &Log) -> Vec<String> {
    std::mem::take(&mut *log.borrow_mut())
}

#[test]
fn selector_stops_at_first_success() {
    let log = Log::default();
    let tree = TreeBuilder::<World>::new("t")
        .selector("root")
        .condition("a", counting_condition("a", &log, false))
        .condition("b", counting_condition("b", &log, true))
        .action("c", Scripted::new("c", &log, &[S]))
        .end()
        .build()
        .unwrap();
    let mut h = Harness::new(tree);

    assert_eq!(h.tick(), BtStatus::Success);
    assert_eq!(drain(&log), ["a", "b"]);
}

#[test]
fn sequence_with_failed_range_check_never_attacks() {
    let log = Log::default();
    let tree = TreeBuilder::<World>::new("t")
        .sequence("engage")
        .condition("in_range", counting_condition("in_range", &log, false))
        .action("attack", Scripted::new("attack", &log, &[S]))
        .end()
        .build()
        .unwrap();
    let mut h = Harness::new(tree);

    assert_eq!(h.tick(), BtStatus::Failure);
    assert_eq!(drain(&log), ["in_range"]);
    assert!(h.commands.is_empty());
}

#[test]
fn memory_sequence_resumes_at_running_child() {
    let log = Log::default();
    let tree = TreeBuilder::<World>::new("t")
        .sequence("root")
        .action("a", Scripted::new("a", &log, &[S]))
        .action("b", Scripted::new("b", &log, &[R, R, S]))
        .action("c", Scripted::new("c", &log, &[S]))
        .end()
        .build()
        .unwrap();
    let mut h = Harness::new(tree);

    assert_eq!(h.tick(), BtStatus::Running);
    assert_eq!(drain(&log), ["a", "b"]);
    assert_eq!(h.tick(), BtStatus::Running);
    assert_eq!(drain(&log), ["b"]);
    assert_eq!(h.tick(), BtStatus::Success);
    assert_eq!(drain(&log), ["b", "c"]);
    // A finished sweep starts over.
    h.tick();
    assert_eq!(drain(&log)[0], "a");
}

#[test]
fn memory_selector_does_not_recheck_earlier_siblings() {
    let log = Log::default();
    let tree = TreeBuilder::<World>::new("t")
        .selector("root")
        .condition("guard", counting_condition("guard", &log, false))
        .action("work", Scripted::new("work", &log, &[R, S]))
        .end()
        .build()
        .unwrap();
    let mut h = Harness::new(tree);

    assert_eq!(h.tick(), BtStatus::Running);
    assert_eq!(drain(&log), ["guard", "work"]);
    assert_eq!(h.tick(), BtStatus::Success);
    assert_eq!(drain(&log), ["work"]);
}

#[test]
fn reactive_sequence_rechecks_guard_and_halts_running_child() {
    const ALLOWED: BbKey<bool> = BbKey::new("allowed");
    let log = Log::default();
    let tree = TreeBuilder::<World>::new("t")
        .reactive_sequence("root")
        .condition("allowed", |_, _, _, bb| bb.require(ALLOWED))
        .action("work", Scripted::new("work", &log, &[R]))
        .end()
        .build()
        .unwrap();
    let mut h = Harness::new(tree);
    h.bb.set(ALLOWED, true);

    assert_eq!(h.tick(), BtStatus::Running);
    assert_eq!(h.tick(), BtStatus::Running);
    assert_eq!(drain(&log), ["work", "work"]);

    h.bb.set(ALLOWED, false);
    assert_eq!(h.tick(), BtStatus::Failure);
    assert_eq!(drain(&log), ["cancel:work"]);
    assert!(h.tree.active_path().is_empty());
}

#[test]
fn parallel_one_of_two_waits_for_the_running_child() {
    let log = Log::default();
    let tree = TreeBuilder::<World>::new("t")
        .parallel("root", ParallelPolicy::require(1))
        .action("fails", Scripted::new("fails", &log, &[F]))
        .action("slow", Scripted::new("slow", &log, &[R, R, S]))
        .end()
        .build()
        .unwrap();
    let mut h = Harness::new(tree);

    assert_eq!(h.tick(), BtStatus::Running);
    assert_eq!(h.tick(), BtStatus::Running);
    assert_eq!(h.tick(), BtStatus::Success);
    // Both children were evaluated on every tick.
    assert_eq!(drain(&log).len(), 6);
}

#[test]
fn parallel_halts_running_children_once_decided() {
    let log = Log::default();
    let tree = TreeBuilder::<World>::new("t")
        .parallel("root", ParallelPolicy::require_all().fail_on_any())
        .action("watch", Scripted::new("watch", &log, &[R]))
        .action("move", Scripted::new("move", &log, &[R, F]))
        .end()
        .build()
        .unwrap();
    let mut h = Harness::new(tree);

    assert_eq!(h.tick(), BtStatus::Running);
    assert_eq!(h.tick(), BtStatus::Failure);
    assert_eq!(
        drain(&log),
        ["watch", "move", "watch", "move", "cancel:watch"]
    );
}

#[test]
fn inverter_and_repeater() {
    let log = Log::default();
    let tree = TreeBuilder::<World>::new("t")
        .sequence("root")
        .inverter("not")
        .condition("false", |_, _, _, _| Ok(false))
        .end()
        .repeater("thrice", RepeatLimit::Count(3))
        .action("hit", Scripted::new("hit", &log, &[S]))
        .end()
        .end()
        .build()
        .unwrap();
    let mut h = Harness::new(tree);

    assert_eq!(h.tick(), BtStatus::Running);
    assert_eq!(h.tick(), BtStatus::Running);
    assert_eq!(h.tick(), BtStatus::Success);
    // One child run per tick, never a loop inside one tick.
    assert_eq!(drain(&log), ["hit", "hit", "hit"]);
}

#[test]
fn forever_repeater_never_finishes() {
    let log = Log::default();
    let tree = TreeBuilder::<World>::new("t")
        .repeater("loop", RepeatLimit::Forever)
        .action("step", Scripted::new("step", &log, &[S, F]))
        .end()
        .build()
        .unwrap();
    let mut h = Harness::new(tree);
    for _ in 0..5 {
        assert_eq!(h.tick(), BtStatus::Running);
    }
    assert_eq!(drain(&log).len(), 5);
}

#[test]
fn timeout_fails_and_cancels_a_stuck_child() {
    let log = Log::default();
    let tree = TreeBuilder::<World>::new("t")
        .timeout("bounded", 0.25)
        .action("stuck", Scripted::new("stuck", &log, &[R]))
        .end()
        .build()
        .unwrap();
    let mut h = Harness::new(tree);

    // dt = 0.1: elapsed 0.0, 0.1, 0.2 are within the bound, 0.3 is not.
    for _ in 0..3 {
        assert_eq!(h.tick(), BtStatus::Running);
    }
    assert_eq!(h.tick(), BtStatus::Failure);
    assert_eq!(drain(&log), ["stuck", "stuck", "stuck", "cancel:stuck"]);
}

#[test]
fn action_max_duration_forces_failure() {
    let log = Log::default();
    let mut stuck = Scripted::new("stuck", &log, &[R]);
    stuck.max_duration = Some(0.15);
    let tree = TreeBuilder::<World>::new("t")
        .sequence("root")
        .action("stuck", stuck)
        .end()
        .build()
        .unwrap();
    let mut h = Harness::new(tree);

    assert_eq!(h.tick(), BtStatus::Running);
    assert_eq!(h.tick(), BtStatus::Running);
    assert_eq!(h.tick(), BtStatus::Failure);
    assert_eq!(drain(&log), ["stuck", "stuck", "cancel:stuck"]);
}

#[test]
fn missing_key_degrades_to_failure_and_is_reported_once() {
    const TARGET_VISIBLE: BbKey<bool> = BbKey::new("target.visible");
    let tree = TreeBuilder::<World>::new("t")
        .selector("root")
        .condition("sees_target", |_, _, _, bb| bb.require(TARGET_VISIBLE))
        .condition("fallback", |_, _, _, _| Ok(true))
        .end()
        .build()
        .unwrap();
    let mut h = Harness::new(tree);
    h.bb.attach(TRACE_LOG, TraceLog::default());

    let degraded = |h: &Harness| {
        h.bb.attachment(TRACE_LOG)
            .unwrap()
            .with_tag(tags::DEGRADED)
            .count()
    };

    for _ in 0..3 {
        assert_eq!(h.tick(), BtStatus::Success);
    }
    assert_eq!(degraded(&h), 1);
    let id = h.tree.find("sees_target").unwrap();
    assert!(h.tree.node(id).unwrap().degraded);

    h.bb.set(TARGET_VISIBLE, false);
    h.tick();
    assert!(!h.tree.node(id).unwrap().degraded);

    h.bb.remove(TARGET_VISIBLE);
    h.tick();
    h.tick();
    assert_eq!(degraded(&h), 2);

    let event = h
        .bb
        .attachment(TRACE_LOG)
        .unwrap()
        .with_tag(tags::DEGRADED)
        .next()
        .cloned()
        .unwrap();
    assert_eq!(event.a, id.0 as u64);
    assert!(event.detail.unwrap().contains("target.visible"));
}

#[test]
fn unchanged_inputs_give_the_same_status() {
    const HP: BbKey<f32> = BbKey::new("hp");
    let tree = TreeBuilder::<World>::new("t")
        .selector("root")
        .sequence("flee")
        .condition("low", |_, _, _, bb| Ok(bb.require(HP)? < 0.3))
        .condition("can_flee", |_, _, _, _| Ok(false))
        .end()
        .inverter("not_dead")
        .condition("dead", |_, _, _, bb| Ok(bb.require(HP)? <= 0.0))
        .end()
        .end()
        .build()
        .unwrap();
    let mut h = Harness::new(tree);
    for hp in [1.0, 0.2, 0.0] {
        h.bb.set(HP, hp);
        let first = h.tick();
        assert_eq!(h.tick(), first, "hp = {hp}");
    }
}

#[test]
fn active_path_lists_running_nodes_root_first() {
    let log = Log::default();
    let tree = TreeBuilder::<World>::new("t")
        .selector("root")
        .sequence("patrol")
        .condition("ok", |_, _, _, _| Ok(true))
        .action("walk", Scripted::new("walk", &log, &[R, S]))
        .end()
        .end()
        .build()
        .unwrap();
    let mut h = Harness::new(tree);

    h.tick();
    let names: Vec<&str> = h
        .tree
        .active_path()
        .iter()
        .map(|id| h.tree.node(*id).unwrap().name)
        .collect();
    assert_eq!(names, ["root", "patrol", "walk"]);
    assert_eq!(h.tree.running_leaf(), Some("walk"));

    h.tick();
    assert!(h.tree.active_path().is_empty());
    assert_eq!(h.tree.status(), Some(BtStatus::Success));
}

#[test]
fn halt_cancels_running_actions_and_restarts_from_root() {
    let log = Log::default();
    let tree = TreeBuilder::<World>::new("t")
        .sequence("root")
        .action("first", Scripted::new("first", &log, &[S]))
        .action("second", Scripted::new("second", &log, &[R]))
        .end()
        .build()
        .unwrap();
    let mut h = Harness::new(tree);
    h.tick();
    drain(&log);

    let ctx = TickContext::new(h.tick, 0.1, 1);
    h.tree
        .halt(&ctx, 1, &World, &mut h.bb, &mut h.commands);
    assert_eq!(drain(&log), ["cancel:second"]);
    assert_eq!(h.tree.status(), None);

    h.tick();
    assert_eq!(drain(&log), ["first", "second"]);
}

#[test]
fn inspect_reports_topology() {
    let tree = TreeBuilder::<World>::new("t")
        .selector("root")
        .inverter("not")
        .condition("c", |_, _, _, _| Ok(true))
        .end()
        .end()
        .build()
        .unwrap();
    let views: Vec<_> = tree.inspect().map(|v| (v.name, v.kind, v.depth, v.parent)).collect();
    assert_eq!(
        views,
        [
            ("root", "selector", 0, None),
            ("not", "inverter", 1, Some(ai_bt::NodeId(0))),
            ("c", "condition", 2, Some(ai_bt::NodeId(1))),
        ]
    );
}
