use std::cell::RefCell;
use std::rc::Rc;

use ai_bt::{BehaviorTree, BtStatus, TreeBuilder};
use ai_core::{
    Action, ActionStatus, BbKey, Blackboard, BlackboardError, Command, Commands, TickContext,
    Vec2, WorldView,
};

const STOP: BbKey<bool> = BbKey::new("stop");

#[derive(Debug, Default)]
struct Recorder {
    canceled: Vec<&'static str>,
    ticked: Vec<&'static str>,
}

struct RecordingWorld;

impl WorldView for RecordingWorld {
    type Agent = u64;
}

struct RecordAction {
    name: &'static str,
    recorder: Rc<RefCell<Recorder>>,
}

impl Action<RecordingWorld> for RecordAction {
    fn tick(
        &mut self,
        _ctx: &TickContext,
        _agent: u64,
        _world: &RecordingWorld,
        _blackboard: &mut Blackboard,
        commands: &mut Commands,
    ) -> Result<ActionStatus, BlackboardError> {
        self.recorder.borrow_mut().ticked.push(self.name);
        commands.push(Command::MoveTo {
            target: Vec2::new(1.0, 0.0),
            speed: 1.0,
        });
        Ok(ActionStatus::Running)
    }

    fn cancel(
        &mut self,
        _ctx: &TickContext,
        _agent: u64,
        _world: &RecordingWorld,
        _blackboard: &mut Blackboard,
        commands: &mut Commands,
    ) {
        self.recorder.borrow_mut().canceled.push(self.name);
        commands.push(Command::Stop);
    }
}

fn make_tree(recorder: &Rc<RefCell<Recorder>>) -> BehaviorTree<RecordingWorld> {
    TreeBuilder::<RecordingWorld>::new("stop_or_move")
        .reactive_selector("root")
        .condition("stop", |_, _, _, bb| Ok(bb.get(STOP).unwrap_or(false)))
        .action(
            "move",
            RecordAction {
                name: "move",
                recorder: recorder.clone(),
            },
        )
        .end()
        .build()
        .unwrap()
}

#[test]
fn action_is_canceled_when_bt_branch_stops_requesting_it() {
    let recorder = Rc::new(RefCell::new(Recorder::default()));
    let mut tree = make_tree(&recorder);
    let mut bb = Blackboard::new();
    let mut commands = Commands::new();
    bb.set(STOP, false);

    // Tick once: action starts and runs.
    let ctx = TickContext::new(0, 0.1, 123);
    assert_eq!(
        tree.tick(&ctx, 1, &RecordingWorld, &mut bb, &mut commands),
        BtStatus::Running
    );
    assert_eq!(recorder.borrow().ticked, vec!["move"]);
    assert!(recorder.borrow().canceled.is_empty());
    commands.clear();

    // Flip STOP: the higher-priority branch wins and the move is cancelled.
    bb.set(STOP, true);
    let ctx = ctx.next();
    assert_eq!(
        tree.tick(&ctx, 1, &RecordingWorld, &mut bb, &mut commands),
        BtStatus::Success
    );

    assert_eq!(recorder.borrow().canceled, vec!["move"]);
    assert_eq!(recorder.borrow().ticked, vec!["move"]); // no extra tick after cancellation
    assert_eq!(commands.as_slice(), &[Command::Stop]);
}

#[test]
fn dropping_a_tree_discards_running_actions_without_cancel() {
    let recorder = Rc::new(RefCell::new(Recorder::default()));
    let mut tree = make_tree(&recorder);
    let mut bb = Blackboard::new();
    let mut commands = Commands::new();

    let ctx = TickContext::new(0, 0.1, 0);
    tree.tick(&ctx, 1, &RecordingWorld, &mut bb, &mut commands);
    assert!(tree.is_running());

    drop(tree);
    assert!(recorder.borrow().canceled.is_empty());
}
