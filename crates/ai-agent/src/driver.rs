//! Frame driver: tick many controllers against one world snapshot.

use ai_core::{ActuationSink, Blackboard, Commands, TickContext, WorldView};
use tracing::trace;

use crate::controller::AiController;
use crate::perception::SenseWorldView;

/// Anything the frame driver can tick.
pub trait Controller<W: WorldView> {
    fn id(&self) -> W::Agent;

    /// Run one full decision step. Commands accumulate in `commands_mut`.
    fn tick(&mut self, ctx: &TickContext, world: &W);

    fn commands_mut(&mut self) -> &mut Commands;

    /// Outside writers (difficulty tuning, scripted events) go through here.
    fn blackboard_mut(&mut self) -> &mut Blackboard;
}

impl<W, C> Controller<W> for Box<C>
where
    W: WorldView,
    C: Controller<W> + ?Sized,
{
    fn id(&self) -> W::Agent {
        (**self).id()
    }

    fn tick(&mut self, ctx: &TickContext, world: &W) {
        (**self).tick(ctx, world);
    }

    fn commands_mut(&mut self) -> &mut Commands {
        (**self).commands_mut()
    }

    fn blackboard_mut(&mut self) -> &mut Blackboard {
        (**self).blackboard_mut()
    }
}

impl<W: SenseWorldView> Controller<W> for AiController<W> {
    fn id(&self) -> W::Agent {
        self.agent()
    }

    fn tick(&mut self, ctx: &TickContext, world: &W) {
        AiController::tick(self, ctx, world);
    }

    fn commands_mut(&mut self) -> &mut Commands {
        AiController::commands_mut(self)
    }

    fn blackboard_mut(&mut self) -> &mut Blackboard {
        AiController::blackboard_mut(self)
    }
}

/// Tick every controller once, then forward their commands to `sink`.
///
/// Controllers are visited in agent-id order and every one of them observes
/// the same `world`; nothing reaches the sink until all have ticked, so the
/// slice order never changes the outcome.
pub fn tick_agents<W, C, S>(ctx: &TickContext, world: &W, controllers: &mut [C], sink: &mut S)
where
    W: WorldView,
    C: Controller<W>,
    S: ActuationSink<W::Agent>,
{
    controllers.sort_by_key(|c| c.id());
    for controller in controllers.iter_mut() {
        controller.tick(ctx, world);
    }
    for controller in controllers.iter_mut() {
        let agent = controller.id();
        let commands = controller.commands_mut();
        trace!(agent = ?agent, count = commands.len(), "forwarding commands");
        for command in commands.drain() {
            sink.apply(agent, command);
        }
    }
}
