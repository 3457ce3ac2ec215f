use std::fmt;

use ai_agent::{AiController, Controller, SenseWorldView};
use ai_bt::BtStatus;
use ai_core::keys::{BOSS_KEYS, BOSS_PHASE, SELF_HEALTH};
use ai_core::{Blackboard, Commands, TickContext};
use ai_tools::{emit as trace_emit, enabled as trace_enabled, tags, TraceEvent};
use tracing::{info, warn};

use crate::config::ConfigError;
use crate::layer::{PatternLayer, PhaseChange, BOSS_LAYER};

/// User phase hook; runs with the boss's blackboard.
pub type PhaseHook = Box<dyn FnMut(&PhaseChange, &mut Blackboard)>;

/// An [`AiController`] with a [`PatternLayer`] advanced between perception
/// and the tree tick.
///
/// Per tick: perception, cooldowns and phase (exit hooks, built-in entry
/// effects, `boss.phase`, entry hooks), tree, transitions.
pub struct BossController<W>
where
    W: SenseWorldView,
{
    inner: AiController<W>,
    on_exit: Vec<(String, PhaseHook)>,
    on_enter: Vec<(String, PhaseHook)>,
}

impl<W: SenseWorldView> fmt::Debug for BossController<W> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BossController")
            .field("inner", &self.inner)
            .field("phase", &self.layer().map(PatternLayer::phase))
            .finish()
    }
}

impl<W> BossController<W>
where
    W: SenseWorldView,
{
    pub fn new(mut inner: AiController<W>, layer: PatternLayer) -> Self {
        let blackboard = inner.blackboard_mut();
        blackboard.set(BOSS_PHASE, layer.phase() as f32);
        blackboard.attach(BOSS_LAYER, layer);
        Self {
            inner,
            on_exit: Vec::new(),
            on_enter: Vec::new(),
        }
    }

    /// Run `hook` whenever the phase named `phase` is left.
    pub fn on_phase_exit(
        mut self,
        phase: impl Into<String>,
        hook: impl FnMut(&PhaseChange, &mut Blackboard) + 'static,
    ) -> Result<Self, ConfigError> {
        let phase = self.known_phase(phase.into())?;
        self.on_exit.push((phase, Box::new(hook)));
        Ok(self)
    }

    /// Run `hook` whenever the phase named `phase` is entered.
    pub fn on_phase_enter(
        mut self,
        phase: impl Into<String>,
        hook: impl FnMut(&PhaseChange, &mut Blackboard) + 'static,
    ) -> Result<Self, ConfigError> {
        let phase = self.known_phase(phase.into())?;
        self.on_enter.push((phase, Box::new(hook)));
        Ok(self)
    }

    fn known_phase(&self, phase: String) -> Result<String, ConfigError> {
        match self.layer() {
            Some(layer) if layer.phase_index(&phase).is_some() => Ok(phase),
            layer => Err(ConfigError::UnknownPhase {
                boss: layer.map_or_else(String::new, |l| l.name().to_owned()),
                phase,
            }),
        }
    }

    pub fn inner(&self) -> &AiController<W> {
        &self.inner
    }

    pub fn inner_mut(&mut self) -> &mut AiController<W> {
        &mut self.inner
    }

    pub fn blackboard(&self) -> &Blackboard {
        self.inner.blackboard()
    }

    pub fn layer(&self) -> Option<&PatternLayer> {
        self.inner.blackboard().attachment(BOSS_LAYER)
    }

    pub fn phase(&self) -> Option<usize> {
        self.layer().map(PatternLayer::phase)
    }

    pub fn tick(&mut self, ctx: &TickContext, world: &W) -> BtStatus {
        self.inner.perceive(ctx, world);
        self.advance_layer(ctx);
        self.inner.decide(ctx, world)
    }

    fn advance_layer(&mut self, ctx: &TickContext) {
        let agent = self.inner.agent();
        let blackboard = self.inner.blackboard_mut();
        let health = blackboard.get(SELF_HEALTH).unwrap_or(1.0);
        let Some(layer) = blackboard.attachment_mut(BOSS_LAYER) else {
            warn!(agent = ?agent, "boss controller has no pattern layer");
            return;
        };
        let Some(change) = layer.advance(ctx.dt(), health) else {
            return;
        };

        info!(
            agent = ?agent,
            from = %change.from_name,
            to = %change.to_name,
            health,
            "boss phase transition"
        );

        for (phase, hook) in &mut self.on_exit {
            if **phase == *change.from_name {
                hook(&change, blackboard);
            }
        }
        if let Some(layer) = blackboard.attachment_mut(BOSS_LAYER) {
            layer.enter(&change);
        }
        if let Err(err) = blackboard
            .grant("boss", BOSS_KEYS)
            .set(BOSS_PHASE, change.to as f32)
        {
            warn!(agent = ?agent, error = %err, "could not record boss phase");
        }
        for (phase, hook) in &mut self.on_enter {
            if **phase == *change.to_name {
                hook(&change, blackboard);
            }
        }

        if trace_enabled(blackboard) {
            trace_emit(
                blackboard,
                TraceEvent::new(ctx.tick, tags::PHASE)
                    .with_a(change.from as u64)
                    .with_b(change.to as u64)
                    .with_detail(change.to_name.to_string()),
            );
        }
    }
}

impl<W: SenseWorldView> Controller<W> for BossController<W> {
    fn id(&self) -> W::Agent {
        self.inner.agent()
    }

    fn tick(&mut self, ctx: &TickContext, world: &W) {
        BossController::tick(self, ctx, world);
    }

    fn commands_mut(&mut self) -> &mut Commands {
        self.inner.commands_mut()
    }

    fn blackboard_mut(&mut self) -> &mut Blackboard {
        self.inner.blackboard_mut()
    }
}
