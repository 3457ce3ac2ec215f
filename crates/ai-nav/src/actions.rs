use ai_core::keys::PLAYER_LAST_KNOWN;
use ai_core::{
    Action, ActionStatus, BbKey, Blackboard, BlackboardError, Command, Commands, DeterministicRng,
    TickContext,
};

use crate::{NavPath, NavWorldView, Vec2};

/// Where a [`MoveToAction`] is heading.
#[derive(Debug, Clone, Copy)]
pub enum MoveTarget {
    Point(Vec2),
    /// Re-read every tick; the route is re-planned when the goal drifts.
    Key(BbKey<Vec2>),
}

impl MoveTarget {
    fn resolve(&self, blackboard: &Blackboard) -> Result<Vec2, BlackboardError> {
        match *self {
            MoveTarget::Point(p) => Ok(p),
            MoveTarget::Key(key) => blackboard.require(key),
        }
    }
}

/// Follow a planned path toward a goal.
///
/// `Running` while travelling, `Success` once within `arrival_distance`,
/// `Failure` when the agent has no position or no route exists, or when a
/// run outlasts [`MoveToAction::with_max_duration`].
#[derive(Debug, Clone)]
pub struct MoveToAction {
    target: MoveTarget,
    speed: f32,
    arrival_distance: f32,
    max_duration: Option<f32>,
    path: Option<NavPath>,
    next_index: usize,
}

impl MoveToAction {
    pub fn new(target: MoveTarget, speed: f32, arrival_distance: f32) -> Self {
        Self {
            target,
            speed,
            arrival_distance: arrival_distance.max(f32::EPSILON),
            max_duration: None,
            path: None,
            next_index: 1,
        }
    }

    pub fn to_point(goal: Vec2, speed: f32, arrival_distance: f32) -> Self {
        Self::new(MoveTarget::Point(goal), speed, arrival_distance)
    }

    pub fn to_key(key: BbKey<Vec2>, speed: f32, arrival_distance: f32) -> Self {
        Self::new(MoveTarget::Key(key), speed, arrival_distance)
    }

    /// Give up after `seconds` of continuous running.
    pub fn with_max_duration(mut self, seconds: f32) -> Self {
        self.max_duration = Some(seconds);
        self
    }

    pub fn retarget(&mut self, target: MoveTarget) {
        self.target = target;
        self.forget();
    }

    /// Current route, if one is planned.
    pub fn path(&self) -> Option<&NavPath> {
        self.path.as_ref()
    }

    fn forget(&mut self) {
        self.path = None;
        self.next_index = 1;
    }

    /// One movement step toward `goal`; shared by the patrol and search actions.
    fn step<W: NavWorldView>(
        &mut self,
        agent: W::Agent,
        world: &W,
        goal: Vec2,
        commands: &mut Commands,
    ) -> ActionStatus {
        let Some(position) = world.position(agent) else {
            self.forget();
            return ActionStatus::Failure;
        };
        if position.distance(goal) <= self.arrival_distance {
            self.forget();
            commands.push(Command::Stop);
            return ActionStatus::Success;
        }

        let drifted = self
            .path
            .as_ref()
            .and_then(NavPath::goal)
            .map_or(true, |planned| planned.distance(goal) > self.arrival_distance);
        if drifted {
            self.path = world.navigator().find_path(position, goal);
            self.next_index = 1;
        }
        let Some(path) = &self.path else {
            return ActionStatus::Failure;
        };
        if path.points.len() < 2 {
            self.forget();
            return ActionStatus::Failure;
        }

        let last = path.points.len() - 1;
        while self.next_index < last
            && position.distance(path.points[self.next_index]) <= self.arrival_distance
        {
            self.next_index += 1;
        }
        commands.push(Command::MoveTo {
            target: path.points[self.next_index.min(last)],
            speed: self.speed,
        });
        ActionStatus::Running
    }
}

impl<W> Action<W> for MoveToAction
where
    W: NavWorldView,
{
    fn tick(
        &mut self,
        _ctx: &TickContext,
        agent: W::Agent,
        world: &W,
        blackboard: &mut Blackboard,
        commands: &mut Commands,
    ) -> Result<ActionStatus, BlackboardError> {
        let goal = self.target.resolve(blackboard)?;
        Ok(self.step(agent, world, goal, commands))
    }

    fn cancel(
        &mut self,
        _ctx: &TickContext,
        _agent: W::Agent,
        _world: &W,
        _blackboard: &mut Blackboard,
        commands: &mut Commands,
    ) {
        self.forget();
        commands.push(Command::Stop);
    }

    fn max_duration(&self) -> Option<f32> {
        self.max_duration
    }
}

/// Walk a closed loop of waypoints forever.
///
/// Never succeeds on its own; the tree or a state transition preempts it.
/// Re-entering after a halt resumes at the waypoint it was heading to.
#[derive(Debug, Clone)]
pub struct PatrolAction {
    waypoints: Vec<Vec2>,
    current: usize,
    leg: MoveToAction,
}

impl PatrolAction {
    pub fn new(waypoints: Vec<Vec2>, speed: f32, arrival_distance: f32) -> Self {
        let first = waypoints.first().copied().unwrap_or(Vec2::ZERO);
        Self {
            waypoints,
            current: 0,
            leg: MoveToAction::to_point(first, speed, arrival_distance),
        }
    }

    /// Index of the waypoint currently targeted.
    pub fn current_waypoint(&self) -> usize {
        self.current
    }
}

impl<W> Action<W> for PatrolAction
where
    W: NavWorldView,
{
    fn tick(
        &mut self,
        _ctx: &TickContext,
        agent: W::Agent,
        world: &W,
        _blackboard: &mut Blackboard,
        commands: &mut Commands,
    ) -> Result<ActionStatus, BlackboardError> {
        if self.waypoints.is_empty() {
            return Ok(ActionStatus::Failure);
        }
        // At most one arrival per tick, so a degenerate loop cannot spin.
        let goal = self.waypoints[self.current];
        match self.leg.step(agent, world, goal, commands) {
            ActionStatus::Success => {
                self.current = (self.current + 1) % self.waypoints.len();
                Ok(ActionStatus::Running)
            }
            status => Ok(status),
        }
    }

    fn cancel(
        &mut self,
        _ctx: &TickContext,
        _agent: W::Agent,
        _world: &W,
        _blackboard: &mut Blackboard,
        commands: &mut Commands,
    ) {
        self.leg.forget();
        commands.push(Command::Stop);
    }
}

/// Sweep the area around the player's last known position.
///
/// Goes to `player.last_known` first, then to `probes` random points within
/// `radius` of it, then succeeds. Probe points come from the tick context's
/// per-agent RNG, so a replay with the same seed searches the same spots.
#[derive(Debug, Clone)]
pub struct SearchAction {
    radius: f32,
    probes: u32,
    leg: MoveToAction,
    origin: Option<Vec2>,
    goal: Vec2,
    visited: u32,
}

impl SearchAction {
    /// RNG stream reserved for search probes.
    pub const RNG_STREAM: u64 = 0x5EA2C4;

    pub fn new(radius: f32, probes: u32, speed: f32, arrival_distance: f32) -> Self {
        Self {
            radius: radius.max(0.0),
            probes,
            leg: MoveToAction::to_point(Vec2::ZERO, speed, arrival_distance),
            origin: None,
            goal: Vec2::ZERO,
            visited: 0,
        }
    }

    fn reset(&mut self) {
        self.origin = None;
        self.visited = 0;
        self.leg.forget();
    }

    fn pick_probe<W: NavWorldView>(
        &self,
        ctx: &TickContext,
        agent: W::Agent,
        world: &W,
        origin: Vec2,
    ) -> Vec2 {
        let stream = Self::RNG_STREAM ^ ctx.tick.rotate_left(17) ^ self.visited as u64;
        let mut rng = ctx.rng_for_agent(agent, stream);
        // A few tries to land on walkable ground, else fall back to the origin.
        for _ in 0..8 {
            let angle = rng.next_range_f32(0.0, std::f32::consts::TAU);
            let distance = self.radius * rng.next_f32_unit().sqrt();
            let probe = origin + Vec2::new(angle.cos(), angle.sin()) * distance;
            if world.navigator().is_walkable(probe) {
                return probe;
            }
        }
        origin
    }
}

impl<W> Action<W> for SearchAction
where
    W: NavWorldView,
{
    fn tick(
        &mut self,
        ctx: &TickContext,
        agent: W::Agent,
        world: &W,
        blackboard: &mut Blackboard,
        commands: &mut Commands,
    ) -> Result<ActionStatus, BlackboardError> {
        let origin = match self.origin {
            Some(origin) => origin,
            None => {
                let origin = blackboard.require(PLAYER_LAST_KNOWN)?;
                self.origin = Some(origin);
                self.goal = origin;
                origin
            }
        };

        match self.leg.step(agent, world, self.goal, commands) {
            ActionStatus::Success if self.visited >= self.probes => {
                self.reset();
                Ok(ActionStatus::Success)
            }
            ActionStatus::Success => {
                self.goal = self.pick_probe(ctx, agent, world, origin);
                self.visited += 1;
                Ok(ActionStatus::Running)
            }
            ActionStatus::Failure => {
                self.reset();
                Ok(ActionStatus::Failure)
            }
            ActionStatus::Running => Ok(ActionStatus::Running),
        }
    }

    fn cancel(
        &mut self,
        _ctx: &TickContext,
        _agent: W::Agent,
        _world: &W,
        _blackboard: &mut Blackboard,
        commands: &mut Commands,
    ) {
        self.reset();
        commands.push(Command::Stop);
    }
}
