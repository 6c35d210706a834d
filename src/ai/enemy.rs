use crate::config::EnemyConfig;
use crate::hack::{
    ActionContext, HackField, Hackable, HackableId, QuickAction, QuickActionSet, ScanMark,
    TickContext, WheelDir, WorldCommand,
};
use crate::services::NavAgent;
use bevy::math::Vec3;
use std::fmt;

const MIN_ARRIVE_TOLERANCE: f32 = 0.25;
const REBEL_SPEED_FACTOR: f32 = 0.8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EnemyState {
    Patrol,
    Chase,
    Stunned,
    Frozen,
    Rebel,
    Dead,
}

impl EnemyState {
    pub const NAMES: [&'static str; 6] = ["Patrol", "Chase", "Stunned", "Frozen", "Rebel", "Dead"];

    pub fn name(self) -> &'static str {
        match self {
            EnemyState::Patrol => "Patrol",
            EnemyState::Chase => "Chase",
            EnemyState::Stunned => "Stunned",
            EnemyState::Frozen => "Frozen",
            EnemyState::Rebel => "Rebel",
            EnemyState::Dead => "Dead",
        }
    }
}

impl fmt::Display for EnemyState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Guard that patrols waypoints, chases the player on sight and can be
/// hacked into stunned, frozen, rebellious or exploded states
#[derive(Debug)]
pub struct EnemyAi {
    name: String,
    config: EnemyConfig,
    agent: Box<dyn NavAgent>,
    waypoints: Vec<Vec3>,
    patrol_index: usize,
    state: EnemyState,
    state_timer: f32,
    /// Scaled seconds since the player was last in the sight cone
    since_seen: f32,
    scan: ScanMark,
}

impl EnemyAi {
    pub fn new(config: EnemyConfig, agent: Box<dyn NavAgent>, waypoints: Vec<Vec3>) -> Self {
        EnemyAi {
            name: "Enemy".to_string(),
            config,
            agent,
            waypoints,
            patrol_index: 0,
            state: EnemyState::Patrol,
            state_timer: 0.0,
            since_seen: 0.0,
            scan: ScanMark::new(3, 0.04),
        }
    }

    pub fn with_name(mut self, name: &str) -> Self {
        self.name = name.to_string();
        self
    }

    pub fn state(&self) -> EnemyState {
        self.state
    }

    pub fn state_timer(&self) -> f32 {
        self.state_timer
    }

    pub fn is_dead(&self) -> bool {
        self.state == EnemyState::Dead
    }

    pub fn patrol_index(&self) -> usize {
        self.patrol_index
    }

    pub fn agent(&self) -> &dyn NavAgent {
        self.agent.as_ref()
    }

    /// Stun from an external blast; the dead stay dead
    pub fn force_stun(&mut self, duration: f32) {
        if self.is_dead() {
            return;
        }
        self.enter(EnemyState::Stunned, duration);
    }

    /// True if the player stands inside the view cone
    pub fn can_see(&self, player: Vec3) -> bool {
        let to_player = player - self.position();
        if to_player.length() > self.config.view_radius {
            return false;
        }
        let Some(dir) = to_player.try_normalize() else {
            return true;
        };
        let cos = self.agent.forward().dot(dir).clamp(-1.0, 1.0);
        cos.acos().to_degrees() <= self.config.view_angle * 0.5
    }

    fn enter(&mut self, state: EnemyState, timer: f32) {
        if self.state != state {
            log::debug!("{}: {} -> {}", self.name, self.state, state);
        }
        self.state = state;
        self.state_timer = timer;
        if matches!(state, EnemyState::Stunned | EnemyState::Frozen | EnemyState::Dead) {
            self.agent.stop();
        }
    }

    fn go_to(&mut self, target: Vec3, speed: f32) {
        self.agent.set_speed(speed);
        if !self.agent.set_destination(target) {
            self.agent.stop();
        }
    }

    fn tick_patrol(&mut self) {
        if !self.config.patrol_enabled || self.waypoints.is_empty() {
            self.agent.stop();
            return;
        }
        let target = self.waypoints[self.patrol_index % self.waypoints.len()];
        self.go_to(target, self.config.patrol_speed);

        let tolerance = self.agent.stopping_distance().max(MIN_ARRIVE_TOLERANCE);
        let arrived = self
            .agent
            .remaining_distance()
            .is_some_and(|d| d <= tolerance);
        if arrived {
            self.patrol_index = (self.patrol_index + 1) % self.waypoints.len();
        }
    }

    fn tick_chase(&mut self, player: Option<Vec3>, dt: f32) {
        let Some(player) = player else {
            self.enter(EnemyState::Patrol, 0.0);
            return;
        };
        self.go_to(player, self.config.chase_speed);
        self.since_seen += dt;
        if self.since_seen > self.config.lose_sight_time {
            self.enter(EnemyState::Patrol, 0.0);
        }
    }

    /// Walk toward the closest other enemy that is still standing
    fn tick_rebel(&mut self, enemies: &[(HackableId, Vec3)], self_id: HackableId) {
        let position = self.position();
        let nearest = enemies
            .iter()
            .filter(|(id, _)| *id != self_id)
            .map(|(_, p)| *p)
            .min_by(|a, b| a.distance(position).total_cmp(&b.distance(position)));
        match nearest {
            Some(target) => self.go_to(target, self.config.chase_speed * REBEL_SPEED_FACTOR),
            None => self.agent.stop(),
        }
    }

    fn look_for_player(&mut self, player: Option<Vec3>) {
        if let Some(player) = player {
            if self.can_see(player) {
                self.since_seen = 0.0;
                if self.state != EnemyState::Chase {
                    self.enter(EnemyState::Chase, 0.0);
                }
            }
        }
    }

    /// Count down a timed state, returning true once it has expired
    fn count_down(&mut self, dt: f32) -> bool {
        self.state_timer -= dt;
        if self.state_timer <= 0.0 {
            self.enter(EnemyState::Patrol, 0.0);
            return true;
        }
        false
    }
}

impl Hackable for EnemyAi {
    fn display_name(&self) -> &str {
        &self.name
    }

    fn position(&self) -> Vec3 {
        self.agent.position()
    }

    fn bounds_radius(&self) -> f32 {
        0.9
    }

    fn fields(&self) -> Vec<HackField> {
        let alert = if self.state == EnemyState::Chase {
            "HIGH"
        } else {
            "LOW"
        };
        vec![
            HackField::choice("state", "Enemy.State", self.state.name(), &EnemyState::NAMES),
            HackField::choice("alert", "Enemy.Alert", alert, &["LOW", "HIGH"]),
        ]
    }

    fn scan_mark(&self) -> &ScanMark {
        &self.scan
    }

    fn scan_mark_mut(&mut self) -> &mut ScanMark {
        &mut self.scan
    }

    fn quick_actions(&self) -> QuickActionSet {
        if self.is_dead() {
            return QuickActionSet::new();
        }
        QuickActionSet::new()
            .with(WheelDir::Up, QuickAction::instant("Enemy_Stun", "Stun"))
            .with(WheelDir::Right, QuickAction::instant("Enemy_Freeze", "Freeze"))
            .with(WheelDir::Down, QuickAction::instant("Enemy_Rebel", "Rebel"))
            .with(
                WheelDir::Left,
                QuickAction::charged("Enemy_Overload", "Overload", self.config.overload_charge),
            )
    }

    fn execute(&mut self, action_id: &str, ctx: &mut ActionContext) -> bool {
        match action_id {
            "Enemy_Stun" => self.enter(EnemyState::Stunned, self.config.stun_duration),
            "Enemy_Freeze" => self.enter(EnemyState::Frozen, self.config.freeze_duration),
            "Enemy_Rebel" => self.enter(EnemyState::Rebel, self.config.rebel_duration),
            "Enemy_Overload" => {
                if self.is_dead() {
                    return true;
                }
                self.enter(EnemyState::Dead, 0.0);
                log::info!("{} overloaded", self.name);
                ctx.push(WorldCommand::Deactivate(ctx.self_id));
                ctx.push(WorldCommand::StunEnemiesAround {
                    source: ctx.self_id,
                    origin: self.position(),
                    radius: self.config.explosion_radius,
                    duration: self.config.stun_duration,
                });
            }
            _ => return false,
        }
        true
    }

    fn tick(&mut self, ctx: &mut TickContext) {
        self.scan.tick(ctx.time.unscaled);
        let dt = ctx.time.scaled;

        match self.state {
            EnemyState::Dead => return,
            EnemyState::Patrol => {
                self.tick_patrol();
                self.look_for_player(ctx.player_position);
            }
            EnemyState::Chase => {
                self.tick_chase(ctx.player_position, dt);
                if self.state == EnemyState::Chase {
                    self.look_for_player(ctx.player_position);
                }
            }
            EnemyState::Stunned | EnemyState::Frozen => {
                self.agent.stop();
                self.count_down(dt);
            }
            EnemyState::Rebel => {
                if !self.count_down(dt) {
                    self.tick_rebel(ctx.enemies, ctx.self_id);
                }
            }
        }

        self.agent.step(dt);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::FrameTime;
    use crate::services::SimpleAgent;

    const SELF_ID: HackableId = HackableId::new(0, 0);

    fn enemy(position: Vec3, forward: Vec3, waypoints: Vec<Vec3>) -> EnemyAi {
        EnemyAi::new(
            EnemyConfig::default(),
            Box::new(SimpleAgent::new(position).with_forward(forward)),
            waypoints,
        )
    }

    fn tick_with(
        enemy: &mut EnemyAi,
        dt: f32,
        player: Option<Vec3>,
        others: &[(HackableId, Vec3)],
    ) -> Vec<WorldCommand> {
        let mut ctx = TickContext {
            self_id: SELF_ID,
            time: FrameTime::uniform(dt, 0.0),
            player_position: player,
            enemies: others,
            commands: Vec::new(),
        };
        enemy.tick(&mut ctx);
        ctx.commands
    }

    fn tick(enemy: &mut EnemyAi, dt: f32) {
        tick_with(enemy, dt, None, &[]);
    }

    fn run(enemy: &mut EnemyAi, action: &str) -> Vec<WorldCommand> {
        let mut ctx = ActionContext::new(SELF_ID);
        assert!(enemy.execute(action, &mut ctx));
        ctx.commands
    }

    #[test]
    fn test_patrol_cycles_waypoints() {
        let points = vec![Vec3::new(2.0, 0.0, 0.0), Vec3::new(2.0, 0.0, 2.0)];
        let mut guard = enemy(Vec3::ZERO, Vec3::X, points);

        // Speed 2, one second reaches the first point
        tick(&mut guard, 1.0);
        assert_eq!(guard.position(), Vec3::new(2.0, 0.0, 0.0));
        tick(&mut guard, 0.1);
        assert_eq!(guard.patrol_index(), 1);

        tick(&mut guard, 1.0);
        tick(&mut guard, 0.1);
        assert_eq!(guard.position(), Vec3::new(2.0, 0.0, 2.0));
        assert_eq!(guard.patrol_index(), 0);
    }

    #[test]
    fn test_single_waypoint_holds_position() {
        let point = Vec3::new(1.0, 0.0, 0.0);
        let mut guard = enemy(Vec3::ZERO, Vec3::X, vec![point]);
        for _ in 0..10 {
            tick(&mut guard, 0.5);
        }
        assert_eq!(guard.position(), point);
        assert_eq!(guard.patrol_index(), 0);
    }

    #[test]
    fn test_sight_cone() {
        let guard = enemy(Vec3::ZERO, Vec3::NEG_Z, Vec::new());
        assert!(guard.can_see(Vec3::new(0.0, 0.0, -5.0)));
        // 45 degrees off is outside a 60 degree cone
        assert!(!guard.can_see(Vec3::new(5.0, 0.0, -5.0)));
        assert!(!guard.can_see(Vec3::new(0.0, 0.0, 5.0)));
        assert!(!guard.can_see(Vec3::new(0.0, 0.0, -11.0)));
    }

    #[test]
    fn test_chase_then_lose_sight() {
        let mut guard = enemy(Vec3::ZERO, Vec3::NEG_Z, Vec::new());
        tick_with(&mut guard, 0.1, Some(Vec3::new(0.0, 0.0, -5.0)), &[]);
        assert_eq!(guard.state(), EnemyState::Chase);

        // Player ducks behind; two seconds of chasing the last position
        let hidden = Vec3::new(0.0, 0.0, 30.0);
        for _ in 0..4 {
            tick_with(&mut guard, 0.5, Some(hidden), &[]);
            assert_eq!(guard.state(), EnemyState::Chase);
        }
        tick_with(&mut guard, 0.5, Some(hidden), &[]);
        assert_eq!(guard.state(), EnemyState::Patrol);
    }

    #[test]
    fn test_stun_and_freeze_expire() {
        let mut guard = enemy(Vec3::ZERO, Vec3::X, Vec::new());
        run(&mut guard, "Enemy_Stun");
        assert_eq!(guard.state(), EnemyState::Stunned);
        assert_eq!(guard.state_timer(), 2.0);
        tick(&mut guard, 1.5);
        assert_eq!(guard.state(), EnemyState::Stunned);
        tick(&mut guard, 0.5);
        assert_eq!(guard.state(), EnemyState::Patrol);

        run(&mut guard, "Enemy_Freeze");
        tick(&mut guard, 4.5);
        assert_eq!(guard.state(), EnemyState::Frozen);
        tick(&mut guard, 0.5);
        assert_eq!(guard.state(), EnemyState::Patrol);
    }

    #[test]
    fn test_rebel_follows_nearest_ally() {
        let mut guard = enemy(Vec3::ZERO, Vec3::X, Vec::new());
        run(&mut guard, "Enemy_Rebel");

        let others = [
            (HackableId::new(1, 0), Vec3::new(10.0, 0.0, 0.0)),
            (HackableId::new(2, 0), Vec3::new(0.0, 0.0, 4.0)),
        ];
        tick_with(&mut guard, 0.5, None, &others);
        assert_eq!(guard.state(), EnemyState::Rebel);
        // 4 * 0.8 speed toward the closer one
        assert!((guard.position() - Vec3::new(0.0, 0.0, 1.6)).length() < 1e-4);

        tick_with(&mut guard, 6.0, None, &others);
        assert_eq!(guard.state(), EnemyState::Patrol);
    }

    #[test]
    fn test_overload_is_terminal() {
        let mut guard = enemy(Vec3::new(1.0, 0.0, 0.0), Vec3::X, Vec::new());
        let commands = run(&mut guard, "Enemy_Overload");
        assert_eq!(
            commands,
            vec![
                WorldCommand::Deactivate(SELF_ID),
                WorldCommand::StunEnemiesAround {
                    source: SELF_ID,
                    origin: Vec3::new(1.0, 0.0, 0.0),
                    radius: 3.0,
                    duration: 2.0,
                },
            ]
        );
        assert!(guard.is_dead());
        assert!(guard.quick_actions().is_empty());

        guard.force_stun(2.0);
        tick_with(&mut guard, 1.0, Some(Vec3::new(1.0, 0.0, -2.0)), &[]);
        assert_eq!(guard.state(), EnemyState::Dead);
    }

    #[test]
    fn test_alert_field_follows_chase() {
        let mut guard = enemy(Vec3::ZERO, Vec3::NEG_Z, Vec::new());
        let alert = |g: &EnemyAi| g.fields()[1].as_choice().map(str::to_string);
        assert_eq!(alert(&guard).as_deref(), Some("LOW"));
        tick_with(&mut guard, 0.1, Some(Vec3::new(0.0, 0.0, -3.0)), &[]);
        assert_eq!(alert(&guard).as_deref(), Some("HIGH"));
        assert_eq!(guard.fields()[0].as_choice(), Some("Chase"));
    }
}
