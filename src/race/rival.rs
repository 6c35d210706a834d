use super::BoardLayout;
use crate::config::RivalConfig;
use crate::services::NavAgent;
use crate::wire::{NodeId, PowerTransition, WireGraph};
use bevy::math::Vec3;
use rand::Rng;

/// Where the rival is in its solve loop
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RivalPhase {
    Stopped,
    /// Picking the next misaligned node
    Seeking,
    /// Nothing to fix, look again after a pause
    Idle { remaining: f32 },
    Walking { node: NodeId, elapsed: f32 },
    Decrypting { node: NodeId, remaining: f32 },
    /// Rotating one step per interval until the node is correct
    Rotating { node: NodeId, cooldown: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RivalAction {
    /// Turned a node on its own board
    Rotated { node: NodeId, transition: PowerTransition },
    /// Scrambled a node on the player's board
    Sabotaged { node: NodeId, transition: PowerTransition },
}

/// Mirror opponent: walks its board fixing nodes one at a time and
/// periodically scrambles the player's board
#[derive(Debug)]
pub struct RivalAi {
    config: RivalConfig,
    agent: Box<dyn NavAgent>,
    phase: RivalPhase,
    sabotage_timer: f32,
}

impl RivalAi {
    pub fn new(config: RivalConfig, agent: Box<dyn NavAgent>) -> Self {
        RivalAi {
            config,
            agent,
            phase: RivalPhase::Stopped,
            sabotage_timer: 0.0,
        }
    }

    pub fn phase(&self) -> RivalPhase {
        self.phase
    }

    pub fn is_active(&self) -> bool {
        self.phase != RivalPhase::Stopped
    }

    pub fn position(&self) -> Vec3 {
        self.agent.position()
    }

    pub fn forward(&self) -> Vec3 {
        self.agent.forward()
    }

    pub fn sabotage_timer(&self) -> f32 {
        self.sabotage_timer
    }

    /// Restart the routine from scratch
    pub fn start(&mut self) {
        self.agent.set_speed(self.config.move_speed);
        self.sabotage_timer = self.config.sabotage_interval;
        self.phase = RivalPhase::Seeking;
    }

    pub fn stop(&mut self) {
        self.phase = RivalPhase::Stopped;
        self.agent.stop();
    }

    pub fn update(
        &mut self,
        dt: f32,
        own: &mut WireGraph,
        layout: &BoardLayout,
        player_board: &mut WireGraph,
        rng: &mut impl Rng,
    ) -> Vec<RivalAction> {
        let mut actions = Vec::new();
        if !self.is_active() {
            return actions;
        }

        self.sabotage_timer -= dt;
        if self.sabotage_timer <= 0.0 {
            if let Some((node, transition)) = player_board.scramble_one(rng) {
                log::info!("Rival scrambled player node {}", node);
                actions.push(RivalAction::Sabotaged { node, transition });
            }
            let jitter = self.config.sabotage_jitter;
            self.sabotage_timer =
                self.config.sabotage_interval + rng.random_range(-jitter..=jitter);
        }

        self.phase = match self.phase {
            RivalPhase::Stopped => RivalPhase::Stopped,
            RivalPhase::Seeking => self.seek(own, layout),
            RivalPhase::Idle { remaining } => {
                let remaining = remaining - dt;
                if remaining <= 0.0 {
                    RivalPhase::Seeking
                } else {
                    RivalPhase::Idle { remaining }
                }
            }
            RivalPhase::Walking { node, elapsed } => self.walk(node, elapsed + dt, own, layout),
            RivalPhase::Decrypting { node, remaining } => {
                let remaining = remaining - dt;
                if remaining <= 0.0 {
                    RivalPhase::Rotating {
                        node,
                        cooldown: 0.0,
                    }
                } else {
                    RivalPhase::Decrypting { node, remaining }
                }
            }
            RivalPhase::Rotating { node, cooldown } => {
                self.rotate(node, cooldown - dt, own, &mut actions)
            }
        };

        self.agent.step(dt);
        actions
    }

    fn seek(&mut self, own: &WireGraph, layout: &BoardLayout) -> RivalPhase {
        let Some(node) = own.first_misaligned() else {
            return RivalPhase::Idle {
                remaining: self.config.idle_delay,
            };
        };
        if let Some(target) = own.node(node).map(|n| layout.world_position(n.grid)) {
            self.agent.set_speed(self.config.move_speed);
            if !self.agent.set_destination(target) {
                self.agent.stop();
            }
        }
        RivalPhase::Walking { node, elapsed: 0.0 }
    }

    fn walk(
        &mut self,
        node: NodeId,
        elapsed: f32,
        own: &WireGraph,
        layout: &BoardLayout,
    ) -> RivalPhase {
        let Some(target) = own.node(node).map(|n| layout.world_position(n.grid)) else {
            return RivalPhase::Seeking;
        };
        let here = self.agent.position();
        let flat = Vec3::new(here.x - target.x, 0.0, here.z - target.z).length();
        if flat > self.config.arrive_distance && elapsed < self.config.walk_timeout {
            return RivalPhase::Walking { node, elapsed };
        }
        self.agent.stop();
        RivalPhase::Decrypting {
            node,
            remaining: self.config.node_rotate_delay,
        }
    }

    fn rotate(
        &mut self,
        node: NodeId,
        cooldown: f32,
        own: &mut WireGraph,
        actions: &mut Vec<RivalAction>,
    ) -> RivalPhase {
        if cooldown > 0.0 {
            return RivalPhase::Rotating { node, cooldown };
        }
        let correct = own.node(node).is_none_or(|n| n.is_correct());
        if correct {
            return RivalPhase::Seeking;
        }
        if let Some(transition) = own.rotate_node(node) {
            actions.push(RivalAction::Rotated { node, transition });
        }
        RivalPhase::Rotating {
            node,
            cooldown: self.config.rotate_interval,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::SimpleAgent;
    use crate::wire::{BoardLibrary, BoardSide};
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn boards() -> (WireGraph, WireGraph) {
        let library = BoardLibrary::load().unwrap();
        let board = library.get("tunnel_mirror").unwrap();
        (
            board.build(BoardSide::Rival).unwrap(),
            board.build(BoardSide::Player).unwrap(),
        )
    }

    fn layout() -> BoardLayout {
        BoardLayout::new(Vec3::new(6.0, 0.0, 30.0), 1.5)
    }

    fn rival() -> RivalAi {
        RivalAi::new(
            RivalConfig::default(),
            Box::new(SimpleAgent::new(Vec3::new(8.0, 0.0, 26.0))),
        )
    }

    #[test]
    fn test_stopped_rival_does_nothing() {
        let (mut own, mut player) = boards();
        let mut rng = StdRng::seed_from_u64(1);
        let mut ai = rival();
        for _ in 0..100 {
            assert!(ai.update(0.5, &mut own, &layout(), &mut player, &mut rng).is_empty());
        }
        assert!(!own.is_solved());
    }

    #[test]
    fn test_rival_solves_its_board() {
        let (mut own, mut player) = boards();
        own.evaluate_power();
        let mut rng = StdRng::seed_from_u64(1);
        let mut ai = rival();
        ai.start();

        let mut solved_at = None;
        for frame in 0..600 {
            for action in ai.update(0.05, &mut own, &layout(), &mut player, &mut rng) {
                if let RivalAction::Rotated {
                    transition: PowerTransition::BecameSolved,
                    ..
                } = action
                {
                    solved_at = Some(frame);
                }
            }
        }
        assert!(solved_at.is_some());
        assert!(own.is_solved());
        assert!(own.first_misaligned().is_none());
        assert!(matches!(ai.phase(), RivalPhase::Idle { .. } | RivalPhase::Seeking));
    }

    #[test]
    fn test_sabotage_changes_one_player_node() {
        let (mut own, mut player) = boards();
        let before: Vec<u8> = player.nodes().map(|(_, n)| n.rotation()).collect();
        let mut rng = StdRng::seed_from_u64(9);
        let mut ai = rival();
        ai.start();

        let mut sabotaged = Vec::new();
        for _ in 0..15 {
            for action in ai.update(1.0, &mut own, &layout(), &mut player, &mut rng) {
                if let RivalAction::Sabotaged { node, .. } = action {
                    sabotaged.push(node);
                }
            }
        }
        assert_eq!(sabotaged.len(), 1);

        let after: Vec<u8> = player.nodes().map(|(_, n)| n.rotation()).collect();
        let changed: Vec<usize> = (0..before.len()).filter(|&i| before[i] != after[i]).collect();
        assert_eq!(changed, vec![sabotaged[0].index()]);
        // Next one lands 13 to 17 seconds later
        assert!(ai.sabotage_timer() >= 13.0 && ai.sabotage_timer() <= 17.0);
    }

    #[test]
    fn test_walk_times_out_when_unreachable() {
        let (mut own, mut player) = boards();
        let mut rng = StdRng::seed_from_u64(3);
        // Confined far away from the board
        let agent = SimpleAgent::new(Vec3::new(50.0, 0.0, 0.0))
            .with_walkable(Vec3::new(45.0, -1.0, -5.0), Vec3::new(55.0, 1.0, 5.0));
        let mut ai = RivalAi::new(RivalConfig::default(), Box::new(agent));
        ai.start();

        ai.update(0.1, &mut own, &layout(), &mut player, &mut rng);
        assert!(matches!(ai.phase(), RivalPhase::Walking { .. }));
        for _ in 0..79 {
            ai.update(0.1, &mut own, &layout(), &mut player, &mut rng);
        }
        assert!(matches!(ai.phase(), RivalPhase::Walking { .. }));
        ai.update(0.2, &mut own, &layout(), &mut player, &mut rng);
        assert!(matches!(ai.phase(), RivalPhase::Decrypting { .. }));
    }
}
