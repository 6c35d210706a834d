use crate::ai::EnemyAi;
use crate::config::EnemyConfig;
use crate::hack::{HackableEntity, HackableId, HackableWorld};
use crate::objects::{ChargeNode, Door, HackBox, Laser, PracticeNode};
use crate::services::SimpleAgent;
use bevy::math::Vec3;

/// Floor area the guards may walk on
const GUARD_FLOOR: (Vec3, Vec3) = (Vec3::new(-10.0, 0.0, -2.0), Vec3::new(10.0, 0.0, 18.0));

/// Handles to the hackables of the test level
#[derive(Debug, Clone)]
pub struct DemoLevel {
    pub practice: HackableId,
    pub hack_box: HackableId,
    pub laser: HackableId,
    pub charge_node: HackableId,
    pub security_door: HackableId,
    pub guards: Vec<HackableId>,
    /// Opens when the player wins the mirror race
    pub exit_door: HackableId,
}

impl DemoLevel {
    /// Courtyard of hackables leading north into the tunnel
    pub fn spawn(world: &mut HackableWorld, enemy: &EnemyConfig) -> Self {
        let practice = world.spawn(HackableEntity::Practice(PracticeNode::new(
            "Practice Node",
            Vec3::new(-3.0, 0.5, 4.0),
            Some(Vec3::new(-3.0, 0.5, 6.5)),
        )));
        let hack_box = world.spawn(HackableEntity::Box(HackBox::new(Vec3::new(3.0, 0.5, 5.0))));
        let laser = world.spawn(HackableEntity::Laser(Laser::new(Vec3::new(0.0, 1.0, 10.0))));
        let charge_node = world.spawn(HackableEntity::ChargeNode(ChargeNode::new(
            "Charge Node",
            Vec3::new(-5.0, 1.0, 12.0),
        )));
        let security_door = world.spawn(HackableEntity::Door(Door::new(
            "Security Door",
            Vec3::new(0.0, 1.5, 17.0),
        )));

        let routes = [
            ("Guard A", [Vec3::new(-6.0, 0.0, 8.0), Vec3::new(6.0, 0.0, 8.0)]),
            ("Guard B", [Vec3::new(6.0, 0.0, 14.0), Vec3::new(-6.0, 0.0, 14.0)]),
        ];
        let guards = routes
            .into_iter()
            .map(|(name, route)| {
                let agent = SimpleAgent::new(route[0])
                    .with_walkable(GUARD_FLOOR.0, GUARD_FLOOR.1)
                    .with_stopping_distance(0.1);
                let ai = EnemyAi::new(enemy.clone(), Box::new(agent), route.to_vec());
                world.spawn(HackableEntity::Enemy(ai.with_name(name)))
            })
            .collect();

        let exit_door = world.spawn(HackableEntity::Door(Door::new(
            "Tunnel Exit",
            Vec3::new(0.0, 1.5, 39.0),
        )));

        log::info!("Spawned demo level with {} hackables", world.len());
        DemoLevel {
            practice,
            hack_box,
            laser,
            charge_node,
            security_door,
            guards,
            exit_door,
        }
    }
}
