use crate::ai::EnemyState;
use crate::hack::{HackableEntity, HackableId};
use crate::objects::LaserMode;
use crate::wire::{BoardSide, NodeId, NodeType, WireNode};
use bevy::prelude::*;

#[derive(Component)]
pub struct PlayerAvatar;

#[derive(Component)]
pub struct RivalAvatar;

#[derive(Component)]
pub struct GhostAvatar;

/// Expanding ring shown during the scan intro
#[derive(Component)]
pub struct ScanRing;

#[derive(Component)]
pub struct SceneLight;

/// Mesh standing in for one hackable
#[derive(Component, Debug)]
pub struct HackableVisual {
    pub id: HackableId,
    /// Height of the mesh origin above the entity's position
    pub lift: f32,
}

/// One wire tile; the arms are children sharing `material`
#[derive(Component, Debug)]
pub struct WireNodeVisual {
    pub side: BoardSide,
    pub node: NodeId,
    pub material: Handle<StandardMaterial>,
    /// Eased display scale
    pub scale: f32,
    /// Decaying scale kick from the last power gain
    pub kick: f32,
    pub last_incoming: u32,
}

impl WireNodeVisual {
    pub fn new(side: BoardSide, node: NodeId, material: Handle<StandardMaterial>) -> Self {
        WireNodeVisual {
            side,
            node,
            material,
            scale: 0.0,
            kick: 0.0,
            last_incoming: 0,
        }
    }
}

/// Linear RGBA for a hackable in its current state
pub fn hackable_color(entity: &HackableEntity) -> Vec4 {
    match entity {
        HackableEntity::Box(_) => Vec4::new(0.85, 0.45, 0.12, 1.0),
        HackableEntity::Door(door) if door.is_locked() => Vec4::new(0.6, 0.12, 0.1, 1.0),
        HackableEntity::Door(_) => Vec4::new(0.3, 0.4, 0.55, 1.0),
        HackableEntity::Laser(laser) => match laser.mode() {
            LaserMode::Normal => Vec4::new(1.0, 0.05, 0.05, 1.0),
            LaserMode::LowDamage => Vec4::new(1.0, 0.6, 0.1, 1.0),
            LaserMode::Disabled => Vec4::new(0.2, 0.05, 0.05, 0.2),
        },
        HackableEntity::ChargeNode(node) => {
            let glow = node.glow().clamp(0.0, 1.0);
            Vec4::new(0.1, 0.3, 0.35, 1.0).lerp(Vec4::new(0.3, 1.0, 1.0, 1.0), glow)
        }
        HackableEntity::Enemy(enemy) => match enemy.state() {
            EnemyState::Patrol => Vec4::new(0.45, 0.45, 0.5, 1.0),
            EnemyState::Chase => Vec4::new(0.9, 0.1, 0.1, 1.0),
            EnemyState::Stunned => Vec4::new(0.95, 0.85, 0.2, 1.0),
            EnemyState::Frozen => Vec4::new(0.55, 0.8, 1.0, 1.0),
            EnemyState::Rebel => Vec4::new(0.6, 0.2, 0.85, 1.0),
            EnemyState::Dead => Vec4::new(0.05, 0.05, 0.05, 1.0),
        },
        HackableEntity::Practice(node) => Vec4::new(0.2, 0.9, 0.4, node.body().alpha),
    }
}

/// Blend toward white for scan blinks and aiming, keeping alpha
pub fn highlight(base: Vec4, lit: bool, aimed: bool, targeted: bool) -> Vec4 {
    let amount = if lit {
        1.0
    } else if targeted {
        0.6
    } else if aimed {
        0.35
    } else {
        0.0
    };
    let white = Vec4::new(1.0, 1.0, 1.0, base.w);
    base.lerp(white, amount)
}

pub fn wire_color(node: &WireNode) -> Vec4 {
    if node.hovered {
        Vec4::new(1.0, 0.85, 0.2, 1.0)
    } else if node.powered {
        Vec4::new(0.1, 0.9, 1.0, 1.0)
    } else if matches!(node.node_type, NodeType::Start | NodeType::End) {
        Vec4::new(0.8, 0.8, 0.85, 1.0)
    } else {
        Vec4::new(0.25, 0.25, 0.3, 1.0)
    }
}

pub fn to_color(v: Vec4) -> Color {
    Color::linear_rgba(v.x, v.y, v.z, v.w)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::objects::Door;
    use crate::wire::GridPos;

    #[test]
    fn test_highlight_strength_order() {
        let base = Vec4::new(0.2, 0.2, 0.2, 0.5);
        let aimed = highlight(base, false, true, false);
        let targeted = highlight(base, false, true, true);
        let lit = highlight(base, true, false, false);
        assert_eq!(highlight(base, false, false, false), base);
        assert!(aimed.x > base.x && targeted.x > aimed.x && lit.x > targeted.x);
        assert_eq!(lit.w, 0.5);
    }

    #[test]
    fn test_locked_door_reads_red() {
        let door = HackableEntity::Door(Door::new("Door", Vec3::ZERO));
        let color = hackable_color(&door);
        assert!(color.x > color.z);
    }

    #[test]
    fn test_hover_wins_over_power() {
        let mut node = WireNode::new(NodeType::Straight, GridPos::new(0, 0), 0, 0, true);
        node.powered = true;
        let powered = wire_color(&node);
        node.hovered = true;
        assert_ne!(wire_color(&node), powered);
    }
}
