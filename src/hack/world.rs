use super::entity::{ActionContext, Hackable, QuickActionSet, TickContext, WorldCommand};
use crate::ai::EnemyAi;
use crate::clock::FrameTime;
use crate::objects::{ChargeNode, Door, HackBox, Laser, PracticeNode};
use bevy::math::Vec3;
use std::fmt;

/// Generational handle into a `HackableWorld`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct HackableId {
    index: u32,
    generation: u32,
}

impl HackableId {
    pub const fn new(index: u32, generation: u32) -> Self {
        HackableId { index, generation }
    }

    pub const fn index(&self) -> u32 {
        self.index
    }

    pub const fn generation(&self) -> u32 {
        self.generation
    }
}

impl fmt::Display for HackableId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExecuteError {
    TargetGone(HackableId),
    Inactive(HackableId),
    ActionUnavailable { target: HackableId, action_id: String },
}

impl fmt::Display for ExecuteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExecuteError::TargetGone(id) => write!(f, "Target {} no longer exists", id),
            ExecuteError::Inactive(id) => write!(f, "Target {} is inactive", id),
            ExecuteError::ActionUnavailable { target, action_id } => {
                write!(f, "Target {} does not offer '{}'", target, action_id)
            }
        }
    }
}

impl std::error::Error for ExecuteError {}

/// Every kind of hackable the game knows about
#[derive(Debug)]
pub enum HackableEntity {
    Box(HackBox),
    Door(Door),
    Laser(Laser),
    ChargeNode(ChargeNode),
    Enemy(EnemyAi),
    Practice(PracticeNode),
}

impl HackableEntity {
    pub fn as_hackable(&self) -> &dyn Hackable {
        match self {
            HackableEntity::Box(e) => e,
            HackableEntity::Door(e) => e,
            HackableEntity::Laser(e) => e,
            HackableEntity::ChargeNode(e) => e,
            HackableEntity::Enemy(e) => e,
            HackableEntity::Practice(e) => e,
        }
    }

    pub fn as_hackable_mut(&mut self) -> &mut dyn Hackable {
        match self {
            HackableEntity::Box(e) => e,
            HackableEntity::Door(e) => e,
            HackableEntity::Laser(e) => e,
            HackableEntity::ChargeNode(e) => e,
            HackableEntity::Enemy(e) => e,
            HackableEntity::Practice(e) => e,
        }
    }

    pub fn as_enemy(&self) -> Option<&EnemyAi> {
        match self {
            HackableEntity::Enemy(e) => Some(e),
            _ => None,
        }
    }

    pub fn as_enemy_mut(&mut self) -> Option<&mut EnemyAi> {
        match self {
            HackableEntity::Enemy(e) => Some(e),
            _ => None,
        }
    }
}

#[derive(Debug)]
struct Entry {
    entity: HackableEntity,
    active: bool,
}

#[derive(Debug, Default)]
struct Slot {
    generation: u32,
    entry: Option<Entry>,
}

/// Arena owning all hackables. Stale ids resolve to nothing.
#[derive(Debug, Default)]
pub struct HackableWorld {
    slots: Vec<Slot>,
    free: Vec<u32>,
}

impl HackableWorld {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn spawn(&mut self, entity: HackableEntity) -> HackableId {
        let entry = Some(Entry {
            entity,
            active: true,
        });
        if let Some(index) = self.free.pop() {
            let slot = &mut self.slots[index as usize];
            slot.entry = entry;
            HackableId::new(index, slot.generation)
        } else {
            self.slots.push(Slot {
                generation: 0,
                entry,
            });
            HackableId::new(self.slots.len() as u32 - 1, 0)
        }
    }

    pub fn despawn(&mut self, id: HackableId) -> Option<HackableEntity> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        let entry = slot.entry.take()?;
        slot.generation += 1;
        self.free.push(id.index);
        Some(entry.entity)
    }

    fn entry(&self, id: HackableId) -> Option<&Entry> {
        let slot = self.slots.get(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.entry.as_ref()
    }

    fn entry_mut(&mut self, id: HackableId) -> Option<&mut Entry> {
        let slot = self.slots.get_mut(id.index as usize)?;
        if slot.generation != id.generation {
            return None;
        }
        slot.entry.as_mut()
    }

    pub fn contains(&self, id: HackableId) -> bool {
        self.entry(id).is_some()
    }

    /// Present and not deactivated
    pub fn is_live(&self, id: HackableId) -> bool {
        self.entry(id).is_some_and(|e| e.active)
    }

    pub fn set_active(&mut self, id: HackableId, active: bool) {
        if let Some(entry) = self.entry_mut(id) {
            entry.active = active;
        }
    }

    pub fn get(&self, id: HackableId) -> Option<&HackableEntity> {
        self.entry(id).map(|e| &e.entity)
    }

    pub fn get_mut(&mut self, id: HackableId) -> Option<&mut HackableEntity> {
        self.entry_mut(id).map(|e| &mut e.entity)
    }

    pub fn len(&self) -> usize {
        self.slots.iter().filter(|s| s.entry.is_some()).count()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// All entities with their active flag
    pub fn iter(&self) -> impl Iterator<Item = (HackableId, &HackableEntity, bool)> {
        self.slots.iter().enumerate().filter_map(|(i, slot)| {
            slot.entry
                .as_ref()
                .map(|e| (HackableId::new(i as u32, slot.generation), &e.entity, e.active))
        })
    }

    pub fn live_ids(&self) -> Vec<HackableId> {
        self.iter()
            .filter(|(_, _, active)| *active)
            .map(|(id, _, _)| id)
            .collect()
    }

    pub fn position(&self, id: HackableId) -> Option<Vec3> {
        self.get(id).map(|e| e.as_hackable().position())
    }

    /// Current wheel layout, empty for gone or inactive targets
    pub fn quick_actions(&self, id: HackableId) -> QuickActionSet {
        match self.entry(id) {
            Some(entry) if entry.active => entry.entity.as_hackable().quick_actions(),
            _ => QuickActionSet::default(),
        }
    }

    pub fn on_scanned_once(&mut self, id: HackableId) -> bool {
        match self.entry_mut(id) {
            Some(entry) if entry.active => entry.entity.as_hackable_mut().on_scanned_once(),
            _ => false,
        }
    }

    pub fn reset_scan_flag(&mut self, id: HackableId) {
        if let Some(entry) = self.entry_mut(id) {
            entry.entity.as_hackable_mut().reset_scan_flag();
        }
    }

    /// Resolve `action_id` against the target's live action set and run it
    pub fn execute_action(&mut self, id: HackableId, action_id: &str) -> Result<(), ExecuteError> {
        let entry = self.entry_mut(id).ok_or(ExecuteError::TargetGone(id))?;
        if !entry.active {
            return Err(ExecuteError::Inactive(id));
        }

        let hackable = entry.entity.as_hackable_mut();
        let unavailable = || ExecuteError::ActionUnavailable {
            target: id,
            action_id: action_id.to_string(),
        };
        if hackable.quick_actions().find(action_id).is_none() {
            return Err(unavailable());
        }

        let mut ctx = ActionContext::new(id);
        if !hackable.execute(action_id, &mut ctx) {
            return Err(unavailable());
        }
        self.apply_commands(ctx.commands);
        Ok(())
    }

    fn apply_commands(&mut self, commands: Vec<WorldCommand>) {
        for command in commands {
            match command {
                WorldCommand::Deactivate(id) => self.set_active(id, false),
                WorldCommand::StunEnemiesAround {
                    source,
                    origin,
                    radius,
                    duration,
                } => {
                    for (index, slot) in self.slots.iter_mut().enumerate() {
                        if HackableId::new(index as u32, slot.generation) == source {
                            continue;
                        }
                        let Some(entry) = slot.entry.as_mut() else {
                            continue;
                        };
                        if !entry.active {
                            continue;
                        }
                        let Some(enemy) = entry.entity.as_enemy_mut() else {
                            continue;
                        };
                        if enemy.is_dead() || enemy.position().distance(origin) > radius {
                            continue;
                        }
                        enemy.force_stun(duration);
                    }
                }
            }
        }
    }

    /// Live enemies that are not Dead, with positions
    pub fn enemy_positions(&self) -> Vec<(HackableId, Vec3)> {
        self.iter()
            .filter(|(_, _, active)| *active)
            .filter_map(|(id, entity, _)| {
                entity
                    .as_enemy()
                    .filter(|e| !e.is_dead())
                    .map(|e| (id, e.position()))
            })
            .collect()
    }

    /// Step every live entity one frame
    pub fn tick(&mut self, time: &FrameTime, player_position: Option<Vec3>) {
        let enemies = self.enemy_positions();
        let mut commands = Vec::new();

        for (index, slot) in self.slots.iter_mut().enumerate() {
            let Some(entry) = slot.entry.as_mut() else {
                continue;
            };
            if !entry.active {
                continue;
            }
            let mut ctx = TickContext {
                self_id: HackableId::new(index as u32, slot.generation),
                time: *time,
                player_position,
                enemies: &enemies,
                commands: Vec::new(),
            };
            entry.entity.as_hackable_mut().tick(&mut ctx);
            commands.append(&mut ctx.commands);
        }

        self.apply_commands(commands);
    }
}
