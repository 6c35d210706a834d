use crate::config::ZoneConfig;
use bevy::math::Vec3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneTransition {
    Entered,
    Exited,
}

/// Axis-aligned trigger volume that reports enter/exit edges
#[derive(Debug, Clone)]
pub struct TriggerZone {
    name: &'static str,
    min: Vec3,
    max: Vec3,
    inside: bool,
}

impl TriggerZone {
    pub fn new(name: &'static str, a: Vec3, b: Vec3) -> Self {
        TriggerZone {
            name,
            min: a.min(b),
            max: a.max(b),
            inside: false,
        }
    }

    pub fn contains(&self, point: Vec3) -> bool {
        self.min.cmple(point).all() && point.cmple(self.max).all()
    }

    pub fn is_inside(&self) -> bool {
        self.inside
    }

    pub fn center(&self) -> Vec3 {
        (self.min + self.max) * 0.5
    }

    pub fn size(&self) -> Vec3 {
        self.max - self.min
    }

    pub fn update(&mut self, point: Vec3) -> Option<ZoneTransition> {
        let inside = self.contains(point);
        if inside == self.inside {
            return None;
        }
        self.inside = inside;
        log::debug!(
            "Player {} {}",
            if inside { "entered" } else { "left" },
            self.name
        );
        Some(if inside {
            ZoneTransition::Entered
        } else {
            ZoneTransition::Exited
        })
    }
}

/// The tunnel jammer and the race start trigger inside it
#[derive(Debug, Clone)]
pub struct Zones {
    pub jammer: TriggerZone,
    pub race_trigger: TriggerZone,
}

impl Zones {
    pub fn from_config(config: &ZoneConfig) -> Self {
        Zones {
            jammer: TriggerZone::new(
                "jammer zone",
                Vec3::from(config.jammer_min),
                Vec3::from(config.jammer_max),
            ),
            race_trigger: TriggerZone::new(
                "race trigger",
                Vec3::from(config.race_trigger_min),
                Vec3::from(config.race_trigger_max),
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_edges_fire_once() {
        let mut zone = TriggerZone::new("box", Vec3::new(1.0, 1.0, 1.0), Vec3::splat(-1.0));
        assert_eq!(zone.update(Vec3::new(5.0, 0.0, 0.0)), None);
        assert_eq!(zone.update(Vec3::ZERO), Some(ZoneTransition::Entered));
        assert_eq!(zone.update(Vec3::new(0.5, 0.0, 0.0)), None);
        assert!(zone.is_inside());
        assert_eq!(zone.update(Vec3::new(0.0, 2.0, 0.0)), Some(ZoneTransition::Exited));
        assert_eq!(zone.update(Vec3::new(0.0, 3.0, 0.0)), None);
    }

    #[test]
    fn test_boundary_counts_as_inside() {
        let zone = TriggerZone::new("box", Vec3::ZERO, Vec3::ONE);
        assert!(zone.contains(Vec3::ONE));
        assert!(!zone.contains(Vec3::new(1.01, 0.5, 0.5)));
    }

    #[test]
    fn test_race_trigger_sits_inside_jammer() {
        let zones = Zones::from_config(&ZoneConfig::default());
        let trigger = zones.race_trigger.center();
        assert!(zones.jammer.contains(trigger));
    }
}
