use bevy::math::Vec3;
use serde::Deserialize;
use std::fmt;

const CONFIG_JSON: &str = include_str!("../assets/glitch.json");

#[derive(Debug)]
pub enum ConfigError {
    Parse(serde_json::Error),
    Invalid(String),
}

impl fmt::Display for ConfigError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigError::Parse(e) => write!(f, "Invalid config JSON: {}", e),
            ConfigError::Invalid(msg) => write!(f, "Invalid config value: {}", msg),
        }
    }
}

impl std::error::Error for ConfigError {}

/// Every tunable of the game, grouped per system.
/// Missing sections and keys fall back to the shipped tuning.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct GlitchConfig {
    pub time: TimeConfig,
    pub scanner: ScannerConfig,
    pub wheel: WheelConfig,
    pub echo: EchoConfig,
    pub ghost: GhostConfig,
    pub race: RaceConfig,
    pub rival: RivalConfig,
    pub enemy: EnemyConfig,
    pub zones: ZoneConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TimeConfig {
    pub bullet_time_scale: f32,
    pub normal_fixed_step: f32,
}

impl Default for TimeConfig {
    fn default() -> Self {
        TimeConfig {
            bullet_time_scale: 0.2,
            normal_fixed_step: 0.02,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ScannerConfig {
    pub scan_radius: f32,
    pub refresh_interval: f32,
    pub aim_distance: f32,
    pub intro_duration: f32,
    pub reticle_sensitivity: f32,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        ScannerConfig {
            scan_radius: 12.0,
            refresh_interval: 0.25,
            aim_distance: 30.0,
            intro_duration: 0.35,
            reticle_sensitivity: 1.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct WheelConfig {
    pub dead_zone: f32,
    pub max_radius: f32,
    pub shake_min: f32,
    pub shake_max: f32,
}

impl Default for WheelConfig {
    fn default() -> Self {
        WheelConfig {
            dead_zone: 35.0,
            max_radius: 120.0,
            shake_min: 2.0,
            shake_max: 22.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EchoConfig {
    pub record_duration: f32,
    pub record_interval: f32,
    pub cooldown: f32,
}

impl Default for EchoConfig {
    fn default() -> Self {
        EchoConfig {
            record_duration: 10.0,
            record_interval: 0.05,
            cooldown: 10.0,
        }
    }
}

impl EchoConfig {
    /// Number of frames the recorder keeps
    pub fn capacity(&self) -> usize {
        (self.record_duration / self.record_interval).ceil().max(1.0) as usize
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct GhostConfig {
    pub spawn_duration: f32,
    pub dissolve_duration: f32,
    pub scan_radius: f32,
    pub spawn_jitter: f32,
    pub fragment_count: usize,
    pub fragment_bounds: [f32; 3],
}

impl Default for GhostConfig {
    fn default() -> Self {
        GhostConfig {
            spawn_duration: 0.3,
            dissolve_duration: 0.4,
            scan_radius: 12.0,
            spawn_jitter: 0.04,
            fragment_count: 60,
            fragment_bounds: [0.7, 1.8, 0.4],
        }
    }
}

impl GhostConfig {
    pub fn fragment_bounds(&self) -> Vec3 {
        Vec3::from_array(self.fragment_bounds)
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RaceConfig {
    pub board: String,
    pub lockout_duration: f32,
    pub cell_size: f32,
    pub player_board_origin: [f32; 3],
    pub rival_board_origin: [f32; 3],
    /// Reach of the wire reticle raycast
    pub interact_range: f32,
}

impl Default for RaceConfig {
    fn default() -> Self {
        RaceConfig {
            board: "tunnel_mirror".to_string(),
            lockout_duration: 30.0,
            cell_size: 1.5,
            player_board_origin: [-6.0, 0.0, 30.0],
            rival_board_origin: [6.0, 0.0, 30.0],
            interact_range: 15.0,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RivalConfig {
    pub move_speed: f32,
    pub arrive_distance: f32,
    pub walk_timeout: f32,
    pub node_rotate_delay: f32,
    pub rotate_interval: f32,
    pub idle_delay: f32,
    pub sabotage_interval: f32,
    pub sabotage_jitter: f32,
    pub spawn: [f32; 3],
}

impl Default for RivalConfig {
    fn default() -> Self {
        RivalConfig {
            move_speed: 3.5,
            arrive_distance: 2.5,
            walk_timeout: 8.0,
            node_rotate_delay: 0.8,
            rotate_interval: 0.3,
            idle_delay: 1.0,
            sabotage_interval: 15.0,
            sabotage_jitter: 2.0,
            spawn: [8.0, 0.0, 26.0],
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct EnemyConfig {
    pub patrol_enabled: bool,
    pub patrol_speed: f32,
    pub chase_speed: f32,
    pub view_radius: f32,
    pub view_angle: f32,
    pub lose_sight_time: f32,
    pub stun_duration: f32,
    pub freeze_duration: f32,
    pub rebel_duration: f32,
    pub overload_charge: f32,
    pub explosion_radius: f32,
}

impl Default for EnemyConfig {
    fn default() -> Self {
        EnemyConfig {
            patrol_enabled: true,
            patrol_speed: 2.0,
            chase_speed: 4.0,
            view_radius: 10.0,
            view_angle: 60.0,
            lose_sight_time: 2.0,
            stun_duration: 2.0,
            freeze_duration: 5.0,
            rebel_duration: 6.0,
            overload_charge: 1.0,
            explosion_radius: 3.0,
        }
    }
}

/// Axis-aligned trigger volumes, as `[min, max]` corners
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ZoneConfig {
    pub jammer_min: [f32; 3],
    pub jammer_max: [f32; 3],
    pub race_trigger_min: [f32; 3],
    pub race_trigger_max: [f32; 3],
}

impl Default for ZoneConfig {
    fn default() -> Self {
        ZoneConfig {
            jammer_min: [-12.0, -1.0, 20.0],
            jammer_max: [12.0, 6.0, 40.0],
            race_trigger_min: [-3.0, -1.0, 22.0],
            race_trigger_max: [3.0, 4.0, 25.0],
        }
    }
}

impl GlitchConfig {
    /// Load the embedded config
    pub fn load() -> Result<Self, ConfigError> {
        Self::from_json(CONFIG_JSON)
    }

    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: GlitchConfig = serde_json::from_str(json).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        let positive = [
            ("time.bullet_time_scale", self.time.bullet_time_scale),
            ("time.normal_fixed_step", self.time.normal_fixed_step),
            ("scanner.refresh_interval", self.scanner.refresh_interval),
            ("echo.record_interval", self.echo.record_interval),
            ("echo.record_duration", self.echo.record_duration),
            ("race.cell_size", self.race.cell_size),
        ];
        for (name, value) in positive {
            if value <= 0.0 {
                return Err(ConfigError::Invalid(format!(
                    "{} must be positive, got {}",
                    name, value
                )));
            }
        }
        if self.wheel.max_radius <= self.wheel.dead_zone {
            return Err(ConfigError::Invalid(
                "wheel.max_radius must exceed wheel.dead_zone".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_json_uses_defaults() {
        let config = GlitchConfig::from_json("{}").unwrap();
        assert_eq!(config.echo.capacity(), 200);
        assert_eq!(config.scanner.scan_radius, 12.0);
        assert_eq!(config.race.board, "tunnel_mirror");
        assert_eq!(config.enemy.view_angle, 60.0);
    }

    #[test]
    fn test_partial_section_keeps_other_keys() {
        let config = GlitchConfig::from_json(r#"{ "echo": { "cooldown": 4.0 } }"#).unwrap();
        assert_eq!(config.echo.cooldown, 4.0);
        assert_eq!(config.echo.record_interval, 0.05);
    }

    #[test]
    fn test_capacity_rounds_up() {
        let echo = EchoConfig {
            record_duration: 1.0,
            record_interval: 0.3,
            cooldown: 1.0,
        };
        assert_eq!(echo.capacity(), 4);
    }

    #[test]
    fn test_invalid_values_rejected() {
        assert!(matches!(
            GlitchConfig::from_json(r#"{ "echo": { "record_interval": 0.0 } }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            GlitchConfig::from_json(r#"{ "wheel": { "dead_zone": 200.0 } }"#),
            Err(ConfigError::Invalid(_))
        ));
        assert!(matches!(
            GlitchConfig::from_json("[1, 2"),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_embedded_config_loads() {
        let config = GlitchConfig::load().unwrap();
        assert_eq!(config.time.bullet_time_scale, 0.2);
        assert_eq!(config.race.lockout_duration, 30.0);
    }
}
