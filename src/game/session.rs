// game/session.rs

use super::level::DemoLevel;
use super::zones::{ZoneTransition, Zones};
use crate::config::GlitchConfig;
use crate::controls::Controls;
use crate::echo::{EchoEvent, EchoSystem};
use crate::hack::{HackableEntity, HackableId, HackableWorld, ScannerController, ScannerEvent};
use crate::race::{MirrorRace, RaceEvent, WireInteractor};
use crate::services::{SceneQuery, SimpleAgent};
use crate::wire::{BoardError, BoardLibrary, BoardSide};
use bevy::math::{Mat4, Quat, Vec2, Vec3};
use bevy::prelude::Resource;
use rand::rngs::StdRng;

/// Wire node pick radius as a share of the cell size
const WIRE_PICK_RADIUS: f32 = 0.4;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerPose {
    pub position: Vec3,
    pub rotation: Quat,
}

/// Everything that happened during one `GlitchSession::update`
#[derive(Debug, Default)]
pub struct FrameReport {
    /// `Some(true)` on entering the jammer, `Some(false)` on leaving
    pub jammed: Option<bool>,
    pub scanner: Vec<ScannerEvent>,
    pub echo: Vec<EchoEvent>,
    pub race: Vec<RaceEvent>,
}

/// One play session - owns the whole simulation and steps it per frame
#[derive(Debug, Resource)]
pub struct GlitchSession {
    config: GlitchConfig,
    world: HackableWorld,
    scanner: ScannerController,
    echo: EchoSystem,
    race: MirrorRace,
    interactor: WireInteractor,
    zones: Zones,
    scene: SceneQuery,
    player: PlayerPose,
    exit_door: Option<HackableId>,
    jammed: bool,
    /// Scaled seconds since the session started
    now: f32,
    rng: StdRng,
}

impl GlitchSession {
    /// Create a session with an empty world
    pub fn new(
        config: GlitchConfig,
        boards: &BoardLibrary,
        rng: StdRng,
    ) -> Result<Self, BoardError> {
        let rival_agent = SimpleAgent::new(Vec3::from(config.rival.spawn))
            .with_forward(Vec3::Z)
            .with_stopping_distance(0.1);
        let race = MirrorRace::new(
            boards,
            config.race.clone(),
            config.rival.clone(),
            Box::new(rival_agent),
        )?;

        Ok(GlitchSession {
            world: HackableWorld::new(),
            scanner: ScannerController::new(
                config.scanner.clone(),
                &config.time,
                config.wheel.clone(),
            ),
            echo: EchoSystem::new(config.echo.clone(), config.ghost.clone()),
            race,
            interactor: WireInteractor::new(
                config.race.interact_range,
                config.scanner.reticle_sensitivity,
            ),
            zones: Zones::from_config(&config.zones),
            scene: SceneQuery::new(),
            player: PlayerPose {
                position: Vec3::ZERO,
                rotation: Quat::IDENTITY,
            },
            exit_door: None,
            jammed: false,
            now: 0.0,
            rng,
            config,
        })
    }

    // === Query Methods ===

    pub fn config(&self) -> &GlitchConfig {
        &self.config
    }

    pub fn world(&self) -> &HackableWorld {
        &self.world
    }

    pub fn scanner(&self) -> &ScannerController {
        &self.scanner
    }

    pub fn echo(&self) -> &EchoSystem {
        &self.echo
    }

    pub fn race(&self) -> &MirrorRace {
        &self.race
    }

    pub fn interactor(&self) -> &WireInteractor {
        &self.interactor
    }

    pub fn zones(&self) -> &Zones {
        &self.zones
    }

    pub fn player(&self) -> PlayerPose {
        self.player
    }

    /// Inside the tunnel: no scanner, no recording
    pub fn is_jammed(&self) -> bool {
        self.jammed
    }

    pub fn now(&self) -> f32 {
        self.now
    }

    // === Mutation Methods ===

    pub fn spawn(&mut self, entity: HackableEntity) -> HackableId {
        self.world.spawn(entity)
    }

    pub fn set_exit_door(&mut self, door: HackableId) {
        self.exit_door = Some(door);
    }

    /// Populate the world with the demo level and wire up its exit door
    pub fn spawn_level(&mut self) -> DemoLevel {
        let level = DemoLevel::spawn(&mut self.world, &self.config.enemy);
        self.set_exit_door(level.exit_door);
        level
    }

    pub fn set_player_pose(&mut self, position: Vec3, rotation: Quat) {
        self.player = PlayerPose { position, rotation };
    }

    /// Rebuild the pick volumes from the camera and the live world
    pub fn refresh_scene(&mut self, view_proj: Mat4, camera_position: Vec3, screen_size: Vec2) {
        self.scene.set_camera(view_proj, camera_position, screen_size);
        self.scene.clear();
        for (id, entity, active) in self.world.iter() {
            if !active {
                continue;
            }
            let hackable = entity.as_hackable();
            self.scene
                .insert_hackable(id, hackable.position(), hackable.bounds_radius());
        }
        for side in [BoardSide::Player, BoardSide::Rival] {
            let layout = self.race.layout(side);
            let radius = layout.cell_size * WIRE_PICK_RADIUS;
            for (node_id, node) in self.race.board(side).nodes() {
                self.scene
                    .insert_wire_node(side, node_id, layout.world_position(node.grid), radius);
            }
        }
    }

    /// Step the whole simulation by one wall-clock frame
    pub fn update(&mut self, unscaled: f32, controls: &Controls) -> FrameReport {
        let mut report = FrameReport::default();
        let position = self.player.position;

        match self.zones.jammer.update(position) {
            Some(ZoneTransition::Entered) => self.set_jammed(true, &mut report),
            Some(ZoneTransition::Exited) => self.set_jammed(false, &mut report),
            None => {}
        }
        if self.zones.race_trigger.update(position) == Some(ZoneTransition::Entered) {
            report.race.extend(self.race.on_trigger_enter());
        }

        self.now += unscaled * self.scanner.time_scale();
        let time = self.scanner.frame_time(unscaled, self.now);

        report.scanner = self.scanner.update(
            controls,
            &time,
            position,
            &mut self.world,
            &self.scene,
            self.echo.recorder_mut(),
        );
        report.echo = self.echo.update(
            &time,
            position,
            self.player.rotation,
            controls,
            &mut self.world,
            &self.scene,
        );
        self.world.tick(&time, Some(position));

        let wire_events = self.interactor.update(controls, &self.scene, &mut self.race);
        report.race.extend(wire_events);
        let race_events = self.race.update(time.scaled, &mut self.rng);
        report.race.extend(race_events);

        self.apply_race_events(&report.race);
        report
    }

    fn set_jammed(&mut self, jammed: bool, report: &mut FrameReport) {
        self.jammed = jammed;
        self.scanner.set_enabled(!jammed);
        self.echo.set_enabled(!jammed);
        self.interactor.set_enabled(jammed, &mut self.race);
        log::info!("Echo jammer {}", if jammed { "engaged" } else { "released" });
        report.jammed = Some(jammed);
    }

    fn apply_race_events(&mut self, events: &[RaceEvent]) {
        if !events.contains(&RaceEvent::PlayerWon) {
            return;
        }
        let door = self.exit_door.and_then(|id| self.world.get_mut(id));
        match door {
            Some(HackableEntity::Door(door)) => door.force_open(),
            _ => log::warn!("Mirror race won but no exit door is set"),
        }
    }
}
