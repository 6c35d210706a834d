use super::fx::{FxMode, ScreenFx};
use super::wheel::{HackWheel, WheelDir};
use super::world::{ExecuteError, HackableId, HackableWorld};
use crate::clock::{FrameTime, TimeDilation};
use crate::config::{ScannerConfig, TimeConfig, WheelConfig};
use crate::controls::Controls;
use crate::echo::EchoRecorder;
use crate::services::SpatialQuery;
use bevy::math::{Vec2, Vec3};

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ScanMode {
    Normal,
    /// Reveal sweep before bullet time kicks in, undilated seconds
    ScanIntro { elapsed: f32 },
    Scan,
    Hack,
}

/// A charge action being held down
#[derive(Debug, Clone, PartialEq)]
pub struct ChargeState {
    pub action_id: String,
    pub dir: WheelDir,
    pub elapsed: f32,
    pub duration: f32,
}

impl ChargeState {
    pub fn progress(&self) -> f32 {
        if self.duration <= 0.0 {
            1.0
        } else {
            (self.elapsed / self.duration).clamp(0.0, 1.0)
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ScannerEvent {
    ModeChanged { from: ScanMode, to: ScanMode },
    AimChanged(Option<HackableId>),
    ActionExecuted { target: HackableId, action_id: String },
    ChargeStarted { target: HackableId, action_id: String },
    ChargeCancelled { target: HackableId, action_id: String },
    ActionFailed(ExecuteError),
}

/// Scan and hack ability: owns bullet time, the hack wheel and the
/// screen grading, and commits hacks into the world.
#[derive(Debug, Clone)]
pub struct ScannerController {
    config: ScannerConfig,
    dilation: TimeDilation,
    fx: ScreenFx,
    wheel: HackWheel,
    mode: ScanMode,
    in_range: Vec<HackableId>,
    refresh_timer: f32,
    reticle: Vec2,
    aimed: Option<HackableId>,
    target: Option<HackableId>,
    charge: Option<ChargeState>,
    enabled: bool,
}

impl ScannerController {
    pub fn new(config: ScannerConfig, time: &TimeConfig, wheel: WheelConfig) -> Self {
        ScannerController {
            fx: ScreenFx::new(config.intro_duration),
            config,
            dilation: TimeDilation::new(time.bullet_time_scale, time.normal_fixed_step),
            wheel: HackWheel::new(wheel),
            mode: ScanMode::Normal,
            in_range: Vec::new(),
            refresh_timer: 0.0,
            reticle: Vec2::ZERO,
            aimed: None,
            target: None,
            charge: None,
            enabled: true,
        }
    }

    pub fn mode(&self) -> ScanMode {
        self.mode
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn time_scale(&self) -> f32 {
        self.dilation.time_scale()
    }

    pub fn fixed_step(&self) -> f32 {
        self.dilation.fixed_step()
    }

    /// Turn this frame's wall-clock delta into scaled and unscaled times
    pub fn frame_time(&self, unscaled: f32, now: f32) -> FrameTime {
        self.dilation.frame(unscaled, now)
    }

    pub fn fx(&self) -> &ScreenFx {
        &self.fx
    }

    pub fn wheel(&self) -> &HackWheel {
        &self.wheel
    }

    pub fn reticle(&self) -> Vec2 {
        self.reticle
    }

    pub fn aimed(&self) -> Option<HackableId> {
        self.aimed
    }

    pub fn target(&self) -> Option<HackableId> {
        self.target
    }

    pub fn charge(&self) -> Option<&ChargeState> {
        self.charge.as_ref()
    }

    pub fn in_range(&self) -> &[HackableId] {
        &self.in_range
    }

    /// Disabling drops straight back to Normal and restores time
    pub fn set_enabled(&mut self, enabled: bool) {
        if !enabled && self.mode != ScanMode::Normal {
            let mut discarded = Vec::new();
            self.exit_to_normal(&mut discarded);
        }
        self.enabled = enabled;
    }

    pub fn update(
        &mut self,
        controls: &Controls,
        time: &FrameTime,
        player: Vec3,
        world: &mut HackableWorld,
        spatial: &dyn SpatialQuery,
        recorder: &mut EchoRecorder,
    ) -> Vec<ScannerEvent> {
        let mut events = Vec::new();
        if self.enabled {
            match self.mode {
                ScanMode::Normal => {
                    if controls.pressed.scan {
                        self.begin_intro(player, world, spatial, &mut events);
                    }
                }
                ScanMode::ScanIntro { elapsed } => {
                    let elapsed = elapsed + time.unscaled;
                    self.update_intro(elapsed, player, world, spatial, &mut events);
                }
                ScanMode::Scan => {
                    self.update_scan(controls, time, player, world, spatial, &mut events);
                }
                ScanMode::Hack => {
                    self.update_hack(controls, time, world, recorder, &mut events);
                }
            }
        }
        self.fx.tick(time.unscaled);
        events
    }

    fn set_mode(&mut self, to: ScanMode, events: &mut Vec<ScannerEvent>) {
        let from = self.mode;
        self.mode = to;
        events.push(ScannerEvent::ModeChanged { from, to });
    }

    fn set_aimed(&mut self, aimed: Option<HackableId>, events: &mut Vec<ScannerEvent>) {
        if aimed != self.aimed {
            self.aimed = aimed;
            events.push(ScannerEvent::AimChanged(aimed));
        }
    }

    fn refresh_in_range(
        &mut self,
        player: Vec3,
        world: &HackableWorld,
        spatial: &dyn SpatialQuery,
    ) {
        self.in_range = spatial
            .overlap_sphere(player, self.config.scan_radius)
            .into_iter()
            .filter(|&id| world.is_live(id))
            .collect();
        self.refresh_timer = 0.0;
    }

    fn reset_scan_flags(&self, world: &mut HackableWorld) {
        for &id in &self.in_range {
            world.reset_scan_flag(id);
        }
    }

    fn begin_intro(
        &mut self,
        player: Vec3,
        world: &mut HackableWorld,
        spatial: &dyn SpatialQuery,
        events: &mut Vec<ScannerEvent>,
    ) {
        self.refresh_in_range(player, world, spatial);
        self.reset_scan_flags(world);
        self.fx.set_mode(FxMode::ScanIntro);
        self.set_mode(ScanMode::ScanIntro { elapsed: 0.0 }, events);
    }

    fn update_intro(
        &mut self,
        elapsed: f32,
        player: Vec3,
        world: &mut HackableWorld,
        spatial: &dyn SpatialQuery,
        events: &mut Vec<ScannerEvent>,
    ) {
        for &id in &self.in_range {
            let visible = world
                .position(id)
                .is_some_and(|position| spatial.is_in_view(position));
            if visible {
                world.on_scanned_once(id);
            }
        }

        if elapsed < self.config.intro_duration {
            self.mode = ScanMode::ScanIntro { elapsed };
            return;
        }

        self.dilation.enter();
        self.reticle = spatial.screen_size() * 0.5;
        self.refresh_in_range(player, world, spatial);
        self.reset_scan_flags(world);
        self.fx.set_mode(FxMode::Scan);
        self.set_mode(ScanMode::Scan, events);
    }

    fn update_scan(
        &mut self,
        controls: &Controls,
        time: &FrameTime,
        player: Vec3,
        world: &mut HackableWorld,
        spatial: &dyn SpatialQuery,
        events: &mut Vec<ScannerEvent>,
    ) {
        if controls.pressed.scan {
            self.exit_to_normal(events);
            return;
        }

        self.refresh_timer += time.scaled;
        if self.refresh_timer >= self.config.refresh_interval {
            self.refresh_in_range(player, world, spatial);
        }

        let screen = spatial.screen_size();
        self.reticle = (self.reticle + controls.pointer_delta * self.config.reticle_sensitivity)
            .clamp(Vec2::ZERO, screen.max(Vec2::ZERO));

        let aimed = spatial
            .raycast_screen(self.reticle, self.config.aim_distance)
            .filter(|id| self.in_range.contains(id) && world.is_live(*id));
        self.set_aimed(aimed, events);

        if controls.pressed.interact {
            if let Some(target) = self.aimed {
                self.enter_hack(target, world, events);
            }
        }
    }

    fn enter_hack(
        &mut self,
        target: HackableId,
        world: &HackableWorld,
        events: &mut Vec<ScannerEvent>,
    ) {
        self.target = Some(target);
        self.charge = None;
        self.wheel.bind(world.quick_actions(target));
        self.fx.set_mode(FxMode::Hack);
        self.set_mode(ScanMode::Hack, events);
    }

    fn update_hack(
        &mut self,
        controls: &Controls,
        time: &FrameTime,
        world: &mut HackableWorld,
        recorder: &mut EchoRecorder,
        events: &mut Vec<ScannerEvent>,
    ) {
        let Some(target) = self.target.filter(|&id| world.is_live(id)) else {
            self.charge = None;
            self.exit_to_normal(events);
            return;
        };

        if controls.pressed.interact {
            self.cancel_charge(target, events);
            self.exit_to_normal(events);
            return;
        }

        self.wheel.set_actions(world.quick_actions(target));
        self.wheel.feed(controls.pointer_delta);
        let selected = self
            .wheel
            .selected()
            .zip(self.wheel.selected_action().cloned());

        if let Some(mut charge) = self.charge.take() {
            let still_selected = selected
                .as_ref()
                .is_some_and(|(dir, action)| *dir == charge.dir && action.id == charge.action_id);
            if !controls.held.confirm || !still_selected {
                self.wheel.set_charge_progress(0.0);
                events.push(ScannerEvent::ChargeCancelled {
                    target,
                    action_id: charge.action_id,
                });
                return;
            }

            charge.elapsed += time.unscaled;
            self.wheel.set_charge_progress(charge.progress());
            if charge.progress() >= 1.0 {
                self.commit(target, &charge.action_id, time, world, recorder, events);
                self.exit_to_normal(events);
            } else {
                self.charge = Some(charge);
            }
            return;
        }

        if !controls.pressed.confirm {
            return;
        }
        let Some((dir, action)) = selected else {
            return;
        };
        if action.requires_charge {
            self.charge = Some(ChargeState {
                action_id: action.id.clone(),
                dir,
                elapsed: 0.0,
                duration: action.charge_duration,
            });
            events.push(ScannerEvent::ChargeStarted {
                target,
                action_id: action.id,
            });
        } else {
            self.commit(target, &action.id, time, world, recorder, events);
        }
    }

    fn commit(
        &mut self,
        target: HackableId,
        action_id: &str,
        time: &FrameTime,
        world: &mut HackableWorld,
        recorder: &mut EchoRecorder,
        events: &mut Vec<ScannerEvent>,
    ) {
        match world.execute_action(target, action_id) {
            Ok(()) => {
                log::info!("Hacked {} with {}", target, action_id);
                recorder.record_last_hack(target, action_id, time.now);
                self.wheel.set_actions(world.quick_actions(target));
                events.push(ScannerEvent::ActionExecuted {
                    target,
                    action_id: action_id.to_string(),
                });
            }
            Err(e) => {
                log::debug!("Hack not committed: {}", e);
                events.push(ScannerEvent::ActionFailed(e));
            }
        }
    }

    fn cancel_charge(&mut self, target: HackableId, events: &mut Vec<ScannerEvent>) {
        if let Some(charge) = self.charge.take() {
            events.push(ScannerEvent::ChargeCancelled {
                target,
                action_id: charge.action_id,
            });
        }
    }

    fn exit_to_normal(&mut self, events: &mut Vec<ScannerEvent>) {
        self.dilation.exit();
        self.fx.set_mode(FxMode::Normal);
        self.wheel.clear();
        self.charge = None;
        self.target = None;
        self.set_aimed(None, events);
        self.set_mode(ScanMode::Normal, events);
    }
}
