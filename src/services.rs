//! Engine services consumed by the simulation core.
//!
//! The core never talks to physics or navigation directly. It asks a
//! `SpatialQuery` for overlap and screen raycasts and drives movement through
//! a `NavAgent`. The concrete versions here are small geometric stand-ins that
//! the Bevy layer refreshes every frame.

use crate::hack::HackableId;
use crate::wire::{BoardSide, NodeId};
use bevy::math::{Mat4, Vec2, Vec3, Vec4};

pub trait SpatialQuery {
    /// Active hackables whose bounds touch the sphere, nearest first
    fn overlap_sphere(&self, center: Vec3, radius: f32) -> Vec<HackableId>;

    /// First active hackable hit by the ray through a screen point
    fn raycast_screen(&self, screen: Vec2, max_distance: f32) -> Option<HackableId>;

    /// Inside the camera frustum
    fn is_in_view(&self, position: Vec3) -> bool;

    /// First wire node hit by the ray through a screen point
    fn raycast_wire_node(&self, screen: Vec2, max_distance: f32) -> Option<(BoardSide, NodeId)>;

    /// Viewport size in pixels
    fn screen_size(&self) -> Vec2;
}

#[derive(Debug, Clone, Copy)]
struct Sphere {
    center: Vec3,
    radius: f32,
}

impl Sphere {
    /// Distance along a normalized ray to the first hit, if any
    fn ray_hit(&self, origin: Vec3, dir: Vec3) -> Option<f32> {
        let oc = origin - self.center;
        let b = oc.dot(dir);
        let c = oc.length_squared() - self.radius * self.radius;
        let disc = b * b - c;
        if disc < 0.0 {
            return None;
        }
        let sqrt = disc.sqrt();
        let near = -b - sqrt;
        let far = -b + sqrt;
        if near >= 0.0 {
            Some(near)
        } else if far >= 0.0 {
            // Origin inside the sphere
            Some(0.0)
        } else {
            None
        }
    }
}

/// Bounding-sphere scene used for scans and screen picking.
///
/// Screen coordinates are pixels from the bottom-left corner.
#[derive(Debug, Clone)]
pub struct SceneQuery {
    hackables: Vec<(HackableId, Sphere)>,
    wire_nodes: Vec<(BoardSide, NodeId, Sphere)>,
    view_proj: Mat4,
    camera_position: Vec3,
    screen_size: Vec2,
}

impl Default for SceneQuery {
    fn default() -> Self {
        SceneQuery {
            hackables: Vec::new(),
            wire_nodes: Vec::new(),
            view_proj: Mat4::IDENTITY,
            camera_position: Vec3::ZERO,
            screen_size: Vec2::new(1280.0, 720.0),
        }
    }
}

impl SceneQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Forget every collider, keeping the camera
    pub fn clear(&mut self) {
        self.hackables.clear();
        self.wire_nodes.clear();
    }

    pub fn set_camera(&mut self, view_proj: Mat4, camera_position: Vec3, screen_size: Vec2) {
        self.view_proj = view_proj;
        self.camera_position = camera_position;
        self.screen_size = screen_size;
    }

    pub fn insert_hackable(&mut self, id: HackableId, center: Vec3, radius: f32) {
        self.hackables.push((id, Sphere { center, radius }));
    }

    pub fn insert_wire_node(&mut self, side: BoardSide, node: NodeId, center: Vec3, radius: f32) {
        self.wire_nodes.push((side, node, Sphere { center, radius }));
    }

    /// World-space ray through a screen pixel
    pub fn screen_ray(&self, screen: Vec2) -> Option<(Vec3, Vec3)> {
        if self.screen_size.x <= 0.0 || self.screen_size.y <= 0.0 {
            return None;
        }
        let ndc = Vec2::new(
            screen.x / self.screen_size.x * 2.0 - 1.0,
            screen.y / self.screen_size.y * 2.0 - 1.0,
        );
        let inverse = self.view_proj.inverse();
        let point = inverse * Vec4::new(ndc.x, ndc.y, 0.5, 1.0);
        if point.w.abs() < f32::EPSILON {
            return None;
        }
        let world = point.truncate() / point.w;
        let dir = (world - self.camera_position).try_normalize()?;
        Some((self.camera_position, dir))
    }

    fn nearest_hit<'a, K: Copy + 'a>(
        &self,
        items: impl Iterator<Item = (K, &'a Sphere)>,
        screen: Vec2,
        max_distance: f32,
    ) -> Option<K> {
        let (origin, dir) = self.screen_ray(screen)?;
        items
            .filter_map(|(key, sphere)| {
                sphere
                    .ray_hit(origin, dir)
                    .filter(|&t| t <= max_distance)
                    .map(|t| (key, t))
            })
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(key, _)| key)
    }
}

impl SpatialQuery for SceneQuery {
    fn overlap_sphere(&self, center: Vec3, radius: f32) -> Vec<HackableId> {
        let mut hits: Vec<(HackableId, f32)> = self
            .hackables
            .iter()
            .filter_map(|(id, sphere)| {
                let dist = sphere.center.distance(center);
                (dist <= radius + sphere.radius).then_some((*id, dist))
            })
            .collect();
        hits.sort_by(|a, b| a.1.total_cmp(&b.1));
        hits.into_iter().map(|(id, _)| id).collect()
    }

    fn raycast_screen(&self, screen: Vec2, max_distance: f32) -> Option<HackableId> {
        self.nearest_hit(
            self.hackables.iter().map(|(id, sphere)| (*id, sphere)),
            screen,
            max_distance,
        )
    }

    fn is_in_view(&self, position: Vec3) -> bool {
        let clip = self.view_proj * position.extend(1.0);
        if clip.w <= 0.0 {
            return false;
        }
        let ndc = clip.truncate() / clip.w;
        ndc.x.abs() <= 1.0 && ndc.y.abs() <= 1.0
    }

    fn raycast_wire_node(&self, screen: Vec2, max_distance: f32) -> Option<(BoardSide, NodeId)> {
        self.nearest_hit(
            self.wire_nodes
                .iter()
                .map(|(side, node, sphere)| ((*side, *node), sphere)),
            screen,
            max_distance,
        )
    }

    fn screen_size(&self) -> Vec2 {
        self.screen_size
    }
}

/// Path-following agent, the navmesh stand-in
pub trait NavAgent: Send + Sync + std::fmt::Debug {
    fn position(&self) -> Vec3;

    /// Horizontal facing, normalized
    fn forward(&self) -> Vec3;

    fn set_speed(&mut self, speed: f32);

    /// Head for the nearest walkable point to `target`.
    /// Returns false (and leaves the agent untouched) if none is close enough.
    fn set_destination(&mut self, target: Vec3) -> bool;

    fn stop(&mut self);

    /// Distance left on the current path, `None` when idle
    fn remaining_distance(&self) -> Option<f32>;

    fn stopping_distance(&self) -> f32;

    /// Teleport without pathing
    fn warp(&mut self, position: Vec3);

    /// Advance along the path; agents moved by an engine can ignore this
    fn step(&mut self, _dt: f32) {}
}

/// Walks straight lines on the ground plane inside optional bounds
#[derive(Debug, Clone)]
pub struct SimpleAgent {
    position: Vec3,
    forward: Vec3,
    speed: f32,
    destination: Option<Vec3>,
    stopping_distance: f32,
    /// Min/max corners of the walkable area
    walkable: Option<(Vec3, Vec3)>,
    sample_radius: f32,
}

impl SimpleAgent {
    pub fn new(position: Vec3) -> Self {
        SimpleAgent {
            position,
            forward: Vec3::NEG_Z,
            speed: 3.5,
            destination: None,
            stopping_distance: 0.0,
            walkable: None,
            sample_radius: 2.0,
        }
    }

    pub fn with_forward(mut self, forward: Vec3) -> Self {
        if let Some(flat) = Vec3::new(forward.x, 0.0, forward.z).try_normalize() {
            self.forward = flat;
        }
        self
    }

    pub fn with_walkable(mut self, min: Vec3, max: Vec3) -> Self {
        self.walkable = Some((min.min(max), min.max(max)));
        self
    }

    pub fn with_stopping_distance(mut self, distance: f32) -> Self {
        self.stopping_distance = distance.max(0.0);
        self
    }

    pub fn destination(&self) -> Option<Vec3> {
        self.destination
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    /// Closest walkable point within the sample radius
    fn sample(&self, target: Vec3) -> Option<Vec3> {
        let Some((min, max)) = self.walkable else {
            return Some(target);
        };
        let clamped = target.clamp(min, max);
        (clamped.distance(target) <= self.sample_radius).then_some(clamped)
    }
}

impl NavAgent for SimpleAgent {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn forward(&self) -> Vec3 {
        self.forward
    }

    fn set_speed(&mut self, speed: f32) {
        self.speed = speed.max(0.0);
    }

    fn set_destination(&mut self, target: Vec3) -> bool {
        match self.sample(target) {
            Some(point) => {
                self.destination = Some(point);
                true
            }
            None => false,
        }
    }

    fn stop(&mut self) {
        self.destination = None;
    }

    fn remaining_distance(&self) -> Option<f32> {
        self.destination.map(|d| d.distance(self.position))
    }

    fn stopping_distance(&self) -> f32 {
        self.stopping_distance
    }

    fn warp(&mut self, position: Vec3) {
        self.position = position;
        self.destination = None;
    }

    fn step(&mut self, dt: f32) {
        let Some(destination) = self.destination else {
            return;
        };
        let to_target = destination - self.position;
        let distance = to_target.length();
        if distance <= self.stopping_distance {
            return;
        }

        let travel = self.speed * dt;
        if travel >= distance {
            self.position = destination;
        } else {
            self.position += to_target / distance * travel;
        }
        if let Some(flat) = Vec3::new(to_target.x, 0.0, to_target.z).try_normalize() {
            self.forward = flat;
        }
    }
}
