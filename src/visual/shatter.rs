use bevy::prelude::*;
use rand::Rng;

use crate::visual::setup::ShatterAssets;

const GRAVITY: f32 = 9.8;

/// A ghost burst into fragments at `origin`
#[derive(Message, Debug, Clone)]
pub struct Shatter {
    pub origin: Vec3,
    pub fragment_count: usize,
    /// Full extents of the box fragments start in
    pub bounds: Vec3,
}

/// One flying shard
#[derive(Component, Debug)]
pub struct Fragment {
    pub velocity: Vec3,
    pub life: f32,
    pub max_life: f32,
}

impl Fragment {
    /// Ballistic step; returns false once the shard has burned out
    pub fn advance(&mut self, translation: &mut Vec3, dt: f32) -> bool {
        self.velocity.y -= GRAVITY * dt;
        *translation += self.velocity * dt;
        self.life -= dt;
        self.life > 0.0
    }

    pub fn remaining(&self) -> f32 {
        (self.life / self.max_life).clamp(0.0, 1.0)
    }
}

/// Random start offset and outward velocity for one shard
pub fn scatter(rng: &mut impl Rng, bounds: Vec3) -> (Vec3, Vec3) {
    let half = bounds * 0.5;
    let offset = Vec3::new(
        rng.random_range(-half.x..=half.x),
        rng.random_range(0.0..=bounds.y),
        rng.random_range(-half.z..=half.z),
    );
    let outward = Vec3::new(offset.x, 0.0, offset.z).normalize_or(Vec3::X);
    let speed: f32 = rng.random_range(1.0..3.0);
    let lift: f32 = rng.random_range(1.0..4.0);
    let velocity = outward * speed + Vec3::Y * lift;
    (offset, velocity)
}

/// System: spawn shards for every shatter this frame
pub fn spawn_fragments(
    mut commands: Commands,
    mut shatters: MessageReader<Shatter>,
    assets: Res<ShatterAssets>,
) {
    let mut rng = rand::rng();
    for shatter in shatters.read() {
        for _ in 0..shatter.fragment_count {
            let (offset, velocity) = scatter(&mut rng, shatter.bounds);
            let life: f32 = rng.random_range(0.6..1.0);
            commands.spawn((
                Mesh3d(assets.mesh.clone()),
                MeshMaterial3d(assets.material.clone()),
                Transform::from_translation(shatter.origin + offset),
                Fragment {
                    velocity,
                    life,
                    max_life: life,
                },
            ));
        }
        info!("Ghost shattered into {} fragments", shatter.fragment_count);
    }
}

/// System: fly, shrink and despawn shards
pub fn update_fragments(
    mut commands: Commands,
    time: Res<Time>,
    mut fragments: Query<(Entity, &mut Fragment, &mut Transform)>,
) {
    let dt = time.delta_secs();
    for (entity, mut fragment, mut transform) in &mut fragments {
        if fragment.advance(&mut transform.translation, dt) {
            transform.scale = Vec3::splat(fragment.remaining());
        } else {
            commands.entity(entity).despawn();
        }
    }
}
