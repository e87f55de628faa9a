//! World context: registry, collision meshes and settings in one place
//!
//! One `tick` is: update pass, flush, dead collection, then the contact
//! matrix. `draw` runs after `tick`, so an entity that died during this
//! tick's update is never drawn.

use glam::Vec3;

use super::actors::{Enemy, Map, Player};
use super::mesh::MeshLibrary;
use super::object::{GameObject, ObjectTag};
use super::registry::{GameObjectRegistry, ObjectId, UpdateStats};
use crate::consts::PLAYER_MODEL_SCALE;
use crate::error::AssetError;
use crate::input::InputState;
use crate::renderer::RenderSurface;
use crate::settings::Settings;

/// Registered name of the stage collision mesh
pub const STAGE_MESH: &str = "stage";
/// Registered name of the actor model
pub const PLAYER_MESH: &str = "player";

/// Distance from the origin at which enemies are placed
const ENEMY_RING_RADIUS: f32 = 300.0;

/// Ids of the entities created by `World::setup_play`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayScene {
    pub map: ObjectId,
    pub player: ObjectId,
    pub enemies: Vec<ObjectId>,
}

pub struct World {
    registry: GameObjectRegistry,
    meshes: MeshLibrary,
    settings: Settings,
    tick_count: u64,
}

impl World {
    pub fn new(settings: Settings) -> Self {
        log::info!(
            "World created (release policy {}, seed {})",
            settings.release_policy.as_str(),
            settings.seed
        );
        Self {
            registry: GameObjectRegistry::new(settings.release_policy),
            meshes: MeshLibrary::new(),
            settings,
            tick_count: 0,
        }
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn registry(&self) -> &GameObjectRegistry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut GameObjectRegistry {
        &mut self.registry
    }

    pub fn meshes(&self) -> &MeshLibrary {
        &self.meshes
    }

    pub fn meshes_mut(&mut self) -> &mut MeshLibrary {
        &mut self.meshes
    }

    /// Ticks run so far
    pub fn tick_count(&self) -> u64 {
        self.tick_count
    }

    /// Queue an entity; see `GameObjectRegistry::entry`
    pub fn entry(&mut self, object: Box<dyn GameObject>) -> ObjectId {
        self.registry.entry(object)
    }

    /// Load the stage and actor model, then queue the map, the player and
    /// `enemy_count` enemies spaced evenly on a ring around the origin
    pub fn setup_play(&mut self, enemy_count: usize) -> Result<PlayScene, AssetError> {
        let stage = self.meshes.load(STAGE_MESH)?;
        let model = self.meshes.load(PLAYER_MESH)?;
        self.meshes.set_scale(model, Vec3::splat(PLAYER_MODEL_SCALE));

        let stage_transform = self.meshes.transform(stage).unwrap_or_default();
        let map = self.registry.entry(Box::new(Map::new(stage, stage_transform)));
        let player = self
            .registry
            .entry(Box::new(Player::new(model, &self.settings)));

        let enemies = (0..enemy_count)
            .map(|i| {
                let angle = std::f32::consts::TAU * i as f32 / enemy_count as f32;
                let position = Vec3::new(angle.cos(), 0.0, angle.sin()) * ENEMY_RING_RADIUS;
                let seed = self.settings.seed.wrapping_add(i as u64);
                let enemy = Enemy::new(position, seed, &self.settings).with_model(model);
                self.registry.entry(Box::new(enemy))
            })
            .collect();

        log::info!("Play scene set up with {} enemies", enemy_count);
        Ok(PlayScene {
            map,
            player,
            enemies,
        })
    }

    /// Advance the simulation one tick
    pub fn tick(&mut self, input: &InputState, dt: f32) -> UpdateStats {
        let stats = self.registry.update(input, dt);
        self.registry.collision(&self.meshes);
        self.tick_count += 1;

        if stats.flushed > 0 || stats.destroyed > 0 {
            log::debug!(
                "Tick {}: {} flushed, {} destroyed",
                self.tick_count,
                stats.flushed,
                stats.destroyed
            );
        }
        stats
    }

    pub fn draw(&self, surface: &mut dyn RenderSurface) {
        self.registry.draw(surface);
    }

    /// Player position, if one is live
    pub fn player_position(&self) -> Option<Vec3> {
        self.registry
            .first(ObjectTag::Player)
            .map(|player| player.position())
    }

    /// Release every entity and every loaded mesh
    pub fn shutdown(&mut self) {
        self.registry.clear();
        self.meshes.release_all();
        log::info!("World shut down after {} ticks", self.tick_count);
    }
}
