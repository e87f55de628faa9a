//! Concrete entities: the player, wandering enemies and the stage

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;

use super::collision::shapes_overlap;
use super::geometry::{CollisionShape, LineSegment, Sphere};
use super::mesh::{MeshHandle, MeshQuery, ModelTransform};
use super::movement::MovementController;
use super::object::{GameObject, ObjectCore, ObjectTag, UpdateContext};
use crate::consts::*;
use crate::input::{InputState, PadButtons};
use crate::renderer::{RenderSurface, draw_segment, draw_shape};
use crate::settings::Settings;

/// Model faces away from its heading: rotate 180° about Y
fn model_facing(heading: Vec3) -> Vec3 {
    Vec3::new(-heading.x, heading.y, -heading.z)
}

fn draw_colliders(core: &ObjectCore, surface: &mut dyn RenderSurface) {
    draw_shape(surface, &core.shape);
    if let Some(foot) = &core.foot {
        draw_segment(surface, foot);
    }
}

/// Pad-driven player character
pub struct Player {
    core: ObjectCore,
    movement: MovementController,
    model: MeshHandle,
    debug_colliders: bool,
    /// Ticks on which the player sphere touched an enemy
    enemy_contacts: u32,
}

impl Player {
    pub fn new(model: MeshHandle, settings: &Settings) -> Self {
        let core = ObjectCore::new(
            ObjectTag::Player,
            Vec3::ZERO,
            CollisionShape::Sphere(Sphere::new(PLAYER_SPHERE_CENTER, PLAYER_SPHERE_RADIUS)),
        )
        .with_foot(LineSegment::new(PLAYER_FOOT_START, PLAYER_FOOT_END));

        Self {
            core,
            movement: MovementController::new(Vec3::X, settings.movement),
            model,
            debug_colliders: settings.debug_draw_colliders,
            enemy_contacts: 0,
        }
    }

    pub fn at(mut self, position: Vec3) -> Self {
        self.core.position = position;
        self.core.sync_shapes();
        self
    }

    pub fn movement(&self) -> &MovementController {
        &self.movement
    }

    pub fn heading(&self) -> Vec3 {
        self.movement.heading()
    }

    pub fn enemy_contacts(&self) -> u32 {
        self.enemy_contacts
    }

    pub fn model_transform(&self) -> ModelTransform {
        ModelTransform {
            position: self.core.position,
            scale: Vec3::splat(PLAYER_MODEL_SCALE),
            facing: model_facing(self.heading()),
        }
    }
}

impl GameObject for Player {
    fn core(&self) -> &ObjectCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ObjectCore {
        &mut self.core
    }

    fn update(&mut self, ctx: &mut UpdateContext<'_>, dt: f32) {
        let delta = self.movement.tick(ctx.input, dt);
        self.core.position += delta;
        self.core.sync_shapes();
    }

    fn draw(&self, surface: &mut dyn RenderSurface) {
        surface.draw_model(self.model, self.model_transform());
        if self.debug_colliders {
            draw_colliders(&self.core, surface);
        }
    }

    fn on_collision_enter(&mut self, other: &dyn GameObject, meshes: &dyn MeshQuery) {
        match other.tag() {
            ObjectTag::Map => {
                if let Some(handle) = other.collision_model() {
                    self.core.resolve_mesh_contact(meshes, handle);
                }
            }
            ObjectTag::Enemy => {
                if shapes_overlap(&self.core.shape, other.collision_shape()) == Some(true) {
                    self.enemy_contacts += 1;
                    log::debug!("Player touched enemy at {:?}", other.position());
                }
            }
            ObjectTag::Player => {}
        }
    }
}

/// Enemy that wanders in random pad directions
pub struct Enemy {
    core: ObjectCore,
    movement: MovementController,
    model: Option<MeshHandle>,
    rng: Pcg32,
    /// Direction currently held
    wander: InputState,
    /// Ticks until the next wander decision
    wander_ticks: u32,
    debug_colliders: bool,
}

impl Enemy {
    pub fn new(position: Vec3, seed: u64, settings: &Settings) -> Self {
        let core = ObjectCore::new(
            ObjectTag::Enemy,
            position,
            CollisionShape::Sphere(Sphere::new(ENEMY_SPHERE_CENTER, ENEMY_SPHERE_RADIUS)),
        )
        .with_foot(LineSegment::new(PLAYER_FOOT_START, PLAYER_FOOT_END));

        Self {
            core,
            movement: MovementController::new(Vec3::NEG_X, settings.movement),
            model: None,
            rng: Pcg32::seed_from_u64(seed),
            wander: InputState::default(),
            wander_ticks: 0,
            debug_colliders: settings.debug_draw_colliders,
        }
    }

    pub fn with_model(mut self, model: MeshHandle) -> Self {
        self.model = Some(model);
        self
    }

    pub fn movement(&self) -> &MovementController {
        &self.movement
    }

    /// Direction currently held
    pub fn wander(&self) -> InputState {
        self.wander
    }

    fn next_wander(&mut self) {
        // Any combination of the four directions, including none
        let bits = self.rng.random_range(0..16u32);
        self.wander = InputState::pad(PadButtons::from_bits_truncate(bits));
        self.wander_ticks = ENEMY_WANDER_TICKS;
    }
}

impl GameObject for Enemy {
    fn core(&self) -> &ObjectCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ObjectCore {
        &mut self.core
    }

    fn update(&mut self, _ctx: &mut UpdateContext<'_>, dt: f32) {
        if self.wander_ticks == 0 {
            self.next_wander();
        }
        self.wander_ticks -= 1;

        let delta = self.movement.tick(&self.wander, dt);
        self.core.position += delta;
        self.core.sync_shapes();
    }

    fn draw(&self, surface: &mut dyn RenderSurface) {
        if let Some(model) = self.model {
            surface.draw_model(
                model,
                ModelTransform {
                    position: self.core.position,
                    scale: Vec3::splat(PLAYER_MODEL_SCALE),
                    facing: model_facing(self.movement.heading()),
                },
            );
        }
        if self.debug_colliders {
            draw_colliders(&self.core, surface);
        }
    }

    fn on_collision_enter(&mut self, other: &dyn GameObject, meshes: &dyn MeshQuery) {
        if other.tag() == ObjectTag::Map {
            if let Some(handle) = other.collision_model() {
                self.core.resolve_mesh_contact(meshes, handle);
            }
        }
    }
}

/// Static stage geometry
pub struct Map {
    core: ObjectCore,
    model: MeshHandle,
    transform: ModelTransform,
}

impl Map {
    pub fn new(model: MeshHandle, transform: ModelTransform) -> Self {
        Self {
            core: ObjectCore::new(ObjectTag::Map, transform.position, CollisionShape::None),
            model,
            transform,
        }
    }
}

impl GameObject for Map {
    fn core(&self) -> &ObjectCore {
        &self.core
    }

    fn core_mut(&mut self) -> &mut ObjectCore {
        &mut self.core
    }

    fn update(&mut self, _ctx: &mut UpdateContext<'_>, _dt: f32) {}

    fn draw(&self, surface: &mut dyn RenderSurface) {
        surface.draw_model(self.model, self.transform);
    }

    // Maps only ever appear as the `other` side of a contact
    fn on_collision_enter(&mut self, _other: &dyn GameObject, _meshes: &dyn MeshQuery) {}

    fn collision_model(&self) -> Option<MeshHandle> {
        Some(self.model)
    }
}
