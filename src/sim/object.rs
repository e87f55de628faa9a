//! Entity contract shared by everything the registry owns

use glam::Vec3;
use serde::{Deserialize, Serialize};

use super::collision::{line_mesh, sphere_mesh, sphere_push_back};
use super::geometry::{CollisionShape, LineSegment};
use super::mesh::{MeshHandle, MeshQuery};
use crate::input::InputState;
use crate::renderer::RenderSurface;

/// Closed set of entity categories
///
/// Declaration order is the update/draw priority across buckets.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ObjectTag {
    Player,
    Enemy,
    Map,
}

impl ObjectTag {
    /// Every tag, in priority order
    pub const ALL: [ObjectTag; 3] = [ObjectTag::Player, ObjectTag::Enemy, ObjectTag::Map];
    pub const COUNT: usize = Self::ALL.len();

    #[inline]
    pub fn index(self) -> usize {
        self as usize
    }
}

/// State every entity carries
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectCore {
    pub tag: ObjectTag,
    pub alive: bool,
    pub visible: bool,
    pub position: Vec3,
    /// The single collision shape used by the pairwise tests
    pub shape: CollisionShape,
    /// Optional ground probe used for foot placement
    pub foot: Option<LineSegment>,
}

impl ObjectCore {
    pub fn new(tag: ObjectTag, position: Vec3, shape: CollisionShape) -> Self {
        let mut core = Self {
            tag,
            alive: true,
            visible: true,
            position,
            shape,
            foot: None,
        };
        core.sync_shapes();
        core
    }

    pub fn with_foot(mut self, foot: LineSegment) -> Self {
        self.foot = Some(foot);
        self.sync_shapes();
        self
    }

    /// Push the current position into every owned shape
    pub fn sync_shapes(&mut self) {
        self.shape.move_to(self.position);
        if let Some(foot) = self.foot.as_mut() {
            foot.move_to(self.position);
        }
    }

    /// Resolve contact with a static mesh
    ///
    /// Sphere overlap pushes the body out; a foot-line hit then snaps the
    /// position onto the ground. Shapes are re-synced after each correction.
    /// Returns true when either correction was applied.
    pub fn resolve_mesh_contact(&mut self, meshes: &dyn MeshQuery, handle: MeshHandle) -> bool {
        let mut touched = false;

        if let Some(sphere) = self.shape.as_sphere().copied() {
            let hits = sphere_mesh(&sphere, meshes, handle);
            if hits.hit() {
                let push = sphere_push_back(&sphere, &hits);
                self.position += push;
                self.sync_shapes();
                touched = true;
            }
        }

        if let Some(foot) = self.foot {
            let ground = line_mesh(&foot, meshes, handle);
            if ground.hit {
                self.position = ground.point;
                self.sync_shapes();
                touched = true;
            }
        }

        touched
    }
}

/// What an entity may touch during its update
pub struct UpdateContext<'a> {
    /// This tick's input sample
    pub input: &'a InputState,
    /// Entities spawned this tick; they enter the pending list after the
    /// update pass and go live at this tick's flush
    spawned: Vec<Box<dyn GameObject>>,
}

impl<'a> UpdateContext<'a> {
    pub fn new(input: &'a InputState) -> Self {
        Self {
            input,
            spawned: Vec::new(),
        }
    }

    pub fn spawn(&mut self, object: Box<dyn GameObject>) {
        self.spawned.push(object);
    }

    pub(crate) fn take_spawned(&mut self) -> Vec<Box<dyn GameObject>> {
        std::mem::take(&mut self.spawned)
    }
}

/// An entity owned by the registry
pub trait GameObject {
    fn core(&self) -> &ObjectCore;
    fn core_mut(&mut self) -> &mut ObjectCore;

    /// Advance one tick
    fn update(&mut self, ctx: &mut UpdateContext<'_>, dt: f32);

    /// Push this entity to the render surface
    fn draw(&self, surface: &mut dyn RenderSurface);

    /// React to a potential contact with `other`
    ///
    /// The registry dispatches every pair of its interaction matrix; the
    /// entity decides whether they actually touch.
    fn on_collision_enter(&mut self, other: &dyn GameObject, meshes: &dyn MeshQuery);

    /// Static mesh this entity collides as, if any
    fn collision_model(&self) -> Option<MeshHandle> {
        None
    }

    fn tag(&self) -> ObjectTag {
        self.core().tag
    }

    fn is_alive(&self) -> bool {
        self.core().alive
    }

    fn is_visible(&self) -> bool {
        self.core().visible
    }

    fn position(&self) -> Vec3 {
        self.core().position
    }

    fn collision_shape(&self) -> &CollisionShape {
        &self.core().shape
    }
}
