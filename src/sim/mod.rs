//! Simulation module
//!
//! All gameplay logic lives here:
//! - Fixed per-tick order: update, flush, dead collection, contacts
//! - Seeded RNG only
//! - Stable iteration order (tag, then insertion)
//! - No platform dependencies; drawing goes through `RenderSurface`

pub mod actors;
pub mod collision;
pub mod geometry;
pub mod mesh;
pub mod movement;
pub mod object;
pub mod registry;
pub mod world;

pub use actors::{Enemy, Map, Player};
pub use collision::{
    capsule_line, capsule_sphere, line_mesh, line_sphere, shapes_overlap, sphere_line,
    sphere_mesh, sphere_push_back, sphere_sphere,
};
pub use geometry::{Capsule, CollisionShape, LineSegment, Sphere};
pub use mesh::{
    LineHit, MeshHandle, MeshLibrary, MeshQuery, ModelTransform, SphereHits, Triangle,
    TriangleMesh,
};
pub use movement::{MotionClip, MotionState, MovementController, RotationState, RotationStep};
pub use object::{GameObject, ObjectCore, ObjectTag, UpdateContext};
pub use registry::{GameObjectRegistry, ObjectId, UpdateStats};
pub use world::{PLAYER_MESH, PlayScene, STAGE_MESH, World};
