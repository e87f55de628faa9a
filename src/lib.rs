//! Runfield - entity lifecycle and sphere/mesh collision core for a 3D action game
//!
//! Core modules:
//! - `sim`: Simulation (entity registry, collision geometry, movement, world context)
//! - `renderer`: Render surface abstraction the simulation draws into
//! - `platform`: Input device and frame pacing for the outer loop
//! - `settings`: Data-driven tuning loaded from JSON
//! - `error`: Asset and configuration errors

pub mod error;
pub mod input;
pub mod platform;
pub mod renderer;
pub mod settings;
pub mod sim;

pub use error::{AssetError, ConfigError};
pub use input::{InputState, PadButtons};
pub use settings::{MovementTuning, ReleasePolicy, Settings};

use glam::{Quat, Vec3};

/// Game configuration constants
pub mod consts {
    use glam::Vec3;

    /// Target simulation rate (soft 60 Hz, spin-waited)
    pub const TICK_RATE_HZ: u32 = 60;

    /// Velocity multiplier applied every tick without directional input
    pub const VELOCITY_DAMPING: f32 = 0.9;
    /// Acceleration rate added along the input direction (units/s)
    pub const ACCELERATION_RATE: f32 = 200.0;
    /// Heading sweep per tick while rotating
    pub const ROTATE_STEP_DEGREES: f32 = 10.0;
    /// Two unit directions closer than this cosine are treated as equal (~8.1°)
    pub const NEAR_ANGLE_COS: f32 = 0.99;
    /// Combined input vectors shorter than this (squared) count as no input
    pub const INPUT_THRESHOLD_SQ: f32 = 0.5;

    /// Player collision sphere (model space)
    pub const PLAYER_SPHERE_CENTER: Vec3 = Vec3::new(0.0, 50.0, 0.0);
    pub const PLAYER_SPHERE_RADIUS: f32 = 30.0;
    /// Player foot line used for ground snapping
    pub const PLAYER_FOOT_START: Vec3 = Vec3::new(0.0, 20.0, 0.0);
    pub const PLAYER_FOOT_END: Vec3 = Vec3::new(0.0, -30.0, 0.0);
    /// Player model draw scale
    pub const PLAYER_MODEL_SCALE: f32 = 0.01;

    /// Enemy collision sphere (model space)
    pub const ENEMY_SPHERE_CENTER: Vec3 = Vec3::new(0.0, 40.0, 0.0);
    pub const ENEMY_SPHERE_RADIUS: f32 = 25.0;
    /// Ticks between enemy wander decisions
    pub const ENEMY_WANDER_TICKS: u32 = 90;
}

/// True when two unit vectors point within the angular tolerance of each other
#[inline]
pub fn is_near_angle(a: Vec3, b: Vec3) -> bool {
    a.dot(b) >= consts::NEAR_ANGLE_COS
}

/// Rotate `dir` about the vertical axis by `degrees`, turning toward `aim`
///
/// The turn direction is picked from the sign of `(dir × aim).y`. Exactly
/// opposite directions have no preferred side and turn by a positive angle.
pub fn rotate_toward_y(dir: Vec3, aim: Vec3, degrees: f32) -> Vec3 {
    let side = dir.cross(aim).y;
    let step = degrees.to_radians();
    // Positive rotation about +Y carries +X toward -Z, so a negative cross.y
    // (aim counter-clockwise seen from above) needs a negative angle.
    let angle = if side.abs() <= f32::EPSILON { step } else { step.copysign(side) };
    Quat::from_rotation_y(angle) * dir
}
