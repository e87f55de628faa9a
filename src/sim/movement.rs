//! Directional movement and stepped turning
//!
//! Raw pad/stick input becomes an intended direction on the XZ plane. The
//! heading never jumps to a new direction that is outside the angular
//! tolerance; instead a rotation sub-machine sweeps it a fixed angle per tick
//! until it reaches the aim or detects it stepped past it.

use glam::Vec3;
use serde::{Deserialize, Serialize};

use crate::input::InputState;
use crate::rotate_toward_y;
use crate::settings::MovementTuning;

/// World-space unit directions for each input
pub const RIGHT: Vec3 = Vec3::new(1.0, 0.0, 0.0);
pub const LEFT: Vec3 = Vec3::new(-1.0, 0.0, 0.0);
pub const UP: Vec3 = Vec3::new(0.0, 0.0, 1.0);
pub const DOWN: Vec3 = Vec3::new(0.0, 0.0, -1.0);

/// Per-tick movement state
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MotionState {
    /// No usable directional input this tick
    #[default]
    Idle,
    /// Input present and heading already aligned
    Moving,
    /// Input present, heading sweeping toward the aim
    Rotating,
}

/// Animation clip the controller wants playing
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MotionClip {
    #[default]
    Idle,
    Run,
}

/// Outcome of one rotation sub-step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RotationStep {
    /// Not rotating; nothing happened
    Settled,
    /// Stepped, aim not reached yet
    Turning,
    /// Reached (or passed and snapped to) the aim this step
    Finished,
}

/// Heading plus the aim it is turning toward
///
/// `aim` is only meaningful while rotating; otherwise `current` is the
/// committed heading.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RotationState {
    current: Vec3,
    aim: Vec3,
    rotating: bool,
}

impl RotationState {
    pub fn new(heading: Vec3) -> Self {
        Self {
            current: heading,
            aim: heading,
            rotating: false,
        }
    }

    #[inline]
    pub fn heading(&self) -> Vec3 {
        self.current
    }

    #[inline]
    pub fn is_rotating(&self) -> bool {
        self.rotating
    }

    /// Aim target, only while rotating
    pub fn aim(&self) -> Option<Vec3> {
        self.rotating.then_some(self.aim)
    }

    /// Start (or retarget) a turn; the current heading is kept for now
    pub fn begin(&mut self, aim: Vec3) {
        self.aim = aim;
        self.rotating = true;
    }

    /// Commit a heading directly and drop any turn in progress
    pub fn snap(&mut self, heading: Vec3) {
        self.current = heading;
        self.aim = heading;
        self.rotating = false;
    }

    /// Sweep the heading one step toward the aim
    pub fn step(&mut self, tuning: &MovementTuning) -> RotationStep {
        if !self.rotating {
            return RotationStep::Settled;
        }

        let stepped = rotate_toward_y(self.current, self.aim, tuning.rotate_step_degrees);
        let before = self.current.cross(self.aim).y;
        let after = stepped.cross(self.aim).y;

        // Sign flip of the vertical cross component: the step went past the aim
        if before * after < 0.0 || tuning.near(stepped, self.aim) {
            self.snap(self.aim);
            return RotationStep::Finished;
        }

        self.current = stepped;
        RotationStep::Turning
    }
}

/// Sum of the unit axis vectors for every active direction
pub fn intended_direction(input: &InputState) -> Vec3 {
    let mut dir = Vec3::ZERO;
    if input.right() {
        dir += RIGHT;
    }
    if input.left() {
        dir += LEFT;
    }
    if input.down() {
        dir += DOWN;
    }
    if input.up() {
        dir += UP;
    }
    dir
}

/// Movement and heading controller owned by one entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MovementController {
    rotation: RotationState,
    velocity: Vec3,
    state: MotionState,
    clip: MotionClip,
    /// Seconds the current clip has been playing
    clip_time: f32,
    tuning: MovementTuning,
}

impl MovementController {
    pub fn new(heading: Vec3, tuning: MovementTuning) -> Self {
        Self {
            rotation: RotationState::new(heading),
            velocity: Vec3::ZERO,
            state: MotionState::Idle,
            clip: MotionClip::Idle,
            clip_time: 0.0,
            tuning,
        }
    }

    #[inline]
    pub fn heading(&self) -> Vec3 {
        self.rotation.heading()
    }

    #[inline]
    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    #[inline]
    pub fn state(&self) -> MotionState {
        self.state
    }

    #[inline]
    pub fn clip(&self) -> MotionClip {
        self.clip
    }

    #[inline]
    pub fn clip_time(&self) -> f32 {
        self.clip_time
    }

    pub fn rotation(&self) -> &RotationState {
        &self.rotation
    }

    /// Advance one tick and return the displacement to apply to the position
    ///
    /// The rotation sub-step runs first, so this tick's motion already uses
    /// the stepped heading.
    pub fn tick(&mut self, input: &InputState, dt: f32) -> Vec3 {
        self.clip_time += dt;

        if self.rotation.step(&self.tuning) == RotationStep::Finished {
            log::debug!("Turn finished, heading {:?}", self.rotation.heading());
        }

        let intent = intended_direction(input);
        if intent.length_squared() < self.tuning.input_threshold_sq {
            self.state = MotionState::Idle;
            self.velocity *= self.tuning.damping;
            self.switch_clip(MotionClip::Idle);
        } else {
            let dir = intent.normalize();
            if self.tuning.near(dir, self.rotation.heading()) {
                self.rotation.snap(dir);
                self.state = MotionState::Moving;
            } else {
                self.rotation.begin(dir);
                self.state = MotionState::Rotating;
            }

            self.velocity = dir + dir * dt * self.tuning.acceleration_rate;
            self.switch_clip(MotionClip::Run);
        }

        self.velocity
    }

    fn switch_clip(&mut self, clip: MotionClip) {
        if self.clip != clip {
            log::debug!("Animation {:?} -> {:?}", self.clip, clip);
            self.clip = clip;
            self.clip_time = 0.0;
        }
    }
}
