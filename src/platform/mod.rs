//! Platform layer for the native loop
//!
//! Handles the pieces the simulation leaves to its host:
//! - Input sampling (one `InputState` per frame)
//! - Frame pacing (spin-wait down to the target rate, measured delta time)
//! - The outer loop that ticks and draws the world

use std::collections::VecDeque;
use std::time::{Duration, Instant};

use crate::input::InputState;
use crate::renderer::RenderSurface;
use crate::settings::Settings;
use crate::sim::World;

/// Largest delta time handed to the simulation after a stall (seconds)
pub const MAX_FRAME_DT: f32 = 0.1;

/// Source of per-frame input
pub trait InputDevice {
    /// Sample input for the next frame; `None` ends the loop
    fn poll(&mut self) -> Option<InputState>;
}

/// Input device that replays a fixed script
#[derive(Debug, Clone, Default)]
pub struct ScriptedInput {
    frames: VecDeque<InputState>,
}

impl ScriptedInput {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append `frames` frames of the same input
    pub fn hold(mut self, input: InputState, frames: usize) -> Self {
        self.frames.extend(std::iter::repeat_n(input, frames));
        self
    }

    /// Frames left to replay
    pub fn remaining(&self) -> usize {
        self.frames.len()
    }
}

impl InputDevice for ScriptedInput {
    fn poll(&mut self) -> Option<InputState> {
        self.frames.pop_front()
    }
}

/// Soft frame limiter
///
/// `wait` spins until at least the minimum frame duration has passed since
/// the previous call and returns the measured delta time.
#[derive(Debug)]
pub struct FramePacer {
    min_frame: Duration,
    last: Instant,
}

impl FramePacer {
    pub fn new(min_frame: Duration) -> Self {
        Self {
            min_frame,
            last: Instant::now(),
        }
    }

    pub fn from_settings(settings: &Settings) -> Self {
        Self::new(settings.min_frame_duration())
    }

    pub fn min_frame(&self) -> Duration {
        self.min_frame
    }

    /// Block until the frame budget is used up; returns seconds since the last call
    pub fn wait(&mut self) -> f32 {
        while self.last.elapsed() < self.min_frame {
            std::hint::spin_loop();
        }
        let now = Instant::now();
        let dt = now.duration_since(self.last).as_secs_f32();
        self.last = now;
        dt.min(MAX_FRAME_DT)
    }
}

/// Poll, tick and draw until the device runs dry; returns the frame count
pub fn run_loop(
    world: &mut World,
    device: &mut dyn InputDevice,
    surface: &mut dyn RenderSurface,
    pacer: &mut FramePacer,
) -> u64 {
    log::info!(
        "Loop started ({:.2} ms minimum frame)",
        pacer.min_frame().as_secs_f64() * 1000.0
    );

    let mut frames = 0u64;
    while let Some(input) = device.poll() {
        let dt = pacer.wait();
        world.tick(&input, dt);

        surface.begin_frame();
        world.draw(surface);
        frames += 1;
    }

    log::info!("Loop stopped after {} frames", frames);
    frames
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::input::PadButtons;
    use crate::renderer::DrawList;
    use crate::sim::mesh::TriangleMesh;
    use crate::sim::{PLAYER_MESH, STAGE_MESH};

    #[test]
    fn test_scripted_input_replays_in_order() {
        let right = InputState::pad(PadButtons::RIGHT);
        let mut device = ScriptedInput::new()
            .hold(right, 2)
            .hold(InputState::default(), 1);

        assert_eq!(device.remaining(), 3);
        assert_eq!(device.poll(), Some(right));
        assert_eq!(device.poll(), Some(right));
        assert_eq!(device.poll(), Some(InputState::default()));
        assert_eq!(device.poll(), None);
    }

    #[test]
    fn test_pacer_waits_for_min_frame() {
        let mut pacer = FramePacer::new(Duration::from_millis(2));
        let start = Instant::now();
        let dt = pacer.wait();
        assert!(start.elapsed() >= Duration::from_millis(1));
        assert!(dt > 0.0 && dt <= MAX_FRAME_DT);
    }

    #[test]
    fn test_pacer_clamps_stalls() {
        let mut pacer = FramePacer::new(Duration::ZERO);
        std::thread::sleep(Duration::from_millis(150));
        assert_eq!(pacer.wait(), MAX_FRAME_DT);
    }

    #[test]
    fn test_run_loop_draws_each_frame() {
        let mut world = World::new(Settings::default());
        world
            .meshes_mut()
            .register(STAGE_MESH, TriangleMesh::floor(10_000.0, 0.0));
        world
            .meshes_mut()
            .register(PLAYER_MESH, TriangleMesh::floor(1.0, 0.0));
        world.setup_play(1).unwrap();

        let mut device = ScriptedInput::new().hold(InputState::pad(PadButtons::UP), 5);
        let mut surface = DrawList::new();
        let mut pacer = FramePacer::new(Duration::ZERO);

        let frames = run_loop(&mut world, &mut device, &mut surface, &mut pacer);
        assert_eq!(frames, 5);
        assert_eq!(world.tick_count(), 5);
        // Only the last frame is kept: map, player, enemy
        assert_eq!(surface.model_count(), 3);
        assert!(world.player_position().is_some_and(|p| p.z > 0.0));
    }
}
