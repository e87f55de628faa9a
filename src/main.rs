//! Runfield entry point
//!
//! Headless native demo: builds the play scene, drives it with a scripted
//! input device at the target frame rate, and logs where everyone ended up.
//!
//! Usage: `runfield [settings.json] [stage.json]`

#[cfg(not(target_arch = "wasm32"))]
use std::process::ExitCode;

#[cfg(not(target_arch = "wasm32"))]
use runfield::platform::{FramePacer, ScriptedInput, run_loop};
#[cfg(not(target_arch = "wasm32"))]
use runfield::renderer::DrawList;
#[cfg(not(target_arch = "wasm32"))]
use runfield::sim::{ObjectTag, PLAYER_MESH, STAGE_MESH, TriangleMesh, World};
#[cfg(not(target_arch = "wasm32"))]
use runfield::{InputState, PadButtons, Settings};

#[cfg(not(target_arch = "wasm32"))]
const DEMO_ENEMIES: usize = 3;
#[cfg(not(target_arch = "wasm32"))]
const DEFAULT_STAGE_HALF_EXTENT: f32 = 5000.0;

#[cfg(not(target_arch = "wasm32"))]
fn main() -> ExitCode {
    env_logger::init();
    log::info!("Runfield (native) starting...");

    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            log::error!("Startup failed: {}", err);
            ExitCode::FAILURE
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // No browser host; the library is usable on its own
}

#[cfg(not(target_arch = "wasm32"))]
fn run() -> Result<(), Box<dyn std::error::Error>> {
    let mut args = std::env::args().skip(1);

    let settings = match args.next() {
        Some(path) => Settings::load(path)?,
        None => Settings::default(),
    };
    let stage = match args.next() {
        Some(path) => TriangleMesh::from_file(path)?,
        None => TriangleMesh::floor(DEFAULT_STAGE_HALF_EXTENT, 0.0),
    };

    let mut pacer = FramePacer::from_settings(&settings);
    let mut world = World::new(settings);
    world.meshes_mut().register(STAGE_MESH, stage);
    world
        .meshes_mut()
        .register(PLAYER_MESH, TriangleMesh::floor(1.0, 0.0));
    world.setup_play(DEMO_ENEMIES)?;

    let mut device = demo_script();
    let mut surface = DrawList::new();
    let frames = run_loop(&mut world, &mut device, &mut surface, &mut pacer);

    if let Some(player) = world.registry().first(ObjectTag::Player) {
        log::info!("Player finished at {:?}", player.position());
    }
    for (i, enemy) in world.registry().iter(ObjectTag::Enemy).enumerate() {
        log::info!("Enemy {} finished at {:?}", i, enemy.position());
    }
    log::info!(
        "{} frames, {} draw calls in the last frame",
        frames,
        surface.commands.len()
    );

    world.shutdown();
    Ok(())
}

/// Stand, run right, turn up, cut diagonally, then stop
#[cfg(not(target_arch = "wasm32"))]
fn demo_script() -> ScriptedInput {
    ScriptedInput::new()
        .hold(InputState::default(), 30)
        .hold(InputState::pad(PadButtons::RIGHT), 60)
        .hold(InputState::pad(PadButtons::UP), 60)
        .hold(InputState::pad(PadButtons::LEFT | PadButtons::UP), 30)
        .hold(InputState::stick(0, 800), 30)
        .hold(InputState::default(), 30)
}
