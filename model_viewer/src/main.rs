//! Headless model viewer
//!
//! Asks for an OBJ path on standard input (empty input selects the configured
//! default), loads the scene, uploads it to the recording backend and drives a
//! short scripted camera fly-through, logging what each frame draws.

use std::io::{self, BufRead, Write};

use scene_engine::foundation::logging;
use scene_engine::prelude::*;
use scene_engine::render::BackendCommand;
use thiserror::Error;

const CONFIG_PATH: &str = "viewer.toml";

/// Fixed timestep of the scripted run, in seconds
const FRAME_TIME: f32 = 1.0 / 60.0;

/// Camera input held for a number of frames
const SCRIPT: &[(CameraInput, u32)] = &[
    (CameraInput::empty(), 1),
    (CameraInput::FORWARD, 30),
    (CameraInput::TURN_LEFT, 45),
    (CameraInput::FORWARD.union(CameraInput::BOOST), 30),
    (CameraInput::LOOK_DOWN, 15),
    (CameraInput::UP, 20),
];

#[derive(Error, Debug)]
enum AppError {
    #[error("failed to read model path: {0}")]
    Input(#[from] io::Error),

    #[error(transparent)]
    Render(#[from] RenderError),
}

fn read_model_path(default_model: &str) -> Result<String, AppError> {
    print!("Enter model path (default {default_model} ): ");
    io::stdout().flush()?;

    let mut line = String::new();
    io::stdin().lock().read_line(&mut line)?;
    let trimmed = line.trim();
    Ok(if trimmed.is_empty() { default_model.to_string() } else { trimmed.to_string() })
}

fn run() -> Result<(), AppError> {
    let config = ViewerConfig::load_or_default(CONFIG_PATH).unwrap_or_else(|e| {
        log::warn!("Ignoring {}: {}", CONFIG_PATH, e);
        ViewerConfig::default()
    });

    let model_path = read_model_path(&config.default_model)?;
    let object = SceneObject::load(&model_path, Transform::from_uniform_scale(config.model_scale));
    if !object.diagnostics().is_empty() {
        log::warn!("{} problem(s) while loading {}", object.diagnostics().len(), model_path);
    }

    let mut backend = RecordingBackend::new();
    let gpu = object.upload(&mut backend)?;
    let viewport = (config.window_width, config.window_height);
    let mut camera = CameraState::from_config(&config);

    let mut frame_index = 0;
    let result = SCRIPT
        .iter()
        .flat_map(|&(input, frames)| std::iter::repeat(input).take(frames as usize))
        .try_for_each(|input| {
            camera.step(input, FRAME_TIME, &config);
            let frame = FrameState::new(&camera, viewport, &config);

            backend.clear(frame.clear_color);
            gpu.render(&frame, &mut backend)?;

            let commands = backend.take_commands();
            let draws = commands
                .iter()
                .filter(|c| matches!(c, BackendCommand::Draw { .. }))
                .count();
            log::debug!(
                "frame {}: camera at ({:.2}, {:.2}, {:.2}), {} draw(s), {} command(s)",
                frame_index,
                camera.position.x,
                camera.position.y,
                camera.position.z,
                draws,
                commands.len()
            );
            frame_index += 1;
            Ok::<(), RenderError>(())
        });

    let stats = object.stats();
    log::info!(
        "Rendered {} frame(s) of {} triangle(s) in {} batch(es)",
        frame_index,
        stats.triangles,
        stats.batches
    );

    gpu.release(&mut backend)?;
    result?;
    Ok(())
}

fn main() {
    logging::init();

    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
