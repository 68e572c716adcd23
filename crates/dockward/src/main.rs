//! Project Dock-Ward
//!
//! Loads `dockward.toml`, builds the level sequence and runs it, either in a
//! GLFW window (`--features window`) or headless with a scripted player.
//!
//! `dockward --export-levels <dir>` writes the built-in levels as RON files
//! and exits.

mod config;
mod levels;

use config::GameConfig;
use dockward_engine::audio::AudioEngine;
use dockward_engine::config::{Config, ConfigError};
use dockward_engine::foundation::logging;
use dockward_engine::render::{DrawList, ResourceCache};
use dockward_engine::scene::Scene;
use dockward_engine::{App, AppError};
use std::path::PathBuf;
use thiserror::Error;

const CONFIG_PATH: &str = "dockward.toml";

#[derive(Error, Debug)]
enum GameError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    App(#[from] AppError),

    #[cfg(feature = "window")]
    #[error(transparent)]
    Window(#[from] dockward_engine::window::WindowError),

    #[error("usage: dockward [--export-levels <dir>]")]
    Usage,
}

fn main() {
    let config = GameConfig::load_or_default(CONFIG_PATH);
    let filter = config
        .as_ref()
        .map_or("info", |config| config.engine.log_level.as_str());
    logging::init(filter);

    let result = config.map_err(GameError::from).and_then(run);
    if let Err(err) = result {
        log::error!("{}", err);
        std::process::exit(1);
    }
}

fn run(config: GameConfig) -> Result<(), GameError> {
    config.validate()?;

    let mut args = std::env::args().skip(1);
    match args.next().as_deref() {
        None => {}
        Some("--export-levels") => {
            let dir = args.next().map(PathBuf::from).ok_or(GameError::Usage)?;
            std::fs::create_dir_all(&dir).map_err(ConfigError::Io)?;
            for path in levels::save_builtin_levels(&dir)? {
                log::info!("Wrote {}", path.display());
            }
            return Ok(());
        }
        Some(_) => return Err(GameError::Usage),
    }

    #[cfg(feature = "audio")]
    let audio = dockward_engine::audio::RodioAudio::new(config.engine.audio.master_volume);
    #[cfg(not(feature = "audio"))]
    let audio = dockward_engine::audio::SilentAudio::new();

    play(&config, audio)
}

fn play<A: AudioEngine>(config: &GameConfig, audio: A) -> Result<(), GameError> {
    let mut app = App::new(config.engine.clone(), audio, DrawList::new())?;
    let mut resources = ResourceCache::new(&config.game.resources_dir);

    for level in levels::load_levels(&config.game.levels)? {
        let scene = Scene::from_level(&config.engine, &level, &mut resources).map_err(AppError::from)?;
        app.push_level(scene)?;
    }
    log::info!("Queued {} levels", app.scenes().remaining());

    let result = main_loop(config, &mut app);
    app.shutdown()?;
    result
}

#[cfg(feature = "window")]
fn main_loop<A: AudioEngine>(config: &GameConfig, app: &mut App<A, DrawList>) -> Result<(), GameError> {
    let mut window = dockward_engine::window::Window::new(&config.engine.window)?;

    while !window.should_close() {
        window.poll_events();
        let status = app.tick_frame(&window)?;
        if status.should_exit() {
            log::info!("Exiting: {:?}", status);
            window.set_should_close(true);
        }
    }
    Ok(())
}

#[cfg(not(feature = "window"))]
fn main_loop<A: AudioEngine>(config: &GameConfig, app: &mut App<A, DrawList>) -> Result<(), GameError> {
    use dockward_engine::input::KeyboardState;
    use dockward_engine::FrameStatus;

    const DT: f32 = 1.0 / 60.0;
    let controls = &config.engine.controls;
    let mut keys = KeyboardState::new();
    keys.press(controls.right);

    for frame in 0..config.game.headless_frames {
        // Hop every second and a half.
        keys.set(controls.jump, frame % 90 < 5);

        let status = app.frame(&keys, DT)?;
        if status.should_exit() {
            log::info!("Headless run ended after {} frames: {:?}", frame + 1, status);
            return Ok(());
        }
        if status == FrameStatus::Running && frame % 300 == 0 {
            if let Some(scene) = app.scenes().active() {
                log::info!("Frame {}: level '{}'", frame, scene.name());
            }
        }
    }

    log::info!(
        "Headless run stopped after {} frames with {} levels left",
        config.game.headless_frames,
        app.scenes().remaining()
    );
    Ok(())
}
