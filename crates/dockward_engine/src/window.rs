//! GLFW window and keyboard polling

use crate::core::WindowConfig;
use crate::input::{InputSource, KeyCode};
use thiserror::Error;

/// Window management errors
#[derive(Error, Debug)]
pub enum WindowError {
    /// GLFW could not be initialized
    #[error("GLFW initialization failed")]
    InitializationFailed,

    /// The window could not be created
    #[error("Window creation failed")]
    CreationFailed,
}

/// Result alias for window operations
pub type WindowResult<T> = Result<T, WindowError>;

/// GLFW window
///
/// Input is read straight from GLFW's key state, so a key is "down" exactly
/// while the OS reports it held.
pub struct Window {
    glfw: glfw::Glfw,
    window: glfw::PWindow,
    events: glfw::GlfwReceiver<(f64, glfw::WindowEvent)>,
}

impl Window {
    /// Open a window sized and titled from `config`
    pub fn new(config: &WindowConfig) -> WindowResult<Self> {
        let mut glfw = glfw::init(glfw::fail_on_errors).map_err(|_| WindowError::InitializationFailed)?;

        glfw.window_hint(glfw::WindowHint::ClientApi(glfw::ClientApiHint::NoApi));
        glfw.window_hint(glfw::WindowHint::Resizable(true));

        let (mut window, events) = glfw
            .create_window(config.width, config.height, &config.title, glfw::WindowMode::Windowed)
            .ok_or(WindowError::CreationFailed)?;

        window.set_close_polling(true);
        window.set_framebuffer_size_polling(true);

        log::info!("Opened {}x{} window '{}'", config.width, config.height, config.title);
        Ok(Self { glfw, window, events })
    }

    /// Whether the user closed the window
    pub fn should_close(&self) -> bool {
        self.window.should_close()
    }

    /// Request the window to close after this frame
    pub fn set_should_close(&mut self, should_close: bool) {
        self.window.set_should_close(should_close);
    }

    /// Pump the OS event queue; never blocks
    pub fn poll_events(&mut self) {
        self.glfw.poll_events();
        for (_, event) in glfw::flush_messages(&self.events) {
            match event {
                glfw::WindowEvent::Close => log::debug!("Window close requested"),
                glfw::WindowEvent::FramebufferSize(width, height) => {
                    log::debug!("Framebuffer resized to {}x{}", width, height);
                }
                _ => {}
            }
        }
    }

    /// Framebuffer size in pixels
    pub fn framebuffer_size(&self) -> (u32, u32) {
        let (width, height) = self.window.get_framebuffer_size();
        (width.max(0) as u32, height.max(0) as u32)
    }

    /// Seconds since GLFW was initialized
    pub fn time(&self) -> f64 {
        self.glfw.get_time()
    }
}

impl InputSource for Window {
    fn is_key_down(&self, key: KeyCode) -> bool {
        self.window.get_key(glfw_key(key)) == glfw::Action::Press
    }
}

fn glfw_key(key: KeyCode) -> glfw::Key {
    match key {
        KeyCode::A => glfw::Key::A,
        KeyCode::D => glfw::Key::D,
        KeyCode::E => glfw::Key::E,
        KeyCode::P => glfw::Key::P,
        KeyCode::Q => glfw::Key::Q,
        KeyCode::S => glfw::Key::S,
        KeyCode::W => glfw::Key::W,
        KeyCode::Space => glfw::Key::Space,
        KeyCode::Enter => glfw::Key::Enter,
        KeyCode::Escape => glfw::Key::Escape,
        KeyCode::LeftShift => glfw::Key::LeftShift,
        KeyCode::Up => glfw::Key::Up,
        KeyCode::Down => glfw::Key::Down,
        KeyCode::Left => glfw::Key::Left,
        KeyCode::Right => glfw::Key::Right,
    }
}
