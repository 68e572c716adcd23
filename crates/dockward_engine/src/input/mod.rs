//! Input state queries
//!
//! The scene only ever asks "is this key down right now?". Edge detection
//! (released -> pressed) is state the scene keeps itself, so any source that
//! can answer that question drives the game: the GLFW window, a scripted
//! keyboard in tests, or the headless demo loop.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

/// Polled key-state source, queried once per frame at the start of `Scene::update`
pub trait InputSource {
    /// Whether `key` is held down this frame
    fn is_key_down(&self, key: KeyCode) -> bool;
}

/// Key codes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeyCode {
    /// A key
    A,
    /// D key
    D,
    /// E key
    E,
    /// P key
    P,
    /// Q key
    Q,
    /// S key
    S,
    /// W key
    W,
    /// Space key
    Space,
    /// Enter key
    Enter,
    /// Escape key
    Escape,
    /// Left shift
    LeftShift,
    /// Up arrow
    Up,
    /// Down arrow
    Down,
    /// Left arrow
    Left,
    /// Right arrow
    Right,
}

/// Explicit key-state set
///
/// Used for headless runs and tests; the window backend snapshots into the
/// same shape.
#[derive(Debug, Clone, Default)]
pub struct KeyboardState {
    down: HashSet<KeyCode>,
}

impl KeyboardState {
    /// Create an empty keyboard (nothing pressed)
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark a key pressed or released
    pub fn set(&mut self, key: KeyCode, pressed: bool) {
        if pressed {
            self.down.insert(key);
        } else {
            self.down.remove(&key);
        }
    }

    /// Press a key
    pub fn press(&mut self, key: KeyCode) {
        self.set(key, true);
    }

    /// Release a key
    pub fn release(&mut self, key: KeyCode) {
        self.set(key, false);
    }

    /// Release every key
    pub fn clear(&mut self) {
        self.down.clear();
    }
}

impl InputSource for KeyboardState {
    fn is_key_down(&self, key: KeyCode) -> bool {
        self.down.contains(&key)
    }
}

/// Edge detector for a single binary input (released -> pressed)
#[derive(Debug, Clone, Copy, Default)]
pub struct KeyEdge {
    was_down: bool,
}

impl KeyEdge {
    /// Feed this frame's state; returns `true` only on the frame the key goes down
    pub fn pressed(&mut self, is_down: bool) -> bool {
        let edge = is_down && !self.was_down;
        self.was_down = is_down;
        edge
    }
}
