//! # Core Engine Module
//!
//! Shared configuration for every engine subsystem.
//!
//! ## Organization
//!
//! - **Config**: Unified configuration for window, physics, player tuning,
//!   controls, audio and logging

pub mod config;

// Re-export commonly used config types
pub use config::{
    EngineConfig,
    WindowConfig,
    PhysicsConfig,
    PlayerConfig,
    ControlsConfig,
    AudioConfig,
};
pub use crate::config::{Config, ConfigError};
