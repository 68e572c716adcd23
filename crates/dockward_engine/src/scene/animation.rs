//! Scripted linear motion
//!
//! Doors, lifts and platforms move between two fixed endpoints. A clamped
//! timer runs once and stops at the far end; a wrapping timer restarts from
//! the near end every `duration` seconds.

use crate::ecs::Entity;
use crate::foundation::math::{utils, Vec3};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// How an interpolation timer behaves past its duration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum TimerMode {
    /// `t = min(elapsed, duration) / duration`
    #[default]
    Clamped,
    /// `t = (elapsed mod duration) / duration`
    Wrapping,
}

/// Normalized progress over a fixed duration
#[derive(Debug, Clone, PartialEq)]
pub struct InterpolationTimer {
    duration: f32,
    elapsed: f32,
    mode: TimerMode,
}

impl InterpolationTimer {
    /// Create a timer at `t = 0`
    pub fn new(duration: f32, mode: TimerMode) -> Self {
        Self {
            duration,
            elapsed: 0.0,
            mode,
        }
    }

    /// Advance by `dt` seconds (non-positive or non-finite deltas are ignored)
    pub fn advance(&mut self, dt: f32) {
        if !dt.is_finite() || dt <= 0.0 || self.duration <= 0.0 {
            return;
        }
        self.elapsed = match self.mode {
            TimerMode::Clamped => (self.elapsed + dt).min(self.duration),
            TimerMode::Wrapping => (self.elapsed + dt) % self.duration,
        };
    }

    /// Progress in `[0, 1]` (clamped) or `[0, 1)` (wrapping)
    pub fn t(&self) -> f32 {
        if self.duration <= 0.0 {
            return match self.mode {
                TimerMode::Clamped => 1.0,
                TimerMode::Wrapping => 0.0,
            };
        }
        match self.mode {
            TimerMode::Clamped => self.elapsed.min(self.duration) / self.duration,
            TimerMode::Wrapping => {
                let t = (self.elapsed % self.duration) / self.duration;
                if t < 1.0 {
                    t
                } else {
                    0.0
                }
            }
        }
    }

    /// Seconds since start, wrapped for wrapping timers
    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Length of one run
    pub fn duration(&self) -> f32 {
        self.duration
    }

    /// Timer mode
    pub fn mode(&self) -> TimerMode {
        self.mode
    }

    /// A clamped timer that reached the end; wrapping timers never finish
    pub fn is_finished(&self) -> bool {
        self.mode == TimerMode::Clamped && self.t() >= 1.0
    }

    /// Back to `t = 0`
    pub fn reset(&mut self) {
        self.elapsed = 0.0;
    }
}

/// Playback state of an animation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnimationState {
    /// Waiting for a start trigger
    Idle,
    /// Advancing every frame
    Running,
    /// Clamped animation that reached its end
    Finished,
}

/// Linear motion of one entity between two points
#[derive(Debug, Clone)]
pub struct Animation {
    /// Entity being moved
    pub target: Entity,
    /// Position at `t = 0`
    pub from: Vec3,
    /// Position at `t = 1`
    pub to: Vec3,
    timer: InterpolationTimer,
    state: AnimationState,
}

impl Animation {
    /// Create an idle animation
    pub fn new(target: Entity, from: Vec3, to: Vec3, timer: InterpolationTimer) -> Self {
        Self {
            target,
            from,
            to,
            timer,
            state: AnimationState::Idle,
        }
    }

    /// Current playback state
    pub fn state(&self) -> AnimationState {
        self.state
    }

    /// Underlying timer
    pub fn timer(&self) -> &InterpolationTimer {
        &self.timer
    }

    /// Position for the timer's current progress
    pub fn position(&self) -> Vec3 {
        utils::lerp_vec3(&self.from, &self.to, self.timer.t())
    }
}

/// Position produced by one animation this frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationStep {
    /// Entity to move
    pub target: Entity,
    /// New position
    pub position: Vec3,
}

/// Named animations of a scene, advanced in insertion order
#[derive(Debug, Default)]
pub struct Animator {
    animations: Vec<(String, Animation)>,
    index: HashMap<String, usize>,
}

impl Animator {
    /// Create an empty animator
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an animation, replacing any with the same name
    pub fn insert(&mut self, name: impl Into<String>, animation: Animation) {
        let name = name.into();
        match self.index.get(&name) {
            Some(&slot) => self.animations[slot].1 = animation,
            None => {
                self.index.insert(name.clone(), self.animations.len());
                self.animations.push((name, animation));
            }
        }
    }

    /// Look up an animation by name
    pub fn get(&self, name: &str) -> Option<&Animation> {
        self.index.get(name).map(|&slot| &self.animations[slot].1)
    }

    /// Number of animations
    pub fn len(&self) -> usize {
        self.animations.len()
    }

    /// Whether there are no animations
    pub fn is_empty(&self) -> bool {
        self.animations.is_empty()
    }

    /// Start an idle animation
    ///
    /// Starting one that is already running or finished does nothing, so a
    /// trigger that keeps firing while the player stands on it is harmless.
    /// Returns `false` for unknown names.
    pub fn start(&mut self, name: &str) -> bool {
        let Some(&slot) = self.index.get(name) else {
            log::debug!("No animation named {}", name);
            return false;
        };
        let animation = &mut self.animations[slot].1;
        if animation.state == AnimationState::Idle {
            log::debug!("Starting animation {}", name);
            animation.state = AnimationState::Running;
        }
        true
    }

    /// Rewind an animation and start it again
    pub fn restart(&mut self, name: &str) -> bool {
        let Some(&slot) = self.index.get(name) else {
            return false;
        };
        let animation = &mut self.animations[slot].1;
        animation.timer.reset();
        animation.state = AnimationState::Running;
        true
    }

    /// Advance every running animation by `dt`
    pub fn advance(&mut self, dt: f32) -> Vec<AnimationStep> {
        let mut steps = Vec::new();
        for (name, animation) in &mut self.animations {
            if animation.state != AnimationState::Running {
                continue;
            }
            animation.timer.advance(dt);
            steps.push(AnimationStep {
                target: animation.target,
                position: animation.position(),
            });
            if animation.timer.is_finished() {
                log::debug!("Animation {} finished", name);
                animation.state = AnimationState::Finished;
            }
        }
        steps
    }

    /// Drop animations driving `entity`
    pub fn remove_target(&mut self, entity: Entity) {
        self.animations.retain(|(_, animation)| animation.target != entity);
        self.index = self
            .animations
            .iter()
            .enumerate()
            .map(|(slot, (name, _))| (name.clone(), slot))
            .collect();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use slotmap::SlotMap;

    #[test]
    fn test_clamped_timer_never_overshoots() {
        let mut timer = InterpolationTimer::new(2.0, TimerMode::Clamped);
        timer.advance(0.5);
        assert_relative_eq!(timer.t(), 0.25);
        for _ in 0..10 {
            timer.advance(0.7);
            assert!(timer.t() <= 1.0);
        }
        assert_eq!(timer.t(), 1.0);
        assert!(timer.is_finished());
    }

    #[test]
    fn test_wrapping_timer_stays_below_one() {
        let mut timer = InterpolationTimer::new(1.0, TimerMode::Wrapping);
        for _ in 0..1000 {
            timer.advance(0.013);
            let t = timer.t();
            assert!((0.0..1.0).contains(&t), "t = {}", t);
        }
        assert!(!timer.is_finished());
    }

    #[test]
    fn test_wrapping_timer_returns_to_zero_each_period() {
        let mut timer = InterpolationTimer::new(2.0, TimerMode::Wrapping);
        timer.advance(0.5);
        timer.advance(1.5);
        assert_eq!(timer.t(), 0.0);
        timer.advance(0.5);
        assert_relative_eq!(timer.t(), 0.25);
    }

    #[test]
    fn test_start_is_idempotent() {
        let mut keys: SlotMap<Entity, ()> = SlotMap::with_key();
        let door = keys.insert(());
        let mut animator = Animator::new();
        animator.insert(
            "door_open",
            Animation::new(
                door,
                Vec3::zeros(),
                Vec3::new(0.0, 4.0, 0.0),
                InterpolationTimer::new(1.0, TimerMode::Clamped),
            ),
        );

        assert!(animator.advance(0.5).is_empty());
        assert!(animator.start("door_open"));
        let steps = animator.advance(0.5);
        assert_relative_eq!(steps[0].position, Vec3::new(0.0, 2.0, 0.0));

        assert!(animator.start("door_open"));
        let steps = animator.advance(0.75);
        assert_relative_eq!(steps[0].position, Vec3::new(0.0, 4.0, 0.0));
        assert_eq!(animator.get("door_open").unwrap().state(), AnimationState::Finished);

        assert!(animator.start("door_open"));
        assert!(animator.advance(0.1).is_empty());
        assert!(!animator.start("missing"));
    }
}
