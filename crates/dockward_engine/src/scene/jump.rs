//! Grounded / mid-air jump state

/// Player jump gating
///
/// A jump is honoured when the player is grounded, or airborne with mid-air
/// jumps left. Landing resets the mid-air counter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JumpController {
    grounded: bool,
    current_mid_air_jump: u32,
    max_mid_air_jumps: u32,
}

impl JumpController {
    /// Airborne controller allowing `max_mid_air_jumps` jumps before landing
    pub fn new(max_mid_air_jumps: u32) -> Self {
        Self {
            grounded: false,
            current_mid_air_jump: 0,
            max_mid_air_jumps,
        }
    }

    /// Whether the player touched the ground during the last step
    pub fn grounded(&self) -> bool {
        self.grounded
    }

    /// Mid-air jumps used since the player last touched the ground
    pub fn current_mid_air_jump(&self) -> u32 {
        self.current_mid_air_jump
    }

    /// Mid-air jumps allowed per airtime
    pub fn max_mid_air_jumps(&self) -> u32 {
        self.max_mid_air_jumps
    }

    /// Handle the jump input edge for this frame
    ///
    /// `pressed` must already be edge-detected (released → pressed).
    /// Returns whether the jump impulse should be applied.
    pub fn try_jump(&mut self, pressed: bool) -> bool {
        if !pressed {
            return false;
        }
        if self.grounded {
            return true;
        }
        if self.current_mid_air_jump < self.max_mid_air_jumps {
            self.current_mid_air_jump += 1;
            return true;
        }
        false
    }

    /// Recompute grounded from this frame's collision records
    pub fn update_grounded(&mut self, touching_ground: bool) {
        self.grounded = touching_ground;
        if touching_ground {
            self.current_mid_air_jump = 0;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ground_jump_does_not_spend_mid_air_jumps() {
        let mut jump = JumpController::new(1);
        jump.update_grounded(true);
        assert!(jump.try_jump(true));
        assert_eq!(jump.current_mid_air_jump(), 0);
    }

    #[test]
    fn test_mid_air_jumps_are_limited() {
        let mut jump = JumpController::new(2);
        assert!(!jump.try_jump(false));
        assert!(jump.try_jump(true));
        assert!(jump.try_jump(true));
        assert!(!jump.try_jump(true));
        assert_eq!(jump.current_mid_air_jump(), 2);

        jump.update_grounded(true);
        assert_eq!(jump.current_mid_air_jump(), 0);
        jump.update_grounded(false);
        assert!(jump.try_jump(true));
        assert_eq!(jump.current_mid_air_jump(), 1);
    }

    #[test]
    fn test_no_mid_air_jumps() {
        let mut jump = JumpController::new(0);
        assert!(!jump.try_jump(true));
        assert_eq!(jump.current_mid_air_jump(), 0);
    }
}
