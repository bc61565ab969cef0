//! Volume control
//!
//! Linear level in `0.0..=1.0` plus a mute override. Muting never touches the
//! stored level, so unmuting restores it exactly.

/// Volume controller
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    level: f32,
    muted: bool,
}

impl Volume {
    /// Create new volume controller, clamping `level` into range
    pub fn new(level: f32) -> Self {
        let mut volume = Self {
            level: 1.0,
            muted: false,
        };
        volume.set_level(level);
        volume
    }

    /// Set volume level, clamped to `0.0..=1.0`
    ///
    /// Returns `false` (and leaves the level alone) for NaN.
    pub fn set_level(&mut self, level: f32) -> bool {
        if level.is_nan() {
            return false;
        }
        self.level = level.clamp(0.0, 1.0);
        true
    }

    pub fn level(&self) -> f32 {
        self.level
    }

    /// Toggle mute state
    pub fn toggle_mute(&mut self) {
        self.muted = !self.muted;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Level actually heard: 0.0 while muted
    pub fn effective(&self) -> f32 {
        if self.muted {
            0.0
        } else {
            self.level
        }
    }
}

impl Default for Volume {
    fn default() -> Self {
        Self::new(0.8)
    }
}
