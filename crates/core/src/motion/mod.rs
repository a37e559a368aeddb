use std::ops::{Add, Mul, Sub};

use serde::{Deserialize, Serialize};

/// Minimal three component vector used for target positions.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Vec3 {
    pub x: f32,
    pub y: f32,
    pub z: f32,
}

impl Vec3 {
    pub const ZERO: Vec3 = Vec3::new(0.0, 0.0, 0.0);
    pub const UP: Vec3 = Vec3::new(0.0, 1.0, 0.0);

    pub const fn new(x: f32, y: f32, z: f32) -> Self {
        Self { x, y, z }
    }

    pub fn length(self) -> f32 {
        (self.x * self.x + self.y * self.y + self.z * self.z).sqrt()
    }

    pub fn distance(self, other: Vec3) -> f32 {
        (other - self).length()
    }

    /// Returns the unit vector pointing the same way, or `None` for a zero or
    /// non-finite vector.
    pub fn normalized(self) -> Option<Vec3> {
        let len = self.length();
        if len.is_finite() && len > f32::EPSILON {
            Some(self * (1.0 / len))
        } else {
            None
        }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite() && self.z.is_finite()
    }
}

impl Add for Vec3 {
    type Output = Vec3;

    fn add(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x + rhs.x, self.y + rhs.y, self.z + rhs.z)
    }
}

impl Sub for Vec3 {
    type Output = Vec3;

    fn sub(self, rhs: Vec3) -> Vec3 {
        Vec3::new(self.x - rhs.x, self.y - rhs.y, self.z - rhs.z)
    }
}

impl Mul<f32> for Vec3 {
    type Output = Vec3;

    fn mul(self, rhs: f32) -> Vec3 {
        Vec3::new(self.x * rhs, self.y * rhs, self.z * rhs)
    }
}

/// Linear interpolation with exact endpoints: `t <= 0` yields `start` and
/// `t >= 1` yields `end` bit for bit.
pub fn lerp(start: Vec3, end: Vec3, t: f32) -> Vec3 {
    if t.is_nan() || t <= 0.0 {
        start
    } else if t >= 1.0 {
        end
    } else {
        start + (end - start) * t
    }
}

/// A single straight-line movement driven by accumulated elapsed time.
#[derive(Debug, Clone, PartialEq)]
pub struct MotionTrack {
    pub start: Vec3,
    pub end: Vec3,
    pub duration: f32,
    pub elapsed: f32,
}

impl MotionTrack {
    pub fn new(start: Vec3, end: Vec3, duration: f32) -> Self {
        Self {
            start,
            end,
            duration,
            elapsed: 0.0,
        }
    }

    /// A track whose duration is `distance / speed`. A non-positive speed
    /// produces a track that completes on its first step.
    pub fn at_speed(start: Vec3, end: Vec3, speed: f32) -> Self {
        let duration = if speed > 0.0 {
            start.distance(end) / speed
        } else {
            0.0
        };
        Self::new(start, end, duration)
    }

    /// Normalised progress in `[0, 1]`. Zero or negative durations count as
    /// already complete.
    pub fn progress(&self) -> f32 {
        if !(self.duration > 0.0) {
            return 1.0;
        }
        (self.elapsed / self.duration).clamp(0.0, 1.0)
    }

    pub fn position(&self) -> Vec3 {
        lerp(self.start, self.end, self.progress())
    }

    pub fn is_finished(&self) -> bool {
        self.progress() >= 1.0
    }

    /// Advances the track by `dt` and returns the time left over once the
    /// track has finished (zero while it is still running).
    pub fn advance(&mut self, dt: f32) -> f32 {
        self.elapsed += dt.max(0.0);
        if self.duration > 0.0 {
            (self.elapsed - self.duration).max(0.0)
        } else {
            self.elapsed
        }
    }
}
