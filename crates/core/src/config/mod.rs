use std::path::Path;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{MotionTrack, PopError, Result, SoundClip, TargetDescriptor, Vec3};

/// Timing and motion parameters for the pop scheduler.
///
/// Durations and intervals are in seconds. Ranges are half open: a value is
/// drawn uniformly from `[min, max)`, or is exactly `min` when both ends match.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PopConfig {
    pub min_interval: f32,
    pub max_interval: f32,
    pub min_hold_time: f32,
    pub max_hold_time: f32,
    pub rise_duration: f32,
    /// Fixed fall duration. When absent the fall lasts `distance / pop_down_speed`.
    pub fall_duration: Option<f32>,
    pub pop_height: f32,
    pub pop_down_speed: f32,
    pub up_axis: Vec3,
    pub pop_sound: Option<SoundClip>,
    /// Targets spawned by hosts that build their scene from configuration.
    pub targets: Vec<TargetDescriptor>,
}

impl Default for PopConfig {
    fn default() -> Self {
        Self {
            min_interval: 1.0,
            max_interval: 3.0,
            min_hold_time: 1.0,
            max_hold_time: 2.0,
            rise_duration: 0.25,
            fall_duration: None,
            pop_height: 0.5,
            pop_down_speed: 5.0,
            up_axis: Vec3::UP,
            pop_sound: Some(SoundClip::new("pop")),
            targets: TargetDescriptor::grid(3, 1.0),
        }
    }
}

impl PopConfig {
    pub fn from_json_str(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_json_str(&contents)
    }

    pub fn to_json_pretty(&self) -> Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<()> {
        check_range("interval", self.min_interval, self.max_interval)?;
        check_range("hold time", self.min_hold_time, self.max_hold_time)?;
        check_positive("rise_duration", self.rise_duration)?;
        if let Some(fall) = self.fall_duration {
            check_positive("fall_duration", fall)?;
        }
        check_positive("pop_height", self.pop_height)?;
        check_positive("pop_down_speed", self.pop_down_speed)?;
        if self.up_axis.normalized().is_none() {
            return Err(PopError::config("up_axis must be a non-zero finite vector"));
        }
        if let Some(clip) = &self.pop_sound {
            if !clip.volume.is_finite() || clip.volume < 0.0 {
                return Err(PopError::config("pop_sound volume must be >= 0"));
            }
        }
        Ok(())
    }

    pub fn draw_interval<R: Rng>(&self, rng: &mut R) -> f32 {
        draw_uniform(rng, self.min_interval, self.max_interval)
    }

    pub fn draw_hold<R: Rng>(&self, rng: &mut R) -> f32 {
        draw_uniform(rng, self.min_hold_time, self.max_hold_time)
    }

    /// Unit vector along which targets pop. Falls back to world up when the
    /// configured axis is degenerate.
    pub fn up_direction(&self) -> Vec3 {
        self.up_axis.normalized().unwrap_or(Vec3::UP)
    }

    pub fn pop_offset(&self) -> Vec3 {
        self.up_direction() * self.pop_height
    }

    /// Movement back to rest: fixed when `fall_duration` is set, otherwise
    /// paced by `pop_down_speed`.
    pub fn fall_track(&self, from: Vec3, rest: Vec3) -> MotionTrack {
        match self.fall_duration {
            Some(duration) => MotionTrack::new(from, rest, duration),
            None => MotionTrack::at_speed(from, rest, self.pop_down_speed),
        }
    }
}

fn check_positive(name: &str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(PopError::config(format!(
            "{name} must be a positive number, got {value}"
        )))
    }
}

fn check_range(name: &str, min: f32, max: f32) -> Result<()> {
    check_positive(&format!("minimum {name}"), min)?;
    check_positive(&format!("maximum {name}"), max)?;
    if min > max {
        return Err(PopError::config(format!(
            "minimum {name} ({min}) exceeds maximum ({max})"
        )));
    }
    Ok(())
}

/// Uniform draw from `[min, max)`; a degenerate range yields `min`.
pub fn draw_uniform<R: Rng>(rng: &mut R, min: f32, max: f32) -> f32 {
    if max > min {
        rng.gen_range(min..max)
    } else {
        min
    }
}
