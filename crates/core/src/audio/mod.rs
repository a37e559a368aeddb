use serde::{Deserialize, Serialize};

use crate::{Result, Vec3};

/// Opaque handle to an audio asset owned by the host.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SoundClip {
    pub name: String,
    #[serde(default = "default_volume")]
    pub volume: f32,
}

fn default_volume() -> f32 {
    1.0
}

impl SoundClip {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            volume: default_volume(),
        }
    }
}

/// Fire-and-forget playback of one-shot clips at a world position.
///
/// Errors are reported back so the caller can log them, but the scheduler
/// never lets a failed play interrupt a cycle.
pub trait SoundPlayer {
    fn play_at(&mut self, clip: &SoundClip, position: Vec3) -> Result<()>;
}

/// Player that silently drops every request.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullPlayer;

impl SoundPlayer for NullPlayer {
    fn play_at(&mut self, _clip: &SoundClip, _position: Vec3) -> Result<()> {
        Ok(())
    }
}

/// Player that only logs each request; used by the headless driver.
#[derive(Debug, Default, Clone)]
pub struct TracingPlayer {
    plays: u64,
}

impl TracingPlayer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of clips played so far.
    pub fn plays(&self) -> u64 {
        self.plays
    }
}

impl SoundPlayer for TracingPlayer {
    fn play_at(&mut self, clip: &SoundClip, position: Vec3) -> Result<()> {
        self.plays += 1;
        tracing::debug!(
            clip = %clip.name,
            volume = clip.volume,
            x = position.x,
            y = position.y,
            z = position.z,
            "play one-shot"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tracing_player_counts_plays() {
        let mut player = TracingPlayer::new();
        let clip = SoundClip::new("pop");

        player.play_at(&clip, Vec3::ZERO).unwrap();
        player.play_at(&clip, Vec3::UP).unwrap();

        assert_eq!(player.plays(), 2);
    }

    #[test]
    fn clip_volume_defaults_when_missing() {
        let clip: SoundClip = serde_json::from_str(r#"{ "name": "pop" }"#).unwrap();
        assert_eq!(clip, SoundClip::new("pop"));
    }
}
