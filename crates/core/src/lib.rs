//! Core library for Popper, a tick-driven pop-up target scheduler.
//!
//! A [`PopScheduler`] repeatedly picks a random idle target from a pool,
//! raises it, holds it up for a random time and lowers it again, while a
//! collision layer reports strikes that score points and knock targets down
//! early. The host owns the targets, sound playback and the frame clock and
//! plugs in through the [`TargetHost`], [`SoundPlayer`] and [`ScoreSink`]
//! traits.

pub mod audio;
pub mod collision;
pub mod config;
pub mod error;
pub mod motion;
pub mod record;
pub mod scene;
pub mod score;
pub mod timeline;

pub use audio::{NullPlayer, SoundClip, SoundPlayer, TracingPlayer};
pub use collision::StrikeInbox;
pub use config::PopConfig;
pub use error::{PopError, Result};
pub use motion::{lerp, MotionTrack, Vec3};
pub use record::{EventRecorder, RecordedEvent, RecordingSummary};
pub use scene::{SceneGraph, SceneObject, TargetDescriptor, TargetHandle, TargetHost};
pub use score::{format_score, ScoreBoard, ScoreSink};
pub use timeline::{PlaybackClock, PopEvent, PopScheduler, TargetState};
