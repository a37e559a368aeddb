use std::io::Write;

use serde::{Deserialize, Serialize};

use crate::{PopEvent, Result};

/// A [`PopEvent`] stamped with the scheduler time it was observed at.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecordedEvent {
    pub time_seconds: f32,
    #[serde(flatten)]
    pub event: PopEvent,
}

/// Aggregate counts over everything recorded.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordingSummary {
    pub pops: u32,
    pub hits: u32,
    pub completed: u32,
    pub busy_skips: u32,
    pub sound_failures: u32,
}

/// Collects scheduler events while recording is switched on.
#[derive(Debug, Default)]
pub struct EventRecorder {
    events: Vec<RecordedEvent>,
    is_recording: bool,
}

impl EventRecorder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn start(&mut self) {
        self.is_recording = true;
    }

    pub fn stop(&mut self) {
        self.is_recording = false;
    }

    pub fn is_recording(&self) -> bool {
        self.is_recording
    }

    pub fn record(&mut self, time_seconds: f32, events: impl IntoIterator<Item = PopEvent>) {
        if !self.is_recording {
            return;
        }
        self.events.extend(
            events
                .into_iter()
                .map(|event| RecordedEvent { time_seconds, event }),
        );
    }

    pub fn events(&self) -> &[RecordedEvent] {
        &self.events
    }

    pub fn summary(&self) -> RecordingSummary {
        let mut summary = RecordingSummary::default();
        for recorded in &self.events {
            match recorded.event {
                PopEvent::Popped { .. } => summary.pops += 1,
                PopEvent::Struck { .. } => summary.hits += 1,
                PopEvent::Lowered { .. } => summary.completed += 1,
                PopEvent::AllBusy => summary.busy_skips += 1,
                PopEvent::SoundFailed { .. } => summary.sound_failures += 1,
                PopEvent::Raised { .. } => {}
            }
        }
        summary
    }

    /// Writes one JSON object per line.
    pub fn write_json_lines<W: Write>(&self, mut writer: W) -> Result<()> {
        for recorded in &self.events {
            serde_json::to_writer(&mut writer, recorded)?;
            writer.write_all(b"\n")?;
        }
        writer.flush()?;
        Ok(())
    }
}
