use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::{
    MotionTrack, PopConfig, PopError, Result, ScoreBoard, ScoreSink, SoundPlayer, StrikeInbox,
    TargetHandle, TargetHost, Vec3,
};

#[derive(Debug, Default, Clone)]
pub struct PlaybackClock {
    pub time_seconds: f32,
}

impl PlaybackClock {
    pub fn reset(&mut self) {
        self.time_seconds = 0.0;
    }

    pub fn advance(&mut self, delta: f32) {
        self.time_seconds = (self.time_seconds + delta).max(0.0);
    }
}

/// Where a target currently is in its pop cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TargetState {
    Idle,
    Rising,
    Holding,
    Falling,
}

impl TargetState {
    pub fn is_active(self) -> bool {
        self != TargetState::Idle
    }
}

/// Something observable that happened while the scheduler advanced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum PopEvent {
    /// A target was selected, activated and started rising from `rest`.
    Popped { target: TargetHandle, rest: Vec3 },
    /// The target reached the top of its rise.
    Raised { target: TargetHandle },
    /// The target finished falling and is idle again.
    Lowered { target: TargetHandle },
    /// A strike landed on an active target.
    Struck {
        target: TargetHandle,
        phase: TargetState,
        score: u32,
    },
    /// A pop was due but every target in the pool was busy.
    AllBusy,
    /// The pop sound could not be played; the cycle went ahead anyway.
    SoundFailed { target: TargetHandle },
}

#[derive(Debug, Clone)]
enum CyclePhase {
    Rising(MotionTrack),
    Holding { remaining: f32 },
    Falling(MotionTrack),
}

#[derive(Debug, Clone)]
struct PopCycle {
    rest: Vec3,
    phase: CyclePhase,
}

impl PopCycle {
    fn state(&self) -> TargetState {
        match self.phase {
            CyclePhase::Rising(_) => TargetState::Rising,
            CyclePhase::Holding { .. } => TargetState::Holding,
            CyclePhase::Falling(_) => TargetState::Falling,
        }
    }
}

/// Tick-driven scheduler that pops random targets out of a pool.
///
/// Every in-flight cycle is an independent state machine keyed by its target.
/// The host drives everything through [`PopScheduler::tick`]; strikes can be
/// delivered between ticks with [`PopScheduler::strike`] or from another
/// thread through the [`StrikeInbox`].
///
/// A target that is already mid-cycle is never selected again: the pop picks
/// uniformly among idle targets and is skipped when there are none.
#[derive(Debug)]
pub struct PopScheduler<H, P> {
    config: PopConfig,
    pool: Vec<TargetHandle>,
    host: H,
    player: P,
    score: ScoreBoard,
    inbox: StrikeInbox,
    cycles: BTreeMap<TargetHandle, PopCycle>,
    clock: PlaybackClock,
    next_pop_in: f32,
    running: bool,
    pending: Vec<PopEvent>,
}

impl<H: TargetHost, P: SoundPlayer> PopScheduler<H, P> {
    /// Validates the configuration and the pool. The scheduler starts
    /// stopped; call [`PopScheduler::start`] to begin popping.
    pub fn new(config: PopConfig, pool: Vec<TargetHandle>, host: H, player: P) -> Result<Self> {
        config.validate()?;
        if pool.is_empty() {
            return Err(PopError::EmptyPool);
        }
        if let Some(unknown) = pool.iter().find(|target| !host.contains(**target)) {
            return Err(PopError::UnknownTarget(*unknown));
        }

        Ok(Self {
            config,
            pool,
            host,
            player,
            score: ScoreBoard::new(),
            inbox: StrikeInbox::new(),
            cycles: BTreeMap::new(),
            clock: PlaybackClock::default(),
            next_pop_in: 0.0,
            running: false,
            pending: Vec::new(),
        })
    }

    pub fn with_score_sink(mut self, sink: impl ScoreSink + 'static) -> Self {
        self.score.set_sink(Box::new(sink));
        self
    }

    pub fn start<R: Rng>(&mut self, rng: &mut R) {
        if self.running {
            return;
        }
        self.running = true;
        self.next_pop_in = self.config.draw_interval(rng);
        tracing::info!(
            targets = self.pool.len(),
            first_pop_in = self.next_pop_in,
            "pop scheduler started"
        );
    }

    /// Halts popping and cancels every in-flight cycle. Active targets are
    /// put back at rest and hidden; pending strikes are discarded.
    pub fn stop(&mut self) {
        if !self.running {
            return;
        }
        self.running = false;
        for (target, cycle) in std::mem::take(&mut self.cycles) {
            self.host.set_position(target, cycle.rest);
            self.host.set_active(target, false);
        }
        if let Err(err) = self.inbox.drain() {
            tracing::warn!(%err, "discarding strike inbox on stop");
        }
        self.pending.clear();
        tracing::info!(
            score = self.score.score(),
            elapsed = self.clock.time_seconds,
            "pop scheduler stopped"
        );
    }

    /// Advances the scheduler by `dt` seconds and returns everything that
    /// happened, including strikes delivered since the previous tick.
    pub fn tick<R: Rng>(&mut self, dt: f32, rng: &mut R) -> Vec<PopEvent> {
        if !self.running {
            if let Err(err) = self.inbox.drain() {
                tracing::warn!(%err, "ignoring strike inbox while stopped");
            }
            return Vec::new();
        }

        match self.inbox.drain() {
            Ok(strikes) => {
                for target in strikes {
                    self.strike(target);
                }
            }
            Err(err) => tracing::warn!(%err, "ignoring strike inbox"),
        }

        let mut events = std::mem::take(&mut self.pending);
        if !(dt.is_finite() && dt > 0.0) {
            return events;
        }
        self.clock.advance(dt);

        let mut finished = Vec::new();
        for (target, cycle) in self.cycles.iter_mut() {
            if advance_cycle(*target, cycle, dt, &mut self.host, &self.config, rng, &mut events) {
                finished.push(*target);
            }
        }
        for target in finished {
            self.finish(target, &mut events);
        }

        // At most one pop per tick; a stall longer than the next interval
        // restarts the wait instead of replaying every missed pop.
        self.next_pop_in -= dt;
        if self.next_pop_in <= 0.0 {
            let overdue = -self.next_pop_in;
            if let Some(target) = self.launch(rng, &mut events) {
                self.catch_up(target, overdue, rng, &mut events);
            }
            let interval = self.config.draw_interval(rng);
            let carried = self.next_pop_in + interval;
            self.next_pop_in = if carried > 0.0 { carried } else { interval };
        }

        events
    }

    /// Collision handler. Counts a hit when `target` is mid-cycle in any
    /// phase, returning the new score; strikes on idle or unknown targets are
    /// ignored.
    pub fn strike(&mut self, target: TargetHandle) -> Option<u32> {
        let cycle = self.cycles.remove(&target)?;
        let phase = cycle.state();
        self.host.set_position(target, cycle.rest);
        self.host.set_active(target, false);

        let score = self.score.record_hit();
        tracing::info!(handle = %target, ?phase, score, "target struck");
        self.pending.push(PopEvent::Struck {
            target,
            phase,
            score,
        });
        Some(score)
    }

    pub fn state_of(&self, target: TargetHandle) -> TargetState {
        self.cycles
            .get(&target)
            .map(PopCycle::state)
            .unwrap_or(TargetState::Idle)
    }

    pub fn active_targets(&self) -> Vec<TargetHandle> {
        self.cycles.keys().copied().collect()
    }

    /// Rest position captured when `target` was popped, while it is active.
    pub fn rest_position(&self, target: TargetHandle) -> Option<Vec3> {
        self.cycles.get(&target).map(|cycle| cycle.rest)
    }

    pub fn score(&self) -> u32 {
        self.score.score()
    }

    pub fn score_text(&self) -> String {
        self.score.display_text()
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Seconds of scheduler time elapsed while running.
    pub fn elapsed(&self) -> f32 {
        self.clock.time_seconds
    }

    /// Time left before the next pop is due.
    pub fn next_pop_in(&self) -> f32 {
        self.next_pop_in
    }

    pub fn config(&self) -> &PopConfig {
        &self.config
    }

    pub fn pool(&self) -> &[TargetHandle] {
        &self.pool
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn player(&self) -> &P {
        &self.player
    }

    /// Handle for delivering strikes from another thread.
    pub fn strike_inbox(&self) -> StrikeInbox {
        self.inbox.clone()
    }

    fn finish(&mut self, target: TargetHandle, events: &mut Vec<PopEvent>) {
        self.cycles.remove(&target);
        self.host.set_active(target, false);
        events.push(PopEvent::Lowered { target });
    }

    /// Advances a freshly popped cycle by the part of the tick that elapsed
    /// after its pop was due.
    fn catch_up<R: Rng>(
        &mut self,
        target: TargetHandle,
        overdue: f32,
        rng: &mut R,
        events: &mut Vec<PopEvent>,
    ) {
        if overdue <= 0.0 {
            return;
        }
        let Some(cycle) = self.cycles.get_mut(&target) else {
            return;
        };
        if advance_cycle(target, cycle, overdue, &mut self.host, &self.config, rng, events) {
            self.finish(target, events);
        }
    }

    fn launch<R: Rng>(
        &mut self,
        rng: &mut R,
        events: &mut Vec<PopEvent>,
    ) -> Option<TargetHandle> {
        let idle: Vec<TargetHandle> = self
            .pool
            .iter()
            .copied()
            .filter(|target| !self.cycles.contains_key(target))
            .collect();
        if idle.is_empty() {
            tracing::debug!("every target is busy, skipping pop");
            events.push(PopEvent::AllBusy);
            return None;
        }

        let target = idle[rng.gen_range(0..idle.len())];
        let Some(rest) = self.host.position(target) else {
            tracing::warn!(handle = %target, "host lost track of target, skipping pop");
            return None;
        };

        if let Some(clip) = &self.config.pop_sound {
            if let Err(err) = self.player.play_at(clip, rest) {
                tracing::warn!(handle = %target, %err, "pop sound failed");
                events.push(PopEvent::SoundFailed { target });
            }
        }

        self.host.set_active(target, true);
        let rise = MotionTrack::new(rest, rest + self.config.pop_offset(), self.config.rise_duration);
        self.cycles.insert(
            target,
            PopCycle {
                rest,
                phase: CyclePhase::Rising(rise),
            },
        );
        tracing::debug!(handle = %target, "target popped");
        events.push(PopEvent::Popped { target, rest });
        Some(target)
    }
}

/// Steps one cycle through as many phases as `dt` covers. Returns true once
/// the target is back at rest.
fn advance_cycle<H: TargetHost, R: Rng>(
    target: TargetHandle,
    cycle: &mut PopCycle,
    dt: f32,
    host: &mut H,
    config: &PopConfig,
    rng: &mut R,
    events: &mut Vec<PopEvent>,
) -> bool {
    let mut budget = dt;
    loop {
        match &mut cycle.phase {
            CyclePhase::Rising(track) => {
                budget = track.advance(budget);
                host.set_position(target, track.position());
                if !track.is_finished() {
                    return false;
                }
                events.push(PopEvent::Raised { target });
                cycle.phase = CyclePhase::Holding {
                    remaining: config.draw_hold(rng),
                };
            }
            CyclePhase::Holding { remaining } => {
                if budget < *remaining {
                    *remaining -= budget;
                    return false;
                }
                budget -= *remaining;
                let from = host
                    .position(target)
                    .unwrap_or(cycle.rest + config.pop_offset());
                cycle.phase = CyclePhase::Falling(config.fall_track(from, cycle.rest));
            }
            CyclePhase::Falling(track) => {
                track.advance(budget);
                host.set_position(target, track.position());
                return track.is_finished();
            }
        }
    }
}
