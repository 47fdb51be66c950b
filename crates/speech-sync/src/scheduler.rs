use std::time::{Duration, Instant};

use crate::timeline::WordTimeline;

/// Result of one [`PlaybackScheduler::tick`].
#[derive(Debug, Clone, PartialEq)]
pub enum Tick {
    /// Not playing; nothing happened.
    Idle,
    /// Playing, but the word interval has not elapsed yet.
    Waiting,
    /// Moved to the next word. `finished` is set when that word is the last
    /// one, in which case playback has stopped.
    Advanced {
        index: usize,
        word: String,
        finished: bool,
    },
    /// Playback finished without moving (single-word timeline).
    Finished,
}

/// Paces the timeline at a fixed words-per-second rate.
///
/// The scheduler owns no timer. The host calls [`tick`](Self::tick) roughly
/// once per display frame and the scheduler decides whether enough time has
/// passed since the last state change to reveal the next word. At most one
/// word is revealed per tick, so advancement is strictly sequential.
pub struct PlaybackScheduler {
    interval: Duration,
    is_playing: bool,
    last_change: Option<Instant>,
}

impl PlaybackScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            is_playing: false,
            last_change: None,
        }
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_playing(&self) -> bool {
        self.is_playing
    }

    /// Begin (or continue) playback. Returns `false` when there is nothing to
    /// play: an empty timeline, or one that already completed.
    ///
    /// Starting while already playing only re-stamps the reference time;
    /// there is never more than one active schedule.
    pub fn start(&mut self, timeline: &WordTimeline, now: Instant) -> bool {
        if timeline.is_empty() || timeline.is_completed() {
            return false;
        }
        self.is_playing = true;
        self.last_change = Some(now);
        true
    }

    pub fn pause(&mut self) {
        self.is_playing = false;
    }

    pub fn stop(&mut self) {
        self.is_playing = false;
        self.last_change = None;
    }

    /// Restart the pacing reference after a discontinuous jump.
    pub fn rearm(&mut self, now: Instant) {
        if self.is_playing {
            self.last_change = Some(now);
        }
    }

    pub fn tick(&mut self, timeline: &mut WordTimeline, now: Instant) -> Tick {
        if !self.is_playing {
            return Tick::Idle;
        }

        let last_change = *self.last_change.get_or_insert(now);
        if now.saturating_duration_since(last_change) < self.interval {
            return Tick::Waiting;
        }
        self.last_change = Some(now);

        if timeline.is_at_end() {
            self.finish(timeline);
            return Tick::Finished;
        }

        let Some(word) = timeline.advance() else {
            self.stop();
            return Tick::Idle;
        };
        let index = word.index;
        let word = word.word.clone();

        let finished = timeline.is_at_end();
        if finished {
            self.finish(timeline);
        }

        Tick::Advanced {
            index,
            word,
            finished,
        }
    }

    fn finish(&mut self, timeline: &mut WordTimeline) {
        timeline.complete();
        self.stop();
    }
}
