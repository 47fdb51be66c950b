use std::time::{Duration, Instant};

use speech_sync::{DeviceErrorCode, DeviceEvent, SpeechDevice, UtteranceId};

struct Utterance {
    id: UtteranceId,
    started: Instant,
    duration: Duration,
    paused_at: Option<Instant>,
}

/// Pretends to speak at a fixed word rate. Lifecycle events are collected
/// and handed out by [`poll`](Self::poll), so the host feeds them back into
/// the engine on its own schedule.
pub struct SimulatedDevice {
    words_per_second: f64,
    current: Option<Utterance>,
    outbox: Vec<DeviceEvent>,
}

impl SimulatedDevice {
    pub fn new(words_per_second: f64) -> Self {
        Self {
            words_per_second: words_per_second.max(0.1),
            current: None,
            outbox: Vec::new(),
        }
    }

    pub fn is_paused(&self) -> bool {
        self.current
            .as_ref()
            .is_some_and(|u| u.paused_at.is_some())
    }

    pub fn poll(&mut self, now: Instant) -> Vec<DeviceEvent> {
        let done = self.current.as_ref().is_some_and(|u| {
            u.paused_at.is_none() && now.saturating_duration_since(u.started) >= u.duration
        });
        if done {
            if let Some(u) = self.current.take() {
                self.outbox.push(DeviceEvent::ended(u.id));
            }
        }
        std::mem::take(&mut self.outbox)
    }
}

impl SpeechDevice for SimulatedDevice {
    fn speak(&mut self, utterance: UtteranceId, text: &str) {
        let words = text.split_whitespace().count().max(1);
        self.current = Some(Utterance {
            id: utterance,
            started: Instant::now(),
            duration: Duration::from_secs_f64(words as f64 / self.words_per_second),
            paused_at: None,
        });
        self.outbox.push(DeviceEvent::started(utterance));
    }

    fn cancel(&mut self) {
        // Real backends report the cut-off utterance as interrupted.
        if let Some(u) = self.current.take() {
            self.outbox
                .push(DeviceEvent::error(u.id, DeviceErrorCode::Interrupted));
        }
    }

    fn pause(&mut self) {
        if let Some(u) = self.current.as_mut() {
            u.paused_at.get_or_insert_with(Instant::now);
        }
    }

    fn resume(&mut self) {
        if let Some(u) = self.current.as_mut() {
            if let Some(paused_at) = u.paused_at.take() {
                u.started += paused_at.elapsed();
            }
        }
    }
}
