use std::time::Duration;

use tokio::sync::mpsc::UnboundedSender;

use crate::types::SyncEvent;

/// Presentation-layer hooks. Every method defaults to doing nothing, so an
/// observer only implements what it renders.
pub trait SyncObserver: Send {
    fn on_word_advanced(&mut self, _index: usize, _word: &str) {}

    fn on_complete(&mut self) {}

    fn on_latency_captured(&mut self, _ttft: Duration) {}

    fn on_barge_in(&mut self) {}
}

pub struct NoopObserver;

impl SyncObserver for NoopObserver {}

/// Forwards every callback as a [`SyncEvent`]. A dropped receiver is not an
/// error; events are simply discarded.
impl SyncObserver for UnboundedSender<SyncEvent> {
    fn on_word_advanced(&mut self, index: usize, word: &str) {
        let _ = self.send(SyncEvent::WordAdvanced {
            index,
            word: word.to_string(),
        });
    }

    fn on_complete(&mut self) {
        let _ = self.send(SyncEvent::Complete);
    }

    fn on_latency_captured(&mut self, ttft: Duration) {
        let _ = self.send(SyncEvent::LatencyCaptured {
            ttft_ms: ttft.as_nanos() as f64 / 1_000_000.0,
        });
    }

    fn on_barge_in(&mut self) {
        let _ = self.send(SyncEvent::BargeIn);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn channel_observer_forwards_events() {
        let (mut tx, mut rx) = tokio::sync::mpsc::unbounded_channel();

        tx.on_word_advanced(2, "brown");
        tx.on_latency_captured(Duration::from_millis(120));
        tx.on_complete();

        assert_eq!(
            rx.try_recv().unwrap(),
            SyncEvent::WordAdvanced {
                index: 2,
                word: "brown".to_string(),
            }
        );
        assert_eq!(
            rx.try_recv().unwrap(),
            SyncEvent::LatencyCaptured { ttft_ms: 120.0 }
        );
        assert_eq!(rx.try_recv().unwrap(), SyncEvent::Complete);
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn closed_channel_is_ignored() {
        let (mut tx, rx) = tokio::sync::mpsc::unbounded_channel::<SyncEvent>();
        drop(rx);
        tx.on_barge_in();
    }
}
