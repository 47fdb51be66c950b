use std::sync::Arc;
use std::time::{Duration, Instant};

use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

use crate::clock::Clock;
use crate::device::SpeechDevice;
use crate::engine::SyncEngine;

/// One display frame at ~60 Hz.
pub const FRAME_INTERVAL: Duration = Duration::from_millis(16);

/// Clock backed by the tokio timer, so paused-time tests drive the engine
/// and the frame loop from the same source.
#[derive(Debug, Clone, Copy, Default)]
pub struct TokioClock;

impl Clock for TokioClock {
    fn now(&self) -> Instant {
        tokio::time::Instant::now().into_std()
    }
}

/// Handle to a running frame loop.
pub struct FrameLoop {
    cancel: CancellationToken,
    handle: JoinHandle<()>,
}

impl FrameLoop {
    pub fn is_finished(&self) -> bool {
        self.handle.is_finished()
    }

    pub async fn stop(self) {
        self.cancel.cancel();
        if let Err(e) = self.handle.await {
            tracing::warn!(error = %e, "frame_loop_join_failed");
        }
    }
}

/// Tick `engine` every `cadence` until `cancel` fires. Missed frames are
/// skipped, not replayed, since the scheduler catches up by elapsed time.
pub fn spawn_frame_loop<D>(
    engine: Arc<Mutex<SyncEngine<D>>>,
    cadence: Duration,
    cancel: CancellationToken,
) -> FrameLoop
where
    D: SpeechDevice + 'static,
{
    let token = cancel.clone();
    let handle = tokio::spawn(async move {
        let mut interval = tokio::time::interval(cadence);
        interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

        tracing::debug!(cadence_ms = cadence.as_millis() as u64, "frame_loop_started");
        loop {
            tokio::select! {
                _ = token.cancelled() => break,
                at = interval.tick() => {
                    engine.lock().await.tick_at(at.into_std());
                }
            }
        }
        tracing::debug!("frame_loop_stopped");
    });

    FrameLoop { cancel, handle }
}
