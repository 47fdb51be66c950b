use std::time::Duration;

use quickcheck_macros::quickcheck;
use speech_sync::{
    ChunkStatus, DeviceErrorCode, DeviceEvent, ManualClock, RecordingDevice, SyncConfig,
    SyncEngine, SyncEvent,
};
use tokio::sync::mpsc::unbounded_channel;

const FRAME: Duration = Duration::from_millis(16);

fn words_from(seed: Vec<u8>) -> Vec<String> {
    seed.into_iter()
        .take(40)
        .map(|b| format!("w{}", b % 17))
        .collect()
}

#[quickcheck]
fn every_text_completes_exactly_once(seed: Vec<u8>) -> bool {
    let words = words_from(seed);
    let clock = ManualClock::new();
    let (tx, mut rx) = unbounded_channel();
    let mut engine = SyncEngine::new(SyncConfig::default(), RecordingDevice::new())
        .unwrap()
        .with_clock(clock.clone())
        .with_observer(tx);

    engine.initialize(&words.join(" "));
    if !engine.start() {
        return words.is_empty();
    }

    let mut last_index = 0;
    let mut monotonic = true;
    // Twice the nominal duration, plus slack for the final tick.
    let budget = (words.len() as u64 + 2) * 2 * 400;
    for _ in 0..budget / 16 {
        clock.advance(FRAME);
        engine.tick();
        let index = engine.sync_state().current_word_index;
        monotonic &= index >= last_index;
        last_index = index;
    }

    let mut completes = 0;
    while let Ok(event) = rx.try_recv() {
        if event == SyncEvent::Complete {
            completes += 1;
        }
    }

    let state = engine.sync_state();
    monotonic
        && completes == 1
        && state.progress == 1.0
        && !state.is_playing
        && state.current_word_index == words.len() - 1
}

#[quickcheck]
fn capture_fires_once_per_timer(captures: u8) -> bool {
    let clock = ManualClock::new();
    let (tx, mut rx) = unbounded_channel();
    let mut engine = SyncEngine::new(SyncConfig::default(), RecordingDevice::new())
        .unwrap()
        .with_clock(clock.clone())
        .with_observer(tx);

    engine.start_latency_timer();
    for _ in 0..=captures {
        clock.advance(Duration::from_millis(7));
        engine.capture_first_fragment();
    }

    let events: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
    events == [SyncEvent::LatencyCaptured { ttft_ms: 7.0 }]
}

/// Device behaviour per step: 0 ends the active utterance, 1 fails it,
/// 2 enqueues another chunk, anything else does nothing.
#[quickcheck]
fn chunks_play_in_order_one_at_a_time(steps: Vec<u8>) -> bool {
    let device = RecordingDevice::new();
    let mut engine = SyncEngine::new(SyncConfig::default(), device.clone()).unwrap();

    let mut next_start = 0;
    let mut enqueue = |engine: &mut SyncEngine<RecordingDevice>| {
        engine.enqueue_chunk("a b c", next_start);
        next_start += 3;
    };
    enqueue(&mut engine);

    for step in steps.into_iter().take(64) {
        let active = engine
            .queue_state()
            .speaking()
            .and_then(|_| device.last_utterance());
        match (step % 4, active) {
            (0, Some(utterance)) => {
                engine.handle_device_event(DeviceEvent::ended(utterance));
            }
            (1, Some(utterance)) => {
                engine.handle_device_event(DeviceEvent::error(
                    utterance,
                    DeviceErrorCode::AudioBusy,
                ));
            }
            (2, _) => enqueue(&mut engine),
            _ => {}
        }

        let state = engine.queue_state();
        let speaking = state
            .chunks
            .iter()
            .filter(|c| c.status == ChunkStatus::Speaking)
            .count();
        if speaking > 1 {
            return false;
        }
        // Everything before the cursor is finished, everything after is untouched.
        let ordered = state.chunks.iter().enumerate().all(|(i, c)| {
            if i < state.current_chunk_index {
                c.status.is_terminal()
            } else if i > state.current_chunk_index {
                c.status == ChunkStatus::Pending
            } else {
                true
            }
        });
        if !ordered {
            return false;
        }
    }

    let starts: Vec<usize> = engine
        .queue_state()
        .chunks
        .iter()
        .map(|c| c.start_index)
        .collect();
    starts.windows(2).all(|w| w[0] <= w[1])
}

#[quickcheck]
fn pause_twice_equals_pause_once(progress_frames: u8) -> bool {
    let clock = ManualClock::new();
    let mut engine = SyncEngine::new(SyncConfig::default(), RecordingDevice::new())
        .unwrap()
        .with_clock(clock.clone());
    engine.initialize("one two three four five six seven");
    engine.enqueue_chunk("one two three", 0);
    engine.start();
    for _ in 0..progress_frames {
        clock.advance(FRAME);
        engine.tick();
    }

    engine.pause();
    let once = engine.frame();
    engine.pause();
    engine.frame() == once
}
