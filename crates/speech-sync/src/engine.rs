use std::time::{Duration, Instant};

use crate::accumulator::{ChunkAccumulator, ChunkReady};
use crate::clock::{Clock, MonotonicClock};
use crate::config::SyncConfig;
use crate::device::{DeviceEvent, SpeechDevice};
use crate::id::ChunkIdGenerator;
use crate::latency::{LatencyTracker, TtftMetrics};
use crate::observer::{NoopObserver, SyncObserver};
use crate::queue::SpeechQueue;
use crate::scheduler::{PlaybackScheduler, Tick};
use crate::stream::TextStream;
use crate::timeline::WordTimeline;
use crate::types::{SpeechQueueState, SyncFrame, SyncState, SyncWord};
use crate::Result;

/// One response cycle worth of reveal pacing, latency measurement and chunked
/// speech.
///
/// The engine owns all mutable state; observers are called synchronously from
/// inside the control methods and never see partially updated state. Word
/// pacing and speech progress are independent: the scheduler reveals words at
/// the configured rate whether or not the device is keeping up.
pub struct SyncEngine<D> {
    config: SyncConfig,
    clock: Box<dyn Clock>,
    observer: Box<dyn SyncObserver>,
    timeline: WordTimeline,
    scheduler: PlaybackScheduler,
    latency: LatencyTracker,
    stream: TextStream,
    accumulator: ChunkAccumulator,
    queue: SpeechQueue<D>,
    source_text: String,
}

impl<D: SpeechDevice> SyncEngine<D> {
    pub fn new(config: SyncConfig, device: D) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            timeline: WordTimeline::new(config.buffer_size),
            scheduler: PlaybackScheduler::new(config.word_interval()),
            latency: LatencyTracker::new(),
            stream: TextStream::new(),
            accumulator: ChunkAccumulator::new(config.speech_chunk_size),
            queue: SpeechQueue::new(device, config.voice_enabled),
            clock: Box::new(MonotonicClock),
            observer: Box::new(NoopObserver),
            source_text: String::new(),
            config,
        })
    }

    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Box::new(clock);
        self
    }

    pub fn with_observer(mut self, observer: impl SyncObserver + 'static) -> Self {
        self.observer = Box::new(observer);
        self
    }

    pub fn with_chunk_ids(mut self, ids: impl ChunkIdGenerator + 'static) -> Self {
        self.queue.set_ids(ids);
        self
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    pub fn device(&self) -> &D {
        self.queue.device()
    }

    pub fn device_mut(&mut self) -> &mut D {
        self.queue.device_mut()
    }

    pub fn source_text(&self) -> &str {
        &self.source_text
    }

    pub fn is_playing(&self) -> bool {
        self.scheduler.is_playing()
    }

    // ── Word timeline & scheduler ────────────────────────────────────────────

    /// Seed the timeline with `text`, replacing every word. Playback stops.
    pub fn initialize(&mut self, text: &str) {
        self.source_text = text.to_string();
        self.scheduler.stop();
        self.timeline.initialize(text);
    }

    /// Begin revealing words. Returns `false` (and does nothing) when the
    /// timeline is empty or already complete.
    pub fn start(&mut self) -> bool {
        let now = self.clock.now();
        self.scheduler.start(&self.timeline, now)
    }

    pub fn tick(&mut self) -> Tick {
        let now = self.clock.now();
        self.tick_at(now)
    }

    /// Advance pacing as of `now`. Meant to be called once per display frame.
    pub fn tick_at(&mut self, now: Instant) -> Tick {
        let tick = self.scheduler.tick(&mut self.timeline, now);
        match &tick {
            Tick::Advanced {
                index,
                word,
                finished,
            } => {
                self.observer.on_word_advanced(*index, word);
                if *finished {
                    self.observer.on_complete();
                }
            }
            Tick::Finished => self.observer.on_complete(),
            Tick::Idle | Tick::Waiting => {}
        }
        tick
    }

    /// Stop revealing words and pause the speech device with it.
    pub fn pause(&mut self) {
        self.scheduler.pause();
        self.queue.pause();
    }

    /// Jump to `index` (clamped). This is not a playback event, so
    /// `on_word_advanced` is not called.
    pub fn seek_to_word(&mut self, index: usize) -> usize {
        let index = self.timeline.seek(index);
        let now = self.clock.now();
        self.scheduler.rearm(now);
        index
    }

    /// Drop every piece of in-flight state and rebuild the timeline from the
    /// current source text.
    pub fn reset(&mut self) {
        self.scheduler.stop();
        self.timeline.initialize(&self.source_text);
        self.latency.reset();
        self.stream.reset();
        self.accumulator.reset();
        self.queue.reset();
        tracing::debug!(words = self.timeline.len(), "sync_engine_reset");
    }

    // ── Latency ──────────────────────────────────────────────────────────────

    pub fn start_latency_timer(&mut self) {
        let now = self.clock.now();
        self.latency.start_timer(now);
    }

    /// Report an incoming fragment. Only the first call after
    /// [`start_latency_timer`](Self::start_latency_timer) records anything;
    /// every call returns the latency captured so far.
    pub fn capture_first_fragment(&mut self) -> Option<Duration> {
        let now = self.clock.now();
        if let Some(ttft) = self.latency.capture_first_fragment(now) {
            self.observer.on_latency_captured(ttft);
        }
        self.latency.ttft()
    }

    // ── Text stream & speech queue ───────────────────────────────────────────

    pub fn enqueue_chunk(&mut self, text: impl Into<String>, start_index: usize) -> String {
        self.queue.enqueue(text, start_index)
    }

    /// Feed whole words from the text stream; full chunks are queued.
    pub fn add_words<I, S>(&mut self, words: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let ready = self.accumulator.add_words(words);
        self.enqueue_ready(ready);
    }

    /// Queue whatever is left in the accumulator.
    pub fn flush(&mut self) {
        let ready = self.accumulator.flush();
        self.enqueue_ready(ready);
    }

    /// Feed a raw text fragment as it arrives from the model. Captures the
    /// first-fragment latency and queues every chunk that became complete.
    pub fn push_fragment(&mut self, fragment: &str) {
        self.capture_first_fragment();
        let words = self.stream.push(fragment);
        self.add_words(words);
    }

    /// End of the text stream: queue the tail and seed the timeline with the
    /// full response text.
    pub fn finish_stream(&mut self) {
        let tail = self.stream.finish();
        self.add_words(tail);
        self.flush();

        let text = self.stream.text().to_string();
        self.initialize(&text);
        tracing::debug!(
            words = self.timeline.len(),
            chunks = self.queue.chunks().len(),
            "text_stream_finished"
        );
    }

    fn enqueue_ready(&mut self, ready: impl IntoIterator<Item = ChunkReady>) {
        for chunk in ready {
            self.queue.enqueue(chunk.text, chunk.start_index);
        }
    }

    pub fn handle_device_event(&mut self, event: DeviceEvent) -> bool {
        self.queue.handle_device_event(event)
    }

    /// The user started talking: silence the device immediately and cancel
    /// everything that has not been spoken yet.
    pub fn barge_in(&mut self) {
        self.queue.barge_in();
        self.observer.on_barge_in();
    }

    pub fn resume(&mut self) {
        self.queue.resume();
    }

    pub fn set_voice_enabled(&mut self, enabled: bool) {
        self.config.voice_enabled = enabled;
        self.queue.set_voice_enabled(enabled);
    }

    // ── Snapshots ────────────────────────────────────────────────────────────

    pub fn word_at(&self, index: usize) -> Option<&SyncWord> {
        self.timeline.word(index)
    }

    pub fn sync_state(&self) -> SyncState {
        self.timeline.snapshot(self.scheduler.is_playing())
    }

    pub fn queue_state(&self) -> SpeechQueueState {
        self.queue.snapshot()
    }

    pub fn metrics(&self) -> &TtftMetrics {
        self.latency.metrics()
    }

    pub fn frame(&self) -> SyncFrame {
        SyncFrame {
            sync: self.sync_state(),
            queue: self.queue_state(),
            latency: self.latency.metrics().snapshot(),
        }
    }
}
