use crate::device::{DeviceEvent, DeviceEventKind, SpeechDevice, UtteranceId};
use crate::id::{ChunkIdGenerator, UuidChunkIds};
use crate::types::{ChunkStatus, SpeechChunk, SpeechQueueState};

/// Serializes chunk playback through a single speech device.
///
/// Exactly one utterance is outstanding at a time. Device lifecycle events
/// are fed back through [`handle_device_event`](Self::handle_device_event),
/// which advances to the next pending chunk on its own, so a steady stream of
/// `Ended` events drains the queue without further calls.
///
/// Every utterance gets a fresh [`UtteranceId`]. Events for any id other
/// than the active one are stale and ignored, which is what keeps a late
/// `Ended` from a barged-in utterance from marking its chunk `Spoken`.
pub struct SpeechQueue<D> {
    device: D,
    ids: Box<dyn ChunkIdGenerator>,
    chunks: Vec<SpeechChunk>,
    current: usize,
    active: Option<UtteranceId>,
    next_utterance: u64,
    voice_enabled: bool,
    is_playing: bool,
    is_paused: bool,
    is_barging_in: bool,
    device_paused: bool,
    discard_on_enqueue: bool,
}

impl<D: SpeechDevice> SpeechQueue<D> {
    pub fn new(device: D, voice_enabled: bool) -> Self {
        Self::with_ids(device, voice_enabled, UuidChunkIds)
    }

    pub fn with_ids(
        device: D,
        voice_enabled: bool,
        ids: impl ChunkIdGenerator + 'static,
    ) -> Self {
        Self {
            device,
            ids: Box::new(ids),
            chunks: Vec::new(),
            current: 0,
            active: None,
            next_utterance: 0,
            voice_enabled,
            is_playing: false,
            is_paused: false,
            is_barging_in: false,
            device_paused: false,
            discard_on_enqueue: false,
        }
    }

    pub fn set_ids(&mut self, ids: impl ChunkIdGenerator + 'static) {
        self.ids = Box::new(ids);
    }

    pub fn device(&self) -> &D {
        &self.device
    }

    pub fn device_mut(&mut self) -> &mut D {
        &mut self.device
    }

    pub fn chunks(&self) -> &[SpeechChunk] {
        &self.chunks
    }

    pub fn current_chunk_index(&self) -> usize {
        self.current
    }

    pub fn active_utterance(&self) -> Option<UtteranceId> {
        self.active
    }

    pub fn is_speaking(&self) -> bool {
        self.active.is_some()
    }

    pub fn is_paused(&self) -> bool {
        self.is_paused
    }

    pub fn is_barging_in(&self) -> bool {
        self.is_barging_in
    }

    pub fn voice_enabled(&self) -> bool {
        self.voice_enabled
    }

    /// Append a chunk covering the words starting at `start_index`, and start
    /// speaking it if the device is free. Returns the new chunk's id.
    ///
    /// After a barge-in the cancelled chunks are dropped here, so the first
    /// enqueue starts a fresh queue. It is not spoken until [`resume`](Self::resume).
    pub fn enqueue(&mut self, text: impl Into<String>, start_index: usize) -> String {
        if self.discard_on_enqueue {
            self.chunks.clear();
            self.current = 0;
            self.discard_on_enqueue = false;
        }

        let text = text.into();
        let word_count = text.split_whitespace().count().max(1);
        let chunk = SpeechChunk {
            id: self.ids.next_chunk_id(),
            text,
            start_index,
            end_index: start_index.saturating_add(word_count - 1),
            status: ChunkStatus::Pending,
        };
        let id = chunk.id.clone();

        tracing::debug!(
            chunk_id = %id,
            start_index,
            words = word_count,
            "speech_chunk_enqueued"
        );
        self.chunks.push(chunk);

        if self.active.is_none() && !self.is_paused && self.voice_enabled {
            self.process_next();
        }
        id
    }

    /// Hand the current chunk to the device if everything allows it.
    /// Returns `true` when an utterance was started.
    pub fn process_next(&mut self) -> bool {
        if self.active.is_some() || self.is_paused || !self.voice_enabled {
            return false;
        }
        let Some(chunk) = self.chunks.get_mut(self.current) else {
            return false;
        };
        if chunk.status != ChunkStatus::Pending {
            return false;
        }

        let utterance = UtteranceId(self.next_utterance);
        self.next_utterance += 1;
        self.active = Some(utterance);
        chunk.status = ChunkStatus::Speaking;

        tracing::debug!(chunk_id = %chunk.id, utterance = utterance.0, "speech_chunk_started");
        self.device.speak(utterance, &chunk.text);
        true
    }

    /// Apply one lifecycle event from the device. Returns `false` for stale
    /// events that no longer match the active utterance.
    pub fn handle_device_event(&mut self, event: DeviceEvent) -> bool {
        if self.active != Some(event.utterance) {
            tracing::trace!(utterance = event.utterance.0, "stale_device_event");
            return false;
        }

        match event.kind {
            DeviceEventKind::Started => {
                self.is_playing = true;
            }
            DeviceEventKind::Ended => {
                self.finish_current(ChunkStatus::Spoken);
            }
            DeviceEventKind::Error(code) => {
                if !code.is_interruption() {
                    let chunk_id = self
                        .chunks
                        .get(self.current)
                        .map(|c| c.id.as_str())
                        .unwrap_or_default();
                    tracing::warn!(chunk_id, code = %code, "speech_chunk_failed");
                }
                self.finish_current(ChunkStatus::Cancelled);
            }
        }
        true
    }

    fn finish_current(&mut self, status: ChunkStatus) {
        if let Some(chunk) = self.chunks.get_mut(self.current) {
            chunk.status = status;
            tracing::debug!(chunk_id = %chunk.id, ?status, "speech_chunk_finished");
        }
        self.current += 1;
        self.active = None;
        self.is_playing = false;
        self.device_paused = false;
        self.process_next();
    }

    /// Stop everything now. Pending and speaking chunks become `Cancelled`
    /// and the queue stays paused until [`resume`](Self::resume).
    ///
    /// Returns the number of chunks cancelled.
    pub fn barge_in(&mut self) -> usize {
        self.device.cancel();
        self.active = None;
        self.is_playing = false;
        self.device_paused = false;

        let start = self.current.min(self.chunks.len());
        let mut cancelled = 0;
        for chunk in &mut self.chunks[start..] {
            if matches!(chunk.status, ChunkStatus::Pending | ChunkStatus::Speaking) {
                chunk.status = ChunkStatus::Cancelled;
                cancelled += 1;
            }
        }
        self.current = self.chunks.len();
        self.is_paused = true;
        self.is_barging_in = true;
        self.discard_on_enqueue = true;

        tracing::info!(cancelled, "speech_barge_in");
        cancelled
    }

    pub fn pause(&mut self) {
        if self.is_paused {
            return;
        }
        self.is_paused = true;
        if self.active.is_some() && !self.device_paused {
            self.device.pause();
            self.device_paused = true;
            tracing::info!("speech_device_paused");
        }
    }

    pub fn resume(&mut self) {
        self.is_paused = false;
        self.is_barging_in = false;
        if self.device_paused {
            self.device.resume();
            self.device_paused = false;
        }
        self.process_next();
    }

    /// Turn speech output on or off. Switching off cancels the utterance in
    /// flight (its chunk is skipped); later chunks stay pending.
    pub fn set_voice_enabled(&mut self, enabled: bool) {
        if self.voice_enabled == enabled {
            return;
        }
        self.voice_enabled = enabled;

        if enabled {
            self.process_next();
        } else if self.active.is_some() {
            self.device.cancel();
            self.finish_current(ChunkStatus::Cancelled);
        }
    }

    pub fn reset(&mut self) {
        if self.active.is_some() {
            self.device.cancel();
        }
        self.chunks.clear();
        self.current = 0;
        self.active = None;
        self.is_playing = false;
        self.is_paused = false;
        self.is_barging_in = false;
        self.device_paused = false;
        self.discard_on_enqueue = false;
    }

    pub fn snapshot(&self) -> SpeechQueueState {
        SpeechQueueState {
            chunks: self.chunks.clone(),
            current_chunk_index: self.current,
            is_playing: self.is_playing,
            is_paused: self.is_paused,
            is_barging_in: self.is_barging_in,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::device::{DeviceCall, DeviceErrorCode, RecordingDevice};
    use crate::id::SequentialChunkIds;

    fn queue() -> (SpeechQueue<RecordingDevice>, RecordingDevice) {
        let device = RecordingDevice::new();
        let queue = SpeechQueue::with_ids(device.clone(), true, SequentialChunkIds::new());
        (queue, device)
    }

    fn statuses(queue: &SpeechQueue<RecordingDevice>) -> Vec<ChunkStatus> {
        queue.chunks().iter().map(|c| c.status).collect()
    }

    fn active(queue: &SpeechQueue<RecordingDevice>) -> UtteranceId {
        queue.active_utterance().expect("an utterance should be active")
    }

    #[test]
    fn first_enqueue_starts_speaking() {
        let (mut queue, device) = queue();

        let id = queue.enqueue("hello there friend", 0);
        assert_eq!(id, "chunk-0");
        assert_eq!(statuses(&queue), [ChunkStatus::Speaking]);
        assert_eq!(queue.chunks()[0].end_index, 2);
        assert_eq!(device.spoken(), ["hello there friend"]);

        assert!(!queue.snapshot().is_playing);
        queue.handle_device_event(DeviceEvent::started(active(&queue)));
        assert!(queue.snapshot().is_playing);
    }

    #[test]
    fn end_index_saturates_near_usize_max() {
        let (mut queue, device) = queue();
        queue.enqueue("a b", usize::MAX);

        let chunk = &queue.chunks()[0];
        assert_eq!(chunk.start_index, usize::MAX);
        assert_eq!(chunk.end_index, usize::MAX);
        assert_eq!(device.spoken(), ["a b"]);
    }

    #[test]
    fn ended_event_drives_next_chunk() {
        let (mut queue, device) = queue();
        queue.enqueue("one two", 0);
        queue.enqueue("three four", 2);
        queue.enqueue("five", 4);

        assert_eq!(
            statuses(&queue),
            [
                ChunkStatus::Speaking,
                ChunkStatus::Pending,
                ChunkStatus::Pending
            ]
        );

        queue.handle_device_event(DeviceEvent::ended(active(&queue)));

        assert_eq!(
            statuses(&queue),
            [
                ChunkStatus::Spoken,
                ChunkStatus::Speaking,
                ChunkStatus::Pending
            ]
        );
        assert_eq!(queue.current_chunk_index(), 1);
        assert_eq!(device.spoken(), ["one two", "three four"]);
    }

    #[test]
    fn barge_in_cancels_speaking_and_pending() {
        let (mut queue, device) = queue();
        queue.enqueue("one", 0);
        queue.enqueue("two", 1);
        queue.enqueue("three", 2);
        queue.handle_device_event(DeviceEvent::ended(active(&queue)));
        let interrupted = active(&queue);

        assert_eq!(queue.barge_in(), 2);

        assert_eq!(
            statuses(&queue),
            [
                ChunkStatus::Spoken,
                ChunkStatus::Cancelled,
                ChunkStatus::Cancelled
            ]
        );
        let state = queue.snapshot();
        assert!(state.is_paused);
        assert!(state.is_barging_in);
        assert!(state.speaking().is_none());
        assert_eq!(device.count(&DeviceCall::Cancel), 1);

        // The device reports the interruption late; it must not resurrect anything.
        assert!(!queue.handle_device_event(DeviceEvent::ended(interrupted)));
        assert!(!queue.handle_device_event(DeviceEvent::error(
            interrupted,
            DeviceErrorCode::Interrupted
        )));
        assert_eq!(queue.chunks()[1].status, ChunkStatus::Cancelled);
    }

    #[test]
    fn enqueue_after_barge_in_waits_for_resume() {
        let (mut queue, device) = queue();
        queue.enqueue("old words", 0);
        queue.barge_in();

        queue.enqueue("fresh start", 0);
        assert_eq!(queue.chunks().len(), 1);
        assert_eq!(queue.current_chunk_index(), 0);
        assert_eq!(statuses(&queue), [ChunkStatus::Pending]);
        assert_eq!(device.spoken(), ["old words"]);

        queue.resume();
        assert!(!queue.is_barging_in());
        assert_eq!(statuses(&queue), [ChunkStatus::Speaking]);
        assert_eq!(device.spoken(), ["old words", "fresh start"]);
    }

    #[test]
    fn barge_in_when_idle_still_cancels_device() {
        let (mut queue, device) = queue();
        assert_eq!(queue.barge_in(), 0);
        assert_eq!(device.count(&DeviceCall::Cancel), 1);
        assert!(queue.is_paused());
    }

    #[test]
    #[tracing_test::traced_test]
    fn device_error_skips_chunk_and_continues() {
        let (mut queue, device) = queue();
        queue.enqueue("broken", 0);
        queue.enqueue("fine", 1);

        queue.handle_device_event(DeviceEvent::error(
            active(&queue),
            DeviceErrorCode::SynthesisFailed,
        ));

        assert_eq!(
            statuses(&queue),
            [ChunkStatus::Cancelled, ChunkStatus::Speaking]
        );
        assert_eq!(device.spoken(), ["broken", "fine"]);
        assert!(logs_contain("speech_chunk_failed"));
        assert!(logs_contain("synthesis-failed"));
    }

    #[test]
    #[tracing_test::traced_test]
    fn interruption_error_is_silent() {
        let (mut queue, _device) = queue();
        queue.enqueue("cut short", 0);
        queue.enqueue("next", 2);

        queue.handle_device_event(DeviceEvent::error(
            active(&queue),
            DeviceErrorCode::Interrupted,
        ));

        assert_eq!(
            statuses(&queue),
            [ChunkStatus::Cancelled, ChunkStatus::Speaking]
        );
        assert!(!logs_contain("speech_chunk_failed"));
    }

    #[test]
    fn pause_is_idempotent() {
        let (mut queue, device) = queue();
        queue.enqueue("one two", 0);

        queue.pause();
        let once = queue.snapshot();
        queue.pause();

        assert_eq!(queue.snapshot(), once);
        assert_eq!(device.count(&DeviceCall::Pause), 1);

        queue.resume();
        assert_eq!(device.count(&DeviceCall::Resume), 1);
        assert!(!queue.is_paused());
    }

    #[test]
    fn paused_queue_holds_new_chunks() {
        let (mut queue, device) = queue();
        queue.pause();
        queue.enqueue("held", 0);

        assert!(device.spoken().is_empty());
        // Nothing was speaking, so there is nothing to resume on the device.
        queue.resume();
        assert_eq!(device.count(&DeviceCall::Resume), 0);
        assert_eq!(device.spoken(), ["held"]);
    }

    #[test]
    fn voice_disabled_keeps_chunks_pending() {
        let device = RecordingDevice::new();
        let mut queue = SpeechQueue::with_ids(device.clone(), false, SequentialChunkIds::new());

        queue.enqueue("quiet", 0);
        assert!(!queue.process_next());
        assert_eq!(statuses(&queue), [ChunkStatus::Pending]);

        queue.set_voice_enabled(true);
        assert_eq!(device.spoken(), ["quiet"]);
    }

    #[test]
    fn disabling_voice_skips_active_chunk() {
        let (mut queue, device) = queue();
        queue.enqueue("loud", 0);
        queue.enqueue("later", 1);

        queue.set_voice_enabled(false);

        assert_eq!(
            statuses(&queue),
            [ChunkStatus::Cancelled, ChunkStatus::Pending]
        );
        assert_eq!(device.count(&DeviceCall::Cancel), 1);
        assert!(!queue.is_speaking());
    }

    #[test]
    fn reset_clears_everything() {
        let (mut queue, device) = queue();
        queue.enqueue("one", 0);
        queue.enqueue("two", 1);
        queue.barge_in();

        queue.reset();
        assert_eq!(queue.snapshot(), SpeechQueueState::default());
        // The barge-in already cancelled; reset with nothing active does not.
        assert_eq!(device.count(&DeviceCall::Cancel), 1);

        queue.enqueue("again", 0);
        assert_eq!(device.spoken().last().map(String::as_str), Some("again"));
    }
}
