#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
#[serde(rename_all = "lowercase")]
pub enum WordState {
    Pending,
    Buffered,
    Speaking,
    Spoken,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
pub struct SyncWord {
    pub word: String,
    pub index: usize,
    pub state: WordState,
}

/// Point-in-time view of the word timeline.
///
/// `progress` is `current_word_index / (words.len() - 1)`, pinned to `0.0`
/// for an empty timeline and to `1.0` once playback has completed.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
pub struct SyncState {
    pub words: Vec<SyncWord>,
    pub current_word_index: usize,
    pub buffer_end_index: usize,
    pub is_playing: bool,
    pub progress: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
#[serde(rename_all = "lowercase")]
pub enum ChunkStatus {
    Pending,
    Speaking,
    Spoken,
    Cancelled,
}

impl ChunkStatus {
    pub fn is_terminal(self) -> bool {
        matches!(self, Self::Spoken | Self::Cancelled)
    }
}

/// One utterance worth of text. `end_index` is inclusive.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
pub struct SpeechChunk {
    pub id: String,
    pub text: String,
    pub start_index: usize,
    pub end_index: usize,
    pub status: ChunkStatus,
}

#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
pub struct SpeechQueueState {
    pub chunks: Vec<SpeechChunk>,
    pub current_chunk_index: usize,
    pub is_playing: bool,
    pub is_paused: bool,
    pub is_barging_in: bool,
}

impl SpeechQueueState {
    pub fn speaking(&self) -> Option<&SpeechChunk> {
        self.chunks
            .iter()
            .find(|c| c.status == ChunkStatus::Speaking)
    }
}

/// Wire form of [`crate::latency::TtftMetrics`]. Monotonic instants have no
/// meaningful serialization, so only the measured duration is carried.
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
pub struct TtftSnapshot {
    pub ttft_ms: Option<f64>,
    pub is_tracking: bool,
}

/// Complete snapshot of engine state at a point in time.
///
/// This is what a presentation layer reads to draw one frame: word
/// highlighting from `sync`, chunk progress from `queue`, and the latency
/// badge from `latency`. Produced by [`crate::engine::SyncEngine::frame`].
#[derive(Debug, Clone, Default, PartialEq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
pub struct SyncFrame {
    pub sync: SyncState,
    pub queue: SpeechQueueState,
    pub latency: TtftSnapshot,
}

#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[cfg_attr(feature = "specta", derive(specta::Type))]
#[serde(tag = "type")]
pub enum SyncEvent {
    #[serde(rename = "wordAdvanced")]
    WordAdvanced { index: usize, word: String },
    #[serde(rename = "complete")]
    Complete,
    #[serde(rename = "latencyCaptured")]
    LatencyCaptured { ttft_ms: f64 },
    #[serde(rename = "bargeIn")]
    BargeIn,
}
