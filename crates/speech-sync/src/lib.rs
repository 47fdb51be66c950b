pub mod accumulator;
pub mod clock;
pub mod config;
pub mod device;
pub mod driver;
pub mod engine;
pub mod error;
pub mod id;
pub mod latency;
pub mod observer;
pub mod queue;
pub mod scheduler;
pub mod stream;
pub mod timeline;
pub mod types;

pub use accumulator::{ChunkAccumulator, ChunkReady};
pub use clock::{Clock, ManualClock, MonotonicClock};
pub use config::{ENV_PREFIX, SyncConfig};
pub use device::{
    DeviceCall, DeviceErrorCode, DeviceEvent, DeviceEventKind, RecordingDevice, SpeechDevice,
    UtteranceId,
};
pub use driver::{FRAME_INTERVAL, FrameLoop, TokioClock, spawn_frame_loop};
pub use engine::SyncEngine;
pub use error::{Error, Result};
pub use id::{ChunkIdGenerator, SequentialChunkIds, UuidChunkIds};
pub use latency::{LatencyTracker, TtftMetrics};
pub use observer::{NoopObserver, SyncObserver};
pub use queue::SpeechQueue;
pub use scheduler::{PlaybackScheduler, Tick};
pub use stream::TextStream;
pub use timeline::WordTimeline;
pub use types::{
    ChunkStatus, SpeechChunk, SpeechQueueState, SyncEvent, SyncFrame, SyncState, SyncWord,
    TtftSnapshot, WordState,
};
