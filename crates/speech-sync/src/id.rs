/// Names each speech chunk as it enters the queue. Ids are what observers
/// and logs use to follow one chunk from `Pending` to its terminal status.
pub trait ChunkIdGenerator: Send {
    fn next_chunk_id(&mut self) -> String;
}

pub struct UuidChunkIds;

impl Default for UuidChunkIds {
    fn default() -> Self {
        Self
    }
}

impl ChunkIdGenerator for UuidChunkIds {
    fn next_chunk_id(&mut self) -> String {
        uuid::Uuid::new_v4().to_string()
    }
}

/// Numbers chunks `chunk-0`, `chunk-1`, … in enqueue order, so assertions
/// can name a chunk by position. Resetting the queue does not restart the
/// count; a chunk enqueued after a barge-in never reuses a cancelled one's id.
pub struct SequentialChunkIds(u64);

impl SequentialChunkIds {
    pub fn new() -> Self {
        Self(0)
    }
}

impl Default for SequentialChunkIds {
    fn default() -> Self {
        Self::new()
    }
}

impl ChunkIdGenerator for SequentialChunkIds {
    fn next_chunk_id(&mut self) -> String {
        let id = self.0;
        self.0 += 1;
        format!("chunk-{id}")
    }
}
