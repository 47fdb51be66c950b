//! Fixed-size chunking of a word stream for early speech start.
//!
//! Speech can begin on the first chunk while later words are still arriving,
//! at the cost of slightly choppier prosody at chunk seams.

/// A run of words ready to be handed to the speech queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChunkReady {
    pub text: String,
    pub start_index: usize,
    pub word_count: usize,
}

impl ChunkReady {
    /// Inclusive index of the last word in the chunk.
    pub fn end_index(&self) -> usize {
        self.start_index + self.word_count.saturating_sub(1)
    }
}

pub struct ChunkAccumulator {
    chunk_size: usize,
    buffer: Vec<String>,
    emitted_words: usize,
}

impl ChunkAccumulator {
    pub fn new(chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            buffer: Vec::new(),
            emitted_words: 0,
        }
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn buffered(&self) -> &[String] {
        &self.buffer
    }

    /// Total number of words released in chunks since the last reset.
    pub fn emitted_words(&self) -> usize {
        self.emitted_words
    }

    /// Buffer `words` and release every full chunk that is now available.
    /// Blank entries are dropped.
    pub fn add_words<I, S>(&mut self, words: I) -> Vec<ChunkReady>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.buffer.extend(
            words
                .into_iter()
                .map(Into::into)
                .filter(|w: &String| !w.trim().is_empty()),
        );

        let mut ready = Vec::new();
        while self.buffer.len() >= self.chunk_size {
            let words: Vec<String> = self.buffer.drain(..self.chunk_size).collect();
            ready.push(self.emit(words));
        }
        ready
    }

    /// Release whatever is left, e.g. when the text stream ends mid-chunk.
    pub fn flush(&mut self) -> Option<ChunkReady> {
        if self.buffer.is_empty() {
            return None;
        }
        let words = std::mem::take(&mut self.buffer);
        Some(self.emit(words))
    }

    pub fn reset(&mut self) {
        self.buffer.clear();
        self.emitted_words = 0;
    }

    fn emit(&mut self, words: Vec<String>) -> ChunkReady {
        let chunk = ChunkReady {
            text: words.join(" "),
            start_index: self.emitted_words,
            word_count: words.len(),
        };
        self.emitted_words += chunk.word_count;
        chunk
    }
}
