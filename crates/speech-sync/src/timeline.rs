use crate::types::{SyncState, SyncWord, WordState};

/// Per-word reveal state for the current response text.
///
/// The timeline only knows about positions; pacing lives in
/// [`crate::scheduler::PlaybackScheduler`], which is the only caller that
/// moves the current index forward during playback.
pub struct WordTimeline {
    words: Vec<SyncWord>,
    current: usize,
    buffer_size: usize,
    completed: bool,
}

impl WordTimeline {
    pub fn new(buffer_size: usize) -> Self {
        Self {
            words: Vec::new(),
            current: 0,
            buffer_size,
            completed: false,
        }
    }

    /// Replace the whole timeline with the words of `text`.
    ///
    /// The first `buffer_size` words start `Buffered`, the rest `Pending`.
    pub fn initialize(&mut self, text: &str) {
        let buffer_size = self.buffer_size;
        self.words = text
            .split_whitespace()
            .enumerate()
            .map(|(index, word)| SyncWord {
                word: word.to_string(),
                index,
                state: if index < buffer_size {
                    WordState::Buffered
                } else {
                    WordState::Pending
                },
            })
            .collect();
        self.current = 0;
        self.completed = false;
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }

    pub fn words(&self) -> &[SyncWord] {
        &self.words
    }

    pub fn word(&self, index: usize) -> Option<&SyncWord> {
        self.words.get(index)
    }

    pub fn current_index(&self) -> usize {
        self.current
    }

    pub fn is_completed(&self) -> bool {
        self.completed
    }

    pub fn is_at_end(&self) -> bool {
        !self.words.is_empty() && self.current + 1 >= self.words.len()
    }

    pub fn buffer_end_index(&self) -> usize {
        match self.words.len() {
            0 => 0,
            len => self.current.saturating_add(self.buffer_size).min(len - 1),
        }
    }

    pub fn progress(&self) -> f64 {
        if self.completed {
            return 1.0;
        }
        match self.words.len() {
            0 | 1 => 0.0,
            len => self.current as f64 / (len - 1) as f64,
        }
    }

    /// Move one word forward. Returns the new current word, or `None` when
    /// already on the last word.
    pub(crate) fn advance(&mut self) -> Option<&SyncWord> {
        if self.is_empty() || self.is_at_end() {
            return None;
        }
        self.current += 1;
        self.recompute();
        self.words.get(self.current)
    }

    /// Jump to `index`, clamped into range. Leaves the completed state.
    pub(crate) fn seek(&mut self, index: usize) -> usize {
        if self.words.is_empty() {
            return 0;
        }
        self.current = index.min(self.words.len() - 1);
        self.completed = false;
        self.recompute();
        self.current
    }

    pub(crate) fn complete(&mut self) {
        for word in &mut self.words {
            word.state = WordState::Spoken;
        }
        self.completed = true;
    }

    fn recompute(&mut self) {
        let current = self.current;
        let lookahead = current.saturating_add(self.buffer_size);
        for word in &mut self.words {
            word.state = if word.index < current {
                WordState::Spoken
            } else if word.index == current {
                WordState::Speaking
            } else if word.index <= lookahead {
                WordState::Buffered
            } else {
                WordState::Pending
            };
        }
    }

    pub fn snapshot(&self, is_playing: bool) -> SyncState {
        SyncState {
            words: self.words.clone(),
            current_word_index: self.current,
            buffer_end_index: self.buffer_end_index(),
            is_playing,
            progress: self.progress(),
        }
    }
}
