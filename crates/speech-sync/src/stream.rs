/// Splits raw text fragments into whole words.
///
/// Streamed fragments cut words at arbitrary points ("Hel" + "lo wor" +
/// "ld"), so a word is only released once whitespace follows it. The full
/// text seen so far is kept for seeding the word timeline.
#[derive(Debug, Default)]
pub struct TextStream {
    text: String,
    carry: String,
}

impl TextStream {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn push(&mut self, fragment: &str) -> Vec<String> {
        self.text.push_str(fragment);
        self.carry.push_str(fragment);

        let mut words = Vec::new();
        let mut word_start = None;

        for (i, c) in self.carry.char_indices() {
            if c.is_whitespace() {
                if let Some(start) = word_start.take() {
                    words.push(self.carry[start..i].to_string());
                }
            } else if word_start.is_none() {
                word_start = Some(i);
            }
        }

        // Keep the unterminated tail for the next fragment.
        self.carry = match word_start {
            Some(start) => self.carry[start..].to_string(),
            None => String::new(),
        };

        words
    }

    /// Release the trailing word once the stream has ended.
    pub fn finish(&mut self) -> Option<String> {
        let tail = std::mem::take(&mut self.carry);
        (!tail.is_empty()).then_some(tail)
    }

    pub fn reset(&mut self) {
        self.text.clear();
        self.carry.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn words_split_across_fragments() {
        let mut stream = TextStream::new();

        assert!(stream.push("Hel").is_empty());
        assert_eq!(stream.push("lo wor"), ["Hello"]);
        assert_eq!(stream.push("ld, how "), ["world,", "how"]);
        assert_eq!(stream.push("are"), Vec::<String>::new());
        assert_eq!(stream.finish().as_deref(), Some("are"));
        assert_eq!(stream.text(), "Hello world, how are");
    }

    #[test]
    fn finish_without_tail() {
        let mut stream = TextStream::new();
        assert_eq!(stream.push("one two\n"), ["one", "two"]);
        assert_eq!(stream.finish(), None);
    }

    #[test]
    fn reset_clears_text() {
        let mut stream = TextStream::new();
        stream.push("partial");
        stream.reset();
        assert_eq!(stream.text(), "");
        assert_eq!(stream.finish(), None);
    }
}
