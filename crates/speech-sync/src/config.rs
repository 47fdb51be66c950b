use std::time::Duration;

use serde::Deserialize;

use crate::{Error, Result};

pub const ENV_PREFIX: &str = "SPEECH_SYNC_";

fn default_buffer_size() -> usize {
    5
}

fn default_words_per_second() -> f64 {
    2.5
}

fn default_speech_chunk_size() -> usize {
    5
}

fn default_voice_enabled() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct SyncConfig {
    /// Number of upcoming words marked `Buffered` ahead of the current one.
    #[serde(default = "default_buffer_size")]
    pub buffer_size: usize,
    #[serde(default = "default_words_per_second")]
    pub words_per_second: f64,
    /// Words per utterance handed to the speech device.
    #[serde(default = "default_speech_chunk_size")]
    pub speech_chunk_size: usize,
    #[serde(default = "default_voice_enabled")]
    pub voice_enabled: bool,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            buffer_size: default_buffer_size(),
            words_per_second: default_words_per_second(),
            speech_chunk_size: default_speech_chunk_size(),
            voice_enabled: default_voice_enabled(),
        }
    }
}

impl SyncConfig {
    /// Load from `SPEECH_SYNC_*` environment variables, reading an optional
    /// `.env` file first. Missing variables fall back to defaults.
    pub fn from_env() -> Result<Self> {
        let _ = dotenvy::dotenv();
        let config: Self = envy::prefixed(ENV_PREFIX).from_env()?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_vars<I>(vars: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let config: Self = envy::prefixed(ENV_PREFIX).from_iter(vars)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if !self.words_per_second.is_finite() || self.words_per_second <= 0.0 {
            return Err(Error::InvalidConfig(format!(
                "words_per_second must be positive, got {}",
                self.words_per_second
            )));
        }
        if Duration::try_from_secs_f64(self.words_per_second.recip()).is_err() {
            return Err(Error::InvalidConfig(format!(
                "words_per_second {} is too slow to pace",
                self.words_per_second
            )));
        }
        if self.speech_chunk_size == 0 {
            return Err(Error::InvalidConfig(
                "speech_chunk_size must be at least 1".to_string(),
            ));
        }
        Ok(())
    }

    /// Time between two word advances at the configured pace. Saturates for
    /// paces [`validate`](Self::validate) would reject.
    pub fn word_interval(&self) -> Duration {
        Duration::try_from_secs_f64(self.words_per_second.recip()).unwrap_or(Duration::MAX)
    }

    pub fn with_buffer_size(mut self, buffer_size: usize) -> Self {
        self.buffer_size = buffer_size;
        self
    }

    pub fn with_words_per_second(mut self, words_per_second: f64) -> Self {
        self.words_per_second = words_per_second;
        self
    }

    pub fn with_speech_chunk_size(mut self, speech_chunk_size: usize) -> Self {
        self.speech_chunk_size = speech_chunk_size;
        self
    }

    pub fn with_voice_enabled(mut self, voice_enabled: bool) -> Self {
        self.voice_enabled = voice_enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn vars(pairs: &[(&str, &str)]) -> Vec<(String, String)> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults() {
        let config = SyncConfig::default();
        assert_eq!(config.buffer_size, 5);
        assert_eq!(config.words_per_second, 2.5);
        assert_eq!(config.speech_chunk_size, 5);
        assert!(config.voice_enabled);
        assert_eq!(config.word_interval(), Duration::from_millis(400));
    }

    #[test]
    fn empty_env_yields_defaults() {
        let config = SyncConfig::from_vars(vec![]).unwrap();
        assert_eq!(config, SyncConfig::default());
    }

    #[test]
    fn prefixed_vars_override_defaults() {
        let config = SyncConfig::from_vars(vars(&[
            ("SPEECH_SYNC_WORDS_PER_SECOND", "4"),
            ("SPEECH_SYNC_SPEECH_CHUNK_SIZE", "3"),
            ("SPEECH_SYNC_VOICE_ENABLED", "false"),
            ("UNRELATED", "x"),
        ]))
        .unwrap();

        assert_eq!(config.words_per_second, 4.0);
        assert_eq!(config.speech_chunk_size, 3);
        assert!(!config.voice_enabled);
        assert_eq!(config.buffer_size, 5);
    }

    #[test]
    fn rejects_non_positive_pace() {
        let err = SyncConfig::from_vars(vars(&[("SPEECH_SYNC_WORDS_PER_SECOND", "0")]));
        assert!(matches!(err, Err(Error::InvalidConfig(_))));

        let config = SyncConfig::default().with_words_per_second(f64::NAN);
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_pace_with_unrepresentable_interval() {
        let config = SyncConfig::default().with_words_per_second(1e-30);
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
        assert_eq!(config.word_interval(), Duration::MAX);

        let slow = SyncConfig::default().with_words_per_second(0.5);
        assert!(slow.validate().is_ok());
        assert_eq!(slow.word_interval(), Duration::from_secs(2));
    }

    #[test]
    fn rejects_empty_chunks() {
        let config = SyncConfig::default().with_speech_chunk_size(0);
        assert!(matches!(config.validate(), Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn malformed_value_is_env_error() {
        let err = SyncConfig::from_vars(vars(&[("SPEECH_SYNC_BUFFER_SIZE", "many")]));
        assert!(matches!(err, Err(Error::Env(_))));
    }
}
