use std::sync::{Arc, Mutex};

/// Identifies one `speak` call. Lifecycle events carry it back so that late
/// events from a cancelled utterance can be told apart from the active one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct UtteranceId(pub u64);

/// The speech-output capability the queue drives.
///
/// Implementations start audio in `speak` and report its lifecycle back
/// through [`crate::queue::SpeechQueue::handle_device_event`] (or
/// [`crate::engine::SyncEngine::handle_device_event`]). They must not call
/// back into the queue from inside these methods.
pub trait SpeechDevice: Send {
    fn speak(&mut self, utterance: UtteranceId, text: &str);
    fn cancel(&mut self);
    fn pause(&mut self);
    fn resume(&mut self);
}

impl<D: SpeechDevice + ?Sized> SpeechDevice for Box<D> {
    fn speak(&mut self, utterance: UtteranceId, text: &str) {
        (**self).speak(utterance, text)
    }

    fn cancel(&mut self) {
        (**self).cancel()
    }

    fn pause(&mut self) {
        (**self).pause()
    }

    fn resume(&mut self) {
        (**self).resume()
    }
}

/// Error vocabulary of speech-synthesis backends.
#[derive(Debug, Clone, PartialEq, Eq, strum::EnumString)]
#[strum(serialize_all = "kebab-case")]
pub enum DeviceErrorCode {
    Interrupted,
    Canceled,
    AudioBusy,
    AudioHardware,
    Network,
    SynthesisUnavailable,
    SynthesisFailed,
    LanguageUnavailable,
    VoiceUnavailable,
    TextTooLong,
    InvalidArgument,
    NotAllowed,
    #[strum(default)]
    Other(String),
}

impl DeviceErrorCode {
    /// Errors caused by our own `cancel()`; these are expected and silent.
    pub fn is_interruption(&self) -> bool {
        matches!(self, Self::Interrupted | Self::Canceled)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Interrupted => "interrupted",
            Self::Canceled => "canceled",
            Self::AudioBusy => "audio-busy",
            Self::AudioHardware => "audio-hardware",
            Self::Network => "network",
            Self::SynthesisUnavailable => "synthesis-unavailable",
            Self::SynthesisFailed => "synthesis-failed",
            Self::LanguageUnavailable => "language-unavailable",
            Self::VoiceUnavailable => "voice-unavailable",
            Self::TextTooLong => "text-too-long",
            Self::InvalidArgument => "invalid-argument",
            Self::NotAllowed => "not-allowed",
            Self::Other(code) => code,
        }
    }
}

impl std::fmt::Display for DeviceErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceEventKind {
    Started,
    Ended,
    Error(DeviceErrorCode),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceEvent {
    pub utterance: UtteranceId,
    pub kind: DeviceEventKind,
}

impl DeviceEvent {
    pub fn started(utterance: UtteranceId) -> Self {
        Self {
            utterance,
            kind: DeviceEventKind::Started,
        }
    }

    pub fn ended(utterance: UtteranceId) -> Self {
        Self {
            utterance,
            kind: DeviceEventKind::Ended,
        }
    }

    pub fn error(utterance: UtteranceId, code: DeviceErrorCode) -> Self {
        Self {
            utterance,
            kind: DeviceEventKind::Error(code),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DeviceCall {
    Speak { utterance: UtteranceId, text: String },
    Cancel,
    Pause,
    Resume,
}

/// Device that only records what it was asked to do.
///
/// Clones share one call log, so a test can keep a handle while the engine
/// owns the device. Nothing is ever reported back; the caller plays the role
/// of the audio backend by feeding [`DeviceEvent`]s in.
#[derive(Debug, Clone, Default)]
pub struct RecordingDevice {
    calls: Arc<Mutex<Vec<DeviceCall>>>,
}

impl RecordingDevice {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn calls(&self) -> Vec<DeviceCall> {
        self.log().clone()
    }

    pub fn spoken(&self) -> Vec<String> {
        self.log()
            .iter()
            .filter_map(|call| match call {
                DeviceCall::Speak { text, .. } => Some(text.clone()),
                _ => None,
            })
            .collect()
    }

    pub fn last_utterance(&self) -> Option<UtteranceId> {
        self.log().iter().rev().find_map(|call| match call {
            DeviceCall::Speak { utterance, .. } => Some(*utterance),
            _ => None,
        })
    }

    pub fn count(&self, call: &DeviceCall) -> usize {
        self.log().iter().filter(|c| *c == call).count()
    }

    fn log(&self) -> std::sync::MutexGuard<'_, Vec<DeviceCall>> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn record(&self, call: DeviceCall) {
        self.log().push(call);
    }
}

impl SpeechDevice for RecordingDevice {
    fn speak(&mut self, utterance: UtteranceId, text: &str) {
        self.record(DeviceCall::Speak {
            utterance,
            text: text.to_string(),
        });
    }

    fn cancel(&mut self) {
        self.record(DeviceCall::Cancel);
    }

    fn pause(&mut self) {
        self.record(DeviceCall::Pause);
    }

    fn resume(&mut self) {
        self.record(DeviceCall::Resume);
    }
}
