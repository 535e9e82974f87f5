//! Speech capture contract.

pub const DEFAULT_SPEECH_LOCALE: &str = "en-US";

/// Recognition settings handed to the speech engine for one capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecognitionConfig {
    pub locale: String,
    pub continuous: bool,
    pub interim_results: bool,
}

impl RecognitionConfig {
    /// One utterance, final result only.
    pub fn single_utterance(locale: impl Into<String>) -> Self {
        Self {
            locale: locale.into(),
            continuous: false,
            interim_results: false,
        }
    }
}

impl Default for RecognitionConfig {
    fn default() -> Self {
        Self::single_utterance(DEFAULT_SPEECH_LOCALE)
    }
}

/// Terminal outcome of a single capture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CaptureOutcome {
    Transcript(String),
    Error(String),
    /// The engine stopped without hearing anything usable.
    NoResult,
}

impl CaptureOutcome {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Transcript(_) => "transcript",
            Self::Error(_) => "error",
            Self::NoResult => "no_result",
        }
    }
}
