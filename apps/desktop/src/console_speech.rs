//! Stands in for the host speech engine: the utterance comes from a flag or
//! from one line typed on the console.

use async_trait::async_trait;
use client_core::{CaptureOutcome, RecognitionConfig, SpeechRecognizer};
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tracing::debug;

pub struct ConsoleSpeechRecognizer {
    scripted: Option<String>,
}

impl ConsoleSpeechRecognizer {
    pub fn new(scripted: Option<String>) -> Self {
        Self { scripted }
    }
}

#[async_trait]
impl SpeechRecognizer for ConsoleSpeechRecognizer {
    async fn capture(&self, config: &RecognitionConfig) -> CaptureOutcome {
        if let Some(text) = &self.scripted {
            return CaptureOutcome::Transcript(text.clone());
        }

        let mut stdout = io::stdout();
        let prompt = format!("Describe your symptoms [{}]: ", config.locale);
        if let Err(err) = stdout.write_all(prompt.as_bytes()).await {
            return CaptureOutcome::Error(format!("console unavailable: {err}"));
        }
        if let Err(err) = stdout.flush().await {
            debug!("failed to flush console prompt: {err}");
        }

        let mut lines = BufReader::new(io::stdin()).lines();
        match lines.next_line().await {
            Ok(Some(line)) if !line.trim().is_empty() => {
                CaptureOutcome::Transcript(line.trim().to_string())
            }
            Ok(_) => CaptureOutcome::NoResult,
            Err(err) => CaptureOutcome::Error(format!("failed to read console: {err}")),
        }
    }
}
