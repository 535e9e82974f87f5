//! Skin-image upload and analysis: state transitions plus the controller that
//! runs the file read and the analysis call.
//!
//! Every accepted submission gets a new generation. Outcomes carrying an older
//! generation are dropped, so a slow analysis never overwrites the view of a
//! newer upload.

use std::sync::Arc;

use shared::{
    domain::AnalysisResult,
    error::{FailureClass, UserNotice},
};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::{
    runtime::spawn_capability,
    upload::{SelectedFile, UploadError, UploadedImage},
    ImageAnalyzer, UploadReader,
};

pub const ANALYSIS_FAILED_MESSAGE: &str = "Error analyzing image. Please try again.";
pub const MEDICAL_DISCLAIMER: &str = "This AI analysis is for informational purposes only and should not replace professional medical advice. Please consult a qualified healthcare provider for proper diagnosis and treatment.";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ImagePhase {
    #[default]
    Idle,
    Analyzing,
    ResultsReady,
    Error,
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImageEffect {
    ReadFile {
        generation: u64,
        file: SelectedFile,
    },
    Analyze {
        generation: u64,
        data_uri: String,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum ImageOutcome {
    FileRead {
        generation: u64,
        result: Result<UploadedImage, String>,
    },
    Analyzed {
        generation: u64,
        result: Result<Vec<AnalysisResult>, String>,
    },
}

impl ImageOutcome {
    fn generation(&self) -> u64 {
        match self {
            Self::FileRead { generation, .. } | Self::Analyzed { generation, .. } => *generation,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ImageAnalysisState {
    phase: ImagePhase,
    image: Option<UploadedImage>,
    results: Vec<AnalysisResult>,
    error: Option<UserNotice>,
    generation: u64,
}

impl ImageAnalysisState {
    pub fn phase(&self) -> ImagePhase {
        self.phase
    }

    pub fn is_analyzing(&self) -> bool {
        self.phase == ImagePhase::Analyzing
    }

    pub fn image(&self) -> Option<&UploadedImage> {
        self.image.as_ref()
    }

    pub fn results(&self) -> &[AnalysisResult] {
        &self.results
    }

    pub fn error(&self) -> Option<&UserNotice> {
        self.error.as_ref()
    }

    pub fn error_message(&self) -> Option<&str> {
        self.error.as_ref().map(|notice| notice.message.as_str())
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Validates `file` and, if it is acceptable, supersedes any earlier
    /// submission and asks for the file to be read.
    pub fn submit(&mut self, file: SelectedFile) -> Option<ImageEffect> {
        if let Err(err) = file.validate() {
            info!(path = %file.path.display(), "upload rejected: {err}");
            self.error = Some(err.notice());
            return None;
        }

        self.generation += 1;
        Some(ImageEffect::ReadFile {
            generation: self.generation,
            file,
        })
    }

    pub fn apply(&mut self, outcome: ImageOutcome) -> Option<ImageEffect> {
        if outcome.generation() != self.generation {
            debug!(
                outcome_generation = outcome.generation(),
                current_generation = self.generation,
                "dropping superseded image outcome"
            );
            return None;
        }

        match outcome {
            ImageOutcome::FileRead {
                generation,
                result: Ok(image),
            } => {
                let data_uri = image.data_uri.clone();
                info!(
                    generation,
                    size_bytes = image.size_bytes,
                    mime_type = %image.mime_type,
                    "image loaded; starting analysis"
                );
                self.image = Some(image);
                self.results.clear();
                self.error = None;
                self.phase = ImagePhase::Analyzing;
                Some(ImageEffect::Analyze {
                    generation,
                    data_uri,
                })
            }
            ImageOutcome::FileRead {
                generation,
                result: Err(reason),
            } => {
                let err = UploadError::Read(reason);
                warn!(generation, "{err}");
                self.error = Some(err.notice());
                // The analysis that set this phase was superseded by this upload.
                if self.phase == ImagePhase::Analyzing {
                    self.phase = ImagePhase::Idle;
                }
                None
            }
            ImageOutcome::Analyzed {
                generation,
                result: Ok(results),
            } => {
                info!(generation, findings = results.len(), "image analysis complete");
                self.results = results;
                self.phase = ImagePhase::ResultsReady;
                None
            }
            ImageOutcome::Analyzed {
                generation,
                result: Err(reason),
            } => {
                warn!(generation, "image analysis failed: {reason}");
                self.error = Some(UserNotice::new(
                    FailureClass::Capability,
                    ANALYSIS_FAILED_MESSAGE,
                ));
                self.phase = ImagePhase::Error;
                None
            }
        }
    }

    /// Back to `Idle`; anything still in flight is superseded.
    pub fn reset(&mut self) {
        *self = Self {
            generation: self.generation + 1,
            ..Self::default()
        };
    }
}

pub struct ImageAnalysisController {
    state: ImageAnalysisState,
    reader: Arc<dyn UploadReader>,
    analyzer: Arc<dyn ImageAnalyzer>,
    outcome_tx: UnboundedSender<ImageOutcome>,
    outcome_rx: UnboundedReceiver<ImageOutcome>,
    in_flight: usize,
}

impl ImageAnalysisController {
    pub fn new(reader: Arc<dyn UploadReader>, analyzer: Arc<dyn ImageAnalyzer>) -> Self {
        let (outcome_tx, outcome_rx) = unbounded_channel();
        Self {
            state: ImageAnalysisState::default(),
            reader,
            analyzer,
            outcome_tx,
            outcome_rx,
            in_flight: 0,
        }
    }

    pub fn state(&self) -> &ImageAnalysisState {
        &self.state
    }

    pub fn submit_image(&mut self, file: SelectedFile) {
        if let Some(effect) = self.state.submit(file) {
            self.run(effect);
        }
    }

    pub fn reset(&mut self) {
        self.state.reset();
    }

    pub fn has_pending(&self) -> bool {
        self.in_flight > 0
    }

    /// Waits for the next outstanding outcome and applies it. Returns `false`
    /// when nothing is in flight.
    pub async fn process_next(&mut self) -> bool {
        if self.in_flight == 0 {
            return false;
        }
        let Some(outcome) = self.outcome_rx.recv().await else {
            return false;
        };
        self.in_flight -= 1;
        if let Some(effect) = self.state.apply(outcome) {
            self.run(effect);
        }
        true
    }

    pub async fn settle(&mut self) {
        while self.process_next().await {}
    }

    fn run(&mut self, effect: ImageEffect) {
        self.in_flight += 1;
        match effect {
            ImageEffect::ReadFile { generation, file } => {
                let reader = self.reader.clone();
                spawn_capability(
                    &self.outcome_tx,
                    "file_read",
                    async move { reader.read(&file).await },
                    move |result| ImageOutcome::FileRead { generation, result },
                );
            }
            ImageEffect::Analyze {
                generation,
                data_uri,
            } => {
                let analyzer = self.analyzer.clone();
                spawn_capability(
                    &self.outcome_tx,
                    "image_analysis",
                    async move { analyzer.analyze(&data_uri).await },
                    move |result| ImageOutcome::Analyzed { generation, result },
                );
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/image_analysis_tests.rs"]
mod tests;
