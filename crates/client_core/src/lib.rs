use anyhow::{anyhow, Result};
use async_trait::async_trait;
use shared::domain::{AnalysisResult, GeoLocation};

pub mod http;
pub mod image_analysis;
mod runtime;
pub mod speech;
pub mod upload;
pub mod voice_diagnosis;

pub use http::{HttpHealthApi, HttpImageAnalyzer};
pub use image_analysis::{ImageAnalysisController, ImageAnalysisState, ImagePhase};
pub use speech::{CaptureOutcome, RecognitionConfig};
pub use upload::{FsUploadReader, SelectedFile, UploadError, UploadedImage, MAX_UPLOAD_BYTES};
pub use voice_diagnosis::{
    DiagnosisStatus, LocationState, StoresState, StoresView, VoiceDiagnosisController,
    VoiceDiagnosisState,
};

/// Remote skin-image inference.
#[async_trait]
pub trait ImageAnalyzer: Send + Sync {
    async fn analyze(&self, image_data_uri: &str) -> Result<Vec<AnalysisResult>>;
}

pub struct MissingImageAnalyzer;

#[async_trait]
impl ImageAnalyzer for MissingImageAnalyzer {
    async fn analyze(&self, _image_data_uri: &str) -> Result<Vec<AnalysisResult>> {
        Err(anyhow!("image analysis backend is unavailable"))
    }
}

/// Reads a selected file into its embeddable data-URI form.
#[async_trait]
pub trait UploadReader: Send + Sync {
    async fn read(&self, file: &SelectedFile) -> Result<UploadedImage>;
}

/// Host speech-to-text engine. Every call resolves to exactly one outcome.
#[async_trait]
pub trait SpeechRecognizer: Send + Sync {
    async fn capture(&self, config: &RecognitionConfig) -> CaptureOutcome;
}

pub struct MissingSpeechRecognizer;

#[async_trait]
impl SpeechRecognizer for MissingSpeechRecognizer {
    async fn capture(&self, _config: &RecognitionConfig) -> CaptureOutcome {
        CaptureOutcome::Error("speech recognition is not supported on this host".to_string())
    }
}

/// Location, diagnosis, and medical-store endpoints.
#[async_trait]
pub trait HealthServiceApi: Send + Sync {
    async fn location(&self) -> Result<GeoLocation>;
    /// `Ok(None)` when the service answered without a diagnosis.
    async fn diagnose(&self, symptoms: &str) -> Result<Option<String>>;
    async fn medical_stores(&self) -> Result<Vec<String>>;
}
