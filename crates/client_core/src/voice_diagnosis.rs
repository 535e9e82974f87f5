//! Spoken-symptom diagnosis with location and nearby medical stores.
//!
//! Capture, diagnosis, and store lookups each carry their own generation;
//! an outcome from an older generation is discarded.

use std::sync::Arc;

use shared::{domain::GeoLocation, error::FailureClass};
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use tracing::{debug, info, warn};

use crate::{
    runtime::spawn_capability,
    speech::{CaptureOutcome, RecognitionConfig},
    HealthServiceApi, SpeechRecognizer,
};

pub const NO_DIAGNOSIS_MESSAGE: &str = "No diagnosis found.";
pub const DIAGNOSIS_FAILED_MESSAGE: &str = "Error fetching diagnosis. Please try again.";
pub const NO_STORES_MESSAGE: &str = "No medical stores found.";

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DiagnosisStatus {
    #[default]
    NotRequested,
    Pending,
    Found(String),
    NotFound,
    Failed,
}

impl DiagnosisStatus {
    pub fn display_text(&self) -> &str {
        match self {
            Self::NotRequested | Self::Pending => "",
            Self::Found(text) => text,
            Self::NotFound => NO_DIAGNOSIS_MESSAGE,
            Self::Failed => DIAGNOSIS_FAILED_MESSAGE,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum LocationState {
    #[default]
    Unknown,
    Known(GeoLocation),
    /// Lookup failed; never retried.
    Unavailable,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum StoresState {
    #[default]
    Unrequested,
    Loaded(Vec<String>),
}

/// What the store list area shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoresView<'a> {
    /// Nothing fetched yet.
    Placeholder,
    /// Fetched, and the service knows no stores nearby.
    Empty,
    Stores(&'a [String]),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceEffect {
    Capture {
        generation: u64,
        config: RecognitionConfig,
    },
    Diagnose {
        generation: u64,
        symptoms: String,
    },
    FetchLocation,
    FetchStores {
        generation: u64,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum VoiceOutcome {
    Captured {
        generation: u64,
        outcome: CaptureOutcome,
    },
    Diagnosed {
        generation: u64,
        result: Result<Option<String>, String>,
    },
    Located(Result<GeoLocation, String>),
    StoresFetched {
        generation: u64,
        result: Result<Vec<String>, String>,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VoiceDiagnosisState {
    transcript: String,
    listening: bool,
    diagnosis: DiagnosisStatus,
    location: LocationState,
    location_requested: bool,
    stores: StoresState,
    capture_generation: u64,
    diagnosis_generation: u64,
    stores_generation: u64,
}

impl VoiceDiagnosisState {
    pub fn transcript(&self) -> &str {
        &self.transcript
    }

    pub fn is_listening(&self) -> bool {
        self.listening
    }

    pub fn diagnosis(&self) -> &DiagnosisStatus {
        &self.diagnosis
    }

    pub fn diagnosis_text(&self) -> &str {
        self.diagnosis.display_text()
    }

    pub fn location(&self) -> &LocationState {
        &self.location
    }

    pub fn location_text(&self) -> String {
        match &self.location {
            LocationState::Known(location) => location.display(),
            LocationState::Unknown | LocationState::Unavailable => String::new(),
        }
    }

    pub fn stores(&self) -> &StoresState {
        &self.stores
    }

    pub fn stores_view(&self) -> StoresView<'_> {
        match &self.stores {
            StoresState::Unrequested => StoresView::Placeholder,
            StoresState::Loaded(stores) if stores.is_empty() => StoresView::Empty,
            StoresState::Loaded(stores) => StoresView::Stores(stores),
        }
    }

    /// Only ever yields one lookup per state.
    pub fn begin_location_lookup(&mut self) -> Option<VoiceEffect> {
        if self.location_requested {
            return None;
        }
        self.location_requested = true;
        Some(VoiceEffect::FetchLocation)
    }

    /// No-op while a capture is already running.
    pub fn start_capture(&mut self, config: &RecognitionConfig) -> Option<VoiceEffect> {
        if self.listening {
            debug!("capture already in progress; ignoring start");
            return None;
        }
        self.listening = true;
        self.diagnosis = DiagnosisStatus::NotRequested;
        self.capture_generation += 1;
        // A diagnosis still in flight belongs to the previous capture.
        self.diagnosis_generation += 1;
        Some(VoiceEffect::Capture {
            generation: self.capture_generation,
            config: config.clone(),
        })
    }

    pub fn begin_diagnosis(&mut self, symptoms: String) -> VoiceEffect {
        self.diagnosis_generation += 1;
        self.diagnosis = DiagnosisStatus::Pending;
        VoiceEffect::Diagnose {
            generation: self.diagnosis_generation,
            symptoms,
        }
    }

    pub fn begin_stores_lookup(&mut self) -> VoiceEffect {
        self.stores_generation += 1;
        VoiceEffect::FetchStores {
            generation: self.stores_generation,
        }
    }

    pub fn apply(&mut self, outcome: VoiceOutcome) -> Option<VoiceEffect> {
        match outcome {
            VoiceOutcome::Captured {
                generation,
                outcome,
            } => {
                if generation != self.capture_generation {
                    debug!(generation, "dropping superseded capture outcome");
                    return None;
                }
                self.listening = false;
                debug!(generation, outcome = outcome.name(), "capture finished");
                match outcome {
                    CaptureOutcome::Transcript(text) if !text.trim().is_empty() => {
                        info!(generation, "capture produced transcript");
                        self.transcript = text.clone();
                        Some(self.begin_diagnosis(text))
                    }
                    CaptureOutcome::Transcript(_) | CaptureOutcome::NoResult => {
                        info!(generation, "capture ended without a result");
                        None
                    }
                    CaptureOutcome::Error(reason) => {
                        warn!(generation, "speech recognition error: {reason}");
                        None
                    }
                }
            }
            VoiceOutcome::Diagnosed { generation, result } => {
                if generation != self.diagnosis_generation {
                    debug!(generation, "dropping superseded diagnosis");
                    return None;
                }
                self.diagnosis = match result {
                    Ok(Some(text)) if !text.is_empty() => DiagnosisStatus::Found(text),
                    Ok(_) => DiagnosisStatus::NotFound,
                    Err(reason) => {
                        warn!(generation, "error fetching diagnosis: {reason}");
                        DiagnosisStatus::Failed
                    }
                };
                None
            }
            VoiceOutcome::Located(result) => {
                if self.location != LocationState::Unknown {
                    return None;
                }
                self.location = match result {
                    Ok(location) => {
                        info!(city = %location.city, country = %location.country, "location resolved");
                        LocationState::Known(location)
                    }
                    Err(reason) => {
                        warn!(class = ?FailureClass::SilentDegradation, "error fetching location: {reason}");
                        LocationState::Unavailable
                    }
                };
                None
            }
            VoiceOutcome::StoresFetched { generation, result } => {
                if generation != self.stores_generation {
                    debug!(generation, "dropping superseded store list");
                    return None;
                }
                match result {
                    Ok(stores) => {
                        info!(generation, count = stores.len(), "medical stores loaded");
                        self.stores = StoresState::Loaded(stores);
                    }
                    Err(reason) => warn!(
                        generation,
                        class = ?FailureClass::SilentDegradation,
                        "error fetching medical stores: {reason}"
                    ),
                }
                None
            }
        }
    }
}

pub struct VoiceDiagnosisController {
    state: VoiceDiagnosisState,
    recognizer: Arc<dyn SpeechRecognizer>,
    api: Arc<dyn HealthServiceApi>,
    config: RecognitionConfig,
    outcome_tx: UnboundedSender<VoiceOutcome>,
    outcome_rx: UnboundedReceiver<VoiceOutcome>,
    in_flight: usize,
}

impl VoiceDiagnosisController {
    /// Starts the one-time location lookup, so it must be called from within a
    /// tokio runtime.
    pub fn new(
        recognizer: Arc<dyn SpeechRecognizer>,
        api: Arc<dyn HealthServiceApi>,
        config: RecognitionConfig,
    ) -> Self {
        let (outcome_tx, outcome_rx) = unbounded_channel();
        let mut controller = Self {
            state: VoiceDiagnosisState::default(),
            recognizer,
            api,
            config,
            outcome_tx,
            outcome_rx,
            in_flight: 0,
        };
        if let Some(effect) = controller.state.begin_location_lookup() {
            controller.run(effect);
        }
        controller
    }

    pub fn state(&self) -> &VoiceDiagnosisState {
        &self.state
    }

    pub fn start_capture(&mut self) {
        if let Some(effect) = self.state.start_capture(&self.config) {
            self.run(effect);
        }
    }

    pub fn request_diagnosis(&mut self, symptoms: impl Into<String>) {
        let effect = self.state.begin_diagnosis(symptoms.into());
        self.run(effect);
    }

    pub fn fetch_medical_stores(&mut self) {
        let effect = self.state.begin_stores_lookup();
        self.run(effect);
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

    fn run(&mut self, effect: VoiceEffect) {
        self.in_flight += 1;
        match effect {
            VoiceEffect::Capture { generation, config } => {
                info!(generation, locale = %config.locale, "starting speech capture");
                let recognizer = self.recognizer.clone();
                spawn_capability(
                    &self.outcome_tx,
                    "speech_capture",
                    async move { Ok(recognizer.capture(&config).await) },
                    move |result| VoiceOutcome::Captured {
                        generation,
                        outcome: result.unwrap_or_else(CaptureOutcome::Error),
                    },
                );
            }
            VoiceEffect::Diagnose {
                generation,
                symptoms,
            } => {
                let api = self.api.clone();
                spawn_capability(
                    &self.outcome_tx,
                    "diagnosis",
                    async move { api.diagnose(&symptoms).await },
                    move |result| VoiceOutcome::Diagnosed { generation, result },
                );
            }
            VoiceEffect::FetchLocation => {
                let api = self.api.clone();
                spawn_capability(
                    &self.outcome_tx,
                    "location",
                    async move { api.location().await },
                    VoiceOutcome::Located,
                );
            }
            VoiceEffect::FetchStores { generation } => {
                let api = self.api.clone();
                spawn_capability(
                    &self.outcome_tx,
                    "medical_stores",
                    async move { api.medical_stores().await },
                    move |result| VoiceOutcome::StoresFetched { generation, result },
                );
            }
        }
    }
}

#[cfg(test)]
#[path = "tests/voice_diagnosis_tests.rs"]
mod tests;
