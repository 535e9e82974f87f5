//! Plain-text views of controller state, printed after every transition.

use std::fmt::Write as _;

use client_core::{
    image_analysis::MEDICAL_DISCLAIMER, voice_diagnosis::NO_STORES_MESSAGE, ImageAnalysisState,
    ImagePhase, StoresView, VoiceDiagnosisState,
};
use shared::domain::AnalysisResult;

pub fn image_view(state: &ImageAnalysisState) -> String {
    let mut out = String::new();
    if let Some(notice) = state.error().filter(|notice| notice.class.is_user_visible()) {
        let _ = writeln!(out, "! {}", notice.message);
    }
    let Some(image) = state.image() else {
        return out;
    };
    let _ = writeln!(
        out,
        "Uploaded image: {} ({} bytes)",
        image.mime_type, image.size_bytes
    );

    match state.phase() {
        ImagePhase::Analyzing => {
            let _ = writeln!(out, "Analyzing image with AI model...");
        }
        ImagePhase::Idle | ImagePhase::ResultsReady | ImagePhase::Error => {
            for result in state.results() {
                write_finding(&mut out, result);
            }
            let _ = writeln!(out, "Important: {MEDICAL_DISCLAIMER}");
        }
    }
    out
}

fn write_finding(out: &mut String, result: &AnalysisResult) {
    let _ = writeln!(
        out,
        "* {} [{}] [{} / {}]",
        result.name,
        result.confidence_label(),
        result.severity.label(),
        result.severity_category().label()
    );
    if !result.description.is_empty() {
        let _ = writeln!(out, "  {}", result.description);
    }
    if !result.symptoms.is_empty() {
        let _ = writeln!(out, "  Symptoms:");
        for symptom in &result.symptoms {
            let _ = writeln!(out, "    - {symptom}");
        }
    }
    if !result.recommendations.is_empty() {
        let _ = writeln!(out, "  Recommendations:");
        for recommendation in &result.recommendations {
            let _ = writeln!(out, "    - {recommendation}");
        }
    }
}

pub fn voice_view(state: &VoiceDiagnosisState) -> String {
    let mut out = String::new();
    let status = if state.is_listening() {
        "Listening..."
    } else {
        "Ready"
    };
    let _ = writeln!(out, "Status: {status}");
    let _ = writeln!(out, "Transcript: {}", state.transcript());
    let _ = writeln!(out, "Diagnosis: {}", state.diagnosis_text());
    let _ = writeln!(out, "Location: {}", state.location_text());
    match state.stores_view() {
        StoresView::Placeholder => {
            let _ = writeln!(out, "{NO_STORES_MESSAGE}");
        }
        StoresView::Empty => {
            let _ = writeln!(out, "Medical stores: none nearby");
        }
        StoresView::Stores(stores) => {
            let _ = writeln!(out, "Medical stores:");
            for store in stores {
                let _ = writeln!(out, "  - {store}");
            }
        }
    }
    out
}
