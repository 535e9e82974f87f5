//! JSON bodies exchanged with the health service and the image analyzer.

use serde::{Deserialize, Serialize};

use crate::domain::{AnalysisResult, GeoLocation};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LocationResponse {
    pub location: GeoLocation,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiagnosisRequest {
    pub symptoms: String,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DiagnosisResponse {
    #[serde(default)]
    pub diagnosis: Option<String>,
}

impl DiagnosisResponse {
    /// Returns the diagnosis text, treating an empty string like a missing field.
    pub fn into_diagnosis(self) -> Option<String> {
        self.diagnosis.filter(|text| !text.is_empty())
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MedicalStoresResponse {
    #[serde(default)]
    pub stores: Option<Vec<String>>,
}

impl MedicalStoresResponse {
    pub fn into_stores(self) -> Vec<String> {
        self.stores.unwrap_or_default()
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeImageRequest {
    pub image: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalyzeImageResponse {
    pub results: Vec<AnalysisResult>,
}
