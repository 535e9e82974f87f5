//! reqwest-backed implementations of the remote capabilities.

use std::time::Duration;

use anyhow::{Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use shared::{
    domain::{AnalysisResult, GeoLocation},
    protocol::{
        AnalyzeImageRequest, AnalyzeImageResponse, DiagnosisRequest, DiagnosisResponse,
        LocationResponse, MedicalStoresResponse,
    },
};
use url::Url;

use crate::{HealthServiceApi, ImageAnalyzer};

pub const DEFAULT_API_BASE_URL: &str = "http://127.0.0.1:5000";
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const LOCATION_PATH: &str = "location";
const DIAGNOSIS_PATH: &str = "voice-diagnosis";
const MEDICAL_STORES_PATH: &str = "medical_stores";

fn build_client(timeout: Duration) -> Result<Client> {
    Client::builder()
        .timeout(timeout)
        .build()
        .context("failed to build http client")
}

/// Location, diagnosis, and medical-store endpoints under one base address.
pub struct HttpHealthApi {
    http: Client,
    base_url: Url,
}

impl HttpHealthApi {
    pub fn new(base_url: &str) -> Result<Self> {
        Self::with_timeout(base_url, DEFAULT_REQUEST_TIMEOUT)
    }

    pub fn with_timeout(base_url: &str, timeout: Duration) -> Result<Self> {
        let mut base_url =
            Url::parse(base_url).with_context(|| format!("invalid api base url {base_url}"))?;
        if !base_url.path().ends_with('/') {
            let path = format!("{}/", base_url.path());
            base_url.set_path(&path);
        }
        Ok(Self {
            http: build_client(timeout)?,
            base_url,
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url> {
        self.base_url
            .join(path)
            .with_context(|| format!("failed to build {path} url"))
    }
}

#[async_trait]
impl HealthServiceApi for HttpHealthApi {
    async fn location(&self) -> Result<GeoLocation> {
        let body: LocationResponse = self
            .http
            .get(self.endpoint(LOCATION_PATH)?)
            .send()
            .await
            .context("location request failed")?
            .error_for_status()
            .context("location request rejected")?
            .json()
            .await
            .context("malformed location response")?;
        Ok(body.location)
    }

    async fn diagnose(&self, symptoms: &str) -> Result<Option<String>> {
        let body: DiagnosisResponse = self
            .http
            .post(self.endpoint(DIAGNOSIS_PATH)?)
            .json(&DiagnosisRequest {
                symptoms: symptoms.to_string(),
            })
            .send()
            .await
            .context("diagnosis request failed")?
            .error_for_status()
            .context("diagnosis request rejected")?
            .json()
            .await
            .context("malformed diagnosis response")?;
        Ok(body.into_diagnosis())
    }

    async fn medical_stores(&self) -> Result<Vec<String>> {
        let body: MedicalStoresResponse = self
            .http
            .get(self.endpoint(MEDICAL_STORES_PATH)?)
            .send()
            .await
            .context("medical stores request failed")?
            .error_for_status()
            .context("medical stores request rejected")?
            .json()
            .await
            .context("malformed medical stores response")?;
        Ok(body.into_stores())
    }
}

/// Posts the encoded image to a remote inference endpoint.
pub struct HttpImageAnalyzer {
    http: Client,
    endpoint: Url,
}

impl HttpImageAnalyzer {
    pub fn new(endpoint: &str, timeout: Duration) -> Result<Self> {
        Ok(Self {
            http: build_client(timeout)?,
            endpoint: Url::parse(endpoint)
                .with_context(|| format!("invalid image analysis url {endpoint}"))?,
        })
    }
}

#[async_trait]
impl ImageAnalyzer for HttpImageAnalyzer {
    async fn analyze(&self, image_data_uri: &str) -> Result<Vec<AnalysisResult>> {
        let body: AnalyzeImageResponse = self
            .http
            .post(self.endpoint.clone())
            .json(&AnalyzeImageRequest {
                image: image_data_uri.to_string(),
            })
            .send()
            .await
            .context("image analysis request failed")?
            .error_for_status()
            .context("image analysis request rejected")?
            .json()
            .await
            .context("malformed image analysis response")?;
        Ok(body.results)
    }
}

#[cfg(test)]
#[path = "tests/http_tests.rs"]
mod tests;
