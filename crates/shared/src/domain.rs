use serde::{Deserialize, Serialize};

/// Severity label attached to an analysis finding. Labels the analyzer does
/// not know about deserialize to `Unknown`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Mild,
    Moderate,
    Severe,
    #[default]
    #[serde(other)]
    Unknown,
}

impl Severity {
    pub fn from_label(label: &str) -> Self {
        match label.trim().to_ascii_lowercase().as_str() {
            "mild" => Self::Mild,
            "moderate" => Self::Moderate,
            "severe" => Self::Severe,
            _ => Self::Unknown,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Mild => "mild",
            Self::Moderate => "moderate",
            Self::Severe => "severe",
            Self::Unknown => "unknown",
        }
    }

    pub fn category(self) -> SeverityCategory {
        match self {
            Self::Mild => SeverityCategory::Low,
            Self::Moderate => SeverityCategory::Medium,
            Self::Severe => SeverityCategory::High,
            Self::Unknown => SeverityCategory::Neutral,
        }
    }
}

/// Display bucket for a severity badge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeverityCategory {
    Low,
    Medium,
    High,
    Neutral,
}

impl SeverityCategory {
    pub fn label(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
            Self::Neutral => "neutral",
        }
    }
}

/// One finding produced by the image-analysis capability.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisResult {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Percentage in `0..=100`.
    pub confidence: f64,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub symptoms: Vec<String>,
    #[serde(default)]
    pub recommendations: Vec<String>,
}

impl AnalysisResult {
    pub fn severity_category(&self) -> SeverityCategory {
        self.severity.category()
    }

    pub fn confidence_label(&self) -> String {
        let confidence = if self.confidence.is_finite() {
            self.confidence.clamp(0.0, 100.0)
        } else {
            0.0
        };
        format!("{}% confidence", confidence.round() as u8)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub city: String,
    pub country: String,
}

impl GeoLocation {
    pub fn display(&self) -> String {
        format!("{}, {}", self.city, self.country)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn severity_mapping_is_total() {
        assert_eq!(Severity::from_label("mild").category(), SeverityCategory::Low);
        assert_eq!(
            Severity::from_label("moderate").category(),
            SeverityCategory::Medium
        );
        assert_eq!(
            Severity::from_label("severe").category(),
            SeverityCategory::High
        );
        for label in ["unknown", "", "critical", "MILDISH"] {
            assert_eq!(
                Severity::from_label(label).category(),
                SeverityCategory::Neutral,
                "label {label:?}"
            );
        }
    }

    #[test]
    fn unrecognized_severity_deserializes_to_unknown() {
        let result: AnalysisResult = serde_json::from_str(
            r#"{"name":"Eczema","description":"","confidence":72,"severity":"extreme","symptoms":[],"recommendations":[]}"#,
        )
        .expect("decode result");
        assert_eq!(result.severity, Severity::Unknown);
        assert_eq!(result.severity_category(), SeverityCategory::Neutral);
    }

    #[test]
    fn missing_optional_fields_default() {
        let result: AnalysisResult =
            serde_json::from_str(r#"{"name":"Acne","confidence":64.6}"#).expect("decode result");
        assert_eq!(result.severity, Severity::Unknown);
        assert!(result.symptoms.is_empty());
        assert_eq!(result.confidence_label(), "65% confidence");
    }

    #[test]
    fn confidence_label_is_clamped() {
        let mut result = AnalysisResult {
            name: "Psoriasis".into(),
            description: String::new(),
            confidence: 140.0,
            severity: Severity::Severe,
            symptoms: Vec::new(),
            recommendations: Vec::new(),
        };
        assert_eq!(result.confidence_label(), "100% confidence");
        result.confidence = -3.0;
        assert_eq!(result.confidence_label(), "0% confidence");
    }

    #[test]
    fn location_display_joins_city_and_country() {
        let location = GeoLocation {
            city: "Pune".into(),
            country: "India".into(),
        };
        assert_eq!(location.display(), "Pune, India");
    }
}
