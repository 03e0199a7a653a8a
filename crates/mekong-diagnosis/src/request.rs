//! Diagnosis request schema and validation.
//!
//! Field limits mirror the service's public contract and exist to bound
//! resource use: free text is capped before it reaches prompt construction,
//! and numeric inputs are confined to physically plausible ranges.

use mekong_core::GatewayError;
use serde::{Deserialize, Serialize};

/// Languages the advisory can be produced in.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Language {
    /// Vietnamese (the primary audience).
    Vi,
    /// English.
    En,
    /// Korean.
    Ko,
}

impl Language {
    /// The language tag as it appears on the wire.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Vi => "vi",
            Self::En => "en",
            Self::Ko => "ko",
        }
    }
}

/// A crop-salinity diagnosis request.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DiagnosisRequest {
    /// Province the reading was taken in.
    pub province: String,
    /// Optional district within the province.
    #[serde(default)]
    pub district: Option<String>,
    /// Machine-readable crop identifier (e.g. `"rice"`).
    pub crop_type: String,
    /// Human-readable crop name shown back in the advisory.
    pub crop_label: String,
    /// Measured salinity in g/L.
    pub salinity_level: f64,
    /// The crop's salinity tolerance threshold in g/L.
    pub threshold: f64,
    /// Free-text symptom description.
    #[serde(default)]
    pub symptoms: Option<String>,
    /// URLs of uploaded symptom photos.
    #[serde(default)]
    pub image_urls: Option<Vec<String>>,
    /// Language the advisory should be written in.
    pub language: Language,
}

impl DiagnosisRequest {
    /// Validate field lengths and numeric ranges.
    ///
    /// # Errors
    ///
    /// Returns [`GatewayError::InvalidInput`] with a generic message on the
    /// first violated constraint; field contents are never echoed back to
    /// the caller.
    pub fn validate(&self) -> Result<(), GatewayError> {
        let invalid = || GatewayError::invalid_input("Invalid input");

        if self.province.is_empty() || self.province.len() > 100 {
            return Err(invalid());
        }
        if self.district.as_ref().is_some_and(|d| d.len() > 100) {
            return Err(invalid());
        }
        if self.crop_type.is_empty() || self.crop_type.len() > 50 {
            return Err(invalid());
        }
        if self.crop_label.is_empty() || self.crop_label.len() > 100 {
            return Err(invalid());
        }
        if !(0.0..=100.0).contains(&self.salinity_level) {
            return Err(invalid());
        }
        if !(0.0..=100.0).contains(&self.threshold) {
            return Err(invalid());
        }
        if self.symptoms.as_ref().is_some_and(|s| s.len() > 2000) {
            return Err(invalid());
        }
        if let Some(urls) = &self.image_urls {
            if urls.len() > 10 {
                return Err(invalid());
            }
            if urls
                .iter()
                .any(|u| u.len() > 500 || !(u.starts_with("http://") || u.starts_with("https://")))
            {
                return Err(invalid());
            }
        }
        Ok(())
    }

    /// The symptoms text, sanitized for prompt interpolation.
    #[must_use]
    pub fn sanitized_symptoms(&self) -> Option<String> {
        self.symptoms.as_deref().map(sanitize_symptoms)
    }
}

/// Strip ASCII control characters and truncate to 2000 characters.
///
/// Control characters are removed so free text cannot smuggle formatting
/// into the prompt; the cap bounds prompt size independently of validation.
#[must_use]
pub fn sanitize_symptoms(symptoms: &str) -> String {
    symptoms
        .chars()
        .filter(|c| !c.is_ascii_control())
        .take(2000)
        .collect()
}
