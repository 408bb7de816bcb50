use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::types::{AnalysisScope, US_LOCATION_CODE};

/// Default location label for national analyses that did not name one.
pub const NATIONAL_LOCATION: &str = "United States";

#[derive(Debug, Error, PartialEq)]
pub enum ValidationError {
    #[error("{0} is required")]
    MissingField(&'static str),

    #[error("invalid {field}: {reason}")]
    InvalidField { field: &'static str, reason: String },
}

/// Input to a single opportunity analysis.
///
/// Every field is optional on the wire so that missing fields surface as a
/// [`ValidationError`] from [`AnalysisRequest::validate`] rather than as a
/// deserialization failure.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct AnalysisRequest {
    pub business_url: String,
    pub business_type: String,
    pub location: String,
    pub location_code: Option<i64>,
    pub customer_value: Option<f64>,
    pub analysis_scope: AnalysisScope,
    /// Competitor URLs supplied by the caller. Blank entries are ignored.
    pub competitors: Vec<String>,
}

impl AnalysisRequest {
    /// Check the request for missing or nonsensical fields.
    ///
    /// # Errors
    ///
    /// Returns the first [`ValidationError`] found, checking fields in wire order.
    pub fn validate(&self) -> Result<(), ValidationError> {
        let url = self.business_url.trim();
        if url.is_empty() {
            return Err(ValidationError::MissingField("businessUrl"));
        }
        if !url.contains('.') {
            return Err(ValidationError::InvalidField {
                field: "businessUrl",
                reason: format!("'{url}' does not look like a website address"),
            });
        }

        if self.business_type.trim().is_empty() {
            return Err(ValidationError::MissingField("businessType"));
        }

        if self.analysis_scope.is_local() {
            if self.location.trim().is_empty() {
                return Err(ValidationError::MissingField("location"));
            }
            if self.location_code.is_none() {
                return Err(ValidationError::MissingField("locationCode"));
            }
        }

        if let Some(code) = self.location_code {
            if code <= 0 {
                return Err(ValidationError::InvalidField {
                    field: "locationCode",
                    reason: format!("{code} is not a provider location code"),
                });
            }
        }

        match self.customer_value {
            None => Err(ValidationError::MissingField("customerValue")),
            Some(v) if !v.is_finite() || v <= 0.0 => Err(ValidationError::InvalidField {
                field: "customerValue",
                reason: "must be a positive number".to_string(),
            }),
            Some(_) => Ok(()),
        }
    }

    /// Location code used for provider lookups. National analyses always use
    /// the US-wide code.
    #[must_use]
    pub fn effective_location_code(&self) -> Option<i64> {
        match self.analysis_scope {
            AnalysisScope::National => Some(US_LOCATION_CODE),
            AnalysisScope::Local => self.location_code,
        }
    }

    /// Location label used in prompts and search phrases.
    #[must_use]
    pub fn effective_location(&self) -> &str {
        let trimmed = self.location.trim();
        if trimmed.is_empty() && self.analysis_scope == AnalysisScope::National {
            NATIONAL_LOCATION
        } else {
            trimmed
        }
    }

    /// Caller-supplied competitor URLs with blanks removed.
    #[must_use]
    pub fn competitor_urls(&self) -> Vec<String> {
        self.competitors
            .iter()
            .map(|c| c.trim())
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect()
    }
}
