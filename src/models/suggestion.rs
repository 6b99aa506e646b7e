use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Placeholder crop list entry asking the generator to pick crops itself.
pub const SUGGEST_SENTINEL: &str = "suggest based on parameters";

pub const NOT_SPECIFIED: &str = "Not Specified";

pub fn is_sentinel(crop: &str) -> bool {
    crop.trim().eq_ignore_ascii_case(SUGGEST_SENTINEL)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SuggestionRequest {
    pub crop_suggestions: Vec<String>,
    pub location: String,
    pub soil_type: String,
    pub climate_conditions: String,
    pub soil_conditions: String,
    pub historical_yield_data: String,
    pub other_relevant_parameters: String,
}

impl SuggestionRequest {
    pub fn wants_open_suggestions(&self) -> bool {
        self.crop_suggestions.is_empty()
            || (self.crop_suggestions.len() == 1 && is_sentinel(&self.crop_suggestions[0]))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CropSuggestion {
    pub crop: String,
    #[serde(default)]
    pub reasons: Vec<String>,
    #[serde(default)]
    pub suggested_actions: Vec<String>,
}

impl CropSuggestion {
    pub fn confidence(&self) -> ConfidenceLevel {
        ConfidenceLevel::assess(self.reasons.len(), self.suggested_actions.len())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SuggestionResult {
    pub suggestions: Vec<CropSuggestion>,
    pub generated_at: DateTime<Utc>,
}

impl SuggestionResult {
    pub fn new(suggestions: Vec<CropSuggestion>) -> Self {
        Self {
            suggestions,
            generated_at: Utc::now(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.suggestions.is_empty()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ConfidenceLevel {
    Low,
    Medium,
    High,
}

impl ConfidenceLevel {
    /// Label derived purely from how many reasons and follow-up actions the
    /// model produced: many reasons with few actions reads as high confidence.
    pub fn assess(reason_count: usize, action_count: usize) -> Self {
        if reason_count >= 3 && action_count <= 1 {
            return ConfidenceLevel::High;
        }
        if reason_count >= 2 && action_count <= 2 {
            return ConfidenceLevel::Medium;
        }
        if reason_count < 2 || action_count >= 3 {
            return ConfidenceLevel::Low;
        }
        ConfidenceLevel::Medium
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ConfidenceLevel::Low => "Low",
            ConfidenceLevel::Medium => "Medium",
            ConfidenceLevel::High => "High",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            ConfidenceLevel::Low => "⚠",
            ConfidenceLevel::Medium => "ℹ",
            ConfidenceLevel::High => "✓",
        }
    }
}

impl std::fmt::Display for ConfidenceLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
