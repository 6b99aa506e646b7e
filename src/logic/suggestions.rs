use crate::datasources::{generate_structured, LanguageModel};
use crate::error::Result;
use crate::logic::prompts;
use crate::models::{is_sentinel, CropSuggestion, SuggestionRequest, SuggestionResult};
use serde::Deserialize;
use std::sync::Arc;
use tracing::{debug, info, warn};

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeneratorOutput {
    #[serde(default)]
    improved_suggestions: Vec<CropSuggestion>,
}

#[derive(Clone)]
pub struct SuggestionGenerator {
    model: Arc<dyn LanguageModel>,
}

impl SuggestionGenerator {
    pub fn new(model: Arc<dyn LanguageModel>) -> Self {
        Self { model }
    }

    pub async fn generate(&self, request: &SuggestionRequest) -> Result<SuggestionResult> {
        let prompt = prompts::crop_suggestions(request);
        debug!(
            "Requesting suggestions for {:?} (crops: {:?})",
            request.location, request.crop_suggestions
        );

        let output: GeneratorOutput = generate_structured(self.model.as_ref(), &prompt).await?;

        let total = output.improved_suggestions.len();
        let suggestions: Vec<CropSuggestion> = output
            .improved_suggestions
            .into_iter()
            .filter(|s| !is_sentinel(&s.crop) && !s.crop.trim().is_empty())
            .collect();

        if suggestions.len() < total {
            warn!(
                "Dropped {} placeholder suggestion(s) from model output",
                total - suggestions.len()
            );
        }
        info!("Generated {} crop suggestion(s)", suggestions.len());

        Ok(SuggestionResult::new(suggestions))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::datasources::Prompt;
    use crate::models::{NOT_SPECIFIED, SUGGEST_SENTINEL};
    use async_trait::async_trait;
    use serde_json::{json, Value};

    struct Answer(Value);

    #[async_trait]
    impl LanguageModel for Answer {
        async fn generate(&self, _prompt: &Prompt) -> Result<Value> {
            Ok(self.0.clone())
        }
    }

    fn request() -> SuggestionRequest {
        SuggestionRequest {
            crop_suggestions: vec![SUGGEST_SENTINEL.into()],
            location: "Sacramento, California".into(),
            soil_type: NOT_SPECIFIED.into(),
            climate_conditions: String::new(),
            soil_conditions: String::new(),
            historical_yield_data: NOT_SPECIFIED.into(),
            other_relevant_parameters: NOT_SPECIFIED.into(),
        }
    }

    #[tokio::test]
    async fn sentinel_suggestions_are_dropped() {
        let generator = SuggestionGenerator::new(Arc::new(Answer(json!({
            "improvedSuggestions": [
                {"crop": "Tomato", "reasons": ["warm"], "suggestedActions": []},
                {"crop": "Suggest Based On Parameters ", "reasons": [], "suggestedActions": []},
                {"crop": "Almond", "reasons": ["dry summers", "deep soil"], "suggestedActions": ["drip"]}
            ]
        }))));

        let result = generator.generate(&request()).await.unwrap();
        let crops: Vec<&str> = result.suggestions.iter().map(|s| s.crop.as_str()).collect();
        assert_eq!(crops, vec!["Tomato", "Almond"]);
    }

    #[tokio::test]
    async fn missing_list_is_empty_result() {
        let generator = SuggestionGenerator::new(Arc::new(Answer(json!({}))));
        let result = generator.generate(&request()).await.unwrap();
        assert!(result.is_empty());
    }
}
