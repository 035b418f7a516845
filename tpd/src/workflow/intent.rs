//! Intent classification for incoming turns

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::debug;

use crate::llm::{CompletionRequest, LlmClient, Message};
use crate::prompts::PromptLoader;
use crate::schema::{RequirementSchema, catalog};
use crate::workflow::WorkflowError;

/// Top-level intent of a conversation turn. Closed set; the classifier must
/// answer with one of these labels verbatim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Intent {
    StaySearch,
    DestinationRecommendation,
    Other,
}

impl Intent {
    pub const ALL: [Intent; 3] =
        [Intent::StaySearch, Intent::DestinationRecommendation, Intent::Other];

    pub fn label(&self) -> &'static str {
        match self {
            Intent::StaySearch => "StaySearch",
            Intent::DestinationRecommendation => "DestinationRecommendation",
            Intent::Other => "Other",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Intent::StaySearch => {
                "The user wants to find or book a place to stay in a location they already know, \
                 such as a hotel, resort, homestay, or apartment."
            }
            Intent::DestinationRecommendation => {
                "The user wants suggestions on where to travel and has not settled on a \
                 destination yet."
            }
            Intent::Other => {
                "Anything not about finding a stay or choosing a travel destination."
            }
        }
    }

    /// Exact-match lookup from the classifier's raw answer.
    pub fn from_label(label: &str) -> Option<Intent> {
        Intent::ALL.into_iter().find(|i| i.label() == label)
    }

    /// The requirement schema the elicitation loop fills for this intent.
    /// `Other` is a terminal path with nothing to gather.
    pub fn schema(&self) -> Option<RequirementSchema> {
        match self {
            Intent::StaySearch => Some(catalog::stay_booking()),
            Intent::DestinationRecommendation => Some(catalog::destination_recommendation()),
            Intent::Other => None,
        }
    }

    /// Numbered catalog handed to the classifier prompt.
    pub fn catalog() -> String {
        Intent::ALL
            .iter()
            .enumerate()
            .map(|(i, intent)| format!("{}. {} : {}", i + 1, intent.label(), intent.description()))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Routes a turn to one of the closed intents with a single LLM call.
pub struct IntentClassifier {
    llm: Arc<dyn LlmClient>,
    prompts: Arc<PromptLoader>,
}

impl IntentClassifier {
    pub fn new(llm: Arc<dyn LlmClient>, prompts: Arc<PromptLoader>) -> Self {
        debug!("IntentClassifier::new: called");
        Self { llm, prompts }
    }

    /// Classify from the latest human message only, not the full history.
    pub async fn classify(&self, latest_user_text: &str) -> Result<Intent, WorkflowError> {
        debug!("IntentClassifier::classify: called");
        let system_prompt = self.prompts.render(
            "infer-intent",
            &serde_json::json!({ "intent_categories": Intent::catalog() }),
        )?;

        let request =
            CompletionRequest::text(system_prompt, vec![Message::user(latest_user_text)], 64);
        let response = self.llm.complete(request).await?;
        let label = response.content.unwrap_or_default().trim().to_string();

        Intent::from_label(&label).ok_or(WorkflowError::ClassificationMismatch { label })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::MockLlmClient;

    #[test]
    fn test_labels_roundtrip() {
        for intent in Intent::ALL {
            assert_eq!(Intent::from_label(intent.label()), Some(intent));
        }
        assert_eq!(Intent::from_label("HotelBooking"), None);
    }

    #[test]
    fn test_catalog_is_numbered() {
        let catalog = Intent::catalog();
        assert!(catalog.contains("1. StaySearch :"));
        assert!(catalog.contains("2. DestinationRecommendation :"));
        assert!(catalog.contains("3. Other :"));
    }

    #[test]
    fn test_schema_per_intent() {
        assert_eq!(Intent::StaySearch.schema().map(|s| s.name), Some("stay_booking"));
        assert_eq!(
            Intent::DestinationRecommendation.schema().map(|s| s.name),
            Some("destination_recommendation")
        );
        assert!(Intent::Other.schema().is_none());
    }

    #[tokio::test]
    async fn test_classify_exact_label() {
        let client = Arc::new(MockLlmClient::with_texts(vec!["Other".to_string()]));
        let prompts = Arc::new(PromptLoader::embedded_only());
        let classifier = IntentClassifier::new(client, prompts);

        let intent = classifier.classify("what's the capital of France?").await.unwrap();
        assert_eq!(intent, Intent::Other);
    }

    #[tokio::test]
    async fn test_classify_tolerates_whitespace() {
        let client = Arc::new(MockLlmClient::with_texts(vec!["  StaySearch\n".to_string()]));
        let prompts = Arc::new(PromptLoader::embedded_only());
        let classifier = IntentClassifier::new(client, prompts);

        let intent = classifier.classify("need a hotel in Goa").await.unwrap();
        assert_eq!(intent, Intent::StaySearch);
    }

    #[tokio::test]
    async fn test_classify_unknown_label_is_a_mismatch() {
        let client = Arc::new(MockLlmClient::with_texts(vec!["TravelPlanning".to_string()]));
        let prompts = Arc::new(PromptLoader::embedded_only());
        let classifier = IntentClassifier::new(client, prompts);

        let err = classifier.classify("plan something").await.unwrap_err();
        match err {
            WorkflowError::ClassificationMismatch { label } => {
                assert_eq!(label, "TravelPlanning");
            }
            other => panic!("expected mismatch, got {other:?}"),
        }
    }
}
