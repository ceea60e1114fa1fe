//! Advice-generation collaborator.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::bot::collector::CollectedData;

/// Analyzer failure. Caught at the engine boundary; aborts the conversation.
#[derive(Debug)]
pub enum AnalyzerError {
    Http(String),
    Api(String),
    Parse(String),
    Empty,
}

impl std::fmt::Display for AnalyzerError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AnalyzerError::Http(e) => write!(f, "HTTP error: {e}"),
            AnalyzerError::Api(e) => write!(f, "API error: {e}"),
            AnalyzerError::Parse(e) => write!(f, "Parse error: {e}"),
            AnalyzerError::Empty => write!(f, "Empty response"),
        }
    }
}

impl std::error::Error for AnalyzerError {}

/// Turns a completed answer set into advice text. May run for minutes;
/// the caller blocks that one user's conversation for the duration.
#[async_trait]
pub trait Analyzer: Send + Sync {
    async fn generate_advice(&self, data: &CollectedData) -> Result<String, AnalyzerError>;
}

const MODEL: &str = "claude-sonnet-4-5-20250929";
const MAX_TOKENS: u32 = 4096;

const SYSTEM_PROMPT: &str = "You are an experienced business consultant. \
Based on the client's answers, give concrete, practical recommendations: \
viability of the idea, first steps, budget allocation, risks, and how to \
reach the target audience. Be specific and avoid generic advice. Answer in \
the language the client used.";

#[derive(Serialize)]
struct ApiRequest {
    model: &'static str,
    max_tokens: u32,
    system: &'static str,
    messages: Vec<ApiMessage>,
}

#[derive(Serialize)]
struct ApiMessage {
    role: &'static str,
    content: String,
}

#[derive(Deserialize)]
struct ApiResponse {
    content: Vec<ContentBlock>,
}

#[derive(Deserialize)]
struct ContentBlock {
    text: String,
}

/// Anthropic-backed analyzer.
pub struct AdvisorClient {
    api_key: String,
    http: reqwest::Client,
}

impl AdvisorClient {
    pub fn new(api_key: String) -> Self {
        Self {
            api_key,
            http: reqwest::Client::new(),
        }
    }
}

/// Render the collected fields as the consultation request.
fn consultation_prompt(data: &CollectedData) -> String {
    let mut prompt = String::from("A client filled in a business questionnaire:\n\n");
    for (field, answer) in data {
        prompt.push_str(&format!("- {field}: {answer}\n"));
    }
    prompt.push_str("\nGive your recommendations.");
    prompt
}

#[async_trait]
impl Analyzer for AdvisorClient {
    async fn generate_advice(&self, data: &CollectedData) -> Result<String, AnalyzerError> {
        let request = ApiRequest {
            model: MODEL,
            max_tokens: MAX_TOKENS,
            system: SYSTEM_PROMPT,
            messages: vec![ApiMessage {
                role: "user",
                content: consultation_prompt(data),
            }],
        };

        let response = self
            .http
            .post("https://api.anthropic.com/v1/messages")
            .header("x-api-key", &self.api_key)
            .header("anthropic-version", "2023-06-01")
            .header("content-type", "application/json")
            .json(&request)
            .send()
            .await
            .map_err(|e| AnalyzerError::Http(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(AnalyzerError::Api(format!("{status}: {body}")));
        }

        let api_response: ApiResponse = response
            .json()
            .await
            .map_err(|e| AnalyzerError::Parse(e.to_string()))?;

        api_response
            .content
            .first()
            .map(|c| c.text.clone())
            .ok_or(AnalyzerError::Empty)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_consultation_prompt_lists_all_fields() {
        let data = vec![
            ("business_idea".to_string(), "coffee shop".to_string()),
            ("budget".to_string(), "$20k".to_string()),
        ];
        let prompt = consultation_prompt(&data);
        assert!(prompt.contains("- business_idea: coffee shop"));
        assert!(prompt.contains("- budget: $20k"));
        // Fields appear in collection order
        assert!(prompt.find("business_idea").unwrap() < prompt.find("budget").unwrap());
    }
}
