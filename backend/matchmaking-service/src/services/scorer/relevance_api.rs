//! OpenAI-compatible chat-completions client for match scoring.
use anyhow::{anyhow, Context, Result};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::debug;

use super::{MatchScore, MatchScorer};
use crate::config::MatchScoringConfig;

const COMPLETIONS_PATH: &str = "/v1/chat/completions";

const SYSTEM_PROMPT: &str = "You rate how well a building-material supplier's \
product list covers an architect's required materials. Reply with a JSON \
object of the form {\"score\": <integer 0-100>} and nothing else. 100 means \
every required material is covered by a closely matching product; 0 means \
nothing matches.";

/// Remote relevance scorer backed by a chat-completions endpoint.
pub struct RelevanceApiScorer {
    client: Client,
    api_url: String,
    api_key: String,
    model: String,
}

// ============================================
// Request types
// ============================================

#[derive(Debug, Serialize)]
struct ChatCompletionRequest {
    model: String,
    messages: Vec<ChatMessage>,
    temperature: f32,
    max_tokens: u32,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatMessage {
    role: String,
    content: String,
}

// ============================================
// Response types
// ============================================

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChatMessage,
}

#[derive(Debug, Deserialize)]
struct Usage {
    total_tokens: u64,
}

#[derive(Debug, Deserialize)]
struct ScorePayload {
    score: f64,
}

impl RelevanceApiScorer {
    pub fn new(config: &MatchScoringConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .context("Failed to build relevance scorer HTTP client")?;

        Ok(RelevanceApiScorer {
            client,
            api_url: config.api_url.trim_end_matches('/').to_string(),
            api_key: config.api_key.clone(),
            model: config.model.clone(),
        })
    }

    fn prompt(materials: &[String], products: &[String]) -> String {
        format!(
            "Required materials: {}\nSupplier products: {}",
            materials.join(", "),
            products.join(", ")
        )
    }

    /// Pull the score out of the model's reply, clamped to the 0-100 scale.
    fn parse_score(content: &str) -> Result<u8> {
        let payload: ScorePayload = serde_json::from_str(content.trim())
            .with_context(|| format!("Unparsable score payload: {content}"))?;
        if !payload.score.is_finite() {
            return Err(anyhow!("Non-finite score in payload: {content}"));
        }
        Ok(payload.score.clamp(0.0, 100.0).round() as u8)
    }
}

#[async_trait]
impl MatchScorer for RelevanceApiScorer {
    async fn score_match(
        &self,
        materials: &[String],
        products: &[String],
    ) -> Result<MatchScore> {
        let request = ChatCompletionRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage {
                    role: "system".to_string(),
                    content: SYSTEM_PROMPT.to_string(),
                },
                ChatMessage {
                    role: "user".to_string(),
                    content: Self::prompt(materials, products),
                },
            ],
            temperature: 0.0,
            max_tokens: 32,
        };

        let url = format!("{}{}", self.api_url, COMPLETIONS_PATH);
        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .context("Relevance scorer request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Relevance scorer returned {status}: {body}"));
        }

        let completion: ChatCompletionResponse = response
            .json()
            .await
            .context("Relevance scorer returned malformed JSON")?;

        let content = completion
            .choices
            .first()
            .map(|choice| choice.message.content.as_str())
            .ok_or_else(|| anyhow!("Relevance scorer returned no choices"))?;

        let score = Self::parse_score(content)?;
        let tokens = completion.usage.map(|u| u.total_tokens).unwrap_or(0);

        debug!(score, tokens, "relevance score received");

        Ok(MatchScore { score, tokens })
    }
}
