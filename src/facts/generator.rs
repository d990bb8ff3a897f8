//! External fact generation over an OpenAI-compatible chat completions API.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};

use crate::error::QuizError;

/// Produces a fresh fact about a country, avoiding the ones already shown.
#[async_trait]
pub trait FactGenerator: Send + Sync {
    async fn generate(&self, subject: &str, avoid: &[String]) -> Result<String, QuizError>;
}

/// Used when no API is configured; every request fails.
pub struct DisabledFactGenerator;

#[async_trait]
impl FactGenerator for DisabledFactGenerator {
    async fn generate(&self, _subject: &str, _avoid: &[String]) -> Result<String, QuizError> {
        Err(QuizError::Generation("fact generation is not configured".into()))
    }
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: String,
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f32,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatReply,
}

#[derive(Deserialize)]
struct ChatReply {
    content: String,
}

pub struct ChatCompletionFactGenerator {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
}

impl ChatCompletionFactGenerator {
    pub fn new(endpoint: String, api_key: String, model: String) -> Result<Self, QuizError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(20))
            .build()
            .map_err(|e| QuizError::Generation(e.to_string()))?;
        Ok(Self {
            client,
            endpoint,
            api_key,
            model,
        })
    }

    fn prompt(subject: &str, avoid: &[String]) -> String {
        let mut prompt = format!(
            "Расскажи один короткий интересный факт о стране «{subject}» \
             (одно-два предложения, без вступления)."
        );
        if !avoid.is_empty() {
            prompt.push_str(" Не повторяй эти факты:");
            for fact in avoid {
                prompt.push_str("\n- ");
                prompt.push_str(fact);
            }
        }
        prompt
    }
}

#[async_trait]
impl FactGenerator for ChatCompletionFactGenerator {
    async fn generate(&self, subject: &str, avoid: &[String]) -> Result<String, QuizError> {
        let request = ChatRequest {
            model: &self.model,
            messages: vec![
                ChatMessage {
                    role: "system",
                    content: "Ты помощник географической викторины.".to_string(),
                },
                ChatMessage {
                    role: "user",
                    content: Self::prompt(subject, avoid),
                },
            ],
            max_tokens: 200,
            temperature: 0.9,
        };

        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| QuizError::Generation(format!("request failed: {e}")))?
            .error_for_status()
            .map_err(|e| QuizError::Generation(format!("error status: {e}")))?
            .json::<ChatResponse>()
            .await
            .map_err(|e| QuizError::Generation(format!("bad response: {e}")))?;

        let fact = response
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content.trim().to_string())
            .filter(|c| !c.is_empty())
            .ok_or_else(|| QuizError::Generation("response contained no choices".into()))?;

        if avoid.contains(&fact) {
            return Err(QuizError::Generation("generator repeated a known fact".into()));
        }
        Ok(fact)
    }
}
