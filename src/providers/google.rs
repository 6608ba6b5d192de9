use crate::config::GeminiConfig;
use crate::error::NutritionError;
use crate::providers::{inject_ingredients, IngredientParser};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde_json::{json, Value};
use std::time::Duration;

/// Ingredient parser backed by the Google Gemini `generateContent` endpoint
pub struct GeminiParser {
    client: Client,
    api_key: String,
    model: String,
    temperature: f32,
    top_k: u32,
    max_tokens: u32,
    base_url: String,
}

impl GeminiParser {
    /// Create a new Gemini parser from configuration
    pub fn new(config: &GeminiConfig, timeout: Duration) -> Result<Self, NutritionError> {
        // Try config first, then fall back to environment variables
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("GEMINI_API_KEY").ok())
            .or_else(|| std::env::var("GOOGLE_API_KEY").ok())
            .ok_or_else(|| NutritionError::MissingCredential("Gemini".to_string()))?;

        Self::with_api_key(api_key, config, timeout)
    }

    /// Create a parser with an explicit key. An empty key is accepted here and
    /// reported when the parser is used.
    pub fn with_api_key(
        api_key: impl Into<String>,
        config: &GeminiConfig,
        timeout: Duration,
    ) -> Result<Self, NutritionError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NutritionError::BuilderError(format!("HTTP client: {}", e)))?;

        Ok(GeminiParser {
            client,
            api_key: api_key.into(),
            model: config.model.clone(),
            temperature: config.temperature,
            top_k: config.top_k,
            max_tokens: config.max_tokens,
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }

    fn failed(status: Option<u16>, message: impl Into<String>) -> NutritionError {
        NutritionError::ParseFailed {
            status,
            message: message.into(),
        }
    }
}

#[async_trait]
impl IngredientParser for GeminiParser {
    fn provider_name(&self) -> &str {
        "gemini"
    }

    fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    async fn parse(&self, ingredients_text: &str) -> Result<String, NutritionError> {
        if !self.is_configured() {
            return Err(NutritionError::MissingCredential("Gemini".to_string()));
        }
        if ingredients_text.trim().is_empty() {
            return Err(NutritionError::EmptyInput);
        }

        let url = format!(
            "{}/v1beta/models/{}:generateContent",
            self.base_url, self.model
        );

        let response = self
            .client
            .post(&url)
            .query(&[("key", self.api_key.as_str())])
            .json(&json!({
                "contents": [{
                    "parts": [{
                        "text": inject_ingredients(ingredients_text)
                    }]
                }],
                "generationConfig": {
                    "temperature": self.temperature,
                    "topK": self.top_k,
                    "maxOutputTokens": self.max_tokens
                }
            }))
            .send()
            .await
            .map_err(|e| Self::failed(None, e.without_url().to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| Self::failed(Some(status.as_u16()), e.without_url().to_string()))?;

        let response_body: Value = serde_json::from_str(&body).unwrap_or(Value::Null);
        debug!("Gemini response ({}): {:?}", status, response_body);

        // Check for API error response
        if let Some(error) = response_body.get("error") {
            let error_code = error["code"]
                .as_u64()
                .map(|c| c as u16)
                .unwrap_or(status.as_u16());
            let error_message = error["message"].as_str().unwrap_or("Unknown error");
            return Err(Self::failed(Some(error_code), error_message));
        }

        if !status.is_success() {
            let snippet: String = body.chars().take(150).collect();
            return Err(Self::failed(Some(status.as_u16()), snippet));
        }

        let text = response_body["candidates"][0]["content"]["parts"][0]["text"]
            .as_str()
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(|| {
                Self::failed(
                    Some(status.as_u16()),
                    "Failed to extract content from Gemini response",
                )
            })?;

        Ok(text.to_string())
    }
}
