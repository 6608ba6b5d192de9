use crate::config::SpoonacularConfig;
use crate::error::NutritionError;
use crate::model::{NutritionQuery, NutritionResponse};
use crate::nutrition::NutritionLookup;
use async_trait::async_trait;
use log::{debug, warn};
use reqwest::Client;
use std::time::Duration;

/// Error bodies are cut to this many characters before being reported
const ERROR_BODY_LIMIT: usize = 150;

/// Client for Spoonacular's `POST /recipes/analyze` endpoint
pub struct SpoonacularClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl SpoonacularClient {
    /// Create a new client from configuration
    pub fn new(config: &SpoonacularConfig, timeout: Duration) -> Result<Self, NutritionError> {
        // Try config first, then fall back to environment variable
        let api_key = config
            .api_key
            .clone()
            .or_else(|| std::env::var("SPOONACULAR_API_KEY").ok())
            .ok_or_else(|| NutritionError::MissingCredential("Spoonacular".to_string()))?;

        Self::with_api_key(api_key, config, timeout)
    }

    /// Create a client with an explicit key. An empty key is accepted here and
    /// reported when the client is used.
    pub fn with_api_key(
        api_key: impl Into<String>,
        config: &SpoonacularConfig,
        timeout: Duration,
    ) -> Result<Self, NutritionError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| NutritionError::BuilderError(format!("HTTP client: {}", e)))?;

        Ok(SpoonacularClient {
            client,
            api_key: api_key.into(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
        })
    }
}

fn api_error(status: Option<u16>, message: impl Into<String>) -> NutritionError {
    NutritionError::NutritionApi {
        status,
        message: message.into(),
    }
}

fn truncate(body: &str) -> String {
    body.trim().chars().take(ERROR_BODY_LIMIT).collect()
}

#[async_trait]
impl NutritionLookup for SpoonacularClient {
    fn service_name(&self) -> &str {
        "spoonacular"
    }

    fn is_configured(&self) -> bool {
        !self.api_key.trim().is_empty()
    }

    async fn analyze(&self, query: &NutritionQuery) -> Result<NutritionResponse, NutritionError> {
        if !self.is_configured() {
            return Err(NutritionError::MissingCredential("Spoonacular".to_string()));
        }

        let url = format!("{}/recipes/analyze", self.base_url);
        debug!(
            "Requesting nutrition analysis for '{}' ({} ingredients)",
            query.title,
            query.ingredients.len()
        );

        let response = self
            .client
            .post(&url)
            .query(&[
                ("apiKey", self.api_key.as_str()),
                ("includeNutrition", "true"),
            ])
            .json(query)
            .send()
            .await
            .map_err(|e| api_error(None, e.without_url().to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| api_error(Some(status.as_u16()), e.without_url().to_string()))?;

        if !status.is_success() {
            warn!("Nutrition analysis failed with status {}", status);
            return Err(api_error(Some(status.as_u16()), truncate(&body)));
        }

        if body.trim().is_empty() {
            return Err(api_error(Some(status.as_u16()), "Empty response body"));
        }

        serde_json::from_str(&body).map_err(|e| {
            api_error(
                Some(status.as_u16()),
                format!("Invalid response: {}", e),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_service_name() {
        let client = SpoonacularClient::with_api_key(
            "test-key",
            &SpoonacularConfig::default(),
            Duration::from_secs(5),
        )
        .unwrap();
        assert_eq!(client.service_name(), "spoonacular");
        assert!(client.is_configured());
    }

    #[test]
    fn test_truncate_limits_characters() {
        let body = "é".repeat(400);
        let truncated = truncate(&body);
        assert_eq!(truncated.chars().count(), ERROR_BODY_LIMIT);
    }

    #[tokio::test]
    async fn test_missing_key_fails_before_request() {
        let client =
            SpoonacularClient::with_api_key("", &SpoonacularConfig::default(), Duration::from_secs(5))
                .unwrap();
        let result = client.analyze(&NutritionQuery::default()).await;
        assert!(matches!(result, Err(NutritionError::MissingCredential(_))));
    }
}
