use std::sync::Arc;
use std::time::Duration;

use crate::config::NutritionConfig;
use crate::nutrition::SpoonacularClient;
use crate::pipeline::NutritionPipeline;
use crate::providers::GeminiParser;
use crate::{EstimateRequest, NutritionError, UiNutritionSummary};

/// Builder for configuring and executing a one-off nutrition estimate
#[derive(Debug, Default)]
pub struct NutritionEstimatorBuilder {
    title: Option<String>,
    ingredients: Option<String>,
    servings: Option<u32>,
    gemini_api_key: Option<String>,
    spoonacular_api_key: Option<String>,
    model: Option<String>,
    timeout: Option<Duration>,
    config: Option<NutritionConfig>,
}

impl NutritionEstimatorBuilder {
    /// Set the recipe title sent to the nutrition service
    ///
    /// # Example
    /// ```
    /// use recipe_nutrition::NutritionEstimator;
    ///
    /// let builder = NutritionEstimator::builder()
    ///     .title("Pollo encebollado");
    /// ```
    pub fn title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// Set the raw ingredient text, one ingredient per line
    ///
    /// # Example
    /// ```
    /// use recipe_nutrition::NutritionEstimator;
    ///
    /// let builder = NutritionEstimator::builder()
    ///     .ingredients("200g de pechuga de pollo\n1 cebolla");
    /// ```
    pub fn ingredients(mut self, text: impl Into<String>) -> Self {
        self.ingredients = Some(text.into());
        self
    }

    /// Set the number of servings the recipe yields
    pub fn servings(mut self, servings: u32) -> Self {
        self.servings = Some(servings);
        self
    }

    /// Set the Gemini API key instead of relying on config or environment
    pub fn gemini_api_key(mut self, key: impl Into<String>) -> Self {
        self.gemini_api_key = Some(key.into());
        self
    }

    /// Set the Spoonacular API key instead of relying on config or environment
    pub fn spoonacular_api_key(mut self, key: impl Into<String>) -> Self {
        self.spoonacular_api_key = Some(key.into());
        self
    }

    /// Set the Gemini model name
    ///
    /// # Example
    /// ```
    /// use recipe_nutrition::NutritionEstimator;
    ///
    /// let builder = NutritionEstimator::builder()
    ///     .model("gemini-1.5-pro");
    /// ```
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.model = Some(model.into());
        self
    }

    /// Set a timeout for each HTTP request
    ///
    /// # Example
    /// ```
    /// use recipe_nutrition::NutritionEstimator;
    /// use std::time::Duration;
    ///
    /// let builder = NutritionEstimator::builder()
    ///     .timeout(Duration::from_secs(15));
    /// ```
    pub fn timeout(mut self, duration: Duration) -> Self {
        self.timeout = Some(duration);
        self
    }

    /// Use an explicit configuration instead of loading `nutrition.toml`
    pub fn config(mut self, config: NutritionConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Build the pipeline and run a single estimate
    ///
    /// # Errors
    /// Returns `NutritionError` if:
    /// - No ingredient text was specified or it is blank
    /// - An API key is missing
    /// - The ingredient parser or the nutrition service fails
    ///
    /// # Example
    /// ```no_run
    /// # use recipe_nutrition::NutritionEstimator;
    /// # #[tokio::main]
    /// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
    /// let summary = NutritionEstimator::builder()
    ///     .title("Pollo encebollado")
    ///     .ingredients("200g de pechuga de pollo\n1 cebolla")
    ///     .build()
    ///     .await?;
    /// println!("{}", summary.calories);
    /// # Ok(())
    /// # }
    /// ```
    pub async fn build(self) -> Result<UiNutritionSummary, NutritionError> {
        let ingredients = self.ingredients.ok_or_else(|| {
            NutritionError::BuilderError(
                "No ingredients specified. Use .ingredients()".to_string(),
            )
        })?;
        if ingredients.trim().is_empty() {
            return Err(NutritionError::EmptyInput);
        }

        let mut config = match self.config {
            Some(config) => config,
            None => NutritionConfig::load()?,
        };
        if let Some(key) = self.gemini_api_key {
            config.gemini.api_key = Some(key);
        }
        if let Some(key) = self.spoonacular_api_key {
            config.spoonacular.api_key = Some(key);
        }
        if let Some(model) = self.model {
            config.gemini.model = model;
        }
        let timeout = self
            .timeout
            .unwrap_or_else(|| Duration::from_secs(config.timeout));

        // Unlike the pipeline, the builder reports missing keys as errors.
        let parser = GeminiParser::new(&config.gemini, timeout)?;
        let lookup = SpoonacularClient::new(&config.spoonacular, timeout)?;
        let pipeline = NutritionPipeline::new(Arc::new(parser), Arc::new(lookup))
            .with_retry(config.retry.clone());

        let request = EstimateRequest {
            title: self.title.unwrap_or_default(),
            ingredients,
            servings: self.servings.or(config.spoonacular.servings),
        };

        pipeline.estimate_summary(&request).await
    }
}

/// Main entry point for the builder API
pub struct NutritionEstimator;

impl NutritionEstimator {
    /// Creates a new builder for estimating nutrition
    ///
    /// # Example
    /// ```
    /// use recipe_nutrition::NutritionEstimator;
    ///
    /// let builder = NutritionEstimator::builder();
    /// ```
    pub fn builder() -> NutritionEstimatorBuilder {
        NutritionEstimatorBuilder::default()
    }
}
