pub mod builder;
pub mod config;
pub mod error;
pub mod ingredients;
pub mod json_repair;
pub mod model;
pub mod nutrition;
pub mod pipeline;
pub mod providers;
pub mod retry;
pub mod summary;

// UniFFI bindings for mobile platforms
pub mod uniffi_bindings;

// Re-export main types for convenient access
pub use builder::{NutritionEstimator, NutritionEstimatorBuilder};
pub use config::NutritionConfig;
pub use error::NutritionError;
pub use model::{EstimateRequest, ParsedIngredient, UiNutritionSummary};
pub use pipeline::{EstimateState, NutritionPipeline};

/// Estimate nutrition for a recipe using keys from `nutrition.toml` or the
/// environment.
///
/// # Example
/// ```no_run
/// # use recipe_nutrition::estimate_nutrition;
/// # #[tokio::main]
/// # async fn main() -> Result<(), Box<dyn std::error::Error>> {
/// let summary = estimate_nutrition("Pollo", "200g de pechuga de pollo\n1 cebolla").await?;
/// println!("{} / {}", summary.calories, summary.protein);
/// # Ok(())
/// # }
/// ```
pub async fn estimate_nutrition(
    title: &str,
    ingredients: &str,
) -> Result<UiNutritionSummary, NutritionError> {
    NutritionEstimator::builder()
        .title(title)
        .ingredients(ingredients)
        .build()
        .await
}

/// Estimate nutrition with explicit API keys, skipping configuration lookup
/// for credentials.
pub async fn estimate_nutrition_with_keys(
    title: &str,
    ingredients: &str,
    gemini_api_key: &str,
    spoonacular_api_key: &str,
) -> Result<UiNutritionSummary, NutritionError> {
    NutritionEstimator::builder()
        .title(title)
        .ingredients(ingredients)
        .gemini_api_key(gemini_api_key)
        .spoonacular_api_key(spoonacular_api_key)
        .build()
        .await
}
