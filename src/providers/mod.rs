mod google;
mod prompt;

pub use google::GeminiParser;
pub use prompt::{inject_ingredients, INGREDIENT_PARSER_PROMPT};

use crate::error::NutritionError;
use async_trait::async_trait;

/// Turns free-text ingredient lines into a JSON-ish string via a
/// generative-text model.
#[async_trait]
pub trait IngredientParser: Send + Sync {
    /// Get the provider name (e.g., "gemini")
    fn provider_name(&self) -> &str;

    /// Whether the parser holds the credential it needs
    fn is_configured(&self) -> bool;

    /// Ask the model to structure the ingredients. Returns the raw model
    /// text, which may be wrapped in prose or a fenced block.
    async fn parse(&self, ingredients_text: &str) -> Result<String, NutritionError>;
}
