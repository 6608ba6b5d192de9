mod spoonacular;

pub use spoonacular::SpoonacularClient;

use crate::error::NutritionError;
use crate::model::{NutritionQuery, NutritionResponse};
use async_trait::async_trait;

/// Third-party service that estimates nutrients for a list of ingredient lines
#[async_trait]
pub trait NutritionLookup: Send + Sync {
    /// Get the service name (e.g., "spoonacular")
    fn service_name(&self) -> &str;

    /// Whether the client holds the credential it needs
    fn is_configured(&self) -> bool;

    /// Analyze the formatted ingredient lines of one recipe
    async fn analyze(&self, query: &NutritionQuery) -> Result<NutritionResponse, NutritionError>;
}
