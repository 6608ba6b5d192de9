//! UniFFI bindings for recipe-nutrition
//!
//! This module provides FFI-compatible types and functions for use with iOS and Android.
//! It wraps the async Rust API with synchronous functions that manage their own tokio runtime.

use std::fmt;
use std::time::Duration;

use crate::{NutritionError, UiNutritionSummary};

// Re-export UniFFI macro
#[cfg(feature = "uniffi")]
uniffi::setup_scaffolding!();

/// FFI-compatible nutrition summary
#[derive(Debug, Clone)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct FfiNutritionSummary {
    pub calories: String,
    pub protein: String,
    pub fat: String,
    pub carbs: String,
    pub recognized_ingredients: Vec<String>,
    pub notes: Vec<String>,
}

impl From<UiNutritionSummary> for FfiNutritionSummary {
    fn from(summary: UiNutritionSummary) -> Self {
        FfiNutritionSummary {
            calories: summary.calories,
            protein: summary.protein,
            fat: summary.fat,
            carbs: summary.carbs,
            recognized_ingredients: summary.recognized_ingredients,
            notes: summary.notes,
        }
    }
}

/// FFI-compatible error type. The two failure families the UI tells apart
/// map to `ParserError` and `NutritionApiError`.
#[derive(Debug, Clone)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Error))]
pub enum FfiNutritionError {
    /// Ingredients could not be structured (includes input validation)
    ParserError { message: String },
    /// The nutrition-analysis service failed
    NutritionApiError {
        status: Option<u16>,
        message: String,
    },
    /// Configuration error
    ConfigError { message: String },
    /// Runtime error (tokio)
    RuntimeError { message: String },
}

impl fmt::Display for FfiNutritionError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FfiNutritionError::ParserError { message } => write!(f, "Parser error: {}", message),
            FfiNutritionError::NutritionApiError { message, .. } => {
                write!(f, "Nutrition service error: {}", message)
            }
            FfiNutritionError::ConfigError { message } => write!(f, "Config error: {}", message),
            FfiNutritionError::RuntimeError { message } => write!(f, "Runtime error: {}", message),
        }
    }
}

impl std::error::Error for FfiNutritionError {}

impl From<NutritionError> for FfiNutritionError {
    fn from(err: NutritionError) -> Self {
        match err {
            NutritionError::NutritionApi { status, message } => {
                FfiNutritionError::NutritionApiError { status, message }
            }
            NutritionError::ConfigError(e) => FfiNutritionError::ConfigError {
                message: e.to_string(),
            },
            NutritionError::BuilderError(message) => FfiNutritionError::ConfigError { message },
            other => FfiNutritionError::ParserError {
                message: other.to_string(),
            },
        }
    }
}

/// Configuration for a nutrition estimate
#[derive(Debug, Clone, Default)]
#[cfg_attr(feature = "uniffi", derive(uniffi::Record))]
pub struct FfiEstimateConfig {
    /// Optional Gemini API key (uses config/environment if not specified)
    pub gemini_api_key: Option<String>,
    /// Optional Spoonacular API key (uses config/environment if not specified)
    pub spoonacular_api_key: Option<String>,
    /// Optional Gemini model name
    pub model: Option<String>,
    /// Optional number of servings
    pub servings: Option<u32>,
    /// Optional timeout in seconds (uses default if not specified)
    pub timeout_seconds: Option<u64>,
}

/// Create a new tokio runtime for FFI calls
fn create_runtime() -> Result<tokio::runtime::Runtime, FfiNutritionError> {
    tokio::runtime::Runtime::new().map_err(|e| FfiNutritionError::RuntimeError {
        message: format!("Failed to create async runtime: {}", e),
    })
}

/// Estimate nutrition for a recipe
///
/// # Arguments
/// * `title` - Recipe title
/// * `ingredients` - Raw ingredient text, one ingredient per line
/// * `config` - Optional keys and overrides
///
/// # Returns
/// An `FfiNutritionSummary` ready for display
#[cfg_attr(feature = "uniffi", uniffi::export)]
pub fn estimate_nutrition(
    title: String,
    ingredients: String,
    config: Option<FfiEstimateConfig>,
) -> Result<FfiNutritionSummary, FfiNutritionError> {
    let rt = create_runtime()?;
    rt.block_on(async { estimate_nutrition_async(&title, &ingredients, config).await })
}

async fn estimate_nutrition_async(
    title: &str,
    ingredients: &str,
    config: Option<FfiEstimateConfig>,
) -> Result<FfiNutritionSummary, FfiNutritionError> {
    let config = config.unwrap_or_default();

    let mut builder = crate::NutritionEstimator::builder()
        .title(title)
        .ingredients(ingredients);

    if let Some(key) = config.gemini_api_key {
        builder = builder.gemini_api_key(key);
    }

    if let Some(key) = config.spoonacular_api_key {
        builder = builder.spoonacular_api_key(key);
    }

    if let Some(model) = config.model {
        builder = builder.model(model);
    }

    if let Some(servings) = config.servings {
        builder = builder.servings(servings);
    }

    if let Some(timeout_secs) = config.timeout_seconds {
        builder = builder.timeout(Duration::from_secs(timeout_secs));
    }

    let summary = builder.build().await?;
    Ok(summary.into())
}

/// Get the library version
#[cfg_attr(feature = "uniffi", uniffi::export)]
pub fn get_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// Check whether both API keys are available from the environment
#[cfg_attr(feature = "uniffi", uniffi::export)]
pub fn are_credentials_available() -> bool {
    let gemini = std::env::var("GEMINI_API_KEY").is_ok() || std::env::var("GOOGLE_API_KEY").is_ok();
    gemini && std::env::var("SPOONACULAR_API_KEY").is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ffi_summary_conversion() {
        let summary = UiNutritionSummary {
            calories: "350 kcal".to_string(),
            protein: "N/A".to_string(),
            fat: "12 g".to_string(),
            carbs: "40.5 g".to_string(),
            recognized_ingredients: vec!["200 g chicken breast".to_string()],
            notes: vec!["Ingredients recognized: 1 of ~2".to_string()],
        };

        let ffi: FfiNutritionSummary = summary.into();
        assert_eq!(ffi.calories, "350 kcal");
        assert_eq!(ffi.carbs, "40.5 g");
        assert_eq!(ffi.recognized_ingredients.len(), 1);
        assert_eq!(ffi.notes.len(), 1);
    }

    #[test]
    fn test_error_families() {
        let parser: FfiNutritionError = NutritionError::NoJsonFound.into();
        assert!(matches!(parser, FfiNutritionError::ParserError { .. }));

        let api: FfiNutritionError = NutritionError::NutritionApi {
            status: Some(403),
            message: "forbidden".to_string(),
        }
        .into();
        assert!(matches!(
            api,
            FfiNutritionError::NutritionApiError {
                status: Some(403),
                ..
            }
        ));
    }

    #[test]
    fn test_blank_ingredients_fail_without_network() {
        let result = estimate_nutrition(
            "Pollo".to_string(),
            " ".to_string(),
            Some(FfiEstimateConfig {
                gemini_api_key: Some("g".to_string()),
                spoonacular_api_key: Some("s".to_string()),
                ..Default::default()
            }),
        );
        assert!(matches!(result, Err(FfiNutritionError::ParserError { .. })));
    }

    #[test]
    fn test_get_version() {
        let version = get_version();
        assert!(!version.is_empty());
    }
}
