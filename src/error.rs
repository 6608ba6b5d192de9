use thiserror::Error;

/// Errors that can occur while estimating nutrition for a recipe
#[derive(Error, Debug)]
pub enum NutritionError {
    /// An API key required for one of the external services is missing
    #[error("Missing API key for {0}")]
    MissingCredential(String),

    /// Ingredient text was blank
    #[error("Ingredient text cannot be empty")]
    EmptyInput,

    /// The generative-text service could not be reached or refused the request
    #[error("Ingredient parser request failed{}: {}", fmt_status(.status), .message)]
    ParseFailed {
        status: Option<u16>,
        message: String,
    },

    /// The model response did not contain anything that looks like JSON
    #[error("No JSON found in the ingredient parser response")]
    NoJsonFound,

    /// JSON was located but could not be decoded into ingredients
    #[error("Malformed ingredient JSON ({reason}): {json}")]
    MalformedIngredientJson { json: String, reason: String },

    /// The parser produced a valid but empty ingredient list
    #[error("No ingredients could be extracted from the text")]
    NoIngredientsExtracted,

    /// Every extracted ingredient formatted to an empty query line
    #[error("None of the extracted ingredients could be formatted for lookup")]
    NoFormattableIngredients,

    /// The nutrition-analysis service failed
    #[error("Nutrition service error{}: {}", fmt_status(.status), .message)]
    NutritionApi {
        status: Option<u16>,
        message: String,
    },

    /// Builder configuration error
    #[error("Builder error: {0}")]
    BuilderError(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    ConfigError(#[from] config::ConfigError),
}

fn fmt_status(status: &Option<u16>) -> String {
    status.map(|s| format!(" ({})", s)).unwrap_or_default()
}

impl NutritionError {
    /// True for failures that belong to the parsing half of the pipeline
    /// (everything before the nutrition lookup is issued).
    pub fn is_parser_error(&self) -> bool {
        !matches!(self, NutritionError::NutritionApi { .. })
    }

    /// Transport failures and server-side (5xx) errors. Client errors and
    /// local validation failures are never transient.
    pub fn is_transient(&self) -> bool {
        match self {
            NutritionError::ParseFailed { status, .. }
            | NutritionError::NutritionApi { status, .. } => match status {
                None => true,
                Some(code) => *code >= 500,
            },
            _ => false,
        }
    }

    /// HTTP status code reported by the failing service, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            NutritionError::ParseFailed { status, .. }
            | NutritionError::NutritionApi { status, .. } => *status,
            _ => None,
        }
    }
}
