use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

/// Main configuration structure
#[derive(Debug, Deserialize, Clone)]
pub struct NutritionConfig {
    /// Generative-text service used to structure ingredient text
    #[serde(default)]
    pub gemini: GeminiConfig,
    /// Nutrition-analysis service
    #[serde(default)]
    pub spoonacular: SpoonacularConfig,
    /// Bounded retry for transient failures
    #[serde(default)]
    pub retry: RetryConfig,
    /// Request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout: u64,
}

/// Configuration for the Gemini ingredient parser
#[derive(Debug, Deserialize, Clone)]
pub struct GeminiConfig {
    /// API key for authentication (can also be set via environment variable)
    pub api_key: Option<String>,
    /// Model identifier (e.g., "gemini-1.5-flash")
    #[serde(default = "default_gemini_model")]
    pub model: String,
    /// Temperature for generation, kept near zero for deterministic output
    #[serde(default)]
    pub temperature: f32,
    /// Top-k sampling
    #[serde(default = "default_top_k")]
    pub top_k: u32,
    /// Maximum tokens to generate
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    /// Base URL for API endpoint (for proxies and tests)
    #[serde(default = "default_gemini_base_url")]
    pub base_url: String,
}

impl Default for GeminiConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: default_gemini_model(),
            temperature: 0.0,
            top_k: default_top_k(),
            max_tokens: default_max_tokens(),
            base_url: default_gemini_base_url(),
        }
    }
}

/// Configuration for the Spoonacular nutrition lookup
#[derive(Debug, Deserialize, Clone)]
pub struct SpoonacularConfig {
    /// API key for authentication (can also be set via environment variable)
    pub api_key: Option<String>,
    /// Base URL for API endpoint (for proxies and tests)
    #[serde(default = "default_spoonacular_base_url")]
    pub base_url: String,
    /// Servings sent with every analysis request unless the caller overrides it
    pub servings: Option<u32>,
}

impl Default for SpoonacularConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_spoonacular_base_url(),
            servings: None,
        }
    }
}

/// Retry behaviour for external calls
#[derive(Debug, Deserialize, Clone)]
pub struct RetryConfig {
    /// Total attempts per call, including the first one
    #[serde(default = "default_retry_attempts")]
    pub attempts: u32,
    /// Base delay in milliseconds; the wait before retry `n` is `delay_ms * n`
    #[serde(default = "default_retry_delay_ms")]
    pub delay_ms: u64,
}

impl Default for RetryConfig {
    fn default() -> Self {
        Self {
            attempts: default_retry_attempts(),
            delay_ms: default_retry_delay_ms(),
        }
    }
}

impl Default for NutritionConfig {
    fn default() -> Self {
        Self {
            gemini: GeminiConfig::default(),
            spoonacular: SpoonacularConfig::default(),
            retry: RetryConfig::default(),
            timeout: default_timeout(),
        }
    }
}

// Default value functions
fn default_gemini_model() -> String {
    "gemini-1.5-flash".to_string()
}

fn default_top_k() -> u32 {
    1
}

fn default_max_tokens() -> u32 {
    2048
}

fn default_gemini_base_url() -> String {
    "https://generativelanguage.googleapis.com".to_string()
}

fn default_spoonacular_base_url() -> String {
    "https://api.spoonacular.com".to_string()
}

fn default_retry_attempts() -> u32 {
    1
}

fn default_retry_delay_ms() -> u64 {
    500
}

fn default_timeout() -> u64 {
    30
}

impl NutritionConfig {
    /// Load configuration from file and environment variables
    ///
    /// Configuration is loaded with the following priority (highest to lowest):
    /// 1. Environment variables with NUTRITION__ prefix
    /// 2. nutrition.toml file in current directory
    /// 3. Default values
    ///
    /// Environment variable format: NUTRITION__GEMINI__API_KEY
    pub fn load() -> Result<Self, ConfigError> {
        load_config()
    }
}

/// Load configuration from file and environment variables
///
/// See [`NutritionConfig::load`] for the source priority.
pub fn load_config() -> Result<NutritionConfig, ConfigError> {
    let settings = Config::builder()
        // Optional config file (can be missing)
        .add_source(File::with_name("nutrition").required(false))
        // Use double underscore for nested: NUTRITION__SPOONACULAR__API_KEY
        .add_source(
            Environment::with_prefix("NUTRITION")
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    settings.try_deserialize()
}
