use serde::{Deserialize, Deserializer, Serialize};

/// One ingredient as structured by the parser. Extraction is best effort,
/// so every field may be missing.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParsedIngredient {
    pub name: Option<String>,
    pub quantity: Option<f64>,
    pub unit: Option<String>,
    pub notes: Option<String>,
}

/// Request body for the nutrition-analysis endpoint
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct NutritionQuery {
    pub title: String,
    /// One formatted line per ingredient, e.g. "200 g pechuga de pollo"
    pub ingredients: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub servings: Option<u32>,
}

/// Raw analysis response. Only the fields the summary needs are decoded and
/// all of them tolerate absence.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NutritionResponse {
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub servings: Option<f64>,
    #[serde(default)]
    pub nutrition: Option<Nutrition>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub extended_ingredients: Vec<IngredientEcho>,
}

/// Decode an explicit `null` the same way as a missing key.
fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Nutrition {
    #[serde(default, deserialize_with = "null_as_default")]
    pub nutrients: Vec<Nutrient>,
    #[serde(default, deserialize_with = "null_as_default")]
    pub ingredients: Vec<IngredientEcho>,
    #[serde(default)]
    pub caloric_breakdown: Option<CaloricBreakdown>,
    #[serde(default)]
    pub weight_per_serving: Option<Amount>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Nutrient {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
    #[serde(default)]
    pub percent_of_daily_needs: Option<f64>,
}

/// An ingredient as the nutrition service understood it
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IngredientEcho {
    #[serde(default)]
    pub name_clean: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub original_name: Option<String>,
    #[serde(default)]
    pub original: Option<String>,
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaloricBreakdown {
    #[serde(default)]
    pub percent_protein: Option<f64>,
    #[serde(default)]
    pub percent_fat: Option<f64>,
    #[serde(default)]
    pub percent_carbs: Option<f64>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Amount {
    #[serde(default)]
    pub amount: Option<f64>,
    #[serde(default)]
    pub unit: Option<String>,
}

/// Display-ready nutrition summary. Derived per run and never persisted.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UiNutritionSummary {
    pub calories: String,
    pub protein: String,
    pub fat: String,
    pub carbs: String,
    pub recognized_ingredients: Vec<String>,
    pub notes: Vec<String>,
}

/// Input for one estimate run
#[derive(Debug, Clone, Default)]
pub struct EstimateRequest {
    pub title: String,
    /// Raw multi-line ingredient text as typed by the user
    pub ingredients: String,
    pub servings: Option<u32>,
}

impl EstimateRequest {
    pub fn new(title: impl Into<String>, ingredients: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ingredients: ingredients.into(),
            servings: None,
        }
    }

    pub fn with_servings(mut self, servings: u32) -> Self {
        self.servings = Some(servings);
        self
    }
}

/// Largest magnitude below which every whole `f64` converts to `i64` exactly.
const MAX_EXACT_INTEGER: f64 = 9_007_199_254_740_992.0;

/// Format an amount as an integer when whole, otherwise with one decimal.
///
/// Only exactly whole values drop the decimal, so 2.96 renders as "3.0".
pub fn format_amount(value: f64) -> String {
    if value.fract() == 0.0 && value.abs() <= MAX_EXACT_INTEGER {
        format!("{}", value as i64)
    } else {
        format!("{:.1}", value)
    }
}
