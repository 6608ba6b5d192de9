use crate::error::NutritionError;
use crate::model::{format_amount, ParsedIngredient};
use log::{debug, warn};
use serde_json::{Map, Value};

const INGREDIENT_FIELDS: &[&str] = &["name", "quantity", "unit", "notes"];

/// Decode repaired JSON into structured ingredients.
///
/// Accepts a top-level array, an object wrapping an `ingredients` array, or a
/// single object carrying at least one ingredient field. Fields are decoded
/// one by one: a missing or mistyped field becomes `None` instead of
/// rejecting the record, and array entries that are not objects are skipped.
pub fn parse_ingredients(json: &str) -> Result<Vec<ParsedIngredient>, NutritionError> {
    let value: Value =
        serde_json::from_str(json).map_err(|e| NutritionError::MalformedIngredientJson {
            json: json.to_string(),
            reason: e.to_string(),
        })?;

    let entries = match value {
        Value::Array(items) => items,
        Value::Object(mut map) => match map.remove("ingredients") {
            Some(Value::Array(items)) => items,
            Some(_) => {
                return Err(NutritionError::MalformedIngredientJson {
                    json: json.to_string(),
                    reason: "\"ingredients\" is not an array".to_string(),
                })
            }
            None if INGREDIENT_FIELDS.iter().any(|key| map.contains_key(*key)) => {
                vec![Value::Object(map)]
            }
            None => {
                warn!("Top-level object has no ingredient fields");
                Vec::new()
            }
        },
        other => {
            return Err(NutritionError::MalformedIngredientJson {
                json: json.to_string(),
                reason: format!("expected an array or object, found {}", type_name(&other)),
            })
        }
    };

    let ingredients: Vec<ParsedIngredient> = entries
        .iter()
        .filter_map(|entry| match entry {
            Value::Object(fields) => Some(ingredient_from_fields(fields)),
            other => {
                warn!("Skipping non-object ingredient entry: {}", other);
                None
            }
        })
        .collect();

    if ingredients.is_empty() {
        return Err(NutritionError::NoIngredientsExtracted);
    }

    debug!("Parsed {} structured ingredients", ingredients.len());
    Ok(ingredients)
}

fn ingredient_from_fields(fields: &Map<String, Value>) -> ParsedIngredient {
    ParsedIngredient {
        name: text_field(fields, "name"),
        quantity: fields.get("quantity").and_then(number_value),
        unit: text_field(fields, "unit"),
        notes: text_field(fields, "notes"),
    }
}

fn text_field(fields: &Map<String, Value>, key: &str) -> Option<String> {
    match fields.get(key)? {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}

/// Numbers pass through; numeric strings such as "200" or "1,5" are parsed.
fn number_value(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().replace(',', ".").parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|n| n.is_finite())
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Render one ingredient as a free-text lookup line:
/// quantity, unit, name and notes separated by single spaces.
pub fn format_query(ingredient: &ParsedIngredient) -> String {
    let quantity = ingredient.quantity.map(format_amount);
    [
        quantity.as_deref(),
        ingredient.unit.as_deref(),
        ingredient.name.as_deref(),
        ingredient.notes.as_deref(),
    ]
    .into_iter()
    .flatten()
    .flat_map(str::split_whitespace)
    .collect::<Vec<_>>()
    .join(" ")
}

/// Format every ingredient, dropping the ones that render empty.
///
/// Fails with [`NutritionError::NoFormattableIngredients`] when nothing is left.
pub fn format_queries(ingredients: &[ParsedIngredient]) -> Result<Vec<String>, NutritionError> {
    let lines: Vec<String> = ingredients
        .iter()
        .map(format_query)
        .filter(|line| !line.is_empty())
        .collect();

    if lines.is_empty() {
        return Err(NutritionError::NoFormattableIngredients);
    }
    Ok(lines)
}
