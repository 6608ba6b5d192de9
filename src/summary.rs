use crate::model::{format_amount, IngredientEcho, Nutrient, NutritionResponse, UiNutritionSummary};

const NOT_AVAILABLE: &str = "N/A";

/// Build the display summary from a raw analysis response.
///
/// `extracted_count` is the number of ingredients the parser produced; it
/// feeds the coverage note. Missing data degrades to "N/A" or omitted notes,
/// so this never fails.
pub fn summarize(response: &NutritionResponse, extracted_count: usize) -> UiNutritionSummary {
    let nutrients: &[Nutrient] = response
        .nutrition
        .as_ref()
        .map(|n| n.nutrients.as_slice())
        .unwrap_or_default();

    let echoes: &[IngredientEcho] = if !response.extended_ingredients.is_empty() {
        &response.extended_ingredients
    } else {
        response
            .nutrition
            .as_ref()
            .map(|n| n.ingredients.as_slice())
            .unwrap_or_default()
    };

    let recognized_ingredients: Vec<String> =
        echoes.iter().filter_map(format_echo).collect();

    let mut notes = vec![format!(
        "Ingredients recognized: {} of ~{}",
        recognized_ingredients.len(),
        extracted_count
    )];

    if let Some(nutrition) = &response.nutrition {
        if let Some(weight) = &nutrition.weight_per_serving {
            if let Some(amount) = weight.amount {
                notes.push(
                    format!(
                        "Weight per serving: {} {}",
                        format_amount(amount),
                        weight.unit.as_deref().unwrap_or_default()
                    )
                    .trim_end()
                    .to_string(),
                );
            }
        }

        if let Some(breakdown) = &nutrition.caloric_breakdown {
            let parts: Vec<String> = [
                ("protein", breakdown.percent_protein),
                ("fat", breakdown.percent_fat),
                ("carbs", breakdown.percent_carbs),
            ]
            .into_iter()
            .filter_map(|(label, percent)| {
                percent.map(|p| format!("{} {}%", label, format_amount(p)))
            })
            .collect();

            if !parts.is_empty() {
                notes.push(format!("Caloric breakdown: {}", parts.join(", ")));
            }
        }
    }

    UiNutritionSummary {
        calories: nutrient_value(nutrients, "Calories"),
        protein: nutrient_value(nutrients, "Protein"),
        fat: nutrient_value(nutrients, "Fat"),
        carbs: nutrient_value(nutrients, "Carbohydrates"),
        recognized_ingredients,
        notes,
    }
}

/// "<amount> <unit>" for the nutrient with the given name, matched
/// case-insensitively, or "N/A".
fn nutrient_value(nutrients: &[Nutrient], name: &str) -> String {
    nutrients
        .iter()
        .find(|n| {
            n.name
                .as_deref()
                .is_some_and(|candidate| candidate.trim().eq_ignore_ascii_case(name))
        })
        .and_then(|n| {
            n.amount.map(|amount| {
                format!(
                    "{} {}",
                    format_amount(amount),
                    n.unit.as_deref().unwrap_or_default()
                )
                .trim_end()
                .to_string()
            })
        })
        .unwrap_or_else(|| NOT_AVAILABLE.to_string())
}

/// "<amount> <unit> <name>", preferring the cleaned name. Blank results are dropped.
fn format_echo(echo: &IngredientEcho) -> Option<String> {
    let name = [
        &echo.name_clean,
        &echo.name,
        &echo.original_name,
        &echo.original,
    ]
    .into_iter()
    .flatten()
    .map(|n| n.trim())
    .find(|n| !n.is_empty())?;

    let amount = echo.amount.map(format_amount);
    let line = [amount.as_deref(), echo.unit.as_deref(), Some(name)]
        .into_iter()
        .flatten()
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ");

    Some(line)
}
