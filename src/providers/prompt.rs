/// The instruction prompt used to structure free-text ingredients.
///
/// Loaded from `prompt.txt` at compile time using `include_str!`, so the
/// wording can be edited without dealing with Rust string syntax.
///
/// Contains an `{{INGREDIENTS}}` placeholder that [`inject_ingredients`]
/// replaces with the user's text.
pub const INGREDIENT_PARSER_PROMPT: &str = include_str!("prompt.txt");

/// Injects the raw ingredient text into the prompt template.
pub fn inject_ingredients(ingredients_text: &str) -> String {
    INGREDIENT_PARSER_PROMPT.replace("{{INGREDIENTS}}", ingredients_text.trim())
}
