use log::{debug, error};
use recipe_nutrition::{EstimateRequest, EstimateState, NutritionConfig, NutritionPipeline};
use std::env;
use tokio::io::AsyncReadExt;

const USAGE: &str = "Usage: recipe-nutrition <title> [ingredients-file | -]";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    // Get the title and ingredient source from command-line arguments
    let args: Vec<String> = env::args().collect();
    let title = args.get(1).ok_or(USAGE)?;
    let ingredients = match args.get(2).map(String::as_str) {
        None | Some("-") => {
            let mut buffer = String::new();
            tokio::io::stdin().read_to_string(&mut buffer).await?;
            buffer
        }
        Some(path) => tokio::fs::read_to_string(path).await?,
    };

    let config = NutritionConfig::load()?;
    debug!("{:#?}", config.retry);
    let pipeline = NutritionPipeline::from_config(&config)?;

    let request = EstimateRequest {
        title: title.clone(),
        ingredients,
        servings: config.spoonacular.servings,
    };

    match pipeline.estimate(&request).await {
        EstimateState::Success(summary) => {
            println!("Calories: {}", summary.calories);
            println!("Protein:  {}", summary.protein);
            println!("Fat:      {}", summary.fat);
            println!("Carbs:    {}", summary.carbs);
            if !summary.recognized_ingredients.is_empty() {
                println!("\nRecognized ingredients:");
                for ingredient in &summary.recognized_ingredients {
                    println!("  - {}", ingredient);
                }
            }
            for note in &summary.notes {
                println!("{}", note);
            }
            Ok(())
        }
        EstimateState::ParserError(message) | EstimateState::NutritionApiError(message) => {
            error!("{}", message);
            Err(message.into())
        }
        state @ (EstimateState::Idle
        | EstimateState::LoadingParser
        | EstimateState::LoadingNutritionApi) => {
            Err(format!("Estimate did not finish: {:?}", state).into())
        }
    }
}
