use mockito::{Matcher, Server, ServerGuard};
use recipe_nutrition::config::{GeminiConfig, NutritionConfig, RetryConfig, SpoonacularConfig};
use recipe_nutrition::{EstimateRequest, EstimateState, NutritionError, NutritionPipeline};
use serde_json::json;

const GEMINI_PATH: &str = r"/v1beta/models/[^/?]+:generateContent";
const ANALYZE_PATH: &str = "/recipes/analyze";

const TWO_INGREDIENTS: &str = r#"[
  {"name": "pechuga de pollo", "quantity": 200, "unit": "g", "notes": null},
  {"name": "cebolla", "quantity": 1, "unit": "unidad", "notes": null}
]"#;

const CALORIES_ONLY: &str =
    r#"{"nutrition": {"nutrients": [{"name": "Calories", "amount": 350, "unit": "kcal"}]}}"#;

fn test_config(server: &ServerGuard) -> NutritionConfig {
    NutritionConfig {
        gemini: GeminiConfig {
            api_key: Some("gemini-key".to_string()),
            model: "gemini-test".to_string(),
            base_url: server.url(),
            ..GeminiConfig::default()
        },
        spoonacular: SpoonacularConfig {
            api_key: Some("spoon-key".to_string()),
            base_url: server.url(),
            servings: None,
        },
        retry: RetryConfig {
            attempts: 1,
            delay_ms: 1,
        },
        timeout: 5,
    }
}

fn gemini_reply(text: &str) -> String {
    json!({
        "candidates": [{
            "content": {"parts": [{"text": text}], "role": "model"}
        }]
    })
    .to_string()
}

async fn mock_gemini(server: &mut ServerGuard, text: &str, hits: usize) -> mockito::Mock {
    server
        .mock("POST", Matcher::Regex(GEMINI_PATH.to_string()))
        .match_query(Matcher::UrlEncoded("key".into(), "gemini-key".into()))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(gemini_reply(text))
        .expect(hits)
        .create_async()
        .await
}

async fn mock_analyze(
    server: &mut ServerGuard,
    status: usize,
    body: &str,
    hits: usize,
) -> mockito::Mock {
    server
        .mock("POST", ANALYZE_PATH)
        .match_query(Matcher::AllOf(vec![
            Matcher::UrlEncoded("apiKey".into(), "spoon-key".into()),
            Matcher::UrlEncoded("includeNutrition".into(), "true".into()),
        ]))
        .with_status(status)
        .with_header("content-type", "application/json")
        .with_body(body)
        .expect(hits)
        .create_async()
        .await
}

#[tokio::test]
async fn test_two_ingredient_scenario() {
    let mut server = Server::new_async().await;
    let gemini = mock_gemini(&mut server, TWO_INGREDIENTS, 1).await;
    let analyze = server
        .mock("POST", ANALYZE_PATH)
        .match_query(Matcher::UrlEncoded("includeNutrition".into(), "true".into()))
        .match_body(Matcher::PartialJson(json!({
            "title": "Pollo encebollado",
            "ingredients": ["200 g pechuga de pollo", "1 unidad cebolla"]
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(CALORIES_ONLY)
        .create_async()
        .await;

    let pipeline = NutritionPipeline::from_config(&test_config(&server)).unwrap();
    let request = EstimateRequest::new("Pollo encebollado", "200g de pechuga de pollo\n1 cebolla");

    match pipeline.estimate(&request).await {
        EstimateState::Success(summary) => {
            assert_eq!(summary.calories, "350 kcal");
            assert_eq!(summary.protein, "N/A");
            assert_eq!(summary.fat, "N/A");
            assert_eq!(summary.carbs, "N/A");
            assert_eq!(summary.notes[0], "Ingredients recognized: 0 of ~2");
        }
        other => panic!("Expected success, got {:?}", other),
    }

    gemini.assert_async().await;
    analyze.assert_async().await;
}

#[tokio::test]
async fn test_fenced_parser_output_is_accepted() {
    let mut server = Server::new_async().await;
    let fenced = format!(
        "Aquí tienes la lista:\n```json\n{}\n```\nAvísame si necesitas algo más.",
        TWO_INGREDIENTS
    );
    let _gemini = mock_gemini(&mut server, &fenced, 1).await;
    let analyze = mock_analyze(&mut server, 200, CALORIES_ONLY, 1).await;

    let pipeline = NutritionPipeline::from_config(&test_config(&server)).unwrap();
    let state = pipeline
        .estimate(&EstimateRequest::new("Pollo", "200g de pollo\n1 cebolla"))
        .await;

    assert!(matches!(state, EstimateState::Success(_)));
    analyze.assert_async().await;
}

#[tokio::test]
async fn test_response_without_json_never_reaches_lookup() {
    let mut server = Server::new_async().await;
    let _gemini = mock_gemini(&mut server, "Lo siento, no encontré ingredientes.", 1).await;
    let analyze = mock_analyze(&mut server, 200, CALORIES_ONLY, 0).await;

    let pipeline = NutritionPipeline::from_config(&test_config(&server)).unwrap();
    let state = pipeline
        .estimate(&EstimateRequest::new("Nada", "texto cualquiera"))
        .await;

    match state {
        EstimateState::ParserError(message) => assert!(message.contains("No JSON found")),
        other => panic!("Expected parser error, got {:?}", other),
    }
    analyze.assert_async().await;
}

#[tokio::test]
async fn test_blank_ingredients_touch_no_service() {
    let mut server = Server::new_async().await;
    let gemini = mock_gemini(&mut server, TWO_INGREDIENTS, 0).await;
    let analyze = mock_analyze(&mut server, 200, CALORIES_ONLY, 0).await;

    let pipeline = NutritionPipeline::from_config(&test_config(&server)).unwrap();
    let state = pipeline.estimate(&EstimateRequest::new("Pollo", "\n   \n")).await;

    assert!(matches!(state, EstimateState::ParserError(_)));
    gemini.assert_async().await;
    analyze.assert_async().await;
}

#[tokio::test]
async fn test_missing_spoonacular_key_is_local_parser_error() {
    let mut server = Server::new_async().await;
    let gemini = mock_gemini(&mut server, TWO_INGREDIENTS, 0).await;

    let mut config = test_config(&server);
    config.spoonacular.api_key = Some("  ".to_string());
    let pipeline = NutritionPipeline::from_config(&config).unwrap();

    let state = pipeline.estimate(&EstimateRequest::new("Pollo", "1 cebolla")).await;

    assert!(matches!(state, EstimateState::ParserError(_)));
    gemini.assert_async().await;
}

#[tokio::test]
async fn test_quota_error_surfaces_status() {
    let mut server = Server::new_async().await;
    let _gemini = mock_gemini(&mut server, TWO_INGREDIENTS, 1).await;
    let long_body = format!(
        r#"{{"status": "failure", "code": 402, "message": "Your daily points limit of 150 has been reached. {}"}}"#,
        "x".repeat(300)
    );
    let _analyze = mock_analyze(&mut server, 402, &long_body, 1).await;

    let pipeline = NutritionPipeline::from_config(&test_config(&server)).unwrap();
    let request = EstimateRequest::new("Pollo", "1 cebolla");

    match pipeline.estimate_summary(&request).await {
        Err(NutritionError::NutritionApi { status, message }) => {
            assert_eq!(status, Some(402));
            assert!(message.chars().count() <= 150);
            assert!(message.contains("daily points limit"));
        }
        other => panic!("Expected nutrition API error, got {:?}", other),
    }
    assert!(matches!(
        pipeline.state(),
        EstimateState::NutritionApiError(ref message) if message.contains("(402)")
    ));
}

#[tokio::test]
async fn test_forbidden_is_not_retried() {
    let mut server = Server::new_async().await;
    let _gemini = mock_gemini(&mut server, TWO_INGREDIENTS, 1).await;
    let analyze = mock_analyze(&mut server, 403, r#"{"message": "invalid key"}"#, 1).await;

    let mut config = test_config(&server);
    config.retry.attempts = 3;
    let pipeline = NutritionPipeline::from_config(&config).unwrap();

    let result = pipeline
        .estimate_summary(&EstimateRequest::new("Pollo", "1 cebolla"))
        .await;

    assert_eq!(result.unwrap_err().status(), Some(403));
    analyze.assert_async().await;
}

#[tokio::test]
async fn test_server_error_is_retried_within_bound() {
    let mut server = Server::new_async().await;
    let _gemini = mock_gemini(&mut server, TWO_INGREDIENTS, 1).await;
    let analyze = mock_analyze(&mut server, 500, "internal error", 2).await;

    let mut config = test_config(&server);
    config.retry.attempts = 2;
    let pipeline = NutritionPipeline::from_config(&config).unwrap();

    let state = pipeline.estimate(&EstimateRequest::new("Pollo", "1 cebolla")).await;

    assert!(matches!(state, EstimateState::NutritionApiError(_)));
    analyze.assert_async().await;
}

#[tokio::test]
async fn test_empty_success_body_is_api_error() {
    let mut server = Server::new_async().await;
    let _gemini = mock_gemini(&mut server, TWO_INGREDIENTS, 1).await;
    let _analyze = mock_analyze(&mut server, 200, "", 1).await;

    let pipeline = NutritionPipeline::from_config(&test_config(&server)).unwrap();
    let result = pipeline
        .estimate_summary(&EstimateRequest::new("Pollo", "1 cebolla"))
        .await;

    match result {
        Err(NutritionError::NutritionApi { status, message }) => {
            assert_eq!(status, Some(200));
            assert!(message.contains("Empty response body"));
        }
        other => panic!("Expected nutrition API error, got {:?}", other),
    }
}

#[tokio::test]
async fn test_gemini_auth_failure_is_parser_error() {
    let mut server = Server::new_async().await;
    let gemini = server
        .mock("POST", Matcher::Regex(GEMINI_PATH.to_string()))
        .with_status(400)
        .with_header("content-type", "application/json")
        .with_body(
            json!({
                "error": {"code": 400, "message": "API key not valid.", "status": "INVALID_ARGUMENT"}
            })
            .to_string(),
        )
        .expect(1)
        .create_async()
        .await;
    let analyze = mock_analyze(&mut server, 200, CALORIES_ONLY, 0).await;

    let pipeline = NutritionPipeline::from_config(&test_config(&server)).unwrap();
    let result = pipeline
        .estimate_summary(&EstimateRequest::new("Pollo", "1 cebolla"))
        .await;

    match result {
        Err(NutritionError::ParseFailed { status, message }) => {
            assert_eq!(status, Some(400));
            assert_eq!(message, "API key not valid.");
        }
        other => panic!("Expected parse failure, got {:?}", other),
    }
    assert!(matches!(pipeline.state(), EstimateState::ParserError(_)));
    gemini.assert_async().await;
    analyze.assert_async().await;
}

#[tokio::test]
async fn test_gemini_request_uses_deterministic_sampling() {
    let mut server = Server::new_async().await;
    let gemini = server
        .mock("POST", Matcher::Regex(GEMINI_PATH.to_string()))
        .match_body(Matcher::PartialJson(json!({
            "generationConfig": {"temperature": 0.0, "topK": 1}
        })))
        .with_status(200)
        .with_header("content-type", "application/json")
        .with_body(gemini_reply(TWO_INGREDIENTS))
        .expect(1)
        .create_async()
        .await;
    let _analyze = mock_analyze(&mut server, 200, CALORIES_ONLY, 1).await;

    let pipeline = NutritionPipeline::from_config(&test_config(&server)).unwrap();
    let state = pipeline.estimate(&EstimateRequest::new("Pollo", "1 cebolla")).await;

    assert!(matches!(state, EstimateState::Success(_)));
    gemini.assert_async().await;
}
