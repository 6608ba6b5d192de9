//! Orchestrates one nutrition estimate: parse → repair → deserialize →
//! format → lookup → summarize, publishing progress as an [`EstimateState`].

use crate::config::{NutritionConfig, RetryConfig};
use crate::error::NutritionError;
use crate::ingredients::{format_queries, parse_ingredients};
use crate::json_repair::extract_json;
use crate::model::{EstimateRequest, NutritionQuery, UiNutritionSummary};
use crate::nutrition::{NutritionLookup, SpoonacularClient};
use crate::providers::{GeminiParser, IngredientParser};
use crate::retry::with_retry;
use crate::summary::summarize;
use log::{debug, info, warn};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::watch;

const UNTITLED_RECIPE: &str = "Untitled Recipe";

/// Observable state of a pipeline.
///
/// `Idle → LoadingParser → LoadingNutritionApi → Success | ParserError | NutritionApiError`.
/// A new estimate from any terminal state starts again at `LoadingParser`.
#[derive(Debug, Clone, PartialEq)]
pub enum EstimateState {
    Idle,
    LoadingParser,
    LoadingNutritionApi,
    Success(UiNutritionSummary),
    ParserError(String),
    NutritionApiError(String),
}

impl EstimateState {
    pub fn is_loading(&self) -> bool {
        matches!(
            self,
            EstimateState::LoadingParser | EstimateState::LoadingNutritionApi
        )
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            EstimateState::Success(_)
                | EstimateState::ParserError(_)
                | EstimateState::NutritionApiError(_)
        )
    }

    fn from_error(error: &NutritionError) -> Self {
        if error.is_parser_error() {
            EstimateState::ParserError(format!("Could not parse ingredients: {}", error))
        } else {
            EstimateState::NutritionApiError(format!("Nutrition service failed: {}", error))
        }
    }
}

/// Holds the state for one detail view. Instances share nothing, so several
/// pipelines can run side by side.
pub struct NutritionPipeline {
    parser: Arc<dyn IngredientParser>,
    lookup: Arc<dyn NutritionLookup>,
    retry: RetryConfig,
    default_servings: Option<u32>,
    state: watch::Sender<EstimateState>,
    generation: AtomicU64,
}

impl NutritionPipeline {
    pub fn new(parser: Arc<dyn IngredientParser>, lookup: Arc<dyn NutritionLookup>) -> Self {
        let (state, _) = watch::channel(EstimateState::Idle);
        Self {
            parser,
            lookup,
            retry: RetryConfig::default(),
            default_servings: None,
            state,
            generation: AtomicU64::new(0),
        }
    }

    /// Build a Gemini + Spoonacular pipeline from configuration.
    ///
    /// Missing API keys do not fail construction; every estimate then ends in
    /// `ParserError` without touching the network.
    pub fn from_config(config: &NutritionConfig) -> Result<Self, NutritionError> {
        let timeout = Duration::from_secs(config.timeout);

        let parser = match GeminiParser::new(&config.gemini, timeout) {
            Err(NutritionError::MissingCredential(_)) => {
                GeminiParser::with_api_key("", &config.gemini, timeout)?
            }
            other => other?,
        };
        let lookup = match SpoonacularClient::new(&config.spoonacular, timeout) {
            Err(NutritionError::MissingCredential(_)) => {
                SpoonacularClient::with_api_key("", &config.spoonacular, timeout)?
            }
            other => other?,
        };

        let mut pipeline = Self::new(Arc::new(parser), Arc::new(lookup))
            .with_retry(config.retry.clone());
        pipeline.default_servings = config.spoonacular.servings;
        Ok(pipeline)
    }

    pub fn with_retry(mut self, retry: RetryConfig) -> Self {
        self.retry = retry;
        self
    }

    /// Current state
    pub fn state(&self) -> EstimateState {
        self.state.borrow().clone()
    }

    /// Receive every state change, intermediate loading states included
    pub fn subscribe(&self) -> watch::Receiver<EstimateState> {
        self.state.subscribe()
    }

    /// Return to `Idle`. A run still in flight is abandoned and its result
    /// will not be published.
    pub fn reset(&self) {
        let run = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        self.publish(run, EstimateState::Idle);
    }

    /// Run the full pipeline once and return the terminal state it reached.
    ///
    /// If another `estimate` or `reset` starts before this one finishes, the
    /// returned state is still this run's outcome, but it is not published.
    /// Dropping the future mid-run publishes `Idle`.
    pub async fn estimate(&self, request: &EstimateRequest) -> EstimateState {
        match self.estimate_summary(request).await {
            Ok(summary) => EstimateState::Success(summary),
            Err(e) => EstimateState::from_error(&e),
        }
    }

    /// Same as [`estimate`](Self::estimate), but hands back the summary or
    /// the error that ended the run.
    pub async fn estimate_summary(
        &self,
        request: &EstimateRequest,
    ) -> Result<UiNutritionSummary, NutritionError> {
        let run = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        let mut guard = RunGuard {
            pipeline: self,
            run,
            finished: false,
        };

        let outcome = match self.check_preconditions(request) {
            Err(e) => Err(e),
            Ok(()) => {
                info!(
                    "Estimating nutrition for '{}' with {} and {}",
                    request.title,
                    self.parser.provider_name(),
                    self.lookup.service_name()
                );
                self.run(run, request).await
            }
        };

        let state = match &outcome {
            Ok(summary) => EstimateState::Success(summary.clone()),
            Err(e) => {
                warn!("Nutrition estimate failed: {}", e);
                EstimateState::from_error(e)
            }
        };

        guard.finished = true;
        if !self.publish(run, state) {
            debug!("Discarding result of superseded run {}", run);
        }
        outcome
    }

    fn check_preconditions(&self, request: &EstimateRequest) -> Result<(), NutritionError> {
        if request.ingredients.trim().is_empty() {
            return Err(NutritionError::EmptyInput);
        }
        if !self.parser.is_configured() {
            return Err(NutritionError::MissingCredential(
                self.parser.provider_name().to_string(),
            ));
        }
        if !self.lookup.is_configured() {
            return Err(NutritionError::MissingCredential(
                self.lookup.service_name().to_string(),
            ));
        }
        Ok(())
    }

    async fn run(
        &self,
        run: u64,
        request: &EstimateRequest,
    ) -> Result<UiNutritionSummary, NutritionError> {
        self.publish(run, EstimateState::LoadingParser);

        let raw = with_retry(&self.retry, self.parser.provider_name(), || {
            self.parser.parse(&request.ingredients)
        })
        .await?;
        let json = extract_json(&raw)?;
        let ingredients = parse_ingredients(&json)?;
        let lines = format_queries(&ingredients)?;

        self.publish(run, EstimateState::LoadingNutritionApi);

        let title = match request.title.trim() {
            "" => UNTITLED_RECIPE.to_string(),
            title => title.to_string(),
        };
        let query = NutritionQuery {
            title,
            ingredients: lines,
            servings: request.servings.or(self.default_servings),
        };

        let response = with_retry(&self.retry, self.lookup.service_name(), || {
            self.lookup.analyze(&query)
        })
        .await?;

        Ok(summarize(&response, ingredients.len()))
    }

    /// Publish `state` if `run` is still the latest run. The generation check
    /// happens under the channel's write lock.
    fn publish(&self, run: u64, state: EstimateState) -> bool {
        self.state.send_if_modified(|current| {
            if self.generation.load(Ordering::SeqCst) != run {
                return false;
            }
            *current = state;
            true
        })
    }
}

/// Publishes `Idle` when a run is dropped before reaching a terminal state.
struct RunGuard<'a> {
    pipeline: &'a NutritionPipeline,
    run: u64,
    finished: bool,
}

impl Drop for RunGuard<'_> {
    fn drop(&mut self) {
        if !self.finished && self.pipeline.publish(self.run, EstimateState::Idle) {
            debug!("Run {} cancelled, back to idle", self.run);
        }
    }
}
