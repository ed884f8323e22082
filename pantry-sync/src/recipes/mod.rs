//! Recipe generation
//!
//! 文本生成器是黑盒：`generate(prompt) -> text | error`，不重试，不缓存。
//! 失败和空结果在这里被映射为用户可见的文本。

pub mod gemini;
pub mod prompt;

pub use gemini::GeminiGenerator;

use std::sync::Arc;

use async_trait::async_trait;
use shared::error::{AppError, ErrorCode};
use shared::models::Recipe;
use thiserror::Error;

use crate::repository::{CollectionRepository, RepoError};

pub const RECIPE_FALLBACK: &str = "Could not generate recipe.";
pub const RECOMMENDATION_FALLBACK: &str = "No recommendation available.";

#[derive(Debug, Clone, Error)]
pub enum GenerateError {
    #[error("{0}")]
    Request(String),

    #[error("Unexpected response: {0}")]
    Response(String),

    #[error("Text generator is not configured")]
    NotConfigured,
}

impl From<GenerateError> for AppError {
    fn from(err: GenerateError) -> Self {
        match err {
            GenerateError::NotConfigured => AppError::new(ErrorCode::GeneratorNotConfigured),
            GenerateError::Request(msg) => AppError::with_message(ErrorCode::NetworkError, msg),
            other => AppError::with_message(ErrorCode::GenerationFailed, other.to_string()),
        }
    }
}

/// Black-box text generator
#[async_trait]
pub trait TextGenerator: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, GenerateError>;
}

/// Used when no API key is configured
#[derive(Debug, Default, Clone, Copy)]
pub struct DisabledGenerator;

#[async_trait]
impl TextGenerator for DisabledGenerator {
    async fn generate(&self, _prompt: &str) -> Result<String, GenerateError> {
        Err(GenerateError::NotConfigured)
    }
}

/// Recipe prompts on top of a [`TextGenerator`]
#[derive(Clone)]
pub struct RecipeService {
    generator: Arc<dyn TextGenerator>,
}

impl RecipeService {
    pub fn new(generator: Arc<dyn TextGenerator>) -> Self {
        Self { generator }
    }

    /// Full recipe text for a dish; never fails
    pub async fn generate_full_recipe(&self, dish: &str) -> String {
        self.complete(&prompt::full_recipe(dish), RECIPE_FALLBACK).await
    }

    /// One dish suggestion from what is in the pantry; never fails
    pub async fn recommend_recipe<S: AsRef<str>>(&self, ingredients: &[S]) -> String {
        let names: Vec<&str> = ingredients.iter().map(|s| s.as_ref()).collect();
        tracing::debug!(?names, "Requesting recipe recommendation");
        self.complete(&prompt::recommendation(&names), RECOMMENDATION_FALLBACK).await
    }

    /// Generate a recipe for `dish` and store it.
    ///
    /// Whatever text came back (including an error text) is saved as the content.
    pub async fn save_generated_recipe(
        &self,
        recipes: &CollectionRepository<Recipe>,
        dish: &str,
    ) -> Result<Recipe, RepoError> {
        let dish = dish.trim();
        if dish.is_empty() {
            return Err(RepoError::Validation("dish name must not be empty".to_string()));
        }
        let content = self.generate_full_recipe(dish).await;
        let recipe = Recipe::new(dish, content);
        recipes.upsert(&recipe).await?;
        tracing::info!(id = %recipe.id, dish = %dish, "Recipe saved");
        Ok(recipe)
    }

    async fn complete(&self, prompt: &str, fallback: &str) -> String {
        match self.generator.generate(prompt).await {
            Ok(text) if text.trim().is_empty() => fallback.to_string(),
            Ok(text) => text,
            Err(e) => {
                tracing::error!(error = %e, "Text generation failed");
                format!("Network Error: {}", e)
            }
        }
    }
}
