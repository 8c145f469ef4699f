//! Recipe generation service client.
//!
//! Sends the selected items to `POST {llm_base_url}/generate-recipe` as
//! `{ "groceryItems": [...] }` and unwraps the `{ "recipe": {...} }`
//! response. The service is LLM-backed and may be slow, so the timeout is
//! the same generous `api.timeout_secs` used for the catalog.

use async_trait::async_trait;
use reqwest::Url;
use serde::{Deserialize, Serialize};
use std::time::Duration;

use grocer_core::models::{GroceryItem, Recipe};

use crate::config::ApiConfig;
use crate::error::RequestError;

/// Anything that can turn a selection into a recipe.
#[async_trait]
pub trait RecipeSource: Send + Sync {
    /// The caller guarantees `items` is non-empty.
    async fn generate(&self, items: &[GroceryItem]) -> Result<Recipe, RequestError>;
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct GenerateRequest<'a> {
    grocery_items: &'a [GroceryItem],
}

#[derive(Deserialize)]
struct GenerateResponse {
    recipe: Recipe,
}

/// HTTP client for the recipe service.
pub struct RecipeClient {
    http: reqwest::Client,
    endpoint: Url,
}

impl RecipeClient {
    pub fn new(llm_base_url: &str, timeout: Duration) -> Result<Self, RequestError> {
        let endpoint = generate_endpoint(llm_base_url)?;
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| RequestError::Network {
                url: endpoint.to_string(),
                source: e,
            })?;
        Ok(Self { http, endpoint })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self, RequestError> {
        Self::new(
            &config.llm_base_url,
            Duration::from_secs(config.timeout_secs),
        )
    }

    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }
}

fn generate_endpoint(llm_base_url: &str) -> Result<Url, RequestError> {
    let mut url =
        Url::parse(llm_base_url).map_err(|_| RequestError::InvalidUrl(llm_base_url.to_string()))?;
    url.path_segments_mut()
        .map_err(|_| RequestError::InvalidUrl(llm_base_url.to_string()))?
        .pop_if_empty()
        .push("generate-recipe");
    Ok(url)
}

#[async_trait]
impl RecipeSource for RecipeClient {
    async fn generate(&self, items: &[GroceryItem]) -> Result<Recipe, RequestError> {
        tracing::debug!(url = %self.endpoint, items = items.len(), "POST generate-recipe");
        let response = self
            .http
            .post(self.endpoint.clone())
            .json(&GenerateRequest {
                grocery_items: items,
            })
            .send()
            .await
            .map_err(|e| RequestError::Network {
                url: self.endpoint.to_string(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(RequestError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await.map_err(|e| RequestError::Network {
            url: self.endpoint.to_string(),
            source: e,
        })?;
        let parsed: GenerateResponse =
            serde_json::from_str(&body).map_err(|e| RequestError::Decode(e.to_string()))?;
        tracing::info!(title = %parsed.recipe.title, "recipe generated");
        Ok(parsed.recipe)
    }
}
