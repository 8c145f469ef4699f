//! Errors surfaced to the user.
//!
//! Neither error is retried automatically; the user re-runs the action.

use thiserror::Error;

/// Catalog retrieval failed and no usable cache exists.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("could not reach the grocery API at {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("grocery API returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("grocery API sent an unreadable response: {0}")]
    Decode(String),
    #[error("item not found: {0}")]
    NotFound(String),
    #[error("invalid grocery API URL '{0}'")]
    InvalidUrl(String),
}

impl FetchError {
    /// Message shown in place of the item list.
    pub fn user_message(&self) -> String {
        format!("Failed to load grocery items. Please try again later. ({})", self)
    }
}

/// Recipe generation failed.
#[derive(Debug, Error)]
pub enum RequestError {
    #[error("could not reach the recipe service at {url}: {source}")]
    Network {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("recipe service returned {status}: {body}")]
    Status { status: u16, body: String },
    #[error("recipe service sent an unreadable response: {0}")]
    Decode(String),
    #[error("invalid recipe service URL '{0}'")]
    InvalidUrl(String),
    #[error("select grocery items to generate recipe suggestions")]
    EmptySelection,
}

impl RequestError {
    /// Message shown in the recipe panel.
    pub fn user_message(&self) -> String {
        format!("Failed to generate recipe. Please try again. ({})", self)
    }
}
