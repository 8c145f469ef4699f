//! Grocery catalog API client.
//!
//! Wraps the backend's catalog endpoints:
//!
//! | Method | Path | Used by |
//! |--------|------|---------|
//! | `GET` | `{base}` | [`CatalogSource::fetch_all`] (no parameters) |
//! | `GET` | `{base}?type=&chain=&minPrice=&maxPrice=&search=&page=&limit=` | [`CatalogClient::fetch_page`] |
//! | `GET` | `{base}/id/{id}` | [`CatalogClient::fetch_by_id`] |
//! | `GET` | `{base}/{brand,type,name,chain}/{value}` | [`CatalogClient::lookup`] |
//!
//! Responses may be a bare array, an object wrapping the array, or a
//! single item; see [`CatalogPayload`]. Every item is validated before it
//! leaves this module. Any non-success status or network failure becomes
//! a [`FetchError`], and so does a body that contains no valid item where
//! items were expected (a lone object on a list endpoint, or a non-empty
//! list in which every entry is rejected).

use async_trait::async_trait;
use reqwest::{StatusCode, Url};
use std::time::Duration;

use grocer_core::models::{validate_items, CatalogPayload, GroceryItem};

use crate::config::ApiConfig;
use crate::error::FetchError;

/// Anything that can produce the full catalog. The session depends on this
/// rather than on [`CatalogClient`] so tests can substitute fakes.
#[async_trait]
pub trait CatalogSource: Send + Sync {
    async fn fetch_all(&self) -> Result<Vec<GroceryItem>, FetchError>;
}

/// Server-side query parameters. The engine never sends these; it fetches
/// everything and filters locally.
#[derive(Debug, Clone, Default)]
pub struct CatalogQuery {
    pub item_type: Option<String>,
    pub chain: Option<String>,
    pub min_price: Option<f64>,
    pub max_price: Option<f64>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl CatalogQuery {
    fn to_pairs(&self) -> Vec<(&'static str, String)> {
        let mut pairs = Vec::new();
        if let Some(ref t) = self.item_type {
            pairs.push(("type", t.clone()));
        }
        if let Some(ref c) = self.chain {
            pairs.push(("chain", c.clone()));
        }
        if let Some(p) = self.min_price {
            pairs.push(("minPrice", p.to_string()));
        }
        if let Some(p) = self.max_price {
            pairs.push(("maxPrice", p.to_string()));
        }
        if let Some(ref s) = self.search {
            pairs.push(("search", s.clone()));
        }
        if let Some(p) = self.page {
            pairs.push(("page", p.to_string()));
        }
        if let Some(l) = self.limit {
            pairs.push(("limit", l.to_string()));
        }
        pairs
    }
}

/// One page of a server-side query.
#[derive(Debug, Clone)]
pub struct CatalogPage {
    pub items: Vec<GroceryItem>,
    /// Backend-reported total, or the item count when not reported.
    pub total: usize,
}

/// Lookup endpoints keyed by a single attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Lookup {
    Brand,
    Type,
    Name,
    Chain,
}

impl Lookup {
    fn segment(self) -> &'static str {
        match self {
            Lookup::Brand => "brand",
            Lookup::Type => "type",
            Lookup::Name => "name",
            Lookup::Chain => "chain",
        }
    }
}

/// HTTP client for the grocery catalog API.
pub struct CatalogClient {
    http: reqwest::Client,
    base_url: Url,
}

impl CatalogClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, FetchError> {
        let base_url =
            Url::parse(base_url).map_err(|_| FetchError::InvalidUrl(base_url.to_string()))?;
        if base_url.cannot_be_a_base() {
            return Err(FetchError::InvalidUrl(base_url.to_string()));
        }
        let http = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Network {
                url: base_url.to_string(),
                source: e,
            })?;
        Ok(Self { http, base_url })
    }

    pub fn from_config(config: &ApiConfig) -> Result<Self, FetchError> {
        Self::new(&config.base_url, Duration::from_secs(config.timeout_secs))
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// `{base}/{segments...}` with each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, FetchError> {
        let mut url = self.base_url.clone();
        {
            let mut path = url
                .path_segments_mut()
                .map_err(|_| FetchError::InvalidUrl(self.base_url.to_string()))?;
            path.pop_if_empty();
            for s in segments {
                path.push(s);
            }
        }
        Ok(url)
    }

    async fn get_payload(
        &self,
        url: Url,
        query: &[(&'static str, String)],
    ) -> Result<CatalogPayload, FetchError> {
        tracing::debug!(%url, "GET catalog");
        let response = self
            .http
            .get(url.clone())
            .query(query)
            .send()
            .await
            .map_err(|e| FetchError::Network {
                url: url.to_string(),
                source: e,
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            if status == StatusCode::NOT_FOUND {
                return Err(FetchError::NotFound(url.to_string()));
            }
            return Err(FetchError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await.map_err(|e| FetchError::Network {
            url: url.to_string(),
            source: e,
        })?;
        serde_json::from_str(&body).map_err(|e| FetchError::Decode(e.to_string()))
    }

    /// Issue a server-side filtered/paginated query.
    pub async fn fetch_page(&self, query: &CatalogQuery) -> Result<CatalogPage, FetchError> {
        let payload = self
            .get_payload(self.base_url.clone(), &query.to_pairs())
            .await?;
        let total = payload.total();
        Ok(CatalogPage {
            items: payload_items(payload, false)?,
            total,
        })
    }

    /// Fetch a single item by id.
    pub async fn fetch_by_id(&self, id: &str) -> Result<GroceryItem, FetchError> {
        let url = self.endpoint(&["id", id])?;
        let payload = self.get_payload(url, &[]).await?;
        payload_items(payload, true)?
            .into_iter()
            .next()
            .ok_or_else(|| FetchError::NotFound(id.to_string()))
    }

    /// Fetch items matching one attribute.
    pub async fn lookup(&self, by: Lookup, value: &str) -> Result<Vec<GroceryItem>, FetchError> {
        let url = self.endpoint(&[by.segment(), value])?;
        let payload = self.get_payload(url, &[]).await?;
        payload_items(payload, true)
    }
}

/// Validate a decoded body. `allow_single` is true only for the lookup
/// endpoints, which may answer with one bare item.
fn payload_items(payload: CatalogPayload, allow_single: bool) -> Result<Vec<GroceryItem>, FetchError> {
    if !allow_single && matches!(payload, CatalogPayload::Single(_)) {
        return Err(FetchError::Decode(
            "expected a list of grocery items, got a single object".to_string(),
        ));
    }
    let raw = payload.into_raw();
    let received = raw.len();
    let items = validate_items(raw);
    if received > 0 && items.is_empty() {
        return Err(FetchError::Decode(format!(
            "none of the {} catalog entries is a valid grocery item",
            received
        )));
    }
    Ok(items)
}

#[async_trait]
impl CatalogSource for CatalogClient {
    async fn fetch_all(&self) -> Result<Vec<GroceryItem>, FetchError> {
        let payload = self.get_payload(self.base_url.clone(), &[]).await?;
        let items = payload_items(payload, false)?;
        tracing::info!(items = items.len(), "fetched grocery catalog");
        Ok(items)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(base: &str) -> CatalogClient {
        CatalogClient::new(base, Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_endpoint_appends_segments() {
        let c = client("http://localhost:8000/api/v1/grocery");
        let url = c.endpoint(&["id", "42"]).unwrap();
        assert_eq!(url.as_str(), "http://localhost:8000/api/v1/grocery/id/42");
    }

    #[test]
    fn test_endpoint_trailing_slash_and_encoding() {
        let c = client("http://localhost:8000/api/v1/grocery/");
        let url = c.endpoint(&["name", "oat milk"]).unwrap();
        assert_eq!(
            url.as_str(),
            "http://localhost:8000/api/v1/grocery/name/oat%20milk"
        );
    }

    #[test]
    fn test_invalid_base_url() {
        assert!(matches!(
            CatalogClient::new("not a url", Duration::from_secs(1)),
            Err(FetchError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_query_pairs() {
        let q = CatalogQuery {
            item_type: Some("Dairy".into()),
            min_price: Some(1.5),
            page: Some(2),
            limit: Some(12),
            ..Default::default()
        };
        let pairs = q.to_pairs();
        assert_eq!(
            pairs,
            vec![
                ("type", "Dairy".to_string()),
                ("minPrice", "1.5".to_string()),
                ("page", "2".to_string()),
                ("limit", "12".to_string()),
            ]
        );
        assert!(CatalogQuery::default().to_pairs().is_empty());
    }

    fn decode(body: &str) -> CatalogPayload {
        serde_json::from_str(body).unwrap()
    }

    #[test]
    fn test_stray_object_is_not_a_catalog() {
        let err = payload_items(decode(r#"{"detail":"Not authenticated"}"#), false).unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)), "got {:?}", err);

        let err = payload_items(decode(r#"{"results":[{"id":1,"name":"Milk"}]}"#), false)
            .unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)), "got {:?}", err);

        // Lookups accept a single object, but only a valid one.
        let err = payload_items(decode(r#"{"detail":"Not found"}"#), true).unwrap_err();
        assert!(matches!(err, FetchError::Decode(_)), "got {:?}", err);
        let items = payload_items(decode(r#"{"id":1,"name":"Milk"}"#), true).unwrap();
        assert_eq!(items.len(), 1);
    }

    #[test]
    fn test_empty_list_is_an_empty_catalog() {
        assert!(payload_items(decode("[]"), false).unwrap().is_empty());
        let items = payload_items(decode(r#"{"items":[],"total":0}"#), false).unwrap();
        assert!(items.is_empty());
    }
}
