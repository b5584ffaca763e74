use crate::models::{Coordinate, ShopDetail, ShopRecord};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use thiserror::Error;

/// Errors that can occur when talking to the shop catalog API
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("HTTP request failed: {0}")]
    RequestError(#[from] reqwest::Error),

    #[error("API returned error: {0}")]
    ApiError(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Invalid response format: {0}")]
    InvalidResponse(String),
}

/// Parameters for a nearby search against the catalog
#[derive(Debug, Clone)]
pub struct NearbyQuery {
    /// Required by the catalog's nearby endpoint
    pub food_type: String,
    pub origin: Coordinate,
    pub radius_km: f64,
}

/// Client for the upstream shop catalog
///
/// The catalog owns shop data; this client only fetches it:
/// - nearby search by food type and location
/// - single shop details
pub struct CatalogClient {
    base_url: String,
    client: Client,
}

impl CatalogClient {
    pub fn new(base_url: String, timeout: Duration) -> Result<Self, CatalogError> {
        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            base_url,
            client,
        })
    }

    fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    /// Search shops around a location
    ///
    /// Records that fail to parse or carry unusable coordinates are dropped
    /// rather than failing the whole listing. Everything else is kept in
    /// upstream order; the ranker applies the limit after sorting.
    pub async fn search_nearby(&self, query: &NearbyQuery) -> Result<Vec<ShopRecord>, CatalogError> {
        let url = self.endpoint("/api/nearby");
        // Upstream takes the radius in metres
        let radius_m = (query.radius_km * 1000.0).round().max(1.0) as u64;

        let params = [
            ("food_type", query.food_type.clone()),
            ("lat", query.origin.latitude.to_string()),
            ("lng", query.origin.longitude.to_string()),
            ("radius", radius_m.to_string()),
        ];

        tracing::debug!("Searching catalog: {} {:?}", url, params);

        let response = self.client.get(&url).query(&params).send().await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_else(|_| "Unable to read body".to_string());
            return Err(CatalogError::ApiError(format!(
                "Nearby search failed: {} - {}",
                status, body
            )));
        }

        let json: Value = response.json().await?;

        let documents = match json {
            Value::Array(items) => items,
            Value::Object(mut obj) => match obj.remove("shops") {
                Some(Value::Array(items)) => items,
                _ => {
                    return Err(CatalogError::InvalidResponse(
                        "Missing shops array".into(),
                    ))
                }
            },
            _ => return Err(CatalogError::InvalidResponse("Expected a JSON array".into())),
        };

        let total = documents.len();
        let shops: Vec<ShopRecord> = documents
            .into_iter()
            .filter_map(|doc| match serde_json::from_value::<ShopRecord>(doc) {
                Ok(shop) => Some(shop),
                Err(e) => {
                    tracing::warn!("Dropping unparseable shop record: {}", e);
                    None
                }
            })
            .filter(|shop| match shop.coordinate.validate() {
                Ok(()) => true,
                Err(e) => {
                    tracing::warn!("Dropping shop {} with bad coordinate: {}", shop.id, e);
                    false
                }
            })
            .collect();

        tracing::debug!("Catalog returned {} usable shops (of {})", shops.len(), total);

        Ok(shops)
    }

    /// Fetch a single shop's details
    pub async fn get_shop(&self, place_id: &str) -> Result<ShopDetail, CatalogError> {
        let url = self.endpoint(&format!("/api/shops/{}", urlencoding::encode(place_id)));

        tracing::debug!("Fetching shop detail: {}", url);

        let response = self.client.get(&url).send().await?;

        match response.status() {
            StatusCode::NOT_FOUND => {
                return Err(CatalogError::NotFound(format!("Shop {} not found", place_id)))
            }
            status if !status.is_success() => {
                return Err(CatalogError::ApiError(format!(
                    "Failed to fetch shop: {}",
                    status
                )))
            }
            _ => {}
        }

        let json: Value = response.json().await?;

        serde_json::from_value(json)
            .map_err(|e| CatalogError::InvalidResponse(format!("Failed to parse shop: {}", e)))
    }
}
