use crate::models::domain::ShopRecord;
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

/// Request to rank shops around the caller
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
#[validate(schema(function = "validate_shop_source"))]
pub struct NearbyShopsRequest {
    #[validate(range(min = -90.0, max = 90.0))]
    pub latitude: f64,
    #[validate(range(min = -180.0, max = 180.0))]
    pub longitude: f64,
    #[validate(length(min = 1))]
    #[serde(default, alias = "food_type", rename = "foodType")]
    pub food_type: Option<String>,
    #[validate(range(min = 0.0, max = 100.0))]
    #[serde(default, alias = "radius_km", rename = "radiusKm")]
    pub radius_km: Option<f64>,
    #[validate(range(min = 1, max = 100))]
    #[serde(default)]
    pub limit: Option<u16>,
    #[serde(default, alias = "open_now", rename = "openNow")]
    pub open_now: bool,
    /// Reference instant; defaults to now in the configured offset
    #[serde(default)]
    pub at: Option<DateTime<FixedOffset>>,
    /// Shops supplied by the caller instead of querying the catalog
    #[serde(default)]
    pub shops: Option<Vec<ShopRecord>>,
}

/// The catalog search needs a food type; inline shops do not
fn validate_shop_source(req: &NearbyShopsRequest) -> Result<(), ValidationError> {
    if req.shops.is_none() && req.food_type.is_none() {
        let mut error = ValidationError::new("food_type_required");
        error.message = Some("foodType is required when shops are not supplied".into());
        return Err(error);
    }
    Ok(())
}

/// Query string for the shop hours endpoint
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ShopHoursQuery {
    #[serde(default)]
    pub at: Option<DateTime<FixedOffset>>,
}
