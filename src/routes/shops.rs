use actix_web::{web, HttpResponse, Responder};
use chrono::{DateTime, FixedOffset, Utc};
use validator::Validate;
use crate::core::{hours, RankQuery, ShopRanker};
use crate::models::{
    Coordinate, ErrorResponse, HealthResponse, NearbyShopsRequest, NearbyShopsResponse, ShopHoursQuery,
    ShopHoursResponse, ShopRecord,
};
use crate::services::{CacheKey, CatalogClient, CatalogError, NearbyQuery, ShopCache};
use std::sync::Arc;

/// Application state shared across all handlers
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<CatalogClient>,
    pub cache: Arc<ShopCache>,
    pub ranker: ShopRanker,
    /// Wall clock the shops' hours are expressed in
    pub utc_offset: FixedOffset,
    /// Catalog search radius when the request names none
    pub default_radius_km: f64,
}

impl AppState {
    /// Reference instant in the shops' local time
    pub fn reference_time(&self, requested: Option<DateTime<FixedOffset>>) -> DateTime<FixedOffset> {
        match requested {
            Some(at) => at.with_timezone(&self.utc_offset),
            None => Utc::now().with_timezone(&self.utc_offset),
        }
    }
}

/// Configure all shop-related routes
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg
        .route("/health", web::get().to(health_check))
        .route("/shops/nearby", web::post().to(nearby_shops))
        .route("/shops/{place_id}/hours", web::get().to(shop_hours));
}

/// Health check endpoint
async fn health_check(state: web::Data<AppState>) -> impl Responder {
    tracing::debug!("Health check, {} cached searches", state.cache.stats().entries);

    HttpResponse::Ok().json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        timestamp: Utc::now(),
    })
}

/// Nearby shops endpoint
///
/// POST /api/v1/shops/nearby
///
/// Request body:
/// ```json
/// {
///   "latitude": 34.6937,
///   "longitude": 135.5023,
///   "foodType": "たこ焼き",
///   "radiusKm": 1.0,
///   "limit": 20,
///   "openNow": false,
///   "at": "2024-06-03T12:00:00+09:00",
///   "shops": [ ... ]
/// }
/// ```
///
/// Without `shops` the catalog is searched around the given location, and
/// `foodType` is then required.
async fn nearby_shops(
    state: web::Data<AppState>,
    req: web::Json<NearbyShopsRequest>,
) -> impl Responder {
    if let Err(errors) = req.validate() {
        tracing::info!("Validation failed for nearby request: {:?}", errors);
        return HttpResponse::BadRequest().json(ErrorResponse::new(
            "Validation failed",
            errors.to_string(),
            400,
        ));
    }

    let req = req.into_inner();

    let origin = match Coordinate::new(req.latitude, req.longitude) {
        Ok(origin) => origin,
        Err(e) => {
            return HttpResponse::BadRequest().json(ErrorResponse::new("Invalid location", e.to_string(), 400));
        }
    };

    let reference_time = state.reference_time(req.at);
    let query = RankQuery {
        food_type: req.food_type,
        max_distance_km: req.radius_km,
        open_now: req.open_now,
        limit: req.limit.map(usize::from),
    };

    tracing::info!(
        "Ranking shops near ({}, {}), food type: {:?}, at {}",
        origin.latitude,
        origin.longitude,
        query.food_type,
        reference_time
    );

    let candidates = match (req.shops, query.food_type.as_deref()) {
        (Some(shops), _) => shops,
        (None, Some(food_type)) => {
            let radius_km = req.radius_km.unwrap_or(state.default_radius_km);
            match fetch_candidates(&state, food_type, origin, radius_km).await {
                Ok(shops) => shops,
                Err(e) => {
                    tracing::error!("Catalog search failed: {}", e);
                    return catalog_error_response("Failed to search shops", &e);
                }
            }
        }
        // Rejected by validation above
        (None, None) => {
            return HttpResponse::BadRequest().json(ErrorResponse::new(
                "Validation failed",
                "foodType is required when shops are not supplied",
                400,
            ));
        }
    };

    let result = match state
        .ranker
        .rank(origin, candidates, reference_time.naive_local(), &query)
    {
        Ok(result) => result,
        Err(e) => {
            tracing::info!("Rejected shop list: {}", e);
            return HttpResponse::BadRequest().json(ErrorResponse::new("Invalid shop coordinate", e.to_string(), 400));
        }
    };

    tracing::info!(
        "Returning {} shops (from {} candidates)",
        result.shops.len(),
        result.total_candidates
    );

    HttpResponse::Ok().json(NearbyShopsResponse {
        shops: result.shops,
        total_candidates: result.total_candidates,
        reference_time,
    })
}

/// Shop hours endpoint
///
/// GET /api/v1/shops/{place_id}/hours?at=2024-06-03T12:00:00%2B09:00
async fn shop_hours(
    state: web::Data<AppState>,
    path: web::Path<String>,
    query: web::Query<ShopHoursQuery>,
) -> impl Responder {
    let place_id = path.into_inner();

    let detail = match state.catalog.get_shop(&place_id).await {
        Ok(detail) => detail,
        Err(e) => {
            tracing::error!("Failed to fetch shop {}: {}", place_id, e);
            return catalog_error_response("Failed to fetch shop", &e);
        }
    };

    let at = state.reference_time(query.at).naive_local();
    let schedule = detail.hours.schedule();

    HttpResponse::Ok().json(ShopHoursResponse {
        place_id: detail.id.clone(),
        name: detail.name.clone(),
        today: hours::format_today(schedule, at),
        week: hours::week_hours(schedule, at),
    })
}

async fn fetch_candidates(
    state: &AppState,
    food_type: &str,
    origin: Coordinate,
    radius_km: f64,
) -> Result<Vec<ShopRecord>, CatalogError> {
    let key = CacheKey::nearby(food_type, origin, radius_km);

    if let Some(cached) = state.cache.get(&key).await {
        tracing::debug!("Using {} cached shops for {}", cached.len(), key);
        return Ok(cached.as_ref().clone());
    }

    let shops = state
        .catalog
        .search_nearby(&NearbyQuery {
            food_type: food_type.to_string(),
            origin,
            radius_km,
        })
        .await?;

    let shops = state.cache.insert(key, shops).await;
    Ok(shops.as_ref().clone())
}

fn catalog_error_response(context: &str, error: &CatalogError) -> HttpResponse {
    match error {
        CatalogError::NotFound(message) => {
            HttpResponse::NotFound().json(ErrorResponse::new(context, message.clone(), 404))
        }
        other => HttpResponse::BadGateway().json(ErrorResponse::new(context, other.to_string(), 502)),
    }
}
