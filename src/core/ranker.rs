use crate::core::{
    distance::{calculate_bounding_box, display_distance, distance_km, is_within_bounding_box, GeoError},
    hours::{format_today, is_open_at},
};
use crate::models::{Coordinate, RankedShop, ShopRecord};
use chrono::NaiveDateTime;
use std::cmp::Ordering;

/// Annotate shops with distance and today's hours, nearest first
///
/// `filter` runs before any distance work. Shops at equal distance keep
/// their input order, since upstream order may already encode relevance.
pub fn rank_by_distance(
    origin: Coordinate,
    shops: Vec<ShopRecord>,
    at: NaiveDateTime,
    filter: Option<&dyn Fn(&ShopRecord) -> bool>,
) -> Result<Vec<RankedShop>, GeoError> {
    origin.validate()?;

    let mut ranked = shops
        .into_iter()
        .filter(|shop| filter.map_or(true, |keep| keep(shop)))
        .map(|shop| annotate(origin, shop, at))
        .collect::<Result<Vec<_>, _>>()?;

    // sort_by is stable
    ranked.sort_by(|a, b| {
        a.distance_km
            .partial_cmp(&b.distance_km)
            .unwrap_or(Ordering::Equal)
    });

    Ok(ranked)
}

/// Keys [`RankedShop`] writes itself; upstream copies would serialize twice
const ANNOTATION_KEYS: [&str; 4] = ["distanceKm", "displayDistance", "displayOpeningHours", "isOpenNow"];

fn annotate(origin: Coordinate, mut shop: ShopRecord, at: NaiveDateTime) -> Result<RankedShop, GeoError> {
    let distance = distance_km(origin, shop.coordinate)?;
    for key in ANNOTATION_KEYS {
        shop.extra.remove(key);
    }

    let display_opening_hours = format_today(shop.hours.schedule(), at);
    let is_open_now = shop.hours.periods().and_then(|periods| is_open_at(periods, at));

    Ok(RankedShop {
        shop,
        distance_km: distance,
        display_distance: display_distance(distance),
        display_opening_hours,
        is_open_now,
    })
}

/// Per-request knobs for [`ShopRanker::rank`]
#[derive(Debug, Clone, Default)]
pub struct RankQuery {
    pub food_type: Option<String>,
    pub max_distance_km: Option<f64>,
    pub open_now: bool,
    pub limit: Option<usize>,
}

/// Result of a ranking request
#[derive(Debug)]
pub struct RankResult {
    pub shops: Vec<RankedShop>,
    pub total_candidates: usize,
}

/// Ranking pipeline used by the HTTP layer
///
/// # Pipeline Stages
/// 1. Food-type match and bounding box pre-filter
/// 2. Distance and hours annotation, stable sort
/// 3. Exact radius cut and open-now filter
/// 4. Limit
#[derive(Debug, Clone)]
pub struct ShopRanker {
    default_limit: usize,
    max_limit: usize,
}

impl ShopRanker {
    pub fn new(default_limit: usize, max_limit: usize) -> Self {
        Self {
            default_limit,
            max_limit: max_limit.max(1),
        }
    }

    /// Effective limit for a request
    pub fn limit_for(&self, requested: Option<usize>) -> usize {
        requested.unwrap_or(self.default_limit).clamp(1, self.max_limit)
    }

    pub fn rank(
        &self,
        origin: Coordinate,
        candidates: Vec<ShopRecord>,
        at: NaiveDateTime,
        query: &RankQuery,
    ) -> Result<RankResult, GeoError> {
        origin.validate()?;

        let total_candidates = candidates.len();
        let limit = self.limit_for(query.limit);
        let bounding_box = query
            .max_distance_km
            .map(|radius| calculate_bounding_box(origin, radius));

        // Stage 1
        let prefilter = |shop: &ShopRecord| {
            matches_food_type(shop, query.food_type.as_deref())
                && bounding_box.map_or(true, |bbox| is_within_bounding_box(shop.coordinate, &bbox))
        };

        // Stage 2
        let mut shops = rank_by_distance(origin, candidates, at, Some(&prefilter))?;

        // Stage 3
        if let Some(radius) = query.max_distance_km {
            shops.retain(|shop| shop.distance_km <= radius);
        }
        if query.open_now {
            shops.retain(|shop| shop.is_open_now == Some(true));
        }

        // Stage 4
        shops.truncate(limit);

        Ok(RankResult {
            shops,
            total_candidates,
        })
    }
}

impl Default for ShopRanker {
    fn default() -> Self {
        Self::new(20, 100)
    }
}

/// Shops without a food type pass; the catalog search is already keyword-filtered
#[inline]
pub fn matches_food_type(shop: &ShopRecord, wanted: Option<&str>) -> bool {
    match (wanted, shop.food_type.as_deref()) {
        (Some(wanted), Some(actual)) => wanted == actual,
        _ => true,
    }
}
