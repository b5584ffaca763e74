//! Konamon Finder - nearby takoyaki and okonomiyaki shop ranking
//!
//! The core is a pure pipeline: haversine distance from the caller, a
//! "today's hours" string per shop (with midnight rollover), and a stable
//! nearest-first sort. The HTTP layer feeds it shops from the catalog API.

pub mod config;
pub mod core;
pub mod models;
pub mod routes;
pub mod services;

// Re-export commonly used types
pub use crate::core::{distance_km, format_today_hours, rank_by_distance, GeoError, ShopRanker};
pub use crate::models::{Coordinate, OpeningPeriod, RankedShop, ShopRecord, TimePoint};
