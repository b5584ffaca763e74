// Service exports
pub mod cache;
pub mod catalog;

pub use cache::{CacheKey, CacheStats, ShopCache};
pub use catalog::{CatalogClient, CatalogError, NearbyQuery};
