// Model exports
pub mod domain;
pub mod requests;
pub mod responses;

pub use domain::{BoundingBox, Coordinate, DayHours, OpeningHours, OpeningPeriod, RankedShop, Schedule, ShopDetail, ShopHours, ShopRecord, TimePoint};
pub use requests::{NearbyShopsRequest, ShopHoursQuery};
pub use responses::{ErrorResponse, HealthResponse, NearbyShopsResponse, ShopHoursResponse};
