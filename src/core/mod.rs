// Core algorithm exports
pub mod distance;
pub mod hours;
pub mod ranker;

pub use distance::{distance_km, display_distance, haversine_distance, calculate_bounding_box, is_within_bounding_box, GeoError};
pub use hours::{format_today, format_today_hours, format_today_weekday_text, is_open_at, today_hours, week_hours, ScheduleError, TodayHours};
pub use ranker::{rank_by_distance, RankQuery, RankResult, ShopRanker};
