use crate::core::distance::{validate_coordinate, GeoError};
use crate::core::hours::ScheduleError;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};

/// A point on the globe in decimal degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinate {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinate {
    /// Build a coordinate, rejecting NaN and out-of-range values
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GeoError> {
        validate_coordinate(latitude, longitude)?;
        Ok(Self { latitude, longitude })
    }

    /// Re-check a coordinate that arrived through deserialization
    pub fn validate(&self) -> Result<(), GeoError> {
        validate_coordinate(self.latitude, self.longitude)
    }
}

/// Geospatial bounding box
#[derive(Debug, Clone, Copy)]
pub struct BoundingBox {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lon: f64,
    pub max_lon: f64,
}

/// Day of week (0 = Sunday) plus a wall-clock time
///
/// Serialized as `{"day": 1, "time": "1100"}`. A time of `2400` is folded
/// into `0000` of the following day when parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "RawTimePoint", into = "RawTimePoint")]
pub struct TimePoint {
    day: u8,
    hour: u8,
    minute: u8,
}

/// Wire shape of a [`TimePoint`]
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RawTimePoint {
    pub day: u8,
    pub time: String,
}

impl TimePoint {
    pub fn new(day: u8, time: &str) -> Result<Self, ScheduleError> {
        if day > 6 {
            return Err(ScheduleError::InvalidDay(day));
        }

        let bytes = time.as_bytes();
        if bytes.len() != 4 || !bytes.iter().all(u8::is_ascii_digit) {
            return Err(ScheduleError::InvalidTime(time.to_string()));
        }

        let digit = |i: usize| bytes[i] - b'0';
        let hour = digit(0) * 10 + digit(1);
        let minute = digit(2) * 10 + digit(3);

        match (hour, minute) {
            (24, 0) => Ok(Self { day: (day + 1) % 7, hour: 0, minute: 0 }),
            (0..=23, 0..=59) => Ok(Self { day, hour, minute }),
            _ => Err(ScheduleError::InvalidTime(time.to_string())),
        }
    }

    /// Day of week, 0 = Sunday
    pub fn day(&self) -> u8 {
        self.day
    }

    pub fn hour(&self) -> u8 {
        self.hour
    }

    pub fn minute(&self) -> u8 {
        self.minute
    }

    /// `HHMM` as used on the wire
    pub fn code(&self) -> String {
        format!("{:02}{:02}", self.hour, self.minute)
    }

    /// `HH:MM` for display
    pub fn clock(&self) -> String {
        format!("{:02}:{:02}", self.hour, self.minute)
    }

    /// Minutes since Sunday 00:00
    pub fn minute_of_week(&self) -> u32 {
        u32::from(self.day) * 24 * 60 + u32::from(self.hour) * 60 + u32::from(self.minute)
    }
}

impl TryFrom<RawTimePoint> for TimePoint {
    type Error = ScheduleError;

    fn try_from(raw: RawTimePoint) -> Result<Self, Self::Error> {
        TimePoint::new(raw.day, &raw.time)
    }
}

impl From<TimePoint> for RawTimePoint {
    fn from(point: TimePoint) -> Self {
        RawTimePoint {
            day: point.day,
            time: point.code(),
        }
    }
}

/// One contiguous weekly opening interval
///
/// A missing `close` is how the upstream encodes a shop that never closes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OpeningPeriod {
    pub open: TimePoint,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub close: Option<TimePoint>,
}

impl OpeningPeriod {
    pub fn new(open: TimePoint, close: TimePoint) -> Self {
        Self { open, close: Some(close) }
    }

    /// True when the period ends on a different day than it starts
    pub fn crosses_midnight(&self) -> bool {
        self.close.is_some_and(|close| close.day() != self.open.day())
    }
}

/// Opening hours as delivered by the shop API
///
/// The same JSON field may carry structured periods or pre-formatted
/// weekday lines such as `"月曜日: 11:00-22:00"`; the first element decides.
#[derive(Debug, Clone, PartialEq)]
pub enum OpeningHours {
    Periods(Vec<OpeningPeriod>),
    WeekdayText(Vec<String>),
}

impl<'de> Deserialize<'de> for OpeningHours {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let items = Vec::<Value>::deserialize(deserializer)?;

        match items.first() {
            None => Ok(OpeningHours::Periods(Vec::new())),
            Some(Value::Object(_)) => items
                .into_iter()
                .map(serde_json::from_value::<OpeningPeriod>)
                .collect::<Result<Vec<_>, _>>()
                .map(OpeningHours::Periods)
                .map_err(D::Error::custom),
            Some(Value::String(_)) => items
                .into_iter()
                .map(|item| match item {
                    Value::String(line) => Ok(line),
                    other => Err(D::Error::custom(format!(
                        "expected weekday text, found {}",
                        other
                    ))),
                })
                .collect::<Result<Vec<_>, _>>()
                .map(OpeningHours::WeekdayText),
            Some(other) => Err(D::Error::custom(format!(
                "opening hours must be objects or strings, found {}",
                other
            ))),
        }
    }
}

impl Serialize for OpeningHours {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        match self {
            OpeningHours::Periods(periods) => periods.serialize(serializer),
            OpeningHours::WeekdayText(lines) => lines.serialize(serializer),
        }
    }
}

/// The schedule a shop will be rendered from
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Schedule<'a> {
    Periods(&'a [OpeningPeriod]),
    WeekdayText(&'a [String]),
    Unknown,
}

/// Both opening-hours fields a shop payload may carry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ShopHours {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opening_hours_periods: Option<OpeningHours>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub opening_hours: Option<OpeningHours>,
}

impl ShopHours {
    pub fn from_periods(periods: Vec<OpeningPeriod>) -> Self {
        Self {
            opening_hours_periods: Some(OpeningHours::Periods(periods)),
            opening_hours: None,
        }
    }

    pub fn from_weekday_text(lines: Vec<String>) -> Self {
        Self {
            opening_hours_periods: None,
            opening_hours: Some(OpeningHours::WeekdayText(lines)),
        }
    }

    /// Pick the schedule to render: non-empty structured periods win,
    /// then non-empty weekday text, otherwise the hours are unknown.
    pub fn schedule(&self) -> Schedule<'_> {
        let fields = [&self.opening_hours_periods, &self.opening_hours];

        let periods = fields.into_iter().find_map(|field| match field {
            Some(OpeningHours::Periods(periods)) if !periods.is_empty() => Some(periods),
            _ => None,
        });
        if let Some(periods) = periods {
            return Schedule::Periods(periods);
        }

        let lines = fields.into_iter().find_map(|field| match field {
            Some(OpeningHours::WeekdayText(lines)) if !lines.is_empty() => Some(lines),
            _ => None,
        });
        match lines {
            Some(lines) => Schedule::WeekdayText(lines),
            None => Schedule::Unknown,
        }
    }

    /// Structured periods, when the shop has any
    pub fn periods(&self) -> Option<&[OpeningPeriod]> {
        match self.schedule() {
            Schedule::Periods(periods) => Some(periods),
            _ => None,
        }
    }
}

/// Shop as returned by the catalog API
///
/// Only the coordinate and the opening hours are interpreted; every other
/// field is carried through to the response untouched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShopRecord {
    #[serde(rename = "place_id", alias = "id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(flatten)]
    pub coordinate: Coordinate,
    #[serde(flatten)]
    pub hours: ShopHours,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_ratings_total: Option<u32>,
    #[serde(rename = "photo_url", alias = "main_photo_url", default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(rename = "maps_url", alias = "Maps_url", alias = "url", default, skip_serializing_if = "Option::is_none")]
    pub maps_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub food_type: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ShopRecord {
    /// Minimal record, mostly useful for tests and fixtures
    pub fn new(id: impl Into<String>, name: impl Into<String>, coordinate: Coordinate) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            address: String::new(),
            coordinate,
            hours: ShopHours::default(),
            rating: None,
            user_ratings_total: None,
            photo_url: None,
            maps_url: None,
            phone: None,
            food_type: None,
            extra: Map::new(),
        }
    }
}

/// Shop detail as returned by the catalog detail endpoint (no coordinates)
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopDetail {
    #[serde(rename = "place_id", alias = "id")]
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub address: String,
    #[serde(flatten)]
    pub hours: ShopHours,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// Shop annotated with distance and today's hours
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedShop {
    #[serde(flatten)]
    pub shop: ShopRecord,
    #[serde(rename = "distanceKm")]
    pub distance_km: f64,
    #[serde(rename = "displayDistance")]
    pub display_distance: String,
    #[serde(rename = "displayOpeningHours")]
    pub display_opening_hours: String,
    #[serde(rename = "isOpenNow", default, skip_serializing_if = "Option::is_none")]
    pub is_open_now: Option<bool>,
}

/// One row of a weekly hours table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DayHours {
    pub day: String,
    pub hours: String,
    #[serde(rename = "isToday")]
    pub is_today: bool,
}
