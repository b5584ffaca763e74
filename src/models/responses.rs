use crate::models::domain::{DayHours, RankedShop};
use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Response for the nearby shops endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NearbyShopsResponse {
    pub shops: Vec<RankedShop>,
    #[serde(rename = "totalCandidates")]
    pub total_candidates: usize,
    #[serde(rename = "referenceTime")]
    pub reference_time: DateTime<FixedOffset>,
}

/// Today's hours plus the weekly table for one shop
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ShopHoursResponse {
    #[serde(rename = "placeId")]
    pub place_id: String,
    pub name: String,
    pub today: String,
    pub week: Vec<DayHours>,
}

/// Health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

/// Error body shared by handlers and the payload error handlers
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    pub status_code: u16,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>, status_code: u16) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            status_code,
        }
    }
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.error, self.message)
    }
}

impl std::error::Error for ErrorResponse {}

impl ResponseError for ErrorResponse {
    fn status_code(&self) -> StatusCode {
        StatusCode::from_u16(self.status_code).unwrap_or(StatusCode::BAD_REQUEST)
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code()).json(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_response_status() {
        let err = ErrorResponse::new("Invalid JSON", "expected value", 400);
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(err.error_response().status(), StatusCode::BAD_REQUEST);
        assert_eq!(err.to_string(), "Invalid JSON: expected value");

        // Not a real status code
        assert_eq!(ErrorResponse::new("x", "y", 9).status_code(), StatusCode::BAD_REQUEST);
    }
}
