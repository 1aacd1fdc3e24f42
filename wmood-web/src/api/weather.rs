//! Current weather relay
//!
//! Thin pass-through to OpenWeatherMap so the API key never reaches the
//! browser.

use axum::{
    extract::{Query, State},
    Json,
};
use serde::Deserialize;

use crate::error::ApiError;
use crate::services::WeatherReport;
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct CoordinatesQuery {
    pub lat: Option<String>,
    pub lon: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CityQuery {
    pub city: Option<String>,
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

/// GET /weather?lat=..&lon=..
pub async fn weather_by_coordinates(
    State(state): State<AppState>,
    Query(query): Query<CoordinatesQuery>,
) -> Result<Json<WeatherReport>, ApiError> {
    let (Some(lat), Some(lon)) = (present(query.lat), present(query.lon)) else {
        return Err(ApiError::BadRequest(
            "Latitude and longitude are required".to_string(),
        ));
    };

    let report = state.weather().by_coordinates(&lat, &lon).await?;
    Ok(Json(report))
}

/// GET /weather/city?city=..
pub async fn weather_by_city(
    State(state): State<AppState>,
    Query(query): Query<CityQuery>,
) -> Result<Json<WeatherReport>, ApiError> {
    let city = present(query.city).ok_or_else(|| ApiError::BadRequest("City is required".to_string()))?;

    let report = state.weather().by_city(&city).await?;
    Ok(Json(report))
}
