use actix_web::{web, HttpResponse};

use crate::error::{ApiError, ClientError};
use crate::models::requests::WeatherRequest;
use crate::models::weather::WeatherReport;
use crate::services::weather_service::parse_datetime;
use crate::state::AppState;

/*
    /api/weather
*/
pub async fn weather(
    state: web::Data<AppState>,
    input: web::Json<WeatherRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = input.into_inner();
    let location = request.location.trim();
    if location.is_empty() {
        return Err(ApiError::Validation("location is required".to_string()));
    }

    let at = match request.datetime.as_deref().map(str::trim) {
        Some(value) if !value.is_empty() => Some(parse_datetime(value).ok_or_else(|| {
            ApiError::Validation(format!("Unrecognised datetime: {}", value))
        })?),
        _ => None,
    };

    match state.weather.weather(location, at).await {
        Ok(report) => Ok(HttpResponse::Ok().json(report)),
        Err(err @ (ClientError::NotConfigured(_) | ClientError::Unauthorized)) => {
            log::warn!("Serving mock weather for {}: {}", location, err);
            Ok(HttpResponse::Ok().json(WeatherReport::mock(location)))
        }
        Err(err) => Err(err.into()),
    }
}
