use actix_web::{web, HttpResponse};
use chrono::NaiveDate;
use serde_json::json;

use crate::error::ApiError;
use crate::models::requests::{HotelSearchRequest, HotelSearchResponse, HotelSearchType};
use crate::services::hotel_service::{HotelQuery, HotelTarget};
use crate::state::AppState;

fn parse_date(field: &str, value: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d").map_err(|_| {
        ApiError::Validation(format!("{} must be a date formatted as YYYY-MM-DD", field))
    })
}

fn build_query(request: &HotelSearchRequest) -> Result<HotelQuery, ApiError> {
    let checkin = parse_date("checkin", &request.checkin)?;
    let checkout = parse_date("checkout", &request.checkout)?;
    if checkout <= checkin {
        return Err(ApiError::Validation(
            "checkout must be after checkin".to_string(),
        ));
    }
    if request.adults == 0 {
        return Err(ApiError::Validation("adults must be at least 1".to_string()));
    }

    let target = match request.search_type {
        HotelSearchType::Coordinates => request
            .coordinates
            .map(HotelTarget::Coordinates)
            .ok_or_else(|| {
                ApiError::Validation("coordinates are required for this search".to_string())
            })?,
        HotelSearchType::AreaCodes => request
            .area_codes
            .as_deref()
            .map(str::trim)
            .filter(|area| !area.is_empty())
            .map(|area| HotelTarget::Destination(area.to_string()))
            .ok_or_else(|| {
                ApiError::Validation("areaCodes are required for this search".to_string())
            })?,
    };

    Ok(HotelQuery {
        checkin,
        checkout,
        adults: request.adults,
        target,
    })
}

/*
    /api/hotels/search
*/
pub async fn search(
    state: web::Data<AppState>,
    input: web::Json<HotelSearchRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = input.into_inner();
    let query = build_query(&request)?;

    let results = state.hotels.search(&query).await?;
    log::info!("Hotel search returned {} result(s)", results.len());

    Ok(HttpResponse::Ok().json(HotelSearchResponse {
        results,
        search_params: json!({
            "checkin": request.checkin,
            "checkout": request.checkout,
            "adults": request.adults,
            "searchType": request.search_type,
            "coordinates": request.coordinates,
            "areaCodes": request.area_codes,
        }),
    }))
}
