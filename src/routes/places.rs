use actix_web::{web, HttpResponse};

use crate::error::ApiError;
use crate::models::requests::PlacePhotoRequest;
use crate::state::AppState;

/*
    /api/places/photo
*/
pub async fn photo(
    state: web::Data<AppState>,
    input: web::Json<PlacePhotoRequest>,
) -> Result<HttpResponse, ApiError> {
    let place_name = input.into_inner().place_name;
    if place_name.trim().is_empty() {
        return Err(ApiError::Validation("placeName is required".to_string()));
    }

    let place = state.places.lookup(place_name.trim()).await?;
    Ok(HttpResponse::Ok().json(place))
}
