use actix_web::{web, HttpResponse};

use crate::error::ApiError;
use crate::models::requests::{DirectionsRequest, DirectionsResponse, RouteSummary};
use crate::state::AppState;

/*
    /api/directions
*/
pub async fn directions(
    state: web::Data<AppState>,
    input: web::Json<DirectionsRequest>,
) -> Result<HttpResponse, ApiError> {
    let waypoints: Vec<String> = input
        .into_inner()
        .waypoints
        .into_iter()
        .map(|waypoint| waypoint.trim().to_string())
        .filter(|waypoint| !waypoint.is_empty())
        .collect();

    if waypoints.len() < 2 {
        return Err(ApiError::Validation(
            "At least two waypoints are required".to_string(),
        ));
    }

    let segment = state.routes.route(&waypoints).await?;
    Ok(HttpResponse::Ok().json(DirectionsResponse {
        static_map_url: segment.static_map_url,
        route: RouteSummary {
            distance: segment.distance_meters,
            duration: segment.duration_seconds,
            legs: segment.legs,
        },
        waypoints,
    }))
}
