use serde::{Deserialize, Serialize};

use crate::models::enrichment::{Coordinates, HotelCandidate, RouteLeg};
use crate::models::plan::Plan;
use crate::models::saved_plan::SavedPlanData;

const DEFAULT_PLAN_COUNT: usize = 3;
const MAX_PLAN_COUNT: usize = 5;

/// Body of `POST /api/plan/generate`.
#[derive(Debug, Deserialize, Serialize, Clone, Default)]
#[serde(default)]
pub struct TripRequest {
    pub destination: String,
    #[serde(alias = "days")]
    pub duration: Option<u32>,
    pub budget: Option<String>,
    #[serde(alias = "partySize", alias = "people")]
    pub party_size: Option<u32>,
    pub interests: Vec<String>,
    pub extras: Option<String>,
    #[serde(alias = "startDate")]
    pub start_date: Option<String>,
    #[serde(alias = "planCount")]
    pub plan_count: Option<usize>,
}

impl TripRequest {
    pub fn plan_count(&self) -> usize {
        self.plan_count
            .unwrap_or(DEFAULT_PLAN_COUNT)
            .clamp(1, MAX_PLAN_COUNT)
    }
}

#[derive(Debug, Deserialize, Serialize)]
pub struct GeneratedPlans {
    pub plans: Vec<Plan>,
}

/// Body of `POST /api/plan/modify`.
#[derive(Debug, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct ModifyPlanRequest {
    pub original_plan: Option<Plan>,
    /// 1-based position of the plan among `full_plans_data`.
    pub plan_number: Option<usize>,
    pub modification_request: String,
    pub full_plans_data: Option<Vec<Plan>>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct ModifyPlanResponse {
    pub success: bool,
    pub modified_plan: Plan,
    pub original_plan_id: String,
    pub modification_request: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_plans: Option<Vec<Plan>>,
}

/// Body of `POST /api/plan/enrich`.
#[derive(Debug, Deserialize, Serialize)]
pub struct EnrichRequest {
    pub plans: Vec<Plan>,
    #[serde(default)]
    pub adults: Option<u32>,
    #[serde(default)]
    pub include_hotels: Option<bool>,
    #[serde(default)]
    pub include_routes: Option<bool>,
    #[serde(default)]
    pub include_images: Option<bool>,
}

#[derive(Debug, Deserialize)]
pub struct FetchPlanQuery {
    pub uid: Option<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct FetchPlanResponse {
    pub success: bool,
    pub data: SavedPlanData,
}

/// Body of `POST /api/plan/save`.
#[derive(Debug, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct SavePlanRequest {
    pub uid: String,
    #[serde(rename = "planData")]
    pub plan_data: Option<SavedPlanData>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SavePlanResponse {
    pub message: String,
    pub uid: String,
}

#[derive(Debug, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct PlacePhotoRequest {
    #[serde(rename = "placeName")]
    pub place_name: String,
}

#[derive(Debug, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct DirectionsRequest {
    pub waypoints: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct RouteSummary {
    pub distance: u64,
    pub duration: u64,
    pub legs: Vec<RouteLeg>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct DirectionsResponse {
    pub static_map_url: String,
    pub route: RouteSummary,
    pub waypoints: Vec<String>,
}

#[derive(Debug, Deserialize, Serialize, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum HotelSearchType {
    Coordinates,
    #[serde(alias = "areaCodes", alias = "area")]
    AreaCodes,
}

/// Body of `POST /api/hotels/search`.
#[derive(Debug, Deserialize, Serialize)]
pub struct HotelSearchRequest {
    pub checkin: String,
    pub checkout: String,
    #[serde(default = "default_adults")]
    pub adults: u32,
    #[serde(rename = "searchType")]
    pub search_type: HotelSearchType,
    #[serde(default)]
    pub coordinates: Option<Coordinates>,
    #[serde(rename = "areaCodes", default)]
    pub area_codes: Option<String>,
}

fn default_adults() -> u32 {
    2
}

#[derive(Debug, Deserialize, Serialize)]
pub struct HotelSearchResponse {
    pub results: Vec<HotelCandidate>,
    #[serde(rename = "searchParams")]
    pub search_params: serde_json::Value,
}

#[derive(Debug, Deserialize, Serialize, Default)]
#[serde(default)]
pub struct WeatherRequest {
    pub location: String,
    pub datetime: Option<String>,
}
