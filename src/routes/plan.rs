use actix_web::{web, HttpResponse};

use crate::error::ApiError;
use crate::models::requests::{
    EnrichRequest, FetchPlanQuery, FetchPlanResponse, GeneratedPlans, ModifyPlanRequest,
    ModifyPlanResponse, SavePlanRequest, SavePlanResponse, TripRequest,
};
use crate::services::enrichment::EnrichmentOptions;
use crate::services::regeneration_service::{replace_plan, RegenerationError};
use crate::state::AppState;

/*
    /api/plan/generate
*/
pub async fn generate(
    state: web::Data<AppState>,
    input: web::Json<TripRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = input.into_inner();
    log::info!(
        "Generating {} plan(s) for {}",
        request.plan_count(),
        request.destination
    );

    let plans = state.generator.generate(&request).await?;
    Ok(HttpResponse::Ok().json(GeneratedPlans { plans }))
}

/*
    /api/plan/modify
*/
pub async fn modify(
    state: web::Data<AppState>,
    input: web::Json<ModifyPlanRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = input.into_inner();

    // Position of the plan inside full_plans_data, checked before calling the model.
    let index = match (&request.full_plans_data, request.plan_number) {
        (Some(plans), Some(number)) => {
            let index = number
                .checked_sub(1)
                .filter(|index| *index < plans.len())
                .ok_or(RegenerationError::PlanOutOfRange(number))?;
            Some(index)
        }
        _ => None,
    };

    let original = request.original_plan.clone().or_else(|| {
        index.and_then(|index| {
            request
                .full_plans_data
                .as_ref()
                .and_then(|plans| plans.get(index).cloned())
        })
    });

    let siblings: Vec<_> = request
        .full_plans_data
        .iter()
        .flatten()
        .enumerate()
        .filter(|(position, _)| Some(*position) != index)
        .map(|(_, plan)| plan.clone())
        .collect();

    let modified = state
        .regenerator
        .regenerate(original.as_ref(), &request.modification_request, &siblings)
        .await?;

    let updated_plans = match (request.full_plans_data, index) {
        (Some(mut plans), Some(index)) => {
            replace_plan(&mut plans, index, modified.clone())?;
            Some(plans)
        }
        _ => None,
    };

    let original_plan_id = original
        .map(|plan| plan.trip_id)
        .unwrap_or_else(|| modified.trip_id.clone());

    Ok(HttpResponse::Ok().json(ModifyPlanResponse {
        success: true,
        modified_plan: modified,
        original_plan_id,
        modification_request: request.modification_request,
        updated_plans,
    }))
}

/*
    /api/plan/enrich
*/
pub async fn enrich(
    state: web::Data<AppState>,
    input: web::Json<EnrichRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = input.into_inner();
    if request.plans.is_empty() {
        return Err(ApiError::Validation("At least one plan is required".to_string()));
    }

    let defaults = EnrichmentOptions::default();
    let options = EnrichmentOptions {
        adults: request.adults.filter(|adults| *adults > 0).unwrap_or(defaults.adults),
        include_hotels: request.include_hotels.unwrap_or(defaults.include_hotels),
        include_routes: request.include_routes.unwrap_or(defaults.include_routes),
        include_images: request.include_images.unwrap_or(defaults.include_images),
    };

    let maps = state.enrichment.enrich(&request.plans, &options).await;
    Ok(HttpResponse::Ok().json(maps))
}

/*
    /api/plan/fetch?uid=
*/
pub async fn fetch(
    state: web::Data<AppState>,
    query: web::Query<FetchPlanQuery>,
) -> Result<HttpResponse, ApiError> {
    let uid = required_uid(query.into_inner().uid.as_deref())?;

    match state.store.fetch(&uid).await? {
        Some(document) => Ok(HttpResponse::Ok().json(FetchPlanResponse {
            success: true,
            data: document.plan_data,
        })),
        None => Err(ApiError::NotFound(format!("No saved plans for user {}", uid))),
    }
}

/*
    /api/plan/save
*/
pub async fn save(
    state: web::Data<AppState>,
    input: web::Json<SavePlanRequest>,
) -> Result<HttpResponse, ApiError> {
    let request = input.into_inner();
    let uid = required_uid(Some(&request.uid))?;
    let plan_data = request
        .plan_data
        .ok_or_else(|| ApiError::Validation("planData is required".to_string()))?;

    log::info!("Saving {} plan(s) for user {}", plan_data.plans().len(), uid);
    state.store.save(&uid, plan_data).await?;

    Ok(HttpResponse::Ok().json(SavePlanResponse {
        message: "Plan saved successfully".to_string(),
        uid,
    }))
}

fn required_uid(uid: Option<&str>) -> Result<String, ApiError> {
    match uid.map(str::trim) {
        Some(uid) if !uid.is_empty() => Ok(uid.to_string()),
        _ => Err(ApiError::Validation("uid is required".to_string())),
    }
}
