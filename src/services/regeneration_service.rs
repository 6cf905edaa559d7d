//! Plan regeneration: ask the model for a modified plan and patch whatever it
//! left out from the original.

use std::sync::Arc;

use serde_json::{Map, Value};
use thiserror::Error;

use crate::error::{ApiError, ClientError};
use crate::models::plan::Plan;
use crate::services::llm_service::ItineraryLlm;
use crate::services::prompt::{extract_json, PromptTemplate};

#[derive(Debug, Error)]
pub enum RegenerationError {
    #[error("Original plan is required")]
    MissingOriginalPlan,
    #[error("Modification request must not be empty")]
    EmptyModificationRequest,
    #[error("Plan number {0} is out of range")]
    PlanOutOfRange(usize),
    #[error("Modified plan is not valid JSON: {0}")]
    UnparsableResponse(String),
    #[error("Modified plan failed validation: {0}")]
    InvalidPlan(String),
    #[error(transparent)]
    Provider(#[from] ClientError),
}

impl From<RegenerationError> for ApiError {
    fn from(err: RegenerationError) -> Self {
        match err {
            RegenerationError::MissingOriginalPlan
            | RegenerationError::EmptyModificationRequest
            | RegenerationError::PlanOutOfRange(_) => ApiError::Validation(err.to_string()),
            RegenerationError::UnparsableResponse(_) | RegenerationError::InvalidPlan(_) => {
                ApiError::UpstreamShape(err.to_string())
            }
            RegenerationError::Provider(client_error) => client_error.into(),
        }
    }
}

fn is_absent(value: Option<&Value>) -> bool {
    matches!(value, None | Some(Value::Null))
}

fn is_blank(value: Option<&Value>) -> bool {
    match value {
        None | Some(Value::Null) => true,
        Some(Value::String(s)) => s.trim().is_empty(),
        _ => false,
    }
}

fn patch_activity(activity: &mut Map<String, Value>, day: u64, position: usize) {
    if is_blank(activity.get("id")) {
        activity.insert(
            "id".to_string(),
            Value::String(format!("d{}-a{}", day, position + 1)),
        );
    }
    if is_blank(activity.get("title")) {
        activity.insert(
            "title".to_string(),
            Value::String(format!("Activity {}", position + 1)),
        );
    }
}

/// Days are numbered by position, whatever number the model put there.
fn patch_day(day: &mut Map<String, Value>, position: usize) {
    let day_number = position as u64 + 1;
    day.insert("day".to_string(), Value::from(day_number));

    match day.get_mut("activities") {
        Some(Value::Array(activities)) => {
            for (index, activity) in activities.iter_mut().enumerate() {
                if let Value::Object(activity) = activity {
                    patch_activity(activity, day_number, index);
                }
            }
        }
        _ => {
            day.insert("activities".to_string(), Value::Array(Vec::new()));
        }
    }
}

/// Merge a model-produced `partial` plan with `original`: missing `trip_id`,
/// `hero` and `itinerary` come from the original, missing day numbers come from
/// position, and unnamed activities get synthesised ids and titles.
pub fn merge_with_original(original: &Plan, partial: Value) -> Result<Plan, RegenerationError> {
    let mut partial = match partial {
        Value::Object(object) => object,
        other => {
            return Err(RegenerationError::InvalidPlan(format!(
                "expected an object, got {}",
                other
            )))
        }
    };

    if is_absent(partial.get("trip_id")) {
        partial.insert(
            "trip_id".to_string(),
            Value::String(original.trip_id.clone()),
        );
    }
    if is_absent(partial.get("hero")) {
        let hero = serde_json::to_value(&original.hero)
            .map_err(|e| RegenerationError::InvalidPlan(e.to_string()))?;
        partial.insert("hero".to_string(), hero);
    }
    if is_absent(partial.get("itinerary")) {
        let itinerary = serde_json::to_value(&original.itinerary)
            .map_err(|e| RegenerationError::InvalidPlan(e.to_string()))?;
        partial.insert("itinerary".to_string(), itinerary);
    }

    if let Some(Value::Array(days)) = partial.get_mut("itinerary") {
        for (position, day) in days.iter_mut().enumerate() {
            if let Value::Object(day) = day {
                patch_day(day, position);
            }
        }
    }

    validate_regenerated(&partial)?;
    serde_json::from_value(Value::Object(partial))
        .map_err(|e| RegenerationError::InvalidPlan(e.to_string()))
}

/// Minimal acceptance check for a regenerated plan.
pub fn validate_regenerated(plan: &Map<String, Value>) -> Result<(), RegenerationError> {
    if is_blank(plan.get("trip_id")) {
        return Err(RegenerationError::InvalidPlan("trip_id is empty".to_string()));
    }
    if is_blank(plan.get("theme")) {
        return Err(RegenerationError::InvalidPlan("theme is empty".to_string()));
    }
    match plan.get("hero") {
        Some(Value::Object(hero)) if !is_blank(hero.get("title")) => {}
        _ => {
            return Err(RegenerationError::InvalidPlan(
                "hero title is missing".to_string(),
            ))
        }
    }
    if !matches!(plan.get("itinerary"), Some(Value::Array(_))) {
        return Err(RegenerationError::InvalidPlan(
            "itinerary is not a list".to_string(),
        ));
    }
    Ok(())
}

/// Put `plan` at `index` in `plans`, leaving every other plan untouched.
pub fn replace_plan(plans: &mut [Plan], index: usize, plan: Plan) -> Result<(), RegenerationError> {
    match plans.get_mut(index) {
        Some(slot) => {
            *slot = plan;
            Ok(())
        }
        None => Err(RegenerationError::PlanOutOfRange(index + 1)),
    }
}

pub struct RegenerationService {
    llm: Arc<dyn ItineraryLlm>,
}

impl RegenerationService {
    pub fn new(llm: Arc<dyn ItineraryLlm>) -> Self {
        Self { llm }
    }

    pub async fn regenerate(
        &self,
        original: Option<&Plan>,
        modification_request: &str,
        siblings: &[Plan],
    ) -> Result<Plan, RegenerationError> {
        let original = original.ok_or(RegenerationError::MissingOriginalPlan)?;
        if modification_request.trim().is_empty() {
            return Err(RegenerationError::EmptyModificationRequest);
        }

        let prompt = PromptTemplate::for_modification(original, modification_request, siblings)
            .map_err(|e| RegenerationError::InvalidPlan(e.to_string()))?;
        let raw = self.llm.complete(&prompt).await?;
        let partial =
            extract_json(&raw).map_err(|e| RegenerationError::UnparsableResponse(e.to_string()))?;

        let modified = merge_with_original(original, partial)?;
        log::info!(
            "Regenerated plan {} ({} days)",
            modified.trip_id,
            modified.itinerary.len()
        );
        Ok(modified)
    }
}
