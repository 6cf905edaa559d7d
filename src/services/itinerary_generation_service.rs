use std::sync::Arc;

use serde_json::Value;
use uuid::Uuid;

use crate::error::ApiError;
use crate::models::plan::Plan;
use crate::models::requests::TripRequest;
use crate::services::llm_service::ItineraryLlm;
use crate::services::prompt::{extract_json, PromptTemplate};

pub struct ItineraryGenerator {
    llm: Arc<dyn ItineraryLlm>,
}

impl ItineraryGenerator {
    pub fn new(llm: Arc<dyn ItineraryLlm>) -> Self {
        Self { llm }
    }

    /// Generate plans for `request`. Provider failures propagate: there is
    /// nothing to fall back to without an itinerary.
    pub async fn generate(&self, request: &TripRequest) -> Result<Vec<Plan>, ApiError> {
        if request.destination.trim().is_empty() {
            return Err(ApiError::Validation("Destination is required".to_string()));
        }

        let prompt = PromptTemplate::for_trip(request);
        let raw = self.llm.complete(&prompt).await?;
        let value = extract_json(&raw).map_err(|e| {
            ApiError::UpstreamShape(format!("Generated itinerary is not valid JSON: {}", e))
        })?;

        let plans = plans_from_value(value);
        if plans.is_empty() {
            return Err(ApiError::UpstreamShape(
                "Generated itinerary contained no usable plans".to_string(),
            ));
        }
        log::info!(
            "Generated {} plan(s) for {}",
            plans.len(),
            request.destination.trim()
        );
        Ok(plans)
    }
}

/// Accepts `{"plans": [...]}`, a bare array, or a single plan object. Entries
/// that do not deserialize are dropped.
pub fn plans_from_value(value: Value) -> Vec<Plan> {
    let entries = match value {
        Value::Object(mut object) => match object.remove("plans") {
            Some(Value::Array(plans)) => plans,
            Some(_) => Vec::new(),
            None => vec![Value::Object(object)],
        },
        Value::Array(plans) => plans,
        _ => Vec::new(),
    };

    entries
        .into_iter()
        .enumerate()
        .filter_map(|(index, entry)| match serde_json::from_value::<Plan>(entry) {
            Ok(plan) => Some(normalize_plan(plan)),
            Err(e) => {
                log::warn!("Dropping generated plan {}: {}", index + 1, e);
                None
            }
        })
        .collect()
}

fn normalize_plan(mut plan: Plan) -> Plan {
    if plan.trip_id.trim().is_empty() {
        plan.trip_id = Uuid::new_v4().to_string();
    }
    plan.renumber_days();
    for day in plan.itinerary.iter_mut() {
        for (index, activity) in day.activities.iter_mut().enumerate() {
            if activity.id.trim().is_empty() {
                activity.id = format!("d{}-a{}", day.day, index + 1);
            }
        }
    }
    plan
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ClientError;
    use async_trait::async_trait;
    use serde_json::json;

    struct CannedLlm(Result<String, fn() -> ClientError>);

    #[async_trait]
    impl ItineraryLlm for CannedLlm {
        async fn complete(&self, _prompt: &PromptTemplate) -> Result<String, ClientError> {
            match &self.0 {
                Ok(reply) => Ok(reply.clone()),
                Err(make) => Err(make()),
            }
        }
    }

    fn generator(reply: Result<String, fn() -> ClientError>) -> ItineraryGenerator {
        ItineraryGenerator::new(Arc::new(CannedLlm(reply)))
    }

    fn request(destination: &str) -> TripRequest {
        TripRequest {
            destination: destination.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn single_plan_object_is_accepted() {
        let plans = plans_from_value(json!({
            "theme": "food",
            "hero": { "title": "Eat Osaka" },
            "itinerary": [{
                "day": 4,
                "city": { "name": "Osaka" },
                "activities": [{ "title": "Dotonbori" }]
            }]
        }));
        assert_eq!(plans.len(), 1);
        assert!(!plans[0].trip_id.is_empty());
        assert_eq!(plans[0].itinerary[0].day, 1);
        assert_eq!(plans[0].itinerary[0].activities[0].id, "d1-a1");
    }

    #[test]
    fn plans_with_null_and_string_fields_are_kept() {
        let plans = plans_from_value(json!({ "plans": [{
            "trip_id": null,
            "theme": "temples",
            "hero": { "title": "Kyoto", "subtitle": null, "duration": 3 },
            "itinerary": [
                { "day": "2", "date": null, "city": { "name": "Kyoto" },
                  "activities": [{ "title": "Kiyomizu-dera", "tips": null, "rating": null }],
                  "accommodation": null }
            ]
        }]}));
        assert_eq!(plans.len(), 1);
        assert!(!plans[0].trip_id.is_empty());
        assert_eq!(plans[0].hero.duration, "3");
        assert_eq!(plans[0].itinerary[0].day, 1);
        assert_eq!(plans[0].itinerary[0].activities[0].tips, "");
    }

    #[test]
    fn malformed_entries_are_dropped() {
        let plans = plans_from_value(json!({ "plans": [
            { "trip_id": "a", "theme": "x", "hero": { "title": "A" }, "itinerary": [] },
            { "trip_id": "b", "theme": "y" }
        ]}));
        assert_eq!(plans.len(), 1);
        assert_eq!(plans[0].trip_id, "a");
    }

    #[actix_rt::test]
    async fn missing_destination_is_rejected_before_calling_the_model() {
        let err = generator(Err(|| ClientError::Unauthorized))
            .generate(&request("  "))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[actix_rt::test]
    async fn provider_errors_propagate() {
        let err = generator(Err(|| ClientError::RateLimited))
            .generate(&request("Kyoto"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::RateLimited));
    }

    #[actix_rt::test]
    async fn unparsable_reply_is_a_shape_error() {
        let err = generator(Ok("no json here".to_string()))
            .generate(&request("Kyoto"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::UpstreamShape(_)));
    }
}
