//! Prompt construction and JSON extraction for the itinerary generator.
//!
//! A `PromptTemplate` is built per request and handed to the LLM client; no
//! template state outlives the request that produced it.

use regex::Regex;
use serde_json::Value;

use crate::models::plan::{Plan, NO_OVERNIGHT_STAY};
use crate::models::requests::TripRequest;

const SYSTEM_PROMPT: &str = "You are an experienced travel planner. \
You always answer with a single valid JSON object and nothing else.";

const PLAN_SCHEMA: &str = r#"{
  "trip_id": "string, unique per plan",
  "theme": "short theme tag, e.g. culture, food, nature",
  "hero": {
    "title": "string", "subtitle": "string", "destination": "string",
    "duration": "string", "budget": "string", "highlights": ["string"],
    "hero_image": "string"
  },
  "itinerary": [{
    "day": 1,
    "date": "YYYY-MM-DD",
    "city": { "name": "string", "name_en": "string", "description": "string", "image": "string" },
    "activities": [{
      "id": "string", "time": "HH:MM - HH:MM", "title": "string", "subtitle": "string",
      "type": "string", "priority": "must_see | must_do | recommended | optional",
      "location": "specific place name that can be found on a map",
      "price": "string", "rating": 4.5, "description": "string", "tips": "string"
    }],
    "accommodation": "area or hotel to stay in"
  }]
}"#;

#[derive(Debug, Clone, PartialEq)]
pub struct PromptTemplate {
    pub system: String,
    pub user: String,
}

impl PromptTemplate {
    /// Prompt asking for `request.plan_count()` alternative plans.
    pub fn for_trip(request: &TripRequest) -> Self {
        let mut lines = vec![format!(
            "Create {} distinct travel plans for a trip to {}.",
            request.plan_count(),
            request.destination.trim()
        )];
        if let Some(duration) = request.duration {
            lines.push(format!("Trip length: {} days.", duration));
        }
        if let Some(budget) = request.budget.as_deref().filter(|b| !b.trim().is_empty()) {
            lines.push(format!("Budget: {}.", budget.trim()));
        }
        if let Some(party_size) = request.party_size {
            lines.push(format!("Travellers: {}.", party_size));
        }
        if !request.interests.is_empty() {
            lines.push(format!("Interests: {}.", request.interests.join(", ")));
        }
        if let Some(start_date) = request.start_date.as_deref().filter(|d| !d.trim().is_empty()) {
            lines.push(format!("The first day is {}.", start_date.trim()));
        }
        if let Some(extras) = request.extras.as_deref().filter(|e| !e.trim().is_empty()) {
            lines.push(format!("Additional wishes: {}", extras.trim()));
        }
        lines.push(
            "Give each plan a different theme. Days are numbered from 1 in order.".to_string(),
        );
        lines.push(format!(
            "On the final day set \"accommodation\" to \"{}\".",
            NO_OVERNIGHT_STAY
        ));
        lines.push(format!(
            "Respond with {{\"plans\": [ ... ]}} where every plan follows this shape:\n{}",
            PLAN_SCHEMA
        ));

        Self {
            system: SYSTEM_PROMPT.to_string(),
            user: lines.join("\n"),
        }
    }

    /// Prompt asking for a revised version of `original`.
    pub fn for_modification(
        original: &Plan,
        modification_request: &str,
        siblings: &[Plan],
    ) -> Result<Self, serde_json::Error> {
        let original_json = serde_json::to_string_pretty(original)?;
        let other_themes: Vec<&str> = siblings
            .iter()
            .filter(|plan| plan.trip_id != original.trip_id)
            .map(|plan| plan.theme.as_str())
            .filter(|theme| !theme.is_empty())
            .collect();

        let mut lines = vec![
            "Here is an existing travel plan:".to_string(),
            original_json,
            format!("Modify it according to this request: {}", modification_request.trim()),
            format!(
                "Keep trip_id \"{}\" and theme \"{}\" unless the request says otherwise.",
                original.trip_id, original.theme
            ),
        ];
        if !other_themes.is_empty() {
            lines.push(format!(
                "The traveller is also considering plans themed: {}. Keep this plan distinct from them.",
                other_themes.join(", ")
            ));
        }
        lines.push(format!(
            "Respond with the complete modified plan as one JSON object following this shape:\n{}",
            PLAN_SCHEMA
        ));

        Ok(Self {
            system: SYSTEM_PROMPT.to_string(),
            user: lines.join("\n"),
        })
    }
}

/// Pulls the JSON object out of a model reply: strips markdown fences and any
/// prose around the outermost braces.
pub fn extract_json(raw: &str) -> Result<Value, serde_json::Error> {
    let unfenced = Regex::new(r"(?s)```(?:json)?\s*(.*?)```")
        .ok()
        .and_then(|fence| {
            fence
                .captures(raw)
                .and_then(|captures| captures.get(1))
                .map(|m| m.as_str())
        })
        .unwrap_or(raw);

    let trimmed = unfenced.trim();
    let candidate = match (trimmed.find('{'), trimmed.rfind('}')) {
        (Some(start), Some(end)) if start < end => &trimmed[start..=end],
        _ => trimmed,
    };
    serde_json::from_str(candidate)
}
