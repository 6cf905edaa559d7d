use chrono::{DateTime, Utc};
use mongodb::bson::oid::ObjectId;
use serde::{Deserialize, Serialize};

use crate::models::plan::Plan;

/// What a user saved: one plan, or the whole set they were comparing.
#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
#[serde(untagged)]
pub enum SavedPlanData {
    Multiple(Vec<Plan>),
    Single(Box<Plan>),
}

impl SavedPlanData {
    pub fn plans(&self) -> Vec<&Plan> {
        match self {
            SavedPlanData::Single(plan) => vec![plan.as_ref()],
            SavedPlanData::Multiple(plans) => plans.iter().collect(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct SavedPlanDocument {
    #[serde(rename = "_id", skip_serializing_if = "Option::is_none")]
    pub id: Option<ObjectId>,
    pub uid: String,
    pub plan_data: SavedPlanData,
    pub created_at: Option<DateTime<Utc>>,
    pub updated_at: Option<DateTime<Utc>>,
}
