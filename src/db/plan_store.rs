use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use bson::doc;
use chrono::Utc;
use mongodb::{Client, Collection};
use tokio::sync::RwLock;

use crate::error::ApiError;
use crate::models::saved_plan::{SavedPlanData, SavedPlanDocument};

const COLLECTION: &str = "SavedPlans";

/// Saved plans, one document per user id.
#[async_trait]
pub trait PlanStore: Send + Sync {
    async fn fetch(&self, uid: &str) -> Result<Option<SavedPlanDocument>, ApiError>;
    /// Insert or replace the user's plans, keeping the first `created_at`.
    async fn save(&self, uid: &str, data: SavedPlanData) -> Result<(), ApiError>;
    async fn ping(&self) -> Result<(), ApiError>;
}

pub struct MongoPlanStore {
    client: Arc<Client>,
    database: String,
}

impl MongoPlanStore {
    pub fn new(client: Arc<Client>, database: impl Into<String>) -> Self {
        Self {
            client,
            database: database.into(),
        }
    }

    fn collection(&self) -> Collection<SavedPlanDocument> {
        self.client.database(&self.database).collection(COLLECTION)
    }
}

#[async_trait]
impl PlanStore for MongoPlanStore {
    async fn fetch(&self, uid: &str) -> Result<Option<SavedPlanDocument>, ApiError> {
        Ok(self.collection().find_one(doc! { "uid": uid }).await?)
    }

    async fn save(&self, uid: &str, data: SavedPlanData) -> Result<(), ApiError> {
        let now = bson::to_bson(&Utc::now())
            .map_err(|e| ApiError::Database(format!("Failed to encode timestamp: {}", e)))?;
        let plan_data = bson::to_bson(&data)
            .map_err(|e| ApiError::Database(format!("Failed to encode plan: {}", e)))?;

        self.collection()
            .update_one(
                doc! { "uid": uid },
                doc! {
                    "$set": { "plan_data": plan_data, "updated_at": now.clone() },
                    "$setOnInsert": { "created_at": now },
                },
            )
            .upsert(true)
            .await?;
        Ok(())
    }

    async fn ping(&self) -> Result<(), ApiError> {
        self.client
            .database(&self.database)
            .run_command(doc! { "ping": 1 })
            .await?;
        Ok(())
    }
}

/// Process-local store used when no MongoDB URI is configured.
#[derive(Default)]
pub struct MemoryPlanStore {
    documents: RwLock<HashMap<String, SavedPlanDocument>>,
}

impl MemoryPlanStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl PlanStore for MemoryPlanStore {
    async fn fetch(&self, uid: &str) -> Result<Option<SavedPlanDocument>, ApiError> {
        Ok(self.documents.read().await.get(uid).cloned())
    }

    async fn save(&self, uid: &str, data: SavedPlanData) -> Result<(), ApiError> {
        let now = Utc::now();
        let mut documents = self.documents.write().await;
        let created_at = documents
            .get(uid)
            .and_then(|existing| existing.created_at)
            .unwrap_or(now);
        documents.insert(
            uid.to_string(),
            SavedPlanDocument {
                id: None,
                uid: uid.to_string(),
                plan_data: data,
                created_at: Some(created_at),
                updated_at: Some(now),
            },
        );
        Ok(())
    }

    async fn ping(&self) -> Result<(), ApiError> {
        Ok(())
    }
}
