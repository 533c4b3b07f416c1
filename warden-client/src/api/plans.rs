use crate::api::item_path;
use crate::client::ApiClient;
use crate::error::Result;
use crate::models::{CreatePlan, Plan, UpdatePlan};

/// License plans (`/plans`).
pub struct Plans<'a> {
    client: &'a ApiClient,
}

impl<'a> Plans<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Plan>> {
        self.client.get("/plans").await
    }

    pub async fn create(&self, plan: &CreatePlan) -> Result<Plan> {
        tracing::info!("Creating plan {}", plan.slug);
        self.client.post("/plans", plan).await
    }

    pub async fn update(&self, id: &str, update: &UpdatePlan) -> Result<Plan> {
        self.client.patch(&item_path("plans", id), update).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        tracing::info!("Deleting plan {}", id);
        self.client.delete(&item_path("plans", id)).await
    }
}
