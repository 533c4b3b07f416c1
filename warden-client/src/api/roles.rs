use crate::api::item_path;
use crate::client::ApiClient;
use crate::error::Result;
use crate::models::{AccessRole, RoleInput};

/// Access roles (`/roles`).
pub struct Roles<'a> {
    client: &'a ApiClient,
}

impl<'a> Roles<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<AccessRole>> {
        self.client.get("/roles").await
    }

    pub async fn create(&self, role: &RoleInput) -> Result<AccessRole> {
        tracing::info!("Creating role {}", role.name);
        self.client.post("/roles", role).await
    }

    pub async fn update(&self, id: &str, role: &RoleInput) -> Result<AccessRole> {
        self.client.patch(&item_path("roles", id), role).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        tracing::info!("Deleting role {}", id);
        self.client.delete(&item_path("roles", id)).await
    }
}
