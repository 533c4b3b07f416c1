use crate::api::item_path;
use crate::client::ApiClient;
use crate::error::Result;
use crate::models::{Permission, PermissionInput};

/// Route permissions attached to roles (`/permissions`).
pub struct Permissions<'a> {
    client: &'a ApiClient,
}

impl<'a> Permissions<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Permission>> {
        self.client.get("/permissions").await
    }

    /// Permissions granted to one role, via `/permissions/role/{role_id}`.
    pub async fn list_by_role(&self, role_id: &str) -> Result<Vec<Permission>> {
        self.client.get(&item_path("permissions/role", role_id)).await
    }

    pub async fn create(&self, permission: &PermissionInput) -> Result<Permission> {
        tracing::info!(
            "Creating permission {:?} {} for role {}",
            permission.http_method,
            permission.api_route,
            permission.role_id
        );
        self.client.post("/permissions", permission).await
    }

    pub async fn update(&self, id: &str, permission: &PermissionInput) -> Result<Permission> {
        self.client.patch(&item_path("permissions", id), permission).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        tracing::info!("Deleting permission {}", id);
        self.client.delete(&item_path("permissions", id)).await
    }
}
