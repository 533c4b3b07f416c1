use crate::api::item_path;
use crate::client::ApiClient;
use crate::error::Result;
use crate::models::{CreateLicenseKey, LicenseKey, UpdateLicenseKey};

/// License keys (`/keys`).
pub struct LicenseKeys<'a> {
    client: &'a ApiClient,
}

impl<'a> LicenseKeys<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<LicenseKey>> {
        self.client.get("/keys").await
    }

    pub async fn get(&self, id: &str) -> Result<LicenseKey> {
        self.client.get(&item_path("keys", id)).await
    }

    pub async fn create(&self, key: &CreateLicenseKey) -> Result<LicenseKey> {
        tracing::info!("Creating license key valid until {}", key.expires_at);
        self.client.post("/keys", key).await
    }

    pub async fn update(&self, id: &str, update: &UpdateLicenseKey) -> Result<LicenseKey> {
        self.client.patch(&item_path("keys", id), update).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        tracing::info!("Deleting license key {}", id);
        self.client.delete(&item_path("keys", id)).await
    }
}
