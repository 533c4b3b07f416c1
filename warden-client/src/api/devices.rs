use crate::api::{item_path, positive, with_query};
use crate::client::ApiClient;
use crate::error::Result;
use crate::models::{CreateDevice, Device, Paginated, UpdateDevice};

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub user_id: Option<String>,
}

impl DeviceQuery {
    fn to_path(&self) -> String {
        with_query(
            "/devices",
            [
                ("page", positive(self.page)),
                ("limit", positive(self.limit)),
                ("search", self.search.clone()),
                ("userId", self.user_id.clone()),
            ],
        )
    }
}

pub struct Devices<'a> {
    client: &'a ApiClient,
}

impl<'a> Devices<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, query: &DeviceQuery) -> Result<Paginated<Device>> {
        self.client.get(&query.to_path()).await
    }

    pub async fn get(&self, id: &str) -> Result<Device> {
        self.client.get(&item_path("devices", id)).await
    }

    pub async fn create(&self, device: &CreateDevice) -> Result<Device> {
        tracing::info!("Registering device {}", device.fingerprint);
        self.client.post("/devices", device).await
    }

    pub async fn update(&self, id: &str, update: &UpdateDevice) -> Result<Device> {
        self.client.patch(&item_path("devices", id), update).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        tracing::info!("Deleting device {}", id);
        self.client.delete(&item_path("devices", id)).await
    }
}
