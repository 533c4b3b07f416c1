use crate::api::item_path;
use crate::client::ApiClient;
use crate::error::Result;
use crate::models::{CreateOtp, Otp, UpdateOtp};

pub struct Otps<'a> {
    client: &'a ApiClient,
}

impl<'a> Otps<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Otp>> {
        self.client.get("/otps").await
    }

    pub async fn get(&self, id: &str) -> Result<Otp> {
        self.client.get(&item_path("otps", id)).await
    }

    pub async fn create(&self, otp: &CreateOtp) -> Result<Otp> {
        self.client.post("/otps", otp).await
    }

    pub async fn update(&self, id: &str, update: &UpdateOtp) -> Result<Otp> {
        self.client.patch(&item_path("otps", id), update).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        self.client.delete(&item_path("otps", id)).await
    }
}
