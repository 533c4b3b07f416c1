use serde::Serialize;

use crate::api::item_path;
use crate::client::ApiClient;
use crate::error::Result;
use crate::models::{Inquiry, InquiryStatus};

#[derive(Serialize)]
struct StatusChange {
    status: InquiryStatus,
}

/// Sales and support inquiries. Read-only apart from status changes.
pub struct Inquiries<'a> {
    client: &'a ApiClient,
}

impl<'a> Inquiries<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Inquiry>> {
        self.client.get("/inquiries").await
    }

    pub async fn update_status(&self, id: &str, status: InquiryStatus) -> Result<Inquiry> {
        tracing::info!("Setting inquiry {} status to {:?}", id, status);
        let path = format!("{}/status", item_path("inquiries", id));
        self.client.patch(&path, &StatusChange { status }).await
    }
}
