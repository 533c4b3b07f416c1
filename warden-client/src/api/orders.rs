use crate::client::ApiClient;
use crate::error::Result;
use crate::models::Order;

/// Plan purchases (`/orders`). Read-only.
pub struct Orders<'a> {
    client: &'a ApiClient,
}

impl<'a> Orders<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Order>> {
        self.client.get("/orders").await
    }
}
