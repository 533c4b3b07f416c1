use crate::client::ApiClient;
use crate::error::Result;
use crate::models::Subscription;

pub struct Subscriptions<'a> {
    client: &'a ApiClient,
}

impl<'a> Subscriptions<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self) -> Result<Vec<Subscription>> {
        self.client.get("/subscriptions").await
    }
}
