use crate::api::{item_path, positive, with_query};
use crate::client::ApiClient;
use crate::error::Result;
use crate::models::{CreateUser, Paginated, Role, UpdateUser, User, UserStatus};

/// Filters for the paginated user listing. Unset fields are not sent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserQuery {
    pub page: Option<u32>,
    pub limit: Option<u32>,
    pub search: Option<String>,
    pub role: Option<Role>,
    pub status: Option<UserStatus>,
}

impl UserQuery {
    fn to_path(&self) -> String {
        with_query(
            "/users",
            [
                ("page", positive(self.page)),
                ("limit", positive(self.limit)),
                ("search", self.search.clone()),
                ("role", self.role.map(|r| r.as_str().to_string())),
                ("status", self.status.map(|s| s.as_str().to_string())),
            ],
        )
    }
}

pub struct Users<'a> {
    client: &'a ApiClient,
}

impl<'a> Users<'a> {
    pub(crate) fn new(client: &'a ApiClient) -> Self {
        Self { client }
    }

    pub async fn list(&self, query: &UserQuery) -> Result<Paginated<User>> {
        self.client.get(&query.to_path()).await
    }

    pub async fn get(&self, id: &str) -> Result<User> {
        self.client.get(&item_path("users", id)).await
    }

    pub async fn create(&self, user: &CreateUser) -> Result<User> {
        tracing::info!("Creating user {}", user.email);
        self.client.post("/users", user).await
    }

    pub async fn update(&self, id: &str, update: &UpdateUser) -> Result<User> {
        self.client.patch(&item_path("users", id), update).await
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        tracing::info!("Deleting user {}", id);
        self.client.delete(&item_path("users", id)).await
    }
}
