use reqwest::Method;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::client::{ApiClient, OnUnauthorized};
use crate::error::{ClientError, Result};
use crate::models::SessionUser;

#[derive(Serialize)]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
}

#[derive(Serialize)]
struct Registration<'a> {
    email: &'a str,
    name: &'a str,
    password: &'a str,
}

#[derive(Deserialize)]
struct AuthResponse {
    user: SessionUser,
}

/// Cookie-based staff session.
///
/// Holds the locally known user. The server keeps the real session in the
/// cookie stored by the wrapped [`ApiClient`], so clones of that client share
/// it.
pub struct Session {
    client: ApiClient,
    user: Option<SessionUser>,
}

impl Session {
    pub fn new(client: ApiClient) -> Self {
        Self { client, user: None }
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn user(&self) -> Option<&SessionUser> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.user.is_some()
    }

    /// Ask the server who is signed in.
    ///
    /// Any failure, a 401 included, just means "nobody"; the session-expiry
    /// handler is not run for this check.
    pub async fn check(&mut self) -> Option<&SessionUser> {
        let result = self
            .client
            .execute(Method::GET, "/auth/me", None, OnUnauthorized::Report, None)
            .await
            .and_then(parse::<SessionUser>);

        self.user = match result {
            Ok(user) => Some(user),
            Err(e) => {
                tracing::debug!("No active session: {}", e);
                None
            }
        };
        self.user.as_ref()
    }

    pub async fn login(&mut self, email: &str, password: &str) -> Result<&SessionUser> {
        let body = to_body(&Credentials { email, password })?;
        self.authenticate("/auth/login", body, "Login failed").await
    }

    pub async fn register(&mut self, email: &str, name: &str, password: &str) -> Result<&SessionUser> {
        let body = to_body(&Registration {
            email,
            name,
            password,
        })?;
        self.authenticate("/auth/register", body, "Registration failed")
            .await
    }

    /// End the session. The server call is best effort: the local user is
    /// cleared even when it fails.
    pub async fn logout(&mut self) {
        let result = self
            .client
            .execute(Method::POST, "/auth/logout", None, OnUnauthorized::Report, None)
            .await;

        if let Err(e) = result {
            tracing::warn!("Logout request failed, clearing local session anyway: {}", e);
        }

        if let Some(user) = self.user.take() {
            tracing::info!("Signed out {}", user.email);
        }
    }

    async fn authenticate(
        &mut self,
        path: &str,
        body: Value,
        failure_message: &str,
    ) -> Result<&SessionUser> {
        let value = self
            .client
            .execute(
                Method::POST,
                path,
                Some(&body),
                OnUnauthorized::Report,
                Some(failure_message),
            )
            .await?;

        let response: AuthResponse = parse(value)?;
        tracing::info!("Signed in as {} ({})", response.user.email, response.user.role.as_str());

        Ok(self.user.insert(response.user))
    }
}

fn to_body<T: Serialize>(value: &T) -> Result<Value> {
    serde_json::to_value(value).map_err(ClientError::InvalidRequestBody)
}

fn parse<T: serde::de::DeserializeOwned>(value: Option<Value>) -> Result<T> {
    serde_json::from_value(value.unwrap_or(Value::Null)).map_err(ClientError::InvalidResponse)
}
