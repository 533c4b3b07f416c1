use std::sync::Arc;

use reqwest::cookie::Jar;
use reqwest::header::HeaderMap;
use reqwest::{Client, Method, StatusCode};
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use url::Url;
use warden_core::Envelope;

use crate::api::{
    Devices, Inquiries, LicenseKeys, Orders, Otps, Permissions, Plans, Roles, Subscriptions, Users,
};
use crate::config::ClientConfig;
use crate::error::{ClientError, Result};
use crate::expiry::{LogRedirect, SessionExpiryHandler};
use crate::protection::PayloadProtection;

/// Response header marking a body as an encrypted envelope.
pub const ENCRYPTED_HEADER: &str = "x-encrypted";

/// What a 401 means for a particular call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum OnUnauthorized {
    /// Session gone: run the expiry handler and fail with `SessionExpired`.
    ExpireSession,
    /// Report as an ordinary `Request` error (login, session check).
    Report,
}

/// HTTP client for the admin API
///
/// Every request body goes through the configured [`PayloadProtection`] and
/// every response flagged with `x-encrypted: true` is decoded through it.
/// Cookies set by the server are kept for the lifetime of the client.
#[derive(Clone)]
pub struct ApiClient {
    base_url: Url,
    client: Client,
    protection: Arc<dyn PayloadProtection>,
    on_session_expired: Arc<dyn SessionExpiryHandler>,
    login_path: String,
    strict_envelopes: bool,
}

impl ApiClient {
    /// Create a new API client
    ///
    /// # Example
    /// ```no_run
    /// use warden_client::{ApiClient, ClientConfig, SealedPayloads};
    /// use warden_core::PayloadKey;
    ///
    /// let key = PayloadKey::from_base64(&std::env::var("WARDEN_PAYLOAD_KEY").unwrap()).unwrap();
    /// let client = ApiClient::new(ClientConfig::default(), SealedPayloads::from_key(&key)).unwrap();
    /// ```
    pub fn new(config: ClientConfig, protection: impl PayloadProtection + 'static) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)?;

        let jar = Arc::new(Jar::default());
        if let Some(cookie) = &config.session_cookie {
            jar.add_cookie_str(cookie, &base_url);
        }

        let client = Client::builder().cookie_provider(jar).build()?;

        tracing::debug!(
            "API client for {} (encrypted bodies: {})",
            base_url,
            protection.is_encrypted()
        );

        Ok(Self {
            base_url,
            client,
            protection: Arc::new(protection),
            on_session_expired: Arc::new(LogRedirect),
            login_path: config.login_path,
            strict_envelopes: config.strict_envelopes,
        })
    }

    /// Replace the default [`LogRedirect`] session-expiry handler.
    pub fn with_session_expiry_handler(
        mut self,
        handler: impl SessionExpiryHandler + 'static,
    ) -> Self {
        self.on_session_expired = Arc::new(handler);
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn users(&self) -> Users<'_> {
        Users::new(self)
    }

    pub fn keys(&self) -> LicenseKeys<'_> {
        LicenseKeys::new(self)
    }

    pub fn otps(&self) -> Otps<'_> {
        Otps::new(self)
    }

    pub fn devices(&self) -> Devices<'_> {
        Devices::new(self)
    }

    pub fn inquiries(&self) -> Inquiries<'_> {
        Inquiries::new(self)
    }

    pub fn plans(&self) -> Plans<'_> {
        Plans::new(self)
    }

    pub fn roles(&self) -> Roles<'_> {
        Roles::new(self)
    }

    pub fn permissions(&self) -> Permissions<'_> {
        Permissions::new(self)
    }

    pub fn orders(&self) -> Orders<'_> {
        Orders::new(self)
    }

    pub fn subscriptions(&self) -> Subscriptions<'_> {
        Subscriptions::new(self)
    }

    /// Perform one API call.
    ///
    /// Returns `None` for a successful response with an empty body.
    pub async fn dispatch(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
    ) -> Result<Option<Value>> {
        self.execute(method, path, body, OnUnauthorized::ExpireSession, None)
            .await
    }

    /// Perform one API call and deserialize the result into `T`.
    ///
    /// An empty body deserializes from JSON `null`, so `T` may be `()` or an
    /// `Option`.
    pub async fn request<T, B>(&self, method: Method, path: &str, body: Option<&B>) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        let body = body
            .map(serde_json::to_value)
            .transpose()
            .map_err(ClientError::InvalidRequestBody)?;
        let value = self.dispatch(method, path, body.as_ref()).await?;
        from_response(value)
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        self.request::<T, Value>(Method::GET, path, None).await
    }

    pub async fn post<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::POST, path, Some(body)).await
    }

    pub async fn patch<T, B>(&self, path: &str, body: &B) -> Result<T>
    where
        T: DeserializeOwned,
        B: Serialize + ?Sized,
    {
        self.request(Method::PATCH, path, Some(body)).await
    }

    /// DELETE `path`.
    ///
    /// Whatever body the server returns is dropped without being parsed or
    /// decoded, so only the status decides the outcome.
    pub async fn delete(&self, path: &str) -> Result<()> {
        let raw = self
            .send(&Method::DELETE, path, None, OnUnauthorized::ExpireSession, None)
            .await?;
        if !raw.text.is_empty() {
            tracing::debug!("Ignoring {} byte DELETE response from {}", raw.text.len(), path);
        }
        Ok(())
    }

    pub(crate) async fn execute(
        &self,
        method: Method,
        path: &str,
        body: Option<&Value>,
        on_unauthorized: OnUnauthorized,
        fallback_message: Option<&str>,
    ) -> Result<Option<Value>> {
        let raw = self
            .send(&method, path, body, on_unauthorized, fallback_message)
            .await?;
        self.decode(&method, path, raw)
    }

    /// Send the request and turn non-2xx statuses into errors.
    async fn send(
        &self,
        method: &Method,
        path: &str,
        body: Option<&Value>,
        on_unauthorized: OnUnauthorized,
        fallback_message: Option<&str>,
    ) -> Result<RawBody> {
        let url = self.endpoint(path)?;

        tracing::debug!("{} {}", method, url);

        let mut request = self.client.request(method.clone(), url);
        if let Some(body) = body {
            let payload = self.protection.protect(body)?;
            request = request.json(&payload);
        }

        let response = request.send().await?;
        let status = response.status();
        let encrypted = is_encrypted(response.headers());
        let text = response.text().await?;

        if !status.is_success() {
            return Err(self.failure(
                method,
                path,
                status,
                encrypted,
                &text,
                on_unauthorized,
                fallback_message,
            ));
        }

        Ok(RawBody { encrypted, text })
    }

    fn decode(&self, method: &Method, path: &str, raw: RawBody) -> Result<Option<Value>> {
        if raw.text.is_empty() {
            tracing::debug!("{} {} returned an empty body", method, path);
            return Ok(None);
        }

        let json: Value = serde_json::from_str(&raw.text).map_err(ClientError::InvalidResponse)?;

        if raw.encrypted {
            return self.protection.unprotect(json).map(Some).inspect_err(|e| {
                tracing::error!("Failed to decrypt response for {} {}: {}", method, path, e);
            });
        }

        if self.strict_envelopes && Envelope::is_envelope_shaped(&json) {
            tracing::error!("Unflagged envelope in response to {} {}", method, path);
            return Err(ClientError::UnsignaledEnvelope);
        }

        Ok(Some(json))
    }

    /// Endpoint paths are appended to the base URL as-is, keeping any path
    /// prefix the base carries. The result must stay on the base URL's origin.
    fn endpoint(&self, path: &str) -> Result<Url> {
        if !path.starts_with('/') {
            return Err(ClientError::InvalidPath(path.to_string()));
        }

        let base = self.base_url.as_str().trim_end_matches('/');
        let url = Url::parse(&format!("{base}{path}"))?;
        if url.origin() != self.base_url.origin() {
            return Err(ClientError::InvalidPath(path.to_string()));
        }

        Ok(url)
    }

    #[allow(clippy::too_many_arguments)]
    fn failure(
        &self,
        method: &Method,
        path: &str,
        status: StatusCode,
        encrypted: bool,
        text: &str,
        on_unauthorized: OnUnauthorized,
        fallback_message: Option<&str>,
    ) -> ClientError {
        if status == StatusCode::UNAUTHORIZED && on_unauthorized == OnUnauthorized::ExpireSession {
            tracing::warn!("Unauthorized response to {} {}", method, path);
            self.on_session_expired.session_expired(&self.login_path);
            return ClientError::SessionExpired;
        }

        let body = self.error_body(encrypted, text);
        let message = body
            .get("message")
            .and_then(Value::as_str)
            .filter(|m| !m.is_empty())
            .map(str::to_owned)
            .unwrap_or_else(|| match fallback_message {
                Some(fallback) => fallback.to_string(),
                None => format!("HTTP error {}", status.as_u16()),
            });

        if status.is_server_error() {
            tracing::error!("{} {} failed with {}: {}", method, path, status, message);
        } else {
            tracing::warn!("{} {} failed with {}: {}", method, path, status, message);
        }

        ClientError::Request {
            status: status.as_u16(),
            message,
        }
    }

    /// Best-effort parse of an error body; anything unreadable becomes `{}`.
    fn error_body(&self, encrypted: bool, text: &str) -> Value {
        let Ok(json) = serde_json::from_str::<Value>(text) else {
            return Value::Object(Default::default());
        };

        if !encrypted {
            return json;
        }

        self.protection
            .unprotect(json)
            .unwrap_or_else(|_| Value::Object(Default::default()))
    }
}

/// A 2xx response whose body has not been interpreted yet.
struct RawBody {
    encrypted: bool,
    text: String,
}

fn is_encrypted(headers: &HeaderMap) -> bool {
    headers
        .get(ENCRYPTED_HEADER)
        .is_some_and(|value| value.as_bytes() == b"true")
}

fn from_response<T: DeserializeOwned>(value: Option<Value>) -> Result<T> {
    serde_json::from_value(value.unwrap_or(Value::Null)).map_err(ClientError::InvalidResponse)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::protection::{PlaintextPayloads, SealedPayloads};
    use mockito::Matcher;
    use serde_json::json;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use warden_core::{EnvelopeCodec, PayloadKey};

    fn key() -> PayloadKey {
        PayloadKey::from_bytes(&[0x5Au8; 32]).unwrap()
    }

    fn sealed_client(base_url: &str) -> ApiClient {
        ApiClient::new(ClientConfig::new(base_url), SealedPayloads::from_key(&key())).unwrap()
    }

    #[test]
    fn test_client_creation() {
        let client = ApiClient::new(ClientConfig::default(), PlaintextPayloads::new());
        assert!(client.is_ok());
    }

    #[test]
    fn test_client_invalid_url() {
        let client = ApiClient::new(ClientConfig::new("not a url"), PlaintextPayloads::new());
        assert!(matches!(client, Err(ClientError::UrlParseError(_))));
    }

    #[test]
    fn test_endpoint_keeps_base_prefix() {
        let client = sealed_client("https://admin.example.com/api/");
        let url = client.endpoint("/users?page=2").unwrap();
        assert_eq!(url.as_str(), "https://admin.example.com/api/users?page=2");
    }

    #[test]
    fn test_endpoint_rejects_host_changing_paths() {
        let client = sealed_client("http://api.example.com");

        for path in ["users", "@evil.example/users", ".evil.example/users", ":8443/users", ""] {
            let err = client.endpoint(path).unwrap_err();
            assert!(
                matches!(err, ClientError::InvalidPath(ref p) if p == path),
                "{path:?} was not rejected: {err:?}"
            );
        }
    }

    #[test]
    fn test_endpoint_stays_on_base_host() {
        let client = sealed_client("http://api.example.com/v1");

        for path in ["/users", "/users/a@evil.example", "//evil.example/x", "/x?next=http://evil.example"] {
            let url = client.endpoint(path).unwrap();
            assert_eq!(url.host_str(), Some("api.example.com"), "{path:?} -> {url}");
            assert_eq!(url.port_or_known_default(), Some(80));
        }
    }

    #[tokio::test]
    async fn test_dispatch_with_relative_path_sends_nothing() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", Matcher::Any)
            .expect(0)
            .create_async()
            .await;

        let client = sealed_client(&server.url());
        let result = client
            .dispatch(Method::POST, "@evil.example/users", Some(&json!({ "email": "a@b.c" })))
            .await;

        assert!(matches!(result, Err(ClientError::InvalidPath(_))));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_delete_ignores_undecodable_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("DELETE", "/users/u1")
            .with_status(200)
            .with_header(ENCRYPTED_HEADER, "true")
            .with_body(r#"{"iv":"AAAA","tag":"AAAA","data":"AAAA"}"#)
            .create_async()
            .await;

        let client = sealed_client(&server.url());
        client.delete("/users/u1").await.unwrap();
        mock.assert_async().await;

        // The same body through dispatch is still rejected
        let err = client.dispatch(Method::DELETE, "/users/u1", None).await.unwrap_err();
        assert!(matches!(err, ClientError::Codec(_)));
    }

    #[tokio::test]
    async fn test_delete_still_reports_failures() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("DELETE", "/keys/k1")
            .with_status(409)
            .with_body(r#"{"message":"key is linked to a device"}"#)
            .create_async()
            .await;

        let err = sealed_client(&server.url()).delete("/keys/k1").await.unwrap_err();
        assert_eq!(err.status(), Some(409));
        assert_eq!(err.to_string(), "key is linked to a device");
    }

    #[test]
    fn test_header_value_must_be_exactly_true() {
        let mut headers = HeaderMap::new();
        assert!(!is_encrypted(&headers));
        headers.insert(ENCRYPTED_HEADER, "TRUE".parse().unwrap());
        assert!(!is_encrypted(&headers));
        headers.insert(ENCRYPTED_HEADER, "true".parse().unwrap());
        assert!(is_encrypted(&headers));
    }

    #[tokio::test]
    async fn test_not_found_carries_server_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/users/missing")
            .with_status(404)
            .with_header("content-type", "application/json")
            .with_body(r#"{"message":"not found"}"#)
            .create_async()
            .await;

        let err = sealed_client(&server.url())
            .dispatch(Method::GET, "/users/missing", None)
            .await
            .unwrap_err();

        match err {
            ClientError::Request { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "not found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_server_error_without_body_uses_generic_message() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/keys")
            .with_status(500)
            .with_body("upstream exploded")
            .create_async()
            .await;

        let err = sealed_client(&server.url())
            .dispatch(Method::GET, "/keys", None)
            .await
            .unwrap_err();

        assert_eq!(err.status(), Some(500));
        assert_eq!(err.to_string(), "HTTP error 500");
    }

    #[tokio::test]
    async fn test_unauthorized_redirects_exactly_once() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/otps")
            .with_status(401)
            .with_body(r#"{"message":"jwt expired"}"#)
            .create_async()
            .await;

        let redirects = Arc::new(AtomicUsize::new(0));
        let seen = Arc::clone(&redirects);
        let client = sealed_client(&server.url()).with_session_expiry_handler(move |path: &str| {
            assert_eq!(path, "/login");
            seen.fetch_add(1, Ordering::SeqCst);
        });

        let err = client.dispatch(Method::GET, "/otps", None).await.unwrap_err();

        assert!(err.is_session_expired());
        assert_eq!(redirects.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_encrypted_error_body_message() {
        let codec = EnvelopeCodec::new(&key());
        let envelope = codec.encode(&json!({ "message": "email already taken" })).unwrap();

        let mut server = mockito::Server::new_async().await;
        server
            .mock("POST", "/users")
            .with_status(409)
            .with_header(ENCRYPTED_HEADER, "true")
            .with_body(serde_json::to_string(&envelope).unwrap())
            .create_async()
            .await;

        let err = sealed_client(&server.url())
            .dispatch(Method::POST, "/users", Some(&json!({ "email": "a@b.c" })))
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "email already taken");
    }

    #[tokio::test]
    async fn test_encrypted_response_is_decoded() {
        let codec = EnvelopeCodec::new(&key());
        let envelope = codec.encode(&json!({ "id": "u1", "name": "Ada" })).unwrap();

        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/users/u1")
            .with_status(200)
            .with_header(ENCRYPTED_HEADER, "true")
            .with_body(serde_json::to_string(&envelope).unwrap())
            .create_async()
            .await;

        let value = sealed_client(&server.url())
            .dispatch(Method::GET, "/users/u1", None)
            .await
            .unwrap();

        assert_eq!(value, Some(json!({ "id": "u1", "name": "Ada" })));
    }

    #[tokio::test]
    async fn test_unflagged_envelope_is_returned_raw() {
        let codec = EnvelopeCodec::new(&key());
        let envelope = codec.encode(&json!({ "id": "u1" })).unwrap();
        let raw = serde_json::to_value(&envelope).unwrap();

        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/users/u1")
            .with_status(200)
            .with_body(raw.to_string())
            .create_async()
            .await;

        let value = sealed_client(&server.url())
            .dispatch(Method::GET, "/users/u1", None)
            .await
            .unwrap();

        assert_eq!(value, Some(raw));
    }

    #[tokio::test]
    async fn test_strict_mode_rejects_unflagged_envelope() {
        let codec = EnvelopeCodec::new(&key());
        let envelope = codec.encode(&json!({ "id": "u1" })).unwrap();

        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/users/u1")
            .with_status(200)
            .with_body(serde_json::to_string(&envelope).unwrap())
            .create_async()
            .await;

        let config = ClientConfig::new(server.url()).with_strict_envelopes(true);
        let client = ApiClient::new(config, SealedPayloads::from_key(&key())).unwrap();

        let err = client.dispatch(Method::GET, "/users/u1", None).await.unwrap_err();
        assert!(matches!(err, ClientError::UnsignaledEnvelope));
    }

    #[tokio::test]
    async fn test_tampered_response_is_codec_error() {
        let codec = EnvelopeCodec::new(&key());
        let mut envelope = codec.encode(&json!({ "id": "u1" })).unwrap();
        envelope.tag = EnvelopeCodec::new(&PayloadKey::generate())
            .encode(&json!({ "id": "u1" }))
            .unwrap()
            .tag;

        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/users/u1")
            .with_status(200)
            .with_header(ENCRYPTED_HEADER, "true")
            .with_body(serde_json::to_string(&envelope).unwrap())
            .create_async()
            .await;

        let err = sealed_client(&server.url())
            .dispatch(Method::GET, "/users/u1", None)
            .await
            .unwrap_err();

        match err {
            ClientError::Codec(e) => assert!(e.is_decryption_failure()),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_empty_body_yields_none() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("DELETE", "/devices/d1")
            .with_status(200)
            .with_header(ENCRYPTED_HEADER, "true")
            .create_async()
            .await;

        let client = sealed_client(&server.url());
        let value = client.dispatch(Method::DELETE, "/devices/d1", None).await.unwrap();
        assert_eq!(value, None);

        client
            .request::<(), Value>(Method::DELETE, "/devices/d1", None)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_request_body_is_sealed() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("POST", "/keys")
            .match_header("content-type", "application/json")
            .match_body(Matcher::AllOf(vec![
                Matcher::Regex(r#""iv":"[A-Za-z0-9+/=]{16}""#.into()),
                Matcher::Regex(r#""tag":"[A-Za-z0-9+/=]{24}""#.into()),
                Matcher::Regex(r#""data":"[A-Za-z0-9+/=]+""#.into()),
            ]))
            .with_status(201)
            .with_body(r#"{"id":"k1"}"#)
            .expect(1)
            .create_async()
            .await;

        let value = sealed_client(&server.url())
            .dispatch(Method::POST, "/keys", Some(&json!({ "key": "LIC-123" })))
            .await
            .unwrap();

        assert_eq!(value, Some(json!({ "id": "k1" })));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_plaintext_mode_sends_raw_body() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("PATCH", "/otps/o1")
            .match_body(Matcher::Json(json!({ "isUsed": true })))
            .with_status(200)
            .with_body(r#"{"id":"o1","isUsed":true}"#)
            .create_async()
            .await;

        let client = ApiClient::new(ClientConfig::new(server.url()), PlaintextPayloads::new()).unwrap();
        let value = client
            .dispatch(Method::PATCH, "/otps/o1", Some(&json!({ "isUsed": true })))
            .await
            .unwrap();

        assert_eq!(value, Some(json!({ "id": "o1", "isUsed": true })));
        mock.assert_async().await;
    }

    #[tokio::test]
    async fn test_plaintext_mode_rejects_encrypted_response() {
        let envelope = EnvelopeCodec::new(&key()).encode(&json!([])).unwrap();

        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/inquiries")
            .with_status(200)
            .with_header(ENCRYPTED_HEADER, "true")
            .with_body(serde_json::to_string(&envelope).unwrap())
            .create_async()
            .await;

        let client = ApiClient::new(ClientConfig::new(server.url()), PlaintextPayloads::new()).unwrap();
        let err = client.dispatch(Method::GET, "/inquiries", None).await.unwrap_err();

        assert!(matches!(err, ClientError::EncryptedResponseInPlaintextMode));
    }

    #[tokio::test]
    async fn test_non_json_success_body() {
        let mut server = mockito::Server::new_async().await;
        server
            .mock("GET", "/keys")
            .with_status(200)
            .with_body("<html></html>")
            .create_async()
            .await;

        let err = sealed_client(&server.url())
            .dispatch(Method::GET, "/keys", None)
            .await
            .unwrap_err();

        assert!(matches!(err, ClientError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_session_cookie_is_attached() {
        let mut server = mockito::Server::new_async().await;
        let mock = server
            .mock("GET", "/keys")
            .match_header("cookie", "access_token=abc123")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;

        let config = ClientConfig::new(server.url()).with_session_cookie("access_token=abc123");
        let client = ApiClient::new(config, SealedPayloads::from_key(&key())).unwrap();

        let keys: Vec<Value> = client.get("/keys").await.unwrap();
        assert!(keys.is_empty());
        mock.assert_async().await;
    }
}
