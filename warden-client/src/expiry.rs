/// Side effect run when the API answers HTTP 401.
///
/// Called exactly once per unauthorized response, before the dispatcher
/// returns [`ClientError::SessionExpired`](crate::ClientError::SessionExpired).
pub trait SessionExpiryHandler: Send + Sync {
    fn session_expired(&self, login_path: &str);
}

/// Default handler: records the forced return to the login entry point.
#[derive(Debug, Clone, Copy, Default)]
pub struct LogRedirect;

impl SessionExpiryHandler for LogRedirect {
    fn session_expired(&self, login_path: &str) {
        tracing::warn!("Session expired, redirecting to {}", login_path);
    }
}

impl<F> SessionExpiryHandler for F
where
    F: Fn(&str) + Send + Sync,
{
    fn session_expired(&self, login_path: &str) {
        self(login_path)
    }
}
