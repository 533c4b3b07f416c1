use anyhow::{Context, Result};
use serde_json::Value;
use warden_client::{ApiClient, ClientConfig, Method, PlaintextPayloads, SealedPayloads};

use super::{load_key, read_input, write_output};

pub struct Options<'a> {
    pub api_url: &'a str,
    pub payload_key: Option<&'a str>,
    pub plaintext: bool,
    pub strict: bool,
    pub session_cookie: Option<&'a str>,
}

pub async fn execute(
    options: &Options<'_>,
    method: Method,
    path: &str,
    body: Option<&str>,
) -> Result<()> {
    let body: Option<Value> = match body {
        Some(source) => {
            let raw = read_input(source).context("Failed to read request body")?;
            Some(serde_json::from_slice(&raw).context("Request body is not valid JSON")?)
        }
        None => None,
    };

    let mut config = ClientConfig::new(options.api_url).with_strict_envelopes(options.strict);
    if let Some(cookie) = options.session_cookie {
        config = config.with_session_cookie(cookie);
    }

    let client = if options.plaintext {
        ApiClient::new(config, PlaintextPayloads::new())
    } else {
        ApiClient::new(config, SealedPayloads::from_key(&load_key(options.payload_key)?))
    }
    .context("Failed to create API client")?;

    tracing::info!("{} {}", method, path);
    let response = client
        .dispatch(method, path, body.as_ref())
        .await
        .with_context(|| format!("Request to {} failed", path))?;

    match response {
        Some(value) => {
            let json = serde_json::to_string_pretty(&value).context("Failed to format response")?;
            write_output("-", json.as_bytes())?;
        }
        None => tracing::info!("Empty response body"),
    }

    Ok(())
}
