use anyhow::{Context, Result};
use serde_json::Value;
use warden_core::EnvelopeCodec;

use super::{load_key, read_input, write_output};

pub fn execute(payload_key: Option<&str>, input: &str, output: &str) -> Result<()> {
    let codec = EnvelopeCodec::new(&load_key(payload_key)?);

    tracing::debug!("Reading JSON from: {}", input);
    let raw = read_input(input).context("Failed to read input")?;
    let value: Value = serde_json::from_slice(&raw).context("Input is not valid JSON")?;

    let envelope = codec.encode(&value).context("Encryption failed")?;
    let json = serde_json::to_string_pretty(&envelope).context("Failed to serialize envelope")?;

    write_output(output, json.as_bytes()).context("Failed to write output")?;

    tracing::info!("Sealed {} bytes of JSON", raw.len());
    Ok(())
}
