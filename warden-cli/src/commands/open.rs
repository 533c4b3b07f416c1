use anyhow::{Context, Result};
use warden_core::{Envelope, EnvelopeCodec};

use super::{load_key, read_input, write_output};

pub fn execute(payload_key: Option<&str>, input: &str, output: &str) -> Result<()> {
    let codec = EnvelopeCodec::new(&load_key(payload_key)?);

    tracing::debug!("Reading envelope from: {}", input);
    let raw = read_input(input).context("Failed to read input")?;
    let envelope: Envelope =
        serde_json::from_slice(&raw).context("Failed to parse envelope JSON")?;

    let value = codec.decode(&envelope).context("Decryption failed")?;
    let json = serde_json::to_string_pretty(&value).context("Failed to serialize JSON")?;

    write_output(output, json.as_bytes()).context("Failed to write output")?;

    tracing::info!("Envelope opened");
    Ok(())
}
