pub mod keygen;
pub mod open;
pub mod request;
pub mod seal;

use anyhow::{Context, Result};
use std::fs::File;
use std::io::{self, Read, Write};
use warden_core::PayloadKey;

pub(crate) fn load_key(payload_key: Option<&str>) -> Result<PayloadKey> {
    let encoded = payload_key
        .context("No payload key configured (set --payload-key or WARDEN_PAYLOAD_KEY)")?;
    PayloadKey::from_base64(encoded).context("Invalid payload key")
}

pub(crate) fn read_input(path: &str) -> Result<Vec<u8>> {
    let mut buffer = Vec::new();
    if path == "-" {
        tracing::debug!("Reading from stdin");
        io::stdin().read_to_end(&mut buffer)?;
    } else {
        tracing::debug!("Reading from file: {}", path);
        File::open(path)?.read_to_end(&mut buffer)?;
    }
    Ok(buffer)
}

pub(crate) fn write_output(path: &str, data: &[u8]) -> Result<()> {
    if path == "-" {
        tracing::debug!("Writing to stdout");
        let mut stdout = io::stdout().lock();
        stdout.write_all(data)?;
        stdout.write_all(b"\n")?;
    } else {
        tracing::debug!("Writing to file: {}", path);
        File::create(path)?.write_all(data)?;
    }
    Ok(())
}
