use anyhow::Result;
use warden_core::PayloadKey;

pub fn execute() -> Result<()> {
    let key = PayloadKey::generate();
    println!("{}", key.to_base64());
    tracing::info!("Generated new payload key");
    Ok(())
}
