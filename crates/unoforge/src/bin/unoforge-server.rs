//! The unoforge server binary.
//!
//! Environment:
//! - `UNOFORGE_BIND`: listen address (default `0.0.0.0:3000`)
//! - `UNOFORGE_GRACE_SECS`: disconnect grace period in seconds (default 120)
//! - `RUST_LOG`: log filter (default `info`)

use std::time::Duration;

use tracing_subscriber::{EnvFilter, fmt, prelude::*};
use unoforge::prelude::*;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let bind = std::env::var("UNOFORGE_BIND").unwrap_or_else(|_| "0.0.0.0:3000".to_string());
    let mut registry_config = RegistryConfig::default();
    if let Ok(raw) = std::env::var("UNOFORGE_GRACE_SECS") {
        let secs: u64 = raw
            .parse()
            .map_err(|e| format!("UNOFORGE_GRACE_SECS must be a number of seconds: {e}"))?;
        registry_config.grace_period = Duration::from_secs(secs);
    }

    let server = UnoforgeServer::builder()
        .bind(&bind)
        .registry_config(registry_config)
        .build()
        .await?;
    tracing::info!(addr = %server.local_addr()?, "starting unoforge server");

    server.run().await?;
    Ok(())
}
