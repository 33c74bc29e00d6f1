//! `inkwell serve` — Start the HTTP API server.

use inkwell_config::AppConfig;
use inkwell_service::{CredentialHasher, Services};

pub async fn run(
    mut config: AppConfig,
    port_override: Option<u16>,
) -> Result<(), Box<dyn std::error::Error>> {
    if let Some(port) = port_override {
        config.server.port = port;
        config.validate()?;
    }

    let stores = inkwell_store::open(&config.database).await?;
    let hasher = CredentialHasher::new(config.auth.credential_pepper.as_deref());
    let services = Services::new(&stores, hasher);

    println!("🖋  Inkwell v{}", env!("CARGO_PKG_VERSION"));
    println!("   Listening: {}:{}", config.server.host, config.server.port);
    println!(
        "   Store:     {} ({})",
        config.database.backend,
        stores.assessments.name()
    );
    println!("   CORS:      {}", config.cors.allowed_origins.join(", "));

    inkwell_gateway::start(config, services).await?;

    Ok(())
}
