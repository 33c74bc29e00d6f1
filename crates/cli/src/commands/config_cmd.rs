//! `inkwell config` — Print the effective configuration.

use inkwell_config::AppConfig;

pub fn show(config: &AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", render(config));
    Ok(())
}

/// Effective config as TOML, with the credential pepper masked.
fn render(config: &AppConfig) -> String {
    let mut shown = config.clone();
    if shown.auth.credential_pepper.is_some() {
        shown.auth.credential_pepper = Some("***".into());
    }
    shown.to_toml()
}
