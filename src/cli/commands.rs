//! CLI command implementations

use anyhow::Result;
use std::fs;
use std::path::{Path, PathBuf};

use crate::auth::{PasswordHasher, RouteAuthorizationPolicy};
use crate::cli::{error, format_requirement, info, success, warn};
use crate::config::{self, Config};

/// Load from an explicit path or search upward for medauth.toml
fn resolve_config(path: Option<PathBuf>) -> Result<Config> {
    let config = match path {
        Some(path) => config::load_config_from_path(&path)?,
        None => config::load_config()?,
    };
    Ok(config)
}

/// Initialize a new medauth.toml configuration file
pub async fn init() -> Result<()> {
    let config_path = Path::new(config::loader::CONFIG_FILENAME);

    if config_path.exists() {
        warn("medauth.toml already exists");
        return Ok(());
    }

    let content = config::loader::default_config_content();
    fs::write(config_path, content)?;

    success("Created medauth.toml");
    info("Set auth.jwt_secret (or MEDAUTH_JWT_SECRET) and run 'medauth serve'");

    Ok(())
}

/// Start the HTTP API server
pub async fn serve(host: Option<String>, port: Option<u16>, config: Option<PathBuf>) -> Result<()> {
    let config = resolve_config(config)?;
    let host = host.unwrap_or_else(|| config.server.host.clone());
    let port = port.unwrap_or(config.server.port);

    info(&format!("Starting server at http://{}:{}", host, port));

    if let Err(e) = crate::api::run_server(config, &host, port).await {
        error(&e.to_string());
        return Err(e.into());
    }
    Ok(())
}

/// Print a bcrypt hash of a password
pub fn hash_password(password: &str, cost: u32) -> Result<()> {
    let hash = PasswordHasher::new(cost).hash(password)?;
    println!("{}", hash);
    Ok(())
}

/// Print the requirement resolved for a path
pub fn route(path: &str, config: Option<PathBuf>) -> Result<()> {
    let config = resolve_config(config)?;
    let policy = RouteAuthorizationPolicy::from_rules(&config.route_rules())?;

    println!("{} -> {}", path, format_requirement(policy.requirement_for(path)));
    Ok(())
}
