//! Environment-driven server configuration.

use std::env;
use std::path::Path;

use govdesk_auth::AuthConfig;
use govdesk_core::error::{GovError, GovResult};
use govdesk_db::DbConfig;

/// Complete runtime configuration for the server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub db: DbConfig,
    pub auth: AuthConfig,
    /// Whether to seed the demo dataset on startup.
    pub seed_demo: bool,
}

fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

fn read_pem(path_key: &str) -> GovResult<String> {
    let path = env::var(path_key)
        .map_err(|_| GovError::Internal(format!("{path_key} is not set")))?;
    std::fs::read_to_string(Path::new(&path))
        .map_err(|e| GovError::Internal(format!("cannot read {path}: {e}")))
}

impl ServerConfig {
    /// Load configuration from environment variables.
    ///
    /// Database settings fall back to local development defaults; the
    /// JWT key pair is required and read from the files named by
    /// `GOVDESK_JWT_PRIVATE_KEY_FILE` and `GOVDESK_JWT_PUBLIC_KEY_FILE`.
    pub fn from_env() -> GovResult<Self> {
        let defaults = DbConfig::default();
        let db = DbConfig {
            url: env_or("GOVDESK_DB_URL", &defaults.url),
            namespace: env_or("GOVDESK_DB_NAMESPACE", &defaults.namespace),
            database: env_or("GOVDESK_DB_DATABASE", &defaults.database),
            username: env_or("GOVDESK_DB_USERNAME", &defaults.username),
            password: env_or("GOVDESK_DB_PASSWORD", &defaults.password),
        };

        let auth_defaults = AuthConfig::default();
        let lifetime = match env::var("GOVDESK_TOKEN_LIFETIME_SECS") {
            Ok(raw) => raw.parse::<u64>().map_err(|e| {
                GovError::Internal(format!("invalid GOVDESK_TOKEN_LIFETIME_SECS: {e}"))
            })?,
            Err(_) => auth_defaults.access_token_lifetime_secs,
        };
        let auth = AuthConfig {
            jwt_private_key_pem: read_pem("GOVDESK_JWT_PRIVATE_KEY_FILE")?,
            jwt_public_key_pem: read_pem("GOVDESK_JWT_PUBLIC_KEY_FILE")?,
            access_token_lifetime_secs: lifetime,
            jwt_issuer: env_or("GOVDESK_JWT_ISSUER", &auth_defaults.jwt_issuer),
            pepper: env::var("GOVDESK_PASSWORD_PEPPER").ok(),
        };

        let seed_demo = env_or("GOVDESK_SEED_DEMO", "true") == "true";

        Ok(Self {
            db,
            auth,
            seed_demo,
        })
    }
}
