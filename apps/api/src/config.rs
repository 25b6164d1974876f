use std::fmt;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Environment variable (and secrets-file key) holding the provider credential.
pub const API_KEY_VAR: &str = "GROQ_API_KEY";
/// Secrets file consulted when the environment has no credential.
pub const DEFAULT_SECRETS_PATH: &str = "secrets.toml";

/// Where the credential came from. Reported by the `credential` command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CredentialSource {
    Environment,
    SecretsFile(PathBuf),
    Missing,
}

impl fmt::Display for CredentialSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CredentialSource::Environment => write!(f, "environment ({API_KEY_VAR})"),
            CredentialSource::SecretsFile(path) => write!(f, "secrets file {}", path.display()),
            CredentialSource::Missing => write!(f, "not found"),
        }
    }
}

/// Application configuration, resolved once at startup and never mutated.
///
/// A missing credential is not a configuration error here: the LLM client
/// refuses to build without one, which keeps that failure in the
/// remote-service error kind.
#[derive(Clone)]
pub struct Config {
    pub groq_api_key: Option<String>,
    pub credential_source: CredentialSource,
    pub port: u16,
    pub rust_log: String,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("groq_api_key", &self.groq_api_key.as_deref().map(mask_secret))
            .field("credential_source", &self.credential_source)
            .field("port", &self.port)
            .field("rust_log", &self.rust_log)
            .finish()
    }
}

#[derive(Debug, Default, Deserialize)]
struct SecretsFile {
    #[serde(rename = "GROQ_API_KEY")]
    groq_api_key: Option<String>,
}

impl Config {
    pub fn from_env(secrets_path: &Path) -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let (groq_api_key, credential_source) =
            resolve_credential(std::env::var(API_KEY_VAR).ok(), secrets_path)?;

        Ok(Config {
            groq_api_key,
            credential_source,
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Environment value first, then the secrets file. Blank values count as absent.
/// A secrets file that does not exist is fine; one that exists but is not valid
/// TOML is an error.
pub fn resolve_credential(
    env_value: Option<String>,
    secrets_path: &Path,
) -> Result<(Option<String>, CredentialSource)> {
    if let Some(key) = non_blank(env_value) {
        return Ok((Some(key), CredentialSource::Environment));
    }

    if !secrets_path.exists() {
        return Ok((None, CredentialSource::Missing));
    }

    let raw = std::fs::read_to_string(secrets_path)
        .with_context(|| format!("Failed to read secrets file '{}'", secrets_path.display()))?;
    let secrets: SecretsFile = toml::from_str(&raw)
        .with_context(|| format!("Secrets file '{}' is not valid TOML", secrets_path.display()))?;

    Ok(match non_blank(secrets.groq_api_key) {
        Some(key) => (
            Some(key),
            CredentialSource::SecretsFile(secrets_path.to_path_buf()),
        ),
        None => (None, CredentialSource::Missing),
    })
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// Keeps the first four characters and elides the rest.
pub fn mask_secret(secret: &str) -> String {
    let visible: String = secret.chars().take(4).collect();
    if secret.chars().count() <= 4 {
        "****".to_string()
    } else {
        format!("{visible}****")
    }
}
