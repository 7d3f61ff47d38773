//! Configuration for the picgate gateway.
//!
//! Settings are loaded from a TOML file (`picgate.toml` by default) and
//! validated before startup. All sections have defaults suitable for
//! development use.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

use crate::reconcile::PatchOrdering;

/// Default port the gateway listens on.
pub const DEFAULT_PORT: u16 = 8319;

/// Result of configuration validation.
#[derive(Debug, Default)]
pub struct ValidationResult {
    /// Non-fatal warnings that should be logged but don't prevent operation.
    pub warnings: Vec<String>,
}

impl ValidationResult {
    /// Returns true if there are any warnings.
    #[must_use]
    pub fn has_warnings(&self) -> bool {
        !self.warnings.is_empty()
    }
}

/// picgate.toml configuration structure.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub remote: RemoteConfig,
    pub auth: AuthConfig,
    pub store: StoreConfig,
    pub reconcile: ReconcileConfig,
}

/// HTTP server settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: DEFAULT_PORT,
        }
    }
}

/// Remote image service endpoints.
///
/// `api_base` carries the authenticated CRUD API; `public_base` is the
/// base of canonical public image URLs and of the read endpoint.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    pub api_base: String,
    pub public_base: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            api_base: "https://courselab.lnu.se/picture-it/images/api/v1".to_string(),
            public_base: "https://courselab.lnu.se/picture-it/images/public".to_string(),
        }
    }
}

/// Bearer credential verification settings.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// PEM file holding the RSA public key that signed access tokens.
    pub public_key_path: PathBuf,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            public_key_path: PathBuf::from("keys/public.pem"),
        }
    }
}

/// Metadata store settings.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct StoreConfig {
    /// Path to the redb database file. Defaults to
    /// `~/.picgate/images.redb` when unset.
    pub path: Option<PathBuf>,
}

impl StoreConfig {
    /// Resolve the database path, falling back to the per-user default.
    ///
    /// # Errors
    ///
    /// Returns an error if no path is configured and the home directory
    /// cannot be determined.
    pub fn resolve_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.path {
            return Ok(path.clone());
        }
        let home = dirs::home_dir().context("Failed to determine home directory")?;
        Ok(home.join(".picgate").join("images.redb"))
    }
}

/// Reconciliation policy knobs.
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
pub struct ReconcileConfig {
    /// Ordering of the local write relative to the remote confirmation
    /// on PATCH. `after-confirm` is the default and the safe choice.
    pub patch_ordering: PatchOrdering,
}

impl Config {
    /// Load configuration from the specified path.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - The file cannot be read (IO error)
    /// - The file contains invalid TOML syntax
    /// - Required fields are missing or have invalid types
    pub fn load_from<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    /// Validate configuration with comprehensive checks.
    ///
    /// Returns a `ValidationResult` containing any non-fatal warnings.
    ///
    /// # Errors
    ///
    /// Returns an error if validation fails with one or more errors:
    /// - Port 0
    /// - Remote endpoints that do not parse as http(s) URLs
    pub fn validate(&self) -> Result<ValidationResult> {
        let mut errors = Vec::new();
        let mut warnings = Vec::new();

        if self.server.port == 0 {
            errors.push("server.port cannot be 0".to_string());
        }

        for (name, value) in [
            ("remote.api_base", &self.remote.api_base),
            ("remote.public_base", &self.remote.public_base),
        ] {
            match Url::parse(value) {
                Ok(url) => {
                    if !matches!(url.scheme(), "http" | "https") {
                        errors.push(format!("{name} must use http or https (got: '{value}')"));
                    }
                    if value.ends_with('/') {
                        warnings.push(format!("{name} has a trailing slash; it will be trimmed"));
                    }
                },
                Err(e) => errors.push(format!("{name} is not a valid URL: {e}")),
            }
        }

        if !errors.is_empty() {
            anyhow::bail!(
                "Configuration validation failed:\n  - {}",
                errors.join("\n  - ")
            );
        }

        Ok(ValidationResult { warnings })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        let result = config.validate().unwrap();
        assert!(!result.has_warnings());
        assert_eq!(config.server.port, DEFAULT_PORT);
    }

    #[test]
    fn test_parse_full_config() {
        let toml = r#"
            [server]
            host = "0.0.0.0"
            port = 9000

            [remote]
            api_base = "https://images.example.com/api/v1"
            public_base = "https://images.example.com/public"

            [auth]
            public_key_path = "/etc/picgate/public.pem"

            [store]
            path = "/var/lib/picgate/images.redb"

            [reconcile]
            patch_ordering = "before-confirm"
        "#;
        let config: Config = toml::from_str(toml).unwrap();
        assert_eq!(config.server.port, 9000);
        assert_eq!(config.reconcile.patch_ordering, PatchOrdering::BeforeConfirm);
        config.validate().unwrap();
    }

    #[test]
    fn test_rejects_non_http_remote() {
        let mut config = Config::default();
        config.remote.api_base = "ftp://images.example.com".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_trailing_slash_warns() {
        let mut config = Config::default();
        config.remote.public_base = "https://images.example.com/public/".to_string();
        let result = config.validate().unwrap();
        assert!(result.has_warnings());
    }

    #[test]
    fn test_rejects_port_zero() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }
}
