//! Bearer credential verification.
//!
//! The [`Authenticator`] is constructed explicitly at startup with the
//! verification key and passed into the request boundary; there is no
//! process-wide key state. Verification yields the caller [`Claims`],
//! while the raw token is kept alongside so it can be forwarded to the
//! remote image service.

use anyhow::{Context, Result};
use jsonwebtoken::{Algorithm, DecodingKey, Validation, decode};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Error;

/// Claims carried by an access token.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    /// Subject: the caller's user id.
    pub sub: String,
    /// Expiration time as a UNIX timestamp.
    pub exp: usize,
    #[serde(default)]
    pub email: Option<String>,
}

/// Verifies bearer tokens against a fixed verification key.
#[derive(Clone)]
pub struct Authenticator {
    key: DecodingKey,
    validation: Validation,
}

impl Authenticator {
    /// Build an authenticator from an RSA public key in PEM form (RS256).
    ///
    /// # Errors
    ///
    /// Returns an error if the PEM does not contain a valid RSA public key.
    pub fn from_rsa_pem(pem: &[u8]) -> Result<Self> {
        let key = DecodingKey::from_rsa_pem(pem).context("Failed to parse RSA public key PEM")?;
        Ok(Self {
            key,
            validation: Validation::new(Algorithm::RS256),
        })
    }

    /// Build an authenticator from a PEM file on disk.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or parsed.
    pub fn from_rsa_pem_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let pem = std::fs::read(path)
            .with_context(|| format!("Failed to read public key: {}", path.display()))?;
        Self::from_rsa_pem(&pem)
    }

    /// Build an HS256 authenticator from a shared secret.
    ///
    /// Intended for tests and local development where generating an RSA
    /// key pair is not worth the ceremony.
    pub fn hs256(secret: &[u8]) -> Self {
        Self {
            key: DecodingKey::from_secret(secret),
            validation: Validation::new(Algorithm::HS256),
        }
    }

    /// Verify a bearer token and return the caller's claims.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Unauthorized`] if the token is malformed, expired,
    /// or was not signed by the expected key.
    pub fn verify(&self, token: &str) -> Result<Claims, Error> {
        decode::<Claims>(token, &self.key, &self.validation)
            .map(|data| data.claims)
            .map_err(|e| Error::unauthorized(e.to_string()))
    }
}
