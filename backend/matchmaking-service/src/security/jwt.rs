use anyhow::{anyhow, Result};
/// JWT validation using RS256 (RSA with SHA-256). This service only
/// validates tokens minted by the identity service; it never issues them,
/// so only the public key is loaded.
use jsonwebtoken::{decode, Algorithm, DecodingKey, TokenData, Validation};
use lazy_static::lazy_static;
use serde::{Deserialize, Serialize};
use std::sync::RwLock;

/// JWT Claims structure
#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct Claims {
    /// Subject (user ID)
    pub sub: String,
    /// Issued at (Unix timestamp)
    pub iat: i64,
    /// Expiration time (Unix timestamp)
    pub exp: i64,
    /// Token type: "access" or "refresh"
    pub token_type: String,
}

lazy_static! {
    static ref DECODING_KEY: RwLock<Option<DecodingKey>> = RwLock::new(None);
}

/// Load the validation key from a PEM-formatted string. Must be called
/// during application startup before any token validation.
pub fn initialize_validation_key(public_key_pem: &str) -> Result<()> {
    let decoding_key = DecodingKey::from_rsa_pem(public_key_pem.as_bytes())
        .map_err(|e| anyhow!("Failed to load public key from environment: {}", e))?;

    let mut key = DECODING_KEY
        .write()
        .map_err(|e| anyhow!("Failed to acquire write lock on JWT key: {}", e))?;
    *key = Some(decoding_key);

    Ok(())
}

/// Validate an access token and return its claims.
pub fn validate_token(token: &str) -> Result<TokenData<Claims>> {
    let key_guard = DECODING_KEY
        .read()
        .map_err(|e| anyhow!("Failed to acquire read lock on JWT key: {}", e))?;

    let decoding_key = key_guard
        .as_ref()
        .ok_or_else(|| anyhow!("JWT validation key not initialized"))?;

    let mut validation = Validation::new(Algorithm::RS256);
    validation.validate_exp = true;

    let token_data = decode::<Claims>(token, decoding_key, &validation)
        .map_err(|e| anyhow!("Token validation failed: {}", e))?;

    if token_data.claims.token_type != "access" {
        return Err(anyhow!("Expected an access token"));
    }

    Ok(token_data)
}
