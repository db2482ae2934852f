use bcrypt::{hash, verify, DEFAULT_COST};

pub fn hash_password(password: &str) -> Result<String, anyhow::Error> {
    hash(password, DEFAULT_COST).map_err(|e| anyhow::anyhow!("password hashing failed: {:?}", e))
}

/// A hash that fails to parse counts as a mismatch, not an error; stored
/// credentials predating a format change simply stop verifying.
pub fn verify_password(password: &str, hash: &str) -> Result<bool, anyhow::Error> {
    Ok(verify(password, hash).unwrap_or(false))
}
