use argon2::{
    password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Algorithm, Argon2, Params, Version,
};

/// Default Argon2id cost: 19MB memory, 2 iterations, parallelism 1.
pub fn default_params() -> Result<Params, String> {
    Params::new(19 * 1024, 2, 1, None).map_err(|e| format!("Invalid params: {e}"))
}

/// Hash a password using Argon2id with the default cost.
pub fn hash(password: &str) -> Result<String, String> {
    hash_with_params(password, default_params()?)
}

/// Hash a password using Argon2id with the given cost.
pub fn hash_with_params(password: &str, params: Params) -> Result<String, String> {
    let salt = SaltString::generate(&mut OsRng);
    let argon2 = Argon2::new(Algorithm::Argon2id, Version::V0x13, params);

    argon2
        .hash_password(password.as_bytes(), &salt)
        .map(|h| h.to_string())
        .map_err(|e| format!("Hashing failed: {e}"))
}

/// Cost parameters recorded in an existing hash, if it is a parseable Argon2 hash.
pub fn cost_params(hash: &str) -> Option<Params> {
    let parsed = PasswordHash::new(hash).ok()?;
    Params::try_from(&parsed).ok()
}

/// Verify a password against a hash.
pub fn verify(password: &str, hash: &str) -> Result<bool, String> {
    let parsed = PasswordHash::new(hash).map_err(|e| format!("Invalid hash: {e}"))?;
    Ok(Argon2::default()
        .verify_password(password.as_bytes(), &parsed)
        .is_ok())
}
