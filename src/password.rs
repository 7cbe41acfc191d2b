use std::num::NonZeroU32;

use base64::{engine::general_purpose, Engine as _};
use ring::digest;
use ring::pbkdf2;
use ring::rand::{SecureRandom, SystemRandom};

// Stored hashes are self-describing: scheme$iterations$salt$digest, all
// base64 except the iteration count.
const SCHEME: &str = "pbkdf2-sha256";
const SALT_LEN: usize = 16;
const CREDENTIAL_LEN: usize = digest::SHA256_OUTPUT_LEN;
const ITERATIONS: u32 = 100_000;

// Longest accepted password, in bytes. Matches the historical bcrypt limit
// the service has always enforced at signup.
pub const MAX_PASSWORD_BYTES: usize = 72;

static ALGORITHM: pbkdf2::Algorithm = pbkdf2::PBKDF2_HMAC_SHA256;

#[derive(Debug, thiserror::Error)]
pub enum HashError {
    #[error("Password longer than {MAX_PASSWORD_BYTES} bytes")]
    PasswordTooLong,
    #[error("Salt generation failed")]
    Rng,
}

// hash plain text password with a fresh random salt; the same password
// hashes to a different string every call
pub fn hash_password(password: &str) -> Result<String, HashError> {
    if password.len() > MAX_PASSWORD_BYTES {
        return Err(HashError::PasswordTooLong);
    }

    let mut salt = [0u8; SALT_LEN];
    SystemRandom::new()
        .fill(&mut salt)
        .map_err(|_| HashError::Rng)?;

    let mut derived = [0u8; CREDENTIAL_LEN];
    pbkdf2::derive(
        ALGORITHM,
        iterations(),
        &salt,
        password.as_bytes(),
        &mut derived,
    );

    Ok(format!(
        "{}${}${}${}",
        SCHEME,
        ITERATIONS,
        general_purpose::STANDARD_NO_PAD.encode(salt),
        general_purpose::STANDARD_NO_PAD.encode(derived),
    ))
}

// verify password during login; a mismatch or a malformed stored hash is
// false, never an error
pub fn verify_password(password: &str, stored: &str) -> bool {
    let parts: Vec<&str> = stored.split('$').collect();
    if parts.len() != 4 || parts[0] != SCHEME {
        return false;
    }

    let iterations = match parts[1].parse::<u32>().ok().and_then(NonZeroU32::new) {
        Some(n) => n,
        None => return false,
    };
    let salt = match general_purpose::STANDARD_NO_PAD.decode(parts[2]) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };
    let digest = match general_purpose::STANDARD_NO_PAD.decode(parts[3]) {
        Ok(bytes) => bytes,
        Err(_) => return false,
    };

    // ring compares in constant time
    pbkdf2::verify(ALGORITHM, iterations, &salt, password.as_bytes(), &digest).is_ok()
}

fn iterations() -> NonZeroU32 {
    NonZeroU32::new(ITERATIONS).unwrap()
}
