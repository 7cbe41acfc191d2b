use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};

// Tokens live for a fixed window; there is no refresh or revocation.
pub const TOKEN_TTL_HOURS: i64 = 12;

// Signing and verification keys, derived once from the process-wide secret.
// Rotating the secret invalidates every outstanding token.
pub struct Keys {
    encoding: EncodingKey,
    decoding: DecodingKey,
}

impl Keys {
    pub fn new(secret: &[u8]) -> Self {
        Keys {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct Claims {
    sub: String,
    exp: i64,
}

#[derive(Debug, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("signature mismatch")]
    InvalidSignature,
    #[error("token expired")]
    Expired,
    #[error("malformed token")]
    Malformed,
}

// create access token carrying the subject username and an absolute expiry
pub fn issue(
    keys: &Keys,
    subject: &str,
    issued_at: DateTime<Utc>,
) -> Result<String, jsonwebtoken::errors::Error> {
    let expires_at = issued_at + Duration::hours(TOKEN_TTL_HOURS);
    let claims = Claims {
        sub: subject.to_owned(),
        exp: expires_at.timestamp(),
    };
    encode(&Header::default(), &claims, &keys.encoding)
}

// check signature and structure, then expiry against the supplied clock
pub fn verify(keys: &Keys, token: &str, now: DateTime<Utc>) -> Result<String, TokenError> {
    let mut validation = Validation::new(Algorithm::HS256);
    // expiry is compared below against the caller's clock, not the system's
    validation.validate_exp = false;

    let data =
        decode::<Claims>(token, &keys.decoding, &validation).map_err(|err| match err.kind() {
            ErrorKind::InvalidSignature => TokenError::InvalidSignature,
            _ => TokenError::Malformed,
        })?;

    if now.timestamp() >= data.claims.exp {
        return Err(TokenError::Expired);
    }

    Ok(data.claims.sub)
}
