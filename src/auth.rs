use crate::error::ApiError;
use crate::model::{Caller, Role};
use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use std::fmt;

#[derive(Debug, Clone, Serialize, Deserialize)]
struct Claims {
    /// Account id.
    sub: String,
    role: Role,
    exp: i64,
}

/// Issues and verifies the HS256 bearer tokens callers authenticate with.
#[derive(Clone)]
pub struct Authenticator {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl fmt::Debug for Authenticator {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Authenticator")
            .field("ttl", &self.ttl)
            .finish_non_exhaustive()
    }
}

impl Authenticator {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    pub fn issue(&self, caller: &Caller) -> Result<String, ApiError> {
        let claims = Claims {
            sub: caller.id.clone(),
            role: caller.role,
            exp: (Utc::now() + self.ttl).timestamp(),
        };
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|err| ApiError::Internal(err.into()))
    }

    pub fn verify(&self, token: &str) -> Result<Caller, ApiError> {
        let validation = Validation::new(Algorithm::HS256);
        let data = decode::<Claims>(token, &self.decoding, &validation).map_err(|err| {
            log::debug!("rejected token: {}", err);
            not_authorized()
        })?;
        Ok(Caller::new(data.claims.sub, data.claims.role))
    }
}

pub fn not_authorized() -> ApiError {
    ApiError::Unauthorized("Not authorized to access this route".to_string())
}
