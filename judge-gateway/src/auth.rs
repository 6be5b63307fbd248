//! Request authentication: a JWT bearer token for user-facing calls, or
//! an internal API key (compared in constant time) for service-to-service
//! calls from the core service.

use jsonwebtoken::{decode, DecodingKey, Validation};
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

/// Decodes and validates an HS256 bearer token, returning its claims.
pub fn decode_jwt(token: &str, secret: &str) -> Result<Claims, jsonwebtoken::errors::Error> {
    let key = DecodingKey::from_secret(secret.as_bytes());
    let data = decode::<Claims>(token, &key, &Validation::default())?;
    Ok(data.claims)
}

/// Compares a presented internal API key against the configured one in
/// constant time, so response timing can't leak how many leading bytes
/// matched.
pub fn internal_key_matches(presented: &str, configured: &str) -> bool {
    presented.as_bytes().ct_eq(configured.as_bytes()).into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{encode, EncodingKey, Header};
    use std::time::{SystemTime, UNIX_EPOCH};

    fn exp_in_one_hour() -> usize {
        (SystemTime::now().duration_since(UNIX_EPOCH).unwrap().as_secs() + 3600) as usize
    }

    #[test]
    fn valid_token_decodes_to_its_claims() {
        let secret = "test-secret";
        let claims = Claims {
            sub: "user-1".to_string(),
            exp: exp_in_one_hour(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(secret.as_bytes()),
        )
        .unwrap();
        let decoded = decode_jwt(&token, secret).unwrap();
        assert_eq!(decoded.sub, "user-1");
    }

    #[test]
    fn token_signed_with_wrong_secret_is_rejected() {
        let claims = Claims {
            sub: "user-1".to_string(),
            exp: exp_in_one_hour(),
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"right-secret"),
        )
        .unwrap();
        assert!(decode_jwt(&token, "wrong-secret").is_err());
    }

    #[test]
    fn internal_key_comparison_requires_exact_match() {
        assert!(internal_key_matches("abc123", "abc123"));
        assert!(!internal_key_matches("abc124", "abc123"));
        assert!(!internal_key_matches("abc12", "abc123"));
    }
}
