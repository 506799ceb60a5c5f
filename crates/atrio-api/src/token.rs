use anyhow::Result;
use chrono::{Duration, Utc};
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use uuid::Uuid;

use atrio_types::api::Claims;

/// Issues and verifies the signed admin session tokens.
///
/// Verification is stateless: there is no revocation list, so an issued
/// token stays valid until its expiry even after a password change.
pub struct TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl TokenService {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// Expiry is a fixed duration from issuance, not sliding.
    pub fn issue(&self, admin_id: Uuid, username: &str) -> Result<String> {
        let claims = Claims {
            sub: admin_id,
            username: username.to_string(),
            exp: (Utc::now() + self.ttl).timestamp() as usize,
        };

        let token = encode(&Header::default(), &claims, &self.encoding)?;
        Ok(token)
    }

    /// Fails on signature mismatch, malformed input, or expiry.
    pub fn verify(&self, token: &str) -> Result<Claims> {
        let data = decode::<Claims>(token, &self.decoding, &Validation::default())?;
        Ok(data.claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn service() -> TokenService {
        TokenService::new("test-secret", Duration::hours(24))
    }

    #[test]
    fn issue_then_verify_roundtrip() {
        let tokens = service();
        let id = Uuid::new_v4();

        let token = tokens.issue(id, "admin").unwrap();
        let claims = tokens.verify(&token).unwrap();

        assert_eq!(claims.sub, id);
        assert_eq!(claims.username, "admin");
        assert!(claims.exp > Utc::now().timestamp() as usize);
    }

    #[test]
    fn rejects_token_signed_with_other_secret() {
        let theirs = TokenService::new("other-secret", Duration::hours(24));
        let token = theirs.issue(Uuid::new_v4(), "admin").unwrap();

        assert!(service().verify(&token).is_err());
    }

    #[test]
    fn rejects_expired_token_despite_valid_signature() {
        // Signed with the right secret but well past the default leeway
        let claims = Claims {
            sub: Uuid::new_v4(),
            username: "admin".to_string(),
            exp: (Utc::now() - Duration::hours(2)).timestamp() as usize,
        };
        let token = encode(
            &Header::default(),
            &claims,
            &EncodingKey::from_secret(b"test-secret"),
        )
        .unwrap();

        assert!(service().verify(&token).is_err());
    }

    #[test]
    fn rejects_malformed_token() {
        assert!(service().verify("not.a.jwt").is_err());
        assert!(service().verify("").is_err());
    }
}
