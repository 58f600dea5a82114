use chrono::{Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation};

use super::SessionClaims;
use crate::config::GatewayConfig;
use crate::repository::User;
use crate::AuthError;

/// Signs, verifies, and decodes session tokens. Pure; no I/O.
#[derive(Clone)]
pub struct TokenCodec {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    expiry: Duration,
}

impl TokenCodec {
    pub fn new(config: &GatewayConfig) -> Self {
        let secret = config.secret().expose_secret().as_bytes();
        Self {
            encoding_key: EncodingKey::from_secret(secret),
            decoding_key: DecodingKey::from_secret(secret),
            expiry: config.token_expiry(),
        }
    }

    /// Signs a claims value as-is. Deterministic given its inputs.
    pub fn generate(&self, claims: &SessionClaims) -> Result<String, AuthError> {
        jsonwebtoken::encode(&Header::default(), claims, &self.encoding_key)
            .map_err(|_| AuthError::TokenInvalid)
    }

    /// Projects a user into claims with a fresh expiry and signs them.
    /// Every issuance and reissuance path goes through here.
    pub fn issue(&self, user: &User, access_token: Option<String>) -> Result<String, AuthError> {
        let claims = self.stamp(SessionClaims::from_user(user, access_token));
        self.generate(&claims)
    }

    /// Fills in `iat` and `exp` on a claims value.
    pub fn stamp(&self, mut claims: SessionClaims) -> SessionClaims {
        let now = Utc::now();
        claims.iat = now.timestamp();
        claims.exp = (now + self.expiry).timestamp();
        claims
    }

    /// Structural decode for inspection: checks shape, not signature or
    /// expiry. Callers must not treat success as proof of authenticity.
    pub fn decode(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.insecure_disable_signature_validation();
        validation.validate_exp = false;

        jsonwebtoken::decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|_| AuthError::TokenInvalid)
    }

    /// True only if the signature matches and the token is unexpired.
    pub fn verify(&self, token: &str) -> bool {
        self.decode_verified(token).is_ok()
    }

    /// Full decode: signature and expiry enforced. This is the path
    /// refresh and authenticated routes rely on.
    pub fn decode_verified(&self, token: &str) -> Result<SessionClaims, AuthError> {
        let validation = Validation::new(Algorithm::HS256);

        jsonwebtoken::decode::<SessionClaims>(token, &self.decoding_key, &validation)
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                jsonwebtoken::errors::ErrorKind::ExpiredSignature => AuthError::TokenExpired,
                _ => AuthError::TokenInvalid,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SlackConfig;
    use crate::repository::{AuthSource, UserStatus};
    use std::collections::HashSet;

    fn codec() -> TokenCodec {
        let config = GatewayConfig::new(
            "test-secret-32-bytes-long-key-01",
            "http://localhost",
            SlackConfig::new("id", "secret"),
        )
        .unwrap();
        TokenCodec::new(&config)
    }

    fn codec_with_secret(secret: &str) -> TokenCodec {
        let config = GatewayConfig::new(
            secret,
            "http://localhost",
            SlackConfig::new("id", "secret"),
        )
        .unwrap();
        TokenCodec::new(&config)
    }

    fn test_user() -> User {
        let now = Utc::now();
        User {
            id: "U123".to_owned(),
            org_id: "T999".to_owned(),
            email: "user@example.com".to_owned(),
            name: "Test User".to_owned(),
            hashed_password: None,
            auth_source: AuthSource::Email,
            status: UserStatus::Active,
            invite_secret_hash: None,
            teams: HashSet::from(["team-a".to_owned(), "team-b".to_owned()]),
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_roundtrip() {
        let codec = codec();
        let claims = codec.stamp(SessionClaims::from_user(&test_user(), None));

        let token = codec.generate(&claims).unwrap();
        let decoded = codec.decode(&token).unwrap();

        assert_eq!(decoded, claims);
        assert_eq!(decoded.teams, vec!["team-a".to_owned(), "team-b".to_owned()]);
    }

    #[test]
    fn test_verify_issued_token() {
        let codec = codec();
        let token = codec.issue(&test_user(), None).unwrap();
        assert!(codec.verify(&token));
    }

    #[test]
    fn test_tampered_token_fails_verify() {
        let codec = codec();
        let token = codec.issue(&test_user(), None).unwrap();

        // flip one character anywhere in the token
        let mut bytes = token.into_bytes();
        let i = bytes.len() / 2;
        bytes[i] = if bytes[i] == b'a' { b'b' } else { b'a' };
        let tampered = String::from_utf8(bytes).unwrap();

        assert!(!codec.verify(&tampered));
    }

    #[test]
    fn test_wrong_secret_fails_verify_but_decodes() {
        let codec1 = codec_with_secret("test-secret-32-bytes-long-key-02");
        let codec2 = codec_with_secret("test-secret-32-bytes-long-key-03");

        let token = codec1.issue(&test_user(), None).unwrap();

        // structural decode still works, trust does not
        assert!(codec2.decode(&token).is_ok());
        assert!(!codec2.verify(&token));
        assert_eq!(
            codec2.decode_verified(&token).unwrap_err(),
            AuthError::TokenInvalid
        );
    }

    #[test]
    fn test_expired_token() {
        let codec = codec();
        let mut claims = SessionClaims::from_user(&test_user(), None);
        claims.iat = Utc::now().timestamp() - 7200;
        claims.exp = Utc::now().timestamp() - 3600;

        let token = codec.generate(&claims).unwrap();

        assert!(!codec.verify(&token));
        assert_eq!(codec.decode_verified(&token).unwrap_err(), AuthError::TokenExpired);
        // inspection path ignores expiry
        assert!(codec.decode(&token).is_ok());
    }

    #[test]
    fn test_malformed_token() {
        let codec = codec();
        assert_eq!(codec.decode("not-a-token").unwrap_err(), AuthError::TokenInvalid);
        assert!(!codec.verify("not-a-token"));
    }

    #[test]
    fn test_slack_claims_carry_access_token() {
        let codec = codec();
        let mut user = test_user();
        user.auth_source = AuthSource::Slack;

        let token = codec.issue(&user, Some("xoxp-123".to_owned())).unwrap();
        let decoded = codec.decode(&token).unwrap();

        assert_eq!(decoded.src, AuthSource::Slack);
        assert_eq!(decoded.access_token.as_deref(), Some("xoxp-123"));
    }
}
