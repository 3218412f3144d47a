// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! RS256 access token issuance and verification.
//!
//! ## Verification order
//!
//! 1. Structure: exactly three non-empty base64url segments (`Malformed`)
//! 2. Signature over `header.payload` with the public key (`BadSignature`)
//! 3. Payload decoding into [`Claims`] (`Malformed`)
//! 4. Expiry against the caller's clock, `now >= exp` (`Expired`)
//!
//! Expiry is checked here rather than by `jsonwebtoken` so that the boundary
//! is exact (no leeway) and testable with an explicit clock.

use std::sync::Arc;
use std::time::Duration;

use base64ct::{Base64UrlUnpadded, Encoding};
use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{decode, encode, Algorithm, Header, Validation};

use super::claims::Claims;
use super::keys::KeyMaterial;

/// Default token lifetime (3,600,000 ms).
pub const DEFAULT_TOKEN_TTL: Duration = Duration::from_secs(3600);

const MIN_TOKEN_TTL: Duration = Duration::from_secs(1);

/// Longest accepted token lifetime (30 days).
pub const MAX_TOKEN_TTL: Duration = Duration::from_secs(30 * 24 * 60 * 60);

/// Why a presented token was refused.
///
/// All variants map to the same client-visible 401; the variant only shows up
/// in logs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token is malformed")]
    Malformed,
    #[error("token signature is invalid")]
    BadSignature,
    #[error("token has expired")]
    Expired,
}

impl TokenError {
    pub fn error_code(&self) -> &'static str {
        match self {
            TokenError::Malformed => "malformed_token",
            TokenError::BadSignature => "invalid_signature",
            TokenError::Expired => "token_expired",
        }
    }
}

/// Token could not be minted.
#[derive(Debug, thiserror::Error)]
pub enum SigningError {
    #[error("failed to sign token: {0}")]
    Sign(#[from] jsonwebtoken::errors::Error),

    #[error("token lifetime of {0:?} does not fit the clock")]
    Lifetime(Duration),
}

/// Issues and verifies access tokens with the process key pair.
#[derive(Debug, Clone)]
pub struct TokenService {
    keys: Arc<KeyMaterial>,
    ttl: Duration,
    validation: Validation,
}

impl TokenService {
    pub fn new(keys: Arc<KeyMaterial>) -> Self {
        let mut validation = Validation::new(Algorithm::RS256);
        validation.validate_exp = false;
        validation.validate_aud = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["sub", "iat", "exp"]);

        Self {
            keys,
            ttl: DEFAULT_TOKEN_TTL,
            validation,
        }
    }

    /// Override the token lifetime, clamped to one second ..= [`MAX_TOKEN_TTL`]
    /// so that `exp > iat` always holds.
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl.clamp(MIN_TOKEN_TTL, MAX_TOKEN_TTL);
        self
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    pub fn keys(&self) -> &KeyMaterial {
        &self.keys
    }

    /// Mint a token for `subject` valid from now for the configured lifetime.
    pub fn issue(&self, subject: &str, roles: &[String]) -> Result<String, SigningError> {
        self.issue_at(subject, roles, Utc::now())
    }

    pub fn issue_at(
        &self,
        subject: &str,
        roles: &[String],
        now: DateTime<Utc>,
    ) -> Result<String, SigningError> {
        let expires_at = chrono::Duration::from_std(self.ttl)
            .ok()
            .and_then(|ttl| now.checked_add_signed(ttl))
            .ok_or(SigningError::Lifetime(self.ttl))?;
        let claims = Claims::new(subject, roles.to_vec(), now, expires_at);

        let mut header = Header::new(Algorithm::RS256);
        header.kid = Some(self.keys.key_id().to_string());

        Ok(encode(&header, &claims, self.keys.private_key())?)
    }

    /// Verify a token against the current time.
    pub fn verify(&self, token: &str) -> Result<Claims, TokenError> {
        self.verify_at(token, Utc::now())
    }

    pub fn verify_at(&self, token: &str, now: DateTime<Utc>) -> Result<Claims, TokenError> {
        check_structure(token)?;

        let claims = decode::<Claims>(token, self.keys.public_key(), &self.validation)
            .map_err(|e| classify(e.kind()))?
            .claims;

        if claims.is_expired_at(now) {
            return Err(TokenError::Expired);
        }

        Ok(claims)
    }

    /// Check that `token` verifies and names `expected_subject`.
    ///
    /// Returns false on any mismatch or verification failure; never errors.
    pub fn validate_subject(&self, token: &str, expected_subject: &str) -> bool {
        self.validate_subject_at(token, expected_subject, Utc::now())
    }

    pub fn validate_subject_at(
        &self,
        token: &str,
        expected_subject: &str,
        now: DateTime<Utc>,
    ) -> bool {
        match self.verify_at(token, now) {
            Ok(claims) => claims.subject() == expected_subject,
            Err(_) => false,
        }
    }
}

fn check_structure(token: &str) -> Result<(), TokenError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() != 3 {
        return Err(TokenError::Malformed);
    }
    for segment in segments {
        if segment.is_empty() || Base64UrlUnpadded::decode_vec(segment).is_err() {
            return Err(TokenError::Malformed);
        }
    }
    Ok(())
}

fn classify(kind: &ErrorKind) -> TokenError {
    match kind {
        ErrorKind::InvalidSignature | ErrorKind::InvalidAlgorithm => TokenError::BadSignature,
        ErrorKind::ExpiredSignature => TokenError::Expired,
        _ => TokenError::Malformed,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::shared_keys;
    use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine};
    use chrono::TimeZone;
    use proptest::prelude::*;

    fn service() -> TokenService {
        TokenService::new(shared_keys())
    }

    fn fixed_now() -> DateTime<Utc> {
        Utc.timestamp_opt(1_760_000_000, 0).unwrap()
    }

    fn roles(names: &[&str]) -> Vec<String> {
        names.iter().map(|r| r.to_string()).collect()
    }

    #[test]
    fn issue_then_verify_round_trips() {
        let tokens = service();
        let token = tokens
            .issue("ana@example.com", &roles(&["ROLE_USER", "ROLE_MANAGER"]))
            .unwrap();

        let claims = tokens.verify(&token).unwrap();
        assert_eq!(claims.sub, "ana@example.com");
        assert_eq!(claims.roles, roles(&["ROLE_USER", "ROLE_MANAGER"]));
        assert_eq!(claims.exp - claims.iat, 3600);
    }

    #[test]
    fn token_has_three_segments_and_kid() {
        let tokens = service();
        let token = tokens.issue("ana", &[]).unwrap();
        assert_eq!(token.split('.').count(), 3);

        let header = jsonwebtoken::decode_header(&token).unwrap();
        assert_eq!(header.alg, Algorithm::RS256);
        assert_eq!(header.kid.as_deref(), Some(tokens.keys().key_id()));
    }

    #[test]
    fn unknown_roles_pass_through() {
        let tokens = service();
        let token = tokens.issue("ana", &roles(&["ROLE_TICKET_TRIAGE"])).unwrap();
        assert_eq!(tokens.verify(&token).unwrap().roles, roles(&["ROLE_TICKET_TRIAGE"]));
    }

    #[test]
    fn valid_until_one_second_before_expiry() {
        let tokens = service();
        let now = fixed_now();
        let token = tokens.issue_at("ana", &roles(&["USER"]), now).unwrap();
        let exp = now + chrono::Duration::seconds(3600);

        assert!(tokens.verify_at(&token, now).is_ok());
        assert!(tokens.verify_at(&token, exp - chrono::Duration::seconds(1)).is_ok());
        assert_eq!(tokens.verify_at(&token, exp), Err(TokenError::Expired));
        assert_eq!(
            tokens.verify_at(&token, exp + chrono::Duration::days(1)),
            Err(TokenError::Expired)
        );
    }

    #[test]
    fn custom_ttl_is_applied() {
        let tokens = service().with_ttl(Duration::from_secs(60));
        let token = tokens.issue_at("ana", &[], fixed_now()).unwrap();
        let claims = tokens.verify_at(&token, fixed_now()).unwrap();
        assert_eq!(claims.exp - claims.iat, 60);
    }

    #[test]
    fn zero_ttl_is_raised_to_one_second() {
        assert_eq!(service().with_ttl(Duration::ZERO).ttl(), Duration::from_secs(1));
    }

    #[test]
    fn huge_ttl_is_capped_and_tokens_stay_valid() {
        for ttl in [Duration::from_secs(u64::MAX), Duration::from_secs(i64::MAX as u64)] {
            let tokens = service().with_ttl(ttl);
            assert_eq!(tokens.ttl(), MAX_TOKEN_TTL);

            let token = tokens.issue("ana", &roles(&["USER"])).unwrap();
            let claims = tokens.verify(&token).unwrap();
            assert!(claims.exp > claims.iat);
            assert_eq!(claims.exp - claims.iat, MAX_TOKEN_TTL.as_secs() as i64);
        }
    }

    #[test]
    fn expiry_past_the_end_of_time_is_a_signing_error() {
        let tokens = service();
        let near_end = DateTime::<Utc>::MAX_UTC - chrono::Duration::seconds(10);
        let result = tokens.issue_at("ana", &[], near_end);
        assert!(matches!(result, Err(SigningError::Lifetime(_))));
    }

    #[test]
    fn every_flipped_signature_byte_is_rejected() {
        let tokens = service();
        let token = tokens.issue("ana", &roles(&["USER"])).unwrap();
        let (signed, signature) = token.rsplit_once('.').unwrap();
        let signature = URL_SAFE_NO_PAD.decode(signature).unwrap();

        for index in 0..signature.len() {
            let mut tampered = signature.clone();
            tampered[index] ^= 0x01;
            let forged = format!("{signed}.{}", URL_SAFE_NO_PAD.encode(&tampered));
            assert_eq!(tokens.verify(&forged), Err(TokenError::BadSignature), "byte {index}");
        }
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let tokens = service();
        let token = tokens.issue("ana", &roles(&["USER"])).unwrap();
        let parts: Vec<&str> = token.split('.').collect();

        let mut payload: serde_json::Value =
            serde_json::from_slice(&URL_SAFE_NO_PAD.decode(parts[1]).unwrap()).unwrap();
        payload["roles"] = serde_json::json!(["ADMIN"]);
        let forged_payload = URL_SAFE_NO_PAD.encode(serde_json::to_vec(&payload).unwrap());
        let forged = format!("{}.{}.{}", parts[0], forged_payload, parts[2]);

        assert_eq!(tokens.verify(&forged), Err(TokenError::BadSignature));
    }

    #[test]
    fn token_from_other_key_is_rejected() {
        let other = TokenService::new(Arc::new(KeyMaterial::generate().unwrap()));
        let token = other.issue("ana", &roles(&["ADMIN"])).unwrap();
        assert_eq!(service().verify(&token), Err(TokenError::BadSignature));
    }

    #[test]
    fn symmetric_algorithm_is_rejected() {
        let claims = Claims {
            sub: "ana".to_string(),
            roles: roles(&["ADMIN"]),
            iat: Utc::now().timestamp(),
            exp: Utc::now().timestamp() + 600,
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &claims,
            &jsonwebtoken::EncodingKey::from_secret(b"guessable"),
        )
        .unwrap();
        assert_eq!(service().verify(&token), Err(TokenError::BadSignature));
    }

    #[test]
    fn structurally_invalid_tokens_are_malformed() {
        let tokens = service();
        for token in [
            "",
            "not-a-real-token",
            "a.b",
            "a.b.c.d",
            "..",
            "eyJhbGciOiJSUzI1NiJ9..c2ln",
            "eyJhbGciOiJSUzI1NiJ9.e30.!!!",
        ] {
            assert_eq!(tokens.verify(token), Err(TokenError::Malformed), "{token:?}");
        }
    }

    #[test]
    fn unsigned_token_is_malformed() {
        let header = URL_SAFE_NO_PAD.encode(br#"{"alg":"none","typ":"JWT"}"#);
        let payload = URL_SAFE_NO_PAD.encode(br#"{"sub":"ana","roles":["ADMIN"],"iat":1,"exp":99999999999}"#);
        let token = format!("{header}.{payload}.");
        assert_eq!(service().verify(&token), Err(TokenError::Malformed));
    }

    #[test]
    fn validate_subject_matches_only_exact_subject() {
        let tokens = service();
        let token = tokens.issue("ana@example.com", &roles(&["USER"])).unwrap();

        assert!(tokens.validate_subject(&token, "ana@example.com"));
        assert!(!tokens.validate_subject(&token, "bob@example.com"));
        assert!(!tokens.validate_subject("not-a-real-token", "ana@example.com"));
    }

    #[test]
    fn validate_subject_is_false_once_expired() {
        let tokens = service();
        let token = tokens.issue_at("ana", &[], fixed_now()).unwrap();
        let later = fixed_now() + chrono::Duration::hours(2);
        assert!(tokens.validate_subject_at(&token, "ana", fixed_now()));
        assert!(!tokens.validate_subject_at(&token, "ana", later));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(32))]

        #[test]
        fn round_trip_preserves_subject_and_roles(
            subject in "[a-z0-9._%+-]{1,24}@[a-z0-9.-]{1,16}",
            role_names in proptest::collection::vec("(ROLE_)?[A-Z_]{1,12}", 0..5),
        ) {
            let tokens = service();
            let token = tokens.issue(&subject, &role_names).unwrap();
            let claims = tokens.verify(&token).unwrap();
            prop_assert_eq!(claims.sub, subject);
            prop_assert_eq!(claims.roles, role_names);
        }
    }
}
