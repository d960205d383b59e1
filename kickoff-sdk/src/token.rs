//! Session tokens issued at login and presented on every authenticated call.
//!
//! The wire format is:
//!
//! ```text
//! Authorization: Bearer {user_id}.{expires_at}.{base64_signature}
//! ```
//!
//! where the signature is `HMAC-SHA256("{user_id}.{expires_at}", secret)` and
//! `expires_at` is a unix timestamp in seconds.

/// Default lifetime of a session token (seven days).
pub const DEFAULT_TOKEN_TTL: time::Duration = time::Duration::days(7);

/// Scheme prefix expected in the `Authorization` header.
pub const BEARER_PREFIX: &str = "Bearer ";

/// Errors produced by token operations.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum TokenError {
    #[error("invalid token format")]
    InvalidFormat,
    #[error("invalid base64 encoding")]
    InvalidBase64,
    #[error("invalid token signature")]
    SignatureMismatch,
    #[error("token expired")]
    Expired,
}

impl From<ring::error::Unspecified> for TokenError {
    fn from(_: ring::error::Unspecified) -> Self {
        Self::SignatureMismatch
    }
}

/// A signed session token binding a user id to an expiry time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionToken {
    pub user_id: i64,
    pub expires_at: i64,
    pub signature: Box<[u8]>,
}

impl SessionToken {
    /// Issue a token for `user_id` valid for `ttl` from now.
    pub fn issue(user_id: i64, ttl: time::Duration, key: &[u8]) -> Self {
        let now = time::OffsetDateTime::now_utc().unix_timestamp();
        Self::issue_at(user_id, now, ttl, key)
    }

    /// Issue a token as if the current time were `now`.
    pub fn issue_at(user_id: i64, now: i64, ttl: time::Duration, key: &[u8]) -> Self {
        let expires_at = now.saturating_add(ttl.whole_seconds());
        let signature = ring::hmac::sign(&hmac_key(key), payload(user_id, expires_at).as_bytes());
        Self {
            user_id,
            expires_at,
            signature: signature.as_ref().to_owned().into_boxed_slice(),
        }
    }

    /// Parse a raw token string (without the `Bearer ` prefix).
    ///
    /// This does **not** check the signature; call [`verify`](Self::verify).
    pub fn parse(value: &str) -> Result<Self, TokenError> {
        let mut parts = value.splitn(3, '.');
        let (Some(user_id), Some(expires_at), Some(signature)) =
            (parts.next(), parts.next(), parts.next())
        else {
            return Err(TokenError::InvalidFormat);
        };
        let user_id: i64 = user_id.parse().map_err(|_| TokenError::InvalidFormat)?;
        let expires_at: i64 = expires_at.parse().map_err(|_| TokenError::InvalidFormat)?;
        let signature = fast32::base64::RFC4648_NOPAD
            .decode_str(signature)
            .map_err(|_| TokenError::InvalidBase64)?
            .into_boxed_slice();
        Ok(Self {
            user_id,
            expires_at,
            signature,
        })
    }

    /// Parse an `Authorization` header value of the form `Bearer {token}`.
    pub fn from_authorization_header(value: &str) -> Result<Self, TokenError> {
        let raw = value
            .strip_prefix(BEARER_PREFIX)
            .ok_or(TokenError::InvalidFormat)?;
        Self::parse(raw.trim())
    }

    /// Verify signature and expiry, returning the authenticated user id.
    pub fn verify(&self, key: &[u8]) -> Result<i64, TokenError> {
        let now = time::OffsetDateTime::now_utc().unix_timestamp();
        self.verify_at(key, now)
    }

    /// Verify as if the current time were `now`.
    pub fn verify_at(&self, key: &[u8], now: i64) -> Result<i64, TokenError> {
        ring::hmac::verify(
            &hmac_key(key),
            payload(self.user_id, self.expires_at).as_bytes(),
            self.signature.as_ref(),
        )?;
        if now >= self.expires_at {
            return Err(TokenError::Expired);
        }
        Ok(self.user_id)
    }
}

impl std::fmt::Display for SessionToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{}.{}.{}",
            self.user_id,
            self.expires_at,
            fast32::base64::RFC4648_NOPAD.encode(&self.signature)
        )
    }
}

fn payload(user_id: i64, expires_at: i64) -> String {
    format!("{user_id}.{expires_at}")
}

fn hmac_key(key: &[u8]) -> ring::hmac::Key {
    ring::hmac::Key::new(ring::hmac::HMAC_SHA256, key)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KEY: &[u8] = b"0123456789abcdef0123456789abcdef";

    #[test]
    fn test_issued_token_verifies() {
        let token = SessionToken::issue_at(42, 1_000, DEFAULT_TOKEN_TTL, KEY);
        let parsed = SessionToken::parse(&token.to_string()).unwrap();
        assert_eq!(parsed, token);
        assert_eq!(parsed.verify_at(KEY, 1_001), Ok(42));
    }

    #[test]
    fn test_tampered_user_id_is_rejected() {
        let token = SessionToken::issue_at(42, 1_000, DEFAULT_TOKEN_TTL, KEY);
        let forged = token.to_string().replacen("42.", "43.", 1);
        let parsed = SessionToken::parse(&forged).unwrap();
        assert_eq!(
            parsed.verify_at(KEY, 1_001),
            Err(TokenError::SignatureMismatch)
        );
    }

    #[test]
    fn test_wrong_key_is_rejected() {
        let token = SessionToken::issue_at(7, 1_000, DEFAULT_TOKEN_TTL, KEY);
        assert_eq!(
            token.verify_at(b"another-secret-another-secret-xx", 1_001),
            Err(TokenError::SignatureMismatch)
        );
    }

    #[test]
    fn test_expired_token_is_rejected() {
        let token = SessionToken::issue_at(7, 1_000, time::Duration::seconds(60), KEY);
        assert_eq!(token.verify_at(KEY, 1_059), Ok(7));
        assert_eq!(token.verify_at(KEY, 1_060), Err(TokenError::Expired));
    }

    #[test]
    fn test_bearer_header_parsing() {
        let token = SessionToken::issue_at(9, 1_000, DEFAULT_TOKEN_TTL, KEY);
        let header = format!("Bearer {token}");
        assert_eq!(SessionToken::from_authorization_header(&header), Ok(token));
        assert_eq!(
            SessionToken::from_authorization_header("Basic abc"),
            Err(TokenError::InvalidFormat)
        );
        assert_eq!(SessionToken::parse("9.abc.xyz"), Err(TokenError::InvalidFormat));
        assert_eq!(SessionToken::parse("9.10"), Err(TokenError::InvalidFormat));
        assert_eq!(SessionToken::parse("9.10.!!"), Err(TokenError::InvalidBase64));
    }
}
