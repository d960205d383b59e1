//! Session token configuration.

use kickoff_sdk::token::{SessionToken, TokenError};

/// Session token configuration.
#[derive(Clone)]
pub struct AuthConfig {
    /// HMAC key used to sign and verify session tokens.
    pub token_secret: Box<[u8]>,
    /// Lifetime of a freshly issued token.
    pub token_ttl: time::Duration,
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthConfig")
            .field("token_secret", &"<redacted>")
            .field("token_ttl", &self.token_ttl)
            .finish()
    }
}

impl AuthConfig {
    /// Issue a signed token for `user_id`.
    pub fn issue_token(&self, user_id: i64) -> String {
        SessionToken::issue(user_id, self.token_ttl, &self.token_secret).to_string()
    }

    /// Authenticate an `Authorization` header value, returning the user id.
    pub fn verify_header(&self, value: &str) -> Result<i64, TokenError> {
        SessionToken::from_authorization_header(value)?.verify(&self.token_secret)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> AuthConfig {
        AuthConfig {
            token_secret: b"0123456789abcdef0123456789abcdef".to_vec().into_boxed_slice(),
            token_ttl: time::Duration::hours(1),
        }
    }

    #[test]
    fn test_issue_and_verify_header() {
        let auth = config();
        let token = auth.issue_token(17);
        assert_eq!(auth.verify_header(&format!("Bearer {token}")), Ok(17));
        assert_eq!(auth.verify_header(&token), Err(TokenError::InvalidFormat));

        let other = AuthConfig {
            token_secret: b"another-secret-another-secret-xx".to_vec().into_boxed_slice(),
            ..config()
        };
        assert_eq!(
            other.verify_header(&format!("Bearer {token}")),
            Err(TokenError::SignatureMismatch)
        );
    }

    #[test]
    fn test_debug_hides_secret() {
        let printed = format!("{:?}", config());
        assert!(!printed.contains("0123456789abcdef"));
    }
}
