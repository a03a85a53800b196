//! Bearer tokens for Google API requests.
//!
//! Obtaining and refreshing credentials is left to the caller; the client
//! only asks a `TokenSource` for a token before each request.

use async_trait::async_trait;

use crate::error::{DriveError, Result};

/// Environment variable read by `StaticToken::from_env`.
pub const ACCESS_TOKEN_ENV: &str = "DRIVE_ACCESS_TOKEN";

/// Supplies an OAuth2 access token for each request.
#[async_trait]
pub trait TokenSource: Send + Sync {
    async fn access_token(&self) -> Result<String>;
}

/// A fixed access token.
#[derive(Clone)]
pub struct StaticToken {
    token: String,
}

impl StaticToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
        }
    }

    /// Read the token from `DRIVE_ACCESS_TOKEN`.
    pub fn from_env() -> Result<Self> {
        match std::env::var(ACCESS_TOKEN_ENV) {
            Ok(token) if !token.trim().is_empty() => Ok(Self::new(token.trim())),
            _ => Err(DriveError::MissingEnvVar(ACCESS_TOKEN_ENV.to_string())),
        }
    }
}

impl std::fmt::Debug for StaticToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StaticToken").field("token", &"<redacted>").finish()
    }
}

#[async_trait]
impl TokenSource for StaticToken {
    async fn access_token(&self) -> Result<String> {
        Ok(self.token.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_static_token() {
        let source = StaticToken::new("ya29.token");
        assert_eq!(source.access_token().await.unwrap(), "ya29.token");
    }

    #[test]
    fn test_debug_redacts_token() {
        let source = StaticToken::new("ya29.secret");
        let debug = format!("{:?}", source);
        assert!(!debug.contains("secret"));
    }
}
