//! Opaque session tokens.
//!
//! Tokens are short lowercase hex slices of a v4 uuid so they fit, together
//! with a chat id, into Telegram's 64-byte callback data and deep links.

use std::fmt::Display;
use std::str::FromStr;

use uuid::Uuid;

use crate::error::QuizError;
use crate::utils::validation::validate_session_token;

const TOKEN_LENGTH: usize = 8;

/// Identifier of a cooperative match or a solo session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SessionId(String);

impl SessionId {
    /// A fresh random token. Callers check uniqueness against their registry.
    pub fn generate() -> Self {
        let simple = Uuid::new_v4().simple().to_string();
        Self(simple[..TOKEN_LENGTH].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

impl FromStr for SessionId {
    type Err = QuizError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        validate_session_token(s).map_err(|e| QuizError::Validation(e.to_string()))?;
        Ok(Self(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_tokens_parse_back() {
        let id = SessionId::generate();
        assert_eq!(id.as_str().len(), TOKEN_LENGTH);
        assert_eq!(id.to_string().parse::<SessionId>().unwrap(), id);
    }

    #[test]
    fn test_rejects_garbage() {
        assert!("not-a-token".parse::<SessionId>().is_err());
        assert!("".parse::<SessionId>().is_err());
    }
}
