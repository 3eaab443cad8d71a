use crate::domain::model::User;
use crate::domain::ports::TokenIssuer;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock};

/// Random bearer tokens remembered in process memory. Tokens do not survive a
/// restart and never expire.
#[derive(Debug, Default)]
pub struct OpaqueTokenIssuer {
    tokens: RwLock<HashMap<String, i64>>,
}

impl OpaqueTokenIssuer {
    pub fn new() -> Self {
        Self::default()
    }
}

impl TokenIssuer for OpaqueTokenIssuer {
    fn issue_token(&self, user: &User) -> String {
        let token = uuid::Uuid::new_v4().simple().to_string();
        self.tokens
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(token.clone(), user.id);
        token
    }

    fn verify(&self, token: &str) -> Option<i64> {
        self.tokens
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(token)
            .copied()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_issue_and_verify() {
        let issuer = OpaqueTokenIssuer::new();
        let user = User {
            id: 42,
            username: "amy".to_string(),
            email: "amy@example.com".to_string(),
            password_hash: String::new(),
            salt: String::new(),
        };

        let token = issuer.issue_token(&user);
        assert_eq!(token.len(), 32);
        assert_eq!(issuer.verify(&token), Some(42));
        assert_eq!(issuer.verify("unknown"), None);
    }
}
