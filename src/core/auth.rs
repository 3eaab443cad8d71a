use crate::domain::model::{NewUser, User, UserProfile};
use crate::domain::ports::{TokenIssuer, UserStore};
use crate::utils::error::{AppError, Result};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::sync::Arc;

const INVALID_CREDENTIALS: &str = "Invalid credentials";

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegisterRequest {
    pub username: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoginRequest {
    pub email: Option<String>,
    pub password: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserProfile,
}

fn hash_password(salt: &str, password: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(salt.as_bytes());
    hasher.update(b"$");
    hasher.update(password.as_bytes());
    format!("{:x}", hasher.finalize())
}

fn required(field: &str, value: Option<String>) -> Result<String> {
    match value {
        Some(v) if !v.trim().is_empty() => Ok(v),
        _ => Err(AppError::ValidationError {
            field: field.to_string(),
            message: "This field is required.".to_string(),
        }),
    }
}

/// Registration and login on top of a user store and a token issuer.
pub struct AuthService {
    users: Arc<dyn UserStore>,
    issuer: Arc<dyn TokenIssuer>,
}

impl AuthService {
    pub fn new(users: Arc<dyn UserStore>, issuer: Arc<dyn TokenIssuer>) -> Self {
        Self { users, issuer }
    }

    pub async fn register(&self, request: RegisterRequest) -> Result<AuthResponse> {
        let username = required("username", request.username)?;
        let email = required("email", request.email)?;
        let password = required("password", request.password)?;

        let salt = uuid::Uuid::new_v4().simple().to_string();
        let user = self
            .users
            .create_user(NewUser {
                username: username.trim().to_string(),
                email: email.trim().to_lowercase(),
                password_hash: hash_password(&salt, &password),
                salt,
            })
            .await?;

        tracing::info!("👤 Registered user {} ({})", user.username, user.id);
        Ok(self.respond(&user))
    }

    pub async fn login(&self, request: LoginRequest) -> Result<AuthResponse> {
        let invalid = || AppError::AuthError {
            message: INVALID_CREDENTIALS.to_string(),
        };
        let email = request.email.ok_or_else(invalid)?;
        let password = request.password.ok_or_else(invalid)?;

        let user = self
            .users
            .find_by_email(&email.trim().to_lowercase())
            .await?
            .ok_or_else(invalid)?;

        if hash_password(&user.salt, &password) != user.password_hash {
            tracing::warn!("Failed login attempt for user {}", user.id);
            return Err(invalid());
        }

        Ok(self.respond(&user))
    }

    /// Resolves a bearer token to the user it was issued for.
    pub async fn authenticate(&self, token: &str) -> Result<UserProfile> {
        let unauthorized = || AppError::AuthError {
            message: "Invalid or expired token".to_string(),
        };
        let user_id = self.issuer.verify(token).ok_or_else(unauthorized)?;
        let user = self.users.find_by_id(user_id).await?.ok_or_else(unauthorized)?;
        Ok(UserProfile::from(&user))
    }

    /// Cheap liveness probe against the user store.
    pub async fn ping(&self) -> Result<usize> {
        self.users.count_users().await
    }

    fn respond(&self, user: &User) -> AuthResponse {
        AuthResponse {
            token: self.issuer.issue_token(user),
            user: UserProfile::from(user),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::auth::OpaqueTokenIssuer;
    use crate::adapters::store::InMemoryStore;

    fn service() -> AuthService {
        AuthService::new(
            Arc::new(InMemoryStore::new()),
            Arc::new(OpaqueTokenIssuer::new()),
        )
    }

    fn register_request(username: &str, email: &str) -> RegisterRequest {
        RegisterRequest {
            username: Some(username.to_string()),
            email: Some(email.to_string()),
            password: Some("s3cret".to_string()),
        }
    }

    #[test]
    fn test_hash_password_is_salted() {
        assert_eq!(hash_password("a", "pw"), hash_password("a", "pw"));
        assert_ne!(hash_password("a", "pw"), hash_password("b", "pw"));
        assert_eq!(hash_password("a", "pw").len(), 64);
    }

    #[tokio::test]
    async fn test_register_then_login() {
        let auth = service();
        let registered = auth
            .register(register_request("claire", "Claire@Example.com"))
            .await
            .unwrap();
        assert_eq!(registered.user.email, "claire@example.com");
        assert!(!registered.token.is_empty());

        let logged_in = auth
            .login(LoginRequest {
                email: Some("claire@example.com".to_string()),
                password: Some("s3cret".to_string()),
            })
            .await
            .unwrap();
        assert_eq!(logged_in.user, registered.user);
        assert_ne!(logged_in.token, registered.token);

        let me = auth.authenticate(&logged_in.token).await.unwrap();
        assert_eq!(me.username, "claire");
    }

    #[tokio::test]
    async fn test_login_rejects_bad_password() {
        let auth = service();
        auth.register(register_request("bob", "bob@example.com"))
            .await
            .unwrap();

        let err = auth
            .login(LoginRequest {
                email: Some("bob@example.com".to_string()),
                password: Some("wrong".to_string()),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::AuthError { .. }));
        assert_eq!(err.to_string(), INVALID_CREDENTIALS);
    }

    #[tokio::test]
    async fn test_register_requires_fields_and_unique_users() {
        let auth = service();
        let err = auth
            .register(RegisterRequest {
                username: Some("x".to_string()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ValidationError { ref field, .. } if field == "email"));

        auth.register(register_request("dup", "dup@example.com"))
            .await
            .unwrap();
        let err = auth
            .register(register_request("dup", "other@example.com"))
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::ConflictError { .. }));
    }

    #[tokio::test]
    async fn test_unknown_token() {
        let auth = service();
        assert!(auth.authenticate("not-a-token").await.is_err());
    }
}
