//! User, session, and authentication wire models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use wealthproxies_core::{Email, Role, SessionId, UserId};

/// The signed-in user, as returned by the backend.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    /// Unique user ID.
    pub id: UserId,
    /// User's email address.
    pub email: Email,
    /// Display name.
    pub name: String,
    /// Unique handle.
    pub username: String,
    /// Optional avatar URL.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Role: regular customer or back-office admin.
    pub role: Role,
    /// Linked Discord account ID, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discord_id: Option<String>,
    /// Linked Discord username, if any.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub discord_username: Option<String>,
    /// Whether the email has been verified.
    pub email_verified: bool,
    /// When the user was created.
    pub created_at: DateTime<Utc>,
    /// When the user was last updated.
    pub updated_at: DateTime<Utc>,
}

/// A server-side session record.
///
/// The client persists this for display only; it never checks `expires_at`
/// locally. "Logged in" is defined by the presence of a token and a user
/// snapshot in durable storage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    /// Session ID.
    pub id: SessionId,
    /// Owning user ID.
    pub user_id: UserId,
    /// Server-side expiry timestamp.
    pub expires_at: DateTime<Utc>,
}

/// Login credentials.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Registration form data.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub name: String,
    pub username: String,
}

/// Response shape shared by login, register, OAuth callback, and refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// The authenticated (or newly registered) user.
    pub user: User,
    /// Session record, when the backend issues one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub session: Option<Session>,
    /// Bearer token, when the backend is token-based rather than
    /// cookie-session-based.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token: Option<String>,
}

/// Supported OAuth providers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OauthProvider {
    Google,
    Discord,
}

impl OauthProvider {
    /// Path segment used in the backend's OAuth endpoints.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Discord => "discord",
        }
    }
}

impl std::fmt::Display for OauthProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_user_json() -> &'static str {
        r#"{
            "id": "usr_1",
            "email": "jane@example.com",
            "name": "Jane",
            "username": "jane",
            "role": "admin",
            "emailVerified": true,
            "createdAt": "2025-01-15T10:00:00Z",
            "updatedAt": "2025-01-15T10:00:00Z"
        }"#
    }

    #[test]
    fn test_user_deserializes_camel_case() {
        let user: User = serde_json::from_str(sample_user_json()).expect("deserialize");
        assert_eq!(user.id.as_str(), "usr_1");
        assert!(user.email_verified);
        assert!(user.role.is_admin());
        assert!(user.image.is_none());
    }

    #[test]
    fn test_auth_response_without_session_or_token() {
        let json = format!(r#"{{"user": {}}}"#, sample_user_json());
        let response: AuthResponse = serde_json::from_str(&json).expect("deserialize");
        assert!(response.session.is_none());
        assert!(response.token.is_none());
    }

    #[test]
    fn test_session_round_trip() {
        let json = r#"{"id":"ses_1","userId":"usr_1","expiresAt":"2025-02-01T00:00:00Z"}"#;
        let session: Session = serde_json::from_str(json).expect("deserialize");
        assert_eq!(session.user_id.as_str(), "usr_1");
        let back = serde_json::to_string(&session).expect("serialize");
        assert!(back.contains("\"userId\":\"usr_1\""));
    }
}
