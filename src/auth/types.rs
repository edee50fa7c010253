//! Types for authentication and user management

use serde::{Deserialize, Serialize};

/// The authenticated user's identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// The user ID
    pub id: String,

    /// The username
    pub username: String,

    /// The email address
    pub email: String,

    /// Whether the account has staff privileges
    #[serde(rename = "is_staff", default)]
    pub is_staff: bool,

    /// Whether the account has superuser privileges
    #[serde(rename = "is_superuser", default)]
    pub is_superuser: bool,

    /// The derived role: `"admin"` or `"user"`
    #[serde(default)]
    pub role: Option<String>,

    /// Whether the account is blocked
    #[serde(rename = "isBlock", default)]
    pub is_blocked: bool,
}

impl User {
    /// Whether this user may access the admin console. Derived from role
    /// data, never stored independently.
    pub fn is_admin(&self) -> bool {
        self.role.as_deref() == Some("admin") || self.is_staff || self.is_superuser
    }
}

/// Response of `POST auth/login/`
#[derive(Debug, Clone, Deserialize)]
pub struct LoginResponse {
    /// The access token
    pub access: String,

    /// The refresh token
    pub refresh: String,

    /// The authenticated user
    pub user: User,
}

/// Request body of `POST auth/register/`
#[derive(Debug, Clone, Serialize)]
pub struct SignupRequest {
    /// The username
    pub username: String,

    /// The email address
    pub email: String,

    /// The password
    pub password: String,

    /// The password confirmation
    #[serde(rename = "password2")]
    pub confirm_password: String,
}
