use jiff::Timestamp;
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, EnumString};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, AsRefStr, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "snake_case", ascii_case_insensitive)]
pub enum Role {
    Guest,
    User,
    Expert,
    Admin,
}

impl Role {
    /// Admins may edit or delete any post or comment; everyone else only
    /// their own.
    pub fn can_moderate(self) -> bool {
        matches!(self, Role::Admin)
    }

    /// Educational modules are authored by experts and admins.
    pub fn can_author_modules(self) -> bool {
        matches!(self, Role::Expert | Role::Admin)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: String,
    pub full_name: String,
    pub email: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    pub role: Role,
    pub created_at: Timestamp,
}

impl User {
    pub fn new(
        id: String,
        full_name: String,
        email: String,
        password_hash: String,
        role: Role,
        created_at: Timestamp,
    ) -> Self {
        Self {
            id,
            full_name,
            email,
            password_hash: Some(password_hash),
            role,
            created_at,
        }
    }
}

/// Password rules carried over from the sign-up form: minimum length plus
/// character-class checks. Returns a user-facing message on failure.
pub fn validate_password(password: &str) -> Result<(), String> {
    if password.len() < 8 {
        return Err("Password length must be at least 8 characters.".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_uppercase()) {
        return Err("Password must contain at least one uppercase letter.".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_lowercase()) {
        return Err("Password must contain at least one lowercase letter.".to_string());
    }
    if !password.chars().any(|c| c.is_ascii_digit()) {
        return Err("Password must contain at least one digit.".to_string());
    }
    Ok(())
}
