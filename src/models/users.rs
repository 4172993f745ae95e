use serde::{Deserialize, Serialize};
use uuid::Uuid;

pub const ADMIN_ID: &str = "admin";
pub const ADMIN_CREDITS: u64 = 9999;

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Admin,
}

#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum UserStatus {
    Active,
    Blocked,
}

impl UserStatus {
    pub fn toggled(self) -> Self {
        match self {
            UserStatus::Active => UserStatus::Blocked,
            UserStatus::Blocked => UserStatus::Active,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            UserStatus::Active => "active",
            UserStatus::Blocked => "blocked",
        }
    }
}

#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct User {
    pub id: String,
    pub name: String,
    pub email: String,
    pub credits: u64,
    pub role: Role,
    pub status: UserStatus,
    /// Only held for the lifetime of the session, never hashed.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct NewUser {
    pub name: String,
    pub email: String,
    pub password: String,
}

impl User {
    pub fn member(new_user: NewUser, starter_credits: u64) -> Self {
        Self {
            id: Uuid::new_v4().hyphenated().to_string(),
            name: new_user.name,
            email: new_user.email,
            credits: starter_credits,
            role: Role::User,
            status: UserStatus::Active,
            password: Some(new_user.password),
        }
    }

    /// Synthetic identity used for the configured administrator. It is never
    /// part of the roster.
    pub fn admin(email: &str) -> Self {
        Self {
            id: ADMIN_ID.to_string(),
            name: "Admin".to_string(),
            email: email.to_string(),
            credits: ADMIN_CREDITS,
            role: Role::Admin,
            status: UserStatus::Active,
            password: None,
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == Role::Admin
    }

    pub fn is_blocked(&self) -> bool {
        self.status == UserStatus::Blocked
    }

    /// Floors at zero.
    pub fn apply_credit_delta(&mut self, delta: i64) {
        self.credits = self.credits.saturating_add_signed(delta);
    }
}
