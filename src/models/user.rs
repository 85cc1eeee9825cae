use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use uuid::Uuid;

use super::{present, EMAIL_PATTERN};
use crate::store::Model;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Publisher,
    Admin,
}

impl Role {
    pub fn parse(raw: &str) -> Option<Self> {
        match raw {
            "user" => Some(Role::User),
            "publisher" => Some(Role::Publisher),
            "admin" => Some(Role::Admin),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Role::User => "user",
            Role::Publisher => "publisher",
            Role::Admin => "admin",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    /// bcrypt digest, never the plaintext.
    pub password: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reset_password_token: Option<String>,
    #[serde(
        default,
        skip_serializing_if = "Option::is_none",
        with = "super::timestamp::option"
    )]
    pub reset_password_expire: Option<DateTime<Utc>>,
    #[serde(with = "super::timestamp")]
    pub created_at: DateTime<Utc>,
}

const PRIVATE_FIELDS: [&str; 3] = ["password", "resetPasswordToken", "resetPasswordExpire"];

impl Model for User {
    const COLLECTION: &'static str = "users";
    const LABEL: &'static str = "User";

    fn id(&self) -> Uuid {
        self.id
    }

    fn redact(doc: &mut Value) {
        if let Value::Object(map) = doc {
            for field in PRIVATE_FIELDS {
                map.remove(field);
            }
        }
    }
}

impl User {
    pub fn new(name: String, email: String, role: Role, password_hash: String) -> Self {
        Self {
            id: Uuid::new_v4(),
            name,
            email,
            role,
            password: password_hash,
            reset_password_token: None,
            reset_password_expire: None,
            created_at: Utc::now(),
        }
    }

    pub fn view(&self) -> UserView {
        UserView::from(self)
    }

    pub fn clear_reset(&mut self) {
        self.reset_password_token = None;
        self.reset_password_expire = None;
    }
}

/// What clients get to see of an identity.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserView {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub role: Role,
    #[serde(with = "super::timestamp")]
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserView {
    fn from(user: &User) -> Self {
        Self {
            id: user.id,
            name: user.name.clone(),
            email: user.email.clone(),
            role: user.role,
            created_at: user.created_at,
        }
    }
}

/// Body of register, admin create/update and update-details requests.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UserInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub password: Option<String>,
    pub role: Option<String>,
}

pub const MIN_PASSWORD_LEN: usize = 8;

impl UserInput {
    /// Rules for a new identity. `allowed_roles` is narrower for self-registration.
    pub fn validate_new(&self, allowed_roles: &[Role]) -> Vec<String> {
        let mut errors = Vec::new();
        if present(&self.name).is_none() {
            errors.push("Name is required".to_string());
        }
        match present(&self.email) {
            None => errors.push("Email is required".to_string()),
            Some(email) if !EMAIL_PATTERN.is_match(email) => {
                errors.push("Please enter a valid email".to_string())
            }
            Some(_) => {}
        }
        match self.password.as_deref() {
            None | Some("") => errors.push("Password is required".to_string()),
            Some(p) => errors.extend(validate_password(p)),
        }
        errors.extend(self.validate_role(allowed_roles));
        errors
    }

    /// Rules for a partial update: only the fields present are checked.
    pub fn validate_patch(&self, allowed_roles: &[Role]) -> Vec<String> {
        let mut errors = Vec::new();
        if self.name.is_some() && present(&self.name).is_none() {
            errors.push("Name cannot be empty".to_string());
        }
        if let Some(email) = self.email.as_deref() {
            if !EMAIL_PATTERN.is_match(email.trim()) {
                errors.push("Please enter a valid email".to_string());
            }
        }
        if let Some(p) = self.password.as_deref() {
            errors.extend(validate_password(p));
        }
        errors.extend(self.validate_role(allowed_roles));
        errors
    }

    fn validate_role(&self, allowed_roles: &[Role]) -> Option<String> {
        let raw = self.role.as_deref()?;
        match Role::parse(raw) {
            Some(role) if allowed_roles.contains(&role) => None,
            _ => Some(format!(
                "Role must be one of: {}",
                allowed_roles.iter().map(Role::as_str).collect::<Vec<_>>().join(", ")
            )),
        }
    }

    /// Parsed role, falling back to `user`. Call after validation.
    pub fn role_or_default(&self) -> Role {
        self.role.as_deref().and_then(Role::parse).unwrap_or(Role::User)
    }
}

pub fn validate_password(password: &str) -> Option<String> {
    (password.chars().count() < MIN_PASSWORD_LEN)
        .then(|| format!("Password must be at least {MIN_PASSWORD_LEN} characters"))
}
