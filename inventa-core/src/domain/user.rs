//! User domain model

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserRole {
    #[serde(rename = "Super Usuario")]
    SuperUser,
    #[serde(rename = "Super Admin")]
    SuperAdmin,
    #[serde(rename = "Administrador")]
    Admin,
    #[serde(rename = "Almacenero")]
    Warehouse,
    #[serde(rename = "Usuario")]
    User,
}

/// A console user belonging to one entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: String,
    pub entity_id: String,
    pub name: String,
    pub email: String,
    pub role: UserRole,
    #[serde(default)]
    pub avatar_url: String,
    /// Marks the entity's own administrator account.
    ///
    /// `None` only for records read from files that predate the flag.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_admin: Option<bool>,
    /// Argon2 PHC string
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password_hash: Option<String>,
    /// Cleartext password found in legacy files. Read, never written.
    #[serde(default, rename = "password", skip_serializing)]
    pub legacy_password: Option<String>,
}

impl User {
    pub fn new(
        id: impl Into<String>,
        entity_id: impl Into<String>,
        name: impl Into<String>,
        email: impl Into<String>,
        role: UserRole,
    ) -> Self {
        Self {
            id: id.into(),
            entity_id: entity_id.into(),
            name: name.into(),
            email: email.into(),
            role,
            avatar_url: String::new(),
            is_admin: Some(false),
            password_hash: None,
            legacy_password: None,
        }
    }

    /// Mark this user as the entity administrator
    pub fn as_admin(mut self) -> Self {
        self.is_admin = Some(true);
        self
    }

    pub fn is_admin(&self) -> bool {
        self.is_admin.unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_user_creation() {
        let user = User::new("user-123", "ent_1", "Ana", "ana@example.com", UserRole::Admin);
        assert_eq!(user.id, "user-123");
        assert_eq!(user.entity_id, "ent_1");
        assert!(!user.is_admin());
        assert!(user.as_admin().is_admin());
    }

    #[test]
    fn test_cleartext_password_is_never_written() {
        let json = r#"{
            "id": "user_1", "entityId": "ent_1", "name": "Ana",
            "email": "ana@example.com", "role": "Administrador",
            "avatarUrl": "", "password": "hunter2"
        }"#;
        let user: User = serde_json::from_str(json).unwrap();
        assert_eq!(user.legacy_password.as_deref(), Some("hunter2"));
        assert!(user.is_admin.is_none());

        let out = serde_json::to_string(&user).unwrap();
        assert!(!out.contains("hunter2"));
        assert!(!out.contains("\"password\""));
    }
}
