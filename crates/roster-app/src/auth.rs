// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

use crate::ids::RecordId;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthUser {
    pub id: RecordId,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub roles: Vec<String>,
}

impl AuthUser {
    pub fn has_role(&self, role: &str) -> bool {
        self.roles.iter().any(|held| held == role)
    }

    pub fn has_any_role(&self, roles: &[&str]) -> bool {
        roles.iter().any(|role| self.has_role(role))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoginResponse {
    pub token: String,
    pub user: AuthUser,
}

#[cfg(test)]
mod tests {
    use super::{AuthUser, LoginResponse};

    #[test]
    fn login_response_decodes_roles() -> anyhow::Result<()> {
        let response: LoginResponse = serde_json::from_str(
            r#"{"token":"mock-jwt-token-1","user":{"id":1,"name":"Admin User","email":"admin@demo.com","roles":["admin","user"]}}"#,
        )?;
        assert!(response.user.has_role("admin"));
        assert!(!response.user.has_role("owner"));
        assert!(response.user.has_any_role(&["owner", "user"]));
        assert!(!response.user.has_any_role(&[]));
        Ok(())
    }

    #[test]
    fn missing_roles_default_to_none() -> anyhow::Result<()> {
        let user: AuthUser =
            serde_json::from_str(r#"{"id":2,"name":"Jane Smith","email":"jane.smith@example.com"}"#)?;
        assert!(user.roles.is_empty());
        Ok(())
    }
}
