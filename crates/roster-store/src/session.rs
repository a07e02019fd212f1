// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use roster_app::{AuthUser, LoginResponse};
use tracing::warn;

use crate::PrefStore;

pub const AUTH_TOKEN_KEY: &str = "auth_token";
pub const AUTH_USER_KEY: &str = "auth_user";

/// The signed-in user and bearer token, restored across runs.
pub struct AuthSession<'a> {
    store: &'a PrefStore,
    token: Option<String>,
    user: Option<AuthUser>,
}

impl<'a> AuthSession<'a> {
    /// A user is only restored alongside a token. An unreadable user entry
    /// is cleared; the token survives it.
    pub fn restore(store: &'a PrefStore) -> Result<Self> {
        let token = store.get_json::<String>(AUTH_TOKEN_KEY)?;
        let user = match token {
            Some(_) => store.get_json::<AuthUser>(AUTH_USER_KEY)?,
            None => None,
        };
        if token.is_some() && user.is_none() {
            warn!("session token restored without a user");
        }
        Ok(Self { store, token, user })
    }

    pub fn sign_in(&mut self, response: &LoginResponse) -> Result<()> {
        self.store.put_json(AUTH_TOKEN_KEY, &response.token)?;
        self.store.put_json(AUTH_USER_KEY, &response.user)?;
        self.token = Some(response.token.clone());
        self.user = Some(response.user.clone());
        Ok(())
    }

    pub fn sign_out(&mut self) -> Result<()> {
        self.store.remove(AUTH_TOKEN_KEY)?;
        self.store.remove(AUTH_USER_KEY)?;
        self.token = None;
        self.user = None;
        Ok(())
    }

    pub fn token(&self) -> Option<&str> {
        self.token.as_deref()
    }

    pub fn user(&self) -> Option<&AuthUser> {
        self.user.as_ref()
    }

    pub fn is_authenticated(&self) -> bool {
        self.token.is_some()
    }

    pub fn user_name(&self) -> &str {
        self.user.as_ref().map_or("", |user| user.name.as_str())
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.user.as_ref().is_some_and(|user| user.has_role(role))
    }

    pub fn has_any_role(&self, roles: &[&str]) -> bool {
        self.user.as_ref().is_some_and(|user| user.has_any_role(roles))
    }
}
