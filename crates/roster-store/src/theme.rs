// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::PrefStore;

pub const THEME_KEY: &str = "theme";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemePreference {
    Light,
    Dark,
    #[default]
    System,
}

impl ThemePreference {
    pub const ALL: [Self; 3] = [Self::Light, Self::Dark, Self::System];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
            Self::System => "system",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        Self::ALL
            .into_iter()
            .find(|theme| theme.as_str() == value.trim())
    }

    /// `System` follows the platform's dark-mode preference.
    pub const fn is_dark(self, prefers_dark: bool) -> bool {
        match self {
            Self::Light => false,
            Self::Dark => true,
            Self::System => prefers_dark,
        }
    }
}

impl fmt::Display for ThemePreference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

pub struct ThemeSettings<'a> {
    store: &'a PrefStore,
    theme: ThemePreference,
}

impl<'a> ThemeSettings<'a> {
    pub fn load(store: &'a PrefStore) -> Result<Self> {
        let theme = store
            .get_json::<ThemePreference>(THEME_KEY)?
            .unwrap_or_default();
        Ok(Self { store, theme })
    }

    pub const fn theme(&self) -> ThemePreference {
        self.theme
    }

    pub const fn is_dark(&self, prefers_dark: bool) -> bool {
        self.theme.is_dark(prefers_dark)
    }

    pub fn set(&mut self, theme: ThemePreference) -> Result<()> {
        self.theme = theme;
        self.store.put_json(THEME_KEY, &theme)
    }

    /// Flips to the opposite of what is currently shown.
    pub fn toggle(&mut self, prefers_dark: bool) -> Result<ThemePreference> {
        let next = if self.is_dark(prefers_dark) {
            ThemePreference::Light
        } else {
            ThemePreference::Dark
        };
        self.set(next)?;
        Ok(next)
    }
}
