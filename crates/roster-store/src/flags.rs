// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use anyhow::Result;
use std::collections::BTreeMap;

use crate::PrefStore;

pub const FEATURE_FLAGS_KEY: &str = "feature-flags";

/// Named on/off switches. Every change is written through to the store.
pub struct FeatureFlags<'a> {
    store: &'a PrefStore,
    flags: BTreeMap<String, bool>,
}

impl<'a> FeatureFlags<'a> {
    pub fn load(store: &'a PrefStore) -> Result<Self> {
        let flags = store
            .get_json::<BTreeMap<String, bool>>(FEATURE_FLAGS_KEY)?
            .unwrap_or_default();
        Ok(Self { store, flags })
    }

    /// Adds flags that are not known yet. Stored values always win over
    /// these defaults.
    pub fn register_defaults(&mut self, defaults: &[(&str, bool)]) {
        for (name, enabled) in defaults {
            self.flags.entry((*name).to_owned()).or_insert(*enabled);
        }
    }

    /// Unknown flags are off.
    pub fn is_enabled(&self, name: &str) -> bool {
        self.flags.get(name).copied().unwrap_or(false)
    }

    pub fn enable(&mut self, name: &str) -> Result<()> {
        self.set(name, true)
    }

    pub fn disable(&mut self, name: &str) -> Result<()> {
        self.set(name, false)
    }

    pub fn toggle(&mut self, name: &str) -> Result<bool> {
        let next = !self.is_enabled(name);
        self.set(name, next)?;
        Ok(next)
    }

    pub fn set(&mut self, name: &str, enabled: bool) -> Result<()> {
        self.flags.insert(name.to_owned(), enabled);
        self.store.put_json(FEATURE_FLAGS_KEY, &self.flags)
    }

    pub fn all(&self) -> &BTreeMap<String, bool> {
        &self.flags
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.flags.keys().map(String::as_str)
    }

    /// Forgets every flag, registered defaults included.
    pub fn reset_all(&mut self) -> Result<()> {
        self.flags.clear();
        self.store.remove(FEATURE_FLAGS_KEY)?;
        Ok(())
    }
}
