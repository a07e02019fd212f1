// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

mod backend;
mod server;

pub use backend::{CATEGORIES, MOCK_LATENCY, MockBackend, seed_products, seed_users};
pub use server::MockServer;

use anyhow::{Context, Result};
use roster_app::Row;
use std::path::PathBuf;

const FIRST_NAMES: [&str; 16] = [
    "Avery", "Jordan", "Taylor", "Riley", "Morgan", "Casey", "Alex", "Quinn", "Parker", "Drew",
    "Kai", "Elliot", "Robin", "Cameron", "Hayden", "Rowan",
];
const LAST_NAMES: [&str; 18] = [
    "Walker", "Martin", "Hill", "Evans", "Lopez", "Gray", "Ward", "Young", "Diaz", "Reed",
    "Campbell", "Turner", "Flores", "Bennett", "Price", "Morris", "Foster", "Brooks",
];
const PRODUCT_NOUNS: [&str; 12] = [
    "Lamp", "Kettle", "Backpack", "Notebook", "Speaker", "Jacket", "Mug", "Charger", "Blanket",
    "Monitor", "Sneakers", "Planter",
];
const PRODUCT_ADJECTIVES: [&str; 10] = [
    "Compact", "Deluxe", "Classic", "Portable", "Smart", "Vintage", "Rugged", "Eco", "Premium",
    "Mini",
];
const EMAIL_DOMAINS: [&str; 4] = ["example.com", "mail.test", "demo.org", "corp.test"];

#[derive(Debug, Clone)]
struct DeterministicRng {
    state: u64,
}

impl DeterministicRng {
    fn new(seed: u64) -> Self {
        let mut state = seed ^ 0x9E37_79B9_7F4A_7C15;
        if state == 0 {
            state = 0xA409_3822_299F_31D0;
        }
        Self { state }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self
            .state
            .wrapping_mul(6_364_136_223_846_793_005)
            .wrapping_add(1_442_695_040_888_963_407);

        let mut x = self.state;
        x ^= x >> 13;
        x ^= x << 7;
        x ^= x >> 17;
        x
    }

    fn int_n(&mut self, n: usize) -> usize {
        if n <= 1 {
            return 0;
        }
        (self.next_u64() % (n as u64)) as usize
    }
}

/// Seeded generator for bulk list rows. The same seed always yields the
/// same rows.
#[derive(Debug, Clone)]
pub struct RowFaker {
    rng: DeterministicRng,
}

impl RowFaker {
    pub fn new(seed: u64) -> Self {
        let normalized = if seed == 0 { 1 } else { seed };
        Self {
            rng: DeterministicRng::new(normalized),
        }
    }

    fn pick<'a>(&mut self, values: &'a [&'a str]) -> &'a str {
        values[self.rng.int_n(values.len())]
    }

    /// `count` user rows with ids starting at `first_id`.
    pub fn users(&mut self, first_id: i64, count: usize) -> Vec<Row> {
        (0..count)
            .map(|offset| {
                let first = self.pick(&FIRST_NAMES);
                let last = self.pick(&LAST_NAMES);
                let domain = self.pick(&EMAIL_DOMAINS);
                Row::new()
                    .with("id", first_id + offset as i64)
                    .with("name", format!("{first} {last}"))
                    .with(
                        "email",
                        format!(
                            "{}.{}@{domain}",
                            first.to_lowercase(),
                            last.to_lowercase()
                        ),
                    )
            })
            .collect()
    }

    pub fn products(&mut self, first_id: i64, count: usize) -> Vec<Row> {
        (0..count)
            .map(|offset| {
                let id = first_id + offset as i64;
                let category = self.pick(&CATEGORIES);
                let cents = 199 + self.rng.int_n(49_800) as i64;
                Row::new()
                    .with("id", id)
                    .with(
                        "name",
                        format!(
                            "{} {}",
                            self.pick(&PRODUCT_ADJECTIVES),
                            self.pick(&PRODUCT_NOUNS)
                        ),
                    )
                    .with(
                        "sku",
                        format!("{}-{id:05}", category[..3].to_ascii_uppercase()),
                    )
                    .with("price", cents as f64 / 100.0)
                    .with("quantity", self.rng.int_n(1_000) as i64)
                    .with("isActive", self.rng.int_n(4) != 0)
                    .with("category", category)
            })
            .collect()
    }
}

/// The seeded products as rows.
pub fn product_rows() -> Vec<Row> {
    rows_from_json(seed_products())
}

/// The seeded users as rows.
pub fn user_rows() -> Vec<Row> {
    rows_from_json(seed_users())
}

fn rows_from_json(value: serde_json::Value) -> Vec<Row> {
    serde_json::from_value(value).unwrap_or_default()
}

pub fn temp_prefs_path() -> Result<(tempfile::TempDir, PathBuf)> {
    let dir = tempfile::tempdir().context("create temp dir")?;
    let path = dir.path().join("prefs.db");
    Ok((dir, path))
}
