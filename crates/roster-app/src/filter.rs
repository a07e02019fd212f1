// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use crate::value::FieldAccess;

/// Keeps rows where any of `fields` contains `query`, ignoring case.
///
/// An empty query keeps every row in its original order. Fields that are
/// missing or hold something other than text or a number never match.
pub fn filter_rows<'a, T, A>(rows: &'a [T], query: &str, fields: &[&str], access: &A) -> Vec<&'a T>
where
    A: FieldAccess<T> + ?Sized,
{
    if query.is_empty() {
        return rows.iter().collect();
    }

    let needle = query.to_lowercase();
    rows.iter()
        .filter(|row| row_matches(*row, &needle, fields, access))
        .collect()
}

fn row_matches<T, A>(row: &T, needle: &str, fields: &[&str], access: &A) -> bool
where
    A: FieldAccess<T> + ?Sized,
{
    fields.iter().any(|field| {
        access
            .value(row, field)
            .and_then(|value| value.search_text())
            .is_some_and(|text| text.to_lowercase().contains(needle))
    })
}
