// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::cmp::Ordering;

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

use crate::query::{SortDirection, SortState};
use crate::value::{FieldAccess, Value};

/// Orders `rows` by the sorted column. Unsorted state hands the rows back
/// untouched; ties and incomparable values keep their input order.
pub fn sort_rows<'a, T, A>(rows: Vec<&'a T>, sort: &SortState, access: &A) -> Vec<&'a T>
where
    A: FieldAccess<T> + ?Sized,
{
    let SortState::By { column, direction } = sort else {
        return rows;
    };
    if column.is_empty() {
        return rows;
    }

    let keys = rows
        .iter()
        .map(|row| access.value(row, column))
        .collect::<Vec<_>>();
    let mut order = (0..rows.len()).collect::<Vec<_>>();
    merge_sort(&mut order, &mut |left: &usize, right: &usize| {
        let ordering = compare_values(keys[*left].as_ref(), keys[*right].as_ref());
        match direction {
            SortDirection::Asc => ordering,
            SortDirection::Desc => ordering.reverse(),
        }
    });
    order.into_iter().map(|index| rows[index]).collect()
}

// std's sort may panic when the comparator is not a total order, and a column
// mixing text and numbers is not one. This merge keeps the left element on
// ties, so it is stable under any comparator.
fn merge_sort<K: Copy>(items: &mut Vec<K>, compare: &mut impl FnMut(&K, &K) -> Ordering) {
    if items.len() <= 1 {
        return;
    }

    let mut right = items.split_off(items.len() / 2);
    let mut left = std::mem::take(items);
    merge_sort(&mut left, compare);
    merge_sort(&mut right, compare);

    items.reserve(left.len() + right.len());
    let (mut i, mut j) = (0, 0);
    while i < left.len() && j < right.len() {
        if compare(&right[j], &left[i]) == Ordering::Less {
            items.push(right[j]);
            j += 1;
        } else {
            items.push(left[i]);
            i += 1;
        }
    }
    items.extend_from_slice(&left[i..]);
    items.extend_from_slice(&right[j..]);
}

pub fn compare_values(left: Option<&Value>, right: Option<&Value>) -> Ordering {
    match (left, right) {
        (Some(Value::Text(left)), Some(Value::Text(right))) => compare_text(left, right),
        (Some(left), Some(right)) => match (left.as_f64(), right.as_f64()) {
            (Some(left), Some(right)) => left.partial_cmp(&right).unwrap_or(Ordering::Equal),
            _ => Ordering::Equal,
        },
        _ => Ordering::Equal,
    }
}

// Base letters first, then accents, then case with lowercase ahead.
fn compare_text(left: &str, right: &str) -> Ordering {
    collation_key(left)
        .cmp(&collation_key(right))
        .then_with(|| left.to_lowercase().cmp(&right.to_lowercase()))
        .then_with(|| left.cmp(right).reverse())
}

fn collation_key(text: &str) -> String {
    text.nfkd()
        .filter(|c| !is_combining_mark(*c))
        .flat_map(char::to_lowercase)
        .collect()
}
