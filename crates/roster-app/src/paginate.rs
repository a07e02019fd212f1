// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use std::fmt;

/// Label shown instead of a range when there is nothing to page through.
pub const EMPTY_RANGE_LABEL: &str = "0 of 0";

/// Pages at or below this count are all listed without gaps.
const FULL_WINDOW_PAGES: usize = 7;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageMeta {
    pub page: usize,
    pub page_size: usize,
    pub total_items: usize,
    pub total_pages: usize,
    pub range_label: String,
}

impl PageMeta {
    pub fn new(page: usize, page_size: usize, total_items: usize) -> Self {
        let page_size = page_size.max(1);
        Self {
            page,
            page_size,
            total_items,
            total_pages: total_pages(total_items, page_size),
            range_label: range_label(page, page_size, total_items),
        }
    }

    pub const fn has_prev(&self) -> bool {
        self.page > 1
    }

    pub const fn has_next(&self) -> bool {
        self.page < self.total_pages
    }

    pub fn window(&self) -> Vec<PageItem> {
        page_window(self.page, self.total_pages)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Page<R> {
    pub items: Vec<R>,
    pub meta: PageMeta,
}

/// Slices `rows` into the requested page. A page past the end yields no
/// items; callers clamp first when the data may have shrunk.
pub fn paginate<R: Clone>(rows: &[R], page: usize, page_size: usize) -> Page<R> {
    let page = page.max(1);
    let meta = PageMeta::new(page, page_size, rows.len());
    let start = (page - 1).saturating_mul(meta.page_size).min(rows.len());
    let end = start.saturating_add(meta.page_size).min(rows.len());
    Page {
        items: rows[start..end].to_vec(),
        meta,
    }
}

pub fn total_pages(total_items: usize, page_size: usize) -> usize {
    total_items.div_ceil(page_size.max(1)).max(1)
}

pub fn clamp_page(page: usize, total_items: usize, page_size: usize) -> usize {
    page.clamp(1, total_pages(total_items, page_size))
}

pub fn range_label(page: usize, page_size: usize, total_items: usize) -> String {
    if total_items == 0 {
        return EMPTY_RANGE_LABEL.to_owned();
    }
    let page_size = page_size.max(1);
    let page = clamp_page(page, total_items, page_size);
    let start = (page - 1) * page_size + 1;
    let end = page.saturating_mul(page_size).min(total_items);
    format!("{start}–{end}")
}

/// Target page for a click, or `None` when the click changes nothing.
pub fn go_to_page(current: usize, target: usize, total_pages: usize) -> Option<usize> {
    (target >= 1 && target <= total_pages && target != current).then_some(target)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageItem {
    Page(usize),
    Ellipsis,
}

impl fmt::Display for PageItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Page(page) => write!(f, "{page}"),
            Self::Ellipsis => f.write_str("..."),
        }
    }
}

/// Page buttons for a pager control: first and last page always, up to
/// three pages around `current`, and a gap marker where pages are skipped.
pub fn page_window(current: usize, total_pages: usize) -> Vec<PageItem> {
    let total = total_pages.max(1);
    if total <= FULL_WINDOW_PAGES {
        return (1..=total).map(PageItem::Page).collect();
    }

    let mut items = vec![PageItem::Page(1)];
    if current > 3 {
        items.push(PageItem::Ellipsis);
    }

    let start = current.saturating_sub(1).max(2);
    let end = current.saturating_add(1).min(total - 1);
    items.extend((start..=end).map(PageItem::Page));

    if current + 2 < total {
        items.push(PageItem::Ellipsis);
    }
    if !items.contains(&PageItem::Page(total)) {
        items.push(PageItem::Page(total));
    }
    items
}

#[cfg(test)]
mod tests {
    use super::{
        EMPTY_RANGE_LABEL, PageItem, clamp_page, go_to_page, page_window, paginate, range_label,
    };

    fn numbers(count: usize) -> Vec<usize> {
        (1..=count).collect()
    }

    fn render(items: &[PageItem]) -> String {
        items
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join(" ")
    }

    #[test]
    fn twenty_three_rows_make_three_pages() {
        let rows = numbers(23);
        let page = paginate(&rows, 3, 10);
        assert_eq!(page.meta.total_pages, 3);
        assert_eq!(page.meta.total_items, 23);
        assert_eq!(page.items, vec![21, 22, 23]);

        let second = paginate(&rows, 2, 10);
        assert_eq!(second.meta.range_label, "11–20");
        assert_eq!(second.items.len(), 10);
    }

    #[test]
    fn page_past_the_end_is_empty() {
        let rows = numbers(5);
        let page = paginate(&rows, 4, 10);
        assert!(page.items.is_empty());
        assert_eq!(page.meta.total_pages, 1);
    }

    #[test]
    fn empty_collection_has_one_page_and_empty_label() {
        let rows: Vec<usize> = Vec::new();
        let page = paginate(&rows, 1, 10);
        assert_eq!(page.meta.total_pages, 1);
        assert_eq!(page.meta.range_label, EMPTY_RANGE_LABEL);
        assert!(!page.meta.has_prev());
        assert!(!page.meta.has_next());
    }

    #[test]
    fn range_label_clamps_last_page() {
        assert_eq!(range_label(1, 10, 50), "1–10");
        assert_eq!(range_label(3, 10, 23), "21–23");
    }

    #[test]
    fn range_label_never_runs_past_the_data() {
        assert_eq!(range_label(5, 10, 23), "21–23");
        assert_eq!(range_label(0, 10, 23), "1–10");
        assert_eq!(range_label(usize::MAX, usize::MAX, 3), "1–3");
    }

    #[test]
    fn clamp_page_bounds() {
        assert_eq!(clamp_page(0, 23, 10), 1);
        assert_eq!(clamp_page(9, 23, 10), 3);
        assert_eq!(clamp_page(2, 23, 10), 2);
    }

    #[test]
    fn go_to_page_ignores_out_of_range_and_current() {
        assert_eq!(go_to_page(1, 2, 3), Some(2));
        assert_eq!(go_to_page(2, 2, 3), None);
        assert_eq!(go_to_page(1, 0, 3), None);
        assert_eq!(go_to_page(1, 4, 3), None);
    }

    #[test]
    fn small_page_counts_list_every_page() {
        assert_eq!(render(&page_window(1, 1)), "1");
        assert_eq!(render(&page_window(4, 7)), "1 2 3 4 5 6 7");
    }

    #[test]
    fn window_near_start() {
        assert_eq!(render(&page_window(1, 10)), "1 2 ... 10");
        assert_eq!(render(&page_window(2, 10)), "1 2 3 ... 10");
        assert_eq!(render(&page_window(3, 10)), "1 2 3 4 ... 10");
    }

    #[test]
    fn window_in_the_middle() {
        assert_eq!(render(&page_window(4, 10)), "1 ... 3 4 5 ... 10");
        assert_eq!(render(&page_window(5, 10)), "1 ... 4 5 6 ... 10");
    }

    #[test]
    fn window_near_end() {
        assert_eq!(render(&page_window(8, 10)), "1 ... 7 8 9 10");
        assert_eq!(render(&page_window(9, 10)), "1 ... 8 9 10");
        assert_eq!(render(&page_window(10, 10)), "1 ... 9 10");
    }
}
