// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

use serde::{Deserialize, Serialize};

use crate::paginate::clamp_page;

pub const DEFAULT_PAGE_SIZE: usize = 10;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortDirection {
    Asc,
    Desc,
}

impl SortDirection {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "asc" => Some(Self::Asc),
            "desc" => Some(Self::Desc),
            _ => None,
        }
    }
}

/// Which column the list is ordered by, if any.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SortState {
    #[default]
    Unsorted,
    By {
        column: String,
        direction: SortDirection,
    },
}

impl SortState {
    pub fn by(column: &str, direction: SortDirection) -> Self {
        Self::By {
            column: column.to_owned(),
            direction,
        }
    }

    pub fn column(&self) -> Option<&str> {
        match self {
            Self::Unsorted => None,
            Self::By { column, .. } => Some(column),
        }
    }

    pub fn direction(&self) -> Option<SortDirection> {
        match self {
            Self::Unsorted => None,
            Self::By { direction, .. } => Some(*direction),
        }
    }

    pub fn direction_for(&self, column: &str) -> Option<SortDirection> {
        match self {
            Self::By {
                column: current,
                direction,
            } if current == column => Some(*direction),
            _ => None,
        }
    }

    /// Header click: `asc -> desc -> unsorted` on the same column, `asc` on
    /// any other column.
    pub fn toggle(&self, column: &str) -> Self {
        match self.direction_for(column) {
            None => Self::by(column, SortDirection::Asc),
            Some(SortDirection::Asc) => Self::by(column, SortDirection::Desc),
            Some(SortDirection::Desc) => Self::Unsorted,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QueryState {
    pub search_text: String,
    pub sort: SortState,
    pub page: usize,
    pub page_size: usize,
}

impl Default for QueryState {
    fn default() -> Self {
        Self::with_page_size(DEFAULT_PAGE_SIZE)
    }
}

impl QueryState {
    pub fn with_page_size(page_size: usize) -> Self {
        Self {
            search_text: String::new(),
            sort: SortState::Unsorted,
            page: 1,
            page_size: page_size.max(1),
        }
    }

    /// Returns false when the text is unchanged; a new search goes back to
    /// the first page.
    pub fn set_search(&mut self, text: &str) -> bool {
        if self.search_text == text {
            return false;
        }
        self.search_text = text.to_owned();
        self.page = 1;
        true
    }

    pub fn toggle_sort(&mut self, column: &str) -> &SortState {
        self.sort = self.sort.toggle(column);
        self.page = 1;
        &self.sort
    }

    pub fn set_page_size(&mut self, page_size: usize) {
        self.page_size = page_size.max(1);
        self.page = 1;
    }

    /// Pulls `page` back into range for a filtered collection of
    /// `filtered_count` rows. Returns true when the page moved.
    pub fn clamp(&mut self, filtered_count: usize) -> bool {
        let clamped = clamp_page(self.page, filtered_count, self.page_size);
        let moved = clamped != self.page;
        self.page = clamped;
        moved
    }
}
