//! # Pagination
//!
//! One engine for every listing. A [`Paginator`] knows only its page size;
//! given the total number of items and a [`PageRequest`] it resolves a
//! [`PageWindow`] (page number plus `limit`/`offset`) that a store can use to
//! fetch just the slice, and [`Page::new`] pairs the fetched items with
//! [`PageMeta`] for the presentation layer.
//!
//! Out-of-range requests never fail: garbage or non-positive page numbers
//! resolve to page 1, numbers past the end resolve to the last page. An empty
//! collection still has one (empty) page.

use serde::{Deserialize, Serialize};

use crate::error::{ForumError, Result};

/// A requested page number, as received from the outside world.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PageRequest(Option<u64>);

impl PageRequest {
    pub fn first() -> Self {
        Self(Some(1))
    }

    pub fn number(n: i64) -> Self {
        Self(u64::try_from(n).ok().filter(|n| *n >= 1))
    }

    /// Parses a raw query-string value. Missing, non-numeric, zero or
    /// negative input all mean "first page". A positive number too large to
    /// represent is still past any real last page and saturates.
    pub fn parse(raw: Option<&str>) -> Self {
        let Some(digits) = raw.map(str::trim) else {
            return Self::default();
        };
        match digits.parse::<u64>() {
            Ok(n) => Self::from(n),
            Err(_) if !digits.is_empty() && digits.bytes().all(|b| b.is_ascii_digit()) => {
                Self(Some(u64::MAX))
            }
            Err(_) => Self::default(),
        }
    }

    /// The requested page if it was a usable positive integer.
    pub fn get(&self) -> Option<u64> {
        self.0
    }
}

impl From<u64> for PageRequest {
    fn from(n: u64) -> Self {
        Self(Some(n).filter(|n| *n >= 1))
    }
}

/// The resolved slice of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageWindow {
    pub number: u64,
    pub num_pages: u64,
    pub per_page: u64,
    pub total_items: u64,
    pub offset: u64,
    pub limit: u64,
}

impl PageWindow {
    /// How many items actually fall on this page.
    pub fn len(&self) -> u64 {
        self.total_items.saturating_sub(self.offset).min(self.limit)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Paginator {
    per_page: u64,
}

impl Paginator {
    pub fn new(per_page: u64) -> Result<Self> {
        if per_page == 0 {
            return Err(ForumError::validation("page size must be at least 1"));
        }
        Ok(Self { per_page })
    }

    pub fn num_pages(&self, total_items: u64) -> u64 {
        total_items.div_ceil(self.per_page).max(1)
    }

    pub fn window(&self, total_items: u64, request: PageRequest) -> PageWindow {
        let num_pages = self.num_pages(total_items);
        let number = match request.get() {
            None => {
                tracing::debug!("page request unusable, falling back to page 1");
                1
            }
            Some(n) if n > num_pages => {
                tracing::warn!(requested = n, last = num_pages, "page past the end, falling back to last page");
                num_pages
            }
            Some(n) => n,
        };

        PageWindow {
            number,
            num_pages,
            per_page: self.per_page,
            total_items,
            offset: (number - 1) * self.per_page,
            limit: self.per_page,
        }
    }
}

/// Navigation data shown alongside a page of items.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMeta {
    pub number: u64,
    pub num_pages: u64,
    pub per_page: u64,
    pub total_items: u64,
    pub item_count: u64,
    pub has_next: bool,
    pub has_previous: bool,
}

impl PageMeta {
    pub fn next_page_number(&self) -> Option<u64> {
        self.has_next.then(|| self.number + 1)
    }

    pub fn previous_page_number(&self) -> Option<u64> {
        self.has_previous.then(|| self.number - 1)
    }

    /// 1-based index of the first item on this page; 0 when the page is empty.
    pub fn start_index(&self) -> u64 {
        if self.item_count == 0 {
            0
        } else {
            (self.number - 1) * self.per_page + 1
        }
    }

    /// 1-based index of the last item on this page; 0 when the page is empty.
    pub fn end_index(&self) -> u64 {
        if self.item_count == 0 {
            0
        } else {
            self.start_index() + self.item_count - 1
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub meta: PageMeta,
}

impl<T> Page<T> {
    /// Pairs items fetched for `window` with their metadata.
    pub fn new(items: Vec<T>, window: PageWindow) -> Self {
        let meta = PageMeta {
            number: window.number,
            num_pages: window.num_pages,
            per_page: window.per_page,
            total_items: window.total_items,
            item_count: items.len() as u64,
            has_next: window.number < window.num_pages,
            has_previous: window.number > 1,
        };
        Self { items, meta }
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// Slices an already-ordered sequence in memory.
pub fn paginate<T>(items: Vec<T>, per_page: u64, request: PageRequest) -> Result<Page<T>> {
    let paginator = Paginator::new(per_page)?;
    let window = paginator.window(items.len() as u64, request);
    let slice = items
        .into_iter()
        .skip(window.offset as usize)
        .take(window.limit as usize)
        .collect();
    Ok(Page::new(slice, window))
}
