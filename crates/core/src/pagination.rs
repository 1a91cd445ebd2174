//! Page window selection
//!
//! Pure functions that decide which page numbers a pagination control shows.
//! A window of pages sits around the current page. Page 1 and the last page
//! are always shown, and any run of hidden pages between them and the window
//! collapses into a single ellipsis.

use std::ops::RangeInclusive;

use thiserror::Error;

/// Most pages a control lists when the window covers every page
pub const MAX_LISTED_PAGES: usize = 10_000;

/// Error type for window selection
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PaginationError {
    #[error("Total page count must be at least 1, got {0}")]
    InvalidTotal(usize),

    #[error("Page {page} is out of range. Only {total} pages available.")]
    PageOutOfRange { page: usize, total: usize },

    #[error("Cannot list all {total} pages, the limit is {limit}. Set a window size.")]
    TooManyPages { total: usize, limit: usize },

    #[error("Items per page must be at least 1")]
    InvalidPerPage,

    #[error("{count} items at {per_page} per page make {expected} pages, not {total}")]
    CountMismatch {
        count: usize,
        per_page: usize,
        expected: usize,
        total: usize,
    },
}

/// One position in a pagination control
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WindowSlot {
    Page(usize),
    Ellipsis,
}

/// Inputs for a single window computation
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationRequest {
    pub current_page: usize,
    pub total_pages: usize,
    /// Number of pages in the window. `0` shows every page.
    pub window_size: usize,
}

impl PaginationRequest {
    pub fn new(current_page: usize, total_pages: usize, window_size: usize) -> Self {
        Self {
            current_page,
            total_pages,
            window_size,
        }
    }

    /// Check `1 <= current_page <= total_pages`
    pub fn validate(&self) -> Result<(), PaginationError> {
        if self.total_pages == 0 {
            return Err(PaginationError::InvalidTotal(self.total_pages));
        }

        if self.current_page == 0 || self.current_page > self.total_pages {
            return Err(PaginationError::PageOutOfRange {
                page: self.current_page,
                total: self.total_pages,
            });
        }

        Ok(())
    }

    /// Inclusive bounds of the page window
    ///
    /// When the window can't be centred, the missing slots are taken from the
    /// lower side if there is room there, otherwise from the upper side. An
    /// even-sized window in the middle of the range leans toward page 1.
    pub fn bounds(&self) -> Result<RangeInclusive<usize>, PaginationError> {
        self.validate()?;

        let total = self.total_pages;
        if self.window_size == 0 || self.window_size >= total {
            if total > MAX_LISTED_PAGES {
                return Err(PaginationError::TooManyPages {
                    total,
                    limit: MAX_LISTED_PAGES,
                });
            }
            return Ok(1..=total);
        }

        let span = self.window_size - 1;
        let half = span / 2;

        let mut min = self.current_page.saturating_sub(half).max(1);
        let mut max = self.current_page.saturating_add(half).min(total);

        let diff = max - min;
        if diff < span {
            let shift = span - diff;
            if min > shift {
                min -= shift;
            } else {
                max += shift;
            }
        }

        Ok(min..=max)
    }

    /// Ordered slots to render, with page 1, the last page and ellipses added
    pub fn slots(&self) -> Result<Vec<WindowSlot>, PaginationError> {
        let bounds = self.bounds()?;
        let (start, end) = (*bounds.start(), *bounds.end());
        let total = self.total_pages;

        let mut slots = Vec::with_capacity(end - start + 5);

        if start > 1 {
            slots.push(WindowSlot::Page(1));
            if start - 1 > 1 {
                slots.push(WindowSlot::Ellipsis);
            }
        }

        slots.extend(bounds.map(WindowSlot::Page));

        if end < total {
            if total - end > 1 {
                slots.push(WindowSlot::Ellipsis);
            }
            slots.push(WindowSlot::Page(total));
        }

        Ok(slots)
    }
}

/// Compute the slots for `current_page` out of `total_pages`
///
/// # Arguments
/// * `current_page` - 1-indexed current page
/// * `total_pages` - Total number of pages (at least 1)
/// * `window_size` - Pages shown around the current one, `0` for all of them
pub fn compute_window(
    current_page: usize,
    total_pages: usize,
    window_size: usize,
) -> Result<Vec<WindowSlot>, PaginationError> {
    PaginationRequest::new(current_page, total_pages, window_size).slots()
}
