//! Generic pagination over ordered sequences.
//!
//! Shared by the coverage report and the suggestion report: both return one
//! window of a sorted list plus enough metadata to render "showing X-Y of N"
//! style navigation.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Smallest accepted page size.
pub const MIN_PAGE_SIZE: usize = 1;

/// Largest accepted page size.
pub const MAX_PAGE_SIZE: usize = 5;

/// Errors for caller-supplied pagination parameters.
#[derive(Debug, Error)]
pub enum PageRequestError {
    /// Page size outside the accepted range.
    #[error("page size must be between {MIN_PAGE_SIZE} and {MAX_PAGE_SIZE}, got {0}")]
    InvalidPageSize(usize),
}

/// A requested window: how many items per page, and which page.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    /// Items per page, at least 1.
    pub page_size: usize,

    /// Zero-based page index. Out-of-range values clamp to the last page.
    pub page_index: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            page_size: MAX_PAGE_SIZE,
            page_index: 0,
        }
    }
}

impl PageRequest {
    /// Validate caller-supplied parameters.
    ///
    /// # Example
    ///
    /// ```
    /// use pagescope::paginate::PageRequest;
    ///
    /// assert!(PageRequest::new(5, 0).is_ok());
    /// assert!(PageRequest::new(0, 0).is_err());
    /// assert!(PageRequest::new(6, 0).is_err());
    /// ```
    pub fn new(page_size: usize, page_index: usize) -> Result<Self, PageRequestError> {
        if !(MIN_PAGE_SIZE..=MAX_PAGE_SIZE).contains(&page_size) {
            return Err(PageRequestError::InvalidPageSize(page_size));
        }
        Ok(Self {
            page_size,
            page_index,
        })
    }
}

/// Metadata describing one returned page.
///
/// `start_index`/`end_index` are 1-based inclusive for display; an empty
/// input yields `0-0 of 0` on page 1 of 1 so the metadata is always
/// well-defined.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    /// 1-based index of the first item on this page, 0 when empty.
    pub start_index: usize,

    /// 1-based index of the last item on this page, 0 when empty.
    pub end_index: usize,

    /// Total number of items across all pages.
    pub total_items: usize,

    /// Zero-based index of the returned page, after clamping.
    pub current_page: usize,

    /// Total page count, at least 1.
    pub total_pages: usize,

    /// True when a later page exists.
    pub has_next_page: bool,

    /// True when an earlier page exists.
    pub has_previous_page: bool,
}

/// Slice one page out of `items`.
///
/// A zero page size is treated as 1 so the division below is always
/// defined; `PageRequest::new` rejects it before it gets here.
///
/// # Example
///
/// ```
/// use pagescope::paginate::{paginate, PageRequest};
///
/// let items: Vec<u32> = (1..=7).collect();
/// let (page, info) = paginate(&items, &PageRequest { page_size: 5, page_index: 1 });
///
/// assert_eq!(page, &[6, 7]);
/// assert_eq!(info.start_index, 6);
/// assert_eq!(info.end_index, 7);
/// assert!(info.has_previous_page);
/// assert!(!info.has_next_page);
/// ```
pub fn paginate<'a, T>(items: &'a [T], request: &PageRequest) -> (&'a [T], PageInfo) {
    let page_size = request.page_size.max(1);
    let total_items = items.len();
    let total_pages = total_items.div_ceil(page_size).max(1);
    let current_page = request.page_index.min(total_pages - 1);

    let start = current_page * page_size;
    let end = (start + page_size).min(total_items);
    let page = if start < total_items {
        &items[start..end]
    } else {
        &items[0..0]
    };

    let info = PageInfo {
        start_index: if page.is_empty() { 0 } else { start + 1 },
        end_index: if page.is_empty() { 0 } else { end },
        total_items,
        current_page,
        total_pages,
        has_next_page: current_page + 1 < total_pages,
        has_previous_page: current_page > 0,
    };

    (page, info)
}
