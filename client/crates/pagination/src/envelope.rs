//! Server-side page envelope and its metadata.

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Pagination metadata reported by the server for one page.
///
/// The all-zero value (see [`Pagination::default`]) means no page has been
/// loaded yet.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    /// One-based index of the page these records belong to.
    pub current_page: u32,
    /// Maximum number of records per page.
    pub page_size: u32,
    /// Number of pages the resource currently spans.
    pub total_pages: u32,
    /// Number of records the resource currently holds.
    pub total_records: u64,
}

impl Pagination {
    /// Return whether no further page is expected.
    ///
    /// This is true before anything is loaded because `0 >= 0`.
    ///
    /// ```
    /// use pagination::Pagination;
    ///
    /// assert!(Pagination::default().reached_end());
    /// ```
    #[must_use]
    pub const fn reached_end(&self) -> bool {
        self.current_page >= self.total_pages
    }

    /// Return the one-based index of the page following this one.
    #[must_use]
    pub const fn next_page(&self) -> u32 {
        self.current_page.saturating_add(1)
    }

    /// Return whether this is the initial all-zero value.
    #[must_use]
    pub const fn is_initial(&self) -> bool {
        self.current_page == 0
            && self.page_size == 0
            && self.total_pages == 0
            && self.total_records == 0
    }

    /// Check the metadata against the number of records it accompanies.
    ///
    /// The page range check only applies to pages carrying records: an empty
    /// resource may report page 1 of 0, and a request past the last page is
    /// answered with an empty slice numbered after it. The size check is
    /// skipped when the server reports no page size.
    ///
    /// # Errors
    ///
    /// Returns [`PageValidationError`] when records arrive for a page past the
    /// last one or when more records arrived than the page size allows.
    pub fn validate(&self, record_count: usize) -> Result<(), PageValidationError> {
        if record_count > 0 && self.current_page > self.total_pages {
            return Err(PageValidationError::CurrentPageOutOfRange {
                current_page: self.current_page,
                total_pages: self.total_pages,
            });
        }
        let page_size = usize::try_from(self.page_size).unwrap_or(usize::MAX);
        if self.page_size > 0 && record_count > page_size {
            return Err(PageValidationError::TooManyRecords {
                records: record_count,
                page_size: self.page_size,
            });
        }
        Ok(())
    }
}

/// Reasons a page envelope is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PageValidationError {
    /// The page index lies past the last page.
    #[error("current page {current_page} exceeds total pages {total_pages}")]
    CurrentPageOutOfRange {
        /// Reported page index.
        current_page: u32,
        /// Reported page count.
        total_pages: u32,
    },
    /// More records arrived than one page may hold.
    #[error("page holds {records} records but page size is {page_size}")]
    TooManyRecords {
        /// Number of records received.
        records: usize,
        /// Reported page size.
        page_size: u32,
    },
}

/// One slice of a paginated resource.
///
/// ## Invariants
/// - `page` passes [`Pagination::validate`] for `records.len()`.
///
/// Deserialisation enforces the invariant, so a decoded page can be trusted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "PageDto<T>")]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Page<T> {
    page: Pagination,
    records: Vec<T>,
}

#[derive(Deserialize)]
struct PageDto<T> {
    page: Pagination,
    records: Vec<T>,
}

impl<T> TryFrom<PageDto<T>> for Page<T> {
    type Error = PageValidationError;

    fn try_from(value: PageDto<T>) -> Result<Self, Self::Error> {
        Self::try_new(value.page, value.records)
    }
}

impl<T> Page<T> {
    /// Build a page after validating the metadata against the records.
    ///
    /// # Errors
    ///
    /// Returns [`PageValidationError`] when the invariant does not hold.
    pub fn try_new(page: Pagination, records: Vec<T>) -> Result<Self, PageValidationError> {
        page.validate(records.len())?;
        Ok(Self { page, records })
    }

    /// Pagination metadata for this slice.
    #[must_use]
    pub const fn pagination(&self) -> Pagination {
        self.page
    }

    /// Records of this slice in server order.
    #[must_use]
    pub fn records(&self) -> &[T] {
        &self.records
    }

    /// Split the page into metadata and records.
    #[must_use]
    pub fn into_parts(self) -> (Pagination, Vec<T>) {
        (self.page, self.records)
    }
}
