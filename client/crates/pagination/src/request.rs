//! Client-side page requests.

use url::Url;

/// Requested slice of a paginated resource.
///
/// ## Invariants
/// - `take` and `page` are at least 1; smaller inputs are raised to 1.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    take: u32,
    page: u32,
}

impl PageRequest {
    /// Request `take` records from the one-based `page`.
    #[must_use]
    pub const fn new(take: u32, page: u32) -> Self {
        Self {
            take: if take == 0 { 1 } else { take },
            page: if page == 0 { 1 } else { page },
        }
    }

    /// Number of records requested.
    #[must_use]
    pub const fn take(&self) -> u32 {
        self.take
    }

    /// One-based page index requested.
    #[must_use]
    pub const fn page(&self) -> u32 {
        self.page
    }

    /// Append the `take` and `page` query parameters to `url`.
    ///
    /// ```
    /// use pagination::PageRequest;
    /// use url::Url;
    ///
    /// let mut url = Url::parse("http://localhost/posts").unwrap();
    /// PageRequest::new(5, 2).apply_to(&mut url);
    /// assert_eq!(url.as_str(), "http://localhost/posts?take=5&page=2");
    /// ```
    pub fn apply_to(&self, url: &mut Url) {
        url.query_pairs_mut()
            .append_pair("take", &self.take.to_string())
            .append_pair("page", &self.page.to_string());
    }
}
