//! Page envelope primitives for paginated REST resources.
//!
//! Servers answer paginated list requests with a [`Page`]: the records of one
//! slice plus [`Pagination`] metadata describing where that slice sits.
//! Clients describe the slice they want with a [`PageRequest`], rendered as
//! `take` and `page` query parameters.
//!
//! ```
//! use pagination::{Page, PageRequest};
//!
//! let body = r#"{
//!     "page": { "currentPage": 1, "pageSize": 2, "totalPages": 1, "totalRecords": 2 },
//!     "records": ["a", "b"]
//! }"#;
//! let page: Page<String> = serde_json::from_str(body).unwrap();
//! assert!(page.pagination().reached_end());
//!
//! let next = PageRequest::new(2, page.pagination().next_page());
//! assert_eq!(next.page(), 2);
//! ```

mod envelope;
mod request;

pub use envelope::{Page, PageValidationError, Pagination};
pub use request::PageRequest;
