//! Domain primitives, the list store and the session holder.
//!
//! Purpose: Keep the client's behaviour independent of the HTTP stack. The
//! types here talk to the outside world only through the driven ports in
//! [`ports`].
//!
//! Public surface:
//! - LoginCredentials: validated login/registration input.
//! - BearerToken, SessionHandle, SessionService: the bearer session.
//! - ListStore: ordered, paginated mirror of one resource.
//! - Resource types (BulletinEntry, Book, Chapter, Transaction, Merchant,
//!   Product, Price) and their drafts.
//! - Joins (LibraryQuery, MarketQuery, MerchantDetailQuery) combining
//!   resources on the client.

pub mod auth;
pub mod joins;
pub mod list_store;
pub mod ports;
pub mod resources;
pub mod session;

pub use self::auth::{LoginCredentials, LoginValidationError};
pub use self::joins::{
    LibraryQuery, MarketQuery, MerchantDetail, MerchantDetailQuery, MerchantSummary,
    bought_books, merchant_summaries, unique_ids,
};
pub use self::list_store::{FetchOutcome, ListStore, LoadStatus, UpdateOutcome, ViewLease};
pub use self::resources::{
    Book, BookDraft, BulletinDraft, BulletinEntry, Chapter, ChapterDraft, Merchant,
    MerchantDraft, Price, PriceDraft, PriceKey, Product, ProductDraft, Transaction,
    TransactionDraft,
};
pub use self::session::{
    BearerToken, HydrateOutcome, SessionError, SessionHandle, SessionService,
    TokenValidationError,
};
