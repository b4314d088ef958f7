//! Record types served by the bulletin-board, marketplace, product and price
//! services.
//!
//! Wire names follow the services exactly, including their inconsistent
//! casing (`bookid`, `chapterID`, `authorId`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::ports::Resource;

/// A post on the bulletin board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BulletinEntry {
    /// Server-assigned identifier.
    pub id: String,
    /// Headline.
    pub title: String,
    /// Body text.
    pub content: String,
    /// Creation instant assigned by the server.
    pub created_at: DateTime<Utc>,
}

/// Client-submitted bulletin post.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BulletinDraft {
    /// Headline.
    pub title: String,
    /// Body text.
    pub content: String,
}

impl Resource for BulletinEntry {
    type Id = String;
    type Draft = BulletinDraft;

    fn id(&self) -> &String {
        &self.id
    }
}

/// A book listed on the marketplace.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Book {
    pub id: u64,
    pub name: String,
    /// Blurb shown on the catalogue page.
    pub description: String,
    /// Merchant account that receives chapter payments.
    pub author_id: u64,
}

/// Client-submitted book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BookDraft {
    pub name: String,
    pub description: String,
}

impl Resource for Book {
    type Id = u64;
    type Draft = BookDraft;

    fn id(&self) -> &u64 {
        &self.id
    }
}

/// A purchasable chapter of a book.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Chapter {
    pub id: u64,
    #[serde(rename = "bookid")]
    pub book_id: u64,
    pub name: String,
    /// Price in the marketplace's smallest currency unit.
    pub price: u64,
    /// Full text; previews of unbought chapters leave it out.
    #[serde(default)]
    pub content: String,
}

/// Client-submitted chapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ChapterDraft {
    #[serde(rename = "bookid")]
    pub book_id: u64,
    pub name: String,
    pub price: u64,
    pub content: String,
}

impl Resource for Chapter {
    type Id = u64;
    type Draft = ChapterDraft;

    fn id(&self) -> &u64 {
        &self.id
    }
}

/// A chapter purchase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: u64,
    #[serde(rename = "chapterID")]
    pub chapter_id: u64,
    #[serde(rename = "bookID")]
    pub book_id: u64,
    /// Reader who bought the chapter.
    #[serde(rename = "payingUserID")]
    pub paying_user_id: u64,
    /// Author credited with the sale.
    #[serde(rename = "receivingUserID")]
    pub receiving_user_id: u64,
    /// Chapter price at the time of purchase.
    pub amount: u64,
}

/// Client-submitted purchase; the server fills in the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct TransactionDraft {
    #[serde(rename = "chapterID")]
    pub chapter_id: u64,
}

impl Resource for Transaction {
    type Id = u64;
    type Draft = TransactionDraft;

    fn id(&self) -> &u64 {
        &self.id
    }
}

/// A supermarket listing prices.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Merchant {
    pub id: u64,
    pub name: String,
    /// Account role as reported by the user service.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<u8>,
}

/// Client-submitted merchant.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MerchantDraft {
    pub name: String,
}

impl Resource for Merchant {
    type Id = u64;
    type Draft = MerchantDraft;

    fn id(&self) -> &u64 {
        &self.id
    }
}

/// A product that merchants can price.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: u64,
    #[serde(default)]
    pub description: String,
    /// European article number; absent for unlabelled goods.
    #[serde(default)]
    pub ean: u64,
}

/// Client-submitted product.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProductDraft {
    pub description: String,
    pub ean: u64,
}

impl Resource for Product {
    type Id = u64;
    type Draft = ProductDraft;

    fn id(&self) -> &u64 {
        &self.id
    }
}

/// Composite identity of a price: one product at one merchant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceKey {
    pub product_id: u64,
    /// Merchant charging the price.
    pub user_id: u64,
}

impl std::fmt::Display for PriceKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.product_id, self.user_id)
    }
}

/// The price a merchant charges for a product.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Price {
    #[serde(flatten)]
    pub key: PriceKey,
    pub price: f64,
}

/// Client-submitted price.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct PriceDraft {
    pub price: f64,
}

impl Resource for Price {
    type Id = PriceKey;
    type Draft = PriceDraft;

    fn id(&self) -> &PriceKey {
        &self.key
    }

    fn path_segments(id: &PriceKey) -> Vec<String> {
        vec![id.product_id.to_string(), id.user_id.to_string()]
    }
}
