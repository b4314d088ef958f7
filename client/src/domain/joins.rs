//! Client-side joins across resources.
//!
//! The marketplace and price services expose no joined views, so the client
//! fetches collections side by side and combines them locally. Lookups by id
//! fan out one request per distinct id and fail as soon as one of them does.

use std::collections::{HashMap, HashSet};
use std::hash::Hash;
use std::sync::Arc;

use futures_util::future::try_join_all;
use futures_util::try_join;

use crate::domain::ports::{RequestError, ResourceClient};
use crate::domain::resources::{Book, Merchant, Price, Product, Transaction};

/// Distinct ids in first-seen order.
pub fn unique_ids<T, I>(ids: I) -> Vec<T>
where
    T: Eq + Hash + Clone,
    I: IntoIterator<Item = T>,
{
    let mut seen = HashSet::new();
    ids.into_iter().filter(|id| seen.insert(id.clone())).collect()
}

/// Books the caller has paid for, in catalogue order.
///
/// A book counts as bought once any transaction references it.
pub fn bought_books(books: Vec<Book>, transactions: &[Transaction]) -> Vec<Book> {
    let bought: HashSet<u64> = transactions.iter().map(|t| t.book_id).collect();
    books
        .into_iter()
        .filter(|book| bought.contains(&book.id))
        .collect()
}

/// A merchant together with the number of products it prices.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MerchantSummary {
    pub merchant: Merchant,
    pub products_count: usize,
}

/// Pair every merchant with the count of prices listed under its id.
pub fn merchant_summaries(merchants: Vec<Merchant>, prices: &[Price]) -> Vec<MerchantSummary> {
    let mut counts: HashMap<u64, usize> = HashMap::new();
    for price in prices {
        *counts.entry(price.key.user_id).or_default() += 1;
    }
    merchants
        .into_iter()
        .map(|merchant| {
            let products_count = counts.get(&merchant.id).copied().unwrap_or_default();
            MerchantSummary {
                merchant,
                products_count,
            }
        })
        .collect()
}

/// Reader's library: books joined with the reader's transactions.
pub struct LibraryQuery<B, T> {
    books: Arc<B>,
    transactions: Arc<T>,
}

impl<B, T> LibraryQuery<B, T>
where
    B: ResourceClient<Book>,
    T: ResourceClient<Transaction>,
{
    pub fn new(books: Arc<B>, transactions: Arc<T>) -> Self {
        Self {
            books,
            transactions,
        }
    }

    /// Fetch both collections concurrently and keep the bought books.
    pub async fn bought_books(&self) -> Result<Vec<Book>, RequestError> {
        let (books, transactions) =
            try_join!(self.books.list_all(), self.transactions.list_all())?;
        Ok(bought_books(books, &transactions))
    }

    /// The book a purchase belongs to.
    pub async fn book_for(&self, transaction: &Transaction) -> Result<Book, RequestError> {
        self.books.get(&transaction.book_id).await
    }

    /// Books behind `transactions`, fetched once per distinct book in the
    /// order the transactions first mention them.
    pub async fn books_for(&self, transactions: &[Transaction]) -> Result<Vec<Book>, RequestError> {
        let ids = unique_ids(transactions.iter().map(|t| t.book_id));
        try_join_all(ids.iter().map(|id| self.books.get(id))).await
    }
}

/// Merchant overview for the price comparison screen.
pub struct MarketQuery<M, P> {
    merchants: Arc<M>,
    prices: Arc<P>,
}

impl<M, P> MarketQuery<M, P>
where
    M: ResourceClient<Merchant>,
    P: ResourceClient<Price>,
{
    pub fn new(merchants: Arc<M>, prices: Arc<P>) -> Self {
        Self { merchants, prices }
    }

    /// Fetch merchants and prices concurrently and count products per merchant.
    pub async fn merchant_summaries(&self) -> Result<Vec<MerchantSummary>, RequestError> {
        let (merchants, prices) = try_join!(self.merchants.list_all(), self.prices.list_all())?;
        Ok(merchant_summaries(merchants, &prices))
    }
}

/// One merchant with its prices and the products they refer to.
#[derive(Debug, Clone, PartialEq)]
pub struct MerchantDetail {
    pub merchant: Merchant,
    pub prices: Vec<Price>,
    /// Priced products sorted by description.
    pub products: Vec<Product>,
}

/// Merchant page: the merchant, its prices and the priced products.
pub struct MerchantDetailQuery<M, P, D> {
    merchants: Arc<M>,
    prices: Arc<P>,
    products: Arc<D>,
}

impl<M, P, D> MerchantDetailQuery<M, P, D>
where
    M: ResourceClient<Merchant>,
    P: ResourceClient<Price>,
    D: ResourceClient<Product>,
{
    /// `prices` may list every price or only the merchant's own; prices of
    /// other merchants are ignored either way.
    pub fn new(merchants: Arc<M>, prices: Arc<P>, products: Arc<D>) -> Self {
        Self {
            merchants,
            prices,
            products,
        }
    }

    /// Fetch the merchant and prices concurrently, then each distinct
    /// product once.
    pub async fn detail(&self, merchant_id: u64) -> Result<MerchantDetail, RequestError> {
        let (merchant, prices) =
            try_join!(self.merchants.get(&merchant_id), self.prices.list_all())?;
        let prices: Vec<Price> = prices
            .into_iter()
            .filter(|price| price.key.user_id == merchant_id)
            .collect();
        let ids = unique_ids(prices.iter().map(|price| price.key.product_id));
        let mut products = try_join_all(ids.iter().map(|id| self.products.get(id))).await?;
        products.sort_by(|a, b| a.description.cmp(&b.description));
        Ok(MerchantDetail {
            merchant,
            prices,
            products,
        })
    }
}
