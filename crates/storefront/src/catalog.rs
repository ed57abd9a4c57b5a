//! Read-through accessors for products, collections and search.
//!
//! Each accessor checks the cache first and only calls the gateway on a miss
//! or an expired entry; see [`CacheStore::read_through`](crate::cache::CacheStore::read_through).
//! Entities are returned as raw JSON for the rendering engine.

use serde_json::{Value, json};
use tracing::instrument;

use crate::cache::CacheKey;
use crate::context::Storefront;
use crate::error::{Error, Result};
use crate::shopify::{
    CollectionsData, ProductByHandleData, ProductByIdData, ProductsByCollectionData, ProductsData,
    decode, queries,
};

impl Storefront {
    /// Fetch a product by its GID.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` if the store has no such product, or the
    /// gateway error if the request fails.
    #[instrument(skip(self))]
    pub async fn product_by_id(&self, id: &str) -> Result<Value> {
        self.cache()
            .read_through(CacheKey::ProductById(id), || self.fetch_product_by_id(id))
            .await
    }

    /// Fetch a product by its handle.
    ///
    /// # Errors
    ///
    /// Returns `Error::NotFound` if the store has no such product, or the
    /// gateway error if the request fails.
    #[instrument(skip(self))]
    pub async fn product_by_handle(&self, handle: &str) -> Result<Value> {
        self.cache()
            .read_through(CacheKey::ProductByHandle(handle), || {
                self.fetch_product_by_handle(handle)
            })
            .await
    }

    /// Fetch the first 50 collections.
    ///
    /// # Errors
    ///
    /// Returns the gateway error if the request fails.
    #[instrument(skip(self))]
    pub async fn collections(&self) -> Result<Vec<Value>> {
        self.cache()
            .read_through(CacheKey::CollectionsList, || self.fetch_collections())
            .await
    }

    /// Fetch up to 100 products of the collection titled `name`.
    ///
    /// A name that matches no collection yields an empty list, which is
    /// cached like any other result.
    ///
    /// # Errors
    ///
    /// Returns the gateway error if the request fails.
    #[instrument(skip(self))]
    pub async fn products_by_collection(&self, name: &str) -> Result<Vec<Value>> {
        self.cache()
            .read_through(CacheKey::Collection(name), || {
                self.fetch_products_by_collection(name)
            })
            .await
    }

    /// Search products, returning up to 100 matches.
    ///
    /// # Errors
    ///
    /// Returns the gateway error if the request fails.
    #[instrument(skip(self))]
    pub async fn search_products(&self, term: &str) -> Result<Vec<Value>> {
        self.cache()
            .read_through(CacheKey::Search(term), || self.fetch_search(term))
            .await
    }

    // =========================================================================
    // Remote reads
    // =========================================================================

    async fn fetch_product_by_id(&self, id: &str) -> Result<Value> {
        let data: ProductByIdData = decode(
            self.gateway()
                .request(&queries::GET_PRODUCT_BY_ID, json!({ "id": id }))
                .await?,
        )?;
        data.product
            .filter(|p| !p.is_null())
            .ok_or_else(|| Error::NotFound(format!("product {id}")))
    }

    async fn fetch_product_by_handle(&self, handle: &str) -> Result<Value> {
        let data: ProductByHandleData = decode(
            self.gateway()
                .request(&queries::GET_PRODUCT_BY_HANDLE, json!({ "handle": handle }))
                .await?,
        )?;
        data.product_by_handle
            .filter(|p| !p.is_null())
            .ok_or_else(|| Error::NotFound(format!("product {handle}")))
    }

    async fn fetch_collections(&self) -> Result<Vec<Value>> {
        let data: CollectionsData = decode(
            self.gateway()
                .request(&queries::GET_COLLECTIONS, json!({}))
                .await?,
        )?;
        Ok(data.collections.into_nodes())
    }

    async fn fetch_products_by_collection(&self, name: &str) -> Result<Vec<Value>> {
        let data: ProductsByCollectionData = decode(
            self.gateway()
                .request(
                    &queries::GET_PRODUCTS_BY_COLLECTION,
                    json!({ "collectionTitle": format!("title:{name}") }),
                )
                .await?,
        )?;
        Ok(data
            .collections
            .into_nodes()
            .into_iter()
            .next()
            .map(|collection| collection.products.into_nodes())
            .unwrap_or_default())
    }

    async fn fetch_search(&self, term: &str) -> Result<Vec<Value>> {
        let data: ProductsData = decode(
            self.gateway()
                .request(&queries::SEARCH_PRODUCTS, json!({ "q": term }))
                .await?,
        )?;
        Ok(data.products.into_nodes())
    }
}
