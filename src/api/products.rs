//! Product Endpoints

use reqwest::Method;
use serde::Serialize;

use super::{segment, ApiClient, Page, Query};
use crate::error::ApiResult;
use crate::models::{Product, Production};

// ========================
// Argument Structs
// ========================

/// Body of create and update
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductArgs {
    pub name: String,
    pub description: String,
    pub price: f64,
    pub cost_price: f64,
    pub stock: i64,
    pub category: String,
    pub production_batch: String,
}

// ========================
// Commands
// ========================

pub async fn list_products(api: &ApiClient, query: Query) -> ApiResult<Page<Product>> {
    api.page("/products", query, "products").await
}

pub async fn get_product(api: &ApiClient, id: &str) -> ApiResult<Product> {
    let path = format!("/products/{}", segment(id));
    api.record(Method::GET, &path, None, "product").await
}

pub async fn create_product(api: &ApiClient, args: &ProductArgs) -> ApiResult<()> {
    let body = serde_json::to_value(args)?;
    api.send(Method::POST, "/products", Query::new(), Some(body)).await?;
    Ok(())
}

pub async fn update_product(api: &ApiClient, id: &str, args: &ProductArgs) -> ApiResult<()> {
    let path = format!("/products/{}", segment(id));
    api.send(Method::PUT, &path, Query::new(), Some(serde_json::to_value(args)?))
        .await?;
    Ok(())
}

pub async fn delete_product(api: &ApiClient, id: &str) -> ApiResult<()> {
    api.delete(&format!("/products/{}", segment(id))).await
}

/// Production batches with their withdrawals and products
pub async fn list_productions(api: &ApiClient) -> ApiResult<Vec<Production>> {
    let page = api.page("/products/productions", Query::new(), "productions").await?;
    Ok(page.items)
}
