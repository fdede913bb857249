//! Client Endpoints

use reqwest::Method;
use serde::Serialize;

use super::{segment, ApiClient, Page, Query};
use crate::error::ApiResult;
use crate::models::{Address, Client, Sale};

// ========================
// Argument Structs
// ========================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ClientArgs {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub cpf: String,
    pub address: Address,
}

/// Client created from inside the sale form
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QuickClientArgs {
    pub name: String,
    pub phone: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

// ========================
// Commands
// ========================

pub async fn list_clients(api: &ApiClient, query: Query) -> ApiResult<Page<Client>> {
    api.page("/clients", query, "clients").await
}

pub async fn get_client(api: &ApiClient, id: &str) -> ApiResult<Client> {
    let path = format!("/clients/{}", segment(id));
    api.record(Method::GET, &path, None, "client").await
}

pub async fn create_client<A: Serialize>(api: &ApiClient, args: &A) -> ApiResult<Client> {
    api.record(Method::POST, "/clients", Some(serde_json::to_value(args)?), "client")
        .await
}

pub async fn update_client(api: &ApiClient, id: &str, args: &ClientArgs) -> ApiResult<Client> {
    let path = format!("/clients/{}", segment(id));
    api.record(Method::PUT, &path, Some(serde_json::to_value(args)?), "client")
        .await
}

pub async fn delete_client(api: &ApiClient, id: &str) -> ApiResult<()> {
    api.delete(&format!("/clients/{}", segment(id))).await
}

/// Temporary client for a walk-in sale
pub async fn create_quick_sale_client(api: &ApiClient) -> ApiResult<Client> {
    api.record(Method::POST, "/clients/quick-sale", None, "client").await
}

pub async fn client_purchases(api: &ApiClient, id: &str) -> ApiResult<Vec<Sale>> {
    let path = format!("/clients/{}/purchases", segment(id));
    Ok(api.page(&path, Query::new(), "sales").await?.items)
}
