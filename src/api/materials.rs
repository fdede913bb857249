//! Material Endpoints

use reqwest::Method;
use serde::Serialize;

use super::{segment, ApiClient, Page, Query};
use crate::error::ApiResult;
use crate::models::{Material, MaterialCategory, MaterialStats, Unit};

// ========================
// Argument Structs
// ========================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialArgs {
    pub name: String,
    pub description: String,
    pub category: MaterialCategory,
    pub unit: Unit,
    pub cost_per_unit: f64,
    pub quantity_in_stock: f64,
    pub minimum_stock: f64,
    pub supplier: String,
    pub supplier_phone: String,
    pub notes: String,
    /// New material arriving with stock: the backend books a purchase for it
    pub initial_purchase: bool,
}

// ========================
// Commands
// ========================

pub async fn list_materials(api: &ApiClient, query: Query) -> ApiResult<Page<Material>> {
    api.page("/materials", query, "materials").await
}

pub async fn get_material(api: &ApiClient, id: &str) -> ApiResult<Material> {
    let path = format!("/materials/{}", segment(id));
    api.record(Method::GET, &path, None, "material").await
}

pub async fn create_material(api: &ApiClient, args: &MaterialArgs) -> ApiResult<()> {
    let body = serde_json::to_value(args)?;
    api.send(Method::POST, "/materials", Query::new(), Some(body)).await?;
    Ok(())
}

pub async fn update_material(api: &ApiClient, id: &str, args: &MaterialArgs) -> ApiResult<()> {
    let path = format!("/materials/{}", segment(id));
    api.send(Method::PUT, &path, Query::new(), Some(serde_json::to_value(args)?))
        .await?;
    Ok(())
}

pub async fn delete_material(api: &ApiClient, id: &str) -> ApiResult<()> {
    api.delete(&format!("/materials/{}", segment(id))).await
}

pub async fn material_stats(api: &ApiClient) -> ApiResult<MaterialStats> {
    Ok(api
        .get::<MaterialStats>("/materials/stats", Query::new())
        .await?
        .data
        .unwrap_or_default())
}
