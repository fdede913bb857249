//! Material Purchase Endpoints

use reqwest::Method;
use serde::Serialize;

use super::{ApiClient, Page, Query};
use crate::error::ApiResult;
use crate::models::{ConsumptionReport, MaterialPurchase};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPurchaseArgs {
    pub material: String,
    pub quantity: f64,
    pub unit_price: f64,
    pub supplier: String,
    pub notes: String,
}

pub async fn list_purchases(api: &ApiClient, query: Query) -> ApiResult<Page<MaterialPurchase>> {
    api.page("/material-purchases", query, "purchases").await
}

pub async fn create_purchase(api: &ApiClient, args: &NewPurchaseArgs) -> ApiResult<()> {
    let body = serde_json::to_value(args)?;
    api.send(Method::POST, "/material-purchases", Query::new(), Some(body))
        .await?;
    Ok(())
}

pub async fn consumption_report(
    api: &ApiClient,
    start_date: &str,
    end_date: &str,
) -> ApiResult<ConsumptionReport> {
    let query = Query::new()
        .param("startDate", start_date)
        .param("endDate", end_date);
    api.get("/material-purchases/consumption-report", query)
        .await?
        .into_data("consumption report")
}
