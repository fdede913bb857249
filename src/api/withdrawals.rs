//! Material Withdrawal Endpoints

use reqwest::Method;
use serde::Serialize;

use super::{segment, ApiClient, Page, Query};
use crate::error::ApiResult;
use crate::models::{MaterialWithdrawal, ProductionSummary, WithdrawalReason};

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewWithdrawalArgs {
    pub material: String,
    pub quantity: f64,
    pub reason: WithdrawalReason,
    pub notes: String,
    /// `null` leaves the withdrawal outside any production batch
    pub production_batch: Option<String>,
}

pub async fn list_withdrawals(api: &ApiClient, query: Query) -> ApiResult<Page<MaterialWithdrawal>> {
    api.page("/material-withdrawals", query, "withdrawals").await
}

pub async fn get_withdrawal(api: &ApiClient, id: &str) -> ApiResult<MaterialWithdrawal> {
    let path = format!("/material-withdrawals/{}", segment(id));
    api.record(Method::GET, &path, None, "withdrawal").await
}

pub async fn create_withdrawal(api: &ApiClient, args: &NewWithdrawalArgs) -> ApiResult<()> {
    let body = serde_json::to_value(args)?;
    api.send(Method::POST, "/material-withdrawals", Query::new(), Some(body))
        .await?;
    Ok(())
}

/// Withdrawal totals grouped by production batch
pub async fn withdrawals_by_production(api: &ApiClient) -> ApiResult<Vec<ProductionSummary>> {
    let page = api
        .page("/material-withdrawals/stats/by-production", Query::new(), "productions")
        .await?;
    Ok(page.items)
}
