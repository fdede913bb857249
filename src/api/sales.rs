//! Sale Endpoints

use reqwest::Method;
use serde::Serialize;
use serde_json::json;

use super::{segment, ApiClient, Page, Query};
use crate::error::ApiResult;
use crate::models::{PaymentMethod, PaymentStatus, Sale, SalesReport};

// ========================
// Argument Structs
// ========================

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialUseArgs {
    pub material: String,
    pub quantity: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleItemArgs {
    pub product: String,
    pub quantity: i64,
    pub materials_used: Vec<MaterialUseArgs>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewSaleArgs {
    pub client: String,
    pub items: Vec<SaleItemArgs>,
    pub payment_method: PaymentMethod,
    pub payment_status: PaymentStatus,
}

// ========================
// Commands
// ========================

pub async fn list_sales(api: &ApiClient, query: Query) -> ApiResult<Page<Sale>> {
    api.page("/sales", query, "sales").await
}

pub async fn get_sale(api: &ApiClient, id: &str) -> ApiResult<Sale> {
    let path = format!("/sales/{}", segment(id));
    api.record(Method::GET, &path, None, "sale").await
}

pub async fn create_sale(api: &ApiClient, args: &NewSaleArgs) -> ApiResult<()> {
    api.send(Method::POST, "/sales", Query::new(), Some(serde_json::to_value(args)?))
        .await?;
    Ok(())
}

pub async fn update_payment_status(api: &ApiClient, id: &str, status: PaymentStatus) -> ApiResult<()> {
    let path = format!("/sales/{}/payment", segment(id));
    let body = json!({ "paymentStatus": status });
    api.send(Method::PUT, &path, Query::new(), Some(body)).await?;
    Ok(())
}

pub async fn sales_report(api: &ApiClient, start_date: &str, end_date: &str) -> ApiResult<SalesReport> {
    let query = Query::new()
        .param("startDate", start_date)
        .param("endDate", end_date);
    api.get("/sales/reports/period", query)
        .await?
        .into_data("report")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockTransport;
    use crate::api::MemoryTokenStore;
    use crate::models::Ref;

    fn api(mock: &MockTransport) -> ApiClient {
        ApiClient::new(mock.clone(), MemoryTokenStore::new(Some("t")))
    }

    #[tokio::test]
    async fn test_create_sale_body() {
        let mock = MockTransport::new();
        mock.push(201, json!({"success": true, "data": {"sale": {"_id": "s1"}}}));

        let args = NewSaleArgs {
            client: "c1".into(),
            items: vec![SaleItemArgs {
                product: "p1".into(),
                quantity: 3,
                materials_used: vec![MaterialUseArgs { material: "m1".into(), quantity: 0.5 }],
            }],
            payment_method: PaymentMethod::Pendente,
            payment_status: PaymentStatus::Pendente,
        };
        create_sale(&api(&mock), &args).await.unwrap();

        assert_eq!(
            mock.requests()[0].body,
            Some(json!({
                "client": "c1",
                "items": [{"product": "p1", "quantity": 3, "materialsUsed": [{"material": "m1", "quantity": 0.5}]}],
                "paymentMethod": "pendente",
                "paymentStatus": "pendente"
            }))
        );
    }

    #[tokio::test]
    async fn test_mark_paid_and_fetch_one() {
        let mock = MockTransport::new();
        mock.push(200, json!({"success": true, "message": "ok"}));
        mock.push(200, json!({"success": true, "data": {"sale": {
            "_id": "s1", "client": {"_id": "c1", "name": "Maria"}, "paymentStatus": "pago"
        }}}));
        let api = api(&mock);

        update_payment_status(&api, "s1", PaymentStatus::Pago).await.unwrap();
        let sale = get_sale(&api, "s1").await.unwrap();

        let requests = mock.requests();
        assert_eq!(requests[0].method, Method::PUT);
        assert_eq!(requests[0].path, "/sales/s1/payment");
        assert_eq!(requests[0].body, Some(json!({"paymentStatus": "pago"})));
        assert_eq!(requests[1].path, "/sales/s1");
        assert!(sale.is_paid());
        assert!(matches!(sale.client, Some(Ref::Populated(ref c)) if c.name == "Maria"));
    }
}
