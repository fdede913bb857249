//! New Sale Form
//!
//! Line items are validated before anything is sent, including the
//! temporary client a direct sale needs.

use tracing::info;

use crate::api::{self, ApiClient, MaterialUseArgs, NewSaleArgs, QuickClientArgs, SaleItemArgs};
use crate::calc::{line_subtotal, material_usage_cost, parse_decimal, parse_integer};
use crate::error::{FormError, SubmitError};
use crate::models::{Client, Material, PaymentMethod, Product};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct MaterialUseDraft {
    pub material_id: String,
    pub quantity: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SaleItemDraft {
    pub product_id: String,
    pub quantity: String,
    pub materials: Vec<MaterialUseDraft>,
}

impl Default for SaleItemDraft {
    fn default() -> Self {
        Self {
            product_id: String::new(),
            quantity: "1".to_string(),
            materials: Vec::new(),
        }
    }
}

impl SaleItemDraft {
    pub fn quantity(&self) -> i64 {
        parse_integer(&self.quantity)
    }

    /// `price × quantity` once a product is picked
    pub fn subtotal(&self, products: &[Product]) -> Option<f64> {
        products
            .iter()
            .find(|p| p.id == self.product_id)
            .map(|p| line_subtotal(p.price, self.quantity()))
    }

    /// Cost of the materials used across the whole line
    pub fn materials_cost(&self, materials: &[Material]) -> f64 {
        self.materials
            .iter()
            .filter_map(|used| {
                let material = materials.iter().find(|m| m.id == used.material_id)?;
                Some(material_usage_cost(
                    material.cost_per_unit,
                    parse_decimal(&used.quantity),
                    self.quantity(),
                ))
            })
            .sum()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SaleDraft {
    pub client_id: String,
    /// Direct sale: a temporary client is created on submit if none is picked
    pub quick_sale: bool,
    pub items: Vec<SaleItemDraft>,
    pub payment_method: PaymentMethod,
}

impl Default for SaleDraft {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            quick_sale: false,
            items: vec![SaleItemDraft::default()],
            payment_method: PaymentMethod::Dinheiro,
        }
    }
}

impl SaleDraft {
    pub fn total(&self, products: &[Product]) -> f64 {
        self.items.iter().filter_map(|item| item.subtotal(products)).sum()
    }
}

/// Who the sale is recorded for
#[derive(Debug, Clone, PartialEq)]
pub enum SaleClient {
    Existing(String),
    /// Created through `POST /clients/quick-sale` right before the sale
    Temporary,
}

/// Lines with a product and a positive quantity; their materials likewise
pub fn line_items(items: &[SaleItemDraft]) -> Vec<SaleItemArgs> {
    items
        .iter()
        .filter(|item| !item.product_id.is_empty() && item.quantity() > 0)
        .map(|item| SaleItemArgs {
            product: item.product_id.clone(),
            quantity: item.quantity(),
            materials_used: item
                .materials
                .iter()
                .filter(|used| !used.material_id.is_empty() && parse_decimal(&used.quantity) > 0.0)
                .map(|used| MaterialUseArgs {
                    material: used.material_id.clone(),
                    quantity: parse_decimal(&used.quantity),
                })
                .collect(),
        })
        .collect()
}

/// Everything that can be checked without the network
pub fn validate_sale(draft: &SaleDraft) -> Result<(SaleClient, Vec<SaleItemArgs>), FormError> {
    let client = if !draft.client_id.is_empty() {
        SaleClient::Existing(draft.client_id.clone())
    } else if draft.quick_sale {
        SaleClient::Temporary
    } else {
        return Err(FormError::MissingClient);
    };

    let items = line_items(&draft.items);
    if items.is_empty() {
        return Err(FormError::NoSaleItems);
    }
    Ok((client, items))
}

/// Outcome of a recorded sale
#[derive(Debug, Clone, PartialEq)]
pub struct SaleReceipt {
    /// Temporary client created for a direct sale
    pub created_client: Option<Client>,
}

pub async fn submit_sale(api: &ApiClient, draft: &SaleDraft) -> Result<SaleReceipt, SubmitError> {
    let (client, items) = validate_sale(draft)?;

    let (client_id, created_client) = match client {
        SaleClient::Existing(id) => (id, None),
        SaleClient::Temporary => {
            let client = api::create_quick_sale_client(api)
                .await
                .map_err(SubmitError::failed("Erro ao criar cliente temporário"))?;
            info!(client = %client.id, "temporary client created for direct sale");
            (client.id.clone(), Some(client))
        }
    };

    let args = NewSaleArgs {
        client: client_id,
        items,
        payment_method: draft.payment_method,
        payment_status: draft.payment_method.initial_status(),
    };
    api::create_sale(api, &args)
        .await
        .map_err(SubmitError::failed("Erro ao registrar venda"))?;
    Ok(SaleReceipt { created_client })
}

/// Client typed in from the sale form
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QuickClientDraft {
    pub name: String,
    pub phone: String,
    pub email: String,
}

impl QuickClientDraft {
    pub fn build(&self) -> Result<QuickClientArgs, FormError> {
        let name = self.name.trim();
        if name.is_empty() {
            return Err(FormError::MissingClientName);
        }
        let email = self.email.trim();
        Ok(QuickClientArgs {
            name: name.to_string(),
            phone: self.phone.trim().to_string(),
            email: (!email.is_empty()).then(|| email.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::MockTransport;
    use crate::api::MemoryTokenStore;
    use crate::models::PaymentStatus;
    use serde_json::json;

    fn item(product: &str, quantity: &str) -> SaleItemDraft {
        SaleItemDraft {
            product_id: product.into(),
            quantity: quantity.into(),
            materials: Vec::new(),
        }
    }

    #[test]
    fn test_line_items_drop_incomplete_lines() {
        let mut with_materials = item("p1", "2");
        with_materials.materials = vec![
            MaterialUseDraft { material_id: "m1".into(), quantity: "0.5".into() },
            MaterialUseDraft { material_id: "".into(), quantity: "1".into() },
            MaterialUseDraft { material_id: "m2".into(), quantity: "0".into() },
        ];
        let items = line_items(&[with_materials, item("", "3"), item("p2", "0"), item("p3", "abc")]);

        assert_eq!(items.len(), 1);
        assert_eq!(items[0].quantity, 2);
        assert_eq!(
            items[0].materials_used,
            vec![MaterialUseArgs { material: "m1".into(), quantity: 0.5 }]
        );
    }

    #[test]
    fn test_validate_requires_client_then_items() {
        let draft = SaleDraft::default();
        assert_eq!(validate_sale(&draft), Err(FormError::MissingClient));

        let draft = SaleDraft { quick_sale: true, ..Default::default() };
        assert_eq!(validate_sale(&draft), Err(FormError::NoSaleItems));

        let draft = SaleDraft {
            client_id: "c1".into(),
            items: vec![item("p1", "1")],
            ..Default::default()
        };
        assert!(matches!(validate_sale(&draft), Ok((SaleClient::Existing(ref id), _)) if id == "c1"));
    }

    #[test]
    fn test_subtotals_and_material_cost() {
        let products = vec![Product { id: "p1".into(), price: 10.50, ..Default::default() }];
        let materials = vec![Material { id: "m1".into(), cost_per_unit: 2.0, ..Default::default() }];
        let mut line = item("p1", "3");
        line.materials.push(MaterialUseDraft { material_id: "m1".into(), quantity: "0.5".into() });

        assert_eq!(line.subtotal(&products), Some(31.5));
        assert_eq!(line.materials_cost(&materials), 3.0);
        assert_eq!(item("p9", "1").subtotal(&products), None);

        let draft = SaleDraft { items: vec![line, item("p1", "1")], ..Default::default() };
        assert_eq!(draft.total(&products), 42.0);
    }

    #[tokio::test]
    async fn test_direct_sale_without_items_sends_nothing() {
        let mock = MockTransport::new();
        let api = ApiClient::new(mock.clone(), MemoryTokenStore::new(Some("t")));
        let draft = SaleDraft {
            quick_sale: true,
            items: vec![item("", "1")],
            ..Default::default()
        };

        let err = submit_sale(&api, &draft).await.unwrap_err();
        assert!(matches!(err, SubmitError::Invalid(FormError::NoSaleItems)));
        assert_eq!(mock.request_count(), 0);
    }

    #[tokio::test]
    async fn test_direct_sale_creates_client_then_sale() {
        let mock = MockTransport::new();
        mock.push(201, json!({"success": true, "data": {"client": {"_id": "tmp1", "name": "Venda Direta"}}}));
        mock.push(201, json!({"success": true, "data": {"sale": {"_id": "s1"}}}));
        let api = ApiClient::new(mock.clone(), MemoryTokenStore::new(Some("t")));
        let draft = SaleDraft {
            quick_sale: true,
            items: vec![item("p1", "2")],
            payment_method: PaymentMethod::Pendente,
            ..Default::default()
        };

        let receipt = submit_sale(&api, &draft).await.unwrap();
        assert_eq!(receipt.created_client.unwrap().id, "tmp1");

        let requests = mock.requests();
        assert_eq!(requests[0].path, "/clients/quick-sale");
        assert_eq!(requests[0].body, None);
        assert_eq!(requests[1].path, "/sales");
        let body = requests[1].body.clone().unwrap();
        assert_eq!(body["client"], "tmp1");
        assert_eq!(body["paymentStatus"], json!(PaymentStatus::Pendente));
    }

    #[tokio::test]
    async fn test_temporary_client_failure_uses_its_own_fallback() {
        let mock = MockTransport::new();
        mock.push(500, json!({}));
        let api = ApiClient::new(mock.clone(), MemoryTokenStore::new(Some("t")));
        let draft = SaleDraft {
            quick_sale: true,
            items: vec![item("p1", "1")],
            ..Default::default()
        };

        match submit_sale(&api, &draft).await {
            Err(SubmitError::Failed { fallback, .. }) => {
                assert_eq!(fallback, "Erro ao criar cliente temporário")
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(mock.request_count(), 1);
    }

    #[test]
    fn test_quick_client_draft() {
        let draft = QuickClientDraft { name: "  ".into(), ..Default::default() };
        assert_eq!(draft.build(), Err(FormError::MissingClientName));

        let draft = QuickClientDraft {
            name: " Joana ".into(),
            phone: "".into(),
            email: " ".into(),
        };
        let args = draft.build().unwrap();
        assert_eq!(args.name, "Joana");
        assert_eq!(args.email, None);
    }
}
