//! Catalog Forms
//!
//! Product, client and material editors.

use crate::api::{ClientArgs, MaterialArgs, ProductArgs};
use crate::calc::{parse_decimal, sanitize_decimal, unit_cost};
use crate::error::FormError;
use crate::models::{Address, Client, Material, MaterialCategory, Product, Unit};

/// Strict number for a required field
fn required_number(value: &str, field: &'static str) -> Result<f64, FormError> {
    let value = value.trim().replace(',', ".");
    if value.is_empty() {
        return Err(FormError::MissingRequiredFields);
    }
    value
        .parse::<f64>()
        .ok()
        .filter(|n| n.is_finite())
        .ok_or(FormError::InvalidNumber(field))
}

// ========================
// Product
// ========================

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ProductDraft {
    pub name: String,
    pub description: String,
    pub price: String,
    pub cost_price: String,
    pub stock: String,
    pub category: String,
    pub production_batch: String,
}

impl ProductDraft {
    pub fn from_product(product: &Product) -> Self {
        Self {
            name: product.name.clone(),
            description: product.description.clone().unwrap_or_default(),
            price: product.price.to_string(),
            cost_price: product.cost_price.to_string(),
            stock: product.stock.to_string(),
            category: product.category.clone().unwrap_or_default(),
            production_batch: product.production_batch.clone().unwrap_or_default(),
        }
    }

    pub fn build(&self) -> Result<ProductArgs, FormError> {
        if self.name.trim().is_empty() {
            return Err(FormError::MissingRequiredFields);
        }
        let stock = required_number(&self.stock, "estoque")?;
        Ok(ProductArgs {
            name: self.name.trim().to_string(),
            description: self.description.clone(),
            price: required_number(&self.price, "preço")?,
            cost_price: required_number(&self.cost_price, "custo")?,
            stock: stock.trunc() as i64,
            category: self.category.clone(),
            production_batch: self.production_batch.clone(),
        })
    }
}

/// "Total cost ÷ quantity produced" helper next to the cost-price field
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CostCalculator {
    pub total_cost: String,
    pub quantity: String,
}

impl CostCalculator {
    /// Store the sanitized total; returns the cost price to back-fill, if any
    pub fn set_total_cost(&mut self, input: &str) -> Option<String> {
        self.total_cost = sanitize_decimal(input);
        self.unit_cost()
    }

    pub fn set_quantity(&mut self, input: &str) -> Option<String> {
        self.quantity = input.to_string();
        self.unit_cost()
    }

    pub fn unit_cost(&self) -> Option<String> {
        unit_cost(parse_decimal(&self.total_cost), parse_decimal(&self.quantity))
    }
}

// ========================
// Client
// ========================

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ClientDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
    pub cpf: String,
    pub street: String,
    pub city: String,
    pub state: String,
    pub zip_code: String,
}

impl ClientDraft {
    pub fn from_client(client: &Client) -> Self {
        let address = client.address.clone().unwrap_or_default();
        Self {
            name: client.name.clone(),
            email: client.email.clone().unwrap_or_default(),
            phone: client.phone.clone().unwrap_or_default(),
            cpf: client.cpf.clone().unwrap_or_default(),
            street: address.street,
            city: address.city,
            state: address.state,
            zip_code: address.zip_code,
        }
    }

    pub fn build(&self) -> Result<ClientArgs, FormError> {
        if self.name.trim().is_empty() {
            return Err(FormError::MissingRequiredFields);
        }
        Ok(ClientArgs {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
            cpf: self.cpf.trim().to_string(),
            address: Address {
                street: self.street.clone(),
                city: self.city.clone(),
                state: self.state.clone(),
                zip_code: self.zip_code.clone(),
            },
        })
    }
}

// ========================
// Material
// ========================

#[derive(Debug, Clone, PartialEq)]
pub struct MaterialDraft {
    pub name: String,
    pub description: String,
    pub category: MaterialCategory,
    pub unit: Unit,
    pub cost_per_unit: String,
    pub quantity_in_stock: String,
    pub minimum_stock: String,
    pub supplier: String,
    pub supplier_phone: String,
    pub notes: String,
}

impl Default for MaterialDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            description: String::new(),
            category: MaterialCategory::Outro,
            unit: Unit::Unidade,
            cost_per_unit: String::new(),
            quantity_in_stock: String::new(),
            minimum_stock: String::new(),
            supplier: String::new(),
            supplier_phone: String::new(),
            notes: String::new(),
        }
    }
}

impl MaterialDraft {
    pub fn from_material(material: &Material) -> Self {
        Self {
            name: material.name.clone(),
            description: material.description.clone().unwrap_or_default(),
            category: material.category,
            unit: material.unit,
            cost_per_unit: material.cost_per_unit.to_string(),
            quantity_in_stock: material.quantity_in_stock.to_string(),
            minimum_stock: material.minimum_stock.to_string(),
            supplier: material.supplier.clone().unwrap_or_default(),
            supplier_phone: material.supplier_phone.clone().unwrap_or_default(),
            notes: material.notes.clone().unwrap_or_default(),
        }
    }

    /// A new material arriving with stock is booked as an initial purchase
    pub fn build(&self, is_new: bool) -> Result<MaterialArgs, FormError> {
        if self.name.trim().is_empty() {
            return Err(FormError::MissingRequiredFields);
        }
        let quantity_in_stock = parse_decimal(&self.quantity_in_stock);
        Ok(MaterialArgs {
            name: self.name.trim().to_string(),
            description: self.description.clone(),
            category: self.category,
            unit: self.unit,
            cost_per_unit: required_number(&self.cost_per_unit, "custo por unidade")?,
            quantity_in_stock,
            minimum_stock: parse_decimal(&self.minimum_stock),
            supplier: self.supplier.clone(),
            supplier_phone: self.supplier_phone.clone(),
            notes: self.notes.clone(),
            initial_purchase: is_new && quantity_in_stock > 0.0,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cost_calculator_backfills_only_when_complete() {
        let mut calc = CostCalculator::default();
        assert_eq!(calc.set_total_cost("46,95"), None);
        assert_eq!(calc.total_cost, "46.95");
        assert_eq!(calc.set_quantity("40").as_deref(), Some("1.17"));
        assert_eq!(calc.set_quantity("0"), None);
        assert_eq!(calc.set_total_cost("R$ 10,00").as_deref(), None);
        assert_eq!(calc.set_quantity("4").as_deref(), Some("2.50"));
    }

    #[test]
    fn test_product_draft() {
        let draft = ProductDraft {
            name: "Casquinha".into(),
            price: "7,50".into(),
            cost_price: "1.17".into(),
            stock: "40".into(),
            ..Default::default()
        };
        let args = draft.build().unwrap();
        assert_eq!(args.price, 7.5);
        assert_eq!(args.stock, 40);

        let bad = ProductDraft { price: "abc".into(), ..draft.clone() };
        assert_eq!(bad.build(), Err(FormError::InvalidNumber("preço")));

        let missing = ProductDraft { stock: "".into(), ..draft };
        assert_eq!(missing.build(), Err(FormError::MissingRequiredFields));
    }

    #[test]
    fn test_material_initial_purchase_flag() {
        let draft = MaterialDraft {
            name: "Calda".into(),
            cost_per_unit: "12.5".into(),
            quantity_in_stock: "3".into(),
            ..Default::default()
        };
        assert!(draft.build(true).unwrap().initial_purchase);
        assert!(!draft.build(false).unwrap().initial_purchase);

        let empty_stock = MaterialDraft { quantity_in_stock: "".into(), ..draft };
        let args = empty_stock.build(true).unwrap();
        assert!(!args.initial_purchase);
        assert_eq!(args.minimum_stock, 0.0);
    }

    #[test]
    fn test_client_round_trips_address() {
        let client = Client {
            id: "c1".into(),
            name: "Maria".into(),
            address: Some(Address { city: "Recife".into(), ..Default::default() }),
            ..Default::default()
        };
        let args = ClientDraft::from_client(&client).build().unwrap();
        assert_eq!(args.address.city, "Recife");
        assert_eq!(ClientDraft::default().build(), Err(FormError::MissingRequiredFields));
    }
}
