//! Stock Movement Forms
//!
//! Material purchases (entries) and withdrawals (exits).

use crate::api::{NewPurchaseArgs, NewWithdrawalArgs};
use crate::calc::parse_decimal;
use crate::error::FormError;
use crate::models::{Material, WithdrawalReason};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct PurchaseDraft {
    pub material_id: String,
    pub quantity: String,
    pub unit_price: String,
    pub supplier: String,
    pub notes: String,
}

impl PurchaseDraft {
    /// Restock form prefilled with the material's last price and supplier
    pub fn for_material(material: &Material) -> Self {
        Self {
            material_id: material.id.clone(),
            unit_price: material.cost_per_unit.to_string(),
            supplier: material.supplier.clone().unwrap_or_default(),
            ..Default::default()
        }
    }

    /// Running total shown under the form
    pub fn total(&self) -> f64 {
        parse_decimal(&self.quantity) * parse_decimal(&self.unit_price)
    }

    pub fn build(&self) -> Result<NewPurchaseArgs, FormError> {
        let quantity = parse_decimal(&self.quantity);
        let unit_price = parse_decimal(&self.unit_price);
        if self.material_id.is_empty() || quantity <= 0.0 || self.unit_price.trim().is_empty() {
            return Err(FormError::MissingRequiredFields);
        }
        Ok(NewPurchaseArgs {
            material: self.material_id.clone(),
            quantity,
            unit_price,
            supplier: self.supplier.trim().to_string(),
            notes: self.notes.trim().to_string(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct WithdrawalDraft {
    pub material_id: String,
    pub quantity: String,
    pub reason: Option<WithdrawalReason>,
    pub notes: String,
    pub production_batch: String,
}

impl WithdrawalDraft {
    pub fn build(&self) -> Result<NewWithdrawalArgs, FormError> {
        let quantity = parse_decimal(&self.quantity);
        let Some(reason) = self.reason else {
            return Err(FormError::MissingRequiredFields);
        };
        if self.material_id.is_empty() || quantity <= 0.0 {
            return Err(FormError::MissingRequiredFields);
        }
        let batch = self.production_batch.trim();
        Ok(NewWithdrawalArgs {
            material: self.material_id.clone(),
            quantity,
            reason,
            notes: self.notes.trim().to_string(),
            production_batch: (!batch.is_empty()).then(|| batch.to_string()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_purchase_requires_material_quantity_and_price() {
        let draft = PurchaseDraft {
            material_id: "m1".into(),
            quantity: "2.5".into(),
            unit_price: "4".into(),
            ..Default::default()
        };
        assert_eq!(draft.total(), 10.0);
        let args = draft.build().unwrap();
        assert_eq!(args.quantity, 2.5);

        let no_price = PurchaseDraft { unit_price: " ".into(), ..draft.clone() };
        assert_eq!(no_price.build(), Err(FormError::MissingRequiredFields));
        let no_material = PurchaseDraft { material_id: "".into(), ..draft };
        assert_eq!(no_material.build(), Err(FormError::MissingRequiredFields));
    }

    #[test]
    fn test_restock_prefill() {
        let material = Material {
            id: "m7".into(),
            cost_per_unit: 3.5,
            supplier: Some("Distribuidora Sul".into()),
            ..Default::default()
        };
        let draft = PurchaseDraft::for_material(&material);
        assert_eq!(draft.unit_price, "3.5");
        assert_eq!(draft.supplier, "Distribuidora Sul");
        assert!(draft.quantity.is_empty());
    }

    #[test]
    fn test_withdrawal_blank_batch_is_null() {
        let draft = WithdrawalDraft {
            material_id: "m1".into(),
            quantity: "1".into(),
            reason: Some(WithdrawalReason::Perda),
            production_batch: "   ".into(),
            ..Default::default()
        };
        assert_eq!(draft.build().unwrap().production_batch, None);

        let no_reason = WithdrawalDraft { reason: None, ..draft };
        assert_eq!(no_reason.build(), Err(FormError::MissingRequiredFields));
    }
}
