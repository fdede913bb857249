//! Frontend Models
//!
//! Records returned by the REST API. The backend owns their shape, so every
//! server-computed or optional field decodes leniently.

use serde::{Deserialize, Serialize};

/// String-valued enum with a wire value, a display label and a fallback
/// variant for values this client does not know about.
macro_rules! wire_enum {
    (
        $(#[$meta:meta])*
        $name:ident, fallback = $fallback:ident {
            $($variant:ident => $wire:literal, $label:literal;)+
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(from = "String", into = "String")]
        pub enum $name {
            $($variant),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub fn as_str(&self) -> &'static str {
                match self {
                    $($name::$variant => $wire),+
                }
            }

            pub fn label(&self) -> &'static str {
                match self {
                    $($name::$variant => $label),+
                }
            }

            pub fn parse(value: &str) -> Self {
                match value {
                    $($wire => $name::$variant,)+
                    _ => $name::$fallback,
                }
            }
        }

        impl From<String> for $name {
            fn from(value: String) -> Self {
                Self::parse(&value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.as_str().to_string()
            }
        }

        impl Default for $name {
            fn default() -> Self {
                $name::$fallback
            }
        }
    };
}

wire_enum! {
    /// Account role; see `access` for what each may do
    Role, fallback = Cliente {
        Admin => "admin", "Admin";
        Vendedor => "vendedor", "Vendedor";
        Cliente => "cliente", "Cliente";
    }
}

wire_enum! {
    PaymentStatus, fallback = Pago {
        Pago => "pago", "Pago";
        Pendente => "pendente", "Pendente";
    }
}

wire_enum! {
    PaymentMethod, fallback = Dinheiro {
        Dinheiro => "dinheiro", "Dinheiro";
        CartaoDebito => "cartao_debito", "Cartão de Débito";
        CartaoCredito => "cartao_credito", "Cartão de Crédito";
        Pix => "pix", "PIX";
        Boleto => "boleto", "Boleto";
        Pendente => "pendente", "Pagamento Pendente (Pagar Depois)";
    }
}

impl PaymentMethod {
    /// Status a new sale is recorded with
    pub fn initial_status(&self) -> PaymentStatus {
        match self {
            PaymentMethod::Pendente => PaymentStatus::Pendente,
            _ => PaymentStatus::Pago,
        }
    }
}

wire_enum! {
    MaterialCategory, fallback = Outro {
        Cone => "cone", "Cone";
        Cobertura => "cobertura", "Cobertura";
        Topping => "topping", "Topping";
        Embalagem => "embalagem", "Embalagem";
        Utensilio => "utensilio", "Utensílio";
        Outro => "outro", "Outro";
    }
}

wire_enum! {
    Unit, fallback = Unidade {
        Unidade => "unidade", "Unidade";
        Kg => "kg", "Quilograma (kg)";
        Litro => "litro", "Litro (L)";
        Pacote => "pacote", "Pacote";
        Caixa => "caixa", "Caixa";
    }
}

wire_enum! {
    WithdrawalReason, fallback = Outro {
        Perda => "perda", "Perda";
        Descarte => "descarte", "Descarte";
        Teste => "teste", "Teste";
        UsoInterno => "uso_interno", "Uso Interno";
        Outro => "outro", "Outro";
    }
}

/// Reference to another record: populated by the API or left as a bare id
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Ref<T> {
    Populated(T),
    Id(String),
}

impl<T> Ref<T> {
    pub fn populated(&self) -> Option<&T> {
        match self {
            Ref::Populated(value) => Some(value),
            Ref::Id(_) => None,
        }
    }
}

/// Name of an optional populated reference, for table cells
pub fn ref_name<T: Named>(value: &Option<Ref<T>>) -> Option<&str> {
    value.as_ref().and_then(Ref::populated).map(Named::name)
}

pub trait Named {
    fn name(&self) -> &str;
}

// ========================
// Accounts
// ========================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    #[serde(rename = "_id", alias = "id", default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: Role,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub email_verified: bool,
    #[serde(default)]
    pub created_at: Option<String>,
}

impl User {
    /// First word of the name, for greetings
    pub fn first_name(&self) -> &str {
        self.name.split_whitespace().next().unwrap_or("Usuário")
    }
}

impl Named for User {
    fn name(&self) -> &str {
        &self.name
    }
}

// ========================
// Catalog
// ========================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    #[serde(default)]
    pub street: String,
    #[serde(default)]
    pub city: String,
    #[serde(default)]
    pub state: String,
    #[serde(default)]
    pub zip_code: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Client {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub cpf: Option<String>,
    #[serde(default)]
    pub address: Option<Address>,
}

impl Named for Client {
    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Product {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub price: f64,
    #[serde(default)]
    pub cost_price: f64,
    #[serde(default)]
    pub stock: i64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub production_batch: Option<String>,
}

impl Named for Product {
    fn name(&self) -> &str {
        &self.name
    }
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Material {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub category: MaterialCategory,
    #[serde(default)]
    pub unit: Unit,
    #[serde(default)]
    pub cost_per_unit: f64,
    #[serde(default)]
    pub quantity_in_stock: f64,
    #[serde(default)]
    pub minimum_stock: f64,
    #[serde(default)]
    pub supplier: Option<String>,
    #[serde(default)]
    pub supplier_phone: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Named for Material {
    fn name(&self) -> &str {
        &self.name
    }
}

// ========================
// Transactions
// ========================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SaleItem {
    #[serde(default)]
    pub product: Option<Ref<Product>>,
    #[serde(default)]
    pub quantity: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Sale {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub client: Option<Ref<Client>>,
    #[serde(default)]
    pub items: Vec<SaleItem>,
    #[serde(default)]
    pub total_amount: f64,
    #[serde(default)]
    pub net_profit: f64,
    #[serde(default)]
    pub payment_method: Option<PaymentMethod>,
    #[serde(default)]
    pub payment_status: PaymentStatus,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub sale_date: Option<String>,
}

impl Sale {
    pub fn is_paid(&self) -> bool {
        self.payment_status == PaymentStatus::Pago
    }

    pub fn is_pending(&self) -> bool {
        self.payment_status == PaymentStatus::Pendente
    }
}

// ========================
// Inventory
// ========================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialPurchase {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub material: Option<Ref<Material>>,
    #[serde(default)]
    pub quantity: f64,
    #[serde(default)]
    pub unit_price: f64,
    #[serde(default)]
    pub total_cost: f64,
    #[serde(default)]
    pub supplier: Option<String>,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub purchase_date: Option<String>,
    #[serde(default)]
    pub purchased_by: Option<Ref<User>>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialWithdrawal {
    #[serde(rename = "_id", default)]
    pub id: String,
    #[serde(default)]
    pub material: Option<Ref<Material>>,
    #[serde(default)]
    pub quantity: f64,
    #[serde(default)]
    pub reason: WithdrawalReason,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default)]
    pub production_batch: Option<String>,
    #[serde(default)]
    pub withdrawal_date: Option<String>,
    #[serde(default)]
    pub withdrawn_by: Option<Ref<User>>,
}

impl MaterialWithdrawal {
    /// Cost at the material's current unit cost
    pub fn cost(&self) -> f64 {
        let unit_cost = self
            .material
            .as_ref()
            .and_then(Ref::populated)
            .map(|m| m.cost_per_unit)
            .unwrap_or(0.0);
        unit_cost * self.quantity
    }
}

/// Row of `/material-withdrawals/stats/by-production`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProductionSummary {
    #[serde(default)]
    pub production_batch: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub total_items: f64,
    #[serde(default)]
    pub total_cost: f64,
}

/// Row of `/products/productions`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Production {
    #[serde(default)]
    pub production_batch: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub total_material_cost: f64,
    #[serde(default)]
    pub total_products_quantity: f64,
    #[serde(default)]
    pub cost_per_unit: f64,
    #[serde(default)]
    pub materials: Vec<MaterialWithdrawal>,
    #[serde(default)]
    pub products: Vec<Product>,
}

// ========================
// Reports
// ========================

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    #[serde(default)]
    pub total: u64,
    #[serde(default)]
    pub page: u64,
    #[serde(default)]
    pub pages: u64,
    #[serde(default)]
    pub limit: u64,
}

/// `/materials/stats`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialStats {
    #[serde(default)]
    pub total_materials: u64,
    #[serde(default)]
    pub total_stock_value: f64,
    #[serde(default)]
    pub total_withdrawals_value: f64,
    #[serde(default)]
    pub low_stock_count: u64,
    #[serde(default)]
    pub low_stock_materials: Vec<Material>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportPeriod {
    #[serde(default)]
    pub start_date: Option<String>,
    #[serde(default)]
    pub end_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesStatistics {
    #[serde(default)]
    pub total_sales: u64,
    #[serde(default)]
    pub total_amount: f64,
    #[serde(default)]
    pub total_cost: f64,
    #[serde(default)]
    pub total_gross_profit: f64,
    #[serde(default)]
    pub total_net_profit: f64,
}

/// `/sales/reports/period`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SalesReport {
    #[serde(default)]
    pub period: ReportPeriod,
    #[serde(default)]
    pub statistics: SalesStatistics,
    #[serde(default)]
    pub sales: Vec<Sale>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumptionStatistics {
    #[serde(default)]
    pub total_materials_used: u64,
    #[serde(default)]
    pub total_cost: f64,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MaterialConsumption {
    #[serde(default)]
    pub material: Option<Ref<Material>>,
    #[serde(default)]
    pub total_quantity: f64,
    #[serde(default)]
    pub total_cost: f64,
    #[serde(default)]
    pub sales_count: u64,
}

/// `/material-purchases/consumption-report`
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumptionReport {
    #[serde(default)]
    pub period: ReportPeriod,
    #[serde(default)]
    pub statistics: ConsumptionStatistics,
    #[serde(default)]
    pub consumption: Vec<MaterialConsumption>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_unknown_enum_values_fall_back() {
        let user: User = serde_json::from_value(json!({
            "_id": "u1", "name": "Ana Souza", "email": "ana@x.com", "role": "gerente"
        }))
        .unwrap();
        assert_eq!(user.role, Role::Cliente);
        assert_eq!(user.first_name(), "Ana");

        let material: Material = serde_json::from_value(json!({
            "_id": "m1", "name": "Casquinha", "category": "cone", "unit": "galão"
        }))
        .unwrap();
        assert_eq!(material.category, MaterialCategory::Cone);
        assert_eq!(material.unit, Unit::Unidade);
    }

    #[test]
    fn test_enums_serialize_to_wire_values() {
        assert_eq!(serde_json::to_value(PaymentMethod::CartaoCredito).unwrap(), json!("cartao_credito"));
        assert_eq!(serde_json::to_value(WithdrawalReason::UsoInterno).unwrap(), json!("uso_interno"));
        assert_eq!(PaymentMethod::Pendente.initial_status(), PaymentStatus::Pendente);
        assert_eq!(PaymentMethod::Pix.initial_status(), PaymentStatus::Pago);
    }

    #[test]
    fn test_refs_accept_ids_and_objects() {
        let sale: Sale = serde_json::from_value(json!({
            "_id": "s1",
            "client": {"_id": "c1", "name": "Maria"},
            "items": [{"product": "p1", "quantity": 2}],
            "totalAmount": 21.0,
            "paymentStatus": "pendente"
        }))
        .unwrap();
        assert_eq!(ref_name(&sale.client), Some("Maria"));
        assert!(matches!(sale.items[0].product, Some(Ref::Id(ref id)) if id == "p1"));
        assert!(sale.is_pending());

        let bare: Sale = serde_json::from_value(json!({"_id": "s2", "client": "c9"})).unwrap();
        assert_eq!(ref_name(&bare.client), None);
        assert!(bare.is_paid());
    }

    #[test]
    fn test_withdrawal_cost_uses_material_unit_cost() {
        let withdrawal: MaterialWithdrawal = serde_json::from_value(json!({
            "_id": "w1",
            "material": {"_id": "m1", "name": "Calda", "costPerUnit": 2.5},
            "quantity": 4,
            "reason": "perda"
        }))
        .unwrap();
        assert_eq!(withdrawal.cost(), 10.0);

        let unpopulated = MaterialWithdrawal { quantity: 3.0, ..Default::default() };
        assert_eq!(unpopulated.cost(), 0.0);
    }
}
