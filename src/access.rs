//! Role Capabilities
//!
//! What each account role may see and change. The backend enforces the same
//! rules; these checks only decide what the UI offers.

use crate::models::Role;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// Materials, purchases, withdrawals, consumption, productions, reports
    ViewInventory,
    EditProducts,
    EditMaterials,
    RecordSales,
    RecordStockMovements,
    DeleteProducts,
    DeleteMaterials,
    EditClients,
    DeleteClients,
    ManageUsers,
}

impl Role {
    pub fn can(&self, capability: Capability) -> bool {
        use Capability::*;
        match self {
            Role::Admin => true,
            Role::Vendedor => matches!(
                capability,
                ViewInventory | EditProducts | EditMaterials | RecordSales | RecordStockMovements
            ),
            Role::Cliente => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_admin_can_everything() {
        assert!(Role::Admin.can(Capability::ManageUsers));
        assert!(Role::Admin.can(Capability::DeleteClients));
        assert!(Role::Admin.can(Capability::RecordSales));
    }

    #[test]
    fn test_vendedor_cannot_delete_or_manage() {
        assert!(Role::Vendedor.can(Capability::ViewInventory));
        assert!(Role::Vendedor.can(Capability::RecordStockMovements));
        assert!(!Role::Vendedor.can(Capability::DeleteProducts));
        assert!(!Role::Vendedor.can(Capability::EditClients));
        assert!(!Role::Vendedor.can(Capability::ManageUsers));
    }

    #[test]
    fn test_cliente_is_read_only() {
        assert!(!Role::Cliente.can(Capability::ViewInventory));
        assert!(!Role::Cliente.can(Capability::RecordSales));
    }
}
