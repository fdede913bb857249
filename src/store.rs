//! Catalog Store
//!
//! Uses Leptos reactive_stores for fine-grained reactivity. Holds the lists
//! that several pages share as select options (clients, products,
//! materials); each page still refetches its own table. Also carries the
//! material handed from the materials page to the purchase form.

use leptos::prelude::*;
use leptos::task::spawn_local;
use reactive_stores::Store;
use tracing::debug;

use crate::api::{self, Query};
use crate::context::AppContext;
use crate::models::{Client, Material, Product};

/// Option lists fetch everything the backend will page out at once
pub const OPTION_LIMIT: u32 = 1000;

#[derive(Clone, Debug, Default, Store)]
pub struct CatalogState {
    pub clients: Vec<Client>,
    pub products: Vec<Product>,
    pub materials: Vec<Material>,
    /// Material picked with "Comprar" on the materials page, consumed by the purchases page
    pub restock: Option<String>,
}

pub type CatalogStore = Store<CatalogState>;

/// Get the catalog store from context
pub fn use_catalog() -> CatalogStore {
    expect_context::<CatalogStore>()
}

// ========================
// Loaders
// ========================

pub fn load_clients(ctx: AppContext, store: CatalogStore) {
    spawn_local(async move {
        match api::list_clients(&ctx.api(), Query::new().limit(OPTION_LIMIT)).await {
            Ok(page) => {
                debug!(count = page.items.len(), "clients loaded");
                store.clients().set(page.items);
            }
            Err(err) => ctx.report(&err, "Erro ao carregar clientes"),
        }
    });
}

pub fn load_products(ctx: AppContext, store: CatalogStore) {
    spawn_local(async move {
        match api::list_products(&ctx.api(), Query::new().limit(OPTION_LIMIT)).await {
            Ok(page) => {
                debug!(count = page.items.len(), "products loaded");
                store.products().set(page.items);
            }
            Err(err) => ctx.report(&err, "Erro ao carregar produtos"),
        }
    });
}

pub fn load_materials(ctx: AppContext, store: CatalogStore) {
    spawn_local(async move {
        match api::list_materials(&ctx.api(), Query::new().limit(OPTION_LIMIT)).await {
            Ok(page) => {
                debug!(count = page.items.len(), "materials loaded");
                store.materials().set(page.items);
            }
            Err(err) => ctx.report(&err, "Erro ao carregar materiais"),
        }
    });
}

// ========================
// Store Helper Functions
// ========================

/// Add a client created elsewhere (quick client, direct sale) and keep the list sorted
pub fn store_add_client(store: &CatalogStore, client: Client) {
    let field = store.clients();
    let mut clients = field.write();
    clients.retain(|c| c.id != client.id);
    clients.push(client);
    clients.sort_by(|a, b| a.name.to_lowercase().cmp(&b.name.to_lowercase()));
}

pub fn material_by_id(store: &CatalogStore, id: &str) -> Option<Material> {
    store.materials().with(|materials| materials.iter().find(|m| m.id == id).cloned())
}

#[cfg(test)]
mod tests {
    use super::*;
    use leptos::reactive::owner::Owner;

    fn client(id: &str, name: &str) -> Client {
        Client {
            id: id.into(),
            name: name.into(),
            ..Default::default()
        }
    }

    #[test]
    fn test_add_client_replaces_and_sorts() {
        let owner = Owner::new();
        owner.with(|| {
            let store = Store::new(CatalogState {
                clients: vec![client("c1", "bruno"), client("c2", "Carla")],
                ..Default::default()
            });

            store_add_client(&store, client("c3", "Ana"));
            store_add_client(&store, client("c1", "Bruno Lima"));

            let names = store
                .clients()
                .with(|clients| clients.iter().map(|c| c.name.clone()).collect::<Vec<_>>());
            assert_eq!(names, ["Ana", "Bruno Lima", "Carla"]);
        });
    }

    #[test]
    fn test_material_lookup() {
        let owner = Owner::new();
        owner.with(|| {
            let store = Store::new(CatalogState {
                materials: vec![Material { id: "m1".into(), ..Default::default() }],
                ..Default::default()
            });
            assert!(material_by_id(&store, "m1").is_some());
            assert!(material_by_id(&store, "m2").is_none());
        });
    }
}
