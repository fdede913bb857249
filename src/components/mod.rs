//! UI Components
//!
//! Reusable Leptos components.

mod date_filter_bar;
mod delete_confirm_button;
mod layout;
mod loading;
mod modal;
mod stock_alert;
mod toast_host;

pub use date_filter_bar::DateFilterBar;
pub use delete_confirm_button::DeleteConfirmButton;
pub use layout::Layout;
pub use loading::Loading;
pub use modal::Modal;
pub use stock_alert::StockAlert;
pub use toast_host::ToastHost;
