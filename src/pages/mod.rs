//! Pages
//!
//! One component per route.

mod clients;
mod dashboard;
mod fields;
mod login;
mod material_consumption;
mod material_purchases;
mod material_withdrawals;
mod materials;
mod password;
mod productions;
mod products;
mod register;
mod reports;
mod sales;
mod users;
mod verify_email;

pub use clients::ClientsPage;
pub use dashboard::DashboardPage;
pub use login::LoginPage;
pub use material_consumption::MaterialConsumptionPage;
pub use material_purchases::MaterialPurchasesPage;
pub use material_withdrawals::MaterialWithdrawalsPage;
pub use materials::MaterialsPage;
pub use password::{ForgotPasswordPage, ResetPasswordPage};
pub use productions::ProductionsPage;
pub use products::ProductsPage;
pub use register::{RegisterPage, SetupAdminPage};
pub use reports::ReportsPage;
pub use sales::SalesPage;
pub use users::UsersPage;
pub use verify_email::VerifyEmailPage;
