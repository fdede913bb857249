//! Form Drafts
//!
//! Editable form state and the validation that turns it into request
//! payloads. Nothing here touches the DOM.

mod account;
mod catalog;
mod inventory;
mod sale;

pub use account::*;
pub use catalog::*;
pub use inventory::*;
pub use sale::*;
