//! Business Dashboard Frontend Entry Point

mod access;
mod api;
mod app;
mod calc;
mod components;
mod config;
mod context;
mod dates;
mod error;
mod forms;
mod models;
mod pages;
mod router;
mod session;
mod store;

#[cfg(test)]
mod tests;

use app::App;
use leptos::prelude::*;

fn main() {
    console_error_panic_hook::set_once();
    if let Err(err) = rolling_logger::init(rolling_logger::DEFAULT_CAPACITY, tracing::Level::DEBUG) {
        web_sys::console::warn_1(&format!("logger not installed: {err}").into());
    }
    mount_to_body(App);
}
