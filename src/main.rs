#![allow(warnings)]
//! Tasker Frontend Entry Point

mod app;
mod browser;
mod commands;
mod components;
mod context;
mod models;
mod services;
mod store;

use app::App;
use leptos::prelude::*;

fn main() {
    console_error_panic_hook::set_once();
    if let Err(e) = rolling_logger::init_logger("Tasker") {
        web_sys::console::warn_1(&format!("[APP] {}", e).into());
    }
    mount_to_body(App);
}
