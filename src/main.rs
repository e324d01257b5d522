//! Atende Frontend Entry Point

mod api;
mod app;
mod components;
mod context;
mod feed;
mod markdown;
mod models;
mod notifier;
mod session;
mod socket;
mod toast;

use app::App;
use leptos::prelude::*;

fn main() {
    console_error_panic_hook::set_once();
    mount_to_body(App);
}
