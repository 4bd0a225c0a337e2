//! Kanban Frontend Entry Point

mod app;
mod commands;
mod components;
mod config;
mod context;
mod logging;
mod models;
mod store;

use app::App;
use config::AppConfig;
use leptos::prelude::*;

fn main() {
    console_error_panic_hook::set_once();
    let config = AppConfig::load();
    logging::init(config.level());
    tracing::info!(api_url = %config.api_url, "starting kanban frontend");
    mount_to_body(move || view! { <App config=config.clone() /> });
}
