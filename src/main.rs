//! Book Generator - desktop client for NPC books
//!
//! Compose formatted books, save them to the book API, and browse, sort and
//! delete what is already stored.

mod app;
mod core;
mod store;
mod ui;

use app::BookGeneratorApp;
use eframe::egui;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use crate::core::config::AppConfig;
use crate::store::{Dispatcher, HttpBookStore};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::filter::LevelFilter::INFO)
        .init();

    tracing::info!("Starting Book Generator...");

    let config = AppConfig::load();
    let store = HttpBookStore::new(&config.api.base_url);
    tracing::info!("Using book API at {}", store.base_url());

    let dispatcher = Dispatcher::new(store)?;

    let native_options = eframe::NativeOptions {
        viewport: egui::ViewportBuilder::default()
            .with_inner_size([config.ui.window_width, config.ui.window_height])
            .with_min_inner_size([800.0, 600.0])
            .with_title("Book Generator"),
        ..Default::default()
    };

    eframe::run_native(
        "Book Generator",
        native_options,
        Box::new(move |cc| Ok(Box::new(BookGeneratorApp::new(cc, config, dispatcher)))),
    )
    .map_err(|e| anyhow::anyhow!("Window closed with error: {}", e))
}
