//! scenepad: a small scene editor.
//!
//! Primitives, lights and imported glTF models live in an object registry
//! that drives selection, the transform gizmo, the property panel and
//! texture slots. Scenes export as JSON or as a three.js snippet.

mod app;
mod assets;
mod config;
mod context;
mod engine;
mod render;
mod scene;
mod ui;

use config::EditorConfig;

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .format_timestamp_millis()
        .init();

    log::info!("scenepad starting");
    log::info!("   W/E/R pick the gizmo mode, Q disables it, Delete removes the selection");

    let config = EditorConfig::load_or_default(&EditorConfig::default_path());
    if let Err(err) = app::run(config) {
        log::error!("Event loop error: {err}");
        std::process::exit(1);
    }

    log::info!("Goodbye");
}
