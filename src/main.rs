#![cfg_attr(target_os = "windows", windows_subsystem = "windows")]

use std::sync::Arc;

mod clipboard;
mod completion;
mod config;
mod dictionary;
mod form;
mod logger;
mod prompt;
mod ui;

use completion::{CompletionBackend, OpenAiClient};

fn main() {
    // .env first so RUST_LOG and OPENAI_* from it are seen by everything below
    dotenvy::dotenv().ok();
    logger::init();
    if let Err(e) = run() {
        tracing::error!("fatal: {:#}", e);
        std::process::exit(1);
    }
}

fn run() -> anyhow::Result<()> {
    let cfg = config::Config::load();
    tracing::info!("Config loaded from {}", config::Config::path().display());
    if cfg.openai_api_key.is_empty() {
        tracing::warn!("OPENAI_API_KEY is not set; translations will fail");
    }
    tracing::info!("Using model {} at {}", cfg.openai_model, cfg.api_base);

    // One client for the whole process, shared by every submission.
    let backend: Arc<dyn CompletionBackend> = Arc::new(OpenAiClient::new(&cfg)?);
    let runtime = tokio::runtime::Builder::new_multi_thread().enable_all().build()?;

    ui::run(backend, runtime.handle().clone())
}
