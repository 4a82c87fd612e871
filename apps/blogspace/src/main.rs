//! # BlogSpace
//!
//! Terminal client for writing, publishing and reading blogs hosted on a
//! Supabase-style backend. Pass `--offline` to run against an in-process
//! backend instead.

use std::sync::Arc;

use anyhow::Context;

mod auth_context;
mod config;
mod layout;
mod lifecycle;
mod pages;
mod router;
mod state;
mod telemetry;
mod terminal;

use auth_context::AuthContext;
use config::AppConfig;
use router::App;
use state::AppState;
use telemetry::{TelemetryConfig, init_telemetry};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env file if present
    dotenvy::dotenv().ok();

    init_telemetry(&TelemetryConfig::from_env());

    let offline = std::env::args().skip(1).any(|arg| arg == "--offline");
    let state = if offline {
        tracing::info!("Running against the in-process backend");
        AppState::in_memory().0
    } else {
        let config = AppConfig::from_env().context("Failed to load configuration")?;
        AppState::connect(&config.backend)
    };

    let auth = Arc::new(AuthContext::new(state.auth.clone(), state.profiles.clone()));
    auth.start().await.context("Failed to start auth context")?;

    let mut app = App::new(state, auth.clone());
    app.sync_auth().await;

    let result = terminal::run(&mut app).await;

    auth.teardown().await;
    tracing::info!("BlogSpace closed");
    result
}
