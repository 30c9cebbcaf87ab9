//! WebView JavaScript bridge — demo embedding entry point.
//!
//! This binary wires both halves of the bridge together in one process and
//! plays the script side against the sample product catalog, exercising the
//! complete protocol: queueing, notification, flush, handler dispatch, and
//! escaped result delivery.
//!
//! # Usage
//!
//! ```text
//! jsbridge-demo [OPTIONS]
//!
//! Options:
//!   --product <NAME>   Product to look up in the demo run [default: Apple]
//! ```
//!
//! # Environment variable overrides
//!
//! | Variable                 | Default | Description                      |
//! |--------------------------|---------|----------------------------------|
//! | `JSBRIDGE_DEMO_PRODUCT`  | `Apple` | Product name for the lookup call |
//!
//! Log output is controlled by `RUST_LOG` (e.g. `RUST_LOG=debug`).
//!
//! # What the demo run does
//!
//! 1. Installs a bridge into an in-process script context.
//! 2. Sends a fire-and-forget notification (no response expected).
//! 3. Calls `getAllProducts` and `getProduct` through the awaitable surface.
//! 4. Calls `getProduct` again through the callback-style surface.
//! 5. Calls a handler that does not exist and shows the sanitized rejection.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use serde_json::json;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use jsbridge_demo::{build_registry, ProductCatalog};
use jsbridge_host::{Dispatcher, LocalScriptContext};
use jsbridge_script::{notify_channel, ScriptBridge};

// ── CLI argument definitions ──────────────────────────────────────────────────

/// Demo embedding for the WebView JavaScript bridge.
///
/// Runs both halves in one process against the sample product catalog.
#[derive(Debug, Parser)]
#[command(
    name = "jsbridge-demo",
    about = "End-to-end demo of the WebView JavaScript bridge",
    version
)]
struct Cli {
    /// Product name for the `getProduct` demo call.
    #[arg(long, default_value = "Apple", env = "JSBRIDGE_DEMO_PRODUCT")]
    product: String,
}

// ── Entry point ───────────────────────────────────────────────────────────────

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    // ── Wire the two halves together ──────────────────────────────────────────
    //
    // The notify channel is the only path from the script side to the host;
    // the script context's eval surface is the only path back.
    let (sink, notifications) = notify_channel();
    let bridge = Arc::new(ScriptBridge::new(sink));

    let context = LocalScriptContext::new();
    context
        .install(Arc::clone(&bridge))
        .context("bridge installation")?;

    let catalog = Arc::new(ProductCatalog::new());
    let registry = build_registry(catalog);
    let dispatcher = Dispatcher::new(context, registry);
    tokio::spawn(dispatcher.run(notifications));

    info!("bridge installed; starting demo calls");

    // ── Fire-and-forget ───────────────────────────────────────────────────────
    bridge.send(json!({"event": "demoStarted"})).await;

    // ── Awaitable calls ───────────────────────────────────────────────────────
    let all = bridge
        .call_native("getAllProducts", json!(null))
        .await
        .map_err(|e| anyhow::anyhow!("getAllProducts failed: {e}"))?;
    info!("getAllProducts → {all}");

    let product = bridge
        .call_native("getProduct", json!([cli.product]))
        .await
        .map_err(|e| anyhow::anyhow!("getProduct failed: {e}"))?;
    info!("getProduct({:?}) → {product}", cli.product);

    // ── Callback-style call ───────────────────────────────────────────────────
    let (done_tx, done_rx) = tokio::sync::oneshot::channel();
    Arc::clone(&bridge).call_native_with_callbacks(
        "getProduct",
        json!(["Pear"]),
        move |value| {
            let _ = done_tx.send(format!("callback resolved with {value}"));
        },
        |payload| {
            warn!("callback rejected: {}", payload.message);
        },
    );
    if let Ok(outcome) = done_rx.await {
        info!("{outcome}");
    }

    // ── Rejection path ────────────────────────────────────────────────────────
    match bridge.call_native("doesNotExist", json!({})).await {
        Ok(value) => warn!("unexpected success from unknown handler: {value}"),
        Err(e) => info!("unknown handler rejected as expected: {e}"),
    }

    info!("demo complete");
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────
