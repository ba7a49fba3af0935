//! # Billing Server
//!
//! Subscription checkout backend brokering Stripe hosted flows.
//!
//! ## Usage
//!
//! ```bash
//! # Set environment variables (or put them in .env)
//! export STRIPE_SECRET_KEY=sk_test_...
//! export STRIPE_PUBLISHABLE_KEY=pk_test_...
//! export STRIPE_WEBHOOK_SECRET=whsec_...
//! export BASIC_PRICE_ID=price_...
//! export PRO_PRICE_ID=price_...
//! export DOMAIN=http://localhost:4242
//! export STATIC_DIR=./client
//!
//! # Run the server
//! billing-server
//! ```

use billing_api::{routes, state::AppState};
use tracing::{info, Level};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    // Initialize logging
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    let (plain_layer, json_layer) = if json_logs {
        (None, Some(fmt::layer().json()))
    } else {
        (Some(fmt::layer()), None)
    };

    tracing_subscriber::registry()
        .with(plain_layer)
        .with(json_layer)
        .with(
            EnvFilter::builder()
                .with_default_directive(Level::INFO.into())
                .from_env_lossy(),
        )
        .init();

    // Print banner
    print_banner();

    // Initialize application state
    let state = AppState::new()?;

    let addr = state.config.socket_addr()?;

    info!("Domain: {}", state.config.domain);
    info!("Static files: {}", state.config.static_dir.display());
    info!("Payment provider: {}", state.provider.provider_name());

    // Create router
    let app = routes::create_router(state);

    // Start server
    info!("Listening on http://{}", addr);
    info!("Webhook: POST http://{}/webhook", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

fn print_banner() {
    println!(
        r#"
  Billing Server
  ━━━━━━━━━━━━━━━━━━━━━━━
  Stripe checkout + customer portal
  Version: {}
"#,
        env!("CARGO_PKG_VERSION")
    );
}
