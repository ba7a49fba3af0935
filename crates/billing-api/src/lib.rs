//! # billing-api
//!
//! HTTP API layer for the subscription billing server.
//!
//! This crate provides:
//! - Axum-based HTTP server
//! - Endpoints that broker hosted checkout and billing portal sessions
//! - Webhook handler for payment events
//! - Static serving of the frontend
//!
//! ## Endpoints
//!
//! | Method | Path | Description |
//! |--------|------|-------------|
//! | GET | `/config` | Publishable key and price IDs |
//! | POST | `/create-checkout-session` | 303 to hosted checkout (form: `priceId`) |
//! | GET | `/checkout-session` | Checkout session JSON (query: `sessionId`) |
//! | POST | `/customer-portal` | 303 to billing portal (form: `sessionId`) |
//! | POST | `/webhook` | Stripe webhook |
//! | GET | `/html/success.html` | Success page |
//! | GET | `/*` | Static files |

pub mod handlers;
pub mod response;
pub mod routes;
pub mod state;

pub use routes::create_router;
pub use state::{AppConfig, AppState};
