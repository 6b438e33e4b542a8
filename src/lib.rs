//! # SEI Tech Gateway
//!
//! Backend-for-frontend for the SEI Tech International health and safety
//! training website. Every feature is served from the Odoo ERP; the gateway
//! shapes ERP records into the site's JSON envelope, keeps the browser
//! session in a signed cookie, and answers with demo data when the ERP is
//! unreachable so the public pages keep rendering.
//!
//! ## Architecture
//!
//! ```text
//! crates/
//! ├── seitech-core/     # Envelope, errors, pagination, roles, text helpers
//! ├── seitech-config/   # Environment-driven configuration
//! ├── seitech-auth/     # Session token claims and signing
//! ├── seitech-odoo/     # JSON-RPC / REST client, domains, batching queue
//! ├── seitech-cache/    # Redis cache, Cache-Control and ETag layers
//! └── seitech-cli/      # Operator commands
//! src/
//! ├── middleware/       # Session extractor, role guards, rate limiting
//! ├── modules/          # Feature modules (courses, cart, cms, admin, ...)
//! └── utils/            # Cookies, ERP proxy helpers
//! ```
//!
//! Each feature module follows the same layout:
//!
//! - `mod.rs`: Module exports
//! - `controller.rs`: HTTP handlers with OpenAPI annotations
//! - `service.rs`: ERP calls and fallbacks
//! - `model.rs`: Request and response shapes
//! - `router.rs`: Axum router
//!
//! ## Response envelope
//!
//! Every JSON route answers `{ "success": bool, "data": ..., "message": ... }`.
//! Errors carry `success: false` with a human-readable `message`.
//!
//! ## Sessions
//!
//! Login exchanges ERP credentials for an ERP session, wraps it in a signed
//! token and sets it as the `session_token` cookie. A readable `user_info`
//! cookie mirrors the public profile for the frontend. Bearer tokens are
//! accepted as well.
//!
//! ## Quick Start
//!
//! ```bash
//! ODOO_URL=https://erp.seitechinternational.org.uk
//! ODOO_DB=seitech
//! ODOO_USERNAME=api@seitech.co.uk
//! ODOO_PASSWORD=secret
//! SESSION_SECRET=change-me
//! cargo run --bin seitech
//! ```
//!
//! - Swagger UI: `http://localhost:3000/swagger-ui`
//! - Scalar: `http://localhost:3000/scalar`
//! - Prometheus: `http://localhost:9090/metrics`
//!
//! ## Modules
//!
//! - [`demo`]: In-memory demo accounts and enrollments
//! - [`docs`]: OpenAPI documentation setup
//! - [`logging`]: Request logging and tracing setup
//! - [`metrics`]: Prometheus metrics
//! - [`middleware`]: Authentication, role guards and rate limiting
//! - [`modules`]: Feature modules
//! - [`router`]: Main application router
//! - [`state`]: Shared application state
//! - [`utils`]: Shared utilities
//! - [`validator`]: Request body extraction and validation

pub mod demo;
pub mod docs;
pub mod logging;
pub mod metrics;
pub mod middleware;
pub mod modules;
pub mod router;
pub mod state;
pub mod utils;
pub mod validator;

// Re-export workspace crates for convenience
pub use seitech_auth;
pub use seitech_cache;
pub use seitech_config;
pub use seitech_core;
pub use seitech_odoo;
