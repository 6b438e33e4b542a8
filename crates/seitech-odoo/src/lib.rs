//! # SEI Tech Odoo
//!
//! Client for the Odoo ERP that owns every durable record of the site.
//!
//! - [`client`]: JSON-RPC ORM calls (`search_read`, `create`, `write`, ...),
//!   session authentication and passthrough calls to custom REST controllers
//! - [`session`]: The cached service-account session used for server-side calls
//! - [`domain`]: Builder for Odoo search domains
//! - [`fields`]: Accessors that absorb Odoo's `false`-for-empty field encoding
//! - [`batch`]: A queue that coalesces independent calls into concurrent flushes
//!
//! # Example
//!
//! ```ignore
//! use seitech_odoo::{Domain, OdooClient, SearchRead};
//!
//! let client = OdooClient::new(config)?;
//! let courses = client
//!     .search_read(
//!         "slide.channel",
//!         SearchRead::new(Domain::new().eq("website_published", true))
//!             .fields(&["id", "name"])
//!             .limit(20),
//!     )
//!     .await?;
//! ```

pub mod batch;
pub mod client;
pub mod domain;
pub mod error;
pub mod fields;
pub mod session;

pub use batch::{BatchCall, BatchClient, BatchExecutor};
pub use client::{OdooClient, OdooSession, RestResponse, SearchRead};
pub use domain::Domain;
pub use error::OdooError;
