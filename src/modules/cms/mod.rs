//! Marketing content proxied from the ERP CMS, with built-in defaults for
//! the pieces the site cannot render without.

pub mod controller;
pub mod defaults;
pub mod model;
pub mod router;
pub mod service;

pub use router::init_cms_router;
