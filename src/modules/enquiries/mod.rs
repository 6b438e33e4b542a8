//! Contact and consultation forms from the marketing site.

pub mod controller;
pub mod model;
pub mod router;
pub mod service;

pub use router::{init_consultation_router, init_contact_router};
