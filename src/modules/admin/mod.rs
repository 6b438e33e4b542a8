//! Back-office routes for staff.

pub mod controller;
pub mod fallback;
pub mod model;
pub mod router;
pub mod service;

pub use router::init_admin_router;
