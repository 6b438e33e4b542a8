pub mod controller;
pub mod fallback;
pub mod model;
pub mod router;
pub mod service;

pub use model::*;
pub use router::{init_categories_router, init_courses_router};
