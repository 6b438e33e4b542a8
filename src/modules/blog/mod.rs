pub mod controller;
pub mod mock;
pub mod model;
pub mod router;
pub mod service;

pub use router::init_blog_router;
