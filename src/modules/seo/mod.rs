//! Crawler files: the XML sitemap and robots.txt.

pub mod controller;
pub mod model;
pub mod router;
pub mod service;

pub use router::{init_robots_router, init_sitemap_router};
