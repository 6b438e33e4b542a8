//! Points, badges, leaderboards and learning streaks.

pub mod controller;
pub mod model;
pub mod router;
pub mod service;

pub use model::*;
pub use router::{init_gamification_router, init_leaderboard_router, init_streaks_router};
