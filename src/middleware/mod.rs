//! Request extractors and middleware.
//!
//! - [`auth`]: session extractors (`AuthUser`, `Option<AuthUser>`) and
//!   permission extractors built with `require_permission!`
//! - [`role`]: role gates applied to whole route groups
//! - [`rate_limit`]: per-client request quotas
//!
//! A session token is accepted from `Authorization: Bearer <token>` or from
//! the `session_token` cookie set at login.

pub mod auth;
pub mod rate_limit;
pub mod role;
