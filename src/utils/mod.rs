//! Shared helpers for handlers.
//!
//! - [`cookies`]: The session and user-info cookies
//! - [`errors`]: Re-export of the application error type
//! - [`odoo`]: ORM calls on behalf of a signed-in user
//! - [`proxy`]: Relaying ERP REST responses and recording demo fallbacks
//! - [`url`]: Percent-encoding for path segments, query values and cookies

pub mod cookies;
pub mod errors;
pub mod odoo;
pub mod proxy;
pub mod url;
