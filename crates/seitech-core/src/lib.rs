//! # SEI Tech Core
//!
//! Core types shared by every crate of the SEI Tech gateway.
//!
//! - [`errors`]: Application error type rendered as the JSON envelope
//! - [`response`]: The `{ success, data, message }` envelope
//! - [`pagination`]: Query pagination helpers
//! - [`permissions`]: Role names and the permissions each role grants
//! - [`serde`]: Deserializers for loosely-typed query strings
//! - [`text`]: Slugs, read-time estimates and name splitting
//!
//! # Example
//!
//! ```ignore
//! use seitech_core::{ApiResponse, AppError};
//!
//! async fn handler() -> Result<ApiResponse<Vec<u32>>, AppError> {
//!     Ok(ApiResponse::ok(vec![1, 2, 3]))
//! }
//! ```

pub mod errors;
pub mod pagination;
pub mod permissions;
pub mod response;
pub mod serde;
pub mod text;

pub use errors::AppError;
pub use pagination::{MAX_OFFSET, OffsetPagination, PageMeta, PaginationParams, clamp_offset};
pub use response::ApiResponse;
