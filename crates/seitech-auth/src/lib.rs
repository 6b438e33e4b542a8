//! # SEI Tech Auth
//!
//! Session token types and signing utilities.
//!
//! A login produces a [`SessionClaims`] value that is signed into the
//! `session_token` cookie. Every protected route verifies the token and reads
//! the ERP identity (user id, partner id), the role and its permissions from
//! it, so authorization never needs an ERP round trip.
//!
//! # Example
//!
//! ```ignore
//! use seitech_auth::{SessionClaims, create_session_token, verify_session_token};
//! use seitech_config::SessionConfig;
//!
//! let config = SessionConfig::from_env();
//! let token = create_session_token(identity, &config)?;
//! let claims = verify_session_token(&token, &config)?;
//! ```

pub mod claims;
pub mod jwt;

pub use claims::{SessionClaims, SessionIdentity};
pub use jwt::{AuthTokenError, create_session_token, verify_session_token};
