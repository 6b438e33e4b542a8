//! ORM calls made on behalf of a signed-in user.
//!
//! Users who logged in through the ERP carry their own web session; actions
//! that depend on the acting user (upvotes, joining a group) run under it.
//! Everyone else goes through the service account, and the caller sets
//! ownership fields explicitly.

use serde_json::{Value, json};

use anyhow::anyhow;

use seitech_odoo::{OdooClient, OdooError};

use crate::middleware::auth::AuthUser;
use crate::utils::errors::AppError;

pub struct UserOrm<'a> {
    odoo: &'a OdooClient,
    session: Option<&'a str>,
}

impl<'a> UserOrm<'a> {
    pub fn new(odoo: &'a OdooClient, auth_user: &'a AuthUser) -> Self {
        let session = if auth_user.is_demo() {
            None
        } else {
            auth_user.odoo_session()
        };
        Self { odoo, session }
    }

    /// Whether calls run as the user rather than the service account.
    pub fn acts_as_user(&self) -> bool {
        self.session.is_some()
    }

    pub async fn call_kw(
        &self,
        model: &str,
        method: &str,
        args: Value,
        kwargs: Value,
    ) -> Result<Value, OdooError> {
        match self.session {
            Some(session) => self.odoo.call_kw_as(session, model, method, args, kwargs).await,
            None => self.odoo.call_kw(model, method, args, kwargs).await,
        }
    }

    pub async fn create(&self, model: &str, values: Value) -> Result<i64, OdooError> {
        let result = self.call_kw(model, "create", json!([values]), json!({})).await?;
        match &result {
            Value::Number(n) => n.as_i64(),
            Value::Array(ids) => ids.first().and_then(Value::as_i64),
            _ => None,
        }
        .ok_or_else(|| OdooError::Decode(format!("create returned {result}")))
    }

    pub async fn call_method(&self, model: &str, method: &str, ids: &[i64]) -> Result<Value, OdooError> {
        self.call_kw(model, method, json!([ids]), json!({})).await
    }
}

/// Business-rule rejections raised by an ERP action become a 400 carrying the
/// ERP's message; anything else is a 500 with `context`.
pub fn action_error(err: OdooError, context: &'static str) -> AppError {
    match err {
        OdooError::Rpc { message, .. } => AppError::bad_request(anyhow!(message)),
        other => AppError::internal(anyhow::Error::new(other).context(context)),
    }
}

/// Many2many `(6, 0, ids)` command replacing the whole set.
pub fn replace_ids(ids: &[i64]) -> Value {
    json!([[6, 0, ids]])
}

/// Whether an x2many id list on `record` contains `id`.
pub fn contains_id(record: &Value, field: &str, id: Option<i64>) -> bool {
    let Some(id) = id else { return false };
    seitech_odoo::fields::ids(record, field).contains(&id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_replace_ids() {
        assert_eq!(replace_ids(&[1, 2]), json!([[6, 0, [1, 2]]]));
        assert_eq!(replace_ids(&[]), json!([[6, 0, []]]));
    }

    #[test]
    fn test_action_error_status() {
        let rejected = action_error(
            OdooError::Rpc { code: 200, message: "You are already a member of this group.".into() },
            "Failed to join study group",
        );
        assert_eq!(rejected.status, axum::http::StatusCode::BAD_REQUEST);
        assert_eq!(rejected.message(), "You are already a member of this group.");

        let failed = action_error(OdooError::Timeout, "Failed to join study group");
        assert_eq!(failed.status, axum::http::StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_contains_id() {
        let record = json!({ "upvote_ids": [3, 9], "member_ids": false });
        assert!(contains_id(&record, "upvote_ids", Some(9)));
        assert!(!contains_id(&record, "upvote_ids", Some(4)));
        assert!(!contains_id(&record, "upvote_ids", None));
        assert!(!contains_id(&record, "member_ids", Some(3)));
    }
}
