use anyhow::anyhow;
use axum::{
    Json,
    extract::{FromRequest, Request, rejection::JsonRejection},
};
use serde::de::DeserializeOwned;
use validator::{Validate, ValidationErrors};

use crate::utils::errors::AppError;

/// Joined field messages, ordered by field name.
pub fn format_errors(errors: &ValidationErrors) -> String {
    let mut fields: Vec<_> = errors.field_errors().into_iter().collect();
    fields.sort_by(|a, b| a.0.cmp(&b.0));

    fields
        .into_iter()
        .flat_map(|(field, errors)| {
            errors.iter().map(move |error| {
                error
                    .message
                    .as_ref()
                    .map(|msg| msg.to_string())
                    .unwrap_or_else(|| format!("{field} is invalid"))
            })
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Serde names the field as "missing field `email` at line 1 column 2".
fn missing_field(text: &str) -> Option<&str> {
    let (_, rest) = text.split_once("missing field `")?;
    rest.split_once('`').map(|(field, _)| field)
}

fn rejection_error(rejection: JsonRejection) -> AppError {
    let message = match &rejection {
        JsonRejection::MissingJsonContentType(_) => {
            "Missing 'Content-Type: application/json' header".to_string()
        }
        JsonRejection::JsonDataError(_) => {
            let text = rejection.body_text();
            match missing_field(&text) {
                Some(field) => format!("{field} is required"),
                None if text.contains("invalid type") => "Invalid field type in request".to_string(),
                None => "Invalid request body".to_string(),
            }
        }
        _ => "Invalid request body".to_string(),
    };
    AppError::bad_request(anyhow!(message))
}

/// JSON body that passed `validator` checks. Every rejection is a 400.
#[derive(Debug, Clone, Copy, Default)]
pub struct ValidatedJson<T>(pub T);

impl<T, S> FromRequest<S> for ValidatedJson<T>
where
    T: DeserializeOwned + Validate,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(rejection_error)?;

        value.validate().map_err(|errors| {
            AppError::bad_request(anyhow!(format_errors(&errors)))
        })?;

        Ok(ValidatedJson(value))
    }
}

/// JSON body without validation, with the same 400 mapping for malformed input.
#[derive(Debug, Clone, Copy, Default)]
pub struct LenientJson<T>(pub T);

impl<T, S> FromRequest<S> for LenientJson<T>
where
    T: DeserializeOwned,
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request(req: Request, state: &S) -> Result<Self, Self::Rejection> {
        let Json(value) = Json::<T>::from_request(req, state)
            .await
            .map_err(rejection_error)?;
        Ok(LenientJson(value))
    }
}

/// A body that must both parse and validate, where any failure is reported
/// with one route-specific message such as "Invalid cart data".
pub fn checked_body<T: Validate>(
    body: Result<Json<T>, JsonRejection>,
    message: &'static str,
) -> Result<T, AppError> {
    body.ok()
        .map(|Json(value)| value)
        .filter(|value| value.validate().is_ok())
        .ok_or_else(|| AppError::bad_request(anyhow!(message)))
}
