use axum::extract::State;
use tracing::instrument;

use seitech_core::ApiResponse;

use crate::middleware::auth::AuthUser;
use crate::modules::dashboard::model::DashboardData;
use crate::modules::dashboard::service::DashboardService;
use crate::state::AppState;
use crate::utils::errors::AppError;

#[utoipa::path(
    get,
    path = "/api/dashboard/stats",
    responses(
        (status = 200, description = "Learner statistics; zeroed with a message when the ERP fails", body = DashboardData),
        (status = 401, description = "Unauthorized. Please log in.")
    ),
    tag = "Dashboard",
    security(("bearer_auth" = []), ("cookie_auth" = []))
)]
#[instrument(skip_all)]
pub async fn get_stats(
    State(state): State<AppState>,
    auth_user: Option<AuthUser>,
) -> Result<ApiResponse<DashboardData>, AppError> {
    let auth_user =
        auth_user.ok_or_else(|| AppError::unauthorized("Unauthorized. Please log in."))?;

    if auth_user.is_demo() {
        return Ok(ApiResponse::ok(DashboardData::demo()));
    }

    let (Some(user_id), Some(partner_id)) = (auth_user.0.odoo_uid(), auth_user.0.partner_id) else {
        return Err(AppError::unauthorized("Session expired. Please log in again."));
    };

    match DashboardService::load(&state.batch, state.odoo.base_url(), user_id, partner_id).await {
        Ok(data) => Ok(ApiResponse::ok(data)),
        Err(e) => {
            tracing::error!(error = %e, "Failed to load dashboard stats");
            Ok(ApiResponse::ok(DashboardData::default()).with_message("Unable to load stats"))
        }
    }
}
