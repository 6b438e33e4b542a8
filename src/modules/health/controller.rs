use axum::{Json, extract::State, http::StatusCode};
use tracing::instrument;

use crate::modules::health::model::HealthReport;
use crate::state::AppState;

#[utoipa::path(
    get,
    path = "/api/health",
    responses(
        (status = 200, description = "Gateway and ERP are up", body = HealthReport),
        (status = 503, description = "ERP unreachable", body = HealthReport)
    ),
    tag = "Health"
)]
#[instrument(skip(state))]
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthReport>) {
    let reachable = state.odoo.is_reachable().await;
    if !reachable {
        tracing::warn!(odoo.url = %state.odoo.base_url(), "ERP health check failed");
    }

    let report = HealthReport::new(
        reachable,
        state.odoo.base_url(),
        &state.site_config.environment,
    );
    let status = if report.is_ok() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    (status, Json(report))
}

#[cfg(test)]
mod tests {
    use crate::modules::health::model::HealthReport;

    #[test]
    fn test_degraded_report() {
        let report = HealthReport::new(false, "http://odoo:8069", "test");
        assert!(!report.is_ok());
        let body = serde_json::to_value(&report).unwrap();
        assert_eq!(body["status"], "degraded");
        assert_eq!(body["services"]["odoo"]["status"], "unreachable");
        assert_eq!(body["services"]["frontend"], "ok");
        assert_eq!(body["version"], "1.0.0");
    }
}
