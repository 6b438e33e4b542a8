use serde::Serialize;
use utoipa::ToSchema;

pub const API_VERSION: &str = "1.0.0";

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthReport {
    /// `ok` when the ERP answers, otherwise `degraded`
    pub status: &'static str,
    pub timestamp: String,
    pub version: &'static str,
    pub environment: String,
    pub services: HealthServices,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct HealthServices {
    pub frontend: &'static str,
    pub odoo: OdooHealth,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct OdooHealth {
    /// `ok` or `unreachable`
    pub status: &'static str,
    pub url: String,
}

impl HealthReport {
    pub fn new(odoo_reachable: bool, odoo_url: &str, environment: &str) -> Self {
        Self {
            status: if odoo_reachable { "ok" } else { "degraded" },
            timestamp: chrono::Utc::now().to_rfc3339(),
            version: API_VERSION,
            environment: environment.to_string(),
            services: HealthServices {
                frontend: "ok",
                odoo: OdooHealth {
                    status: if odoo_reachable { "ok" } else { "unreachable" },
                    url: odoo_url.to_string(),
                },
            },
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == "ok"
    }
}
