use crate::env_or;

/// Listen addresses for the API and the Prometheus exporter.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub metrics_port: u16,
}

impl ServerConfig {
    /// - `SERVER_HOST` (default `0.0.0.0`)
    /// - `PORT` (default `3000`)
    /// - `METRICS_PORT` (default `9090`)
    pub fn from_env() -> Self {
        Self {
            host: std::env::var("SERVER_HOST").unwrap_or_else(|_| "0.0.0.0".into()),
            port: env_or("PORT", 3000),
            metrics_port: env_or("METRICS_PORT", 9090),
        }
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
