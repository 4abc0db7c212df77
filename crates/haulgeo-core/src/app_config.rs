#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

#[derive(Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub amap_api_key: String,
    pub amap_base_url: String,
    pub database_url: Option<String>,
    pub db_max_connections: u32,
    pub db_min_connections: u32,
    pub db_acquire_timeout_secs: u64,
    pub provider_timeout_secs: u64,
    pub provider_max_retries: u32,
    pub provider_backoff_base_ms: u64,
    pub reverse_radius_m: u32,
    pub batch_max_concurrent: usize,
    pub accept_unrecognized_levels: bool,
    pub route_deadline_ms: u64,
    pub route_curve_bias: f64,
    pub route_samples_per_segment: usize,
}

impl std::fmt::Debug for AppConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppConfig")
            .field("env", &self.env)
            .field("log_level", &self.log_level)
            .field("amap_api_key", &"[redacted]")
            .field("amap_base_url", &self.amap_base_url)
            .field(
                "database_url",
                &self.database_url.as_ref().map(|_| "[redacted]"),
            )
            .field("db_max_connections", &self.db_max_connections)
            .field("db_min_connections", &self.db_min_connections)
            .field("db_acquire_timeout_secs", &self.db_acquire_timeout_secs)
            .field("provider_timeout_secs", &self.provider_timeout_secs)
            .field("provider_max_retries", &self.provider_max_retries)
            .field("provider_backoff_base_ms", &self.provider_backoff_base_ms)
            .field("reverse_radius_m", &self.reverse_radius_m)
            .field("batch_max_concurrent", &self.batch_max_concurrent)
            .field(
                "accept_unrecognized_levels",
                &self.accept_unrecognized_levels,
            )
            .field("route_deadline_ms", &self.route_deadline_ms)
            .field("route_curve_bias", &self.route_curve_bias)
            .field(
                "route_samples_per_segment",
                &self.route_samples_per_segment,
            )
            .finish()
    }
}
