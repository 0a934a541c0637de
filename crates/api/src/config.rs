/// Server configuration loaded from environment variables.
///
/// All fields have sensible defaults suitable for local development.
/// In production, override via environment variables.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Bind address (default: `0.0.0.0`).
    pub host: String,
    /// Bind port (default: `8000`).
    pub port: u16,
    /// Allowed CORS origins, parsed from comma-separated `CORS_ORIGINS` env var.
    pub cors_origins: Vec<String>,
    /// HTTP request timeout in seconds (default: `30`).
    pub request_timeout_secs: u64,
    /// Bearer token required on write endpoints. When unset, writes are
    /// open; intended for local development only.
    pub write_token: Option<String>,
    /// Upper bound for the `page_size` query parameter (default: `100`).
    pub page_size_max: i64,
}

impl ServerConfig {
    /// Load configuration from environment variables with defaults.
    ///
    /// | Env Var                | Default                    |
    /// |------------------------|----------------------------|
    /// | `HOST`                 | `0.0.0.0`                  |
    /// | `PORT`                 | `8000`                     |
    /// | `CORS_ORIGINS`         | `http://localhost:5173`    |
    /// | `REQUEST_TIMEOUT_SECS` | `30`                       |
    /// | `API_WRITE_TOKEN`      | unset (writes open)        |
    /// | `PAGE_SIZE_MAX`        | `100`                      |
    pub fn from_env() -> Self {
        let host = std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".into());

        let port: u16 = std::env::var("PORT")
            .unwrap_or_else(|_| "8000".into())
            .parse()
            .expect("PORT must be a valid u16");

        let cors_origins: Vec<String> = std::env::var("CORS_ORIGINS")
            .unwrap_or_else(|_| "http://localhost:5173".into())
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let request_timeout_secs: u64 = std::env::var("REQUEST_TIMEOUT_SECS")
            .unwrap_or_else(|_| "30".into())
            .parse()
            .expect("REQUEST_TIMEOUT_SECS must be a valid u64");

        let write_token = std::env::var("API_WRITE_TOKEN")
            .ok()
            .filter(|token| !token.is_empty());

        let page_size_max: i64 = std::env::var("PAGE_SIZE_MAX")
            .unwrap_or_else(|_| tea_core::pagination::MAX_PAGE_SIZE.to_string())
            .parse()
            .expect("PAGE_SIZE_MAX must be a valid i64");

        Self {
            host,
            port,
            cors_origins,
            request_timeout_secs,
            write_token,
            page_size_max,
        }
    }
}

impl Default for ServerConfig {
    /// Test-friendly defaults; `from_env` is the production path.
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8000,
            cors_origins: vec!["http://localhost:5173".into()],
            request_timeout_secs: 30,
            write_token: None,
            page_size_max: tea_core::pagination::MAX_PAGE_SIZE,
        }
    }
}
