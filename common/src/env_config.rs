use std::{env, sync::Arc, time::Duration};

#[derive(Clone, Debug)]
/// Configuration struct for the server.
///
/// This struct holds all the parameters required to initialize and run
/// the statistics server: database connection details and pool sizing,
/// server host and port, number of worker threads, CORS settings and
/// logging preferences.
pub struct Config {
    // environment
    pub environment: String, // development or production
    /// The URL of the database to connect to.
    pub database_url: String,
    /// Connection pool settings.
    pub db_pool: DbPoolConfig,
    /// The hostname or IP address the server will bind to.
    pub server_host: String,
    /// The port number the server will listen on.
    pub server_port: u16,
    /// The number of worker threads to spawn for handling requests.
    pub num_workers: usize,
    /// The allowed origin for CORS. `*` allows any origin.
    pub cors_allowed_origin: String,
    /// A boolean indicating whether console logging is enabled.
    pub console_logging_enabled: bool,
    /// Minimum level for the logger (`error`, `warn`, `info`, `debug`, `trace`).
    pub log_level: String,
    /// Directory for the log files. `None` keeps logging on stdout only.
    pub log_dir: Option<String>,
    /// Maximum accepted JSON request body, in bytes.
    pub json_body_limit: usize,
}

#[derive(Clone, Debug)]
/// Settings for the Postgres connection pool.
pub struct DbPoolConfig {
    /// Whether the connection must be made over TLS.
    pub require_ssl: bool,
    /// Maximum number of pooled connections.
    pub max_connections: u32,
    /// How long to wait for a free connection before failing.
    pub acquire_timeout: Duration,
    /// How long an unused connection stays open.
    pub idle_timeout: Duration,
}

impl Config {
    /// Creates a new `Config` instance from environment variables.
    ///
    /// Reads an optional `.env` file first, then delegates to
    /// [`Config::from_lookup`] with the process environment.
    ///
    /// # Panics
    ///
    /// This function will panic if no database location is configured or if
    /// a numeric value cannot be parsed.
    pub fn from_env() -> Arc<Self> {
        dotenvy::dotenv().ok();

        Arc::new(Self::from_lookup(|key| env::var(key).ok()))
    }

    /// Builds the configuration from an arbitrary key lookup.
    ///
    /// # Environment Variables
    ///
    /// Required (one of):
    /// - `DATABASE_URL`: Connection string for the database
    /// - `DB_HOST`, `DB_NAME`, `DB_USER`, `DB_PASSWORD`, `DB_PORT`: the parts of it
    ///
    /// Optional (with defaults):
    /// - `ENVIRONMENT`: "development"
    /// - `DB_SSL`: true
    /// - `DB_MAX_CONNECTIONS`: 10
    /// - `DB_ACQUIRE_TIMEOUT_MS` / `DB_IDLE_TIMEOUT_MS`: 250000
    /// - `IP`: Server host (default: "127.0.0.1")
    /// - `PORT`: Server port (default: 8080)
    /// - `WORKERS`: Number of worker threads (default: 4)
    /// - `CORS_ALLOWED_ORIGIN`: Allowed CORS origin (default: "*")
    /// - `ENABLE_CONSOLE_LOGGING`: Whether to enable console logging (default: true)
    /// - `LOG_LEVEL`: "info"
    /// - `LOG_DIR`: "logs", ignored when `VERCEL=1`
    /// - `JSON_BODY_LIMIT`: 10 MB
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var_or = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let flag = |key: &str, default: bool| {
            lookup(key).map_or(default, |value| value.trim().eq_ignore_ascii_case("true"))
        };
        let number = |key: &str, default: u64| -> u64 {
            lookup(key).map_or(default, |value| {
                value
                    .trim()
                    .parse()
                    .unwrap_or_else(|_| panic!("{key} must be a valid number"))
            })
        };

        let database_url = lookup("DATABASE_URL")
            .or_else(|| database_url_from_parts(&lookup))
            .expect("DATABASE_URL or DB_HOST/DB_NAME must be set");

        let on_vercel = lookup("VERCEL").as_deref() == Some("1");

        Config {
            environment: var_or("ENVIRONMENT", "development"),
            database_url,
            db_pool: DbPoolConfig {
                require_ssl: flag("DB_SSL", true),
                max_connections: u32::try_from(number("DB_MAX_CONNECTIONS", 10))
                    .unwrap_or_else(|_| panic!("DB_MAX_CONNECTIONS must be a valid number")),
                acquire_timeout: Duration::from_millis(number("DB_ACQUIRE_TIMEOUT_MS", 250_000)),
                idle_timeout: Duration::from_millis(number("DB_IDLE_TIMEOUT_MS", 250_000)),
            },
            server_host: var_or("IP", "127.0.0.1"),
            server_port: var_or("PORT", "8080").parse().unwrap_or(8080),
            num_workers: var_or("WORKERS", "4").parse().unwrap_or(4),
            cors_allowed_origin: var_or("CORS_ALLOWED_ORIGIN", "*"),
            console_logging_enabled: flag("ENABLE_CONSOLE_LOGGING", true),
            log_level: var_or("LOG_LEVEL", "info"),
            log_dir: (!on_vercel).then(|| var_or("LOG_DIR", "logs")),
            json_body_limit: usize::try_from(number("JSON_BODY_LIMIT", 10 * 1024 * 1024))
                .unwrap_or_else(|_| panic!("JSON_BODY_LIMIT must be a valid number")),
        }
    }

    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }
}

/// Assembles a `postgresql://` URL from the `DB_*` variables.
/// Credentials are percent-encoded by `url`.
fn database_url_from_parts<F>(lookup: &F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    let host = lookup("DB_HOST").filter(|h| !h.is_empty())?;
    let name = lookup("DB_NAME").filter(|n| !n.is_empty())?;
    let port: u16 = lookup("DB_PORT")
        .and_then(|p| p.trim().parse().ok())
        .unwrap_or(5432);

    let mut url = url::Url::parse("postgresql://localhost").ok()?;
    url.set_host(Some(&host)).ok()?;
    url.set_port(Some(port)).ok()?;
    url.set_path(&name);
    if let Some(user) = lookup("DB_USER").filter(|u| !u.is_empty()) {
        url.set_username(&user).ok()?;
        if let Some(password) = lookup("DB_PASSWORD").filter(|p| !p.is_empty()) {
            url.set_password(Some(&password)).ok()?;
        }
    }

    Some(url.to_string())
}
