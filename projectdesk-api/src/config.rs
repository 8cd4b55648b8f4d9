/// Configuration for the API server
///
/// Values come from the process environment (after loading `.env` when
/// present), layered over defaults with the `config` crate. The result is
/// read once at startup and shared read-only through `AppState`.
///
/// # Environment Variables
///
/// - `API_HOST` (default `0.0.0.0`), `API_PORT` (default `8080`)
/// - `API_CORS_ORIGINS`: comma-separated origins, `*` for any (default `*`)
/// - `API_PRODUCTION`: enables HSTS (default `false`)
/// - `DATABASE_URL` (required), `DATABASE_MAX_CONNECTIONS` (default `10`)
/// - `DATABASE_RUN_MIGRATIONS` (default `true`)
/// - `JWT_SECRET` (required, at least 32 characters)
/// - `JWT_EXPIRES_IN_DAYS` (default `14`)
/// - `PASSWORD_MEMORY_KIB`, `PASSWORD_ITERATIONS`, `PASSWORD_PARALLELISM`
/// - `MAIL_FROM`, `PLATFORM_URL`
/// - `STORAGE_ENDPOINT` (export disabled when unset), `STORAGE_BUCKET`,
///   `STORAGE_ACCESS_TOKEN`
/// - `LOG_FORMAT`: `text` or `json`
///
/// # Example
///
/// ```no_run
/// use projectdesk_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use anyhow::Context;
use projectdesk_shared::auth::password::PasswordCost;
use serde::Serialize;

const MIN_SECRET_LEN: usize = 32;

#[derive(Debug, Clone, Serialize)]
pub struct Config {
    pub api: ApiConfig,
    pub database: DatabaseConfig,
    pub jwt: JwtConfig,
    pub password: PasswordConfig,
    pub mail: MailConfig,
    pub storage: StorageConfig,
    pub log_format: LogFormat,
}

#[derive(Debug, Clone, Serialize)]
pub struct ApiConfig {
    pub host: String,
    pub port: u16,
    pub cors_origins: Vec<String>,
    /// Production deployments sit behind HTTPS and get HSTS.
    pub production: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct DatabaseConfig {
    #[serde(skip_serializing)]
    pub url: String,
    pub max_connections: u32,
    pub run_migrations: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct JwtConfig {
    /// HS256 signing key. Generate with `openssl rand -hex 32`.
    #[serde(skip_serializing)]
    pub secret: String,
    pub expires_in_days: i64,
}

#[derive(Debug, Clone, Copy, Serialize)]
pub struct PasswordConfig {
    pub memory_kib: u32,
    pub iterations: u32,
    pub parallelism: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct MailConfig {
    pub from: String,
    /// Link sent in sign-in mails.
    pub platform_url: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct StorageConfig {
    pub endpoint: Option<String>,
    pub bucket: String,
    #[serde(skip_serializing)]
    pub access_token: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Text,
    Json,
}

impl Config {
    /// Loads `.env`, then the process environment.
    pub fn from_env() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();
        Self::load(config::Environment::default().try_parsing(true))
    }

    /// Builds the configuration from one source of flat, lower-cased keys
    /// (`api_port`, `jwt_secret`, ...) over the defaults.
    pub fn load<S>(source: S) -> anyhow::Result<Self>
    where
        S: config::Source + Send + Sync + 'static,
    {
        let defaults = PasswordCost::default();
        let settings = config::Config::builder()
            .set_default("api_host", "0.0.0.0")?
            .set_default("api_port", 8080)?
            .set_default("api_cors_origins", "*")?
            .set_default("api_production", false)?
            .set_default("database_max_connections", 10)?
            .set_default("database_run_migrations", true)?
            .set_default("jwt_expires_in_days", projectdesk_shared::auth::jwt::DEFAULT_EXPIRY_DAYS)?
            .set_default("password_memory_kib", defaults.memory_kib)?
            .set_default("password_iterations", defaults.iterations)?
            .set_default("password_parallelism", defaults.parallelism)?
            .set_default("mail_from", "noreply@localhost")?
            .set_default("platform_url", "http://localhost:3000")?
            .set_default("storage_bucket", "exports")?
            .set_default("log_format", "text")?
            .add_source(source)
            .build()?;

        let secret = settings
            .get_string("jwt_secret")
            .context("JWT_SECRET environment variable is required")?;
        if secret.len() < MIN_SECRET_LEN {
            anyhow::bail!("JWT_SECRET must be at least {} characters long", MIN_SECRET_LEN);
        }

        let log_format = match settings.get_string("log_format")?.to_ascii_lowercase().as_str() {
            "json" => LogFormat::Json,
            _ => LogFormat::Text,
        };

        Ok(Self {
            api: ApiConfig {
                host: settings.get_string("api_host")?,
                port: settings.get("api_port")?,
                cors_origins: split_origins(&settings.get_string("api_cors_origins")?),
                production: settings.get_bool("api_production")?,
            },
            database: DatabaseConfig {
                url: settings
                    .get_string("database_url")
                    .context("DATABASE_URL environment variable is required")?,
                max_connections: settings.get("database_max_connections")?,
                run_migrations: settings.get_bool("database_run_migrations")?,
            },
            jwt: JwtConfig {
                secret,
                expires_in_days: settings.get("jwt_expires_in_days")?,
            },
            password: PasswordConfig {
                memory_kib: settings.get("password_memory_kib")?,
                iterations: settings.get("password_iterations")?,
                parallelism: settings.get("password_parallelism")?,
            },
            mail: MailConfig {
                from: settings.get_string("mail_from")?,
                platform_url: settings.get_string("platform_url")?,
            },
            storage: StorageConfig {
                endpoint: non_empty(settings.get_string("storage_endpoint").ok()),
                bucket: settings.get_string("storage_bucket")?,
                access_token: non_empty(settings.get_string("storage_access_token").ok()),
            },
            log_format,
        })
    }

    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    pub fn password_cost(&self) -> PasswordCost {
        PasswordCost {
            memory_kib: self.password.memory_kib,
            iterations: self.password.iterations,
            parallelism: self.password.parallelism,
        }
    }

    pub fn token_lifetime(&self) -> chrono::Duration {
        chrono::Duration::days(self.jwt.expires_in_days)
    }

    pub fn allows_any_origin(&self) -> bool {
        self.api.cors_origins.iter().any(|origin| origin == "*")
    }
}

fn split_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(String::from)
        .collect()
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}
