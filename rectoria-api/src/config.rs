/// Configuration management for the API server
///
/// Loaded once at startup from environment variables (a `.env` file is
/// honored) and passed to the router as immutable state.
///
/// # Environment Variables
///
/// - `JWT_LLAVE_SECRETA`: Secret key for JWT verification (required)
/// - `PUERTO_APP`: Port to bind to (default: 3001)
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `ENTORNO_NODE`: `desarrollo` (default) or `pruebas`
/// - `DATABASE_URL`: PostgreSQL connection string; when absent it is composed
///   from `USUARIO`, `CONTRASENA`, `HOST`, `PUERTO_DB` (default: 5432) and
///   `BASE_DE_DATOS` (or `BASE_DE_DATOS_PRUEBAS` under `pruebas`)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `CORS_ORIGINS`: Comma-separated allowed origins (default: `*`)
/// - `LOG_FORMAT`: `pretty` (default) or `json`
///
/// Without any database settings the server runs on the in-memory store.
///
/// # Example
///
/// ```
/// use std::collections::HashMap;
/// use rectoria_api::config::Config;
///
/// let env = HashMap::from([("JWT_LLAVE_SECRETA", "clave-secreta-de-al-menos-32-bytes")]);
/// let config = Config::from_lookup(|key| env.get(key).map(|v| v.to_string())).unwrap();
/// assert_eq!(config.bind_address(), "0.0.0.0:3001");
/// assert!(config.database.is_none());
/// ```

use std::env;
use std::fmt;
use std::str::FromStr;

use anyhow::Context;

/// Minimum secret length considered safe for HS256
pub const MIN_SECRET_LEN: usize = 32;

/// Complete application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration; `None` selects the in-memory store
    pub database: Option<DatabaseConfig>,

    /// JWT configuration
    pub jwt: JwtConfig,

    pub environment: Environment,

    pub log_format: LogFormat,
}

/// API server configuration
#[derive(Debug, Clone)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins (`*` allows any)
    pub cors_origins: Vec<String>,
}

/// Database configuration
#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

/// JWT configuration
#[derive(Clone)]
pub struct JwtConfig {
    /// Shared secret for HS256 verification
    pub secret: String,
}

impl fmt::Debug for JwtConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("JwtConfig").field("secret", &"<redacted>").finish()
    }
}

/// Deployment environment, selects the database name
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Environment {
    #[default]
    Desarrollo,
    Pruebas,
}

impl Environment {
    fn database_name_var(&self) -> &'static str {
        match self {
            Environment::Desarrollo => "BASE_DE_DATOS",
            Environment::Pruebas => "BASE_DE_DATOS_PRUEBAS",
        }
    }
}

impl FromStr for Environment {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "desarrollo" => Ok(Environment::Desarrollo),
            "pruebas" => Ok(Environment::Pruebas),
            other => anyhow::bail!("ENTORNO_NODE must be 'desarrollo' or 'pruebas', got '{other}'"),
        }
    }
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

impl FromStr for LogFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pretty" => Ok(LogFormat::Pretty),
            "json" => Ok(LogFormat::Json),
            other => anyhow::bail!("LOG_FORMAT must be 'pretty' or 'json', got '{other}'"),
        }
    }
}

impl Config {
    /// Loads configuration from the process environment
    ///
    /// # Errors
    ///
    /// Returns an error if `JWT_LLAVE_SECRETA` is missing or a variable has
    /// an invalid value.
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Loads configuration through `lookup`; empty values count as unset
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> anyhow::Result<Self> {
        let var = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let environment = var("ENTORNO_NODE")
            .map(|value| value.parse::<Environment>())
            .transpose()?
            .unwrap_or_default();

        let host = var("API_HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = var("PUERTO_APP")
            .map(|value| value.parse::<u16>())
            .transpose()
            .context("PUERTO_APP must be a valid port")?
            .unwrap_or(3001);

        let cors_origins = var("CORS_ORIGINS")
            .unwrap_or_else(|| "*".to_string())
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let secret = var("JWT_LLAVE_SECRETA")
            .ok_or_else(|| anyhow::anyhow!("JWT_LLAVE_SECRETA environment variable is required"))?;

        let max_connections = var("DATABASE_MAX_CONNECTIONS")
            .map(|value| value.parse::<u32>())
            .transpose()
            .context("DATABASE_MAX_CONNECTIONS must be a positive integer")?
            .unwrap_or(10);

        let database = database_url(&var, environment)?.map(|url| DatabaseConfig {
            url,
            max_connections,
        });

        let log_format = var("LOG_FORMAT")
            .map(|value| value.parse::<LogFormat>())
            .transpose()?
            .unwrap_or_default();

        Ok(Self {
            api: ApiConfig {
                host,
                port,
                cors_origins,
            },
            database,
            jwt: JwtConfig { secret },
            environment,
            log_format,
        })
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }

    /// Whether the secret is shorter than [`MIN_SECRET_LEN`]
    pub fn has_weak_secret(&self) -> bool {
        self.jwt.secret.len() < MIN_SECRET_LEN
    }
}

/// `DATABASE_URL`, or a URL composed from the individual settings
fn database_url(
    var: &impl Fn(&str) -> Option<String>,
    environment: Environment,
) -> anyhow::Result<Option<String>> {
    if let Some(url) = var("DATABASE_URL") {
        return Ok(Some(url));
    }

    let (Some(user), Some(host), Some(name)) = (
        var("USUARIO"),
        var("HOST"),
        var(environment.database_name_var()),
    ) else {
        return Ok(None);
    };

    let port = var("PUERTO_DB")
        .map(|value| value.parse::<u16>())
        .transpose()
        .context("PUERTO_DB must be a valid port")?
        .unwrap_or(5432);

    let credentials = match var("CONTRASENA") {
        Some(password) => format!("{user}:{password}"),
        None => user,
    };

    Ok(Some(format!("postgresql://{credentials}@{host}:{port}/{name}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    const SECRET: &str = "test-secret-key-at-least-32-bytes-long";

    fn load(vars: &[(&str, &str)]) -> anyhow::Result<Config> {
        let env: HashMap<String, String> = vars
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();
        Config::from_lookup(|key| env.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&[("JWT_LLAVE_SECRETA", SECRET)]).unwrap();

        assert_eq!(config.api.host, "0.0.0.0");
        assert_eq!(config.api.port, 3001);
        assert_eq!(config.api.cors_origins, vec!["*"]);
        assert_eq!(config.environment, Environment::Desarrollo);
        assert_eq!(config.log_format, LogFormat::Pretty);
        assert!(config.database.is_none());
        assert!(!config.has_weak_secret());
    }

    #[test]
    fn test_secret_is_required() {
        let err = load(&[]).unwrap_err();
        assert!(err.to_string().contains("JWT_LLAVE_SECRETA"));

        assert!(load(&[("JWT_LLAVE_SECRETA", "  ")]).is_err());
    }

    #[test]
    fn test_weak_secret_is_flagged() {
        let config = load(&[("JWT_LLAVE_SECRETA", "corta")]).unwrap();
        assert!(config.has_weak_secret());
    }

    #[test]
    fn test_database_url_takes_precedence() {
        let config = load(&[
            ("JWT_LLAVE_SECRETA", SECRET),
            ("DATABASE_URL", "postgresql://localhost/rectoria"),
            ("USUARIO", "ignored"),
            ("HOST", "ignored"),
            ("BASE_DE_DATOS", "ignored"),
            ("DATABASE_MAX_CONNECTIONS", "4"),
        ])
        .unwrap();

        let database = config.database.unwrap();
        assert_eq!(database.url, "postgresql://localhost/rectoria");
        assert_eq!(database.max_connections, 4);
    }

    #[test]
    fn test_database_url_is_composed_per_environment() {
        let vars = [
            ("JWT_LLAVE_SECRETA", SECRET),
            ("USUARIO", "rectoria"),
            ("CONTRASENA", "secreto"),
            ("HOST", "db"),
            ("BASE_DE_DATOS", "rectoria"),
            ("BASE_DE_DATOS_PRUEBAS", "rectoria_pruebas"),
        ];

        let config = load(&vars).unwrap();
        assert_eq!(
            config.database.unwrap().url,
            "postgresql://rectoria:secreto@db:5432/rectoria"
        );

        let mut testing = vars.to_vec();
        testing.push(("ENTORNO_NODE", "pruebas"));
        testing.push(("PUERTO_DB", "5433"));
        let config = load(&testing).unwrap();
        assert_eq!(config.environment, Environment::Pruebas);
        assert_eq!(
            config.database.unwrap().url,
            "postgresql://rectoria:secreto@db:5433/rectoria_pruebas"
        );
    }

    #[test]
    fn test_incomplete_database_settings_fall_back_to_memory() {
        let config = load(&[("JWT_LLAVE_SECRETA", SECRET), ("USUARIO", "rectoria")]).unwrap();
        assert!(config.database.is_none());
    }

    #[test]
    fn test_invalid_values() {
        assert!(load(&[("JWT_LLAVE_SECRETA", SECRET), ("PUERTO_APP", "http")]).is_err());
        assert!(load(&[("JWT_LLAVE_SECRETA", SECRET), ("ENTORNO_NODE", "produccion")]).is_err());
        assert!(load(&[("JWT_LLAVE_SECRETA", SECRET), ("LOG_FORMAT", "xml")]).is_err());
    }

    #[test]
    fn test_cors_origins_and_bind_address() {
        let config = load(&[
            ("JWT_LLAVE_SECRETA", SECRET),
            ("API_HOST", "127.0.0.1"),
            ("PUERTO_APP", "8080"),
            ("CORS_ORIGINS", "http://localhost:3000, https://rectoria.example"),
            ("LOG_FORMAT", "JSON"),
        ])
        .unwrap();

        assert_eq!(config.bind_address(), "127.0.0.1:8080");
        assert_eq!(
            config.api.cors_origins,
            vec!["http://localhost:3000", "https://rectoria.example"]
        );
        assert_eq!(config.log_format, LogFormat::Json);
    }
}
