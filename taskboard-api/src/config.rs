/// Configuration management for the API server
///
/// Settings are layered with the `config` crate: built-in defaults, then
/// plain environment variables, then `TASKBOARD_`-prefixed variables (which
/// win). A `.env` file is loaded first when present.
///
/// # Environment Variables
///
/// - `DATABASE_URL`: PostgreSQL connection string (unset = in-memory board)
/// - `DATABASE_MAX_CONNECTIONS`: Pool size (default: 10)
/// - `API_HOST`: Host to bind to (default: 0.0.0.0)
/// - `API_PORT`: Port to bind to (default: 8080)
/// - `CORS_ORIGINS`: Comma-separated origins, `*` for any (default: *)
/// - `PRODUCTION`: Enables HSTS (default: false)
/// - `SEED_DEMO_DATA`: Fill an empty board with demo users and tasks (default: false)
/// - `RUST_LOG`: Log filter (default: taskboard_api=debug,taskboard_shared=debug,tower_http=debug)
/// - `LOG_FORMAT`: `json` for JSON log lines
///
/// # Example
///
/// ```no_run
/// use taskboard_api::config::Config;
///
/// # fn example() -> anyhow::Result<()> {
/// let config = Config::from_env()?;
/// println!("Server will listen on {}", config.bind_address());
/// # Ok(())
/// # }
/// ```

use serde::{Deserialize, Serialize};

/// Complete application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// API server configuration
    pub api: ApiConfig,

    /// Database configuration; None runs the board in memory
    pub database: Option<DatabaseConfig>,

    /// Seed demo data into an empty board at startup
    pub seed_demo_data: bool,
}

/// API server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiConfig {
    /// Host to bind to
    pub host: String,

    /// Port to bind to
    pub port: u16,

    /// Allowed CORS origins (`*` = permissive)
    pub cors_origins: Vec<String>,

    /// Production mode (enables HSTS)
    pub production: bool,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// PostgreSQL connection URL
    pub url: String,

    /// Maximum number of connections in pool
    pub max_connections: u32,
}

impl Config {
    /// Loads configuration from `.env` and the environment
    ///
    /// # Errors
    ///
    /// Returns an error if a variable has an invalid value (e.g. a
    /// non-numeric `API_PORT`).
    pub fn from_env() -> anyhow::Result<Self> {
        // Load .env file if present (for development)
        dotenvy::dotenv().ok();

        let settings = Self::defaults()?
            .add_source(config::Environment::default().try_parsing(true))
            .add_source(config::Environment::with_prefix("TASKBOARD").try_parsing(true))
            .build()?;

        Self::from_settings(&settings)
    }

    fn defaults() -> anyhow::Result<config::ConfigBuilder<config::builder::DefaultState>> {
        Ok(config::Config::builder()
            .set_default("api_host", "0.0.0.0")?
            .set_default("api_port", 8080)?
            .set_default("cors_origins", "*")?
            .set_default("production", false)?
            .set_default("seed_demo_data", false)?
            .set_default("database_max_connections", 10)?)
    }

    /// Builds the typed config from flat settings keys
    pub fn from_settings(settings: &config::Config) -> anyhow::Result<Self> {
        let port = settings.get_int("api_port")?;
        let port = u16::try_from(port)
            .map_err(|_| anyhow::anyhow!("API_PORT must be between 0 and 65535, got {}", port))?;

        let cors_origins = settings
            .get_string("cors_origins")?
            .split(',')
            .map(|origin| origin.trim().to_string())
            .filter(|origin| !origin.is_empty())
            .collect();

        let database = match settings.get_string("database_url") {
            Ok(url) if !url.trim().is_empty() => Some(DatabaseConfig {
                url,
                max_connections: u32::try_from(settings.get_int("database_max_connections")?)?,
            }),
            _ => None,
        };

        Ok(Self {
            api: ApiConfig {
                host: settings.get_string("api_host")?,
                port,
                cors_origins,
                production: settings.get_bool("production")?,
            },
            database,
            seed_demo_data: settings.get_bool("seed_demo_data")?,
        })
    }

    /// In-memory config for tests: ephemeral port, permissive CORS
    pub fn for_tests() -> Self {
        Self {
            api: ApiConfig {
                host: "127.0.0.1".to_string(),
                port: 0,
                cors_origins: vec!["*".to_string()],
                production: false,
            },
            database: None,
            seed_demo_data: false,
        }
    }

    /// Returns the server bind address
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.api.host, self.api.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_database() {
        let settings = Config::defaults().unwrap().build().unwrap();
        let config = Config::from_settings(&settings).unwrap();

        assert_eq!(config.bind_address(), "0.0.0.0:8080");
        assert_eq!(config.api.cors_origins, vec!["*"]);
        assert!(!config.api.production);
        assert!(config.database.is_none());
        assert!(!config.seed_demo_data);
    }

    #[test]
    fn test_overrides() {
        let settings = Config::defaults()
            .unwrap()
            .set_override("api_port", 3000)
            .unwrap()
            .set_override("database_url", "postgresql://localhost/taskboard")
            .unwrap()
            .set_override("cors_origins", "https://a.example, https://b.example")
            .unwrap()
            .set_override("production", true)
            .unwrap()
            .build()
            .unwrap();
        let config = Config::from_settings(&settings).unwrap();

        assert_eq!(config.api.port, 3000);
        assert_eq!(
            config.api.cors_origins,
            vec!["https://a.example", "https://b.example"]
        );
        assert!(config.api.production);

        let database = config.database.unwrap();
        assert_eq!(database.url, "postgresql://localhost/taskboard");
        assert_eq!(database.max_connections, 10);
    }

    #[test]
    fn test_invalid_port_rejected() {
        let settings = Config::defaults()
            .unwrap()
            .set_override("api_port", 70000)
            .unwrap()
            .build()
            .unwrap();
        assert!(Config::from_settings(&settings).is_err());
    }
}
