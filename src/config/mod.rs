use once_cell::sync::Lazy;
use std::env;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required configuration: {0}")]
    Missing(&'static str),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Staging,
    Production,
}

impl Environment {
    fn from_env() -> Self {
        match env::var("APP_ENV").as_deref() {
            Ok("production") | Ok("prod") => Environment::Production,
            Ok("staging") | Ok("stage") => Environment::Staging,
            _ => Environment::Development,
        }
    }

    pub fn is_production(self) -> bool {
        matches!(self, Environment::Production)
    }
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Environment::Development => "development",
            Environment::Staging => "staging",
            Environment::Production => "production",
        };
        f.write_str(name)
    }
}

// Process-wide environment flag, read once. Error responses consult it to
// decide whether internal detail may be included in the body.
static ENVIRONMENT: Lazy<Environment> = Lazy::new(Environment::from_env);

pub fn environment() -> Environment {
    *ENVIRONMENT
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub environment: Environment,
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub security: SecurityConfig,
    pub api: ApiConfig,
    pub upload: UploadConfig,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub port: u16,
}

#[derive(Debug, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub acquire_timeout_secs: u64,
}

#[derive(Debug, Clone)]
pub struct SecurityConfig {
    pub jwt_secret: String,
    pub token_expiry_days: i64,
    pub bcrypt_cost: u32,
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub default_page_size: i64,
    pub max_page_size: Option<i64>,
}

#[derive(Debug, Clone)]
pub struct UploadConfig {
    pub dir: String,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        let environment = environment();

        let database_url =
            env::var("DATABASE_URL").map_err(|_| ConfigError::Missing("DATABASE_URL"))?;

        // A missing signing secret is fatal misconfiguration: tokens could
        // neither be issued nor verified.
        let jwt_secret = env::var("JWT_SECRET").map_err(|_| ConfigError::Missing("JWT_SECRET"))?;
        if jwt_secret.trim().is_empty() {
            return Err(ConfigError::Missing("JWT_SECRET"));
        }

        Ok(Self::defaults_for(environment, database_url, jwt_secret).with_env_overrides())
    }

    fn defaults_for(environment: Environment, database_url: String, jwt_secret: String) -> Self {
        let database = match environment {
            Environment::Production => DatabaseConfig {
                url: database_url,
                max_connections: 20,
                acquire_timeout_secs: 5,
            },
            _ => DatabaseConfig {
                url: database_url,
                max_connections: 5,
                acquire_timeout_secs: 10,
            },
        };

        Self {
            environment,
            server: ServerConfig { port: 5000 },
            database,
            security: SecurityConfig {
                jwt_secret,
                token_expiry_days: 7,
                bcrypt_cost: bcrypt::DEFAULT_COST,
            },
            api: ApiConfig {
                default_page_size: 12,
                max_page_size: Some(100),
            },
            upload: UploadConfig {
                dir: "uploads".to_string(),
            },
        }
    }

    fn with_env_overrides(mut self) -> Self {
        if let Ok(v) = env::var("PORT") {
            self.server.port = v.parse().unwrap_or(self.server.port);
        }

        if let Ok(v) = env::var("DATABASE_MAX_CONNECTIONS") {
            self.database.max_connections = v.parse().unwrap_or(self.database.max_connections);
        }
        if let Ok(v) = env::var("DATABASE_ACQUIRE_TIMEOUT_SECS") {
            self.database.acquire_timeout_secs =
                v.parse().unwrap_or(self.database.acquire_timeout_secs);
        }

        if let Ok(v) = env::var("SECURITY_TOKEN_EXPIRY_DAYS") {
            self.security.token_expiry_days = v.parse().unwrap_or(self.security.token_expiry_days);
        }
        if let Ok(v) = env::var("SECURITY_BCRYPT_COST") {
            self.security.bcrypt_cost = v.parse().unwrap_or(self.security.bcrypt_cost);
        }

        if let Ok(v) = env::var("API_MAX_PAGE_SIZE") {
            self.api.max_page_size = v.parse().ok();
        }

        if let Ok(v) = env::var("UPLOAD_DIR") {
            self.upload.dir = v;
        }

        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn development_defaults() {
        let config = AppConfig::defaults_for(
            Environment::Development,
            "postgres://localhost/herbarium".into(),
            "secret".into(),
        );
        assert_eq!(config.server.port, 5000);
        assert_eq!(config.api.default_page_size, 12);
        assert_eq!(config.api.max_page_size, Some(100));
        assert_eq!(config.security.token_expiry_days, 7);
    }

    #[test]
    fn production_tightens_pool() {
        let config = AppConfig::defaults_for(
            Environment::Production,
            "postgres://localhost/herbarium".into(),
            "secret".into(),
        );
        assert_eq!(config.database.max_connections, 20);
        assert_eq!(config.database.acquire_timeout_secs, 5);
    }
}
