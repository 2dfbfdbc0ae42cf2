//! User service configuration.

use std::env;

use common::{DatabaseConfig, RepositoryConfig};

/// User service configuration.
#[derive(Debug, Clone, Default)]
pub struct UserServiceConfig {
    pub database: DatabaseConfig,
    pub repository: RepositoryConfig,
}

impl UserServiceConfig {
    /// Load configuration from environment variables.
    ///
    /// `USER_SERVICE_DATABASE_URL` takes precedence over `DATABASE_URL`.
    pub fn from_env() -> Self {
        let mut database = DatabaseConfig::from_env();
        if let Ok(url) = env::var("USER_SERVICE_DATABASE_URL") {
            database.url = url;
        }

        Self {
            database,
            repository: RepositoryConfig::from_env(),
        }
    }
}
