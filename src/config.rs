use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    ValidationError(String),
}

#[derive(Debug, Clone)]
pub struct Config {
    pub server: ServerConfig,
    pub ingest: IngestConfig,
    /// Number of torrents returned per page by the search API
    pub page_size: usize,
}

#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub bind_address: String,
    pub data_dir: String,
}

#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// CSV dump used to seed an empty catalog
    pub csv_path: String,
    /// Rows committed per write transaction
    pub chunk_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: "0.0.0.0:3000".to_string(),
            data_dir: "./data".to_string(),
        }
    }
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            csv_path: "tntvillage-release-dump/tntvillage-release-dump.csv".to_string(),
            chunk_size: 1000,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            server: ServerConfig::default(),
            ingest: IngestConfig::default(),
            page_size: 50,
        }
    }
}

impl Config {
    /// Load configuration from environment variables.
    pub fn load() -> Result<Self, ConfigError> {
        let defaults = Config::default();

        let bind_address =
            std::env::var("BIND_ADDRESS").unwrap_or(defaults.server.bind_address);

        let data_dir = std::env::var("DATA_DIR").unwrap_or(defaults.server.data_dir);

        let csv_path = std::env::var("CSV_PATH").unwrap_or(defaults.ingest.csv_path);

        let chunk_size = std::env::var("INGEST_CHUNK_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.ingest.chunk_size);

        let page_size = std::env::var("PAGE_SIZE")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.page_size);

        let config = Config {
            server: ServerConfig {
                bind_address,
                data_dir,
            },
            ingest: IngestConfig {
                csv_path,
                chunk_size,
            },
            page_size,
        };

        config.validate()?;
        Ok(config)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.server.data_dir.trim().is_empty() {
            return Err(ConfigError::ValidationError(
                "DATA_DIR cannot be empty".to_string(),
            ));
        }

        if self.ingest.chunk_size == 0 {
            return Err(ConfigError::ValidationError(
                "INGEST_CHUNK_SIZE must be greater than 0".to_string(),
            ));
        }

        if self.page_size == 0 {
            return Err(ConfigError::ValidationError(
                "PAGE_SIZE must be greater than 0".to_string(),
            ));
        }

        if self.ingest.chunk_size > 100_000 {
            tracing::warn!(
                "INGEST_CHUNK_SIZE {} is very large. Each chunk is held in memory and \
                 committed in a single transaction.",
                self.ingest.chunk_size
            );
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.page_size, 50);
        assert_eq!(config.ingest.chunk_size, 1000);
    }

    #[test]
    fn test_zero_chunk_size_rejected() {
        let mut config = Config::default();
        config.ingest.chunk_size = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::ValidationError(_))
        ));
    }

    #[test]
    fn test_zero_page_size_rejected() {
        let mut config = Config::default();
        config.page_size = 0;
        assert!(config.validate().is_err());
    }
}
