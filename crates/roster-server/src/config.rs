//! Configuration management

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::ingest::PipelineConfig;

// ============================================================================
// Server Configuration Constants
// ============================================================================

/// Default server host binding.
pub const DEFAULT_SERVER_HOST: &str = "127.0.0.1";

/// Default server port.
pub const DEFAULT_SERVER_PORT: u16 = 8000;

/// Default database URL for local development.
pub const DEFAULT_DATABASE_URL: &str = "postgresql://localhost/roster";

/// Default maximum database connections in the pool.
pub const DEFAULT_DATABASE_MAX_CONNECTIONS: u32 = 10;

/// Default minimum database connections in the pool.
pub const DEFAULT_DATABASE_MIN_CONNECTIONS: u32 = 2;

/// Default database connection timeout in seconds.
pub const DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS: u64 = 10;

/// Default database idle timeout in seconds (10 minutes).
pub const DEFAULT_DATABASE_IDLE_TIMEOUT_SECS: u64 = 600;

/// Default CORS allowed origin for local development.
pub const DEFAULT_CORS_ALLOWED_ORIGIN: &str = "http://localhost:3000";

/// Default directory uploaded import files are spooled to.
pub const DEFAULT_UPLOAD_DIR: &str = "./uploads";

/// Default first-batch size for imports.
pub const DEFAULT_IMPORT_INITIAL_BATCH_SIZE: usize = 10;

/// Default ceiling for the doubling import batch threshold.
pub const DEFAULT_IMPORT_MAX_BATCH_SIZE: usize = 300;

/// Default soft cap on import batches in flight.
pub const DEFAULT_IMPORT_MAX_IN_FLIGHT: usize = 6;

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub server: ServerConfig,
    pub database: DatabaseConfig,
    pub cors: CorsConfig,
    pub import: ImportConfig,
}

/// Server-specific configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

/// Database configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
    pub min_connections: u32,
    pub connect_timeout_secs: u64,
    pub idle_timeout_secs: u64,
}

/// CORS configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CorsConfig {
    pub allowed_origins: Vec<String>,
}

/// Import pipeline configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Directory uploaded files are spooled to before streaming.
    pub upload_dir: PathBuf,
    pub initial_batch_size: usize,
    pub max_batch_size: usize,
    pub max_in_flight: usize,
}

impl ImportConfig {
    /// Pipeline tuning knobs for one run.
    pub fn pipeline_config(&self) -> PipelineConfig {
        PipelineConfig {
            initial_batch_size: self.initial_batch_size,
            max_batch_size: self.max_batch_size,
            max_in_flight: self.max_in_flight,
        }
    }
}

impl Config {
    /// Load configuration from environment and defaults
    pub fn load() -> anyhow::Result<Self> {
        dotenvy::dotenv().ok();

        let config = Config {
            server: ServerConfig {
                host: std::env::var("ROSTER_HOST")
                    .unwrap_or_else(|_| DEFAULT_SERVER_HOST.to_string()),
                port: std::env::var("ROSTER_PORT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_SERVER_PORT),
            },
            database: DatabaseConfig {
                url: std::env::var("DATABASE_URL")
                    .unwrap_or_else(|_| DEFAULT_DATABASE_URL.to_string()),
                max_connections: std::env::var("DB_MAX_CONNECTIONS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_DATABASE_MAX_CONNECTIONS),
                min_connections: std::env::var("DB_MIN_CONNECTIONS")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_DATABASE_MIN_CONNECTIONS),
                connect_timeout_secs: std::env::var("DB_CONNECT_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_DATABASE_CONNECT_TIMEOUT_SECS),
                idle_timeout_secs: std::env::var("DB_IDLE_TIMEOUT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_DATABASE_IDLE_TIMEOUT_SECS),
            },
            cors: CorsConfig {
                allowed_origins: std::env::var("CORS_ALLOWED_ORIGINS")
                    .map(|s| s.split(',').map(|o| o.trim().to_string()).collect())
                    .unwrap_or_else(|_| vec![DEFAULT_CORS_ALLOWED_ORIGIN.to_string()]),
            },
            import: ImportConfig {
                upload_dir: std::env::var("IMPORT_UPLOAD_DIR")
                    .map(PathBuf::from)
                    .unwrap_or_else(|_| PathBuf::from(DEFAULT_UPLOAD_DIR)),
                initial_batch_size: std::env::var("IMPORT_INITIAL_BATCH_SIZE")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_IMPORT_INITIAL_BATCH_SIZE),
                max_batch_size: std::env::var("IMPORT_MAX_BATCH_SIZE")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_IMPORT_MAX_BATCH_SIZE),
                max_in_flight: std::env::var("IMPORT_MAX_IN_FLIGHT")
                    .ok()
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(DEFAULT_IMPORT_MAX_IN_FLIGHT),
            },
        };

        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_import_defaults_match_pipeline_policy() {
        let import = ImportConfig {
            upload_dir: PathBuf::from(DEFAULT_UPLOAD_DIR),
            initial_batch_size: DEFAULT_IMPORT_INITIAL_BATCH_SIZE,
            max_batch_size: DEFAULT_IMPORT_MAX_BATCH_SIZE,
            max_in_flight: DEFAULT_IMPORT_MAX_IN_FLIGHT,
        };

        let pipeline = import.pipeline_config();
        assert_eq!(pipeline.initial_batch_size, 10);
        assert_eq!(pipeline.max_batch_size, 300);
        assert_eq!(pipeline.max_in_flight, 6);
    }
}
