use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{Context, Result, bail};

/// Object store implementation the proxy reads from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreBackend {
    /// In-memory store, contents are per-process. Zero-setup local development.
    Memory,
    /// Local filesystem rooted at `OBJECT_STORE_DATA_DIR`.
    File,
    /// Amazon S3 (credentials, region and endpoint come from the standard AWS
    /// environment variables).
    S3,
}

impl StoreBackend {
    pub fn as_str(self) -> &'static str {
        match self {
            StoreBackend::Memory => "memory",
            StoreBackend::File => "file",
            StoreBackend::S3 => "s3",
        }
    }
}

impl FromStr for StoreBackend {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "memory" => Ok(StoreBackend::Memory),
            "file" => Ok(StoreBackend::File),
            "s3" => Ok(StoreBackend::S3),
            other => bail!("unknown object store backend '{}'", other),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub store_backend: StoreBackend,
    pub store_data_dir: Option<PathBuf>,
    pub store_bucket: Option<String>,
    pub service_port: u16,
    pub service_host: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let store_backend = env::var("OBJECT_STORE_BACKEND")
            .unwrap_or_else(|_| "memory".to_string())
            .parse::<StoreBackend>()
            .context("OBJECT_STORE_BACKEND must be one of: memory, file, s3")?;

        let store_data_dir = match store_backend {
            StoreBackend::File => {
                let dir = env::var("OBJECT_STORE_DATA_DIR").context(
                    "OBJECT_STORE_DATA_DIR environment variable is required when OBJECT_STORE_BACKEND=file",
                )?;
                Some(PathBuf::from(dir))
            }
            _ => env::var("OBJECT_STORE_DATA_DIR").ok().map(PathBuf::from),
        };

        let store_bucket = match store_backend {
            StoreBackend::S3 => Some(env::var("OBJECT_STORE_BUCKET").context(
                "OBJECT_STORE_BUCKET environment variable is required when OBJECT_STORE_BACKEND=s3",
            )?),
            _ => env::var("OBJECT_STORE_BUCKET").ok(),
        };

        let service_port = env::var("SERVICE_PORT")
            .unwrap_or_else(|_| "3000".to_string())
            .parse::<u16>()
            .context("SERVICE_PORT must be a valid port number (0-65535)")?;

        let service_host = env::var("SERVICE_HOST")
            .unwrap_or_else(|_| "0.0.0.0".to_string());

        Ok(Config {
            store_backend,
            store_data_dir,
            store_bucket,
            service_port,
            service_host,
        })
    }

    pub fn log_startup(&self) {
        tracing::info!("Configuration loaded:");
        tracing::info!("  Object store backend: {}", self.store_backend.as_str());
        match self.store_backend {
            StoreBackend::Memory => {
                tracing::info!("  Object store contents are per-process (memory backend)");
            }
            StoreBackend::File => {
                if let Some(dir) = &self.store_data_dir {
                    tracing::info!("  Object store data dir: {}", dir.display());
                }
            }
            StoreBackend::S3 => {
                if let Some(bucket) = &self.store_bucket {
                    tracing::info!("  Object store bucket: {}", bucket);
                }
            }
        }
        tracing::info!("  Service listening on: {}:{}", self.service_host, self.service_port);
    }
}
