use std::env;
use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;
use std::str::FromStr;

use dotenvy::dotenv;
use validator::Validate;

/// Where incoming bytes live before the persister writes them out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadStrategy {
    /// Stream multipart parts to a spool file as they arrive.
    Disk,
    /// Buffer parts in memory, flush to disk on persistence.
    Memory,
}

#[derive(Debug, Clone, Validate)]
pub struct Config {
    pub host: IpAddr,
    pub port: u16,
    pub upload_dir: PathBuf,
    pub upload_strategy: UploadStrategy,
    #[validate(range(min = 1, max = 104857600))] // Max 100MB
    pub max_file_size: u64,
    pub allowed_mime_types: Vec<String>,
    pub allowed_origins: Vec<String>,
    pub max_files_single: usize,
    pub max_files_bulk: usize,
    pub bulk_batch_size: usize,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, anyhow::Error> {
        // Load environment variables from `.env` file (if it exists)
        dotenv().ok();

        let allowed_mime_types = env::var("ALLOWED_MIME_TYPES")
            .unwrap_or_else(|_| {
                "image/jpeg,image/jpg,image/png,image/svg+xml,image/webp,application/pdf"
                    .to_string()
            })
            .split(',')
            .map(|s| s.trim().to_lowercase())
            .collect();

        let allowed_origins = env::var("ALLOWED_ORIGINS")
            .unwrap_or_else(|_| "*".to_string())
            .split(',')
            .map(|s| s.trim().to_string())
            .collect();

        let upload_strategy = match env::var("UPLOAD_STRATEGY")
            .unwrap_or_else(|_| "disk".to_string())
            .to_lowercase()
            .as_str()
        {
            "memory" => UploadStrategy::Memory,
            _ => UploadStrategy::Disk,
        };

        let config = Config {
            host: env_parse("HOST", IpAddr::V4(Ipv4Addr::UNSPECIFIED)),
            port: env_parse("PORT", 8000),
            upload_dir: PathBuf::from(
                env::var("UPLOAD_DIR").unwrap_or_else(|_| "uploads".to_string()),
            ),
            upload_strategy,
            max_file_size: env_parse("MAX_FILE_SIZE", 5 * 1024 * 1024),
            allowed_mime_types,
            allowed_origins,
            max_files_single: env_parse("MAX_FILES_PER_UPLOAD", 10),
            max_files_bulk: env_parse("MAX_FILES_PER_BULK", 50),
            bulk_batch_size: env_parse("BULK_BATCH_SIZE", 10),
        };

        // Validate configuration values (e.g. file size range)
        config.validate()?;
        Ok(config)
    }
}

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    env::var(key)
        .ok()
        .and_then(|value| value.parse().ok())
        .unwrap_or(default)
}
