use anyhow::{bail, Result};
use image::ImageFormat;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub database: DatabaseConfig,
    pub s3: S3Config,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default)]
    pub processing: ProcessingConfig,
    pub logging: Option<LoggingConfig>,
}

#[derive(Debug, Deserialize)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

#[derive(Debug, Deserialize)]
pub struct S3Config {
    pub endpoint: Option<String>,
    pub region: String,
    pub bucket: String,
    pub access_key_id: Option<String>,
    pub secret_access_key: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CacheConfig {
    /// Maximum number of cached owner listings held in memory
    #[serde(default = "default_cache_capacity")]
    pub capacity: u64,
    /// TTL applied to owner listings, in seconds
    #[serde(default = "default_listing_ttl")]
    pub listing_ttl_secs: u64,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            capacity: default_cache_capacity(),
            listing_ttl_secs: default_listing_ttl(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ProcessingConfig {
    /// Encoding used for the resized and collage artifacts
    #[serde(default = "default_format")]
    pub format: String,
    /// Expiry of generated retrieval URLs, in seconds
    #[serde(default = "default_signed_url_ttl")]
    pub signed_url_ttl_secs: u64,
}

impl Default for ProcessingConfig {
    fn default() -> Self {
        ProcessingConfig {
            format: default_format(),
            signed_url_ttl_secs: default_signed_url_ttl(),
        }
    }
}

impl ProcessingConfig {
    pub fn image_format(&self) -> Result<ImageFormat> {
        match ImageFormat::from_extension(&self.format) {
            Some(format) => Ok(format),
            None => bail!("Unsupported artifact format: {}", self.format),
        }
    }

    /// File extension appended to every artifact key
    pub fn extension(&self) -> Result<&'static str> {
        Ok(self
            .image_format()?
            .extensions_str()
            .first()
            .copied()
            .unwrap_or("bin"))
    }

    pub fn content_type(&self) -> Result<String> {
        Ok(self.image_format()?.to_mime_type().to_string())
    }
}

#[derive(Debug, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub path: String,
    /// Maximum size of a single log file in MiB
    pub size: u64,
    pub max_files: usize,
}

fn default_cache_capacity() -> u64 {
    1024
}

fn default_listing_ttl() -> u64 {
    60
}

fn default_format() -> String {
    "jpeg".to_string()
}

fn default_signed_url_ttl() -> u64 {
    36000
}

pub fn load_config(path: &str) -> Result<Config> {
    let config_text = fs::read_to_string(Path::new(path))?;
    let config: Config = toml::from_str(&config_text)?;
    // Fail fast on an unusable artifact format
    config.processing.image_format()?;
    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_minimal_config() {
        let text = r#"
            [database]
            url = "postgres://localhost/collage"
            max_connections = 5

            [s3]
            region = "ap-southeast-2"
            bucket = "collage-artifacts"
        "#;
        let config: Config = toml::from_str(text).unwrap();
        assert_eq!(config.database.max_connections, 5);
        assert_eq!(config.cache.listing_ttl_secs, 60);
        assert_eq!(config.processing.signed_url_ttl_secs, 36000);
        assert_eq!(config.processing.format, "jpeg");
        assert!(config.logging.is_none());
    }

    #[test]
    fn processing_format_resolves_extension_and_mime() {
        let processing = ProcessingConfig::default();
        assert_eq!(processing.extension().unwrap(), "jpg");
        assert_eq!(processing.content_type().unwrap(), "image/jpeg");
    }

    #[test]
    fn rejects_unknown_format() {
        let processing = ProcessingConfig {
            format: "xyzzy".to_string(),
            ..ProcessingConfig::default()
        };
        assert!(processing.image_format().is_err());
    }
}
