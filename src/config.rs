use anyhow::Result;
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub storage: StorageConfig,
    pub transport: TransportConfig,
    pub llm: LlmBackendConfig,
    pub audio: AudioConfig,
}

#[derive(Debug, Deserialize)]
pub struct ServiceConfig {
    pub name: String,
    pub http: HttpConfig,
}

#[derive(Debug, Deserialize)]
pub struct HttpConfig {
    pub bind: String,
    pub port: u16,
}

#[derive(Debug, Deserialize)]
pub struct StorageConfig {
    /// Path of the JSON key/value store file
    pub path: String,
}

#[derive(Debug, Deserialize)]
pub struct TransportConfig {
    pub url: String,
}

#[derive(Debug, Deserialize)]
pub struct LlmBackendConfig {
    pub base_url: String,
}

#[derive(Debug, Deserialize)]
pub struct AudioConfig {
    /// Sample rate the capture boundary delivers blocks at
    pub native_sample_rate: u32,
    /// Bounded frame channel capacity
    pub frame_channel_capacity: usize,
    /// Directory for realtime capture archives (omit to disable)
    pub archive_path: Option<String>,
}

impl Config {
    pub fn load(path: &str) -> Result<Self> {
        let settings = config::Config::builder()
            .add_source(config::File::with_name(path))
            .build()?;

        Ok(settings.try_deserialize()?)
    }
}
