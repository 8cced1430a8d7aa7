use std::env;

use serde::Deserialize;
use tracing::info;

use crate::core::remote::{QRSERVER_URL, QUICKCHART_URL};

#[derive(Clone, Deserialize, Debug)]
pub struct Config {
    #[serde(default = "default_env")]
    pub env: String, // file / server
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    pub prefix: Option<String>,
    /// Per-backend attempt timeout in milliseconds.
    #[serde(default = "default_remote_timeout_ms")]
    pub remote_timeout_ms: u64,
    /// Override points for the remote providers (used by tests and
    /// self-hosted deployments).
    #[serde(default = "default_qrserver_url")]
    pub qrserver_url: String,
    #[serde(default = "default_quickchart_url")]
    pub quickchart_url: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            env: default_env(),
            host: default_host(),
            port: default_port(),
            prefix: None,
            remote_timeout_ms: default_remote_timeout_ms(),
            qrserver_url: default_qrserver_url(),
            quickchart_url: default_quickchart_url(),
        }
    }
}

fn default_env() -> String {
    "file".to_string()
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_remote_timeout_ms() -> u64 {
    10_000
}

fn default_qrserver_url() -> String {
    QRSERVER_URL.to_string()
}

fn default_quickchart_url() -> String {
    QUICKCHART_URL.to_string()
}

pub fn get_config() -> Config {
    let env_var = env::var("env").unwrap_or("file".to_string());
    if env_var == "file" {
        info!("using .env file as environtment variable");
        let _ = dotenvy::dotenv();
    } else {
        info!("using server environtment as environtment variable");
    }
    envy::from_env::<Config>().unwrap()
}
