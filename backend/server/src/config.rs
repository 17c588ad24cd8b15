use std::{env, fmt::Display, fs::read_to_string, path::PathBuf, str::FromStr};

use anyhow::{Result, anyhow};
use tracing::{info, warn};

const DEFAULT_REDIS_URL: &str = "redis://127.0.0.1:6379";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Dev,
    Prod,
}

impl Environment {
    fn redis_key(self) -> &'static str {
        match self {
            Environment::Dev => "REDIS_DEV_URL",
            Environment::Prod => "REDIS_PROD_URL",
        }
    }
}

impl FromStr for Environment {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "dev" => Ok(Environment::Dev),
            "prod" => Ok(Environment::Prod),
            other => Err(format!("expected `dev` or `prod`, got `{other}`")),
        }
    }
}

impl Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Dev => write!(f, "dev"),
            Environment::Prod => write!(f, "prod"),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub env: Environment,
    pub redis_url: String,
    pub cors_origin: String,
    pub log_file: PathBuf,
}

impl Config {
    pub fn load() -> Result<Self> {
        let env: Environment = try_load("ENV", "dev")?;

        Ok(Self {
            port: try_load("PORT", "3000")?,
            env,
            redis_url: var(env.redis_key())
                .or_else(|_| read_secret(env.redis_key()))
                .unwrap_or_else(|_| {
                    info!("{} not set, using default: {DEFAULT_REDIS_URL}", env.redis_key());
                    DEFAULT_REDIS_URL.to_string()
                }),
            cors_origin: try_load("CORS_ORIGIN", "*")?,
            log_file: try_load("LOG_FILE", "app.log")?,
        })
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| {
        warn!("Environment variable {key} not found, using default");
    })
}

fn try_load<T: FromStr>(key: &str, default: &str) -> Result<T>
where
    T::Err: Display,
{
    parse_value(
        key,
        var(key).unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        }),
    )
}

fn parse_value<T: FromStr>(key: &str, raw: String) -> Result<T>
where
    T::Err: Display,
{
    raw.parse().map_err(|e| {
        warn!("Invalid {key} value: {e}");
        anyhow!("Environment misconfigured: invalid {key} value `{raw}`: {e}")
    })
}

fn read_secret(secret_name: &str) -> Result<String, ()> {
    let path = format!("/run/secrets/{secret_name}");

    read_to_string(&path).map(|s| s.trim().to_string()).map_err(|e| {
        warn!("Failed to read {secret_name} from file: {e}");
    })
}
