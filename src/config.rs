use anyhow::{anyhow, Context};
use std::env;
use std::net::SocketAddr;

const DEFAULT_DATABASE: &str = "devcamper";
const DEFAULT_TOKEN_DAYS: i64 = 30;

/// Runtime settings, read from the environment.
#[derive(Debug, Clone)]
pub struct Config {
    pub server: SocketAddr,
    pub mongo_url: String,
    pub database: String,
    pub jwt_secret: String,
    pub jwt_expire_days: i64,
}

impl Config {
    /// Loads `.env` first when running locally (`ENV=LOCAL`, the default).
    pub fn from_env() -> Result<Self, anyhow::Error> {
        if env::var_os("ENV").is_none() {
            env::set_var("ENV", "LOCAL");
        }
        if let Ok(value) = env::var("ENV") {
            if value == "LOCAL" {
                println!("Using local env");
                let _ = dotenv::dotenv().ok();
            }
        }
        if env::var_os("RUST_LOG").is_none() {
            // Set `RUST_LOG=devcamper=debug` to see store and query details.
            env::set_var("RUST_LOG", "devcamper=info");
        }
        Self::from_lookup(|key| env::var(key).ok())
    }

    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, anyhow::Error> {
        let required = |key: &str| lookup(key).ok_or_else(|| anyhow!("Missing {} env var", key));

        let host = required("HOST")?;
        let port = required("PORT")?;
        let server = format!("{}:{}", host, port)
            .parse::<SocketAddr>()
            .with_context(|| format!("Unable to parse socket address {}:{}", host, port))?;
        let jwt_expire_days = match lookup("JWT_EXPIRE_DAYS") {
            Some(days) => days
                .parse::<i64>()
                .with_context(|| format!("JWT_EXPIRE_DAYS is not a number: {}", days))?,
            None => DEFAULT_TOKEN_DAYS,
        };

        Ok(Self {
            server,
            mongo_url: required("MONGO_URL")?,
            database: lookup("MONGO_DB").unwrap_or_else(|| DEFAULT_DATABASE.to_string()),
            jwt_secret: required("JWT_SECRET")?,
            jwt_expire_days,
        })
    }
}
