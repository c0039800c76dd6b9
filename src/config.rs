use crate::constants::*;
use std::env;
use std::time::Duration;

/// Where server-mirrored draft snapshots are kept.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum DraftBackend {
    #[default]
    Memory,
    Redis,
    Postgres,
}

impl std::str::FromStr for DraftBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "memory" => Ok(DraftBackend::Memory),
            "redis" => Ok(DraftBackend::Redis),
            "postgres" | "postgresql" => Ok(DraftBackend::Postgres),
            _ => Err(format!(
                "Invalid draft store: {}. Use 'memory', 'redis' or 'postgres'",
                s
            )),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub draft_backend: DraftBackend,
    pub redis_url: Option<String>,
    pub database_url: Option<String>,
    pub drafts: DraftConfig,
    pub max_upload_bytes: usize,
    pub memory_store_max_entries: u64,
}

#[derive(Debug, Clone)]
pub struct DraftConfig {
    /// Lifetime of a snapshot after its last update
    pub ttl: Duration,

    /// Quiet period after the last mutation before an autosave write
    pub autosave_debounce: Duration,

    /// Minimum pixel distance between consecutive captured points
    pub min_point_spacing_px: f64,
}

impl Default for DraftConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(DEFAULT_DRAFT_TTL_SECONDS),
            autosave_debounce: Duration::from_millis(DEFAULT_AUTOSAVE_DEBOUNCE_MS),
            min_point_spacing_px: DEFAULT_MIN_POINT_SPACING_PX,
        }
    }
}

impl DraftConfig {
    pub fn from_env() -> Result<Self, String> {
        let ttl_seconds: u64 = env::var("DRAFT_TTL_SECONDS")
            .unwrap_or_else(|_| DEFAULT_DRAFT_TTL_SECONDS.to_string())
            .parse()
            .map_err(|_| "Invalid DRAFT_TTL_SECONDS")?;
        if ttl_seconds == 0 {
            return Err("DRAFT_TTL_SECONDS must be greater than 0".to_string());
        }

        let debounce_ms: u64 = env::var("DRAFT_AUTOSAVE_DEBOUNCE_MS")
            .unwrap_or_else(|_| DEFAULT_AUTOSAVE_DEBOUNCE_MS.to_string())
            .parse()
            .map_err(|_| "Invalid DRAFT_AUTOSAVE_DEBOUNCE_MS")?;

        let min_point_spacing_px: f64 = env::var("MIN_POINT_SPACING_PX")
            .unwrap_or_else(|_| DEFAULT_MIN_POINT_SPACING_PX.to_string())
            .parse()
            .map_err(|_| "Invalid MIN_POINT_SPACING_PX")?;
        if !min_point_spacing_px.is_finite() || min_point_spacing_px < 0.0 {
            return Err("MIN_POINT_SPACING_PX must be a non-negative number".to_string());
        }

        Ok(Self {
            ttl: Duration::from_secs(ttl_seconds),
            autosave_debounce: Duration::from_millis(debounce_ms),
            min_point_spacing_px,
        })
    }
}

impl Config {
    pub fn from_env() -> Result<Self, String> {
        dotenv::dotenv().ok();

        let draft_backend: DraftBackend = env::var("DRAFT_STORE")
            .unwrap_or_else(|_| "memory".to_string())
            .parse()?;

        let redis_url = env::var("REDIS_URL").ok();
        let database_url = env::var("DATABASE_URL").ok();

        match draft_backend {
            DraftBackend::Redis if redis_url.is_none() => {
                return Err("REDIS_URL must be set when DRAFT_STORE=redis".to_string())
            }
            DraftBackend::Postgres if database_url.is_none() => {
                return Err("DATABASE_URL must be set when DRAFT_STORE=postgres".to_string())
            }
            _ => {}
        }

        Ok(Config {
            host: env::var("HOST").unwrap_or_else(|_| DEFAULT_HOST.to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| DEFAULT_PORT.to_string())
                .parse()
                .map_err(|_| "Invalid PORT")?,
            draft_backend,
            redis_url,
            database_url,
            drafts: DraftConfig::from_env()?,
            max_upload_bytes: env::var("MAX_UPLOAD_BYTES")
                .unwrap_or_else(|_| DEFAULT_MAX_UPLOAD_BYTES.to_string())
                .parse()
                .map_err(|_| "Invalid MAX_UPLOAD_BYTES")?,
            memory_store_max_entries: env::var("MEMORY_STORE_MAX_ENTRIES")
                .unwrap_or_else(|_| DEFAULT_MEMORY_STORE_MAX_ENTRIES.to_string())
                .parse()
                .map_err(|_| "Invalid MEMORY_STORE_MAX_ENTRIES")?,
        })
    }

    pub fn server_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    const VARS: &[&str] = &[
        "DRAFT_STORE",
        "REDIS_URL",
        "DATABASE_URL",
        "DRAFT_TTL_SECONDS",
        "DRAFT_AUTOSAVE_DEBOUNCE_MS",
        "MIN_POINT_SPACING_PX",
        "MAX_UPLOAD_BYTES",
        "PORT",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn draft_backend_parsing() {
        assert_eq!("memory".parse::<DraftBackend>(), Ok(DraftBackend::Memory));
        assert_eq!("Redis".parse::<DraftBackend>(), Ok(DraftBackend::Redis));
        assert_eq!("postgresql".parse::<DraftBackend>(), Ok(DraftBackend::Postgres));
        assert!("sqlite".parse::<DraftBackend>().is_err());
    }

    #[test]
    #[serial]
    fn defaults_when_env_is_empty() {
        clear_env();
        let config = Config::from_env().unwrap();

        assert_eq!(config.draft_backend, DraftBackend::Memory);
        assert_eq!(config.drafts.ttl, Duration::from_secs(604_800));
        assert_eq!(config.drafts.autosave_debounce, Duration::from_millis(1_000));
        assert_eq!(config.max_upload_bytes, DEFAULT_MAX_UPLOAD_BYTES);
    }

    #[test]
    #[serial]
    fn redis_backend_requires_url() {
        clear_env();
        env::set_var("DRAFT_STORE", "redis");
        let result = Config::from_env();
        clear_env();

        assert!(result.unwrap_err().contains("REDIS_URL"));
    }

    #[test]
    #[serial]
    fn rejects_zero_ttl() {
        clear_env();
        env::set_var("DRAFT_TTL_SECONDS", "0");
        let result = DraftConfig::from_env();
        clear_env();

        assert!(result.is_err());
    }

    #[test]
    #[serial]
    fn rejects_negative_spacing() {
        clear_env();
        env::set_var("MIN_POINT_SPACING_PX", "-2");
        let result = DraftConfig::from_env();
        clear_env();

        assert!(result.is_err());
    }
}
