//! Server settings from flags and environment variables.

use std::time::Duration;

use clap::{ArgAction, Parser};

/// Runtime settings for the trends API.
///
/// Every field can be set with a flag or with the environment variable
/// named beside it.
#[derive(Debug, Clone, Parser)]
#[command(name = "trends-server")]
#[command(version)]
#[command(about = "HTTP API over the keyword trends pipeline")]
pub struct Settings {
    /// Deployment environment name reported by `/health`.
    #[arg(long, env = "ENVIRONMENT", default_value = "development")]
    pub environment: String,

    /// Service name shown in the banner.
    #[arg(long, env = "APP_NAME", default_value = "Trends Insights API")]
    pub app_name: String,

    /// Service version reported by `/` and `/health`.
    #[arg(long, env = "APP_VERSION", default_value = env!("CARGO_PKG_VERSION"))]
    pub app_version: String,

    /// Socket address to listen on.
    #[arg(long, env = "LISTEN_ADDR", default_value = "0.0.0.0:8000")]
    pub listen_addr: String,

    /// Redis connection URL.
    #[arg(long, env = "REDIS_URL", default_value = "redis://localhost:6379")]
    pub redis_url: String,

    /// Lifetime of cached results, in seconds.
    #[arg(long, env = "CACHE_TTL", default_value_t = 3600)]
    pub cache_ttl: u64,

    /// Whether to use Redis at all.
    #[arg(long, env = "CACHE_ENABLED", default_value_t = true, action = ArgAction::Set)]
    pub cache_enabled: bool,

    /// Origin allowed by CORS.
    #[arg(long, env = "FRONTEND_URL", default_value = "http://localhost:5173")]
    pub frontend_url: String,

    /// Interface language sent to the provider.
    #[arg(long, env = "TRENDS_HL", default_value = "en-US")]
    pub hl: String,

    /// Timezone offset in minutes sent to the provider.
    #[arg(long, env = "TRENDS_TZ", default_value_t = 360, allow_negative_numbers = true)]
    pub tz: i32,
}

impl Settings {
    /// Returns the cache TTL as a duration.
    #[must_use]
    pub const fn cache_ttl(&self) -> Duration {
        Duration::from_secs(self.cache_ttl)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_flags_override_defaults() {
        let settings = Settings::parse_from([
            "trends-server",
            "--environment",
            "test",
            "--cache-ttl",
            "60",
            "--cache-enabled",
            "false",
            "--tz",
            "-120",
        ]);

        assert_eq!(settings.environment, "test");
        assert_eq!(settings.cache_ttl(), Duration::from_secs(60));
        assert!(!settings.cache_enabled);
        assert_eq!(settings.tz, -120);
    }

    #[test]
    fn test_rejects_non_numeric_ttl() {
        let result = Settings::try_parse_from(["trends-server", "--cache-ttl", "soon"]);
        assert!(result.is_err());
    }
}
