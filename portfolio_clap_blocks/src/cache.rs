//! CLI handling for response cache config.

use std::time::Duration;

/// Response cache settings
#[derive(Debug, Clone, Copy, clap::Parser)]
pub struct CacheConfig {
    /// How long a catalog read is served from the in-process cache before it is fetched again.
    ///
    /// Every write clears the cache regardless of this setting.
    #[clap(
        long = "cache-ttl",
        env = "PORTFOLIO_CACHE_TTL",
        default_value = "5m",
        value_parser = humantime::parse_duration
    )]
    pub cache_ttl: Duration,
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    #[test]
    fn ttl_defaults_to_five_minutes() {
        let config = CacheConfig::try_parse_from(["portfolio"]).unwrap();
        assert_eq!(config.cache_ttl, Duration::from_secs(300));
    }

    #[test]
    fn ttl_accepts_human_durations() {
        let config = CacheConfig::try_parse_from(["portfolio", "--cache-ttl", "90s"]).unwrap();
        assert_eq!(config.cache_ttl, Duration::from_secs(90));
        assert!(CacheConfig::try_parse_from(["portfolio", "--cache-ttl", "soon"]).is_err());
    }
}
