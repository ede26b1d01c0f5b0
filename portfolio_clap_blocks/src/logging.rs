//! CLI handling for log filtering.

use tracing_subscriber::EnvFilter;

/// Filter applied when neither `--log-filter` nor `-v` is given
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Logging related subset of options
#[derive(Debug, Clone, clap::Parser)]
pub struct LoggingConfig {
    /// Logs: filter directive
    ///
    /// Configures log severity level filter, by target.
    ///
    /// Simplest options: error, warn, info, debug, trace
    ///
    /// Levels for different modules can be specified. For example
    /// `debug,reqwest=info` specifies debug logging for all modules except for
    /// `reqwest`, which will only display info level logging.
    ///
    /// Overridden by `-v`.
    #[clap(long = "log-filter", env = "LOG_FILTER", global = true, action)]
    pub log_filter: Option<String>,

    /// Logs: filter short-hand
    ///
    /// Convenient way to set log severity level filter.
    /// Overrides `--log-filter`.
    ///
    /// -v   'debug'
    ///
    /// -vv  'trace'
    #[clap(
        short = 'v',
        long = "verbose",
        action = clap::ArgAction::Count,
        global = true,
        verbatim_doc_comment
    )]
    pub log_verbose_count: u8,
}

impl LoggingConfig {
    /// The filter directive in effect, before it is parsed
    pub fn directive(&self) -> &str {
        match self.log_verbose_count {
            0 => self.log_filter.as_deref().unwrap_or(DEFAULT_LOG_FILTER),
            1 => "debug",
            _ => "trace",
        }
    }

    pub fn env_filter(&self) -> Result<EnvFilter, tracing_subscriber::filter::ParseError> {
        EnvFilter::try_new(self.directive())
    }
}

#[cfg(test)]
mod tests {
    use clap::Parser;

    use super::*;

    fn parse(args: &[&str]) -> LoggingConfig {
        let argv = std::iter::once("portfolio").chain(args.iter().copied());
        let mut config = LoggingConfig::try_parse_from(argv).unwrap();
        if args.is_empty() {
            // clean out eventual leaks via env variables
            config.log_filter = None;
        }
        config
    }

    #[test]
    fn verbose_count_overrides_filter() {
        assert_eq!(parse(&[]).directive(), "info");
        assert_eq!(parse(&["--log-filter", "warn"]).directive(), "warn");
        assert_eq!(parse(&["--log-filter", "warn", "-v"]).directive(), "debug");
        assert_eq!(parse(&["-vv"]).directive(), "trace");
        assert_eq!(parse(&["-v", "-v", "-v"]).directive(), "trace");
    }

    #[test]
    fn filter_must_parse() {
        let ok = parse(&["--log-filter", "debug,reqwest=info"]);
        assert!(ok.env_filter().is_ok());
        let bad = parse(&["--log-filter", "reqwest=loud"]);
        assert!(bad.env_filter().is_err());
    }
}
