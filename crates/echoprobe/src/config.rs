use anyhow::anyhow;
use clap::{Parser, ValueEnum};
use echoprobe_core::{defaults, monitor, ProbeConfig, Target};
use std::time::Duration;

/// The default value for `log-filter`.
pub const DEFAULT_LOG_FILTER: &str = "echoprobe=debug,echoprobe_core=debug";

/// Send `ICMPv4` echo requests to a host and report round trip statistics
#[derive(Parser, Debug)]
#[command(name = "echoprobe", author, version, about, long_about = None, arg_required_else_help(true))]
pub struct Args {
    /// The hostname or IPv4 address to probe [default in monitor mode: 8.8.4.4]
    #[arg(required_unless_present("monitor"))]
    pub target: Option<String>,

    /// The number of echo requests to send [default: 4]
    #[arg(short = 'c', long)]
    pub count: Option<u8>,

    /// The time to wait for each echo reply [default: 1s, 2s in monitor mode]
    #[arg(short = 'W', long, value_parser = parse_duration)]
    pub receive_timeout: Option<Duration>,

    /// The time budget of the whole session, 0s for count * receive-timeout [default: 0s]
    #[arg(short = 'w', long, value_parser = parse_duration)]
    pub total_timeout: Option<Duration>,

    /// Repeat the session until interrupted and report reachability changes
    #[arg(long)]
    pub monitor: bool,

    /// The delay between sessions in monitor mode [default: 10s]
    #[arg(long, value_parser = parse_duration, requires = "monitor")]
    pub interval: Option<Duration>,

    /// The debug log format [default: compact]
    #[arg(value_enum, long)]
    pub log_format: Option<LogFormat>,

    /// The debug log filter [default: echoprobe=debug,echoprobe_core=debug]
    #[arg(long)]
    pub log_filter: Option<String>,

    /// The debug log span events [default: off]
    #[arg(value_enum, long)]
    pub log_span_events: Option<LogSpanEvents>,

    /// Enable verbose debug logging
    #[arg(short = 'v', long, default_value_t = false)]
    pub verbose: bool,
}

fn parse_duration(value: &str) -> anyhow::Result<Duration> {
    Ok(humantime::parse_duration(value)?)
}

/// How to render the debug log.
#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
pub enum LogFormat {
    /// Display log data in a compact format.
    Compact,
    /// Display log data in a pretty format.
    Pretty,
    /// Display log data in a json format.
    Json,
}

/// How to log event spans.
#[derive(Debug, Copy, Clone, Eq, PartialEq, ValueEnum)]
pub enum LogSpanEvents {
    /// Do not display event spans.
    Off,
    /// Display enter and exit event spans.
    Active,
    /// Display all event spans.
    Full,
}

/// Whether to probe once or keep probing.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum Mode {
    /// Run a single session and exit.
    Once,
    /// Run a session every `interval` until interrupted.
    Monitor { interval: Duration },
}

/// Fully parsed and validated configuration.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct EchoprobeConfig {
    pub probe: ProbeConfig,
    pub mode: Mode,
    pub verbose: bool,
    pub log_format: LogFormat,
    pub log_filter: String,
    pub log_span_events: LogSpanEvents,
}

impl TryFrom<Args> for EchoprobeConfig {
    type Error = anyhow::Error;

    fn try_from(args: Args) -> anyhow::Result<Self> {
        let (mode, default_target, default_receive_timeout) = if args.monitor {
            let interval = args.interval.unwrap_or(monitor::defaults::DEFAULT_INTERVAL);
            validate_interval(interval)?;
            (
                Mode::Monitor { interval },
                Target::Addr(monitor::defaults::DEFAULT_TARGET),
                monitor::defaults::DEFAULT_RECEIVE_TIMEOUT,
            )
        } else {
            (
                Mode::Once,
                Target::Hostname(String::new()),
                defaults::DEFAULT_RECEIVE_TIMEOUT,
            )
        };
        let target = match args.target {
            Some(target) => parse_target(&target)?,
            None => default_target,
        };
        let probe = ProbeConfig::new(
            target,
            args.count.unwrap_or(defaults::DEFAULT_COUNT),
            args.receive_timeout.unwrap_or(default_receive_timeout),
            args.total_timeout.unwrap_or(defaults::DEFAULT_TOTAL_TIMEOUT),
        );
        probe.validate()?;
        Ok(Self {
            probe,
            mode,
            verbose: args.verbose,
            log_format: args.log_format.unwrap_or(LogFormat::Compact),
            log_filter: args
                .log_filter
                .unwrap_or_else(|| String::from(DEFAULT_LOG_FILTER)),
            log_span_events: args.log_span_events.unwrap_or(LogSpanEvents::Off),
        })
    }
}

fn parse_target(value: &str) -> anyhow::Result<Target> {
    let value = value.trim();
    if value.is_empty() {
        return Err(anyhow!("target must not be blank"));
    }
    Ok(value.parse::<Target>().unwrap_or_else(|never| match never {}))
}

fn validate_interval(interval: Duration) -> anyhow::Result<()> {
    if interval.is_zero() {
        Err(anyhow!("interval must be greater than zero"))
    } else {
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::net::Ipv4Addr;
    use test_case::test_case;

    fn parse(cmd: &str) -> anyhow::Result<EchoprobeConfig> {
        let args = Args::try_parse_from(cmd.split(' ').map(std::ffi::OsString::from))?;
        EchoprobeConfig::try_from(args)
    }

    #[test]
    fn test_config_default() -> anyhow::Result<()> {
        let config = parse("echoprobe example.com")?;
        let expected = EchoprobeConfig {
            probe: ProbeConfig::new(
                Target::Hostname(String::from("example.com")),
                4,
                Duration::from_secs(1),
                Duration::ZERO,
            ),
            mode: Mode::Once,
            verbose: false,
            log_format: LogFormat::Compact,
            log_filter: String::from(DEFAULT_LOG_FILTER),
            log_span_events: LogSpanEvents::Off,
        };
        assert_eq!(expected, config);
        Ok(())
    }

    #[test]
    fn test_config_monitor_default() -> anyhow::Result<()> {
        let config = parse("echoprobe --monitor")?;
        assert_eq!(
            Mode::Monitor {
                interval: Duration::from_secs(10)
            },
            config.mode
        );
        assert_eq!(Target::Addr(Ipv4Addr::new(8, 8, 4, 4)), config.probe.target);
        assert_eq!(4, config.probe.count);
        assert_eq!(Duration::from_secs(2), config.probe.receive_timeout);
        Ok(())
    }

    #[test_case("echoprobe 1.2.3.4", Target::Addr(Ipv4Addr::new(1, 2, 3, 4)); "numeric target")]
    #[test_case("echoprobe dns.google", Target::Hostname(String::from("dns.google")); "hostname target")]
    #[test_case("echoprobe --monitor 1.1.1.1", Target::Addr(Ipv4Addr::new(1, 1, 1, 1)); "monitor with target")]
    fn test_target(cmd: &str, expected: Target) {
        assert_eq!(expected, parse(cmd).unwrap().probe.target);
    }

    #[test_case("echoprobe 1.2.3.4 -c 10", 10; "short")]
    #[test_case("echoprobe 1.2.3.4 --count 1", 1; "long")]
    fn test_count(cmd: &str, expected: u8) {
        assert_eq!(expected, parse(cmd).unwrap().probe.count);
    }

    #[test_case("echoprobe 1.2.3.4 -W 250ms", Duration::from_millis(250); "short millis")]
    #[test_case("echoprobe 1.2.3.4 --receive-timeout 2s", Duration::from_secs(2); "long secs")]
    #[test_case("echoprobe 1.2.3.4 -W 0s", Duration::from_secs(1); "zero selects default")]
    #[test_case("echoprobe 1.2.3.4 -W 500ns", Duration::from_secs(1); "sub millisecond selects default")]
    fn test_receive_timeout(cmd: &str, expected: Duration) {
        assert_eq!(expected, parse(cmd).unwrap().probe.receive_timeout);
    }

    #[test_case("echoprobe 1.2.3.4 -w 10s", Duration::from_secs(10); "explicit")]
    #[test_case("echoprobe 1.2.3.4 -c 3 -W 500ms", Duration::from_millis(1500); "derived")]
    fn test_total_timeout(cmd: &str, expected: Duration) {
        assert_eq!(expected, parse(cmd).unwrap().probe.total_timeout());
    }

    #[test_case("echoprobe 1.2.3.4 -c 0"; "zero count")]
    #[test_case("echoprobe 1.2.3.4 -c 11"; "count above maximum")]
    #[test_case("echoprobe 1.2.3.4 -c 256"; "count overflows")]
    #[test_case("echoprobe 1.2.3.4 -w 3s"; "total timeout too short")]
    #[test_case("echoprobe 1.2.3.4 -W 1x"; "bad duration")]
    #[test_case("echoprobe 0.0.0.0"; "unspecified address")]
    #[test_case("echoprobe 1.2.3.4 --interval 5s"; "interval without monitor")]
    #[test_case("echoprobe --monitor --interval 0s"; "zero interval")]
    #[test_case("echoprobe -c 4"; "missing target")]
    fn test_invalid(cmd: &str) {
        assert!(parse(cmd).is_err());
    }

    #[test]
    fn test_logging() -> anyhow::Result<()> {
        let config = parse(
            "echoprobe 1.2.3.4 -v --log-format json --log-filter echoprobe_core=trace --log-span-events full",
        )?;
        assert!(config.verbose);
        assert_eq!(LogFormat::Json, config.log_format);
        assert_eq!("echoprobe_core=trace", config.log_filter);
        assert_eq!(LogSpanEvents::Full, config.log_span_events);
        Ok(())
    }

    #[test_case("pretty", LogFormat::Pretty)]
    #[test_case("compact", LogFormat::Compact)]
    fn test_log_format(value: &str, expected: LogFormat) {
        let cmd = format!("echoprobe 1.2.3.4 --log-format {value}");
        assert_eq!(expected, parse(&cmd).unwrap().log_format);
    }
}
