use crate::constants::MAX_PROBE_COUNT;
use crate::error::{Error, Result};
use crate::resolver::Resolver;
use std::convert::Infallible;
use std::fmt::{Display, Formatter};
use std::net::Ipv4Addr;
use std::str::FromStr;
use std::time::Duration;

/// Default values for configuration.
pub mod defaults {
    use std::time::Duration;

    /// The default value for `count`.
    pub const DEFAULT_COUNT: u8 = 4;

    /// The default value for `receive-timeout`.
    ///
    /// A receive timeout of less than one millisecond is replaced by this value.
    pub const DEFAULT_RECEIVE_TIMEOUT: Duration = Duration::from_millis(1000);

    /// The smallest usable `receive-timeout`.
    pub const MIN_RECEIVE_TIMEOUT: Duration = Duration::from_millis(1);

    /// The default value for `total-timeout`.
    ///
    /// Zero means the session budget is derived as `count * receive-timeout`.
    pub const DEFAULT_TOTAL_TIMEOUT: Duration = Duration::ZERO;
}

/// The target of a probe session.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum Target {
    /// A numeric `IPv4` address.
    Addr(Ipv4Addr),
    /// A host name to be resolved at the start of every session.
    Hostname(String),
}

impl FromStr for Target {
    type Err = Infallible;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        Ok(match Ipv4Addr::from_str(s) {
            Ok(addr) => Self::Addr(addr),
            Err(_) => Self::Hostname(s.to_string()),
        })
    }
}

impl From<Ipv4Addr> for Target {
    fn from(addr: Ipv4Addr) -> Self {
        Self::Addr(addr)
    }
}

impl Display for Target {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Addr(addr) => write!(f, "{addr}"),
            Self::Hostname(hostname) => write!(f, "{hostname}"),
        }
    }
}

/// The parameters of a probe session.
///
/// Use [`crate::Builder`] to create a validated configuration.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ProbeConfig {
    pub target: Target,
    pub count: u8,
    pub receive_timeout: Duration,
    pub total_timeout: Duration,
}

impl ProbeConfig {
    /// Create a `ProbeConfig`.
    ///
    /// A `receive_timeout` which is zero in whole milliseconds is replaced with
    /// [`defaults::DEFAULT_RECEIVE_TIMEOUT`]. No other value is adjusted, out
    /// of range values are reported by [`ProbeConfig::is_valid`].
    #[must_use]
    pub fn new(
        target: Target,
        count: u8,
        receive_timeout: Duration,
        total_timeout: Duration,
    ) -> Self {
        let receive_timeout = if receive_timeout < defaults::MIN_RECEIVE_TIMEOUT {
            defaults::DEFAULT_RECEIVE_TIMEOUT
        } else {
            receive_timeout
        };
        Self {
            target,
            count,
            receive_timeout,
            total_timeout,
        }
    }

    /// Is this configuration usable for a probe session?
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.validate().is_ok()
    }

    /// Check this configuration, describing the first problem found.
    pub fn validate(&self) -> Result<()> {
        match &self.target {
            Target::Addr(addr) if addr.is_unspecified() => {
                return Err(Error::BadConfig(format!("target address {addr} is unspecified")));
            }
            Target::Hostname(hostname) if hostname.is_empty() => {
                return Err(Error::BadConfig(String::from("target hostname is empty")));
            }
            Target::Hostname(hostname) if hostname.contains('\0') => {
                return Err(Error::BadConfig(String::from(
                    "target hostname contains a NUL byte",
                )));
            }
            _ => {}
        }
        if self.count == 0 || usize::from(self.count) > MAX_PROBE_COUNT {
            return Err(Error::BadConfig(format!(
                "count {} not in range 1..={MAX_PROBE_COUNT}",
                self.count
            )));
        }
        if self.receive_timeout < defaults::MIN_RECEIVE_TIMEOUT {
            return Err(Error::BadConfig(format!(
                "receive_timeout {}us is less than 1ms",
                self.receive_timeout.as_micros()
            )));
        }
        if !self.total_timeout.is_zero() {
            match self.derived_total_timeout() {
                Some(minimum) if self.total_timeout >= minimum => {}
                Some(minimum) => {
                    return Err(Error::BadConfig(format!(
                        "total_timeout {}ms < count * receive_timeout ({}ms)",
                        self.total_timeout.as_millis(),
                        minimum.as_millis()
                    )));
                }
                None => {
                    return Err(Error::BadConfig(String::from(
                        "count * receive_timeout overflows",
                    )));
                }
            }
        }
        Ok(())
    }

    /// Resolve the target to an `IPv4` address.
    ///
    /// A numeric target is returned unchanged, a host name is looked up with
    /// the given resolver every time this is called.
    pub fn resolve_addr<R: Resolver>(&self, resolver: &R) -> Result<Ipv4Addr> {
        match &self.target {
            Target::Addr(addr) => Ok(*addr),
            Target::Hostname(hostname) => resolver.lookup(hostname),
        }
    }

    /// The whole seconds part of the receive timeout.
    #[must_use]
    pub fn receive_timeout_secs(&self) -> u64 {
        self.receive_timeout.as_secs()
    }

    /// The sub-second part of the receive timeout, in microseconds.
    #[must_use]
    pub fn receive_timeout_micros(&self) -> u32 {
        self.receive_timeout.subsec_micros()
    }

    /// The session budget.
    ///
    /// When no total timeout was given this is `count * receive_timeout`.
    #[must_use]
    pub fn total_timeout(&self) -> Duration {
        if self.total_timeout.is_zero() {
            self.derived_total_timeout().unwrap_or(Duration::MAX)
        } else {
            self.total_timeout
        }
    }

    /// The socket settings for a session.
    ///
    /// The read timeout is never zero, a zero `SO_RCVTIMEO` blocks forever.
    pub(crate) fn channel_config(&self, target_addr: Ipv4Addr) -> ChannelConfig {
        let read_timeout = Duration::new(
            self.receive_timeout_secs(),
            self.receive_timeout_micros() * 1000,
        );
        ChannelConfig {
            target_addr,
            read_timeout: if read_timeout.is_zero() {
                defaults::DEFAULT_RECEIVE_TIMEOUT
            } else {
                read_timeout
            },
        }
    }

    fn derived_total_timeout(&self) -> Option<Duration> {
        self.receive_timeout.checked_mul(u32::from(self.count))
    }
}

impl Display for ProbeConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Target: {}", self.target)?;
        writeln!(f, "Count: {}", self.count)?;
        writeln!(f, "Timeout Recv: {} ms", self.receive_timeout.as_millis())?;
        write!(f, "Timeout Total: {} ms", self.total_timeout().as_millis())
    }
}

/// Network channel configuration.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ChannelConfig {
    pub target_addr: Ipv4Addr,
    pub read_timeout: Duration,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::MockResolver;
    use mockall::predicate;
    use rand::Rng;
    use test_case::test_case;

    const TARGET: Target = Target::Addr(Ipv4Addr::new(8, 8, 4, 4));

    fn config(count: u8, receive_ms: u64, total_ms: u64) -> ProbeConfig {
        ProbeConfig::new(
            TARGET,
            count,
            Duration::from_millis(receive_ms),
            Duration::from_millis(total_ms),
        )
    }

    #[test_case("1.2.3.4", Target::Addr(Ipv4Addr::new(1, 2, 3, 4)); "dotted quad")]
    #[test_case("example.com", Target::Hostname(String::from("example.com")); "hostname")]
    #[test_case("::1", Target::Hostname(String::from("::1")); "ipv6 is not an address")]
    #[test_case("", Target::Hostname(String::new()); "empty")]
    fn test_target_from_str(input: &str, expected: Target) {
        assert_eq!(Ok(expected), Target::from_str(input));
    }

    #[test]
    fn test_target_display() {
        assert_eq!("8.8.4.4", TARGET.to_string());
        assert_eq!(
            "example.com",
            Target::Hostname(String::from("example.com")).to_string()
        );
    }

    #[test]
    fn test_zero_receive_timeout_replaced() {
        let config = config(4, 0, 0);
        assert_eq!(defaults::DEFAULT_RECEIVE_TIMEOUT, config.receive_timeout);
        assert!(config.is_valid());
    }

    #[test_case(Duration::from_nanos(1); "one nanosecond")]
    #[test_case(Duration::from_nanos(500); "sub microsecond")]
    #[test_case(Duration::from_micros(999); "sub millisecond")]
    fn test_sub_millisecond_receive_timeout_replaced(receive_timeout: Duration) {
        let config = ProbeConfig::new(TARGET, 4, receive_timeout, Duration::ZERO);
        assert_eq!(defaults::DEFAULT_RECEIVE_TIMEOUT, config.receive_timeout);
        assert!(config.is_valid());
        let channel_config = config.channel_config(Ipv4Addr::new(8, 8, 4, 4));
        assert_eq!(defaults::DEFAULT_RECEIVE_TIMEOUT, channel_config.read_timeout);
    }

    #[test]
    fn test_sub_millisecond_receive_timeout_rejected() {
        let mut config = config(4, 1000, 0);
        config.receive_timeout = Duration::from_nanos(500);
        let err = config.validate().unwrap_err();
        assert_eq!(
            "invalid config: receive_timeout 0us is less than 1ms",
            err.to_string()
        );
        assert!(!config
            .channel_config(Ipv4Addr::new(8, 8, 4, 4))
            .read_timeout
            .is_zero());
    }

    #[test_case(1, 1000, 0, true; "minimum count")]
    #[test_case(10, 1000, 0, true; "maximum count")]
    #[test_case(0, 1000, 0, false; "zero count")]
    #[test_case(11, 1000, 0, false; "count above maximum")]
    #[test_case(4, 1000, 4000, true; "total equals minimum")]
    #[test_case(4, 1000, 3999, false; "total below minimum")]
    #[test_case(4, 1000, 10_000, true; "total above minimum")]
    #[test_case(4, 1, 4, true; "tiny timeouts")]
    fn test_is_valid(count: u8, receive_ms: u64, total_ms: u64, expected: bool) {
        assert_eq!(expected, config(count, receive_ms, total_ms).is_valid());
    }

    #[test]
    fn test_is_valid_target() {
        let mut config = config(4, 1000, 0);
        config.target = Target::Addr(Ipv4Addr::UNSPECIFIED);
        assert!(!config.is_valid());
        config.target = Target::Hostname(String::new());
        assert!(!config.is_valid());
        config.target = Target::Hostname(String::from("dns\0.google"));
        assert!(!config.is_valid());
        config.target = Target::Hostname(String::from("localhost"));
        assert!(config.is_valid());
    }

    #[test]
    fn test_is_valid_max_durations() {
        let config = ProbeConfig::new(TARGET, 10, Duration::MAX, Duration::ZERO);
        assert!(config.is_valid());
        assert_eq!(Duration::MAX, config.total_timeout());
        let config = ProbeConfig::new(TARGET, 10, Duration::MAX, Duration::MAX);
        assert!(!config.is_valid());
        let config = ProbeConfig::new(TARGET, 10, Duration::from_millis(1), Duration::MAX);
        assert!(config.is_valid());
    }

    #[test]
    fn test_is_valid_randomized() {
        let mut rng = rand::thread_rng();
        for _ in 0..1000 {
            let count = rng.gen_range(0..=12_u8);
            let receive_ms = rng.gen_range(1..=5000_u64);
            let total_ms = if rng.gen_bool(0.3) {
                0
            } else {
                rng.gen_range(0..=60_000_u64)
            };
            let config = config(count, receive_ms, total_ms);
            let expected = (1..=10).contains(&count)
                && (total_ms == 0 || total_ms >= u64::from(count) * receive_ms);
            assert_eq!(expected, config.is_valid(), "{config:?}");
        }
    }

    #[test]
    fn test_validate_reason() {
        let err = config(11, 1000, 0).validate().unwrap_err();
        assert_eq!("invalid config: count 11 not in range 1..=10", err.to_string());
        let err = config(4, 1000, 3000).validate().unwrap_err();
        assert_eq!(
            "invalid config: total_timeout 3000ms < count * receive_timeout (4000ms)",
            err.to_string()
        );
    }

    #[test]
    fn test_derived_accessors() {
        let config = config(4, 2500, 0);
        assert_eq!(2, config.receive_timeout_secs());
        assert_eq!(500_000, config.receive_timeout_micros());
        assert_eq!(Duration::from_millis(10_000), config.total_timeout());
        let config = ProbeConfig::new(TARGET, 3, Duration::from_micros(1_000_001), Duration::ZERO);
        assert_eq!(1, config.receive_timeout_secs());
        assert_eq!(1, config.receive_timeout_micros());
        assert_eq!(Duration::from_millis(7000), self::config(3, 1000, 7000).total_timeout());
    }

    #[test]
    fn test_channel_config() {
        let config = ProbeConfig::new(TARGET, 3, Duration::from_nanos(1_500_000_999), Duration::ZERO);
        let channel_config = config.channel_config(Ipv4Addr::new(1, 1, 1, 1));
        assert_eq!(Ipv4Addr::new(1, 1, 1, 1), channel_config.target_addr);
        assert_eq!(Duration::from_micros(1_500_000), channel_config.read_timeout);
    }

    #[test]
    fn test_resolve_addr_numeric() -> anyhow::Result<()> {
        let mut resolver = MockResolver::new();
        resolver.expect_lookup().never();
        assert_eq!(Ipv4Addr::new(8, 8, 4, 4), config(4, 1000, 0).resolve_addr(&resolver)?);
        Ok(())
    }

    #[test]
    fn test_resolve_addr_hostname() -> anyhow::Result<()> {
        let mut resolver = MockResolver::new();
        resolver
            .expect_lookup()
            .with(predicate::eq("example.com"))
            .times(2)
            .returning(|_| Ok(Ipv4Addr::new(93, 184, 215, 14)));
        let mut config = config(4, 1000, 0);
        config.target = Target::Hostname(String::from("example.com"));
        assert_eq!(Ipv4Addr::new(93, 184, 215, 14), config.resolve_addr(&resolver)?);
        assert_eq!(Ipv4Addr::new(93, 184, 215, 14), config.resolve_addr(&resolver)?);
        Ok(())
    }

    #[test]
    fn test_resolve_addr_failure() {
        let mut resolver = MockResolver::new();
        resolver.expect_lookup().times(1).returning(|hostname| {
            Err(Error::UnresolvedTarget(
                hostname.to_string(),
                String::from("no address"),
            ))
        });
        let mut config = config(4, 1000, 0);
        config.target = Target::Hostname(String::from("example.invalid"));
        let err = config.resolve_addr(&resolver).unwrap_err();
        assert!(matches!(err, Error::UnresolvedTarget(host, _) if host == "example.invalid"));
    }

    #[test]
    fn test_display() {
        let expected = "Target: 8.8.4.4\nCount: 4\nTimeout Recv: 2000 ms\nTimeout Total: 8000 ms";
        assert_eq!(expected, config(4, 2000, 0).to_string());
    }
}
