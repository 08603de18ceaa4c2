use crate::config::{defaults, ProbeConfig, Target};
use crate::error::Result;
use crate::Pinger;
use std::time::Duration;

/// Build a pinger.
///
/// This is a convenience builder to simplify the creation of a [`Pinger`]
/// with a validated configuration.
///
/// # Examples
///
/// ```no_run
/// # fn main() -> anyhow::Result<()> {
/// use echoprobe_core::Builder;
/// use std::time::Duration;
///
/// let pinger = Builder::new("dns.google".parse::<echoprobe_core::Target>()?)
///     .count(10)
///     .receive_timeout(Duration::from_millis(500))
///     .total_timeout(Duration::from_secs(10))
///     .build()?;
/// # Ok(())
/// # }
/// ```
///
/// # See Also
///
/// - [`Pinger`] - An `ICMPv4` echo prober.
#[derive(Debug)]
pub struct Builder {
    target: Target,
    count: u8,
    receive_timeout: Duration,
    total_timeout: Duration,
}

impl Builder {
    /// Build a pinger builder for a given target.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # fn main() -> anyhow::Result<()> {
    /// use echoprobe_core::Builder;
    ///
    /// let addr = std::net::Ipv4Addr::new(1, 1, 1, 1);
    /// let pinger = Builder::new(addr).build()?;
    /// # Ok(())
    /// # }
    /// ```
    #[must_use]
    pub fn new(target: impl Into<Target>) -> Self {
        Self {
            target: target.into(),
            count: defaults::DEFAULT_COUNT,
            receive_timeout: defaults::DEFAULT_RECEIVE_TIMEOUT,
            total_timeout: defaults::DEFAULT_TOTAL_TIMEOUT,
        }
    }

    /// Set the number of echo requests to send.
    ///
    /// Must be between 1 and [`crate::MAX_PROBE_COUNT`] inclusive.
    #[must_use]
    pub fn count(self, count: u8) -> Self {
        Self { count, ..self }
    }

    /// Set the time to wait for each echo reply.
    ///
    /// A zero duration selects the default receive timeout.
    #[must_use]
    pub fn receive_timeout(self, receive_timeout: Duration) -> Self {
        Self {
            receive_timeout,
            ..self
        }
    }

    /// Set the time budget of the whole session.
    ///
    /// A zero duration means `count * receive_timeout`. Any other value must
    /// be at least that long.
    #[must_use]
    pub fn total_timeout(self, total_timeout: Duration) -> Self {
        Self {
            total_timeout,
            ..self
        }
    }

    /// Build the [`Pinger`].
    ///
    /// Fails with [`crate::Error::BadConfig`] if the configuration is not
    /// valid. Host names are not resolved here, they are resolved at the
    /// start of every session.
    pub fn build(self) -> Result<Pinger> {
        let config = ProbeConfig::new(
            self.target,
            self.count,
            self.receive_timeout,
            self.total_timeout,
        );
        config.validate()?;
        Ok(Pinger::new(config))
    }
}
