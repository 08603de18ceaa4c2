use crate::config::ProbeConfig;
use crate::error::Result;
use crate::result::PingResult;
use crate::Error;
use std::sync::Arc;
use std::thread;
use std::thread::JoinHandle;

/// An `ICMPv4` echo prober.
///
/// See the [`crate`] documentation for more information.
///
/// Note that this is type cheaply cloneable, all clones share the same
/// session guard and result snapshot.
#[derive(Debug, Clone)]
pub struct Pinger {
    inner: Arc<inner::PingerInner>,
}

impl Pinger {
    /// Create a `Pinger`.
    ///
    /// Use the [`crate::Builder`] type to create a [`Pinger`].
    #[must_use]
    pub(crate) fn new(config: ProbeConfig) -> Self {
        Self {
            inner: Arc::new(inner::PingerInner::new(config)),
        }
    }

    /// Run a single probe session.
    ///
    /// This method blocks until every echo request has been sent and its
    /// reply received or timed out, or until the session ends early.
    ///
    /// Sending and receiving failures end the session early but are not
    /// errors, the result of the probes made so far is returned. An error is
    /// returned if the session cannot start: the configuration is invalid,
    /// the target cannot be resolved, the socket cannot be created or another
    /// session of this `Pinger` is still in progress.
    ///
    /// This operation requires the `CAP_NET_RAW` capability on Linux.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # fn main() -> anyhow::Result<()> {
    /// # use std::net::Ipv4Addr;
    /// use echoprobe_core::Builder;
    ///
    /// let pinger = Builder::new(Ipv4Addr::new(8, 8, 4, 4)).count(4).build()?;
    /// let result = pinger.run()?;
    /// println!("{}", result.summary(true));
    /// # Ok(())
    /// # }
    /// ```
    pub fn run(&self) -> Result<PingResult> {
        self.inner.run()
    }

    /// Spawn a probe session on a new thread.
    ///
    /// This method returns immediately with the [`Pinger`] and a handle to the
    /// thread, so it may be joined with [`JoinHandle::join`]. The result is
    /// also available from [`Pinger::snapshot`] once the session is complete.
    ///
    /// # Example
    ///
    /// ```no_run
    /// # fn main() -> anyhow::Result<()> {
    /// # use std::net::Ipv4Addr;
    /// use echoprobe_core::Builder;
    ///
    /// let (pinger, handle) = Builder::new(Ipv4Addr::new(8, 8, 4, 4)).build()?.spawn()?;
    /// let result = handle.join().unwrap()?;
    /// assert_eq!(result, pinger.snapshot());
    /// # Ok(())
    /// # }
    /// ```
    pub fn spawn(self) -> Result<(Self, JoinHandle<Result<PingResult>>)> {
        let pinger = self.clone();
        let handle = thread::Builder::new()
            .name(format!("pinger-{}", self.config().target))
            .spawn(move || pinger.run())
            .map_err(|err| Error::Other(err.to_string()))?;
        Ok((self, handle))
    }

    /// Take a snapshot of the result of the last completed session.
    ///
    /// This is an all zero result if no session has completed yet, or if the
    /// last session failed to start.
    #[must_use]
    pub fn snapshot(&self) -> PingResult {
        self.inner.snapshot()
    }

    /// The error which stopped the last session from starting, if any.
    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.inner.error()
    }

    /// Is a probe session in progress?
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.inner.is_active()
    }

    /// The configuration of the pinger.
    #[must_use]
    pub fn config(&self) -> &ProbeConfig {
        self.inner.config()
    }
}

mod inner {
    use crate::config::ProbeConfig;
    use crate::error::{Error, Result};
    use crate::net::channel::Channel;
    use crate::net::socket::Socket;
    use crate::net::SocketImpl;
    use crate::resolver::{DnsResolver, Resolver};
    use crate::result::PingResult;
    use crate::session::{Session, SessionConfig, SystemClock};
    use parking_lot::RwLock;
    use std::sync::atomic::{AtomicBool, Ordering};
    use tracing::instrument;

    #[derive(Debug, Default)]
    struct State {
        result: PingResult,
        error: Option<String>,
    }

    #[derive(Debug)]
    pub(super) struct PingerInner {
        config: ProbeConfig,
        active: AtomicBool,
        state: RwLock<State>,
    }

    impl PingerInner {
        pub(super) fn new(config: ProbeConfig) -> Self {
            Self {
                config,
                active: AtomicBool::new(false),
                state: RwLock::new(State::default()),
            }
        }

        #[instrument(skip_all, level = "trace")]
        pub(super) fn run(&self) -> Result<PingResult> {
            self.run_with::<SocketImpl, _>(&DnsResolver)
        }

        pub(super) fn snapshot(&self) -> PingResult {
            self.state.read().result.clone()
        }

        pub(super) fn error(&self) -> Option<String> {
            self.state.read().error.clone()
        }

        pub(super) fn is_active(&self) -> bool {
            self.active.load(Ordering::Acquire)
        }

        pub(super) const fn config(&self) -> &ProbeConfig {
            &self.config
        }

        pub(super) fn run_with<S: Socket, R: Resolver>(&self, resolver: &R) -> Result<PingResult> {
            let _guard = SessionGuard::acquire(&self.active)?;
            self.run_internal::<S, R>(resolver)
                .map_err(|err| self.handle_error(err))
        }

        #[instrument(skip_all, level = "trace")]
        fn run_internal<S: Socket, R: Resolver>(&self, resolver: &R) -> Result<PingResult> {
            self.config.validate()?;
            let target_addr = self.config.resolve_addr(resolver)?;
            let channel_config = self.config.channel_config(target_addr);
            let mut channel = Channel::<S>::connect(&channel_config)?;
            let session = Session::new(&self.make_session_config());
            let result = session.run(&mut channel, &SystemClock);
            *self.state.write() = State {
                result: result.clone(),
                error: None,
            };
            Ok(result)
        }

        fn handle_error(&self, err: Error) -> Error {
            tracing::warn!(%err, "session failed");
            *self.state.write() = State {
                result: PingResult::default(),
                error: Some(err.to_string()),
            };
            err
        }

        fn make_session_config(&self) -> SessionConfig {
            SessionConfig {
                count: self.config.count,
                total_timeout: self.config.total_timeout(),
            }
        }
    }

    /// Marks a session as in progress for as long as it is held.
    struct SessionGuard<'a> {
        active: &'a AtomicBool,
    }

    impl<'a> SessionGuard<'a> {
        fn acquire(active: &'a AtomicBool) -> Result<Self> {
            active
                .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
                .map_err(|_| Error::SessionActive)?;
            Ok(Self { active })
        }
    }

    impl Drop for SessionGuard<'_> {
        fn drop(&mut self) {
            self.active.store(false, Ordering::Release);
        }
    }

}
