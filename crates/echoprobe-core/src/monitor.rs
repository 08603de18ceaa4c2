use crate::error::{Error, Result};
use crate::result::PingResult;
use crate::Pinger;
use parking_lot::{Condvar, Mutex};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;
use std::thread::JoinHandle;
use std::time::Duration;

/// Default values for the reachability monitor.
pub mod defaults {
    use std::net::Ipv4Addr;
    use std::time::Duration;

    /// The default target probed by the monitor.
    pub const DEFAULT_TARGET: Ipv4Addr = Ipv4Addr::new(8, 8, 4, 4);

    /// The default number of echo requests per check.
    pub const DEFAULT_COUNT: u8 = 4;

    /// The default time to wait for each echo reply.
    pub const DEFAULT_RECEIVE_TIMEOUT: Duration = Duration::from_millis(2000);

    /// The default delay between the end of one check and the start of the next.
    pub const DEFAULT_INTERVAL: Duration = Duration::from_secs(10);
}

/// Something which can run a probe session on demand.
pub(crate) trait Probe {
    fn probe(&self) -> Result<PingResult>;
}

impl Probe for Pinger {
    fn probe(&self) -> Result<PingResult> {
        self.run()
    }
}

/// Periodically probe a target from a background thread and record whether it
/// is reachable.
///
/// The target is reachable if the last check received at least one echo
/// reply. It is considered unreachable until the first check completes.
///
/// # Example
///
/// ```no_run
/// # fn main() -> anyhow::Result<()> {
/// use echoprobe_core::monitor::defaults;
/// use echoprobe_core::{Builder, ReachabilityMonitor};
///
/// let pinger = Builder::new(defaults::DEFAULT_TARGET)
///     .count(defaults::DEFAULT_COUNT)
///     .receive_timeout(defaults::DEFAULT_RECEIVE_TIMEOUT)
///     .build()?;
/// let monitor = ReachabilityMonitor::spawn(pinger, defaults::DEFAULT_INTERVAL)?;
/// std::thread::sleep(std::time::Duration::from_secs(30));
/// println!("reachable: {}", monitor.is_reachable());
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct ReachabilityMonitor {
    shared: Arc<Shared>,
    handle: Option<JoinHandle<()>>,
}

#[derive(Debug, Default)]
struct Shared {
    reachable: AtomicBool,
    last_result: Mutex<Option<PingResult>>,
    stopped: Mutex<bool>,
    wakeup: Condvar,
}

impl ReachabilityMonitor {
    /// Start monitoring, running a probe session with `pinger` every `interval`.
    pub fn spawn(pinger: Pinger, interval: Duration) -> Result<Self> {
        Self::spawn_with(pinger, interval, |_| ())
    }

    /// Start monitoring and call `func` with the result of every check.
    ///
    /// The function is called on the monitor thread after the reachability
    /// state has been updated.
    pub fn spawn_with<F: Fn(&PingResult) + Send + 'static>(
        pinger: Pinger,
        interval: Duration,
        func: F,
    ) -> Result<Self> {
        Self::spawn_probe(pinger, interval, func)
    }

    pub(crate) fn spawn_probe<P, F>(probe: P, interval: Duration, func: F) -> Result<Self>
    where
        P: Probe + Send + 'static,
        F: Fn(&PingResult) + Send + 'static,
    {
        let shared = Arc::new(Shared::default());
        let thread_shared = shared.clone();
        let handle = thread::Builder::new()
            .name(String::from("reachability-monitor"))
            .spawn(move || run_checks(&probe, interval, &thread_shared, func))
            .map_err(|err| Error::Other(err.to_string()))?;
        Ok(Self {
            shared,
            handle: Some(handle),
        })
    }

    /// Was the target reachable at the last check?
    #[must_use]
    pub fn is_reachable(&self) -> bool {
        self.shared.reachable.load(Ordering::Acquire)
    }

    /// The result of the last check, if any check has completed.
    #[must_use]
    pub fn last_result(&self) -> Option<PingResult> {
        self.shared.last_result.lock().clone()
    }

    /// Stop monitoring.
    ///
    /// Any wait for the next check is interrupted. A check in progress is
    /// allowed to complete, this method blocks until it does.
    pub fn stop(&mut self) {
        *self.shared.stopped.lock() = true;
        self.shared.wakeup.notify_all();
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                tracing::warn!("reachability monitor thread panicked");
            }
        }
    }
}

impl Drop for ReachabilityMonitor {
    fn drop(&mut self) {
        self.stop();
    }
}

fn run_checks<P: Probe, F: Fn(&PingResult)>(
    probe: &P,
    interval: Duration,
    shared: &Shared,
    func: F,
) {
    loop {
        let result = probe.probe().unwrap_or_else(|err| {
            tracing::warn!(%err, "reachability check failed");
            PingResult::default()
        });
        let reachable = result.is_success();
        let previous = shared.reachable.swap(reachable, Ordering::AcqRel);
        if reachable {
            tracing::info!(changed = reachable != previous, "connected");
        } else {
            tracing::info!(changed = reachable != previous, "not connected");
        }
        *shared.last_result.lock() = Some(result.clone());
        func(&result);
        let mut stopped = shared.stopped.lock();
        if !*stopped {
            let _ = shared.wakeup.wait_for(&mut stopped, interval);
        }
        if *stopped {
            break;
        }
    }
}
