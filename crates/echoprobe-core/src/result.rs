use crate::constants::MAX_PROBE_COUNT;
use arrayvec::ArrayVec;
use std::time::Duration;

/// The outcome of a probe session.
///
/// All times are round trip times in fractional milliseconds and are computed
/// only over the replies that were received. A session in which nothing was
/// received has all timing fields set to zero.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PingResult {
    transmitted: usize,
    received: usize,
    total_elapsed: Duration,
    min: f64,
    max: f64,
    mean: f64,
    std_dev: f64,
}

impl PingResult {
    /// The number of echo requests sent.
    #[must_use]
    pub fn transmitted(&self) -> usize {
        self.transmitted
    }

    /// The number of valid echo replies received.
    #[must_use]
    pub fn received(&self) -> usize {
        self.received
    }

    /// The number of echo requests which did not get a valid reply.
    #[must_use]
    pub fn timeout_count(&self) -> usize {
        self.transmitted.saturating_sub(self.received)
    }

    /// The percentage of echo requests which did not get a valid reply.
    ///
    /// This is zero if nothing was sent.
    #[must_use]
    pub fn percent_lost(&self) -> f64 {
        if self.transmitted == 0 {
            0_f64
        } else {
            self.timeout_count() as f64 / self.transmitted as f64 * 100_f64
        }
    }

    /// The wall clock duration of the session, including every failed and
    /// timed out attempt.
    #[must_use]
    pub fn total_elapsed(&self) -> Duration {
        self.total_elapsed
    }

    #[must_use]
    pub fn min(&self) -> f64 {
        self.min
    }

    #[must_use]
    pub fn max(&self) -> f64 {
        self.max
    }

    #[must_use]
    pub fn mean(&self) -> f64 {
        self.mean
    }

    /// The population standard deviation of the round trip times.
    #[must_use]
    pub fn std_dev(&self) -> f64 {
        self.std_dev
    }

    /// Is this result internally consistent?
    ///
    /// A session in which nothing was received is valid, use
    /// [`PingResult::is_success`] to distinguish it.
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.transmitted >= self.received
            && !self.total_elapsed.is_zero()
            && (self.received == 0 || (self.max >= self.min && self.mean > 0_f64))
    }

    /// Was at least one valid echo reply received?
    #[must_use]
    pub fn is_success(&self) -> bool {
        self.received > 0
    }

    /// A short text summary of the session.
    ///
    /// The first line reports the packet counts, the second line (only if
    /// `include_times` is set) reports the round trip times in whole
    /// milliseconds.
    #[must_use]
    pub fn summary(&self, include_times: bool) -> String {
        let packets = format!(
            "Packets: Sent = {}, Received = {}, Lost = {} ({}% loss)",
            self.transmitted,
            self.received,
            self.timeout_count(),
            self.percent_lost().trunc()
        );
        if include_times {
            format!(
                "{packets}\nTimes: Min = {}ms, Max = {}ms, Ave = {}ms, SD = {}ms",
                self.min.trunc(),
                self.max.trunc(),
                self.mean.trunc(),
                self.std_dev.trunc()
            )
        } else {
            packets
        }
    }
}

/// Accumulates the outcome of each probe of a session.
#[derive(Debug, Default)]
pub(crate) struct Aggregator {
    transmitted: usize,
    received: usize,
    min: Option<f64>,
    max: Option<f64>,
    sum: f64,
    times: ArrayVec<f64, MAX_PROBE_COUNT>,
}

impl Aggregator {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn record_sent(&mut self) {
        self.transmitted += 1;
    }

    /// Record the round trip time, in milliseconds, of a valid reply.
    pub(crate) fn record_reply(&mut self, rtt_ms: f64) {
        if self.times.try_push(rtt_ms).is_err() {
            tracing::warn!(rtt_ms, "too many replies, discarding round trip time");
            return;
        }
        self.received += 1;
        self.sum += rtt_ms;
        self.min = Some(self.min.map_or(rtt_ms, |min| min.min(rtt_ms)));
        self.max = Some(self.max.map_or(rtt_ms, |max| max.max(rtt_ms)));
    }

    /// Compute the final statistics.
    pub(crate) fn finish(self, total_elapsed: Duration) -> PingResult {
        let (mean, std_dev) = if self.times.is_empty() {
            (0_f64, 0_f64)
        } else {
            let n = self.times.len() as f64;
            let mean = self.sum / n;
            let variance = self
                .times
                .iter()
                .map(|time| (time - mean).powi(2))
                .sum::<f64>()
                / n;
            let std_dev = if variance > 0_f64 {
                variance.sqrt()
            } else {
                0_f64
            };
            (mean, std_dev)
        };
        PingResult {
            transmitted: self.transmitted,
            received: self.received,
            total_elapsed,
            min: self.min.unwrap_or_default(),
            max: self.max.unwrap_or_default(),
            mean,
            std_dev,
        }
    }
}
