use crate::error::Result;
use crate::net::{EchoResponse, Network};
use crate::result::{Aggregator, PingResult};
use crate::types::Sequence;
use std::thread;
use std::time::{Duration, Instant};
use tracing::instrument;

/// The time source used to measure round trips and the session budget.
#[cfg_attr(test, mockall::automock)]
pub trait Clock {
    fn now(&self) -> Instant;
}

/// The monotonic system clock.
#[derive(Debug, Copy, Clone, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// Probe session configuration.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct SessionConfig {
    pub count: u8,
    pub total_timeout: Duration,
}

/// A single bounded run of echo probes against one target.
#[derive(Debug, Clone)]
pub struct Session {
    config: SessionConfig,
}

impl Session {
    #[instrument(skip_all, level = "trace")]
    pub fn new(config: &SessionConfig) -> Self {
        tracing::debug!(?config);
        Self { config: *config }
    }

    /// Send `count` echo requests, one at a time, and wait for the reply to each.
    ///
    /// The session ends early if a send fails, if the network fails with
    /// anything other than a receive timeout, or if the total timeout is
    /// exceeded. In every case the result of the probes made so far is
    /// returned.
    #[instrument(skip(self, network, clock), level = "trace")]
    pub fn run<N: Network, C: Clock>(&self, network: &mut N, clock: &C) -> PingResult {
        let start = clock.now();
        let elapsed = || clock.now().saturating_duration_since(start);
        let mut aggregator = Aggregator::new();
        let mut sequence = Sequence(1);
        while sequence <= Sequence(u16::from(self.config.count)) {
            if let Err(err) = network.send_echo_request(sequence) {
                tracing::warn!(%err, ?sequence, "failed to send");
                break;
            }
            aggregator.record_sent();
            if let Err(err) = Self::recv_reply(network, clock, sequence, &mut aggregator) {
                tracing::warn!(%err, ?sequence, "bad receive");
                break;
            }
            if elapsed() > self.config.total_timeout {
                if sequence < Sequence(u16::from(self.config.count)) {
                    tracing::warn!(
                        total_timeout = ?self.config.total_timeout,
                        ?sequence,
                        "timed out overall"
                    );
                }
                break;
            }
            thread::yield_now();
            sequence += Sequence(1);
        }
        let result = aggregator.finish(elapsed());
        tracing::debug!(?result);
        result
    }

    fn recv_reply<N: Network, C: Clock>(
        network: &mut N,
        clock: &C,
        sequence: Sequence,
        aggregator: &mut Aggregator,
    ) -> Result<()> {
        let before = clock.now();
        match network.recv_echo_reply(sequence)? {
            EchoResponse::Reply(addr) => {
                let rtt = clock.now().saturating_duration_since(before);
                if rtt.is_zero() {
                    tracing::warn!(?sequence, "bad time calculation");
                } else {
                    let rtt_ms = rtt.as_secs_f64() * 1000_f64;
                    tracing::debug!(?sequence, ?addr, rtt_ms, "reply");
                    aggregator.record_reply(rtt_ms);
                }
            }
            EchoResponse::Timeout => tracing::debug!(?sequence, "no reply"),
            EchoResponse::Rejected => tracing::debug!(?sequence, "no valid reply"),
        }
        Ok(())
    }
}
