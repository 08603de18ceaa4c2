//! Echoprobe - an `ICMPv4` echo probing library.
//!
//! This crate sends a bounded sequence of `ICMPv4` echo requests to a single
//! target over a raw socket, validates the echo replies and computes round
//! trip time statistics (minimum, maximum, mean and population standard
//! deviation) for the session.
//!
//! A session is bounded by two timeouts: the time to wait for each reply and
//! the time budget of the whole session. A session which loses some or all of
//! its probes is not an error, the loss is reported in the [`PingResult`].
//!
//! # Example
//!
//! The following example sends four echo requests to a numeric address and
//! prints a summary of the session:
//!
//! ```no_run
//! # fn main() -> anyhow::Result<()> {
//! # use std::net::Ipv4Addr;
//! use echoprobe_core::Builder;
//!
//! let result = Builder::new(Ipv4Addr::new(1, 1, 1, 1)).build()?.run()?;
//! println!("{}", result.summary(true));
//! # Ok(())
//! # }
//! ```
//!
//! The following example resolves a host name at the start of the session and
//! uses a custom receive timeout and session budget:
//!
//! ```no_run
//! # fn main() -> anyhow::Result<()> {
//! # use std::time::Duration;
//! use echoprobe_core::{Builder, Target};
//!
//! let target = Target::Hostname(String::from("dns.google"));
//! let pinger = Builder::new(target)
//!     .count(10)
//!     .receive_timeout(Duration::from_millis(250))
//!     .total_timeout(Duration::from_secs(3))
//!     .build()?;
//! let result = pinger.run()?;
//! if result.is_success() {
//!     println!("{:.2} ms", result.mean());
//! }
//! # Ok(())
//! # }
//! ```
//!
//! # See Also
//!
//! - [`Builder`] - Build a [`Pinger`].
//! - [`Pinger::run`] - Run a probe session on the current thread.
//! - [`Pinger::spawn`] - Run a probe session on a new thread.
//! - [`ReachabilityMonitor`] - Periodically check that a target is reachable.
#![warn(clippy::all, clippy::pedantic, clippy::nursery, rust_2018_idioms)]
#![allow(
    clippy::module_name_repetitions,
    clippy::option_if_let_else,
    clippy::missing_const_for_fn,
    clippy::cast_possible_truncation,
    clippy::missing_errors_doc,
    clippy::cast_precision_loss
)]
#![deny(unsafe_code)]

mod builder;
mod codec;
mod config;
mod constants;
mod error;
pub mod monitor;
mod net;
mod pinger;
mod resolver;
mod result;
mod session;
mod types;

pub use builder::Builder;
pub use codec::{build_echo_request, is_echo_reply, validate_echo_reply, ECHO_REQUEST_SIZE};
pub use config::{defaults, ProbeConfig, Target};
pub use constants::{ECHO_IDENTIFIER, ECHO_PAYLOAD_SIZE, MAX_PROBE_COUNT};
pub use error::{Error, Result};
pub use monitor::ReachabilityMonitor;
pub use pinger::Pinger;
pub use resolver::{DnsResolver, Resolver};
pub use result::PingResult;
pub use types::Sequence;
