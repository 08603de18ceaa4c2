use crate::error::{Error, Result};
use std::net::{IpAddr, Ipv4Addr};
use tracing::instrument;

/// Resolve host names to `IPv4` addresses.
#[cfg_attr(test, mockall::automock)]
pub trait Resolver {
    /// Resolve `hostname` to the first `IPv4` address it has.
    fn lookup(&self, hostname: &str) -> Result<Ipv4Addr>;
}

/// A [`Resolver`] which uses the system resolver (`getaddrinfo`).
#[derive(Debug, Default, Clone, Copy)]
pub struct DnsResolver;

impl Resolver for DnsResolver {
    #[instrument(skip(self), level = "trace")]
    fn lookup(&self, hostname: &str) -> Result<Ipv4Addr> {
        let addrs = dns_lookup::lookup_host(hostname).map_err(|err| {
            tracing::warn!(hostname, %err, "cannot resolve host");
            Error::UnresolvedTarget(hostname.to_string(), err.to_string())
        })?;
        first_ipv4(&addrs).ok_or_else(|| {
            tracing::warn!(hostname, "cannot resolve host: no IPv4 address");
            Error::UnresolvedTarget(hostname.to_string(), String::from("no IPv4 address"))
        })
    }
}

fn first_ipv4(addrs: &[IpAddr]) -> Option<Ipv4Addr> {
    addrs.iter().find_map(|addr| match addr {
        IpAddr::V4(addr) => Some(*addr),
        IpAddr::V6(_) => None,
    })
}
