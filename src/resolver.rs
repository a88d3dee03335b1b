use crate::error::{Error, Result};
use async_trait::async_trait;
use std::net::Ipv4Addr;

/// Resolves host names to IPv4 addresses on behalf of a negotiator when a
/// hop is not configured to forward resolution to the proxy.
///
/// Modeled as an async trait, not a `Stream`-returning one, since there is
/// exactly one answer to wait for per call.
#[async_trait]
pub trait Resolver: Send + Sync {
    async fn resolve_ipv4(&self, hostname: &str) -> Result<Ipv4Addr>;
}

/// Default resolver backed by the host's `tokio` async DNS lookup.
#[cfg(feature = "tokio")]
#[derive(Debug, Default, Clone, Copy)]
pub struct TokioResolver;

#[cfg(feature = "tokio")]
#[async_trait]
impl Resolver for TokioResolver {
    async fn resolve_ipv4(&self, hostname: &str) -> Result<Ipv4Addr> {
        let addrs = tokio::net::lookup_host((hostname, 0))
            .await
            .map_err(|_| Error::NameResolution {
                hostname: hostname.to_owned(),
            })?;
        addrs
            .filter_map(|addr| match addr.ip() {
                std::net::IpAddr::V4(ip) => Some(ip),
                std::net::IpAddr::V6(_) => None,
            })
            .next()
            .ok_or_else(|| Error::NameResolution {
                hostname: hostname.to_owned(),
            })
    }
}
