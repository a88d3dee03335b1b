//! Per-protocol negotiators. Each module exposes a single `negotiate`
//! function sharing the same shape: given an already-open socket to the
//! current hop and the address of the *next* hop, drive that hop's
//! handshake to completion and report what it bound/addressed.
mod http;
mod socks4;
mod socks5;
#[cfg(test)]
pub(crate) mod test_support;

use crate::{
    error::{Error, Result},
    io::AsyncSocket,
    model::{PeerAddr, ProxyKind, ProxyStep},
    resolver::Resolver,
};
use std::net::SocketAddrV4;

pub(crate) struct Negotiated {
    pub bound: SocketAddrV4,
    pub peer: PeerAddr,
}

pub(crate) async fn negotiate<S, R>(
    socket: &mut S,
    step: &ProxyStep,
    next_host: &str,
    next_port: u16,
    resolver: &R,
) -> Result<Negotiated>
where
    S: AsyncSocket + Unpin,
    R: Resolver,
{
    match step.kind {
        ProxyKind::Socks5 => socks5::negotiate(socket, step, next_host, next_port, resolver).await,
        ProxyKind::Socks4 => socks4::negotiate(socket, step, next_host, next_port, resolver).await,
        ProxyKind::Http => http::negotiate(socket, step, next_host, next_port, resolver).await,
        ProxyKind::None => Err(Error::GeneralProxy {
            code: 0,
            msg: "bad proxy type",
        }),
    }
}
