use crate::model::PeerAddr;
use std::{
    net::SocketAddrV4,
    ops::{Deref, DerefMut},
    pin::Pin,
    task::{Context, Poll},
};

/// A socket that has finished the chain handshake and is now a transparent
/// byte stream to the destination.
///
/// `TunnelSocket` owns its underlying transport exclusively; dropping it
/// drops (and so closes) the socket. It is only ever handed back to a
/// caller once every hop has accepted its CONNECT — a partially negotiated
/// socket is never observable outside the chain driver.
pub struct TunnelSocket<S> {
    pub(crate) socket: S,
    pub(crate) bound: SocketAddrV4,
    pub(crate) peer: PeerAddr,
    pub(crate) proxy_addr: std::net::SocketAddr,
}

impl<S> TunnelSocket<S> {
    /// The address/port the terminal proxy bound locally on our behalf.
    /// `0.0.0.0:0` for HTTP CONNECT, which reports no bound address.
    pub fn bound_address(&self) -> SocketAddrV4 {
        self.bound
    }

    /// The destination as the terminal proxy was finally told to reach.
    pub fn peer_address(&self) -> &PeerAddr {
        &self.peer
    }

    /// The transport-layer peer of the underlying socket, i.e. the first hop.
    pub fn proxy_address(&self) -> std::net::SocketAddr {
        self.proxy_addr
    }

    pub fn into_inner(self) -> S {
        self.socket
    }

    pub fn get_ref(&self) -> &S {
        &self.socket
    }

    pub fn get_mut(&mut self) -> &mut S {
        &mut self.socket
    }
}

impl<S> Deref for TunnelSocket<S> {
    type Target = S;

    fn deref(&self) -> &Self::Target {
        &self.socket
    }
}

impl<S> DerefMut for TunnelSocket<S> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.socket
    }
}

#[cfg(feature = "tokio")]
impl<S> tokio::io::AsyncRead for TunnelSocket<S>
where S: tokio::io::AsyncRead + Unpin
{
    fn poll_read(
        mut self: Pin<&mut Self>,
        cx: &mut Context<'_>,
        buf: &mut tokio::io::ReadBuf<'_>,
    ) -> Poll<std::io::Result<()>> {
        tokio::io::AsyncRead::poll_read(Pin::new(&mut self.socket), cx, buf)
    }
}

#[cfg(feature = "tokio")]
impl<S> tokio::io::AsyncWrite for TunnelSocket<S>
where S: tokio::io::AsyncWrite + Unpin
{
    fn poll_write(mut self: Pin<&mut Self>, cx: &mut Context<'_>, buf: &[u8]) -> Poll<std::io::Result<usize>> {
        tokio::io::AsyncWrite::poll_write(Pin::new(&mut self.socket), cx, buf)
    }

    fn poll_flush(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        tokio::io::AsyncWrite::poll_flush(Pin::new(&mut self.socket), cx)
    }

    fn poll_shutdown(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<std::io::Result<()>> {
        tokio::io::AsyncWrite::poll_shutdown(Pin::new(&mut self.socket), cx)
    }
}
