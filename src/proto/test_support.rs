//! Shared scaffolding for the negotiator unit tests: an in-memory duplex
//! socket (no real I/O, no runtime dependency) and a resolver stub that
//! actually answers instead of panicking.
use crate::{error::Result, io::AsyncSocket, resolver::Resolver};
use async_trait::async_trait;
use std::{
    io::{Cursor, Read, Result as IoResult},
    net::Ipv4Addr,
    pin::Pin,
    task::{Context, Poll},
};

/// Reads come from a fixed preloaded script; writes accumulate into `written`
/// so a test can assert on the exact bytes a negotiator sent.
pub(crate) struct MemSocket {
    read: Cursor<Vec<u8>>,
    pub(crate) written: Vec<u8>,
}

impl MemSocket {
    pub(crate) fn new(scripted_reply: Vec<u8>) -> Self {
        MemSocket {
            read: Cursor::new(scripted_reply),
            written: Vec::new(),
        }
    }
}

impl AsyncSocket for MemSocket {
    fn poll_read(mut self: Pin<&mut Self>, _cx: &mut Context<'_>, buf: &mut [u8]) -> Poll<IoResult<usize>> {
        let n = Read::read(&mut self.read, buf).expect("in-memory read cannot fail");
        Poll::Ready(Ok(n))
    }

    fn poll_write(mut self: Pin<&mut Self>, _cx: &mut Context<'_>, buf: &[u8]) -> Poll<IoResult<usize>> {
        self.written.extend_from_slice(buf);
        Poll::Ready(Ok(buf.len()))
    }
}

/// Always resolves to the same address instead of panicking, for the
/// "resolution happened locally" branch of each negotiator.
pub(crate) struct StubResolver(pub(crate) Ipv4Addr);

#[async_trait]
impl Resolver for StubResolver {
    async fn resolve_ipv4(&self, _hostname: &str) -> Result<Ipv4Addr> {
        Ok(self.0)
    }
}
