use std::net::SocketAddr;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpListener,
};

/// Binds an in-process TCP peer that plays out a fixed script: for each
/// `(expect, reply)` pair it reads exactly `expect.len()` bytes, asserts
/// they equal `expect`, then writes `reply` (if non-empty) before moving on
/// to the next pair. Mirrors the teacher's `echo_server`/`runtime` test
/// harness shape, but scripts exact proxy-protocol bytes instead of echoing.
pub async fn mock_peer(script: Vec<(Vec<u8>, Vec<u8>)>) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0").await.expect("bind mock peer");
    let addr = listener.local_addr().expect("local_addr");

    tokio::spawn(async move {
        let (mut socket, _) = listener.accept().await.expect("accept");
        for (expect, reply) in script {
            let mut buf = vec![0u8; expect.len()];
            socket.read_exact(&mut buf).await.expect("read script step");
            assert_eq!(buf, expect, "unexpected bytes from client");
            if !reply.is_empty() {
                socket.write_all(&reply).await.expect("write script reply");
            }
        }
    });

    addr
}

/// A resolver that panics if invoked. Every test scenario here either uses
/// an IPv4 literal destination or `remote_dns = true`, so the resolver
/// collaborator should never actually be consulted.
pub struct UnreachableResolver;

#[async_trait::async_trait]
impl hopchain::Resolver for UnreachableResolver {
    async fn resolve_ipv4(&self, hostname: &str) -> hopchain::Result<std::net::Ipv4Addr> {
        panic!("resolver should not have been called for {hostname}");
    }
}

/// A resolver that always answers with a fixed address, for scenarios that
/// exercise local resolution (`remote_dns = false` with a hostname
/// destination).
pub struct StubResolver(pub std::net::Ipv4Addr);

#[async_trait::async_trait]
impl hopchain::Resolver for StubResolver {
    async fn resolve_ipv4(&self, _hostname: &str) -> hopchain::Result<std::net::Ipv4Addr> {
        Ok(self.0)
    }
}
