use crate::{chain, error::Result, model::Chain, resolver::Resolver, tunnel::TunnelSocket};

/// A reusable `(Chain, Resolver)` pair for callers who don't want to thread
/// both through every call site. Holds no mutable state.
#[derive(Debug, Clone)]
pub struct Client<R> {
    chain: Chain,
    resolver: R,
}

impl<R: Resolver> Client<R> {
    pub fn new(chain: Chain, resolver: R) -> Self {
        Client { chain, resolver }
    }

    pub async fn connect_with_socket<S>(&self, socket: S, dest_host: &str, dest_port: u16) -> Result<TunnelSocket<S>>
    where S: crate::io::AsyncSocket + Unpin {
        chain::connect_with_socket(&self.chain, socket, dest_host, dest_port, &self.resolver).await
    }
}

#[cfg(feature = "tokio")]
impl<R: Resolver> Client<R> {
    pub async fn connect(&self, dest_host: &str, dest_port: u16) -> Result<TunnelSocket<tokio::net::TcpStream>> {
        chain::connect(&self.chain, dest_host, dest_port, &self.resolver).await
    }
}

#[cfg(feature = "tokio")]
impl Client<crate::resolver::TokioResolver> {
    pub fn with_default_resolver(chain: Chain) -> Self {
        Client::new(chain, crate::resolver::TokioResolver)
    }
}
