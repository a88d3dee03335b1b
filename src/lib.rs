//! Multi-hop proxy tunneling.
//!
//! Given an ordered [`Chain`] of [`ProxyStep`]s and a final destination, this
//! crate opens a transport connection to the first hop and drives each
//! hop's handshake (SOCKS4/4A, SOCKS5, or HTTP CONNECT) until the last one
//! has accepted the tunnel, handing back a [`TunnelSocket`] that is a plain
//! bidirectional byte stream from then on.
//!
//! Chain construction, argument parsing, and the relay loop that follows a
//! successful handshake are left to the caller.

mod chain;
mod client;
mod error;
pub mod io;
mod model;
mod proto;
mod resolver;
mod tunnel;
mod wire;

#[cfg(feature = "tokio")]
pub use chain::connect;
pub use chain::connect_with_socket;
pub use client::Client;
pub use error::{Error, Result};
pub use model::{Chain, PeerAddr, ProxyKind, ProxyStep};
#[cfg(feature = "tokio")]
pub use resolver::TokioResolver;
pub use resolver::Resolver;
pub use tunnel::TunnelSocket;
