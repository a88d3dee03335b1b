use crate::{
    error::{Error, Result},
    io::AsyncSocket,
    model::{Chain, ProxyStep},
    proto,
    resolver::Resolver,
    tunnel::TunnelSocket,
};

/// Drives `chain` hop by hop over an already-open `socket` (connected to the
/// chain's first hop, or directly to `dest_host`/`dest_port` if `chain` is
/// empty) until the final destination has accepted the tunnel.
pub async fn connect_with_socket<S, R>(
    chain: &Chain,
    mut socket: S,
    dest_host: &str,
    dest_port: u16,
    resolver: &R,
) -> Result<TunnelSocket<S>>
where
    S: AsyncSocket + Unpin,
    R: Resolver,
{
    if dest_host.is_empty() {
        return Err(Error::GeneralProxy {
            code: 0,
            msg: "bad input",
        });
    }

    let mut full = chain.0.clone();
    full.push(ProxyStep::sentinel(dest_host, dest_port));

    let mut bound = std::net::SocketAddrV4::new(std::net::Ipv4Addr::UNSPECIFIED, 0);
    let mut peer = crate::model::PeerAddr::Domain(dest_host.to_owned(), dest_port);

    for i in 0..full.len() - 1 {
        let step = &full[i];
        let next = &full[i + 1];
        let negotiated = proto::negotiate(&mut socket, step, &next.host, next.port_or_default(), resolver).await?;
        bound = negotiated.bound;
        peer = negotiated.peer;
    }

    // `S` is an opaque `AsyncSocket`; we have no generic way to ask it for
    // its peer address, so `proxy_address()` reads as unspecified unless the
    // caller came through `connect`, which fills it in from the `TcpStream`
    // it opened itself.
    Ok(TunnelSocket {
        socket,
        bound,
        peer,
        proxy_addr: std::net::SocketAddr::from(([0, 0, 0, 0], 0)),
    })
}

#[cfg(feature = "tokio")]
/// Opens a real TCP connection to the chain's first hop (or directly to the
/// destination if the chain is empty) and drives the handshake.
pub async fn connect<R>(
    chain: &Chain,
    dest_host: &str,
    dest_port: u16,
    resolver: &R,
) -> Result<TunnelSocket<tokio::net::TcpStream>>
where R: Resolver {
    let (first_host, first_port) = match chain.0.first() {
        Some(step) => (step.host.clone(), step.port_or_default()),
        None => (dest_host.to_owned(), dest_port),
    };

    let socket = tokio::net::TcpStream::connect((first_host.as_str(), first_port))
        .await
        .map_err(|_| Error::GeneralProxy {
            code: 0,
            msg: "bad input",
        })?;
    let proxy_addr = socket.peer_addr()?;

    let mut tunnel = connect_with_socket(chain, socket, dest_host, dest_port, resolver).await?;
    tunnel.proxy_addr = proxy_addr;
    Ok(tunnel)
}
