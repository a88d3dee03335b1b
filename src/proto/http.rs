use super::Negotiated;
use crate::{
    error::{Error, Result},
    io::{AsyncSocket, AsyncSocketExt},
    model::{PeerAddr, ProxyStep},
    resolver::Resolver,
};
use std::net::{Ipv4Addr, SocketAddrV4};

const MAX_RESPONSE_SIZE: usize = 8192;

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
    let (addr, peer) = if step.remote_dns {
        (next_host.to_owned(), PeerAddr::Domain(next_host.to_owned(), next_port))
    } else if let Ok(ip) = next_host.parse::<Ipv4Addr>() {
        (ip.to_string(), PeerAddr::Ip(ip, next_port))
    } else {
        let resolved = resolver.resolve_ipv4(next_host).await?;
        (resolved.to_string(), PeerAddr::Ip(resolved, next_port))
    };

    // The CONNECT target reflects whatever address we actually decided to
    // send (literal, hostname, or locally-resolved IP); the Host header
    // always carries the pre-resolution host name when one was available,
    // since a resolved-then-connected-by-IP request still needs the
    // original virtual-host name for the origin server.
    let connect_target = format!("{}:{}", addr, next_port);
    let host_header = format!("{}:{}", next_host, next_port);
    let request = format!("CONNECT {connect_target} HTTP/1.1\r\nHost: {host_header}\r\n\r\n");
    socket.write_all(request.as_bytes()).await?;

    let response = read_connect_response(socket).await?;
    let code = parse_status_line(&response)?;

    if code.0 != 200 {
        return Err(Error::HttpError {
            code: code.0,
            reason: code.1,
        });
    }

    Ok(Negotiated {
        bound: SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0),
        peer,
    })
}

async fn read_connect_response<S: AsyncSocket + Unpin>(socket: &mut S) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let mut chunk = [0u8; 1];
    loop {
        if buf.len() >= MAX_RESPONSE_SIZE {
            return Err(Error::GeneralProxy {
                code: 0,
                msg: "HTTP CONNECT response too large",
            });
        }
        let n = socket.read_exact(&mut chunk).await.map_err(|_| Error::GeneralProxy {
            code: 0,
            msg: "connection closed unexpectedly",
        })?;
        let _ = n;
        buf.push(chunk[0]);
        if buf.ends_with(b"\r\n\r\n") {
            break;
        }
    }
    Ok(buf)
}

fn parse_status_line(response: &[u8]) -> Result<(u16, String)> {
    let text = std::str::from_utf8(response).map_err(|_| Error::GeneralProxy {
        code: 0,
        msg: "invalid data",
    })?;
    let status_line = text.lines().next().ok_or(Error::GeneralProxy {
        code: 0,
        msg: "invalid data",
    })?;

    let mut parts = status_line.splitn(3, ' ');
    let version = parts.next().ok_or(Error::GeneralProxy {
        code: 0,
        msg: "invalid data",
    })?;
    if version != "HTTP/1.0" && version != "HTTP/1.1" {
        return Err(Error::GeneralProxy {
            code: 0,
            msg: "invalid data",
        });
    }
    let code = parts
        .next()
        .and_then(|c| c.parse::<u16>().ok())
        .ok_or(Error::GeneralProxy {
            code: 0,
            msg: "invalid data",
        })?;
    let reason = parts.next().unwrap_or("").trim_end().to_owned();

    Ok((code, reason))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::test_support::{MemSocket, StubResolver};

    #[tokio::test]
    async fn remote_dns_request_is_byte_exact() {
        let reply = b"HTTP/1.1 200 OK\r\n\r\n".to_vec();
        let mut socket = MemSocket::new(reply);
        let step = ProxyStep::http("proxy", 8080).with_remote_dns(true);

        let negotiated = negotiate(&mut socket, &step, "example.com", 443, &StubResolver(Ipv4Addr::new(1, 1, 1, 1)))
            .await
            .unwrap();

        let expect = b"CONNECT example.com:443 HTTP/1.1\r\nHost: example.com:443\r\n\r\n".to_vec();
        assert_eq!(socket.written, expect);
        assert_eq!(negotiated.peer, PeerAddr::Domain("example.com".to_owned(), 443));
        assert_eq!(negotiated.bound, SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0));
    }

    #[tokio::test]
    async fn local_resolution_reports_resolved_literal_as_peer() {
        let reply = b"HTTP/1.1 200 OK\r\n\r\n".to_vec();
        let mut socket = MemSocket::new(reply);
        let step = ProxyStep::http("proxy", 8080);
        let resolved = Ipv4Addr::new(203, 0, 113, 9);

        let negotiated = negotiate(&mut socket, &step, "example.com", 443, &StubResolver(resolved))
            .await
            .unwrap();

        let expect = b"CONNECT 203.0.113.9:443 HTTP/1.1\r\nHost: example.com:443\r\n\r\n".to_vec();
        assert_eq!(socket.written, expect);
        assert_eq!(negotiated.peer, PeerAddr::Ip(resolved, 443));
    }

    #[tokio::test]
    async fn non_200_status_surfaces_http_error() {
        let reply = b"HTTP/1.1 407 Proxy Authentication Required\r\n\r\n".to_vec();
        let mut socket = MemSocket::new(reply);
        let step = ProxyStep::http("proxy", 8080).with_remote_dns(true);

        let err = negotiate(&mut socket, &step, "example.com", 443, &StubResolver(Ipv4Addr::new(1, 1, 1, 1)))
            .await
            .unwrap_err();

        match err {
            Error::HttpError { code, reason } => {
                assert_eq!(code, 407);
                assert_eq!(reason, "Proxy Authentication Required");
            }
            other => panic!("expected HttpError, got {other:?}"),
        }
    }
}
