use super::Negotiated;
use crate::{
    error::{Error, Result},
    io::{AsyncSocket, AsyncSocketExt},
    model::{PeerAddr, ProxyStep},
    resolver::Resolver,
    wire::{is_ipv4_literal, u16_be},
};
use std::net::{Ipv4Addr, SocketAddrV4};

const SOCKS5_VERSION: u8 = 0x05;
const METHOD_NO_AUTH: u8 = 0x00;
const METHOD_USER_PASS: u8 = 0x02;
const METHOD_NO_ACCEPTABLE: u8 = 0xFF;
const AUTH_VERSION: u8 = 0x01;
const CMD_CONNECT: u8 = 0x01;
const ATYP_IPV4: u8 = 0x01;
const ATYP_DOMAIN: u8 = 0x03;
const ATYP_IPV6: u8 = 0x04;

fn reply_msg(code: u8) -> &'static str {
    match code {
        0x01 => "general SOCKS server failure",
        0x02 => "connection not allowed by ruleset",
        0x03 => "network unreachable",
        0x04 => "host unreachable",
        0x05 => "connection refused",
        0x06 => "TTL expired",
        0x07 => "command not supported",
        0x08 => "address type not supported",
        _ => "unknown error",
    }
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
    let has_creds = step.user.is_some() && step.password.is_some();
    method_offer(socket, has_creds).await?;
    let chosen = method_select(socket).await?;

    match chosen {
        METHOD_NO_AUTH => {}
        METHOD_USER_PASS => password_auth(socket, step).await?,
        METHOD_NO_ACCEPTABLE => {
            return Err(Error::Socks5AuthError {
                code: 2,
                msg: "all offered methods rejected",
            })
        }
        _ => {
            return Err(Error::GeneralProxy {
                code: 0,
                msg: "invalid data",
            })
        }
    }

    connect_request(socket, step, next_host, next_port, resolver).await
}

async fn method_offer<S: AsyncSocket + Unpin>(socket: &mut S, has_creds: bool) -> Result<()> {
    if has_creds {
        socket
            .write_all(&[SOCKS5_VERSION, 0x02, METHOD_NO_AUTH, METHOD_USER_PASS])
            .await?;
    } else {
        socket.write_all(&[SOCKS5_VERSION, 0x01, METHOD_NO_AUTH]).await?;
    }
    Ok(())
}

async fn method_select<S: AsyncSocket + Unpin>(socket: &mut S) -> Result<u8> {
    let mut buf = [0u8; 2];
    socket.read_exact(&mut buf).await?;
    if buf[0] != SOCKS5_VERSION {
        return Err(Error::GeneralProxy {
            code: 0,
            msg: "invalid data",
        });
    }
    Ok(buf[1])
}

async fn password_auth<S: AsyncSocket + Unpin>(socket: &mut S, step: &ProxyStep) -> Result<()> {
    let user = step.user.as_deref().unwrap_or(&[]);
    let pass = step.password.as_deref().unwrap_or(&[]);
    if user.len() > 255 || pass.len() > 255 {
        return Err(Error::GeneralProxy {
            code: 0,
            msg: "username or password too long",
        });
    }

    let mut req = Vec::with_capacity(3 + user.len() + pass.len());
    req.push(AUTH_VERSION);
    req.push(user.len() as u8);
    req.extend_from_slice(user);
    req.push(pass.len() as u8);
    req.extend_from_slice(pass);
    socket.write_all(&req).await?;

    let mut reply = [0u8; 2];
    socket.read_exact(&mut reply).await?;
    if reply[0] != AUTH_VERSION {
        return Err(Error::GeneralProxy {
            code: 0,
            msg: "invalid data",
        });
    }
    if reply[1] != 0x00 {
        return Err(Error::Socks5AuthError {
            code: 3,
            msg: "unknown username or invalid password",
        });
    }
    Ok(())
}

async fn connect_request<S, R>(
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
    let mut req = vec![SOCKS5_VERSION, CMD_CONNECT, 0x00];
    let peer;

    if let Some(octets) = is_ipv4_literal(next_host) {
        req.push(ATYP_IPV4);
        req.extend_from_slice(&octets);
        peer = PeerAddr::Ip(Ipv4Addr::from(octets), next_port);
    } else if step.remote_dns {
        req.push(ATYP_DOMAIN);
        req.push(next_host.len() as u8);
        req.extend_from_slice(next_host.as_bytes());
        peer = PeerAddr::Domain(next_host.to_owned(), next_port);
    } else {
        let resolved = resolver.resolve_ipv4(next_host).await?;
        req.push(ATYP_IPV4);
        req.extend_from_slice(&resolved.octets());
        peer = PeerAddr::Ip(resolved, next_port);
    }
    req.extend_from_slice(&u16_be(next_port));
    socket.write_all(&req).await?;

    let mut head = [0u8; 4];
    socket.read_exact(&mut head).await?;
    let (ver, status, _reserved, atyp) = (head[0], head[1], head[2], head[3]);
    if ver != SOCKS5_VERSION {
        return Err(Error::GeneralProxy {
            code: 0,
            msg: "invalid data",
        });
    }
    if status != 0x00 {
        return Err(Error::Socks5Error {
            code: status,
            msg: reply_msg(status),
        });
    }

    let bound_ip = match atyp {
        ATYP_IPV4 => {
            let mut buf = [0u8; 4];
            socket.read_exact(&mut buf).await?;
            Ipv4Addr::from(buf)
        }
        ATYP_DOMAIN => {
            let mut len_buf = [0u8; 1];
            socket.read_exact(&mut len_buf).await?;
            let mut name = vec![0u8; len_buf[0] as usize];
            socket.read_exact(&mut name).await?;
            let _ = name;
            // A domain-name bound address has no IPv4 representation; the
            // driver only needs an address to report, so fall back to the
            // unspecified address rather than failing the whole handshake.
            Ipv4Addr::UNSPECIFIED
        }
        ATYP_IPV6 => {
            return Err(Error::GeneralProxy {
                code: 0,
                msg: "IPv6 bound addresses are not supported",
            })
        }
        _ => {
            return Err(Error::GeneralProxy {
                code: 0,
                msg: "unknown address type",
            })
        }
    };

    let mut port_buf = [0u8; 2];
    socket.read_exact(&mut port_buf).await?;
    let bound_port = u16::from_be_bytes(port_buf);

    Ok(Negotiated {
        bound: SocketAddrV4::new(bound_ip, bound_port),
        peer,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::proto::test_support::{MemSocket, StubResolver};

    #[tokio::test]
    async fn no_auth_ipv4_request_is_byte_exact() {
        let mut script = vec![0x05, 0x00];
        script.extend_from_slice(&[0x05, 0x00, 0x00, 0x01, 0, 0, 0, 0, 0, 0]);
        let mut socket = MemSocket::new(script);
        let step = ProxyStep::socks5("proxy", 1080);

        let negotiated = negotiate(&mut socket, &step, "93.184.216.34", 80, &StubResolver(Ipv4Addr::new(1, 1, 1, 1)))
            .await
            .unwrap();

        let mut expect = vec![0x05, 0x01, 0x00];
        expect.extend_from_slice(&[0x05, 0x01, 0x00, 0x01, 93, 184, 216, 34, 0x00, 0x50]);
        assert_eq!(socket.written, expect);
        assert_eq!(negotiated.peer, PeerAddr::Ip(Ipv4Addr::new(93, 184, 216, 34), 80));
    }

    #[tokio::test]
    async fn user_pass_domain_request_is_byte_exact() {
        let mut script = vec![0x05, 0x02];
        script.extend_from_slice(&[0x01, 0x00]);
        script.extend_from_slice(&[0x05, 0x00, 0x00, 0x01, 0, 0, 0, 0, 0, 0]);
        let mut socket = MemSocket::new(script);
        let step = ProxyStep::socks5("proxy", 1080)
            .with_remote_dns(true)
            .with_user("u")
            .with_password("p");

        let negotiated = negotiate(&mut socket, &step, "example.com", 443, &StubResolver(Ipv4Addr::new(1, 1, 1, 1)))
            .await
            .unwrap();

        let mut expect = vec![0x05, 0x02, 0x00, 0x02];
        expect.extend_from_slice(&[0x01, 0x01, b'u', 0x01, b'p']);
        expect.extend_from_slice(&[0x05, 0x01, 0x00, 0x03, 0x0B]);
        expect.extend_from_slice(b"example.com");
        expect.extend_from_slice(&443u16.to_be_bytes());
        assert_eq!(socket.written, expect);
        assert_eq!(negotiated.peer, PeerAddr::Domain("example.com".to_owned(), 443));
    }

    #[tokio::test]
    async fn local_resolution_reports_resolved_literal_as_peer() {
        let mut script = vec![0x05, 0x00];
        script.extend_from_slice(&[0x05, 0x00, 0x00, 0x01, 0, 0, 0, 0, 0, 0]);
        let mut socket = MemSocket::new(script);
        let step = ProxyStep::socks5("proxy", 1080);
        let resolved = Ipv4Addr::new(203, 0, 113, 9);

        let negotiated = negotiate(&mut socket, &step, "example.com", 80, &StubResolver(resolved))
            .await
            .unwrap();

        let mut expect = vec![0x05, 0x01, 0x00];
        expect.extend_from_slice(&[0x05, 0x01, 0x00, 0x01, 203, 0, 113, 9, 0x00, 0x50]);
        assert_eq!(socket.written, expect);
        assert_eq!(negotiated.peer, PeerAddr::Ip(resolved, 80));
    }

    #[tokio::test]
    async fn auth_rejected_maps_to_code_3() {
        let mut script = vec![0x05, 0x02];
        script.extend_from_slice(&[0x01, 0x01]);
        let mut socket = MemSocket::new(script);
        let step = ProxyStep::socks5("proxy", 1080).with_user("u").with_password("p");

        let err = negotiate(&mut socket, &step, "example.com", 443, &StubResolver(Ipv4Addr::new(1, 1, 1, 1)))
            .await
            .unwrap_err();

        match err {
            Error::Socks5AuthError { code, .. } => assert_eq!(code, 3),
            other => panic!("expected Socks5AuthError, got {other:?}"),
        }
    }
}
