use super::Negotiated;
use crate::{
    error::{Error, Result},
    io::{AsyncSocket, AsyncSocketExt},
    model::{PeerAddr, ProxyStep},
    resolver::Resolver,
    wire::{is_ipv4_literal, u16_be},
};
use std::net::{Ipv4Addr, SocketAddrV4};

const SOCKS4_VERSION: u8 = 0x04;
const CMD_CONNECT: u8 = 0x01;
const REPLY_GRANTED: u8 = 0x5A;

fn status_msg(code: u8) -> &'static str {
    match code {
        0x5B => "request rejected or failed",
        0x5C => "request rejected because SOCKS server cannot connect to identd on the client",
        0x5D => "request rejected because the client program and identd report different user-ids",
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
    let user = step.user.as_deref().unwrap_or(&[]);

    let (ip, hostname, peer) = if let Some(octets) = is_ipv4_literal(next_host) {
        (octets, None, PeerAddr::Ip(Ipv4Addr::from(octets), next_port))
    } else if step.remote_dns {
        (
            [0, 0, 0, 1],
            Some(next_host),
            PeerAddr::Domain(next_host.to_owned(), next_port),
        )
    } else {
        let resolved = resolver.resolve_ipv4(next_host).await?;
        (resolved.octets(), None, PeerAddr::Ip(resolved, next_port))
    };

    let mut req = Vec::with_capacity(9 + user.len() + hostname.map_or(0, |h| h.len() + 1));
    req.push(SOCKS4_VERSION);
    req.push(CMD_CONNECT);
    req.extend_from_slice(&u16_be(next_port));
    req.extend_from_slice(&ip);
    req.extend_from_slice(user);
    req.push(0x00);
    if let Some(hostname) = hostname {
        req.extend_from_slice(hostname.as_bytes());
        req.push(0x00);
    }
    socket.write_all(&req).await?;

    let mut reply = [0u8; 8];
    socket.read_exact(&mut reply).await?;

    if reply[0] != 0x00 {
        return Err(Error::GeneralProxy {
            code: 0,
            msg: "invalid data",
        });
    }

    let status = reply[1];
    if status != REPLY_GRANTED {
        return Err(Error::Socks4Error {
            code: status,
            msg: status_msg(status),
        });
    }

    let bound_port = u16::from_be_bytes([reply[2], reply[3]]);
    let bound_ip = Ipv4Addr::new(reply[4], reply[5], reply[6], reply[7]);

    Ok(Negotiated {
        bound: SocketAddrV4::new(bound_ip, bound_port),
        peer,
    })
}
