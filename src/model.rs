use std::{iter::FromIterator, net::Ipv4Addr};

/// Which protocol a hop speaks.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProxyKind {
    /// Internal sentinel used only for the final destination the driver
    /// appends to a chain; never a valid `kind` on a caller-built `ProxyStep`.
    None,
    Socks4,
    Socks5,
    Http,
}

impl ProxyKind {
    fn default_port(self) -> u16 {
        match self {
            ProxyKind::Socks4 | ProxyKind::Socks5 => 1080,
            ProxyKind::Http => 8080,
            ProxyKind::None => 0,
        }
    }
}

/// One hop in a proxy chain.
#[derive(Debug, Clone)]
pub struct ProxyStep {
    pub(crate) kind: ProxyKind,
    pub(crate) host: String,
    pub(crate) port: Option<u16>,
    pub(crate) remote_dns: bool,
    pub(crate) user: Option<Vec<u8>>,
    pub(crate) password: Option<Vec<u8>>,
}

impl ProxyStep {
    fn new(kind: ProxyKind, host: impl Into<String>, port: Option<u16>) -> Self {
        ProxyStep {
            kind,
            host: host.into(),
            port,
            remote_dns: false,
            user: None,
            password: None,
        }
    }

    /// `port` defaults to the protocol's conventional port (`1080`) when
    /// `None`.
    pub fn socks5(host: impl Into<String>, port: impl Into<Option<u16>>) -> Self {
        Self::new(ProxyKind::Socks5, host, port.into())
    }

    /// `port` defaults to `1080` when `None`.
    pub fn socks4(host: impl Into<String>, port: impl Into<Option<u16>>) -> Self {
        Self::new(ProxyKind::Socks4, host, port.into())
    }

    /// `port` defaults to `8080` when `None`.
    pub fn http(host: impl Into<String>, port: impl Into<Option<u16>>) -> Self {
        Self::new(ProxyKind::Http, host, port.into())
    }

    /// Forward the destination host name to this hop instead of resolving it
    /// locally. Ignored by SOCKS4 hops unless they also get a hostname
    /// destination (SOCKS4A), see the SOCKS4 negotiator.
    pub fn with_remote_dns(mut self, remote_dns: bool) -> Self {
        self.remote_dns = remote_dns;
        self
    }

    /// Username (SOCKS5 user/pass sub-negotiation) or userid (SOCKS4).
    pub fn with_user(mut self, user: impl Into<Vec<u8>>) -> Self {
        self.user = Some(user.into());
        self
    }

    /// Password for the SOCKS5 user/pass sub-negotiation.
    pub fn with_password(mut self, password: impl Into<Vec<u8>>) -> Self {
        self.password = Some(password.into());
        self
    }

    pub(crate) fn port_or_default(&self) -> u16 {
        self.port.unwrap_or_else(|| self.kind.default_port())
    }

    pub(crate) fn sentinel(host: impl Into<String>, port: u16) -> Self {
        Self::new(ProxyKind::None, host, Some(port))
    }
}

/// An ordered sequence of hops. The final destination is *not* part of a
/// `Chain` value; it is supplied separately to `connect`/`connect_with_socket`
/// and appended internally as a sentinel step.
#[derive(Debug, Clone, Default)]
pub struct Chain(pub(crate) Vec<ProxyStep>);

impl Chain {
    pub fn new() -> Self {
        Chain(Vec::new())
    }

    pub fn push(mut self, step: ProxyStep) -> Self {
        self.0.push(step);
        self
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }
}

impl From<Vec<ProxyStep>> for Chain {
    fn from(steps: Vec<ProxyStep>) -> Self {
        Chain(steps)
    }
}

impl FromIterator<ProxyStep> for Chain {
    fn from_iter<I: IntoIterator<Item = ProxyStep>>(iter: I) -> Self {
        Chain(iter.into_iter().collect())
    }
}

/// The destination as a negotiator finally addressed it: an IPv4 literal if
/// resolution happened locally, or the original host name if resolution was
/// forwarded to the proxy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PeerAddr {
    Ip(Ipv4Addr, u16),
    Domain(String, u16),
}

impl PeerAddr {
    pub fn port(&self) -> u16 {
        match self {
            PeerAddr::Ip(_, port) => *port,
            PeerAddr::Domain(_, port) => *port,
        }
    }
}
