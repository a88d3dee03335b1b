/// Error type of `hopchain`.
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// A structural protocol error: malformed reply, connection closed
    /// mid-handshake, an unrecognized proxy kind, or a bad argument.
    /// `code` is `0` when there is no proxy-reported status behind it.
    #[error("general SOCKS proxy failure ({code}): {msg}")]
    GeneralProxy { code: u8, msg: &'static str },

    /// A SOCKS4 proxy returned a well-formed but non-success reply.
    #[error("SOCKS4 error {code}: {msg}")]
    Socks4Error { code: u8, msg: &'static str },

    /// A SOCKS5 proxy returned a well-formed but non-success CONNECT reply.
    #[error("SOCKS5 error {code}: {msg}")]
    Socks5Error { code: u8, msg: &'static str },

    /// The SOCKS5 method negotiation or user/pass sub-negotiation failed.
    #[error("SOCKS5 authentication error {code}: {msg}")]
    Socks5AuthError { code: u8, msg: &'static str },

    /// An HTTP CONNECT request did not receive a `200` response.
    #[error("HTTP CONNECT failed with status {code}: {reason}")]
    HttpError { code: u16, reason: String },

    /// The `Resolver` collaborator failed to resolve a host name.
    #[error("failed to resolve host name: {hostname}")]
    NameResolution { hostname: String },

    /// Any I/O failure not otherwise classified above (e.g. a failed
    /// connect to the first hop).
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type of `hopchain`.
pub type Result<T> = std::result::Result<T, Error>;
