use std::fmt;
use std::net::{IpAddr, SocketAddr};

/// Identifier assigned to each accepted camera connection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnId(pub u64);

impl fmt::Display for ConnId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Per-connection state, lives as long as the TCP connection
#[derive(Debug, Clone)]
pub struct ConnectionContext {
    pub conn_id: ConnId,
    /// Remote socket address (host:port)
    pub peer_addr: SocketAddr,
}

impl ConnectionContext {
    pub fn new(conn_id: ConnId, peer_addr: SocketAddr) -> Self {
        Self { conn_id, peer_addr }
    }

    /// Host part of the peer address
    pub fn peer_host(&self) -> String {
        // Report IPv4-mapped IPv6 peers in dotted-quad form
        match self.peer_addr.ip() {
            IpAddr::V6(v6) => match v6.to_ipv4_mapped() {
                Some(v4) => v4.to_string(),
                None => v6.to_string(),
            },
            ip => ip.to_string(),
        }
    }

    pub fn peer_port(&self) -> u16 {
        self.peer_addr.port()
    }
}

impl fmt::Display for ConnectionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "connection {} ({})", self.conn_id, self.peer_addr)
    }
}
