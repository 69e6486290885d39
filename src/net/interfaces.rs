//! Local address discovery, for showing the performer where to point the audience.
//!
//! Nothing in the request path depends on this module.

use std::net::{IpAddr, Ipv4Addr, SocketAddr, UdpSocket};

/// Shown when no usable address is found.
pub const UNKNOWN_ADDRESS: &str = "Unable to get IP";

/// The IPv4 address this machine would use to reach the local network.
///
/// Connecting a UDP socket sends no packets; it only asks the OS to pick a
/// route and source address.
pub fn local_ipv4() -> Option<Ipv4Addr> {
    let socket = UdpSocket::bind((Ipv4Addr::UNSPECIFIED, 0)).ok()?;
    socket.connect((Ipv4Addr::new(192, 168, 0, 1), 9)).ok()?;
    match socket.local_addr().ok()? {
        SocketAddr::V4(addr) if usable(*addr.ip()) => Some(*addr.ip()),
        _ => None,
    }
}

fn usable(ip: Ipv4Addr) -> bool {
    !ip.is_loopback() && !ip.is_unspecified()
}

/// `ip:port` for display, falling back to [`UNKNOWN_ADDRESS`].
pub fn display_address(bound: SocketAddr) -> String {
    let ip = match bound.ip() {
        IpAddr::V4(ip) if usable(ip) => Some(ip),
        _ => local_ipv4(),
    };
    match ip {
        Some(ip) => format!("{}:{}", ip, bound.port()),
        None => UNKNOWN_ADDRESS.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn specific_bind_address_is_shown_as_is() {
        let bound: SocketAddr = "10.1.2.3:8080".parse().unwrap();
        assert_eq!(display_address(bound), "10.1.2.3:8080");
    }

    #[test]
    fn wildcard_bind_never_shows_unspecified_address() {
        let bound: SocketAddr = "0.0.0.0:8080".parse().unwrap();
        let shown = display_address(bound);
        assert!(!shown.starts_with("0.0.0.0"));
        assert!(shown == UNKNOWN_ADDRESS || shown.ends_with(":8080"));
    }

    #[test]
    fn discovered_address_is_never_loopback() {
        if let Some(ip) = local_ipv4() {
            assert!(!ip.is_loopback());
        }
    }
}
