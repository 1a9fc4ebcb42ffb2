//! Connection information extractor for HTTP requests.
//!
//! This module provides the [`AppConnectInfo`] extractor for obtaining detailed
//! information about client connections in Axum handlers. It captures network
//! addresses and connection timing; the canonical, spoof-resistant client
//! identity used for admission decisions comes from [`crate::admission::ip_resolver`]
//! instead, which applies the configured trusted-proxy policy.

use std::net::SocketAddr;
use std::time::SystemTime;

use axum::extract::connect_info::Connected;
use axum::serve::IncomingStream;
use tokio::net::TcpListener;

/// Raw connection information for an incoming HTTP request.
///
/// Note: when deployed behind a proxy or load balancer, `addr` is the
/// proxy's address, not the original client's. Use the admission middleware's
/// resolved identity for anything security-sensitive.
#[derive(Debug, Clone, Copy)]
pub struct AppConnectInfo {
    /// The socket address (IP + port) of the connecting peer.
    pub addr: SocketAddr,
    /// Timestamp when the connection was established.
    pub connected_at: SystemTime,
}

impl AppConnectInfo {
    /// Creates a new `AppConnectInfo` with the current timestamp.
    pub fn new(addr: SocketAddr) -> Self {
        Self {
            addr,
            connected_at: SystemTime::now(),
        }
    }

    /// Returns the duration since the connection was established.
    pub fn connection_duration(&self) -> Option<std::time::Duration> {
        SystemTime::now().duration_since(self.connected_at).ok()
    }
}

impl Connected<IncomingStream<'_, TcpListener>> for AppConnectInfo {
    fn connect_info(stream: IncomingStream<'_, TcpListener>) -> Self {
        let addr = SocketAddr::connect_info(stream);
        Self::new(addr)
    }
}

impl Connected<SocketAddr> for AppConnectInfo {
    fn connect_info(addr: SocketAddr) -> Self {
        Self::new(addr)
    }
}
