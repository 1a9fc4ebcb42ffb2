//! HTTP request extractors.

mod connection_info;

pub use connection_info::AppConnectInfo;
