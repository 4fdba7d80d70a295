use std::net::{IpAddr, Ipv4Addr};

use serde::{Deserialize, Serialize};

/// Configuration of the listening socket of a [`crate::MockServer`].
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ServerConfig {
    /// The address to listen on
    pub host: IpAddr,
    /// The port to listen on. An ephemeral port is used when absent.
    pub port: Option<u16>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
            port: None,
        }
    }
}
