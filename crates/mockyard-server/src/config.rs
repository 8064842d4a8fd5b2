use std::net::{IpAddr, Ipv4Addr};

/// Settings for a [`MockHttpServer`](crate::MockHttpServer).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    /// Name used in log lines and dispatch errors
    pub name: String,
    /// Interface to bind; the port is always picked by the OS
    pub host: IpAddr,
}

impl ServerConfig {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_host(mut self, host: IpAddr) -> Self {
        self.host = host;
        self
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            name: "mock".to_string(),
            host: IpAddr::V4(Ipv4Addr::LOCALHOST),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use std::net::Ipv6Addr;

    #[rstest]
    fn test_new_keeps_default_host() {
        let config = ServerConfig::new("billing");
        assert_eq!(config.name, "billing");
        assert_eq!(config.host, IpAddr::V4(Ipv4Addr::LOCALHOST));
    }

    #[rstest]
    fn test_with_host() {
        let config = ServerConfig::default().with_host(IpAddr::V6(Ipv6Addr::LOCALHOST));
        assert_eq!(config.name, "mock");
        assert!(config.host.is_loopback());
    }
}
