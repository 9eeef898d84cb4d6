//! Server identity used for the `servers` table

use crate::config::LedgerConfig;
use serde::{Deserialize, Serialize};
use std::net::{IpAddr, Ipv4Addr, ToSocketAddrs};
use sysinfo::System;

/// Natural key (plus description) of one running instance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HostIdentity {
    pub hostname: String,
    pub ip: String,
    pub platform: String,
}

impl HostIdentity {
    pub fn new(
        hostname: impl Into<String>,
        ip: impl Into<String>,
        platform: impl Into<String>,
    ) -> Self {
        Self {
            hostname: hostname.into(),
            ip: ip.into(),
            platform: platform.into(),
        }
    }
}

/// Source of the identity this process registers under
pub trait HostIdentityProvider: Send + Sync {
    fn identity(&self) -> HostIdentity;
}

/// Identity of the machine the process runs on
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemHostIdentity;

impl SystemHostIdentity {
    fn hostname() -> String {
        match hostname::get() {
            Ok(name) => {
                let name = name.to_string_lossy().into_owned();
                if name.is_empty() {
                    "localhost".to_string()
                } else {
                    name
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Failed to read hostname, using localhost");
                "localhost".to_string()
            }
        }
    }

    /// First IPv4 address the hostname resolves to
    fn resolve_ip(hostname: &str) -> IpAddr {
        let resolved = (hostname, 0)
            .to_socket_addrs()
            .ok()
            .and_then(|mut addrs| addrs.find(|addr| addr.is_ipv4()))
            .map(|addr| addr.ip());

        resolved.unwrap_or_else(|| {
            tracing::debug!(hostname, "Hostname did not resolve to IPv4, using loopback");
            IpAddr::V4(Ipv4Addr::LOCALHOST)
        })
    }

    /// `<os>-<kernel>-<arch>`, e.g. `Linux-6.1.0-x86_64`
    fn platform() -> String {
        let parts: Vec<String> = [
            System::name(),
            System::kernel_version(),
            Some(std::env::consts::ARCH.to_string()),
        ]
        .into_iter()
        .flatten()
        .filter(|part| !part.is_empty())
        .collect();

        parts.join("-")
    }
}

impl HostIdentityProvider for SystemHostIdentity {
    fn identity(&self) -> HostIdentity {
        let hostname = Self::hostname();
        let ip = Self::resolve_ip(&hostname).to_string();
        HostIdentity {
            hostname,
            ip,
            platform: Self::platform(),
        }
    }
}

/// Fixed identity, used when the configuration pins the hostname or IP
#[derive(Debug, Clone)]
pub struct StaticHostIdentity(pub HostIdentity);

impl StaticHostIdentity {
    /// Pin the given parts, filling the rest from the running system
    ///
    /// An unset IP is resolved from the (possibly pinned) hostname.
    pub fn with_overrides(hostname: Option<&str>, ip: Option<&str>) -> Self {
        let hostname = hostname
            .map(str::to_string)
            .unwrap_or_else(SystemHostIdentity::hostname);
        let ip = ip
            .map(str::to_string)
            .unwrap_or_else(|| SystemHostIdentity::resolve_ip(&hostname).to_string());

        Self(HostIdentity {
            hostname,
            ip,
            platform: SystemHostIdentity::platform(),
        })
    }
}

/// Identity provider for a ledger configuration
pub fn identity_provider(config: &LedgerConfig) -> Box<dyn HostIdentityProvider> {
    match (config.hostname.as_deref(), config.ip.as_deref()) {
        (None, None) => Box::new(SystemHostIdentity),
        (hostname, ip) => Box::new(StaticHostIdentity::with_overrides(hostname, ip)),
    }
}

impl HostIdentityProvider for StaticHostIdentity {
    fn identity(&self) -> HostIdentity {
        self.0.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_system_identity_is_never_empty() {
        let identity = SystemHostIdentity.identity();
        assert!(!identity.hostname.is_empty());
        assert!(!identity.ip.is_empty());
        assert!(identity.ip.parse::<IpAddr>().is_ok());
    }

    #[test]
    fn test_platform_ends_with_arch() {
        let platform = SystemHostIdentity::platform();
        assert!(platform.ends_with(std::env::consts::ARCH));
    }

    #[test]
    fn test_static_identity_returns_its_value() {
        let provider = StaticHostIdentity(HostIdentity::new("web-0", "10.0.0.7", "Linux"));
        assert_eq!(provider.identity().hostname, "web-0");
        assert_eq!(provider.identity().ip, "10.0.0.7");
    }

    #[test]
    fn test_overrides_pin_configured_parts() {
        let pinned =
            StaticHostIdentity::with_overrides(Some("edge-1"), Some("203.0.113.9")).identity();
        assert_eq!(pinned.hostname, "edge-1");
        assert_eq!(pinned.ip, "203.0.113.9");
        assert!(pinned.platform.ends_with(std::env::consts::ARCH));

        let ip_only = StaticHostIdentity::with_overrides(None, Some("203.0.113.9")).identity();
        assert_eq!(ip_only.hostname, SystemHostIdentity.identity().hostname);
        assert_eq!(ip_only.ip, "203.0.113.9");
    }

    #[test]
    fn test_identity_provider_follows_config() {
        let config = LedgerConfig {
            ip: Some("198.51.100.4".to_string()),
            ..Default::default()
        };
        assert_eq!(identity_provider(&config).identity().ip, "198.51.100.4");

        let system = identity_provider(&LedgerConfig::default()).identity();
        assert_eq!(system, SystemHostIdentity.identity());
    }
}
