use serde::{Deserialize, Serialize};

use crate::error::FocasError;

/// Represents a connection target (CNC endpoint): address, port and the
/// timeout handed to the driver's connect call.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct ConnectionTarget {
    /// Controller IP address or host name
    pub address: String,
    pub port: u16,
    /// Driver timeout in seconds. Passed through untouched.
    pub timeout: i32,
}

pub const DEFAULT_ADDRESS: &str = "192.168.0.100";
/// FOCAS Ethernet default port.
pub const DEFAULT_PORT: u16 = 8193;
pub const DEFAULT_TIMEOUT: i32 = 6;

impl ConnectionTarget {
    #[must_use]
    pub fn new() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            port: DEFAULT_PORT,
            timeout: DEFAULT_TIMEOUT,
        }
    }
    #[must_use]
    pub fn with_address(mut self, address: impl Into<String>) -> Self {
        self.address = address.into();
        self
    }
    #[must_use]
    pub const fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }
    #[must_use]
    pub const fn with_timeout(mut self, timeout: i32) -> Self {
        self.timeout = timeout;
        self
    }
    /// Shorthand for an address/port pair with the default timeout.
    #[must_use]
    pub fn direct(address: impl Into<String>, port: u16) -> Self {
        Self::new().with_address(address).with_port(port)
    }

    /// "host:port" form used in messages.
    #[must_use]
    pub fn addr(&self) -> String {
        format!("{}:{}", self.address, self.port)
    }

    pub fn validate(&self) -> Result<(), FocasError> {
        if self.address.trim().is_empty() {
            return Err(FocasError::Config("controller address is empty".into()));
        }
        if self.address.contains('\0') {
            return Err(FocasError::Config(
                "controller address contains a NUL byte".into(),
            ));
        }
        if self.port == 0 {
            return Err(FocasError::Config("controller port must be non-zero".into()));
        }
        if self.timeout < 0 {
            return Err(FocasError::Config(format!(
                "timeout must not be negative: {}",
                self.timeout
            )));
        }
        Ok(())
    }
}

impl Default for ConnectionTarget {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let t = ConnectionTarget::default();
        assert_eq!(t.address, "192.168.0.100");
        assert_eq!(t.port, 8193);
        assert_eq!(t.timeout, 6);
        assert_eq!(t.addr(), "192.168.0.100:8193");
        assert!(t.validate().is_ok());
    }

    #[test]
    fn validate_rejects_bad_targets() {
        assert!(ConnectionTarget::direct("", 8193).validate().is_err());
        assert!(ConnectionTarget::direct("10.0.0.1\0", 8193).validate().is_err());
        assert!(ConnectionTarget::direct("10.0.0.1", 0).validate().is_err());
        assert!(ConnectionTarget::new().with_timeout(-1).validate().is_err());
    }
}
