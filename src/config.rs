//! Server configuration.
//!
//! All runtime behaviour of the HTTP surface is controlled through
//! [`ServerConfig`], built via its [`ServerConfigBuilder`]. Keeping every
//! knob in one struct makes it trivial to log the effective configuration at
//! startup and to construct throwaway configs in tests.
//!
//! Render policy is deliberately NOT here: paper size, margins, and DPI are
//! a fixed product contract (see [`crate::render::RenderJobSpec`]), not an
//! operator choice.

use std::net::{IpAddr, Ipv4Addr};
use std::path::PathBuf;

use crate::error::StartupError;

/// Bodies up to this size must be accepted; large HTML payloads with inline
/// assets routinely reach tens of megabytes.
pub const DEFAULT_MAX_BODY_BYTES: usize = 64 * 1024 * 1024;

/// Runtime configuration for the HTTP server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Interface to bind. Default: `0.0.0.0`.
    pub host: IpAddr,

    /// TCP port to bind. Default: 5000.
    pub port: u16,

    /// Maximum accepted request-body size in bytes, applied to all three
    /// conversion routes. Default: 64 MiB — comfortably above the 50 MB
    /// floor consumers rely on.
    pub max_body_bytes: usize,

    /// Explicit path to the wkhtmltox shared library. When `None`, the
    /// platform resolution chain of `wkhtmltox-auto` applies.
    pub wkhtmltox_lib_path: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            port: 5000,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
            wkhtmltox_lib_path: None,
        }
    }
}

impl ServerConfig {
    /// Create a new builder for `ServerConfig`.
    pub fn builder() -> ServerConfigBuilder {
        ServerConfigBuilder {
            config: Self::default(),
        }
    }

    /// The socket address to bind.
    pub fn bind_addr(&self) -> std::net::SocketAddr {
        std::net::SocketAddr::new(self.host, self.port)
    }
}

/// Builder for [`ServerConfig`].
#[derive(Debug)]
pub struct ServerConfigBuilder {
    config: ServerConfig,
}

impl ServerConfigBuilder {
    pub fn host(mut self, host: IpAddr) -> Self {
        self.config.host = host;
        self
    }

    pub fn port(mut self, port: u16) -> Self {
        self.config.port = port;
        self
    }

    pub fn max_body_bytes(mut self, bytes: usize) -> Self {
        self.config.max_body_bytes = bytes;
        self
    }

    pub fn wkhtmltox_lib_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.config.wkhtmltox_lib_path = Some(path.into());
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ServerConfig, StartupError> {
        let c = &self.config;
        if c.port == 0 {
            return Err(StartupError::InvalidConfig(
                "port must be non-zero".into(),
            ));
        }
        if c.max_body_bytes < 50 * 1000 * 1000 {
            return Err(StartupError::InvalidConfig(format!(
                "max body size must be at least 50 MB, got {} bytes",
                c.max_body_bytes
            )));
        }
        Ok(self.config)
    }
}
