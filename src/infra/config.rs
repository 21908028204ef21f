//! Centralized configuration (command-line flags with environment fallbacks + defaults).
//!
//! `dotenv` is loaded by the binary before parsing, so every setting can also
//! come from a `.env` file.

use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;

use anyhow::Context;
use clap::Parser;

/// Serve a directory of JSON files as a REST-like document store.
#[derive(Parser, Debug, Clone)]
#[command(name = "json-rest-server")]
#[command(version, about, long_about = None)]
pub struct ServerConfig {
    /// Entry root directory that URL paths are resolved under.
    #[arg(env = "JSON_SERVER_ROOT", default_value = ".")]
    pub root: PathBuf,

    /// Address to bind to.
    #[arg(long, env = "JSON_SERVER_HOST", default_value = "127.0.0.1")]
    pub host: String,

    /// Port to listen on.
    #[arg(short, long, env = "JSON_SERVER_PORT", default_value_t = 1337)]
    pub port: u16,

    /// Attach permissive cross-origin headers to every response.
    #[arg(long, env = "JSON_SERVER_CORS")]
    pub cors: bool,

    /// Seconds a single request may take before it is answered with 500.
    #[arg(long = "request-timeout", env = "JSON_SERVER_REQUEST_TIMEOUT", default_value_t = 30)]
    pub request_timeout_secs: u64,

    /// Largest request body accepted, in bytes.
    #[arg(long, env = "JSON_SERVER_MAX_BODY_BYTES", default_value_t = 10 * 1024 * 1024)]
    pub max_body_bytes: usize,

    /// Emit logs as JSON lines instead of human-readable text.
    #[arg(long, env = "JSON_SERVER_LOG_JSON")]
    pub log_json: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            root: PathBuf::from("."),
            host: "127.0.0.1".to_string(),
            port: 1337,
            cors: false,
            request_timeout_secs: 30,
            max_body_bytes: 10 * 1024 * 1024,
            log_json: false,
        }
    }
}

impl ServerConfig {
    /// Config serving `root` with every other setting at its default.
    pub fn with_root(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            ..Default::default()
        }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn socket_addr(&self) -> anyhow::Result<SocketAddr> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .with_context(|| format!("invalid listen address {}:{}", self.host, self.port))
    }

    /// Checks that the entry root is a writable directory and returns its
    /// canonical form.
    pub fn canonical_root(&self) -> anyhow::Result<PathBuf> {
        let meta = std::fs::metadata(&self.root)
            .with_context(|| format!("entry root {} is not accessible", self.root.display()))?;
        if !meta.is_dir() {
            anyhow::bail!("entry root {} must be a directory", self.root.display());
        }
        if meta.permissions().readonly() {
            anyhow::bail!("entry root {} must be writable", self.root.display());
        }
        self.root
            .canonicalize()
            .with_context(|| format!("failed to canonicalize {}", self.root.display()))
    }
}
