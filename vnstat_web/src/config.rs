//! Command-line/env configuration and the runtime config derived from it.

use std::net::{IpAddr, Ipv6Addr, SocketAddr};
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::Parser;

use crate::chart::Theme;

pub const DEFAULT_PORT: u16 = 8080;

#[derive(Debug, Clone, Parser)]
#[command(name = "vnstat_web", version, about = "Serve vnStat charts and live traffic over HTTP/WebSocket")]
pub struct Args {
    /// Listen port
    #[arg(short, long, env = "VNSTAT_WEB_PORT", default_value_t = DEFAULT_PORT)]
    pub port: u16,

    /// Listen address
    #[arg(long, env = "VNSTAT_WEB_LISTEN", default_value_t = IpAddr::V6(Ipv6Addr::UNSPECIFIED))]
    pub listen: IpAddr,

    /// vnStat config file passed to vnstat and vnstati
    #[arg(long, env = "VNSTAT_WEB_CONFIG")]
    pub config: Option<PathBuf>,

    /// vnstati config file used for the dark theme
    #[arg(long = "config-dark", env = "VNSTAT_WEB_CONFIG_DARK")]
    pub config_dark: Option<PathBuf>,

    /// vnstat executable
    #[arg(long, env = "VNSTAT_WEB_VNSTAT", default_value = "vnstat")]
    pub vnstat: String,

    /// vnstati executable
    #[arg(long, env = "VNSTAT_WEB_VNSTATI", default_value = "vnstati")]
    pub vnstati: String,

    /// Serve HTTPS with a self-signed certificate
    #[arg(long = "enable-ssl", alias = "enableSSL", env = "VNSTAT_WEB_ENABLE_SSL")]
    pub enable_ssl: bool,
}

/// vnStat config files per chart theme.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ThemeConfig {
    pub default: Option<PathBuf>,
    pub dark: Option<PathBuf>,
}

impl ThemeConfig {
    /// Dark falls back to the default path; light never sees the dark one.
    pub fn for_theme(&self, theme: Theme) -> Option<&Path> {
        match theme {
            Theme::Dark => self.dark.as_deref().or(self.default.as_deref()),
            Theme::Light => self.default.as_deref(),
        }
    }

    /// Live mode has no theme and only ever uses the default path.
    pub fn live(&self) -> Option<&Path> {
        self.default.as_deref()
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToolPaths {
    pub vnstat: String,
    pub vnstati: String,
}

impl Default for ToolPaths {
    fn default() -> Self {
        Self {
            vnstat: "vnstat".into(),
            vnstati: "vnstati".into(),
        }
    }
}

/// Live polling cadence and per-read buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LiveSettings {
    pub tick: Duration,
    pub read_buffer: usize,
}

impl Default for LiveSettings {
    fn default() -> Self {
        Self {
            tick: Duration::from_secs(1),
            read_buffer: 1024,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    pub listen: SocketAddr,
    pub tools: ToolPaths,
    pub themes: ThemeConfig,
    pub live: LiveSettings,
    pub enable_ssl: bool,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen: SocketAddr::new(IpAddr::V6(Ipv6Addr::UNSPECIFIED), DEFAULT_PORT),
            tools: ToolPaths::default(),
            themes: ThemeConfig::default(),
            live: LiveSettings::default(),
            enable_ssl: false,
        }
    }
}

fn non_empty(path: Option<PathBuf>) -> Option<PathBuf> {
    path.filter(|p| !p.as_os_str().is_empty())
}

impl From<Args> for GatewayConfig {
    fn from(args: Args) -> Self {
        Self {
            listen: SocketAddr::new(args.listen, args.port),
            tools: ToolPaths {
                vnstat: args.vnstat,
                vnstati: args.vnstati,
            },
            themes: ThemeConfig {
                default: non_empty(args.config),
                dark: non_empty(args.config_dark),
            },
            live: LiveSettings::default(),
            enable_ssl: args.enable_ssl,
        }
    }
}
