//! Command-line/env parsing into the runtime config.
use std::net::{IpAddr, Ipv4Addr, SocketAddr};
use std::path::PathBuf;

use clap::Parser;
use vnstat_web::chart::Theme;
use vnstat_web::config::{Args, GatewayConfig, DEFAULT_PORT};

fn parse(args: &[&str]) -> GatewayConfig {
    let argv = std::iter::once("vnstat_web").chain(args.iter().copied());
    GatewayConfig::from(Args::try_parse_from(argv).expect("valid args"))
}

#[test]
fn port_long_short_and_assign() {
    assert_eq!(parse(&["--port", "9001"]).listen.port(), 9001);
    assert_eq!(parse(&["-p", "9002"]).listen.port(), 9002);
    assert_eq!(parse(&["--port=9003"]).listen.port(), 9003);
}

#[test]
fn listen_address() {
    let cfg = parse(&["--listen", "127.0.0.1", "-p", "81"]);
    assert_eq!(cfg.listen, SocketAddr::new(IpAddr::V4(Ipv4Addr::LOCALHOST), 81));
}

#[test]
fn config_paths() {
    let cfg = parse(&["--config", "/etc/vnstat.conf", "--config-dark", "/etc/dark.conf"]);
    assert_eq!(cfg.themes.default, Some(PathBuf::from("/etc/vnstat.conf")));
    assert_eq!(cfg.themes.for_theme(Theme::Dark), Some(PathBuf::from("/etc/dark.conf").as_path()));
    assert_eq!(cfg.themes.live(), Some(PathBuf::from("/etc/vnstat.conf").as_path()));
}

#[test]
fn empty_config_counts_as_unset() {
    let cfg = parse(&["--config", "", "--config-dark", ""]);
    assert_eq!(cfg.themes.default, None);
    assert_eq!(cfg.themes.dark, None);
}

#[test]
fn ssl_flag_and_legacy_alias() {
    assert!(parse(&["--enable-ssl"]).enable_ssl);
    assert!(parse(&["--enableSSL"]).enable_ssl);
}

#[test]
fn tool_overrides() {
    let cfg = parse(&["--vnstat", "/opt/bin/vnstat", "--vnstati", "/opt/bin/vnstati"]);
    assert_eq!(cfg.tools.vnstat, "/opt/bin/vnstat");
    assert_eq!(cfg.tools.vnstati, "/opt/bin/vnstati");
}

#[test]
fn rejects_bad_port() {
    assert!(Args::try_parse_from(["vnstat_web", "--port", "http"]).is_err());
}

#[test]
fn defaults() {
    // env vars would leak into the defaults
    if std::env::vars().any(|(k, _)| k.starts_with("VNSTAT_WEB_")) {
        eprintln!("skipping defaults: VNSTAT_WEB_* set in environment");
        return;
    }
    let cfg = parse(&[]);
    assert_eq!(cfg.listen.port(), DEFAULT_PORT);
    assert!(cfg.listen.ip().is_unspecified());
    assert_eq!(cfg.tools.vnstat, "vnstat");
    assert!(!cfg.enable_ssl);
}
