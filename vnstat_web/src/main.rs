//! Entry point for vnstat_web. Parses args, builds state and serves until SIGINT/SIGTERM.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tracing::info;
use tracing_subscriber::EnvFilter;

use vnstat_web::config::{Args, GatewayConfig};
use vnstat_web::runner::SystemRunner;
use vnstat_web::{router, tls, AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let config = GatewayConfig::from(Args::parse());
    info!(
        listen = %config.listen,
        config = ?config.themes.default,
        config_dark = ?config.themes.dark,
        "starting vnstat_web"
    );

    let state = AppState::new(&config, Arc::new(SystemRunner));
    let app = router(state);

    if config.enable_ssl {
        let (cert, key) = tls::ensure_self_signed_cert()?;
        let tls_cfg = axum_server::tls_rustls::RustlsConfig::from_pem_file(cert, key)
            .await
            .context("loading TLS certificate")?;
        let handle = axum_server::Handle::new();
        let server = axum_server::bind_rustls(config.listen, tls_cfg)
            .handle(handle.clone())
            .serve(app.into_make_service());
        info!("serving https://{}", config.listen);
        tokio::select! {
            res = server => res.context("https server")?,
            sig = shutdown_signal() => {
                info!("signal ({sig}) received, stopping");
                handle.shutdown();
            }
        }
    } else {
        let listener = tokio::net::TcpListener::bind(config.listen)
            .await
            .with_context(|| format!("binding {}", config.listen))?;
        info!("serving http://{}", listener.local_addr()?);
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let sig = shutdown_signal().await;
                info!("signal ({sig}) received, stopping");
            })
            .await
            .context("http server")?;
    }
    Ok(())
}

async fn shutdown_signal() -> &'static str {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => tokio::select! {
                _ = tokio::signal::ctrl_c() => "interrupt",
                _ = term.recv() => "terminated",
            },
            Err(_) => {
                let _ = tokio::signal::ctrl_c().await;
                "interrupt"
            }
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
        "interrupt"
    }
}
