//! Live stream bridge: one `vnstat -l` process per client connection, its
//! `rx:` status lines relayed once per tick until either side goes away.

use std::sync::Arc;

use async_trait::async_trait;
use tokio::io::AsyncReadExt;
use tokio::time::{interval_at, Instant, MissedTickBehavior};
use tracing::{debug, info, warn};

use crate::config::{LiveSettings, ThemeConfig};
use crate::registry::{InterfaceRegistry, InterfaceSelection};
use crate::runner::{ProcessHandle, ProcessInvocation, ProcessRunner};

pub const RX_MARKER: &[u8] = b"rx:";

/// The client side of a live session.
#[async_trait]
pub trait LiveChannel: Send {
    /// Wait for the client's first message. `None` if the connection ended first.
    async fn handshake(&mut self) -> Option<String>;

    /// Resolves once the client has disconnected. Other inbound messages are dropped.
    async fn closed(&mut self);

    async fn send_text(&mut self, text: String) -> Result<(), ChannelClosed>;

    /// Close the connection if it is still open.
    async fn shutdown(&mut self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ChannelClosed;

/// Why a live session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    HandshakeFailed,
    InvalidInterface,
    SpawnFailed,
    StreamEnded,
    ReadFailed,
    ClientGone,
}

/// Finds the `rx:` marker in vnstat's live output.
///
/// A marker-less read leaves its last `RX_MARKER.len() - 1` bytes behind so a
/// marker cut in half by the read boundary is still found on the next read.
#[derive(Debug, Default)]
pub struct RxScanner {
    pending: Vec<u8>,
}

impl RxScanner {
    pub fn new() -> Self {
        Self::default()
    }

    /// Feed one read. Returns everything from the marker to the end of the read.
    pub fn feed(&mut self, chunk: &[u8]) -> Option<String> {
        self.pending.extend_from_slice(chunk);
        match find(&self.pending, RX_MARKER) {
            Some(i) => {
                let line = String::from_utf8_lossy(&self.pending[i..]).into_owned();
                self.pending.clear();
                Some(line)
            }
            None => {
                let keep = RX_MARKER.len() - 1;
                let cut = self.pending.len().saturating_sub(keep);
                self.pending.drain(..cut);
                None
            }
        }
    }
}

fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
    haystack.windows(needle.len()).position(|w| w == needle)
}

/// Interrupts the live process exactly once, when the session lets go of it.
struct ProcessGuard(Box<dyn ProcessHandle>);

impl Drop for ProcessGuard {
    fn drop(&mut self) {
        self.0.interrupt();
    }
}

#[derive(Clone)]
pub struct LiveBridge {
    runner: Arc<dyn ProcessRunner>,
    registry: InterfaceRegistry,
    vnstat: String,
    themes: ThemeConfig,
    settings: LiveSettings,
}

impl LiveBridge {
    pub fn new(
        runner: Arc<dyn ProcessRunner>,
        registry: InterfaceRegistry,
        vnstat: impl Into<String>,
        themes: ThemeConfig,
        settings: LiveSettings,
    ) -> Self {
        Self {
            runner,
            registry,
            vnstat: vnstat.into(),
            themes,
            settings,
        }
    }

    /// `-l [-i <iface>] [--config <path>]`
    pub fn invocation(&self, interface: &InterfaceSelection) -> ProcessInvocation {
        let mut args = vec!["-l".to_string()];
        interface.push_args(&mut args);
        if let Some(path) = self.themes.live() {
            args.push("--config".into());
            args.push(path.to_string_lossy().into_owned());
        }
        ProcessInvocation::new(&self.vnstat).args(args)
    }

    /// Drive one session to completion and close the channel.
    pub async fn run<C: LiveChannel>(&self, channel: &mut C, requested: &str) -> SessionEnd {
        let end = self.session(channel, requested).await;
        channel.shutdown().await;
        info!(iface = requested, ?end, "live session ended");
        end
    }

    async fn session<C: LiveChannel>(&self, channel: &mut C, requested: &str) -> SessionEnd {
        let Some(greeting) = channel.handshake().await else {
            debug!("client left before handshake");
            return SessionEnd::HandshakeFailed;
        };
        debug!(%greeting, "received from client");

        let interface = match self.registry.snapshot().await.resolve(requested) {
            Ok(sel) => sel,
            Err(e) => {
                warn!(error = %e, "rejecting live session");
                return SessionEnd::InvalidInterface;
            }
        };

        let invocation = self.invocation(&interface);
        let process = match self.runner.spawn_live(&invocation) {
            Ok(p) => p,
            Err(e) => {
                warn!(%invocation, error = %e, "live process failed to start");
                return SessionEnd::SpawnFailed;
            }
        };
        let _guard = ProcessGuard(process.handle);
        let mut stdout = process.stdout;
        info!(iface = requested, "live session started");

        let mut buf = vec![0u8; self.settings.read_buffer.max(RX_MARKER.len())];
        let mut scanner = RxScanner::new();
        let mut ticker = interval_at(Instant::now() + self.settings.tick, self.settings.tick);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            let read = tokio::select! {
                _ = channel.closed() => return SessionEnd::ClientGone,
                res = async {
                    ticker.tick().await;
                    stdout.read(&mut buf).await
                } => res,
            };
            let n = match read {
                Ok(0) => return SessionEnd::StreamEnded,
                Ok(n) => n,
                Err(e) => {
                    warn!(error = %e, "reading live output failed");
                    return SessionEnd::ReadFailed;
                }
            };
            if let Some(line) = scanner.feed(&buf[..n]) {
                if channel.send_text(line).await.is_err() {
                    return SessionEnd::ClientGone;
                }
            }
        }
    }
}
