//! Fake process runner and live channel shared by the integration tests.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::io;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};
use std::time::Duration;

use async_trait::async_trait;
use tokio::io::{AsyncRead, DuplexStream, ReadBuf};
use tokio::time::Instant;

use vnstat_web::config::{GatewayConfig, LiveSettings, ThemeConfig};
use vnstat_web::error::ProcessError;
use vnstat_web::live::{ChannelClosed, LiveChannel};
use vnstat_web::runner::{LiveProcess, ProcessHandle, ProcessInvocation, ProcessRunner};

/// What a fake `vnstat -l` prints.
#[derive(Clone)]
pub enum LiveOutput {
    /// One chunk per read, then end of stream.
    Chunks(Vec<Vec<u8>>),
    /// Never prints anything and never exits.
    Silent,
    /// Prints a marker-less status line on every read and never exits.
    Idle,
    /// First read fails.
    FailRead,
    /// The process can't be started.
    SpawnFails,
}

pub struct FakeRunner {
    interfaces: Option<String>,
    chart: Result<Vec<u8>, String>,
    chart_spawn_fails: bool,
    live: LiveOutput,
    calls: Mutex<Vec<ProcessInvocation>>,
    live_calls: Mutex<Vec<ProcessInvocation>>,
    held_writers: Mutex<Vec<DuplexStream>>,
    interrupts: Arc<AtomicUsize>,
    reads: Arc<AtomicUsize>,
}

impl FakeRunner {
    pub fn new() -> Self {
        Self {
            interfaces: Some("eth0\nlo\n".into()),
            chart: Ok(b"\x89PNG fake".to_vec()),
            chart_spawn_fails: false,
            live: LiveOutput::Silent,
            calls: Mutex::new(Vec::new()),
            live_calls: Mutex::new(Vec::new()),
            held_writers: Mutex::new(Vec::new()),
            interrupts: Arc::new(AtomicUsize::new(0)),
            reads: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// `None` makes `vnstat --iflist` fail.
    pub fn with_interfaces(mut self, out: Option<&str>) -> Self {
        self.interfaces = out.map(str::to_string);
        self
    }

    /// `Err(stderr)` makes vnstati exit non-zero.
    pub fn with_chart(mut self, out: Result<&[u8], &str>) -> Self {
        self.chart = out.map(<[u8]>::to_vec).map_err(str::to_string);
        self
    }

    /// vnstati can't be started at all.
    pub fn with_chart_spawn_failure(mut self) -> Self {
        self.chart_spawn_fails = true;
        self
    }

    pub fn with_live(mut self, live: LiveOutput) -> Self {
        self.live = live;
        self
    }

    pub fn calls(&self) -> Vec<ProcessInvocation> {
        self.calls.lock().unwrap().clone()
    }

    /// Captured runs other than interface listing.
    pub fn chart_calls(&self) -> Vec<ProcessInvocation> {
        self.calls()
            .into_iter()
            .filter(|c| c.args.first().map(String::as_str) != Some("--iflist"))
            .collect()
    }

    pub fn live_calls(&self) -> Vec<ProcessInvocation> {
        self.live_calls.lock().unwrap().clone()
    }

    pub fn interrupts(&self) -> usize {
        self.interrupts.load(Ordering::SeqCst)
    }

    /// Reads served so far by `LiveOutput::Idle`.
    pub fn reads(&self) -> usize {
        self.reads.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ProcessRunner for FakeRunner {
    async fn capture(&self, invocation: &ProcessInvocation) -> Result<Vec<u8>, ProcessError> {
        self.calls.lock().unwrap().push(invocation.clone());
        let failed = |stderr: &str| ProcessError::Exited {
            program: invocation.program.clone(),
            status: "exit status: 1".into(),
            stderr: stderr.to_string(),
        };
        if invocation.args.first().map(String::as_str) == Some("--iflist") {
            return self
                .interfaces
                .clone()
                .map(String::into_bytes)
                .ok_or_else(|| failed("Error: database not found"));
        }
        if self.chart_spawn_fails {
            return Err(ProcessError::Spawn {
                program: invocation.program.clone(),
                source: io::Error::new(io::ErrorKind::NotFound, "vnstati-missing-diag"),
            });
        }
        self.chart.clone().map_err(|e| failed(&e))
    }

    fn spawn_live(&self, invocation: &ProcessInvocation) -> Result<LiveProcess, ProcessError> {
        self.live_calls.lock().unwrap().push(invocation.clone());
        let stdout: Box<dyn AsyncRead + Send + Unpin> = match &self.live {
            LiveOutput::Chunks(chunks) => Box::new(ChunkReader(chunks.iter().cloned().collect())),
            LiveOutput::Silent => {
                let (reader, writer) = tokio::io::duplex(64);
                self.held_writers.lock().unwrap().push(writer);
                Box::new(reader)
            }
            LiveOutput::Idle => Box::new(IdleReader(self.reads.clone())),
            LiveOutput::FailRead => Box::new(FailingReader),
            LiveOutput::SpawnFails => {
                return Err(ProcessError::Spawn {
                    program: invocation.program.clone(),
                    source: io::Error::new(io::ErrorKind::NotFound, "no such file"),
                })
            }
        };
        Ok(LiveProcess {
            stdout,
            handle: Box::new(CountingHandle(self.interrupts.clone())),
        })
    }
}

struct CountingHandle(Arc<AtomicUsize>);

impl ProcessHandle for CountingHandle {
    fn interrupt(&mut self) {
        self.0.fetch_add(1, Ordering::SeqCst);
    }
}

/// Yields one queued chunk per read; empty queue means end of stream.
pub struct ChunkReader(pub VecDeque<Vec<u8>>);

impl AsyncRead for ChunkReader {
    fn poll_read(
        mut self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        if let Some(mut chunk) = self.0.pop_front() {
            let n = chunk.len().min(buf.remaining());
            buf.put_slice(&chunk[..n]);
            if n < chunk.len() {
                let rest = chunk.split_off(n);
                self.0.push_front(rest);
            }
        }
        Poll::Ready(Ok(()))
    }
}

/// Always ready with a line that carries no `rx:` marker; counts every poll.
struct IdleReader(Arc<AtomicUsize>);

impl AsyncRead for IdleReader {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        self.0.fetch_add(1, Ordering::SeqCst);
        let line = b"idle\n";
        let n = line.len().min(buf.remaining());
        buf.put_slice(&line[..n]);
        Poll::Ready(Ok(()))
    }
}

struct FailingReader;

impl AsyncRead for FailingReader {
    fn poll_read(
        self: Pin<&mut Self>,
        _cx: &mut Context<'_>,
        _buf: &mut ReadBuf<'_>,
    ) -> Poll<io::Result<()>> {
        Poll::Ready(Err(io::Error::new(io::ErrorKind::BrokenPipe, "pipe closed")))
    }
}

/// In-memory client connection.
pub struct FakeChannel {
    pub greeting: Option<String>,
    pub close_at: Option<Instant>,
    pub fail_send: bool,
    pub sent: Vec<String>,
    pub shutdowns: usize,
}

impl FakeChannel {
    pub fn greeting(text: &str) -> Self {
        Self {
            greeting: Some(text.to_string()),
            close_at: None,
            fail_send: false,
            sent: Vec::new(),
            shutdowns: 0,
        }
    }

    pub fn silent() -> Self {
        Self {
            greeting: None,
            ..Self::greeting("")
        }
    }

    pub fn closing_after(mut self, after: Duration) -> Self {
        self.close_at = Some(Instant::now() + after);
        self
    }
}

#[async_trait]
impl LiveChannel for FakeChannel {
    async fn handshake(&mut self) -> Option<String> {
        self.greeting.take()
    }

    async fn closed(&mut self) {
        match self.close_at {
            Some(at) => tokio::time::sleep_until(at).await,
            None => std::future::pending::<()>().await,
        }
    }

    async fn send_text(&mut self, text: String) -> Result<(), ChannelClosed> {
        if self.fail_send {
            return Err(ChannelClosed);
        }
        self.sent.push(text);
        Ok(())
    }

    async fn shutdown(&mut self) {
        self.shutdowns += 1;
    }
}

pub fn test_config(themes: ThemeConfig) -> GatewayConfig {
    GatewayConfig {
        themes,
        live: LiveSettings {
            tick: Duration::from_millis(10),
            read_buffer: 1024,
        },
        ..GatewayConfig::default()
    }
}
