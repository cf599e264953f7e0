//! Interface registry: which interfaces vnStat knows about, and validation of
//! user-supplied names against that list.

use std::fmt;
use std::sync::Arc;

use tracing::warn;

use crate::error::{GatewayError, GatewayResult};
use crate::runner::{ProcessInvocation, ProcessRunner};

/// An interface name that matched a registry snapshot exactly.
///
/// Only `InterfaceSnapshot::resolve` creates these, so any value of this type
/// that ends up in a process invocation has been validated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceName(String);

impl InterfaceName {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for InterfaceName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Interface choice carried by a chart or live request.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InterfaceSelection {
    /// Let vnStat pick its default interface.
    #[default]
    Default,
    Named(InterfaceName),
}

impl InterfaceSelection {
    pub fn name(&self) -> Option<&InterfaceName> {
        match self {
            InterfaceSelection::Default => None,
            InterfaceSelection::Named(n) => Some(n),
        }
    }

    /// `-i <name>` when an interface was named.
    pub fn push_args(&self, args: &mut Vec<String>) {
        if let InterfaceSelection::Named(n) = self {
            args.push("-i".into());
            args.push(n.0.clone());
        }
    }
}

/// Interface list as reported by vnStat at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InterfaceSnapshot {
    names: Vec<String>,
}

impl InterfaceSnapshot {
    pub fn new(names: Vec<String>) -> Self {
        Self { names }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn is_valid(&self, name: &str) -> bool {
        name.is_empty() || self.names.iter().any(|n| n == name)
    }

    pub fn resolve(&self, name: &str) -> GatewayResult<InterfaceSelection> {
        if name.is_empty() {
            return Ok(InterfaceSelection::Default);
        }
        match self.names.iter().find(|n| *n == name) {
            Some(n) => Ok(InterfaceSelection::Named(InterfaceName(n.clone()))),
            None => Err(GatewayError::UnknownInterface(name.to_string())),
        }
    }
}

/// Split `vnstat --iflist 1` output into names, keeping vnStat's order.
pub fn parse_interface_list(stdout: &[u8]) -> Vec<String> {
    String::from_utf8_lossy(stdout)
        .split('\n')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

#[derive(Clone)]
pub struct InterfaceRegistry {
    runner: Arc<dyn ProcessRunner>,
    vnstat: String,
}

impl InterfaceRegistry {
    pub fn new(runner: Arc<dyn ProcessRunner>, vnstat: impl Into<String>) -> Self {
        Self {
            runner,
            vnstat: vnstat.into(),
        }
    }

    pub fn invocation(&self) -> ProcessInvocation {
        ProcessInvocation::new(&self.vnstat).args(["--iflist", "1"])
    }

    /// Interfaces known to vnStat. Empty when vnStat can't be queried, which
    /// makes every non-empty name invalid.
    pub async fn list_interfaces(&self) -> Vec<String> {
        match self.runner.capture(&self.invocation()).await {
            Ok(out) => parse_interface_list(&out),
            Err(e) => {
                warn!(error = %e, "listing interfaces failed");
                Vec::new()
            }
        }
    }

    pub async fn snapshot(&self) -> InterfaceSnapshot {
        InterfaceSnapshot::new(self.list_interfaces().await)
    }

    pub async fn is_valid(&self, name: &str) -> bool {
        if name.is_empty() {
            return true;
        }
        self.snapshot().await.is_valid(name)
    }
}
