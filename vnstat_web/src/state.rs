//! Shared gateway state: the three vnStat-facing components, built once from config.

use std::sync::Arc;

use crate::chart::ChartDispatcher;
use crate::config::GatewayConfig;
use crate::live::LiveBridge;
use crate::registry::InterfaceRegistry;
use crate::runner::ProcessRunner;

#[derive(Clone)]
pub struct AppState {
    pub registry: Arc<InterfaceRegistry>,
    pub charts: Arc<ChartDispatcher>,
    pub live: Arc<LiveBridge>,
}

impl AppState {
    pub fn new(config: &GatewayConfig, runner: Arc<dyn ProcessRunner>) -> Self {
        let registry = InterfaceRegistry::new(runner.clone(), config.tools.vnstat.clone());
        let charts = ChartDispatcher::new(
            runner.clone(),
            config.tools.vnstati.clone(),
            config.themes.clone(),
        );
        let live = LiveBridge::new(
            runner,
            registry.clone(),
            config.tools.vnstat.clone(),
            config.themes.clone(),
            config.live,
        );
        Self {
            registry: Arc::new(registry),
            charts: Arc::new(charts),
            live: Arc::new(live),
        }
    }
}
