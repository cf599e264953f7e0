//! Chart dispatch: turns a validated chart request into a `vnstati` run and
//! returns the PNG it writes to stdout.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{debug, warn};

use crate::config::ThemeConfig;
use crate::error::GatewayResult;
use crate::registry::InterfaceSelection;
use crate::runner::{ProcessInvocation, ProcessRunner};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ChartKind {
    Summary,
    VerticalSummary,
    HorizontalSummary,
    Top,
    Yearly,
    Monthly,
    Daily,
    Hourly,
    HourlyGraph,
    FiveMinute,
    FiveMinuteGraph,
}

impl ChartKind {
    pub const ALL: [ChartKind; 11] = [
        ChartKind::Summary,
        ChartKind::VerticalSummary,
        ChartKind::HorizontalSummary,
        ChartKind::Top,
        ChartKind::Yearly,
        ChartKind::Monthly,
        ChartKind::Daily,
        ChartKind::Hourly,
        ChartKind::HourlyGraph,
        ChartKind::FiveMinute,
        ChartKind::FiveMinuteGraph,
    ];

    /// vnstati mode flag.
    pub fn flag(self) -> &'static str {
        match self {
            ChartKind::Summary => "-s",
            ChartKind::VerticalSummary => "-vs",
            ChartKind::HorizontalSummary => "-hs",
            ChartKind::Top => "-t",
            ChartKind::Yearly => "-y",
            ChartKind::Monthly => "-m",
            ChartKind::Daily => "-d",
            ChartKind::Hourly => "-h",
            ChartKind::HourlyGraph => "-hg",
            ChartKind::FiveMinute => "-5",
            ChartKind::FiveMinuteGraph => "-5g",
        }
    }

    /// Image file stem, served as `/<stem>.png`.
    pub fn stem(self) -> &'static str {
        match self {
            ChartKind::Summary => "summary",
            ChartKind::VerticalSummary => "vsummary",
            ChartKind::HorizontalSummary => "hsummary",
            ChartKind::Top => "top",
            ChartKind::Yearly => "years",
            ChartKind::Monthly => "months",
            ChartKind::Daily => "days",
            ChartKind::Hourly => "hours",
            ChartKind::HourlyGraph => "hoursgraph",
            ChartKind::FiveMinute => "five",
            ChartKind::FiveMinuteGraph => "fivegraph",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// `dark=1` selects the dark theme; any other value (or none) is light.
    pub fn from_query(dark: Option<&str>) -> Theme {
        match dark {
            Some("1") => Theme::Dark,
            _ => Theme::Light,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChartRequest {
    pub kind: ChartKind,
    pub interface: InterfaceSelection,
    pub theme: Theme,
}

#[derive(Clone)]
pub struct ChartDispatcher {
    runner: Arc<dyn ProcessRunner>,
    vnstati: String,
    themes: ThemeConfig,
}

impl ChartDispatcher {
    pub fn new(runner: Arc<dyn ProcessRunner>, vnstati: impl Into<String>, themes: ThemeConfig) -> Self {
        Self {
            runner,
            vnstati: vnstati.into(),
            themes,
        }
    }

    /// `<flag> [-i <iface>] [--config <path>] -o -`
    pub fn invocation(&self, req: &ChartRequest) -> ProcessInvocation {
        let mut args = vec![req.kind.flag().to_string()];
        req.interface.push_args(&mut args);
        if let Some(path) = self.themes.for_theme(req.theme) {
            args.push("--config".into());
            args.push(path.to_string_lossy().into_owned());
        }
        args.push("-o".into());
        args.push("-".into());
        ProcessInvocation::new(&self.vnstati).args(args)
    }

    /// Render one chart. The PNG is returned untouched; on failure nothing
    /// of the partial output is kept.
    pub async fn render(&self, req: &ChartRequest) -> GatewayResult<Bytes> {
        let invocation = self.invocation(req);
        match self.runner.capture(&invocation).await {
            Ok(png) => {
                debug!(kind = req.kind.stem(), bytes = png.len(), "chart rendered");
                Ok(Bytes::from(png))
            }
            Err(e) => {
                warn!(%invocation, error = %e, "chart rendering failed");
                Err(e.into())
            }
        }
    }
}
