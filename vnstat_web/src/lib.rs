//! vnstat_web: HTTP/WebSocket front end for vnStat.
//!
//! Charts are rendered by `vnstati` per request; `/live` relays `vnstat -l`
//! output to the browser. All subprocess access goes through [`runner::ProcessRunner`].

pub mod chart;
pub mod config;
pub mod error;
pub mod live;
pub mod pages;
pub mod registry;
pub mod routes;
pub mod runner;
pub mod state;
pub mod tls;
pub mod ws;

pub use routes::router;
pub use state::AppState;
