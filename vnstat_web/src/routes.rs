//! HTTP routes: pages, chart images and the live WebSocket.

use axum::{
    extract::{rejection::QueryRejection, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::get,
    Router,
};
use serde::Deserialize;
use tracing::warn;

use crate::chart::{ChartKind, ChartRequest, Theme};
use crate::error::GatewayError;
use crate::pages::{render_page, Page};
use crate::state::AppState;
use crate::ws::live_handler;

/// Query as extracted by the handlers; rejections are turned into [`GatewayError`].
pub type QueryResult<T> = Result<Query<T>, QueryRejection>;

#[derive(Debug, Default, Deserialize)]
pub struct IfaceQuery {
    pub iface: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ChartQuery {
    pub iface: Option<String>,
    pub dark: Option<String>,
}

pub fn router(state: AppState) -> Router {
    let mut app = Router::new().route("/", get(index)).route("/live", get(live_handler));

    for page in Page::ALL {
        app = app.route(
            &format!("/{}", page.path()),
            get(move |state: State<AppState>, q: QueryResult<IfaceQuery>| page_handler(page, state, q)),
        );
    }
    for kind in ChartKind::ALL {
        app = app.route(
            &format!("/{}.png", kind.stem()),
            get(move |state: State<AppState>, q: QueryResult<ChartQuery>| chart_handler(kind, state, q)),
        );
    }
    app.with_state(state)
}

/// Repeated or malformed parameters are rejected before any process runs.
pub(crate) fn accept_query<T>(query: QueryResult<T>, route: &str) -> Result<T, GatewayError> {
    query.map(|Query(q)| q).map_err(|rejection| {
        let reason = rejection.body_text();
        warn!(error = %reason, route, "rejecting query string");
        GatewayError::InvalidQuery(reason)
    })
}

async fn index() -> impl IntoResponse {
    (StatusCode::MOVED_PERMANENTLY, [(header::LOCATION, "/summary")])
}

async fn page_handler(
    page: Page,
    State(state): State<AppState>,
    query: QueryResult<IfaceQuery>,
) -> Response {
    let q = match accept_query(query, page.path()) {
        Ok(q) => q,
        Err(e) => return e.into_response(),
    };
    let requested = q.iface.unwrap_or_default();
    // one listing serves both validation and the interface picker
    let snapshot = state.registry.snapshot().await;
    let selected = match snapshot.resolve(&requested) {
        Ok(s) => s,
        Err(e) => {
            warn!(error = %e, page = page.path(), "rejecting page request");
            return e.into_response();
        }
    };
    let body = render_page(page, &selected, snapshot.names());
    (
        [(header::EXPIRES, "0"), (header::REFRESH, "300")],
        Html(body),
    )
        .into_response()
}

async fn chart_handler(
    kind: ChartKind,
    State(state): State<AppState>,
    query: QueryResult<ChartQuery>,
) -> Result<Response, GatewayError> {
    let q = accept_query(query, kind.stem())?;
    let requested = q.iface.unwrap_or_default();
    let interface = state
        .registry
        .snapshot()
        .await
        .resolve(&requested)
        .inspect_err(|e| warn!(error = %e, chart = kind.stem(), "rejecting chart request"))?;
    let req = ChartRequest {
        kind,
        interface,
        theme: Theme::from_query(q.dark.as_deref()),
    };
    let png = state.charts.render(&req).await?;
    Ok(([(header::CONTENT_TYPE, "image/png")], png).into_response())
}
