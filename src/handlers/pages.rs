//! HTML pages

use axum::{
    extract::{Path, Query, State},
    http::{StatusCode, Uri},
    response::{Html, IntoResponse, Response},
};
use minijinja::context;
use serde::Deserialize;

use super::{AppState, ClientInfo, PageParams};
use crate::error::AppError;
use crate::ledger::{clamp_page_count, resolve_window};
use crate::metrics;
use crate::templates::render_template;

#[derive(Debug, Default, Deserialize)]
pub struct StatsParams {
    pub fast: Option<String>,
}

impl StatsParams {
    pub fn is_fast(&self) -> bool {
        self.fast.as_deref() == Some("true")
    }
}

/// Handle `/`: host stats plus the request total
pub async fn stats_page(
    State(state): State<AppState>,
    client: ClientInfo,
    Query(params): Query<StatsParams>,
) -> Result<Html<String>, AppError> {
    state.log_request(&client).await;
    metrics::record_page("/");

    let started = std::time::Instant::now();
    let snapshot = state.sampler.snapshot(params.is_fast()).await;
    metrics::record_sample_duration(params.is_fast(), started.elapsed());

    let html = render_template(
        "stats.html",
        context! {
            hostname => snapshot.info.hostname.clone().unwrap_or_default(),
            sections => snapshot.sections(),
            fast => params.is_fast(),
            req_total => state.ledger.total_requests().await,
        },
    )?;

    Ok(Html(html))
}

/// Handle `/servers`: id-range page over registered servers
pub async fn servers_page(
    State(state): State<AppState>,
    client: ClientInfo,
    Query(params): Query<PageParams>,
) -> Result<Html<String>, AppError> {
    state.log_request(&client).await;
    metrics::record_page("/servers");

    let (pn_start, pn_count) = (params.start(), clamp_page_count(params.count()));
    let page = state.ledger.list_servers(pn_start, pn_count).await;
    let total = state.ledger.total_servers().await;
    let (prev_start, next_start) = neighbours(pn_start, pn_count, total);

    let html = render_template(
        "servers.html",
        context! {
            no_data => page.is_no_data(),
            rows => page.rows(),
            pn_start,
            pn_count,
            prev_start,
            next_start,
            req_total => state.ledger.total_requests().await,
        },
    )?;

    Ok(Html(html))
}

/// Handle `/requests`: id-range page over the request log
pub async fn requests_page(
    State(state): State<AppState>,
    client: ClientInfo,
    Query(params): Query<PageParams>,
) -> Result<Html<String>, AppError> {
    state.log_request(&client).await;
    metrics::record_page("/requests");

    let (pn_start, pn_count) = (params.start(), clamp_page_count(params.count()));
    let page = state.ledger.list_requests(pn_start, pn_count).await;
    let total = state.ledger.total_requests().await;
    let (prev_start, next_start) = neighbours(pn_start, pn_count, total);

    let html = render_template(
        "requests.html",
        context! {
            no_data => page.is_no_data(),
            rows => page.rows(),
            pn_start,
            pn_count,
            prev_start,
            next_start,
            req_total => total,
        },
    )?;

    Ok(Html(html))
}

/// Handle `/servers/{server_id}`: one server's requests, offset-paged
pub async fn server_requests_page(
    State(state): State<AppState>,
    client: ClientInfo,
    Path(server_id): Path<String>,
    Query(params): Query<PageParams>,
    uri: Uri,
) -> Result<Response, AppError> {
    let Ok(server_id) = server_id.parse::<i64>() else {
        return not_found(State(state), client, uri).await;
    };

    state.log_request(&client).await;
    metrics::record_page("/servers/{server_id}");

    let (page_number, pn_count) = (params.page().max(1), clamp_page_count(params.count()));
    let page = state
        .ledger
        .list_requests_for_server(server_id, page_number, pn_count)
        .await;
    let (hostname, ip) = state.ledger.server_socket(server_id).await.unzip();

    let html = render_template(
        "server_requests.html",
        context! {
            server_id,
            hostname,
            ip,
            last_request => state.ledger.last_request_for_server(server_id).await,
            no_data => page.is_no_data(),
            rows => page.rows(),
            page => page_number,
            pn_count,
            req_total => state.ledger.total_requests().await,
        },
    )?;

    Ok(Html(html).into_response())
}

/// Fallback for unknown paths; still logged in the ledger
pub async fn not_found(
    State(state): State<AppState>,
    client: ClientInfo,
    uri: Uri,
) -> Result<Response, AppError> {
    state.log_request(&client).await;
    metrics::record_page("404");
    tracing::info!(path = %uri.path(), "Page not found");

    let html = render_template(
        "404.html",
        context! {
            path => uri.path(),
            req_total => state.ledger.total_requests().await,
        },
    )?;

    Ok((StatusCode::NOT_FOUND, Html(html)).into_response())
}

/// Start ids for the previous and next pager links
fn neighbours(pn_start: i64, pn_count: i64, total: i64) -> (i64, i64) {
    let (min, _) = resolve_window(pn_start, pn_count, total);
    ((min - pn_count).max(1), min + pn_count)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_params_fast_flag() {
        assert!(StatsParams { fast: Some("true".to_string()) }.is_fast());
        assert!(!StatsParams { fast: Some("yes".to_string()) }.is_fast());
        assert!(!StatsParams::default().is_fast());
    }

    #[test]
    fn test_neighbours() {
        assert_eq!(neighbours(1, 10, 100), (1, 11));
        assert_eq!(neighbours(21, 10, 100), (11, 31));
        // Past the end the window snaps back before the links are built
        assert_eq!(neighbours(500, 10, 25), (6, 26));
    }
}
