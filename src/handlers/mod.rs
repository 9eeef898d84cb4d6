pub mod export;
pub mod health;
pub mod metrics_handler;
pub mod pages;

use axum::{
    async_trait,
    extract::{ConnectInfo, FromRequestParts},
    http::{header, request::Parts},
};
use serde::Deserialize;
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;

use crate::ledger::{LedgerStore, DEFAULT_PAGE_COUNT, DEFAULT_PAGE_START};
use crate::metrics;
use crate::stats::StatsSampler;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub ledger: Arc<LedgerStore>,
    pub sampler: StatsSampler,
}

impl AppState {
    pub fn new(ledger: Arc<LedgerStore>) -> Self {
        Self {
            ledger,
            sampler: StatsSampler::new(),
        }
    }

    /// Append the request to the ledger before a page is built
    pub async fn log_request(&self, client: &ClientInfo) {
        let written = self
            .ledger
            .put_request(
                client.remote_addr.as_deref(),
                client.user_agent.as_deref(),
                Some(&client.url),
            )
            .await;
        metrics::record_ledger_write(written);
    }
}

/// Who asked for a page
#[derive(Debug, Clone, PartialEq)]
pub struct ClientInfo {
    /// Peer IP of the connection
    pub remote_addr: Option<String>,
    pub user_agent: Option<String>,
    /// `http://{Host}{path}?{query}`, or just the path when `Host` is absent
    pub url: String,
}

#[async_trait]
impl<S> FromRequestParts<S> for ClientInfo
where
    S: Send + Sync,
{
    type Rejection = Infallible;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let remote_addr = ConnectInfo::<SocketAddr>::from_request_parts(parts, state)
            .await
            .ok()
            .map(|ConnectInfo(addr)| addr.ip().to_string());

        let user_agent = parts
            .headers
            .get(header::USER_AGENT)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        let path = parts
            .uri
            .path_and_query()
            .map(|pq| pq.as_str())
            .unwrap_or("/");
        let url = match parts.headers.get(header::HOST).and_then(|v| v.to_str().ok()) {
            Some(host) => format!("http://{}{}", host, path),
            None => path.to_string(),
        };

        Ok(Self {
            remote_addr,
            user_agent,
            url,
        })
    }
}

/// Pagination query parameters
///
/// Kept as strings so a non-numeric value falls back to its default instead
/// of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct PageParams {
    pub pnstart: Option<String>,
    pub pncount: Option<String>,
    pub page: Option<String>,
}

impl PageParams {
    pub fn start(&self) -> i64 {
        parse_or(self.pnstart.as_deref(), DEFAULT_PAGE_START)
    }

    pub fn count(&self) -> i64 {
        parse_or(self.pncount.as_deref(), DEFAULT_PAGE_COUNT)
    }

    pub fn page(&self) -> i64 {
        parse_or(self.page.as_deref(), 1)
    }
}

fn parse_or(value: Option<&str>, default: i64) -> i64 {
    value
        .and_then(|v| v.trim().parse::<i64>().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::Request;

    #[test]
    fn test_page_params_defaults() {
        let params = PageParams::default();
        assert_eq!(params.start(), 1);
        assert_eq!(params.count(), 10);
        assert_eq!(params.page(), 1);
    }

    #[test]
    fn test_page_params_non_numeric_fall_back() {
        let params = PageParams {
            pnstart: Some("abc".to_string()),
            pncount: Some(" 25 ".to_string()),
            page: Some("2.5".to_string()),
        };
        assert_eq!(params.start(), 1);
        assert_eq!(params.count(), 25);
        assert_eq!(params.page(), 1);
    }

    #[tokio::test]
    async fn test_client_info_from_parts() {
        let request = Request::builder()
            .uri("/servers?pnstart=3")
            .header(header::HOST, "stats.local:8080")
            .header(header::USER_AGENT, "curl/8.0")
            .extension(ConnectInfo(SocketAddr::from(([10, 1, 2, 3], 5555))))
            .body(())
            .unwrap();
        let (mut parts, _) = request.into_parts();

        let client = ClientInfo::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(client.remote_addr.as_deref(), Some("10.1.2.3"));
        assert_eq!(client.user_agent.as_deref(), Some("curl/8.0"));
        assert_eq!(client.url, "http://stats.local:8080/servers?pnstart=3");
    }

    #[tokio::test]
    async fn test_client_info_without_connection_or_headers() {
        let request = Request::builder().uri("/json").body(()).unwrap();
        let (mut parts, _) = request.into_parts();

        let client = ClientInfo::from_request_parts(&mut parts, &()).await.unwrap();
        assert_eq!(client.remote_addr, None);
        assert_eq!(client.user_agent, None);
        assert_eq!(client.url, "/json");
    }
}
