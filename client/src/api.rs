//! REST API wrapper for the remote cluster-management backend.
//!
//! One typed method per logical fetch. The backend is an opaque external
//! collaborator: this layer only shapes requests, attaches the bearer
//! token, and maps response statuses onto the client error taxonomy.

use std::sync::RwLock;
use std::time::Duration;

use serde::de::DeserializeOwned;
use uuid::Uuid;

use common::config::AppConfig;
use common::errors::{AppError, AppResult};
use common::models::{
    AlertList, ClusterDetail, ClusterSummary, LoginRequest, LoginResponse, MonitorInfo,
    ProxyRecord, ServerRecord,
};

/// Header carrying the per-request id, mirrored from request logs.
const REQUEST_ID_HEADER: &str = "x-request-id";

/// HTTP client for the remote cluster-management API.
pub struct ApiClient {
    base: String,
    http: reqwest::Client,
    /// Bearer token of the current session, if any.
    token: RwLock<Option<String>>,
}

impl ApiClient {
    /// Creates a client from configuration, with a shared request timeout.
    pub fn new(config: &AppConfig) -> AppResult<Self> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;
        Ok(Self {
            base: config.api_base().to_string(),
            http,
            token: RwLock::new(None),
        })
    }

    /// Installs or clears the bearer token used by authenticated calls.
    pub fn set_token(&self, token: Option<String>) {
        if let Ok(mut guard) = self.token.write() {
            *guard = token;
        }
    }

    fn bearer(&self) -> AppResult<String> {
        self.token
            .read()
            .ok()
            .and_then(|guard| guard.clone())
            .ok_or(AppError::NotLoggedIn)
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base, path)
    }

    /// Issues an authenticated GET and decodes the JSON body.
    async fn get_json<T: DeserializeOwned>(&self, path: &str) -> AppResult<T> {
        let url = self.url(path);
        let response = self
            .http
            .get(&url)
            .bearer_auth(self.bearer()?)
            .header(REQUEST_ID_HEADER, Uuid::new_v4().to_string())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::from_status(status.as_u16(), &url));
        }
        let body = response.text().await?;
        Ok(serde_json::from_str(&body)?)
    }

    /// Logs in with credentials; returns the bearer token.
    pub async fn login(&self, request: &LoginRequest) -> AppResult<LoginResponse> {
        self.post_login("/api/login", request).await
    }

    /// Logs in against the git-backed account endpoint.
    pub async fn login_git(&self, request: &LoginRequest) -> AppResult<LoginResponse> {
        self.post_login("/api/login-git", request).await
    }

    async fn post_login(&self, path: &str, request: &LoginRequest) -> AppResult<LoginResponse> {
        let url = self.url(path);
        let response = self
            .http
            .post(&url)
            .header(REQUEST_ID_HEADER, Uuid::new_v4().to_string())
            .json(request)
            .send()
            .await?;

        let status = response.status();
        match status.as_u16() {
            // On the login path a 401 means bad credentials, not an
            // expired session: the form shows an inline message.
            401 => Err(AppError::InvalidCredentials(
                "username or password rejected".to_string(),
            )),
            429 => Err(AppError::RateLimited),
            s if !status.is_success() => Err(AppError::Http {
                status: s,
                url,
            }),
            _ => {
                let body = response.text().await?;
                Ok(serde_json::from_str(&body)?)
            }
        }
    }

    /// Fetches the cluster list.
    pub async fn clusters(&self) -> AppResult<Vec<ClusterSummary>> {
        self.get_json("/api/clusters").await
    }

    /// Fetches global monitor info.
    pub async fn monitor(&self) -> AppResult<MonitorInfo> {
        self.get_json("/api/monitor").await
    }

    /// Fetches the detail of one cluster.
    pub async fn cluster(&self, name: &str) -> AppResult<ClusterDetail> {
        self.get_json(&format!("/api/clusters/{name}")).await
    }

    /// Fetches the database servers of one cluster.
    pub async fn servers(&self, name: &str) -> AppResult<Vec<ServerRecord>> {
        self.get_json(&format!("/api/clusters/{name}/topology/servers"))
            .await
    }

    /// Fetches the proxies of one cluster.
    pub async fn proxies(&self, name: &str) -> AppResult<Vec<ProxyRecord>> {
        self.get_json(&format!("/api/clusters/{name}/topology/proxies"))
            .await
    }

    /// Fetches the replicating slaves of one cluster.
    pub async fn slaves(&self, name: &str) -> AppResult<Vec<ServerRecord>> {
        self.get_json(&format!("/api/clusters/{name}/topology/slaves"))
            .await
    }

    /// Fetches the active alerts of one cluster.
    pub async fn alerts(&self, name: &str) -> AppResult<AlertList> {
        self.get_json(&format!("/api/clusters/{name}/topology/alerts"))
            .await
    }

    /// Fetches the elected master of one cluster.
    pub async fn master(&self, name: &str) -> AppResult<ServerRecord> {
        self.get_json(&format!("/api/clusters/{name}/topology/master"))
            .await
    }

    /// Fires a one-shot action trigger; the body is ignored beyond
    /// success/failure.
    pub async fn trigger(&self, path: &str) -> AppResult<()> {
        let url = self.url(path);
        let response = self
            .http
            .get(&url)
            .bearer_auth(self.bearer()?)
            .header(REQUEST_ID_HEADER, Uuid::new_v4().to_string())
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AppError::from_status(status.as_u16(), &url));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_client() -> ApiClient {
        let mut config = AppConfig::load_with_service("test");
        config.api_url = "http://backend:10001/".to_string();
        ApiClient::new(&config).expect("client")
    }

    #[test]
    fn test_urls_have_no_double_slash() {
        let client = test_client();
        assert_eq!(
            client.url("/api/clusters"),
            "http://backend:10001/api/clusters"
        );
    }

    #[tokio::test]
    async fn test_calls_without_token_fail_fast() {
        let client = test_client();
        let err = client.clusters().await.expect_err("no token");
        assert!(matches!(err, AppError::NotLoggedIn));
    }
}
