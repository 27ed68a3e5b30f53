use bytes::Bytes;
use reqwest::header::{HeaderMap, HeaderValue, COOKIE};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;

use crate::config::Config;
use crate::error::AppError;
use crate::models::{
    AnalysisResult, AuthStatus, CxAnalysis, IntegrationStatus, ReportQuery, ReviewSync,
    TrendPoint, TrendUnit,
};

/// Thin wrapper over the CX backend's HTTP API. Session cookies are kept in
/// the client's cookie store, so every call carries the same session.
#[derive(Debug, Clone)]
pub struct BackendClient {
    client: Client,
    base_url: String,
}

impl BackendClient {
    pub fn new(config: &Config) -> Result<Self, AppError> {
        let mut headers = HeaderMap::new();
        if let Some(cookie) = &config.session_cookie {
            let value = HeaderValue::from_str(cookie)
                .map_err(|e| AppError::Config(format!("Invalid CX_SESSION_COOKIE: {}", e)))?;
            headers.insert(COOKIE, value);
        }

        let mut builder = Client::builder()
            .cookie_store(true)
            .default_headers(headers);
        if let Some(timeout) = config.request_timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| AppError::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: config.api_url.trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    pub async fn auth_status(&self) -> Result<AuthStatus, AppError> {
        let response = self.client.get(self.url("/auth/status")).send().await?;
        read_json(response).await
    }

    /// The response body is ignored; only the server-side effect matters.
    pub async fn logout(&self) -> Result<(), AppError> {
        let response = self.client.post(self.url("/auth/logout")).send().await?;
        ensure_success(response).await.map(|_| ())
    }

    pub async fn google_status(&self) -> Result<IntegrationStatus, AppError> {
        let response = self
            .client
            .get(self.url("/integrations/google/status"))
            .send()
            .await?;
        read_json(response).await
    }

    /// Pulls new Google reviews for one store into the backend's database.
    pub async fn sync_reviews(&self, store_id: &str) -> Result<ReviewSync, AppError> {
        let response = self
            .client
            .post(self.url("/reviews/sync"))
            .query(&[("store_id", store_id)])
            .send()
            .await?;
        read_json(response).await
    }

    /// Uploads the original file bytes as a single multipart part named `file`.
    pub async fn analyze_file(
        &self,
        file_name: &str,
        mime: &str,
        bytes: Bytes,
    ) -> Result<AnalysisResult, AppError> {
        tracing::info!("Submitting {} ({}KB) for analysis", file_name, bytes.len() / 1024);

        let part = Part::bytes(bytes.to_vec())
            .file_name(file_name.to_string())
            .mime_str(mime)?;
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(self.url("/analysis/file"))
            .multipart(form)
            .send()
            .await?;

        let value: Value = read_json(response).await?;
        Ok(AnalysisResult(value))
    }

    pub async fn cx_analysis(&self, query: &ReportQuery) -> Result<CxAnalysis, AppError> {
        let response = self
            .client
            .post(self.url("/analysis/cx-analysis"))
            .query(&query.query_pairs())
            .send()
            .await?;

        let value: Value = read_json(response).await?;
        CxAnalysis::from_value(value)
    }

    pub async fn rating_trend(
        &self,
        query: &ReportQuery,
        unit: TrendUnit,
    ) -> Result<Vec<TrendPoint>, AppError> {
        let mut params = query.query_pairs();
        params.insert(1, ("unit", unit.as_str().to_string()));

        let response = self
            .client
            .get(self.url("/dashboard/rating-trend"))
            .query(&params)
            .send()
            .await?;
        read_json(response).await
    }
}

async fn ensure_success(response: Response) -> Result<Response, AppError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response.text().await.unwrap_or_default();
    tracing::warn!("Backend returned {}: {}", status, body);
    Err(AppError::HttpError(format!("Request failed. Status: {}", status)))
}

async fn read_json<T: DeserializeOwned>(response: Response) -> Result<T, AppError> {
    let response = ensure_success(response).await?;
    let body = response
        .bytes()
        .await
        .map_err(|e| AppError::HttpError(format!("Failed to read response bytes: {}", e)))?;
    Ok(serde_json::from_slice(&body)?)
}
