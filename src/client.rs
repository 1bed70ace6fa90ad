use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;

pub const PRODUCT_TYPES_FIELD: &str = "bulkOrderProductTypes";
pub const BENEFITS_FIELD: &str = "bulkOrderBenefits";

/// Site settings as returned by GET /site-settings, reduced to the two
/// bulk-order fields the suite exercises. Extra backend fields are ignored.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SiteSettings {
    pub bulk_order_product_types: Vec<String>,
    pub bulk_order_benefits: Vec<String>,
}

/// Partial PUT body. A `None` field is omitted from the JSON entirely so the
/// backend leaves it unchanged.
#[derive(Debug, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bulk_order_product_types: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bulk_order_benefits: Option<Vec<String>>,
}

/// Status and raw body of one backend response.
#[derive(Debug)]
pub struct ApiResponse {
    pub status: reqwest::StatusCode,
    pub body: String,
}

impl ApiResponse {
    pub fn is_ok(&self) -> bool {
        self.status == reqwest::StatusCode::OK
    }

    pub fn json(&self) -> Result<Value> {
        serde_json::from_str(&self.body)
            .with_context(|| format!("response body is not valid JSON: {}", self.snippet()))
    }

    /// First line of the body, truncated, for failure detail lines.
    pub fn snippet(&self) -> String {
        let line = self.body.lines().next().unwrap_or("").trim();
        match line.char_indices().nth(120) {
            Some((idx, _)) => format!("{}...", &line[..idx]),
            None => line.to_string(),
        }
    }
}

/// HTTP access to one backend. One underlying `reqwest::Client` is reused for
/// every call in a run so connections are reused; calls are strictly
/// sequential and rely on the transport's default timeouts.
pub struct SettingsClient {
    http: reqwest::Client,
    base_url: String,
}

impl SettingsClient {
    pub fn new(base_url: &str) -> Self {
        SettingsClient {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get_root(&self) -> Result<ApiResponse> {
        self.get(format!("{}/", self.base_url)).await
    }

    pub async fn get_settings(&self) -> Result<ApiResponse> {
        self.get(format!("{}/site-settings", self.base_url)).await
    }

    pub async fn put_settings(&self, update: &SettingsUpdate) -> Result<ApiResponse> {
        let url = format!("{}/site-settings", self.base_url);
        let resp = self
            .http
            .put(&url)
            .json(update)
            .send()
            .await
            .with_context(|| format!("PUT {url} failed"))?;
        Self::read(resp).await
    }

    async fn get(&self, url: String) -> Result<ApiResponse> {
        let resp = self
            .http
            .get(&url)
            .send()
            .await
            .with_context(|| format!("GET {url} failed"))?;
        Self::read(resp).await
    }

    async fn read(resp: reqwest::Response) -> Result<ApiResponse> {
        let status = resp.status();
        let body = resp.text().await.context("failed to read response body")?;
        Ok(ApiResponse { status, body })
    }
}

/// Check that both bulk-order fields are present and array-typed, then convert
/// into a typed `SiteSettings`. The error string names the exact shape problem
/// so it can go straight into a check's detail line.
pub fn validate_settings(body: &Value) -> Result<SiteSettings, String> {
    let obj = body
        .as_object()
        .ok_or_else(|| "settings body is not a JSON object".to_string())?;

    let missing: Vec<&str> = [PRODUCT_TYPES_FIELD, BENEFITS_FIELD]
        .into_iter()
        .filter(|f| !obj.contains_key(*f))
        .collect();
    if !missing.is_empty() {
        return Err(format!("missing fields: {}", missing.join(", ")));
    }

    for field in [PRODUCT_TYPES_FIELD, BENEFITS_FIELD] {
        if !obj[field].is_array() {
            return Err(format!("{field} is not a list"));
        }
    }

    serde_json::from_value(body.clone()).map_err(|e| format!("malformed settings: {e}"))
}
