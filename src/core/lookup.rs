use crate::domain::model::{Credential, GstinDetails, LookupOutcome, LookupResult};
use crate::domain::ports::{ConfigProvider, GstinLookup};
use crate::utils::error::{EtlError, Result};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use std::time::Duration;
use url::Url;

pub const DEFAULT_ENDPOINT: &str = "http://sheet.gstincheck.co.in";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// HTTP client for the GSTIN check service.
///
/// One GET per identifier, bounded by `timeout`, never retried.
pub struct GstinCheckClient {
    client: Client,
    base_url: String,
    timeout: Duration,
}

impl GstinCheckClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.into(),
            timeout,
        }
    }

    pub fn from_config<C: ConfigProvider>(config: &C) -> Self {
        Self::new(config.api_endpoint(), config.request_timeout())
    }

    /// `<base>/check/<credential>/<gstin>`
    pub fn request_url(&self, credential: &Credential, gstin: &str) -> Result<Url> {
        let mut url = Url::parse(&self.base_url).map_err(|e| EtlError::ConfigError {
            message: format!("invalid lookup endpoint '{}': {}", self.base_url, e),
        })?;

        url.path_segments_mut()
            .map_err(|_| EtlError::ConfigError {
                message: format!("lookup endpoint '{}' cannot take a path", self.base_url),
            })?
            .pop_if_empty()
            .push("check")
            .push(credential.expose())
            .push(gstin);

        Ok(url)
    }

    async fn request(&self, credential: &Credential, gstin: &str) -> Result<LookupOutcome> {
        let url = self.request_url(credential, gstin)?;

        let response = self.client.get(url).timeout(self.timeout).send().await?;
        let status = response.status();
        tracing::debug!("Lookup response status for {}: {}", gstin, status);

        if status != StatusCode::OK {
            return Ok(LookupOutcome::ApiError(status.as_u16()));
        }

        let body: Value = response.json().await?;
        Ok(map_response(&body))
    }
}

#[async_trait::async_trait]
impl GstinLookup for GstinCheckClient {
    async fn fetch(&self, credential: &Credential, gstin: &str) -> LookupResult {
        let outcome = match self.request(credential, gstin).await {
            Ok(outcome) => outcome,
            Err(e) => {
                let message = transport_message(e);
                tracing::warn!("Lookup for {} failed: {}", gstin, message);
                LookupOutcome::TransportError(message)
            }
        };
        LookupResult::new(gstin, outcome)
    }
}

/// Maps a 200 response body onto an outcome.
pub fn map_response(body: &Value) -> LookupOutcome {
    let Some(body) = body.as_object() else {
        return LookupOutcome::TransportError("unexpected response body".to_string());
    };

    if !body.get("flag").is_some_and(is_truthy) {
        return LookupOutcome::NotFound;
    }

    let empty = Value::Object(Default::default());
    let data = body.get("data").filter(|d| d.is_object()).unwrap_or(&empty);

    let principal_place = data
        .get("pradr")
        .map(|pradr| text(pradr, "addr"))
        .unwrap_or_default();

    let nature_of_business = match data.get("nba") {
        Some(Value::Array(items)) => items
            .iter()
            .map(value_to_string)
            .collect::<Vec<_>>()
            .join(", "),
        _ => String::new(),
    };

    LookupOutcome::Success(GstinDetails {
        status: text(data, "sts"),
        legal_name: text(data, "lgnm"),
        trade_name: text(data, "tradeNam"),
        constitution: text(data, "ctb"),
        center_jurisdiction: text(data, "ctj"),
        state_jurisdiction: text(data, "stj"),
        principal_place,
        registration_date: text(data, "rgdt"),
        cancellation_date: text(data, "cxdt"),
        nature_of_business,
        state_code: text(data, "stcd"),
        last_updated: text(data, "lstupdt"),
    })
}

fn text(data: &Value, key: &str) -> String {
    data.get(key).map(value_to_string).unwrap_or_default()
}

fn value_to_string(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        Value::Null => String::new(),
        other => other.to_string(),
    }
}

fn is_truthy(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Bool(b) => *b,
        Value::Number(n) => n.as_f64().is_some_and(|f| f != 0.0),
        Value::String(s) => !s.is_empty(),
        Value::Array(items) => !items.is_empty(),
        Value::Object(map) => !map.is_empty(),
    }
}

// reqwest 錯誤訊息會帶完整 URL (含 API key)，寫入報表前移除
fn transport_message(error: EtlError) -> String {
    match error {
        EtlError::ApiError(e) => error_chain(&e.without_url()),
        other => other.to_string(),
    }
}

fn error_chain(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        message.push_str(": ");
        message.push_str(&cause.to_string());
        source = cause.source();
    }
    message
}
