//! Venmo API Client
//!
//! HTTP client for the Venmo REST API, authenticated with a personal access
//! token. All requests carry an explicit timeout so a hung provider call
//! can never stall a caller indefinitely.

use std::time::Duration;

use async_trait::async_trait;
use rust_decimal::Decimal;
use serde_json::{Value, json};

use super::{PaymentProvider, ProviderUser};
use crate::charge::Charge;
use crate::error::{PaymentError, Result};

const DEFAULT_API_BASE: &str = "https://api.venmo.com/v1";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// How many charge records a listing request asks for. Listings are not
/// paginated, so only this many of the most recent charge requests are
/// visible to callers.
const CHARGE_PAGE_LIMIT: u32 = 50;

/// Venmo client configuration
#[derive(Clone, Debug)]
pub struct VenmoConfig {
    /// Personal access token for the receiving account
    pub access_token: String,

    /// API base URL (override for tests against a local stub)
    pub base_url: String,

    /// Per-request timeout
    pub timeout: Duration,
}

impl VenmoConfig {
    pub fn new(access_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            base_url: DEFAULT_API_BASE.to_string(),
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

/// Venmo API client wrapper
pub struct VenmoClient {
    http: reqwest::Client,
    config: VenmoConfig,
}

impl VenmoClient {
    /// Create a new client from configuration
    pub fn new(config: VenmoConfig) -> Result<Self> {
        if config.access_token.is_empty() {
            return Err(PaymentError::Config("Venmo access token is empty".into()));
        }

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| PaymentError::Config(format!("Failed to build HTTP client: {e}")))?;

        Ok(Self { http, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url.trim_end_matches('/'), path)
    }

    fn bearer(&self) -> String {
        format!("Bearer {}", self.config.access_token)
    }

    /// Read a response body, turning non-2xx statuses into provider errors
    async fn read_body(response: reqwest::Response) -> Result<Value> {
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(PaymentError::Provider(format!(
                "Provider returned {status}: {body}"
            )));
        }
        Ok(response.json().await?)
    }
}

#[async_trait]
impl PaymentProvider for VenmoClient {
    async fn find_user(&self, username: &str) -> Result<Option<ProviderUser>> {
        let response = self
            .http
            .get(self.url("users"))
            .header("Authorization", self.bearer())
            .query(&[("query", username)])
            .send()
            .await?;

        let body = Self::read_body(response).await?;
        let results = body
            .get("data")
            .and_then(Value::as_array)
            .ok_or_else(|| PaymentError::Provider("User search returned no data array".into()))?;

        // The search endpoint does fuzzy matching; keep only an exact hit.
        let user = results.iter().find_map(|entry| {
            let candidate = entry.get("username")?.as_str()?;
            if !candidate.eq_ignore_ascii_case(username) {
                return None;
            }
            Some(ProviderUser {
                id: entry.get("id")?.as_str()?.to_string(),
                username: candidate.to_string(),
                email: entry
                    .get("email")
                    .and_then(Value::as_str)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string),
            })
        });

        Ok(user)
    }

    async fn request_payment(&self, user_id: &str, amount: Decimal, note: &str) -> Result<()> {
        // A negative amount turns the payment into a charge request.
        let payload = json!({
            "user_id": user_id,
            "amount": -amount,
            "note": note,
            "audience": "private",
        });

        let response = self
            .http
            .post(self.url("payments"))
            .header("Authorization", self.bearer())
            .json(&payload)
            .send()
            .await?;

        Self::read_body(response).await?;
        Ok(())
    }

    /// List current charge records.
    ///
    /// Only the `CHARGE_PAGE_LIMIT` most recent charge requests are
    /// fetched; a settled charge that falls out of that window before it is
    /// observed will never be reported.
    async fn list_charges(&self) -> Result<Vec<Charge>> {
        let limit = CHARGE_PAGE_LIMIT.to_string();
        let response = self
            .http
            .get(self.url("payments"))
            .header("Authorization", self.bearer())
            .query(&[("action", "charge"), ("limit", limit.as_str())])
            .send()
            .await?;

        let body = Self::read_body(response).await?;
        let records = body
            .get("data")
            .and_then(Value::as_array)
            .ok_or_else(|| PaymentError::Provider("Charge listing returned no data array".into()))?;

        let mut charges = Vec::with_capacity(records.len());
        for record in records {
            match Charge::from_provider_record(record) {
                Some(charge) => charges.push(charge),
                None => {
                    // One bad record must not block the rest of the batch.
                    tracing::warn!(record = %record, "Skipping malformed charge record");
                }
            }
        }

        Ok(charges)
    }

    fn name(&self) -> &str {
        "Venmo"
    }
}
