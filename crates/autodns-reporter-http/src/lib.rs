// # HTTP Reporter
//
// This crate delivers the selected IPv6 address to the gateway server.
//
// ## Wire Contract
//
// ```http
// POST {base_url}/api/v1/public-ip
// X-API-Token: <token>
// Content-Type: application/json
//
// {"ipAddress": "2001:db8::1234:5678:9abc:def0"}
// ```
//
// - Success is exactly `200 OK`; every other status is a rejection
// - Requests time out after the configured timeout (10 seconds by default)
//
// ## Constraints
//
// - One HTTP request per `report()` call: no retry, no backoff (the agent
//   owns that decision through its commit policy)
// - The API token NEVER appears in logs or `Debug` output

use async_trait::async_trait;
use autodns_core::config::ServerConfig;
use autodns_core::error::ReportError;
use autodns_core::traits::Reporter;
use autodns_core::{Error, Result};
use reqwest::StatusCode;
use reqwest::header::CONTENT_TYPE;
use serde::Serialize;
use std::net::Ipv6Addr;
use std::time::Duration;

/// Header carrying the API token
pub const API_TOKEN_HEADER: &str = "X-API-Token";

/// Longest response body kept in a rejection error
const MAX_ERROR_BODY: usize = 512;

/// Request body of the report endpoint
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct PublicIpRequest {
    ip_address: String,
}

/// Reporter posting addresses to `/api/v1/public-ip`
pub struct HttpReporter {
    /// Full report URL
    url: String,

    /// API token
    /// ⚠️ NEVER log this value
    api_token: String,

    /// Request timeout
    timeout: Duration,

    /// HTTP client for API requests
    client: reqwest::Client,
}

// Custom Debug implementation that hides the API token
impl std::fmt::Debug for HttpReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpReporter")
            .field("url", &self.url)
            .field("api_token", &"<REDACTED>")
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl HttpReporter {
    /// Create a new reporter
    ///
    /// # Parameters
    ///
    /// - `server`: Base URL and API token
    /// - `timeout`: Upper bound for a single request
    ///
    /// # Errors
    ///
    /// Fails if the server configuration is invalid or the HTTP client
    /// cannot be built.
    pub fn new(server: &ServerConfig, timeout: Duration) -> Result<Self> {
        server.validate()?;

        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            url: server.report_url(),
            api_token: server.api_token.clone(),
            timeout,
            client,
        })
    }

    /// URL reports are posted to
    pub fn url(&self) -> &str {
        &self.url
    }
}

#[async_trait]
impl Reporter for HttpReporter {
    async fn report(&self, address: Ipv6Addr) -> std::result::Result<(), ReportError> {
        let body = PublicIpRequest {
            ip_address: address.to_string(),
        };

        tracing::debug!("Reporting {} to {}", address, self.url);

        let response = self
            .client
            .post(&self.url)
            .header(API_TOKEN_HEADER, &self.api_token)
            .header(CONTENT_TYPE, "application/json")
            .json(&body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    ReportError::Timeout(self.timeout)
                } else {
                    ReportError::network(format!("HTTP request failed: {}", e))
                }
            })?;

        let status = response.status();
        if status == StatusCode::OK {
            return Ok(());
        }

        let mut text = response
            .text()
            .await
            .unwrap_or_else(|_| "Unable to read error response".to_string());
        if text.len() > MAX_ERROR_BODY {
            let mut cut = MAX_ERROR_BODY;
            while !text.is_char_boundary(cut) {
                cut -= 1;
            }
            text.truncate(cut);
        }

        Err(ReportError::rejected(status.as_u16(), text))
    }

    fn reporter_name(&self) -> &'static str {
        "http"
    }
}
