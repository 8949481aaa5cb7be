//! mempool.space API client.
//!
//! Thin wrapper over `reqwest` with a fixed request timeout and strict
//! response validation. No retries here -- the sync engine's periodic
//! cadence is the only retry mechanism.

use std::time::Duration;

use serde::Deserialize;
use url::Url;

use crate::error::ApiError;
use crate::fees::{FeeRange, FeeSnapshot};

/// Production API base.
pub const DEFAULT_BASE_URL: &str = "https://mempool.space/api/v1";

/// Fixed per-request timeout.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Deserialize)]
struct RecommendedFeesBody {
    #[serde(rename = "fastestFee")]
    fastest: f64,
    #[serde(rename = "halfHourFee")]
    half_hour: f64,
    #[serde(rename = "hourFee")]
    hour: f64,
}

#[derive(Deserialize)]
struct MempoolBlockBody {
    #[serde(rename = "feeRange")]
    fee_range: Vec<f64>,
}

/// Client for the fee-rate and block endpoints.
#[derive(Debug)]
pub struct FeeApiClient {
    http: reqwest::Client,
    base: String,
}

impl FeeApiClient {
    /// Client against the production API.
    pub fn new() -> Result<Self, ApiError> {
        Self::with_base_url(DEFAULT_BASE_URL)
    }

    /// Client against an explicit base URL (tests point this at a local
    /// mock server).
    pub fn with_base_url(base: &str) -> Result<Self, ApiError> {
        Url::parse(base).map_err(|e| ApiError::InvalidBaseUrl(e.to_string()))?;
        let http = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;
        Ok(Self {
            http,
            base: base.trim_end_matches('/').to_string(),
        })
    }

    /// GET `{base}/fees/recommended`.
    pub async fn recommended_fees(&self) -> Result<FeeSnapshot, ApiError> {
        let body: RecommendedFeesBody = self
            .get("fees/recommended")
            .await?
            .json()
            .await
            .map_err(|e| ApiError::MalformedResponse(e.to_string()))?;

        let snapshot = FeeSnapshot {
            fastest: body.fastest,
            half_hour: body.half_hour,
            hour: body.hour,
        };
        if !snapshot.is_valid() {
            return Err(ApiError::MalformedResponse(
                "fee rates must be strictly positive".into(),
            ));
        }
        Ok(snapshot)
    }

    /// GET `{base}/blocks/tip/height`.
    pub async fn block_height(&self) -> Result<u64, ApiError> {
        let height: u64 = self
            .get("blocks/tip/height")
            .await?
            .json()
            .await
            .map_err(|e| ApiError::MalformedResponse(e.to_string()))?;
        if height == 0 {
            return Err(ApiError::MalformedResponse("block height must be positive".into()));
        }
        Ok(height)
    }

    /// GET `{base}/fees/mempool-blocks` -- projected fee span of the
    /// next block: first and last entries of the first block's feeRange.
    pub async fn next_block_fee_range(&self) -> Result<FeeRange, ApiError> {
        let blocks: Vec<MempoolBlockBody> = self
            .get("fees/mempool-blocks")
            .await?
            .json()
            .await
            .map_err(|e| ApiError::MalformedResponse(e.to_string()))?;

        let first = blocks
            .first()
            .ok_or_else(|| ApiError::MalformedResponse("no projected blocks in response".into()))?;
        match (first.fee_range.first(), first.fee_range.last()) {
            (Some(&min), Some(&max)) => Ok(FeeRange { min, max }),
            _ => Err(ApiError::MalformedResponse("empty feeRange in response".into())),
        }
    }

    /// True iff the fee endpoint answers with a valid body.
    pub async fn check_connectivity(&self) -> bool {
        self.recommended_fees().await.is_ok()
    }

    async fn get(&self, path: &str) -> Result<reqwest::Response, ApiError> {
        let url = format!("{}/{}", self.base, path);
        let response = self
            .http
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(map_send_error)?;

        if !response.status().is_success() {
            return Err(ApiError::Http {
                status: response.status().as_u16(),
            });
        }
        Ok(response)
    }
}

fn map_send_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Timeout {
            timeout_secs: REQUEST_TIMEOUT.as_secs(),
        }
    } else {
        ApiError::Network(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client_for(server: &mockito::ServerGuard) -> FeeApiClient {
        FeeApiClient::with_base_url(&server.url()).unwrap()
    }

    #[tokio::test]
    async fn recommended_fees_parses_valid_response() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/fees/recommended")
            .with_status(200)
            .with_header("content-type", "application/json")
            .with_body(r#"{"fastestFee": 42, "halfHourFee": 21, "hourFee": 10}"#)
            .create_async()
            .await;

        let fees = client_for(&server).recommended_fees().await.unwrap();
        assert_eq!(fees.fastest, 42.0);
        assert_eq!(fees.half_hour, 21.0);
        assert_eq!(fees.hour, 10.0);
    }

    #[tokio::test]
    async fn recommended_fees_rejects_negative_rate() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/fees/recommended")
            .with_status(200)
            .with_body(r#"{"fastestFee": -1, "halfHourFee": 21, "hourFee": 10}"#)
            .create_async()
            .await;

        let err = client_for(&server).recommended_fees().await.unwrap_err();
        assert!(matches!(err, ApiError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn recommended_fees_rejects_missing_field() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/fees/recommended")
            .with_status(200)
            .with_body(r#"{"fastestFee": 42, "halfHourFee": 21}"#)
            .create_async()
            .await;

        let err = client_for(&server).recommended_fees().await.unwrap_err();
        assert!(matches!(err, ApiError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn recommended_fees_rejects_non_numeric_field() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/fees/recommended")
            .with_status(200)
            .with_body(r#"{"fastestFee": "fast", "halfHourFee": 21, "hourFee": 10}"#)
            .create_async()
            .await;

        let err = client_for(&server).recommended_fees().await.unwrap_err();
        assert!(matches!(err, ApiError::MalformedResponse(_)));
    }

    #[tokio::test]
    async fn non_success_status_maps_to_http_error() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/fees/recommended")
            .with_status(503)
            .create_async()
            .await;

        let err = client_for(&server).recommended_fees().await.unwrap_err();
        assert!(matches!(err, ApiError::Http { status: 503 }));
    }

    #[tokio::test]
    async fn block_height_parses_bare_integer() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/blocks/tip/height")
            .with_status(200)
            .with_body("840000")
            .create_async()
            .await;

        let height = client_for(&server).block_height().await.unwrap();
        assert_eq!(height, 840000);
    }

    #[tokio::test]
    async fn block_height_rejects_zero_and_garbage() {
        let mut server = mockito::Server::new_async().await;
        let zero = server
            .mock("GET", "/blocks/tip/height")
            .with_status(200)
            .with_body("0")
            .create_async()
            .await;
        let client = client_for(&server);
        assert!(matches!(
            client.block_height().await.unwrap_err(),
            ApiError::MalformedResponse(_)
        ));
        zero.remove_async().await;

        let _garbage = server
            .mock("GET", "/blocks/tip/height")
            .with_status(200)
            .with_body("not-a-height")
            .create_async()
            .await;
        assert!(matches!(
            client.block_height().await.unwrap_err(),
            ApiError::MalformedResponse(_)
        ));
    }

    #[tokio::test]
    async fn next_block_fee_range_takes_first_and_last() {
        let mut server = mockito::Server::new_async().await;
        let _m = server
            .mock("GET", "/fees/mempool-blocks")
            .with_status(200)
            .with_body(r#"[{"feeRange": [1.2, 5.0, 8.4, 30.1]}, {"feeRange": [0.5, 1.1]}]"#)
            .create_async()
            .await;

        let range = client_for(&server).next_block_fee_range().await.unwrap();
        assert_eq!(range.min, 1.2);
        assert_eq!(range.max, 30.1);
    }

    #[tokio::test]
    async fn next_block_fee_range_rejects_empty_responses() {
        let mut server = mockito::Server::new_async().await;
        let empty_array = server
            .mock("GET", "/fees/mempool-blocks")
            .with_status(200)
            .with_body("[]")
            .create_async()
            .await;
        let client = client_for(&server);
        assert!(matches!(
            client.next_block_fee_range().await.unwrap_err(),
            ApiError::MalformedResponse(_)
        ));
        empty_array.remove_async().await;

        let _empty_range = server
            .mock("GET", "/fees/mempool-blocks")
            .with_status(200)
            .with_body(r#"[{"feeRange": []}]"#)
            .create_async()
            .await;
        assert!(matches!(
            client.next_block_fee_range().await.unwrap_err(),
            ApiError::MalformedResponse(_)
        ));
    }

    #[tokio::test]
    async fn connectivity_check_reflects_endpoint_health() {
        let mut server = mockito::Server::new_async().await;
        let ok = server
            .mock("GET", "/fees/recommended")
            .with_status(200)
            .with_body(r#"{"fastestFee": 5, "halfHourFee": 3, "hourFee": 2}"#)
            .create_async()
            .await;
        let client = client_for(&server);
        assert!(client.check_connectivity().await);
        ok.remove_async().await;

        let _down = server
            .mock("GET", "/fees/recommended")
            .with_status(500)
            .create_async()
            .await;
        assert!(!client.check_connectivity().await);
    }

    #[test]
    fn invalid_base_url_is_rejected() {
        assert!(matches!(
            FeeApiClient::with_base_url("not a url").unwrap_err(),
            ApiError::InvalidBaseUrl(_)
        ));
    }
}
