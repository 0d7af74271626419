//! Remote append client: posts one capture record to the spreadsheet webhook.

use crate::error::CaptureError;
use crate::tab_data::{AppendResult, CaptureRecord};
use async_trait::async_trait;
use serde::Deserialize;

/// Response body of the webhook. `duplicate` is set when the row already
/// existed and was moved instead of appended.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct AppendResponse {
    #[serde(default)]
    pub duplicate: bool,
}

/// One HTTP POST with a JSON body. Implementations report non-2xx statuses
/// as `CaptureError::Http`.
#[async_trait(?Send)]
pub trait AppendTransport {
    async fn post_json(&self, endpoint: &str, record: &CaptureRecord) -> Result<AppendResponse, CaptureError>;
}

/// fetch-backed transport (reqwest on wasm32). Redirects are followed.
pub struct ReqwestTransport {
    client: reqwest::Client,
}

impl ReqwestTransport {
    pub fn new() -> Self {
        Self {
            client: reqwest::Client::new(),
        }
    }
}

impl Default for ReqwestTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait(?Send)]
impl AppendTransport for ReqwestTransport {
    async fn post_json(&self, endpoint: &str, record: &CaptureRecord) -> Result<AppendResponse, CaptureError> {
        let response = self
            .client
            .post(endpoint)
            .json(record)
            .send()
            .await
            .map_err(|e| CaptureError::Network(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(CaptureError::Http(status.as_u16()));
        }

        let text = response
            .text()
            .await
            .map_err(|e| CaptureError::Network(e.to_string()))?;
        serde_json::from_str(&text).map_err(|e| CaptureError::MalformedResponse(e.to_string()))
    }
}

/// Single-attempt client. Never returns an error: every failure is logged
/// and folded into the `AppendResult`.
pub struct RemoteAppendClient<T: AppendTransport> {
    transport: T,
}

impl<T: AppendTransport> RemoteAppendClient<T> {
    pub fn new(transport: T) -> Self {
        Self { transport }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn post_record(&self, endpoint: Option<&str>, record: &CaptureRecord) -> AppendResult {
        let Some(endpoint) = endpoint.filter(|e| !e.trim().is_empty()) else {
            log::info!("gasUrl is not configured, skipping append");
            return AppendResult::not_configured();
        };

        match self.transport.post_json(endpoint, record).await {
            Ok(response) => {
                log::debug!("Append succeeded (duplicate: {})", response.duplicate);
                AppendResult::appended(response.duplicate)
            }
            Err(e) => {
                log::error!("Append request failed: {}", e);
                AppendResult::failed()
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tab_data::Selection;
    use futures::executor::block_on;
    use std::cell::RefCell;

    struct StubTransport {
        reply: fn() -> Result<AppendResponse, CaptureError>,
        calls: RefCell<Vec<(String, serde_json::Value)>>,
    }

    impl StubTransport {
        fn new(reply: fn() -> Result<AppendResponse, CaptureError>) -> Self {
            Self {
                reply,
                calls: RefCell::new(Vec::new()),
            }
        }
    }

    #[async_trait(?Send)]
    impl AppendTransport for StubTransport {
        async fn post_json(&self, endpoint: &str, record: &CaptureRecord) -> Result<AppendResponse, CaptureError> {
            self.calls
                .borrow_mut()
                .push((endpoint.to_string(), serde_json::to_value(record).unwrap()));
            (self.reply)()
        }
    }

    fn record() -> CaptureRecord {
        CaptureRecord::new(
            "Example".to_string(),
            "https://example.com".to_string(),
            Selection::GroupValues {
                values: vec!["仕事".to_string(), String::new(), "進行中".to_string()],
            },
        )
    }

    #[test]
    fn test_unconfigured_skips_network() {
        let client = RemoteAppendClient::new(StubTransport::new(|| Ok(AppendResponse::default())));

        assert_eq!(block_on(client.post_record(None, &record())), AppendResult::not_configured());
        assert_eq!(block_on(client.post_record(Some("  "), &record())), AppendResult::not_configured());
        assert!(client.transport.calls.borrow().is_empty());
    }

    #[test]
    fn test_appended() {
        let client = RemoteAppendClient::new(StubTransport::new(|| Ok(AppendResponse { duplicate: false })));

        let result = block_on(client.post_record(Some("https://script.example/exec"), &record()));

        assert_eq!(result, AppendResult::appended(false));
        let calls = client.transport.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "https://script.example/exec");
        assert_eq!(calls[0].1["tagValues"], serde_json::json!(["仕事", "", "進行中"]));
    }

    #[test]
    fn test_duplicate_flag_is_carried() {
        let client = RemoteAppendClient::new(StubTransport::new(|| Ok(AppendResponse { duplicate: true })));

        let result = block_on(client.post_record(Some("https://script.example/exec"), &record()));

        assert_eq!(result, AppendResult::appended(true));
    }

    #[test]
    fn test_failures_fold_into_result() {
        for reply in [
            (|| Err(CaptureError::Http(500))) as fn() -> Result<AppendResponse, CaptureError>,
            || Err(CaptureError::Network("offline".to_string())),
            || Err(CaptureError::MalformedResponse("expected value".to_string())),
        ] {
            let client = RemoteAppendClient::new(StubTransport::new(reply));

            let result = block_on(client.post_record(Some("https://script.example/exec"), &record()));

            assert_eq!(result, AppendResult::failed());
            assert_eq!(client.transport.calls.borrow().len(), 1);
        }
    }

    #[test]
    fn test_response_without_duplicate_field() {
        let response: AppendResponse = serde_json::from_str(r#"{"status": "ok"}"#).unwrap();

        assert!(!response.duplicate);
    }
}
