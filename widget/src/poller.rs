//! The polling loop.
//!
//! One outstanding poll per poller; cooperative scheduling via timer sleeps.
//! A poll that fails is logged loudly and the next attempt is scheduled at
//! ten times the refresh rate to reduce load during outages. The loop has no
//! terminal state; it ends when its task is dropped.

use crate::errors::WidgetError;
use crate::handler::WidgetHandler;
use crate::metrics_defs::{POLL_FAILURE, POLL_SUCCESS};
use shared::counter;
use crate::params::WidgetParams;
use serde_json::Value;
use shared::wire::{ErrorEnvelope, HASH_FIELD};
use std::time::Duration;

const ERROR_BACKOFF_FACTOR: u64 = 10;

pub struct Poller<H: WidgetHandler> {
    client: reqwest::Client,
    url_base: String,
    config_name: String,
    widget_id: String,
    params: WidgetParams,
    old_value_hash: String,
    handler: H,
}

impl<H: WidgetHandler> Poller<H> {
    pub fn new(
        client: reqwest::Client,
        url_base: impl Into<String>,
        config_name: impl Into<String>,
        widget_id: impl Into<String>,
        params: WidgetParams,
        handler: H,
    ) -> Self {
        Poller {
            client,
            url_base: url_base.into(),
            config_name: config_name.into(),
            widget_id: widget_id.into(),
            params,
            old_value_hash: String::new(),
            handler,
        }
    }

    pub fn handler(&self) -> &H {
        &self.handler
    }

    /// `{url_base}/{config_name}/{widget_id}` plus the last-seen hash once
    /// one exists, so the backend can short-circuit unchanged data.
    pub fn poll_url(&self) -> String {
        let mut url = format!(
            "{}/{}/{}",
            self.url_base.trim_end_matches('/'),
            self.config_name,
            self.widget_id
        );
        if !self.old_value_hash.is_empty() {
            url.push('/');
            url.push_str(&self.old_value_hash);
        }
        url
    }

    /// One fetch cycle. Invokes the handler only when the payload hash
    /// differs from the last-seen one.
    pub async fn poll_once(&mut self) -> Result<(), WidgetError> {
        let response = self.client.get(self.poll_url()).send().await?;
        let status = response.status();
        let body = response.text().await?;

        if !status.is_success() {
            if let Ok(envelope) = serde_json::from_str::<ErrorEnvelope>(&body) {
                return Err(WidgetError::Server {
                    message: envelope.error.message,
                    r#type: envelope.error.r#type,
                });
            }
            return Err(WidgetError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let payload: Value =
            serde_json::from_str(&body).map_err(|e| WidgetError::InvalidPayload(e.to_string()))?;

        let hash = payload
            .get(HASH_FIELD)
            .and_then(Value::as_str)
            .ok_or(WidgetError::MissingHash)?;

        if hash != self.old_value_hash {
            self.old_value_hash = hash.to_string();
            self.handler.handle_response(&payload)?;
        }

        Ok(())
    }

    /// Delay before the next poll given the last cycle's outcome.
    pub fn next_delay(&self, result: &Result<(), WidgetError>) -> Duration {
        let secs = match result {
            Ok(()) => self.params.refresh_rate,
            Err(_) => self.params.refresh_rate * ERROR_BACKOFF_FACTOR,
        };
        Duration::from_secs(secs)
    }

    /// Polls forever. Errors are loud but never fatal to the loop.
    pub async fn run(mut self) {
        loop {
            let result = self.poll_once().await;
            let delay = self.next_delay(&result);

            match &result {
                Ok(()) => counter!(POLL_SUCCESS).increment(1),
                Err(err) => {
                    counter!(POLL_FAILURE).increment(1);
                    tracing::error!(
                        widget_id = %self.widget_id,
                        config = %self.config_name,
                        backoff_secs = delay.as_secs(),
                        error = %err,
                        "widget poll failed"
                    );
                }
            }

            tokio::time::sleep(delay).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    struct RecordingHandler {
        calls: usize,
        last_payload: Option<Value>,
    }

    impl RecordingHandler {
        fn new() -> Self {
            RecordingHandler {
                calls: 0,
                last_payload: None,
            }
        }
    }

    impl WidgetHandler for RecordingHandler {
        fn handle_response(&mut self, payload: &Value) -> Result<(), WidgetError> {
            self.calls += 1;
            self.last_payload = Some(payload.clone());
            Ok(())
        }
    }

    fn make_poller(base: &str, refresh_rate: u64) -> Poller<RecordingHandler> {
        Poller::new(
            reqwest::Client::new(),
            base,
            "cpu-load",
            "tile-1",
            WidgetParams {
                refresh_rate,
                ..WidgetParams::default()
            },
            RecordingHandler::new(),
        )
    }

    #[tokio::test]
    async fn test_first_response_invokes_handler_and_records_hash() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/cpu-load/tile-1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"hash": "abc", "count": 42}"#),
            )
            .mount(&server)
            .await;

        let mut poller = make_poller(&server.uri(), 5);
        poller.poll_once().await.unwrap();

        assert_eq!(poller.handler().calls, 1);
        assert_eq!(
            poller.handler().last_payload,
            Some(json!({"hash": "abc", "count": 42}))
        );
        // The recorded hash becomes the URL suffix of the next poll
        assert!(poller.poll_url().ends_with("/cpu-load/tile-1/abc"));
    }

    #[tokio::test]
    async fn test_unchanged_hash_skips_handler() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/cpu-load/tile-1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"hash": "abc", "count": 42}"#),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/cpu-load/tile-1/abc"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"hash": "abc"}"#))
            .mount(&server)
            .await;

        let mut poller = make_poller(&server.uri(), 5);
        poller.poll_once().await.unwrap();
        poller.poll_once().await.unwrap();

        assert_eq!(poller.handler().calls, 1);
    }

    #[tokio::test]
    async fn test_changed_hash_invokes_handler_again() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/cpu-load/tile-1"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"hash": "abc", "count": 42}"#),
            )
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/cpu-load/tile-1/abc"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_string(r#"{"hash": "def", "count": 43}"#),
            )
            .mount(&server)
            .await;

        let mut poller = make_poller(&server.uri(), 5);
        poller.poll_once().await.unwrap();
        poller.poll_once().await.unwrap();

        assert_eq!(poller.handler().calls, 2);
        assert!(poller.poll_url().ends_with("/def"));
    }

    #[tokio::test]
    async fn test_missing_hash_fails_loudly() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/cpu-load/tile-1"))
            .respond_with(ResponseTemplate::new(200).set_body_string(r#"{"count": 42}"#))
            .mount(&server)
            .await;

        let mut poller = make_poller(&server.uri(), 5);
        let err = poller.poll_once().await.unwrap_err();

        assert!(matches!(err, WidgetError::MissingHash));
        assert_eq!(poller.handler().calls, 0);
    }

    #[tokio::test]
    async fn test_server_error_envelope_is_surfaced() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/cpu-load/tile-1"))
            .respond_with(ResponseTemplate::new(502).set_body_string(
                r#"{"error": {"message": "search head unreachable", "type": "Transport"}}"#,
            ))
            .mount(&server)
            .await;

        let mut poller = make_poller(&server.uri(), 5);
        let err = poller.poll_once().await.unwrap_err();

        assert!(matches!(
            err,
            WidgetError::Server { ref message, ref r#type }
                if message == "search head unreachable" && r#type == "Transport"
        ));
    }

    #[tokio::test]
    async fn test_error_backs_off_tenfold() {
        let poller = make_poller("http://127.0.0.1:1", 6);

        assert_eq!(poller.next_delay(&Ok(())), Duration::from_secs(6));
        assert_eq!(
            poller.next_delay(&Err(WidgetError::MissingHash)),
            Duration::from_secs(60)
        );
    }
}
