//! Slack destination implementation.
//!
//! Posts messages with the Web API `chat.postMessage` method using a bot
//! token. Uses the global `HTTP_CLIENT` for connection pooling.
//!
//! Slack API Reference: https://api.slack.com/methods/chat.postMessage

use reqwest::Url;
use serde::Deserialize;
use serde_json::json;

use super::provider::{Destination, NotificationMessage, TRACEBACK_COLOR_HEX};
use crate::error::{NotifyError, NotifyResult};
use crate::external::client::HTTP_CLIENT;
use crate::models::Platform;

/// Public Slack Web API base URL
pub const SLACK_API_BASE: &str = "https://slack.com/api";

/// Body of a Web API response; `ok` is false on API-level failures
#[derive(Debug, Deserialize)]
struct SlackReply {
    ok: bool,
    #[serde(default)]
    error: Option<String>,
}

/// Slack destination
///
/// # Example
/// ```ignore
/// let slack = SlackProvider::new("xoxb-...");
/// let mut message = NotificationMessage::new("Job finished!");
/// message.channel = Some("ops".to_string());
/// slack.deliver(&message)?;
/// ```
#[derive(Clone)]
pub struct SlackProvider {
    token: String,
    api_base: String,
}

impl SlackProvider {
    /// Creates a new Slack provider talking to the public API
    ///
    /// # Arguments
    /// * `token` - Bot token (`xoxb-...`)
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            api_base: SLACK_API_BASE.to_string(),
        }
    }

    /// Points the provider at a different API base URL
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Builds the `chat.postMessage` endpoint URL
    fn build_api_url(&self) -> String {
        format!("{}/chat.postMessage", self.api_base.trim_end_matches('/'))
    }

    /// Builds the request body for `chat.postMessage`
    ///
    /// A traceback becomes a single plain-text section attachment.
    fn build_request_body(&self, channel: &str, message: &NotificationMessage) -> serde_json::Value {
        let mut body = json!({
            "channel": channel,
            "text": message.text(),
        });

        if let Some(traceback) = &message.traceback {
            body["attachments"] = json!([{
                "blocks": [{
                    "type": "section",
                    "text": {
                        "type": "plain_text",
                        "text": traceback,
                    },
                }],
                "color": TRACEBACK_COLOR_HEX,
            }]);
        }

        body
    }
}

impl Destination for SlackProvider {
    /// Sends a message via `chat.postMessage`
    ///
    /// Fails with `MissingChannel` before any request is made if the message
    /// has no channel.
    fn deliver(&self, message: &NotificationMessage) -> NotifyResult<()> {
        let channel = message
            .channel
            .as_deref()
            .ok_or(NotifyError::MissingChannel {
                platform: Platform::Slack,
            })?;

        let response = HTTP_CLIENT
            .post(self.build_api_url())
            .bearer_auth(&self.token)
            .json(&self.build_request_body(channel, message))
            .send()
            .map_err(|e| NotifyError::http(Platform::Slack, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::HttpStatus {
                platform: Platform::Slack,
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }

        let reply: SlackReply = response
            .json()
            .map_err(|e| NotifyError::http(Platform::Slack, e))?;
        if !reply.ok {
            return Err(NotifyError::Api {
                platform: Platform::Slack,
                message: reply.error.unwrap_or_else(|| "unknown_error".to_string()),
            });
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "slack"
    }

    /// Validates Slack configuration
    ///
    /// Checks that:
    /// - the bot token is not empty
    /// - the API base is an http(s) URL
    fn validate_config(&self) -> NotifyResult<()> {
        if self.token.is_empty() {
            return Err(NotifyError::MissingToken {
                platform: Platform::Slack,
            });
        }

        let url = Url::parse(&self.api_base).map_err(|_| NotifyError::Validation {
            field: "api_base".to_string(),
            reason: "Invalid URL format".to_string(),
        })?;
        if url.scheme() != "https" && url.scheme() != "http" {
            return Err(NotifyError::Validation {
                field: "api_base".to_string(),
                reason: "URL must use http or https protocol".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Read;
    use std::sync::mpsc;
    use std::thread;

    fn message(body: &str) -> NotificationMessage {
        NotificationMessage {
            channel: Some("ops".to_string()),
            ..NotificationMessage::new(body)
        }
    }

    /// Serves one request on a local port and hands back (url, auth, body)
    fn serve_once(status: u16, reply: &'static str) -> (String, mpsc::Receiver<(String, String, String)>) {
        let server = tiny_http::Server::http("127.0.0.1:0").expect("Failed to bind test server");
        let port = server.server_addr().to_ip().expect("Should be an IP address").port();
        let (tx, rx) = mpsc::channel();
        thread::spawn(move || {
            let mut request = server.recv().expect("Failed to receive request");
            let mut body = String::new();
            request.as_reader().read_to_string(&mut body).unwrap();
            let auth = request
                .headers()
                .iter()
                .find(|h| h.field.equiv("Authorization"))
                .map(|h| h.value.as_str().to_string())
                .unwrap_or_default();
            tx.send((request.url().to_string(), auth, body)).unwrap();
            request
                .respond(tiny_http::Response::from_string(reply).with_status_code(status))
                .unwrap();
        });
        (format!("http://127.0.0.1:{}/api", port), rx)
    }

    #[test]
    fn test_build_api_url_trailing_slash() {
        let provider = SlackProvider::new("xoxb-test").with_api_base("https://slack.example.com/api/");
        assert_eq!(provider.build_api_url(), "https://slack.example.com/api/chat.postMessage");
    }

    #[test]
    fn test_build_request_body_minimal() {
        let provider = SlackProvider::new("xoxb-test");
        let body = provider.build_request_body("ops", &message("Job finished!"));
        assert_eq!(body["channel"], "ops");
        assert_eq!(body["text"], "Job finished!");
        assert!(body.get("attachments").is_none());
    }

    #[test]
    fn test_build_request_body_with_traceback_and_mention() {
        let provider = SlackProvider::new("xoxb-test");
        let message = NotificationMessage {
            mention: Some("@U0123456789".to_string()),
            traceback: Some("Error: boom".to_string()),
            ..message("Error while watching")
        };
        let body = provider.build_request_body("ops", &message);
        assert_eq!(body["text"], "<@U0123456789>\nError while watching");
        assert_eq!(body["attachments"][0]["color"], "#ff3d33");
        assert_eq!(
            body["attachments"][0]["blocks"][0]["text"]["text"],
            "Error: boom"
        );
        assert_eq!(body["attachments"][0]["blocks"][0]["text"]["type"], "plain_text");
    }

    #[test]
    fn test_deliver_without_channel_makes_no_request() {
        let provider = SlackProvider::new("xoxb-test").with_api_base("http://127.0.0.1:9");
        let err = provider.deliver(&NotificationMessage::new("hi")).unwrap_err();
        assert!(matches!(err, NotifyError::MissingChannel { platform: Platform::Slack }));
    }

    #[test]
    fn test_deliver_posts_message() {
        let (base, rx) = serve_once(200, r#"{"ok": true}"#);
        let provider = SlackProvider::new("xoxb-test").with_api_base(base);

        provider.deliver(&message("Job finished!")).expect("Delivery should succeed");

        let (url, auth, body) = rx.recv().unwrap();
        assert_eq!(url, "/api/chat.postMessage");
        assert_eq!(auth, "Bearer xoxb-test");
        let body: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["text"], "Job finished!");
        assert_eq!(body["channel"], "ops");
    }

    #[test]
    fn test_deliver_reports_api_error() {
        let (base, _rx) = serve_once(200, r#"{"ok": false, "error": "channel_not_found"}"#);
        let provider = SlackProvider::new("xoxb-test").with_api_base(base);

        let err = provider.deliver(&message("hi")).unwrap_err();
        match err {
            NotifyError::Api { message, .. } => assert_eq!(message, "channel_not_found"),
            other => panic!("Unexpected error: {other}"),
        }
    }

    #[test]
    fn test_validate_config() {
        assert!(SlackProvider::new("xoxb-test").validate_config().is_ok());
        assert!(SlackProvider::new("").validate_config().is_err());
        assert!(
            SlackProvider::new("xoxb-test")
                .with_api_base("not-a-url")
                .validate_config()
                .is_err()
        );
    }
}
