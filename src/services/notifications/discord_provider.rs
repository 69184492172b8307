//! Discord destination implementation.
//!
//! Posts messages to a channel through the REST API with a bot token.
//! Uses the global `HTTP_CLIENT` for connection pooling.
//!
//! Discord API Reference: https://discord.com/developers/docs/resources/message#create-message

use reqwest::Url;
use serde_json::json;

use super::provider::{Destination, NotificationMessage, TRACEBACK_COLOR};
use crate::error::{NotifyError, NotifyResult};
use crate::external::client::HTTP_CLIENT;
use crate::models::Platform;

/// Public Discord REST API base URL
pub const DISCORD_API_BASE: &str = "https://discord.com/api/v10";

/// Discord destination
///
/// Discord only addresses channels by numeric ID, never by name.
///
/// # Example
/// ```ignore
/// let discord = DiscordProvider::new("bot-token");
/// let mut message = NotificationMessage::new("Job finished!");
/// message.channel = Some("1234567890123456789".to_string());
/// discord.deliver(&message)?;
/// ```
#[derive(Clone)]
pub struct DiscordProvider {
    token: String,
    api_base: String,
}

impl DiscordProvider {
    /// Creates a new Discord provider talking to the public API
    ///
    /// # Arguments
    /// * `token` - Bot token, sent as `Authorization: Bot <token>`
    pub fn new(token: impl Into<String>) -> Self {
        Self {
            token: token.into(),
            api_base: DISCORD_API_BASE.to_string(),
        }
    }

    /// Points the provider at a different API base URL
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into();
        self
    }

    /// Builds the create-message endpoint URL for a channel
    fn build_api_url(&self, channel_id: &str) -> String {
        format!(
            "{}/channels/{}/messages",
            self.api_base.trim_end_matches('/'),
            channel_id
        )
    }

    /// Builds the JSON payload; a traceback becomes an embed
    fn build_request_body(&self, message: &NotificationMessage) -> serde_json::Value {
        let mut body = json!({
            "content": message.text(),
            "allowed_mentions": { "parse": ["users", "roles", "everyone"] },
        });

        if let Some(traceback) = &message.traceback {
            body["embeds"] = json!([{
                "description": traceback,
                "color": TRACEBACK_COLOR,
            }]);
        }

        body
    }
}

impl Destination for DiscordProvider {
    /// Sends a message to the channel in `message.channel`
    ///
    /// Any non-2xx response is returned as `HttpStatus`.
    fn deliver(&self, message: &NotificationMessage) -> NotifyResult<()> {
        let channel_id = message
            .channel
            .as_deref()
            .filter(|c| !c.is_empty())
            .ok_or(NotifyError::MissingChannel {
                platform: Platform::Discord,
            })?;

        let response = HTTP_CLIENT
            .post(self.build_api_url(channel_id))
            .header("Authorization", format!("Bot {}", self.token))
            .json(&self.build_request_body(message))
            .send()
            .map_err(|e| NotifyError::http(Platform::Discord, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(NotifyError::HttpStatus {
                platform: Platform::Discord,
                status: status.as_u16(),
                body: response.text().unwrap_or_default(),
            });
        }

        Ok(())
    }

    fn name(&self) -> &'static str {
        "discord"
    }

    /// Validates Discord configuration
    ///
    /// Checks that:
    /// - the bot token is not empty
    /// - the API base is an http(s) URL
    fn validate_config(&self) -> NotifyResult<()> {
        if self.token.is_empty() {
            return Err(NotifyError::MissingToken {
                platform: Platform::Discord,
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

    fn serve_once(status: u16) -> (String, mpsc::Receiver<(String, String, String)>) {
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
                .respond(tiny_http::Response::from_string("{}").with_status_code(status))
                .unwrap();
        });
        (format!("http://127.0.0.1:{}/api/v10", port), rx)
    }

    fn message(body: &str) -> NotificationMessage {
        NotificationMessage {
            channel: Some("1234567890".to_string()),
            ..NotificationMessage::new(body)
        }
    }

    #[test]
    fn test_build_api_url() {
        let provider = DiscordProvider::new("token");
        assert_eq!(
            provider.build_api_url("42"),
            "https://discord.com/api/v10/channels/42/messages"
        );
    }

    #[test]
    fn test_build_request_body_minimal() {
        let provider = DiscordProvider::new("token");
        let body = provider.build_request_body(&message("Job finished!"));
        assert_eq!(body["content"], "Job finished!");
        assert_eq!(
            body["allowed_mentions"]["parse"],
            json!(["users", "roles", "everyone"])
        );
        assert!(body.get("embeds").is_none());
    }

    #[test]
    fn test_build_request_body_with_traceback() {
        let provider = DiscordProvider::new("token");
        let message = NotificationMessage {
            traceback: Some("Error: boom".to_string()),
            ..message("Error while watching")
        };
        let body = provider.build_request_body(&message);
        assert_eq!(body["embeds"][0]["description"], "Error: boom");
        assert_eq!(body["embeds"][0]["color"], 0xFF3D33);
    }

    #[test]
    fn test_deliver_posts_to_channel() {
        let (base, rx) = serve_once(200);
        let provider = DiscordProvider::new("token").with_api_base(base);

        provider.deliver(&message("Job finished!")).expect("Delivery should succeed");

        let (url, auth, body) = rx.recv().unwrap();
        assert_eq!(url, "/api/v10/channels/1234567890/messages");
        assert_eq!(auth, "Bot token");
        let body: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["content"], "Job finished!");
    }

    #[test]
    fn test_deliver_non_success_is_an_error() {
        let (base, _rx) = serve_once(403);
        let provider = DiscordProvider::new("token").with_api_base(base);

        let err = provider.deliver(&message("hi")).unwrap_err();
        assert!(matches!(err, NotifyError::HttpStatus { status: 403, .. }));
    }

    #[test]
    fn test_deliver_without_channel_makes_no_request() {
        let provider = DiscordProvider::new("token").with_api_base("http://127.0.0.1:9");
        let err = provider.deliver(&NotificationMessage::new("hi")).unwrap_err();
        assert!(matches!(err, NotifyError::MissingChannel { platform: Platform::Discord }));
    }
}
