//! Outbound reply payloads.
//!
//! Slack accepts the JSON body of the webhook response as a message. Only
//! `text` is filled in by the search pipeline; the remaining fields exist for
//! callers that want to decorate the reply.

use serde::{Deserialize, Serialize};

/// Response type for slash command replies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum ResponseType {
    /// Only visible to the user who invoked the command.
    #[default]
    Ephemeral,
    /// Visible to everyone in the channel.
    InChannel,
}

/// A message posted back to Slack.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReplyPayload {
    /// Channel override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub channel: Option<String>,
    /// Username override.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub username: Option<String>,
    /// Message text (mrkdwn).
    pub text: String,
    /// Who sees the reply.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub response_type: Option<ResponseType>,
    /// Emoji used as the bot's icon.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_emoji: Option<String>,
    /// Whether links in the text unfurl.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub unfurl_links: Option<bool>,
    /// `1` expands `@handle` and `#channel` mentions.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link_names: Option<u8>,
    /// Legacy attachments.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub attachments: Vec<Attachment>,
}

impl ReplyPayload {
    /// Create a plain text reply.
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Default::default()
        }
    }

    /// Expand user and group mentions in the text.
    pub fn with_link_names(mut self) -> Self {
        self.link_names = Some(1);
        self
    }

    /// Set response type to in_channel (visible to all).
    pub fn in_channel(mut self) -> Self {
        self.response_type = Some(ResponseType::InChannel);
        self
    }

    /// Override the channel.
    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        self.channel = Some(channel.into());
        self
    }

    /// Override the username and icon.
    pub fn with_identity(mut self, username: impl Into<String>, icon_emoji: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.icon_emoji = Some(icon_emoji.into());
        self
    }

    /// Append an attachment.
    pub fn with_attachment(mut self, attachment: Attachment) -> Self {
        self.attachments.push(attachment);
        self
    }
}

/// Legacy message attachment.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attachment {
    /// Plain text summary for notifications.
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub fallback: String,
    /// Text shown above the attachment.
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub pretext: String,
    /// Sidebar color, e.g. `#36a64f`.
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub color: String,
    /// Author name.
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub author_name: String,
    /// Author link.
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub author_link: String,
    /// Author icon URL.
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub author_icon: String,
    /// Title.
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub title: String,
    /// Title link.
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub title_link: String,
    /// Body text.
    #[serde(skip_serializing_if = "String::is_empty", default)]
    pub text: String,
    /// Table of fields.
    #[serde(skip_serializing_if = "Vec::is_empty", default)]
    pub fields: Vec<Field>,
}

impl Attachment {
    /// Create an attachment with a title and fallback text.
    pub fn titled(title: impl Into<String>) -> Self {
        let title = title.into();
        Self {
            fallback: title.clone(),
            title,
            ..Default::default()
        }
    }

    /// Set the sidebar color.
    pub fn with_color(mut self, color: impl Into<String>) -> Self {
        self.color = color.into();
        self
    }

    /// Add a field.
    pub fn field(mut self, title: impl Into<String>, value: impl Into<String>, short: bool) -> Self {
        self.fields.push(Field {
            title: title.into(),
            value: value.into(),
            short,
        });
        self
    }
}

/// A title/value pair in an attachment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Field {
    /// Field title.
    pub title: String,
    /// Field value.
    pub value: String,
    /// Whether the field is narrow enough to sit beside another.
    pub short: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_payload_serialization() {
        let payload = ReplyPayload::text("hello").with_link_names();
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json, serde_json::json!({"text": "hello", "link_names": 1}));
    }

    #[test]
    fn test_payload_overrides() {
        let payload = ReplyPayload::text("hi")
            .in_channel()
            .with_channel("#general")
            .with_identity("teamdir", ":telephone_receiver:");
        let json = serde_json::to_value(&payload).unwrap();

        assert_eq!(json["response_type"], "in_channel");
        assert_eq!(json["channel"], "#general");
        assert_eq!(json["username"], "teamdir");
        assert_eq!(json["icon_emoji"], ":telephone_receiver:");
    }

    #[test]
    fn test_attachment_fields() {
        let payload = ReplyPayload::text("").with_attachment(
            Attachment::titled("Jane Doe")
                .with_color("#36a64f")
                .field("Phone", "555-0100", true),
        );
        let json = serde_json::to_value(&payload).unwrap();

        let attachment = &json["attachments"][0];
        assert_eq!(attachment["title"], "Jane Doe");
        assert_eq!(attachment["fallback"], "Jane Doe");
        assert_eq!(attachment["fields"][0]["value"], "555-0100");
        assert_eq!(attachment["fields"][0]["short"], true);
        assert!(attachment.get("pretext").is_none());
    }

    #[test]
    fn test_payload_deserialize_minimal() {
        let payload: ReplyPayload = serde_json::from_str(r#"{"text": "x"}"#).unwrap();
        assert_eq!(payload, ReplyPayload::text("x"));
    }
}
