//! Inbound slash command / outgoing webhook payloads.
//!
//! Slack posts a form-encoded body with the fields below. The same body is
//! kept as raw pairs on [`InboundRequest`] so debug output can echo it.

/// A search request as posted by Slack.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SearchQuery {
    /// Verification token, compared against the shared secret.
    pub token: String,
    /// Team ID.
    pub team_id: String,
    /// Team domain.
    pub team_domain: String,
    /// Channel ID where the search was invoked.
    pub channel_id: String,
    /// Channel name.
    pub channel_name: String,
    /// User ID who invoked the search.
    pub user_id: String,
    /// Username.
    pub user_name: String,
    /// The search phrase.
    pub text: String,
    /// Trigger word (outgoing webhooks only).
    pub trigger_word: String,
}

impl SearchQuery {
    /// Build a query from decoded form pairs.
    ///
    /// Unknown fields are ignored; the first value of a repeated field wins.
    pub fn from_form(pairs: &[(String, String)]) -> Self {
        let mut query = Self::default();
        let mut seen: Vec<&str> = Vec::new();

        for (key, value) in pairs {
            if seen.contains(&key.as_str()) {
                continue;
            }
            let slot = match key.as_str() {
                "token" => &mut query.token,
                "team_id" => &mut query.team_id,
                "team_domain" => &mut query.team_domain,
                "channel_id" => &mut query.channel_id,
                "channel_name" => &mut query.channel_name,
                "user_id" => &mut query.user_id,
                "user_name" => &mut query.user_name,
                "text" => &mut query.text,
                "trigger_word" => &mut query.trigger_word,
                _ => continue,
            };
            *slot = value.clone();
            seen.push(key.as_str());
        }

        query
    }
}

/// Transport-level facts about the inbound request, used only for debug output.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InboundRequest {
    /// HTTP method.
    pub method: String,
    /// Host header (or URI authority).
    pub host: String,
    /// Request URL.
    pub url: String,
    /// Protocol version, e.g. `HTTP/1.1`.
    pub protocol: String,
    /// Remote peer address.
    pub remote_addr: String,
    /// Declared content length, if any.
    pub content_length: Option<u64>,
    /// Headers in arrival order.
    pub headers: Vec<(String, String)>,
    /// Decoded form fields in arrival order.
    pub form: Vec<(String, String)>,
}

impl InboundRequest {
    /// Create request metadata carrying only a decoded form.
    pub fn from_form(form: Vec<(String, String)>) -> Self {
        Self {
            form,
            ..Default::default()
        }
    }
}
