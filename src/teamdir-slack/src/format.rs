//! Reply text rendering.
//!
//! Turns a [`SearchResult`] into the mrkdwn text posted back to Slack, with an
//! optional debug trailer describing the configuration and the raw request.

use std::fmt::Write as _;

use crate::auth::UNAUTHENTICATED_MESSAGE;
use crate::commands::{InboundRequest, SearchQuery};
use crate::config::RuntimeConfig;
use crate::directory::{DirectoryGroup, DirectoryUser};
use crate::pipeline::{Outcome, SearchResult};
use crate::query::too_short_message;

/// Replacement text for sensitive form fields in debug output.
pub const REDACTED: &str = "REDACTED";

/// Everything the formatter needs besides the result itself.
#[derive(Debug, Clone, Copy)]
pub struct FormatContext<'a> {
    /// Request-scoped configuration.
    pub config: &'a RuntimeConfig,
    /// Transport metadata of the inbound request.
    pub request: &'a InboundRequest,
    /// The parsed query.
    pub query: &'a SearchQuery,
    /// The phrase actually searched for.
    pub phrase: &'a str,
}

/// Render the reply for a search result.
///
/// `phrase` is echoed in the reply; callers pass the original phrase for
/// [`Outcome::PhraseTooShort`] and the cleaned phrase otherwise. The debug
/// trailer is appended for every outcome except [`Outcome::Unauthenticated`],
/// which always gets the fixed text alone.
pub fn format_response(
    result: &SearchResult,
    phrase: &str,
    debug: bool,
    ctx: &FormatContext<'_>,
) -> String {
    let mut text = match result.outcome {
        Outcome::Unauthenticated => return UNAUTHENTICATED_MESSAGE.to_string(),
        Outcome::PhraseTooShort => too_short_message(phrase),
        Outcome::NoMatches => not_found_message(phrase),
        Outcome::Matches => format_matches(result, phrase, ctx.config.unlisted_phone()),
    };

    if debug {
        if !text.is_empty() && !text.ends_with('\n') {
            text.push('\n');
        }
        text.push_str(&debug_trailer(result, ctx));
    }

    text
}

/// Reply text when nothing matched.
pub fn not_found_message(phrase: &str) -> String {
    format!(
        "I'm sorry, but I was not able to find a user or group using your search term \"{}\"!",
        phrase
    )
}

/// One line for a matched user.
pub fn format_user_line(user: &DirectoryUser, unlisted_phone: &str) -> String {
    let phone = if user.phone.is_empty() {
        unlisted_phone
    } else {
        user.phone.as_str()
    };
    format!(
        "{} {}: :dir_phone: {} :dir_email: <mailto:{}|{}> :slack: <@{}|{}>",
        user.first_name, user.last_name, phone, user.email, user.email, user.id, user.handle
    )
}

/// One line for a matched group.
pub fn format_group_line(group: &DirectoryGroup) -> String {
    format!(
        "{} :slack: <!subteam^{}|@{}>",
        group.name, group.id, group.handle
    )
}

fn format_matches(result: &SearchResult, phrase: &str, unlisted_phone: &str) -> String {
    let mut text = String::new();

    if !result.users.is_empty() {
        let _ = writeln!(text, "*Users matching \"{}\":*", phrase);
        for user in &result.users {
            let _ = writeln!(text, "{}", format_user_line(user, unlisted_phone));
        }
    }

    if !result.groups.is_empty() {
        let _ = writeln!(text, "*Groups matching \"{}\":*", phrase);
        for group in &result.groups {
            let _ = writeln!(text, "{}", format_group_line(group));
        }
    }

    text
}

/// Whether a form field must not be echoed back. Matching ignores case.
pub fn is_sensitive_field(name: &str) -> bool {
    let name = name.to_lowercase();
    name.contains("token") || name.contains("response_url")
}

fn debug_trailer(result: &SearchResult, ctx: &FormatContext<'_>) -> String {
    let config = ctx.config;
    let request = ctx.request;
    let query = ctx.query;
    let features = config.features();
    let mut out = String::from("*Debug Data:*\n");

    let _ = writeln!(
        out,
        "DEBUG env.Debug={}, env.Team={}, env.Version={}, env.SrcHome={}, env.TriggerWord={}, env.GroupSearch={}, env.DebugTrigger={}, env.Redaction={}",
        config.debug,
        config.team(),
        config.version(),
        config.src_home(),
        config.trigger_word(),
        features.group_search,
        features.debug_trigger,
        features.redaction,
    );

    let content_length = request
        .content_length
        .map(|n| n.to_string())
        .unwrap_or_else(|| "-1".to_string());
    let _ = writeln!(
        out,
        "DEBUG request Method={}, Host={}, URL={}, Proto={}, RemoteAddr={}, Content-Length={}",
        request.method,
        request.host,
        request.url,
        request.protocol,
        request.remote_addr,
        content_length,
    );

    for (name, value) in &request.headers {
        let _ = writeln!(out, "DEBUG request Header {}={}", name, value);
    }

    for (name, value) in &request.form {
        let shown = if features.redaction && is_sensitive_field(name) {
            REDACTED
        } else {
            value.as_str()
        };
        let _ = writeln!(out, "DEBUG request PostForm {}={}", name, shown);
    }

    let _ = writeln!(
        out,
        "DEBUG len(users)={}, len(groups)={}",
        result.users.len(),
        result.groups.len()
    );

    let _ = writeln!(
        out,
        "DEBUG query TeamID={}, TeamDomain={}, UserName={}, UserID={}, ChannelName={}, ChannelID={}, Text={}",
        query.team_id,
        query.team_domain,
        query.user_name,
        query.user_id,
        query.channel_name,
        query.channel_id,
        ctx.phrase,
    );

    out
}
