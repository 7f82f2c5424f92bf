//! Runtime configuration for the directory search bot.
//!
//! Loaded from environment variables once at startup. Every request works on
//! its own clone, so per-request changes (the debug trigger turning debug mode
//! on) never outlive the request that caused them.

use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::{DirectoryError, DirectoryResult};

/// Placeholder shown for users without a phone number.
pub const DEFAULT_UNLISTED_PHONE: &str = "no phone # entered";

/// Default Slack Web API base URL.
pub const DEFAULT_API_BASE_URL: &str = "https://slack.com/api";

/// Environment variable names.
const ENV_DEBUG: &str = "DEBUG";
const ENV_DEBUG_STRING: &str = "DEBUGSTRING";
const ENV_SRC_HOME: &str = "SRC_HOME";
const ENV_TEAM: &str = "SLACK_TEAM";
const ENV_TOKEN: &str = "SLACK_TOKEN";
const ENV_USER_TOKEN: &str = "SLACK_USER_TOKEN";
const ENV_TRIGGER_WORD: &str = "SLACK_TRIGGERWORD";
const ENV_VERSION: &str = "VERSION";
const ENV_UNLISTED_PHONE: &str = "UNLISTED_PHONE_TEXT";
const ENV_API_BASE_URL: &str = "SLACK_API_BASE_URL";
const ENV_GROUP_SEARCH: &str = "TEAMDIR_GROUP_SEARCH";
const ENV_DEBUG_TRIGGER: &str = "TEAMDIR_DEBUG_TRIGGER";
const ENV_REDACTION: &str = "TEAMDIR_REDACTION";

/// Optional behaviours that distinguish the bot's variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeatureSet {
    /// Search user groups in addition to users.
    pub group_search: bool,
    /// Let a configured substring in the phrase turn on debug output.
    pub debug_trigger: bool,
    /// Replace token-like form fields with `REDACTED` in debug output.
    pub redaction: bool,
}

impl Default for FeatureSet {
    fn default() -> Self {
        Self {
            group_search: true,
            debug_trigger: true,
            redaction: true,
        }
    }
}

/// Runtime configuration for the search pipeline.
#[derive(Clone)]
pub struct RuntimeConfig {
    /// Debug mode (verbose trailer on every reply).
    pub debug: bool,
    /// Shared secret every inbound request must carry.
    shared_secret: SecretString,
    /// Slack user token used to read the directory.
    user_token: Option<SecretString>,
    /// Substring in the phrase that turns on debug mode for one request.
    debug_trigger: String,
    /// Slack team (workspace) name.
    team: String,
    /// Outgoing webhook trigger word.
    trigger_word: String,
    /// Build/version string.
    version: String,
    /// Source location, shown in debug output.
    src_home: String,
    /// Text shown instead of an empty phone number.
    unlisted_phone: String,
    /// Slack Web API base URL.
    api_base_url: String,
    /// Variant feature toggles.
    features: FeatureSet,
}

impl std::fmt::Debug for RuntimeConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeConfig")
            .field("debug", &self.debug)
            .field("shared_secret", &"[REDACTED]")
            .field("user_token", &self.user_token.as_ref().map(|_| "[REDACTED]"))
            .field("debug_trigger", &self.debug_trigger)
            .field("team", &self.team)
            .field("trigger_word", &self.trigger_word)
            .field("version", &self.version)
            .field("src_home", &self.src_home)
            .field("unlisted_phone", &self.unlisted_phone)
            .field("api_base_url", &self.api_base_url)
            .field("features", &self.features)
            .finish()
    }
}

impl RuntimeConfig {
    /// Create a new configuration with the shared secret and defaults for everything else.
    pub fn new(shared_secret: impl Into<String>) -> Self {
        Self {
            debug: false,
            shared_secret: SecretString::new(shared_secret.into().into()),
            user_token: None,
            debug_trigger: String::new(),
            team: String::new(),
            trigger_word: String::new(),
            version: String::new(),
            src_home: String::new(),
            unlisted_phone: DEFAULT_UNLISTED_PHONE.to_string(),
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            features: FeatureSet::default(),
        }
    }

    /// Set the Slack user token used to read the directory.
    pub fn with_user_token(mut self, token: impl Into<String>) -> Self {
        let token = token.into();
        self.user_token = if token.is_empty() {
            None
        } else {
            Some(SecretString::new(token.into()))
        };
        self
    }

    /// Set the baseline debug mode.
    pub fn with_debug(mut self, debug: bool) -> Self {
        self.debug = debug;
        self
    }

    /// Set the debug-trigger substring.
    pub fn with_debug_trigger(mut self, trigger: impl Into<String>) -> Self {
        self.debug_trigger = trigger.into();
        self
    }

    /// Set the team name.
    pub fn with_team(mut self, team: impl Into<String>) -> Self {
        self.team = team.into();
        self
    }

    /// Set the outgoing webhook trigger word.
    pub fn with_trigger_word(mut self, word: impl Into<String>) -> Self {
        self.trigger_word = word.into();
        self
    }

    /// Set the version and source location shown in debug output.
    pub fn with_build_info(mut self, version: impl Into<String>, src_home: impl Into<String>) -> Self {
        self.version = version.into();
        self.src_home = src_home.into();
        self
    }

    /// Set the placeholder for users without a phone number.
    pub fn with_unlisted_phone(mut self, text: impl Into<String>) -> Self {
        self.unlisted_phone = text.into();
        self
    }

    /// Point the directory provider at a different API base URL.
    pub fn with_api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Set the feature toggles.
    pub fn with_features(mut self, features: FeatureSet) -> Self {
        self.features = features;
        self
    }

    /// Load configuration from environment variables.
    ///
    /// Required variables:
    /// - `SLACK_TOKEN` - shared secret sent by Slack with every request
    ///
    /// Optional variables:
    /// - `SLACK_USER_TOKEN` - token used to list users and user groups
    /// - `DEBUG` - `true` turns debug mode on for every request
    /// - `DEBUGSTRING` - substring that turns debug mode on for one request
    /// - `SLACK_TEAM`, `SLACK_TRIGGERWORD`, `VERSION`, `SRC_HOME`
    /// - `UNLISTED_PHONE_TEXT` - placeholder for empty phone numbers
    /// - `SLACK_API_BASE_URL` - Web API base URL
    /// - `TEAMDIR_GROUP_SEARCH`, `TEAMDIR_DEBUG_TRIGGER`, `TEAMDIR_REDACTION` - feature toggles
    pub fn from_env() -> DirectoryResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> DirectoryResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let shared_secret = lookup(ENV_TOKEN)
            .ok_or_else(|| DirectoryError::Config(format!("{} not set", ENV_TOKEN)))?;

        let user_token = lookup(ENV_USER_TOKEN).unwrap_or_default();
        if user_token.is_empty() {
            warn!(
                "{} not set, directory lookups will fail and every search will come back empty",
                ENV_USER_TOKEN
            );
        } else if !user_token.starts_with("xox") {
            warn!("User token doesn't start with 'xox', this may be incorrect");
        }

        let defaults = FeatureSet::default();
        let features = FeatureSet {
            group_search: parse_toggle(lookup(ENV_GROUP_SEARCH), defaults.group_search),
            debug_trigger: parse_toggle(lookup(ENV_DEBUG_TRIGGER), defaults.debug_trigger),
            redaction: parse_toggle(lookup(ENV_REDACTION), defaults.redaction),
        };

        let mut config = Self::new(shared_secret)
            .with_user_token(user_token)
            .with_debug(lookup(ENV_DEBUG).as_deref() == Some("true"))
            .with_debug_trigger(lookup(ENV_DEBUG_STRING).unwrap_or_default())
            .with_team(lookup(ENV_TEAM).unwrap_or_default())
            .with_trigger_word(lookup(ENV_TRIGGER_WORD).unwrap_or_default())
            .with_build_info(
                lookup(ENV_VERSION).unwrap_or_default(),
                lookup(ENV_SRC_HOME).unwrap_or_default(),
            )
            .with_features(features);

        if let Some(text) = lookup(ENV_UNLISTED_PHONE) {
            config = config.with_unlisted_phone(text);
        }
        if let Some(url) = lookup(ENV_API_BASE_URL) {
            config = config.with_api_base_url(url);
        }

        debug!(?config, "Loaded runtime config from environment");
        Ok(config)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> DirectoryResult<()> {
        if self.shared_secret.expose_secret().is_empty() {
            return Err(DirectoryError::Config("Shared secret is empty".to_string()));
        }
        if self.unlisted_phone.is_empty() {
            return Err(DirectoryError::Config(
                "Unlisted phone placeholder is empty".to_string(),
            ));
        }
        if !self.api_base_url.starts_with("http://") && !self.api_base_url.starts_with("https://")
        {
            return Err(DirectoryError::Config(format!(
                "API base URL must be http(s): {}",
                self.api_base_url
            )));
        }
        Ok(())
    }

    /// Get the shared secret.
    pub fn shared_secret(&self) -> &str {
        self.shared_secret.expose_secret()
    }

    /// Get the Slack user token, if configured.
    pub fn user_token(&self) -> Option<&str> {
        self.user_token.as_ref().map(|t| t.expose_secret())
    }

    /// Get the debug trigger, if the feature is on and a trigger is configured.
    pub fn active_debug_trigger(&self) -> Option<&str> {
        if self.features.debug_trigger && !self.debug_trigger.is_empty() {
            Some(&self.debug_trigger)
        } else {
            None
        }
    }

    /// Get the team name.
    pub fn team(&self) -> &str {
        &self.team
    }

    /// Get the trigger word.
    pub fn trigger_word(&self) -> &str {
        &self.trigger_word
    }

    /// Get the version string.
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Get the source location.
    pub fn src_home(&self) -> &str {
        &self.src_home
    }

    /// Get the placeholder for users without a phone number.
    pub fn unlisted_phone(&self) -> &str {
        &self.unlisted_phone
    }

    /// Get the Slack Web API base URL.
    pub fn api_base_url(&self) -> &str {
        &self.api_base_url
    }

    /// Get the feature toggles.
    pub fn features(&self) -> FeatureSet {
        self.features
    }
}

fn parse_toggle(value: Option<String>, default: bool) -> bool {
    match value.as_deref().map(str::trim) {
        Some(v) if v.eq_ignore_ascii_case("true") || v == "1" || v.eq_ignore_ascii_case("on") => {
            true
        }
        Some(v) if v.eq_ignore_ascii_case("false") || v == "0" || v.eq_ignore_ascii_case("off") => {
            false
        }
        Some(v) => {
            warn!("Unrecognised toggle value '{}', using default {}", v, default);
            default
        }
        None => default,
    }
}
