//! End-to-end handling of one directory search.
//!
//! [`DirectorySearch`] runs the steps in a fixed order: authenticate,
//! preprocess, length check, fetch, match, rank, format. Configuration is
//! copied per request so the debug trigger only affects the request that
//! carried it.

use std::sync::Arc;

use tracing::{debug, error, info};

use crate::auth::authenticate;
use crate::commands::{InboundRequest, SearchQuery};
use crate::config::RuntimeConfig;
use crate::directory::{DirectoryGroup, DirectoryProvider, DirectoryUser, SlackDirectory};
use crate::error::DirectoryResult;
use crate::format::{FormatContext, format_response};
use crate::matcher::match_directory;
use crate::messages::ReplyPayload;
use crate::query::preprocess;
use crate::ranker::rank;

/// How a search ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// At least one user or group matched.
    Matches,
    /// The search ran and found nothing.
    NoMatches,
    /// The cleaned phrase was below the minimum length.
    PhraseTooShort,
    /// The request token did not match the shared secret.
    Unauthenticated,
}

impl Outcome {
    /// Stable name used in logs.
    pub fn as_str(self) -> &'static str {
        match self {
            Outcome::Matches => "matches",
            Outcome::NoMatches => "no_matches",
            Outcome::PhraseTooShort => "phrase_too_short",
            Outcome::Unauthenticated => "unauthenticated",
        }
    }
}

impl std::fmt::Display for Outcome {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Ranked matches plus the outcome they produce.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchResult {
    pub outcome: Outcome,
    pub users: Vec<DirectoryUser>,
    pub groups: Vec<DirectoryGroup>,
}

impl SearchResult {
    /// Result for a rejected token.
    pub fn unauthenticated() -> Self {
        Self {
            outcome: Outcome::Unauthenticated,
            users: Vec::new(),
            groups: Vec::new(),
        }
    }

    /// Result for a phrase that is too short to search for.
    pub fn too_short() -> Self {
        Self {
            outcome: Outcome::PhraseTooShort,
            users: Vec::new(),
            groups: Vec::new(),
        }
    }

    /// Result of a completed search; the outcome follows from the matches.
    pub fn matched(users: Vec<DirectoryUser>, groups: Vec<DirectoryGroup>) -> Self {
        let outcome = if users.is_empty() && groups.is_empty() {
            Outcome::NoMatches
        } else {
            Outcome::Matches
        };
        Self {
            outcome,
            users,
            groups,
        }
    }
}

/// The rendered reply for one request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchReply {
    /// Ranked matches and outcome.
    pub result: SearchResult,
    /// The phrase after trigger removal.
    pub phrase: String,
    /// Whether debug output was on for this request.
    pub debug: bool,
    /// Reply text.
    pub text: String,
}

impl SearchReply {
    pub fn outcome(&self) -> Outcome {
        self.result.outcome
    }

    /// The JSON body posted back to Slack.
    pub fn into_payload(self) -> ReplyPayload {
        ReplyPayload::text(self.text).with_link_names()
    }
}

/// Directory search over a configured provider.
#[derive(Clone)]
pub struct DirectorySearch {
    config: RuntimeConfig,
    provider: Arc<dyn DirectoryProvider>,
}

impl std::fmt::Debug for DirectorySearch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DirectorySearch")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl DirectorySearch {
    /// Create a search over an explicit provider.
    pub fn new(config: RuntimeConfig, provider: Arc<dyn DirectoryProvider>) -> Self {
        Self { config, provider }
    }

    /// Create a search backed by the Slack Web API.
    pub fn from_config(config: RuntimeConfig) -> DirectoryResult<Self> {
        let provider = SlackDirectory::new(&config)?;
        Ok(Self::new(config, Arc::new(provider)))
    }

    /// Baseline configuration shared by every request.
    pub fn config(&self) -> &RuntimeConfig {
        &self.config
    }

    /// Handle one search request.
    pub async fn handle(&self, query: &SearchQuery, request: &InboundRequest) -> SearchReply {
        // Request-scoped copy; dropped when the request ends.
        let mut config = self.config.clone();

        info!(
            user = %query.user_name,
            channel = %query.channel_name,
            team = %query.team_domain,
            "Directory search requested"
        );

        if !authenticate(&query.token, config.shared_secret()).is_authenticated() {
            let result = SearchResult::unauthenticated();
            let ctx = FormatContext {
                config: &config,
                request,
                query,
                phrase: &query.text,
            };
            let text = format_response(&result, &query.text, false, &ctx);
            return SearchReply {
                result,
                phrase: query.text.clone(),
                debug: false,
                text,
            };
        }

        let preprocessed = preprocess(&query.text, &config);
        config.debug = preprocessed.debug;
        let phrase = preprocessed.phrase.as_str();

        let ctx = FormatContext {
            config: &config,
            request,
            query,
            phrase,
        };

        if preprocessed.is_too_short() {
            debug!(phrase = %query.text, "Search phrase too short");
            let result = SearchResult::too_short();
            let text = format_response(&result, &query.text, config.debug, &ctx);
            return SearchReply {
                result,
                phrase: preprocessed.phrase.clone(),
                debug: config.debug,
                text,
            };
        }

        let (users, groups) = self.fetch(&config).await;
        let (matched_users, matched_groups) = match_directory(phrase, &users, &groups);
        let (ranked_users, ranked_groups) = rank(matched_users, matched_groups);
        let result = SearchResult::matched(ranked_users, ranked_groups);

        info!(
            outcome = %result.outcome,
            users = result.users.len(),
            groups = result.groups.len(),
            "Directory search complete"
        );

        let text = format_response(&result, phrase, config.debug, &ctx);
        SearchReply {
            result,
            phrase: preprocessed.phrase.clone(),
            debug: config.debug,
            text,
        }
    }

    /// Fetch both collections. A failed fetch is logged and treated as empty.
    async fn fetch(&self, config: &RuntimeConfig) -> (Vec<DirectoryUser>, Vec<DirectoryGroup>) {
        let users = match self.provider.list_users().await {
            Ok(users) => users,
            Err(e) => {
                error!("Failed to retrieve user list: {}", e);
                Vec::new()
            }
        };

        let groups = if config.features().group_search {
            match self.provider.list_groups().await {
                Ok(groups) => groups,
                Err(e) => {
                    error!("Failed to retrieve group list: {}", e);
                    Vec::new()
                }
            }
        } else {
            Vec::new()
        };

        (users, groups)
    }
}
