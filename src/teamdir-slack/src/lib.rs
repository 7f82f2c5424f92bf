//! Slack team directory search.
//!
//! This crate answers Slack slash commands and outgoing webhooks that ask
//! "who is ...?". Each request runs through a fixed pipeline:
//! - Authenticate the request token against a shared secret
//! - Strip the debug trigger from the phrase and reject short phrases
//! - Fetch users and user groups from a [`DirectoryProvider`]
//! - Match case-insensitively, rank deterministically, render mrkdwn
//!
//! # Example
//!
//! ```rust,ignore
//! use teamdir_slack::{DirectorySearch, InboundRequest, RuntimeConfig, SearchQuery};
//!
//! let config = RuntimeConfig::from_env()?;
//! let search = DirectorySearch::from_config(config)?;
//! let query = SearchQuery::from_form(&form);
//! let reply = search.handle(&query, &InboundRequest::from_form(form)).await;
//! ```
//!
//! # Configuration
//!
//! Required environment variables:
//! - `SLACK_TOKEN` - Shared secret Slack sends with every request
//! - `SLACK_USER_TOKEN` - User token for `users.list` and `usergroups.list`
//!
//! Optional:
//! - `DEBUG` - `true` enables debug output for every request
//! - `DEBUGSTRING` - Phrase suffix that enables debug output for one request
//! - `UNLISTED_PHONE_TEXT` - Shown for users without a phone number

pub mod auth;
pub mod commands;
pub mod config;
pub mod directory;
pub mod error;
pub mod format;
pub mod matcher;
pub mod messages;
pub mod pipeline;
pub mod query;
pub mod ranker;

// Re-export main types
pub use auth::{AuthDecision, UNAUTHENTICATED_MESSAGE, authenticate};
pub use commands::{InboundRequest, SearchQuery};
pub use config::{FeatureSet, RuntimeConfig};
pub use directory::{DirectoryGroup, DirectoryProvider, DirectoryUser, SlackDirectory};
pub use error::{DirectoryError, DirectoryResult, SlackApiError};
pub use format::{FormatContext, format_response};
pub use messages::ReplyPayload;
pub use pipeline::{DirectorySearch, Outcome, SearchReply, SearchResult};
pub use query::{Preprocessed, preprocess};
