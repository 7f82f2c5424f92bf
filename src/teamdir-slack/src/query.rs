//! Search phrase preprocessing.
//!
//! Detects the debug trigger, strips it from the phrase and decides whether
//! what is left is long enough to search for.

use regex::RegexBuilder;
use tracing::{debug, warn};

use crate::config::RuntimeConfig;
use crate::matcher::ci_contains;

/// Shortest phrase, in characters, that will be searched for.
pub const MIN_PHRASE_CHARS: usize = 2;

/// A phrase ready for matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Preprocessed {
    /// The phrase with every `" " + trigger` removed.
    pub phrase: String,
    /// Whether debug output is on for this request.
    pub debug: bool,
}

impl Preprocessed {
    /// Whether the cleaned phrase is too short to search for.
    pub fn is_too_short(&self) -> bool {
        self.phrase.chars().count() < MIN_PHRASE_CHARS
    }
}

/// Clean the raw phrase and work out the request's debug mode.
///
/// Debug mode is on when the configuration already enables it or when the
/// phrase contains the configured trigger (ignoring case).
pub fn preprocess(raw: &str, config: &RuntimeConfig) -> Preprocessed {
    let Some(trigger) = config.active_debug_trigger() else {
        return Preprocessed {
            phrase: raw.to_string(),
            debug: config.debug,
        };
    };

    if !ci_contains(raw, trigger) {
        return Preprocessed {
            phrase: raw.to_string(),
            debug: config.debug,
        };
    }

    debug!("Debug trigger found in search phrase, enabling debug for this request");
    Preprocessed {
        phrase: strip_trigger(raw, trigger),
        debug: true,
    }
}

/// Remove every `" " + trigger` from the phrase, ignoring case.
///
/// Removal can splice a new occurrence together (`"  debugdebug"`), so passes
/// repeat until the phrase stops changing. Each pass that changes anything
/// shortens the phrase, which bounds the loop.
fn strip_trigger(phrase: &str, trigger: &str) -> String {
    let needle = format!(" {}", trigger);
    let re = match RegexBuilder::new(&regex::escape(&needle))
        .case_insensitive(true)
        .build()
    {
        Ok(re) => Some(re),
        Err(e) => {
            warn!("Could not build debug trigger pattern: {}", e);
            None
        }
    };

    let mut current = phrase.to_string();
    loop {
        let next = match &re {
            Some(re) => re.replace_all(&current, "").into_owned(),
            None => current.replace(&needle, ""),
        };
        if next == current {
            return current;
        }
        current = next;
    }
}

/// Reply text for phrases below [`MIN_PHRASE_CHARS`].
pub fn too_short_message(original: &str) -> String {
    format!(
        "I'm sorry, but your search phrase \"{}\" is too short!",
        original
    )
}
