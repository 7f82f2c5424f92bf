//! Case-insensitive substring matching over directory records.

use tracing::debug;

use crate::directory::{DirectoryGroup, DirectoryUser};

/// Whether `needle` occurs in `haystack`, ignoring case.
///
/// Both sides are uppercased with Unicode's locale-independent mapping.
pub fn ci_contains(haystack: &str, needle: &str) -> bool {
    haystack.to_uppercase().contains(&needle.to_uppercase())
}

/// Whether a searchable user's handle or any name field contains the phrase.
pub fn user_matches(user: &DirectoryUser, phrase: &str) -> bool {
    user.is_searchable()
        && (ci_contains(&user.handle, phrase)
            || ci_contains(&user.real_name, phrase)
            || ci_contains(&user.first_name, phrase)
            || ci_contains(&user.last_name, phrase))
}

/// Whether a group's handle, description or name contains the phrase.
pub fn group_matches(group: &DirectoryGroup, phrase: &str) -> bool {
    ci_contains(&group.handle, phrase)
        || ci_contains(&group.description, phrase)
        || ci_contains(&group.name, phrase)
}

/// Filter both collections down to the records matching the phrase.
pub fn match_directory(
    phrase: &str,
    users: &[DirectoryUser],
    groups: &[DirectoryGroup],
) -> (Vec<DirectoryUser>, Vec<DirectoryGroup>) {
    let matched_users: Vec<DirectoryUser> = users
        .iter()
        .filter(|user| user_matches(user, phrase))
        .inspect(|user| {
            debug!(
                id = %user.id,
                name = %user.handle,
                real_name = %user.real_name,
                "Matched user"
            )
        })
        .cloned()
        .collect();

    let matched_groups: Vec<DirectoryGroup> = groups
        .iter()
        .filter(|group| group_matches(group, phrase))
        .inspect(|group| {
            debug!(
                id = %group.id,
                name = %group.name,
                handle = %group.handle,
                "Matched group"
            )
        })
        .cloned()
        .collect();

    debug!(
        "Matched {} of {} users and {} of {} groups",
        matched_users.len(),
        users.len(),
        matched_groups.len(),
        groups.len()
    );

    (matched_users, matched_groups)
}
