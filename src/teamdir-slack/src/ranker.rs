//! Deterministic ordering of matched records.
//!
//! Both comparators are total over the whole record, so the output order never
//! depends on the order the provider returned records in.

use std::cmp::Ordering;

use crate::directory::{DirectoryGroup, DirectoryUser};

/// Order users by real name, then handle (both case-insensitively), then by
/// every remaining field.
pub fn compare_users(a: &DirectoryUser, b: &DirectoryUser) -> Ordering {
    a.real_name
        .to_uppercase()
        .cmp(&b.real_name.to_uppercase())
        .then_with(|| a.handle.to_uppercase().cmp(&b.handle.to_uppercase()))
        .then_with(|| a.real_name.cmp(&b.real_name))
        .then_with(|| a.handle.cmp(&b.handle))
        .then_with(|| a.last_name.cmp(&b.last_name))
        .then_with(|| a.first_name.cmp(&b.first_name))
        .then_with(|| a.email.cmp(&b.email))
        .then_with(|| a.phone.cmp(&b.phone))
        .then_with(|| a.id.cmp(&b.id))
        .then_with(|| a.deleted.cmp(&b.deleted))
}

/// Order groups by name (case-insensitively), then by every remaining field.
pub fn compare_groups(a: &DirectoryGroup, b: &DirectoryGroup) -> Ordering {
    a.name
        .to_uppercase()
        .cmp(&b.name.to_uppercase())
        .then_with(|| a.name.cmp(&b.name))
        .then_with(|| a.handle.cmp(&b.handle))
        .then_with(|| a.description.cmp(&b.description))
        .then_with(|| a.id.cmp(&b.id))
}

/// Sort matched users and groups into display order.
pub fn rank(
    mut users: Vec<DirectoryUser>,
    mut groups: Vec<DirectoryGroup>,
) -> (Vec<DirectoryUser>, Vec<DirectoryGroup>) {
    users.sort_by(compare_users);
    groups.sort_by(compare_groups);
    (users, groups)
}
