//! Document ID prefix constants and formatting helpers.
//!
//! Store-assigned ids are `{prefix}-{8 hex chars}`, e.g. `usr-ad79e575`.
//! The prefix identifies the collection a document belongs to; the natural
//! key (username, season number) is what callers identify records by.

/// Prefix for `users` documents.
pub const USER: &str = "usr";
/// Prefix for `pools` documents.
pub const POOL: &str = "pol";
/// Prefix for `pool_memberships` documents.
pub const MEMBERSHIP: &str = "mbr";
/// Prefix for `picks` documents.
pub const PICK: &str = "pck";
/// Prefix for `seasons` documents.
pub const SEASON: &str = "ssn";

pub const ALL_PREFIXES: [&str; 5] = [USER, POOL, MEMBERSHIP, PICK, SEASON];

/// Check whether an id has the `{prefix}-{8 hex}` shape.
#[must_use]
pub fn is_well_formed(id: &str) -> bool {
    let Some((prefix, rest)) = id.split_once('-') else {
        return false;
    };
    ALL_PREFIXES.contains(&prefix)
        && rest.len() == 8
        && rest.chars().all(|c| c.is_ascii_hexdigit())
}
