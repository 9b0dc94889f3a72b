// Deterministic identifiers: content fingerprints and composed entity keys.

use md5::{Digest, Md5};
use uuid::Uuid;

/// Prefix for preference actions. Trending-topic actions use this literal
/// scheme instead of `compose_id`.
pub const PREFERENCE_PREFIX: &str = "pr";

/// Prefix for actions produced by the legacy sports/finance rules.
pub const LEGACY_FOLLOW_PREFIX: &str = "f";

/// Derive a stable UUID-shaped identifier from a string's content.
///
/// The MD5 digest of the UTF-8 bytes, laid out as a mixed-endian GUID (first
/// three groups little-endian) so ids match the ones already minted by the
/// downstream store. The same logical target (a lat/long pair, a news topic
/// signature) maps to the same id across runs and across users.
pub fn content_id(value: &str) -> String {
    let digest = Md5::digest(value.as_bytes());
    let mut bytes = [0u8; 16];
    bytes.copy_from_slice(&digest);
    Uuid::from_bytes_le(bytes).to_string()
}

/// Per-user key for a prefix + target combination: `{prefix}_{owner}_{target}`.
pub fn compose_id(prefix: &str, owner_id: &str, target_id: &str) -> String {
    format!("{prefix}_{owner_id}_{target_id}")
}

/// Id for a trending-topic preference action: `pr_{owner}_{target}`.
pub fn preference_id(owner_id: &str, target_id: &str) -> String {
    format!("{PREFERENCE_PREFIX}_{owner_id}_{target_id}")
}

/// Id for a legacy sports/finance follow: `f_{owner}_{target}`.
pub fn legacy_follow_id(owner_id: &str, target_id: &str) -> String {
    format!("{LEGACY_FOLLOW_PREFIX}_{owner_id}_{target_id}")
}

/// Resolve the owning user's identifier from the raw `userId` value.
pub fn resolve_owner(prefix: &str, user_id: Option<&str>) -> String {
    format!("{prefix}{}", user_id.unwrap_or_default())
}
