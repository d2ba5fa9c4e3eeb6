//! Filesystem-safe directory names derived from arbitrary keys.
//!
//! Session keys contain characters such as `:` and `|` that are not safe in
//! every filesystem. The slug keeps a readable prefix and appends a short
//! SHA-256 digest of the original key, so two keys that sanitize to the same
//! prefix still map to different directories.

use sha2::{Digest, Sha256};

const MAX_PREFIX_LEN: usize = 32;
const HASH_LEN: usize = 8;
const FALLBACK: &str = "session";

/// Derive a stable, filesystem-safe slug from `key`.
///
/// ```
/// use genesis_commons::slugify_key;
///
/// let slug = slugify_key("agent:main:discord:42");
/// assert!(slug.starts_with("agent-main-discord-42-"));
/// ```
pub fn slugify_key(key: &str) -> String {
    let trimmed = key.trim();
    let trimmed = if trimmed.is_empty() { FALLBACK } else { trimmed };

    let mut safe = String::with_capacity(trimmed.len());
    let mut pending_dash = false;
    for ch in trimmed.chars().flat_map(char::to_lowercase) {
        if ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-') {
            if pending_dash && !safe.is_empty() {
                safe.push('-');
            }
            pending_dash = false;
            safe.push(ch);
        } else {
            pending_dash = true;
        }
    }

    let mut prefix: String = safe.trim_matches('-').chars().take(MAX_PREFIX_LEN).collect();
    if prefix.is_empty() {
        prefix.push_str(FALLBACK);
    }

    format!("{prefix}-{}", short_digest(trimmed))
}

fn short_digest(input: &str) -> String {
    let digest = format!("{:x}", Sha256::digest(input.as_bytes()));
    digest.chars().take(HASH_LEN).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn slug_replaces_unsafe_characters() {
        let slug = slugify_key("Agent:Main:Work");
        assert!(slug.starts_with("agent-main-work-"), "{slug}");
        assert_eq!(slug.len(), "agent-main-work-".len() + HASH_LEN);
    }

    #[test]
    fn slug_is_stable() {
        assert_eq!(slugify_key("agent:main:x"), slugify_key("agent:main:x"));
        assert_eq!(slugify_key("  agent:main:x "), slugify_key("agent:main:x"));
    }

    #[test]
    fn colliding_prefixes_are_disambiguated() {
        assert_ne!(slugify_key("agent:a|b"), slugify_key("agent:a:b"));
    }

    #[test]
    fn empty_key_uses_fallback() {
        assert!(slugify_key("   ").starts_with("session-"));
        assert!(slugify_key("::").starts_with("session-"));
    }

    #[test]
    fn long_keys_are_truncated() {
        let slug = slugify_key(&"x".repeat(100));
        assert_eq!(slug.len(), MAX_PREFIX_LEN + 1 + HASH_LEN);
    }
}
