//! Helpers for sanitizing reporter data before it enters tracing fields.
//!
//! Logs are shared for debugging; these functions keep emails, access tokens
//! and upload paths out of them while leaving enough to correlate events.

use std::collections::hash_map::DefaultHasher;
use std::hash::{Hash, Hasher};
use std::path::Path;

/// Keeps the first character of the local part and the whole domain.
///
/// - `budi@example.com` → `b***@example.com`
/// - `not-an-email` → `***`
pub fn redact_email(email: &str) -> String {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() => {
            let first = local.chars().next().unwrap_or('*');
            format!("{}***@{}", first, domain)
        }
        _ => "***".to_string(),
    }
}

/// Shows only the first four characters of a secret token.
pub fn redact_token(token: &str) -> String {
    let prefix: String = token.chars().take(4).collect();
    format!("{}…", prefix)
}

/// Returns only the filename component of a path (no directory).
pub fn redact_path(path: &Path) -> String {
    path.file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("<unknown>")
        .to_string()
}

/// Short deterministic fingerprint for correlating a value across log lines
/// without exposing it.
pub fn fingerprint(value: &str) -> String {
    let mut hasher = DefaultHasher::new();
    value.hash(&mut hasher);
    format!("{:016x}", hasher.finish())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_redact_email() {
        assert_eq!(redact_email("budi@example.com"), "b***@example.com");
    }

    #[test]
    fn test_redact_email_without_at() {
        assert_eq!(redact_email("garbage"), "***");
        assert_eq!(redact_email("@example.com"), "***");
    }

    #[test]
    fn test_redact_token_keeps_prefix() {
        assert_eq!(redact_token("abcdef123456"), "abcd…");
        assert_eq!(redact_token("ab"), "ab…");
    }

    #[test]
    fn test_redact_path_returns_filename() {
        assert_eq!(
            redact_path(Path::new("/srv/uploads/1700000000000-1234.jpg")),
            "1700000000000-1234.jpg"
        );
        assert_eq!(redact_path(Path::new("/")), "<unknown>");
    }

    #[test]
    fn test_fingerprint_deterministic() {
        assert_eq!(fingerprint("a@b.c"), fingerprint("a@b.c"));
        assert_ne!(fingerprint("a@b.c"), fingerprint("x@y.z"));
        assert_eq!(fingerprint("a@b.c").len(), 16);
    }
}
