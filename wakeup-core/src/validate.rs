//! Syntactic URL acceptance.

use url::Url;

/// `true` iff `candidate` parses as an absolute URL with a scheme and a
/// non-empty host. No network access.
pub fn is_valid_url(candidate: &str) -> bool {
    if candidate.is_empty() || candidate.trim() != candidate {
        return false;
    }
    match Url::parse(candidate) {
        Ok(url) => url.host_str().is_some_and(|host| !host.is_empty()),
        Err(_) => false,
    }
}
