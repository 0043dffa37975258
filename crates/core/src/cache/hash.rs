//! Request identity keys.

use sha2::{Digest, Sha256};

/// Key a request by method and canonical URL.
///
/// The query string is part of the URL, so `?v=1` and `?v=2` are different
/// entries.
pub fn compute_request_key(method: &str, url: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(method.to_ascii_uppercase().as_bytes());
    hasher.update(b"\n");
    hasher.update(url.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_stability() {
        let a = compute_request_key("GET", "https://example.com/app/");
        let b = compute_request_key("get", "https://example.com/app/");
        assert_eq!(a, b);
    }

    #[test]
    fn test_key_differs_by_query() {
        let a = compute_request_key("GET", "https://example.com/app/?v=1");
        let b = compute_request_key("GET", "https://example.com/app/?v=2");
        assert_ne!(a, b);
    }

    #[test]
    fn test_key_differs_by_method() {
        let a = compute_request_key("GET", "https://example.com/");
        let b = compute_request_key("HEAD", "https://example.com/");
        assert_ne!(a, b);
    }

    #[test]
    fn test_key_format() {
        let key = compute_request_key("GET", "https://example.com/");
        assert_eq!(key.len(), 64);
        assert!(key.chars().all(|c| c.is_ascii_hexdigit()));
    }
}
