//! Snippet fingerprinting.

/// Map a snippet to its fixed-length hex digest (blake3 over the UTF-8
/// bytes, 64 lowercase hex chars). Purely a change detector; collisions
/// are not a concern we handle.
pub fn fingerprint(snippet: &str) -> String {
    blake3::hash(snippet.as_bytes()).to_hex().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn deterministic() {
        let s = "2024年5月1日 更新情報：新着あり";
        assert_eq!(fingerprint(s), fingerprint(s));
    }

    #[test]
    fn distinct_snippets_yield_distinct_digests() {
        assert_ne!(fingerprint("first entry"), fingerprint("second entry"));
    }

    #[test]
    fn digest_is_64_lowercase_hex_chars() {
        let d = fingerprint("");
        assert_eq!(d.len(), 64);
        assert!(d.chars().all(|c| c.is_ascii_hexdigit() && !c.is_ascii_uppercase()));
    }
}
