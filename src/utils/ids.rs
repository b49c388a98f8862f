use sha2::{Digest, Sha256};

/// Derive a filesystem-safe cache id from an arbitrary name
///
/// Entry ids are embedded into filenames verbatim, so callers keyed by URLs or
/// paths should pass them through here first. `tag` distinguishes artifacts
/// derived from the same name (e.g. `"document"` vs `"schema"`).
pub fn cache_id(name: &str, tag: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(name.as_bytes());
    let result = hasher.finalize();
    format!("{:x}-{}", result, tag)
}
