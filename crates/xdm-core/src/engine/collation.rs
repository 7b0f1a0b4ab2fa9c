use crate::engine::runtime::{DynamicContext, Error, ErrorCode};
use std::collections::HashMap;
use std::sync::{Arc, LazyLock};

pub trait Collation: Send + Sync {
    fn uri(&self) -> &str;
    fn compare(&self, a: &str, b: &str) -> core::cmp::Ordering;
    fn key(&self, s: &str) -> String {
        s.to_string()
    }

    /// Byte range of the first, shortest match of `needle` in `haystack`
    /// under this collation. An empty needle matches at offset 0.
    fn find(&self, haystack: &str, needle: &str) -> Option<(usize, usize)> {
        let needle_key = self.key(needle);
        if needle_key.is_empty() {
            return Some((0, 0));
        }
        let starts = haystack.char_indices().map(|(i, _)| i);
        for start in starts {
            let rest = &haystack[start..];
            let ends = rest
                .char_indices()
                .map(|(i, c)| i + c.len_utf8());
            for end in ends {
                let k = self.key(&rest[..end]);
                if k == needle_key {
                    return Some((start, start + end));
                }
                if !needle_key.starts_with(k.as_str()) {
                    break;
                }
            }
        }
        None
    }

    fn contains(&self, haystack: &str, needle: &str) -> bool {
        self.key(haystack).contains(&self.key(needle))
    }

    fn starts_with(&self, haystack: &str, needle: &str) -> bool {
        self.key(haystack).starts_with(&self.key(needle))
    }

    fn ends_with(&self, haystack: &str, needle: &str) -> bool {
        self.key(haystack).ends_with(&self.key(needle))
    }
}

pub use crate::consts::CODEPOINT_URI;
pub use crate::consts::SIMPLE_ACCENT_URI;
pub use crate::consts::SIMPLE_CASE_ACCENT_URI;
pub use crate::consts::SIMPLE_CASE_URI;

/// Resolve the collation for a call: explicit URI first, then the caller's
/// default, then the context default, then codepoint. Unknown URIs are
/// `FOCH0002`; there is no silent fallback.
pub fn resolve_collation<N>(
    dyn_ctx: &DynamicContext<N>,
    default_collation: Option<&Arc<dyn Collation>>,
    uri: Option<&str>,
) -> Result<Arc<dyn Collation>, Error> {
    if let Some(u) = uri {
        return dyn_ctx.collations.get(u).ok_or_else(|| {
            tracing::debug!(uri = u, "collation lookup failed");
            Error::from_code(ErrorCode::FOCH0002, format!("unknown collation URI: {u}"))
        });
    }
    if let Some(c) = default_collation {
        return Ok(c.clone());
    }
    if let Some(u) = dyn_ctx.default_collation.as_deref() {
        return dyn_ctx.collations.get(u).ok_or_else(|| {
            tracing::debug!(uri = u, "default collation is not registered");
            Error::from_code(
                ErrorCode::FOCH0002,
                format!("unknown default collation URI: {u}"),
            )
        });
    }
    Ok(dyn_ctx
        .collations
        .get(CODEPOINT_URI)
        .unwrap_or_else(codepoint))
}

/// The Unicode codepoint collation as a shared handle.
pub fn codepoint() -> Arc<dyn Collation> {
    Arc::new(CodepointCollation)
}

pub struct CodepointCollation;

impl Collation for CodepointCollation {
    fn uri(&self) -> &str {
        CODEPOINT_URI
    }
    fn compare(&self, a: &str, b: &str) -> core::cmp::Ordering {
        a.cmp(b)
    }
    fn find(&self, haystack: &str, needle: &str) -> Option<(usize, usize)> {
        haystack.find(needle).map(|i| (i, i + needle.len()))
    }
    fn contains(&self, haystack: &str, needle: &str) -> bool {
        haystack.contains(needle)
    }
    fn starts_with(&self, haystack: &str, needle: &str) -> bool {
        haystack.starts_with(needle)
    }
    fn ends_with(&self, haystack: &str, needle: &str) -> bool {
        haystack.ends_with(needle)
    }
}

/// Simple case-insensitive collation
pub struct SimpleCaseCollation;

impl Collation for SimpleCaseCollation {
    fn uri(&self) -> &str {
        SIMPLE_CASE_URI
    }
    fn compare(&self, a: &str, b: &str) -> core::cmp::Ordering {
        self.key(a).cmp(&self.key(b))
    }
    fn key(&self, s: &str) -> String {
        s.to_lowercase()
    }
}

fn strip_marks(s: &str) -> String {
    use unicode_normalization::UnicodeNormalization;
    use unicode_normalization::char::canonical_combining_class as ccc;
    s.nfd().filter(|&ch| ccc(ch) == 0).collect()
}

/// Simple accent-insensitive collation (NFD + remove combining marks)
pub struct SimpleAccentCollation;

impl Collation for SimpleAccentCollation {
    fn uri(&self) -> &str {
        SIMPLE_ACCENT_URI
    }
    fn compare(&self, a: &str, b: &str) -> core::cmp::Ordering {
        self.key(a).cmp(&self.key(b))
    }
    fn key(&self, s: &str) -> String {
        strip_marks(s)
    }
}

/// Simple case+accent-insensitive collation
pub struct SimpleCaseAccentCollation;

impl Collation for SimpleCaseAccentCollation {
    fn uri(&self) -> &str {
        SIMPLE_CASE_ACCENT_URI
    }
    fn compare(&self, a: &str, b: &str) -> core::cmp::Ordering {
        self.key(a).cmp(&self.key(b))
    }
    fn key(&self, s: &str) -> String {
        strip_marks(s).to_lowercase()
    }
}

/// Registry of available collations, keyed by their URI
pub struct CollationRegistry {
    by_uri: HashMap<String, Arc<dyn Collation>>,
}

impl Default for CollationRegistry {
    fn default() -> Self {
        let mut reg = Self {
            by_uri: HashMap::new(),
        };
        reg.insert(codepoint());
        reg.insert(Arc::new(SimpleCaseCollation));
        reg.insert(Arc::new(SimpleAccentCollation));
        reg.insert(Arc::new(SimpleCaseAccentCollation));
        reg
    }
}

impl CollationRegistry {
    pub fn new() -> Self {
        Self::default()
    }
    pub fn get(&self, uri: &str) -> Option<Arc<dyn Collation>> {
        self.by_uri.get(uri).cloned()
    }
    pub fn insert(&mut self, collation: Arc<dyn Collation>) {
        self.by_uri.insert(collation.uri().to_string(), collation);
    }
    pub fn uris(&self) -> impl Iterator<Item = &str> {
        self.by_uri.keys().map(String::as_str)
    }
}

static DEFAULT_COLLATIONS: LazyLock<Arc<CollationRegistry>> = LazyLock::new(|| {
    tracing::debug!("building default collation registry");
    Arc::new(CollationRegistry::default())
});

/// Process-wide built-in registry, shared read-only between contexts.
pub fn default_collation_registry() -> Arc<CollationRegistry> {
    Arc::clone(&DEFAULT_COLLATIONS)
}
