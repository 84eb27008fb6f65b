//! Request-to-chapter-key resolution.
//!
//! A [`PathResolver`] is any function from request head to chapter key. The handler calls it
//! once per request and does nothing else with the request, so swapping the resolver changes
//! routing without touching lookup or rendering.

use axum::extract::Query;
use axum::http::request::Parts;
use cyoa_core::DEFAULT_CHAPTER_KEY;
use percent_encoding::percent_decode_str;
use std::collections::HashMap;
use std::sync::Arc;

/// Maps an inbound request to a chapter key.
pub type PathResolver = Arc<dyn Fn(&Parts) -> String + Send + Sync>;

/// Derive a chapter key from a raw URI path.
///
/// The path is percent-decoded first; a path that does not decode to UTF-8 is used as sent.
/// Surrounding whitespace is then trimmed. An empty path or `/` maps to
/// [`DEFAULT_CHAPTER_KEY`]; anything else loses exactly one leading `/` and is returned
/// verbatim.
pub fn chapter_key_from_path(raw: &str) -> String {
    let decoded = percent_decode_str(raw).decode_utf8().unwrap_or_else(|e| {
        tracing::debug!("Path {:?} is not UTF-8 once decoded: {}", raw, e);
        raw.into()
    });
    let path = decoded.trim();
    if path.is_empty() || path == "/" {
        return DEFAULT_CHAPTER_KEY.to_string();
    }
    path.strip_prefix('/').unwrap_or(path).to_string()
}

/// The default resolver: the chapter key is the request path.
pub fn default_path_resolver() -> PathResolver {
    Arc::new(|parts: &Parts| chapter_key_from_path(parts.uri.path()))
}

/// A resolver that reads the chapter key from query parameter `name`, e.g. `/?chapter=denver`.
///
/// Requests without the parameter, or with an empty value, fall back to the path.
pub fn query_param_resolver(name: impl Into<String>) -> PathResolver {
    let name = name.into();
    Arc::new(move |parts: &Parts| {
        Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
            .ok()
            .and_then(|Query(mut params)| params.remove(&name))
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| chapter_key_from_path(parts.uri.path()))
    })
}
