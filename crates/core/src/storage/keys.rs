//! Storage key generation and public URL construction.
//!
//! Key format: `{namespace}/{uuid-v4}-{sanitized filename}`.

use once_cell::sync::Lazy;
use regex_lite::Regex;
use uuid::Uuid;

static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").expect("valid regex"));
static UNSAFE_CHARS: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[^A-Za-z0-9._~-]").expect("valid regex"));

/// Make a filename safe to embed in a URL path segment.
///
/// Letters are transliterated to ASCII first (`é` -> `e`, `видео` ->
/// `video`), then whitespace runs become a single `-` and anything outside
/// `[A-Za-z0-9._~-]` is dropped. An empty stem becomes `file`, keeping the
/// extension.
pub fn sanitize_filename(name: &str) -> String {
    let ascii = deunicode::deunicode(name);
    let dashed = WHITESPACE.replace_all(ascii.trim(), "-");
    let cleaned = UNSAFE_CHARS.replace_all(&dashed, "");
    let cleaned = cleaned.trim_matches('-');

    let (stem, extension) = match cleaned.rfind('.') {
        Some(dot) if dot + 1 < cleaned.len() => cleaned.split_at(dot),
        _ => (cleaned, ""),
    };
    let stem = stem.trim_matches(|c| c == '-' || c == '.');

    if stem.is_empty() {
        format!("file{}", extension)
    } else {
        format!("{}{}", stem, extension)
    }
}

/// Generate a fresh storage key for an upload.
///
/// Every call draws a new v4 token, so identical inputs never collide.
pub fn generate_storage_key(namespace: &str, filename: &str) -> String {
    format!(
        "{}/{}-{}",
        namespace,
        Uuid::new_v4(),
        sanitize_filename(filename)
    )
}

/// Build the public (unsigned) URL of an object.
///
/// Path-style: `{endpoint}/{bucket}/{key}`.
/// Virtual-hosted: `{scheme}://{bucket}.{host}/{key}`.
pub fn public_object_url(endpoint: &str, bucket: &str, key: &str, path_style: bool) -> String {
    let endpoint = endpoint.trim_end_matches('/');
    let encoded_key = key
        .split('/')
        .map(|segment| urlencoding::encode(segment).into_owned())
        .collect::<Vec<_>>()
        .join("/");

    if path_style {
        return format!("{}/{}/{}", endpoint, bucket, encoded_key);
    }

    match endpoint.split_once("://") {
        Some((scheme, host)) => format!("{}://{}.{}/{}", scheme, bucket, host, encoded_key),
        None => format!("https://{}.{}/{}", bucket, endpoint, encoded_key),
    }
}
