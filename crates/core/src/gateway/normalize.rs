//! Backend response normalization.
//!
//! The backend has shipped two record contracts over time, and the client
//! keeps both:
//!
//! ```text
//! { "path": "cam1" }                      -> {base}/stream/cam1/index.m3u8
//! { "uri": "/stream/cam1/index.m3u8" }    -> {base}/stream/cam1/index.m3u8
//! { "uri": "http://cdn/x/index.m3u8" }    -> http://cdn/x/index.m3u8
//! ```
//!
//! `/start` answers may additionally be wrapped in a `{ "data": ... }`
//! envelope or be a bare JSON string holding the URL. Shape detection looks
//! only at the JSON value's type and keys; see [`detect_shape`].

use serde::Deserialize;
use serde_json::Value;
use url::Url;

use crate::error::{CatalogError, Result};
use crate::model::StreamEntry;

/// Path prefix under which the backend serves HLS output.
pub const STREAM_PREFIX: &str = "/stream";

/// Playlist file name inside a stream directory.
pub const PLAYLIST_NAME: &str = "index.m3u8";

/// Structural shape of one backend record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    /// `{ "data": { ... } }` wrapper around another record.
    Envelope,
    /// Record with a `path` slug. Wins over `uri` when both are present.
    Path,
    /// Record with a `uri`, relative or absolute.
    Uri,
    /// Bare JSON string holding a URL.
    BareUrl,
    /// Anything else.
    Unknown,
}

/// Classify a backend record by its keys.
pub fn detect_shape(value: &Value) -> Shape {
    match value {
        Value::String(_) => Shape::BareUrl,
        Value::Object(map) => {
            if map.contains_key("path") {
                Shape::Path
            } else if map.contains_key("uri") {
                Shape::Uri
            } else if map.get("data").is_some_and(|d| d.is_object() || d.is_string()) {
                Shape::Envelope
            } else {
                Shape::Unknown
            }
        }
        _ => Shape::Unknown,
    }
}

/// Optional fields of the backend's stream summary record.
#[derive(Debug, Default, Deserialize)]
struct RecordMeta {
    #[serde(default)]
    alias: Option<String>,
    #[serde(default)]
    running: Option<bool>,
}

/// Normalize a single record into a [`StreamEntry`].
pub fn entry_from_value(base: &str, value: &Value) -> Result<StreamEntry> {
    match detect_shape(value) {
        Shape::Envelope => match value.get("data") {
            Some(inner) if detect_shape(inner) != Shape::Envelope => entry_from_value(base, inner),
            _ => Err(CatalogError::format("nested `data` envelopes are not supported")),
        },
        Shape::Path => {
            let path = string_field(value, "path")?;
            entry_from_path(base, path).map(|entry| with_meta(entry, value))
        }
        Shape::Uri => {
            let uri = string_field(value, "uri")?;
            entry_from_uri(base, uri).map(|entry| with_meta(entry, value))
        }
        Shape::BareUrl => match value.as_str() {
            Some(uri) => entry_from_uri(base, uri),
            None => Err(CatalogError::format("expected a string")),
        },
        Shape::Unknown => Err(CatalogError::format(format!(
            "expected `path` or `uri`, got {value}"
        ))),
    }
}

/// Normalize a `/list` body: a JSON array of records.
///
/// `null` is treated as an empty listing. A single bad record fails the
/// whole listing so the catalog is never half-replaced.
pub fn entries_from_listing(base: &str, value: &Value) -> Result<Vec<StreamEntry>> {
    let records = match value {
        Value::Array(records) => records,
        Value::Null => return Ok(Vec::new()),
        other => {
            return Err(CatalogError::format(format!(
                "expected an array of streams, got {}",
                json_type(other)
            )));
        }
    };

    records
        .iter()
        .enumerate()
        .map(|(i, record)| {
            entry_from_value(base, record).map_err(|e| match e {
                CatalogError::Format(msg) => CatalogError::format(format!("stream #{i}: {msg}")),
                other => other,
            })
        })
        .collect()
}

/// `{ path }` branch: `{base}/stream/{path}/index.m3u8`.
pub fn entry_from_path(base: &str, path: &str) -> Result<StreamEntry> {
    let slug = path.trim().trim_matches('/');
    if slug.is_empty() {
        return Err(CatalogError::format("empty `path`"));
    }
    Ok(StreamEntry::new(slug, playlist_url(base, slug)))
}

/// `{ uri }` branch: `{base}{uri}` when relative, unchanged when absolute.
pub fn entry_from_uri(base: &str, uri: &str) -> Result<StreamEntry> {
    let playback_url = resolve_url(base, uri)?;
    let path = match Url::parse(&playback_url) {
        Ok(url) => url.path().to_string(),
        Err(e) => return Err(CatalogError::format(format!("{playback_url}: {e}"))),
    };
    let id = slug_from_path(&path);
    if id.is_empty() {
        return Err(CatalogError::format(format!("no stream id in `{uri}`")));
    }
    Ok(StreamEntry::new(id, playback_url))
}

/// Playlist URL for a stream slug.
pub fn playlist_url(base: &str, slug: &str) -> String {
    format!("{base}{STREAM_PREFIX}/{slug}/{PLAYLIST_NAME}")
}

/// Make `reference` absolute against `base`.
///
/// Absolute references must be `http`/`https` with a host and are passed
/// through as-is. Scheme-relative ones (`//host/...`) take the base's
/// scheme. Relative ones are appended to the base, with a `/` inserted if
/// missing.
pub fn resolve_url(base: &str, reference: &str) -> Result<String> {
    let reference = reference.trim();
    if reference.is_empty() {
        return Err(CatalogError::format("empty stream reference"));
    }

    if reference.starts_with("//") {
        let joined = Url::parse(base)
            .and_then(|base| base.join(reference))
            .map_err(|e| CatalogError::format(format!("`{reference}`: {e}")))?;
        check_playable(&joined, reference)?;
        return Ok(joined.to_string());
    }

    match Url::parse(reference) {
        Ok(url) => {
            check_playable(&url, reference)?;
            Ok(reference.to_string())
        }
        Err(url::ParseError::RelativeUrlWithoutBase) => {
            let base = base.trim_end_matches('/');
            if reference.starts_with('/') {
                Ok(format!("{base}{reference}"))
            } else {
                Ok(format!("{base}/{reference}"))
            }
        }
        Err(e) => Err(CatalogError::format(format!("`{reference}`: {e}"))),
    }
}

/// Only `http`/`https` URLs with a host are playable.
fn check_playable(url: &Url, reference: &str) -> Result<()> {
    if !matches!(url.scheme(), "http" | "https") {
        return Err(CatalogError::format(format!(
            "`{reference}` is not an http(s) URL"
        )));
    }
    if !url.has_host() {
        return Err(CatalogError::format(format!(
            "`{reference}` is not a network URL"
        )));
    }
    Ok(())
}

/// Extract the stream slug from a playlist path.
///
/// `/stream/cam1/index.m3u8` → `cam1`
/// `/stream/cam1`            → `cam1`
/// `/live/cam1.m3u8`         → `live/cam1.m3u8`
pub fn slug_from_path(path: &str) -> String {
    let path = path.split(['?', '#']).next().unwrap_or_default();
    let trimmed = path.trim_start_matches('/');

    if let Some(rest) = trimmed.strip_prefix("stream/") {
        let slug = match rest.find('/') {
            Some(slash) => &rest[..slash],
            None => rest,
        };
        if !slug.is_empty() {
            return slug.to_string();
        }
    }

    trimmed.trim_end_matches('/').to_string()
}

fn string_field<'a>(value: &'a Value, key: &str) -> Result<&'a str> {
    value
        .get(key)
        .and_then(Value::as_str)
        .ok_or_else(|| CatalogError::format(format!("`{key}` must be a string")))
}

fn with_meta(mut entry: StreamEntry, value: &Value) -> StreamEntry {
    let meta = RecordMeta::deserialize(value).unwrap_or_default();
    entry.alias = meta.alias.filter(|a| !a.trim().is_empty());
    entry.running = meta.running;
    entry
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn path_record_builds_playlist_url() {
        let entry = entry_from_value("http://h:8080", &json!({"path": "cam1"})).unwrap();
        assert_eq!(entry.id, "cam1");
        assert_eq!(entry.playback_url, "http://h:8080/stream/cam1/index.m3u8");
    }

    #[test]
    fn relative_uri_is_joined_to_base() {
        let entry =
            entry_from_value("http://h", &json!({"uri": "/stream/a/index.m3u8"})).unwrap();
        assert_eq!(entry.id, "a");
        assert_eq!(entry.playback_url, "http://h/stream/a/index.m3u8");
    }

    #[test]
    fn absolute_uri_passes_through() {
        let entry = entry_from_value(
            "http://h",
            &json!({"uri": "https://cdn.example.com/stream/b/index.m3u8"}),
        )
        .unwrap();
        assert_eq!(entry.id, "b");
        assert_eq!(
            entry.playback_url,
            "https://cdn.example.com/stream/b/index.m3u8"
        );
    }

    #[test]
    fn summary_record_keeps_alias_and_running() {
        let record = json!({
            "running": true,
            "uri": "/stream/garage/index.m3u8",
            "id": "9a1c2f",
            "alias": "garage"
        });
        let entry = entry_from_value("http://h", &record).unwrap();
        assert_eq!(entry.id, "garage");
        assert_eq!(entry.alias.as_deref(), Some("garage"));
        assert_eq!(entry.running, Some(true));
    }

    #[test]
    fn empty_alias_is_dropped() {
        let record = json!({"uri": "/stream/x/index.m3u8", "alias": ""});
        let entry = entry_from_value("http://h", &record).unwrap();
        assert_eq!(entry.alias, None);
    }

    #[test]
    fn data_envelope_is_unwrapped() {
        let body = json!({"data": {"uri": "/stream/b/index.m3u8"}});
        assert_eq!(detect_shape(&body), Shape::Envelope);
        let entry = entry_from_value("http://h", &body).unwrap();
        assert_eq!(entry.playback_url, "http://h/stream/b/index.m3u8");
    }

    #[test]
    fn bare_string_is_a_url() {
        let entry = entry_from_value("http://h", &json!("http://other/stream/z/index.m3u8"))
            .unwrap();
        assert_eq!(entry.id, "z");
        assert_eq!(entry.playback_url, "http://other/stream/z/index.m3u8");
    }

    #[test]
    fn path_wins_when_both_keys_present() {
        let record = json!({"path": "old", "uri": "/stream/new/index.m3u8"});
        assert_eq!(detect_shape(&record), Shape::Path);
        assert_eq!(entry_from_value("http://h", &record).unwrap().id, "old");
    }

    #[test]
    fn unknown_shapes_are_format_errors() {
        for value in [json!({"url": "x"}), json!(42), json!(null), json!({"data": 1})] {
            let err = entry_from_value("http://h", &value).unwrap_err();
            assert!(matches!(err, CatalogError::Format(_)), "{value}: {err}");
        }
    }

    #[test]
    fn non_string_uri_is_a_format_error() {
        let err = entry_from_value("http://h", &json!({"uri": 7})).unwrap_err();
        assert!(matches!(err, CatalogError::Format(_)));
    }

    #[test]
    fn listing_preserves_order() {
        let body = json!([{"path": "a"}, {"uri": "/stream/b/index.m3u8"}, {"path": "c"}]);
        let ids: Vec<_> = entries_from_listing("http://h", &body)
            .unwrap()
            .into_iter()
            .map(|e| e.id)
            .collect();
        assert_eq!(ids, ["a", "b", "c"]);
    }

    #[test]
    fn listing_error_names_the_bad_record() {
        let body = json!([{"path": "a"}, {"nope": true}]);
        let err = entries_from_listing("http://h", &body).unwrap_err();
        assert!(err.to_string().contains("stream #1"), "{err}");
    }

    #[test]
    fn listing_must_be_an_array() {
        let err = entries_from_listing("http://h", &json!({"path": "a"})).unwrap_err();
        assert!(matches!(err, CatalogError::Format(_)));
        assert!(entries_from_listing("http://h", &Value::Null).unwrap().is_empty());
    }

    #[test]
    fn resolve_inserts_missing_slash() {
        assert_eq!(
            resolve_url("http://h/", "stream/a/index.m3u8").unwrap(),
            "http://h/stream/a/index.m3u8"
        );
    }

    #[test]
    fn resolve_rejects_hostless_absolute() {
        assert!(resolve_url("http://h", "mailto:someone@example.com").is_err());
        assert!(resolve_url("http://h", "   ").is_err());
    }

    #[test]
    fn resolve_takes_scheme_from_base_for_scheme_relative() {
        assert_eq!(
            resolve_url("http://h", "//cdn.example.com/stream/a/index.m3u8").unwrap(),
            "http://cdn.example.com/stream/a/index.m3u8"
        );
        let entry = entry_from_uri("https://h", "//cdn.example.com/stream/a/index.m3u8").unwrap();
        assert_eq!(entry.id, "a");
        assert_eq!(entry.playback_url, "https://cdn.example.com/stream/a/index.m3u8");
    }

    #[test]
    fn resolve_rejects_non_http_schemes() {
        for reference in ["rtsp://cam/stream/a", "ftp://h/stream/a/index.m3u8", "file:///tmp/x.m3u8"] {
            let err = resolve_url("http://h", reference).unwrap_err();
            assert!(matches!(err, CatalogError::Format(_)), "{reference}: {err}");
        }
        let err = entry_from_value("http://h", &json!({"uri": "rtsp://cam/stream/a"})).unwrap_err();
        assert!(matches!(err, CatalogError::Format(_)));
    }

    #[test]
    fn slug_extraction() {
        assert_eq!(slug_from_path("/stream/cam1/index.m3u8"), "cam1");
        assert_eq!(slug_from_path("/stream/cam1"), "cam1");
        assert_eq!(slug_from_path("/stream/cam1/index.m3u8?token=1"), "cam1");
        assert_eq!(slug_from_path("/live/cam1.m3u8"), "live/cam1.m3u8");
        assert_eq!(slug_from_path("/"), "");
    }
}
