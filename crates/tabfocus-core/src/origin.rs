//! Origin normalization and the saved-origin record.
//!
//! An origin is the scheme+host+port tuple of a URL -- the unit of "allowed
//! site". All allowed-set comparisons happen on origins, never full URLs.

use std::fmt;

use chrono::{DateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use url::Url;

/// Scheme + host + port tuple identifying a web resource's security boundary.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Origin(String);

impl Origin {
    /// Normalize a URL string down to its origin component.
    ///
    /// Unparsable input, and URLs with an opaque origin (`data:`, `file:` on
    /// some platforms), are kept verbatim and treated as their own origin.
    /// Normalization never fails.
    pub fn normalize(raw: &str) -> Self {
        match Url::parse(raw.trim()) {
            Ok(parsed) => match parsed.origin() {
                url::Origin::Tuple(..) => Origin(parsed.origin().ascii_serialization()),
                url::Origin::Opaque(_) => Origin(raw.trim().to_string()),
            },
            Err(_) => Origin(raw.trim().to_string()),
        }
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A user-saved origin with its justification note.
///
/// At most one entry exists per origin (set semantics). Entries are owned by
/// the persistent store; the core only reads them.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavedOrigin {
    pub origin: Origin,
    /// User-supplied justification. May be empty; an empty reason keeps the
    /// origin out of `find_eligible_for_start`.
    #[serde(default)]
    pub reason: String,
    #[serde(with = "chrono::serde::ts_milliseconds")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "updated", with = "chrono::serde::ts_milliseconds")]
    pub updated_at: DateTime<Utc>,
}

impl SavedOrigin {
    /// Build an entry from a full URL, normalizing to origin form.
    pub fn new(url: &str, reason: &str) -> Self {
        let now = Utc::now();
        Self {
            origin: Origin::normalize(url),
            reason: reason.trim().to_string(),
            timestamp: now,
            updated_at: now,
        }
    }

    /// Whether this entry unlocks enforcement. Saving without a reason is
    /// allowed but does not make the origin eligible to start a session.
    pub fn has_reason(&self) -> bool {
        !self.reason.trim().is_empty()
    }
}

/// Wire form of a stored entry. Legacy entries carry a full `url` instead of
/// a pre-normalized `origin`; the origin is derived at read time.
#[derive(Debug, Deserialize)]
pub(crate) struct RawSavedOrigin {
    #[serde(default)]
    origin: Option<String>,
    #[serde(default)]
    url: Option<String>,
    #[serde(default)]
    reason: String,
    #[serde(default)]
    timestamp: Option<i64>,
    #[serde(default)]
    updated: Option<i64>,
}

impl RawSavedOrigin {
    /// Best-effort migration into the current shape. Returns `None` only
    /// when the entry carries neither an origin nor a URL.
    pub(crate) fn into_saved(self) -> Option<SavedOrigin> {
        let key = self.origin.or(self.url)?;
        let now = Utc::now();
        let to_instant = |ms: Option<i64>| {
            ms.and_then(|v| Utc.timestamp_millis_opt(v).single())
                .unwrap_or(now)
        };
        Some(SavedOrigin {
            origin: Origin::normalize(&key),
            reason: self.reason,
            timestamp: to_instant(self.timestamp),
            updated_at: to_instant(self.updated),
        })
    }

    /// True when the entry predates origin-keyed storage.
    pub(crate) fn is_legacy(&self) -> bool {
        self.origin.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn normalize_strips_path_and_query() {
        let origin = Origin::normalize("https://example.com/some/path?q=1#frag");
        assert_eq!(origin.as_str(), "https://example.com");
    }

    #[test]
    fn normalize_keeps_explicit_port() {
        let origin = Origin::normalize("http://localhost:8080/dev");
        assert_eq!(origin.as_str(), "http://localhost:8080");
    }

    #[test]
    fn normalize_drops_default_port() {
        let origin = Origin::normalize("https://example.com:443/");
        assert_eq!(origin.as_str(), "https://example.com");
    }

    #[test]
    fn unparsable_input_is_its_own_origin() {
        let origin = Origin::normalize("not a url at all");
        assert_eq!(origin.as_str(), "not a url at all");
    }

    #[test]
    fn opaque_origin_falls_back_to_raw() {
        let origin = Origin::normalize("data:text/plain,hello");
        assert_eq!(origin.as_str(), "data:text/plain,hello");
    }

    #[test]
    fn legacy_url_entry_migrates_to_origin() {
        let raw: RawSavedOrigin = serde_json::from_str(
            r#"{"url":"https://docs.example.com/page/1","reason":"research","timestamp":1700000000000}"#,
        )
        .unwrap();
        assert!(raw.is_legacy());
        let saved = raw.into_saved().unwrap();
        assert_eq!(saved.origin.as_str(), "https://docs.example.com");
        assert_eq!(saved.reason, "research");
        assert_eq!(saved.timestamp.timestamp_millis(), 1_700_000_000_000);
    }

    #[test]
    fn entry_without_origin_or_url_is_dropped() {
        let raw: RawSavedOrigin = serde_json::from_str(r#"{"reason":"orphan"}"#).unwrap();
        assert!(raw.into_saved().is_none());
    }

    #[test]
    fn empty_reason_is_not_enforce_eligible() {
        let saved = SavedOrigin::new("https://example.com", "   ");
        assert!(!saved.has_reason());
        assert!(SavedOrigin::new("https://example.com", "work").has_reason());
    }

    proptest! {
        // Normalization must be a fixpoint: feeding an origin back through
        // produces the same origin.
        #[test]
        fn normalize_is_idempotent(raw in "[ -~]{0,40}") {
            let once = Origin::normalize(&raw);
            let twice = Origin::normalize(once.as_str());
            prop_assert_eq!(once, twice);
        }
    }
}
