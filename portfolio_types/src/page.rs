use std::{cmp::Ordering, fmt::Display, num::NonZeroUsize, str::FromStr};

use base64::{Engine as _, engine::general_purpose::URL_SAFE_NO_PAD};
use portfolio_time::Time;
use serde::{Deserialize, Serialize};

use crate::{CatalogEntry, EntryId, ValidationError};

/// Ordering used for pagination: newest `created_at` first, ties broken by id descending
pub fn newest_first(a: &CatalogEntry, b: &CatalogEntry) -> Ordering {
    b.created_at
        .cmp(&a.created_at)
        .then_with(|| b.id.cmp(&a.id))
}

/// Opaque token to resume pagination after the last entry of a page
///
/// Holds the sort key of that entry rather than its position, so it stays meaningful if the
/// entry is deleted between page loads. Renders as a URL-safe token for callers that need to
/// carry it around as text.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Cursor {
    created_at: Time,
    id: EntryId,
}

impl Cursor {
    /// Cursor pointing just past `entry`
    pub fn after(entry: &CatalogEntry) -> Self {
        Self {
            created_at: entry.created_at,
            id: entry.id.clone(),
        }
    }

    pub fn created_at(&self) -> Time {
        self.created_at
    }

    pub fn id(&self) -> &EntryId {
        &self.id
    }

    /// `true` if `entry` sorts strictly after the cursor position in [`newest_first`] order
    pub fn precedes(&self, entry: &CatalogEntry) -> bool {
        (entry.created_at, &entry.id) < (self.created_at, &self.id)
    }
}

impl Display for Cursor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let raw = format!("{}\n{}", self.created_at.to_rfc3339(), self.id);
        f.write_str(&URL_SAFE_NO_PAD.encode(raw))
    }
}

impl FromStr for Cursor {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = |reason: String| ValidationError::InvalidCursor { reason };
        let raw = URL_SAFE_NO_PAD
            .decode(s.trim())
            .map_err(|e| invalid(e.to_string()))?;
        let raw = String::from_utf8(raw).map_err(|e| invalid(e.to_string()))?;
        let (created_at, id) = raw
            .split_once('\n')
            .ok_or_else(|| invalid("missing separator".into()))?;
        if id.is_empty() {
            return Err(invalid("empty entry id".into()));
        }
        Ok(Self {
            created_at: Time::parse_rfc3339(created_at).map_err(|e| invalid(e.to_string()))?,
            id: EntryId::new(id),
        })
    }
}

impl Serialize for Cursor {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Cursor {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

/// One page of a paginated listing
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Page {
    pub entries: Vec<CatalogEntry>,
    /// Resume point after the last entry, `None` when the page is empty
    pub cursor: Option<Cursor>,
    /// Set when the page came back full; more entries _may_ follow
    ///
    /// A collection whose size is an exact multiple of the page size reports one extra,
    /// empty, page.
    pub has_more: bool,
}

impl Page {
    pub fn from_entries(entries: Vec<CatalogEntry>, page_size: NonZeroUsize) -> Self {
        Self {
            cursor: entries.last().map(Cursor::after),
            has_more: entries.len() == page_size.get(),
            entries,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Category, EntryDocument, EntryDraft};

    fn entry(id: &str, millis: i64) -> CatalogEntry {
        CatalogEntry::from_document(
            id.into(),
            EntryDocument::new(
                EntryDraft::new(id, Category::Java),
                Time::from_timestamp_millis(millis).unwrap(),
            ),
        )
    }

    #[test]
    fn newest_first_breaks_ties_on_id() {
        let mut entries = vec![entry("a", 10), entry("c", 30), entry("b", 30), entry("d", 20)];
        entries.sort_by(newest_first);
        let ids: Vec<_> = entries.iter().map(|e| e.id.as_str()).collect();
        assert_eq!(ids, ["c", "b", "d", "a"]);
    }

    #[test]
    fn cursor_token_round_trip() {
        let mut e = entry("doc/with spaces", 0);
        e.created_at = Time::parse_rfc3339("2024-05-06T07:08:09.123456789Z").unwrap();
        let cursor = Cursor::after(&e);
        let token = cursor.to_string();
        assert!(!token.contains('\n'));
        assert_eq!(token.parse::<Cursor>().unwrap(), cursor);
    }

    #[test]
    fn cursor_rejects_garbage() {
        assert!(matches!(
            "%%%".parse::<Cursor>(),
            Err(ValidationError::InvalidCursor { .. })
        ));
        let no_sep = URL_SAFE_NO_PAD.encode("2024-01-01T00:00:00Z");
        assert!(no_sep.parse::<Cursor>().is_err());
    }

    #[test]
    fn cursor_precedes_older_entries_only() {
        let cursor = Cursor::after(&entry("m", 50));
        assert!(cursor.precedes(&entry("z", 40)));
        assert!(cursor.precedes(&entry("a", 50)));
        assert!(!cursor.precedes(&entry("m", 50)));
        assert!(!cursor.precedes(&entry("z", 50)));
        assert!(!cursor.precedes(&entry("a", 60)));
    }

    #[test]
    fn page_has_more_only_when_full() {
        let size = NonZeroUsize::new(2).unwrap();
        let full = Page::from_entries(vec![entry("b", 2), entry("a", 1)], size);
        assert!(full.has_more);
        assert_eq!(full.cursor.as_ref().map(|c| c.id().as_str()), Some("a"));

        let short = Page::from_entries(vec![entry("a", 1)], size);
        assert!(!short.has_more);

        let empty = Page::from_entries(vec![], size);
        assert!(!empty.has_more);
        assert!(empty.cursor.is_none());
    }
}
