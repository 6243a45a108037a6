//! Core data models: source identifiers, result records, and the backend
//! wire shapes for search pages and collections.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::str::FromStr;

/// One upstream content provider behind the aggregator.
///
/// Declaration order is the display order of result sections.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SourceId {
    Wikipedia,
    InternetArchive,
    MetMuseum,
    Rijksmuseum,
    HarvardArtMuseums,
    CooperHewitt,
    Other,
}

impl SourceId {
    pub const ALL: [SourceId; 7] = [
        SourceId::Wikipedia,
        SourceId::InternetArchive,
        SourceId::MetMuseum,
        SourceId::Rijksmuseum,
        SourceId::HarvardArtMuseums,
        SourceId::CooperHewitt,
        SourceId::Other,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            SourceId::Wikipedia => "wikipedia",
            SourceId::InternetArchive => "internet_archive",
            SourceId::MetMuseum => "met_museum",
            SourceId::Rijksmuseum => "rijksmuseum",
            SourceId::HarvardArtMuseums => "harvard_art_museums",
            SourceId::CooperHewitt => "cooper_hewitt",
            SourceId::Other => "other",
        }
    }

    /// Human-readable section heading.
    pub fn label(&self) -> &'static str {
        match self {
            SourceId::Wikipedia => "Wikipedia",
            SourceId::InternetArchive => "Internet Archive",
            SourceId::MetMuseum => "Met Museum",
            SourceId::Rijksmuseum => "Rijksmuseum",
            SourceId::HarvardArtMuseums => "Harvard Art Museums",
            SourceId::CooperHewitt => "Cooper Hewitt",
            SourceId::Other => "Other",
        }
    }

    /// Icon name used for the card badge.
    pub fn icon(&self) -> &'static str {
        match self {
            SourceId::Wikipedia => "book-open",
            SourceId::InternetArchive => "archive",
            SourceId::MetMuseum => "landmark",
            SourceId::Rijksmuseum => "palette",
            SourceId::HarvardArtMuseums => "university",
            SourceId::CooperHewitt => "pen-tool",
            SourceId::Other => "globe",
        }
    }

    /// Whether cards of this source carry a deferred image slot.
    pub fn has_images(&self) -> bool {
        !matches!(self, SourceId::Wikipedia | SourceId::Other)
    }

    /// Maps a backend result key onto a source.
    ///
    /// Accepts both the snake_case identifiers and the display names some
    /// backend revisions emit (`"Harvard Art Museums"`). Anything else,
    /// including generated-content providers, is [`SourceId::Other`].
    pub fn from_wire(key: &str) -> SourceId {
        let normalized: String = key
            .trim()
            .chars()
            .map(|c| match c {
                ' ' | '-' => '_',
                c => c.to_ascii_lowercase(),
            })
            .collect();

        match normalized.as_str() {
            "wikipedia" => SourceId::Wikipedia,
            "internet_archive" | "archive" => SourceId::InternetArchive,
            "met_museum" | "met" | "metmuseum" => SourceId::MetMuseum,
            "rijksmuseum" => SourceId::Rijksmuseum,
            "harvard_art_museums" | "harvard" => SourceId::HarvardArtMuseums,
            "cooper_hewitt" | "cooperhewitt" => SourceId::CooperHewitt,
            _ => SourceId::Other,
        }
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceId {
    type Err = String;

    /// Strict parse for user input: unknown names are an error rather
    /// than silently becoming `other`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let source = SourceId::from_wire(s);
        if source == SourceId::Other && !s.trim().eq_ignore_ascii_case("other") {
            let known: Vec<&str> = SourceId::ALL.iter().map(|s| s.as_str()).collect();
            return Err(format!(
                "unknown source '{}'. Known sources: {}",
                s,
                known.join(", ")
            ));
        }
        Ok(source)
    }
}

impl<'de> Deserialize<'de> for SourceId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let key = String::deserialize(deserializer)?;
        Ok(SourceId::from_wire(&key))
    }
}

/// A single record returned by one source.
///
/// The payload shape depends on the source; accessors project the common
/// fields and treat blanks as absent.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResultItem {
    pub source: SourceId,
    pub record: Map<String, Value>,
}

impl ResultItem {
    pub fn new(source: SourceId, record: Map<String, Value>) -> Self {
        Self { source, record }
    }

    /// Builds an item from an arbitrary JSON value; `None` unless it is an object.
    pub fn from_value(source: SourceId, value: Value) -> Option<Self> {
        match value {
            Value::Object(record) => Some(Self::new(source, record)),
            _ => None,
        }
    }

    /// Non-blank string at a JSON pointer (e.g. `/webImage/url`).
    pub fn str_at(&self, pointer: &str) -> Option<&str> {
        let mut current: Option<&Value> = None;
        for (i, segment) in pointer.trim_start_matches('/').split('/').enumerate() {
            current = if i == 0 {
                self.record.get(segment)
            } else {
                match current? {
                    Value::Object(map) => map.get(segment),
                    Value::Array(items) => segment.parse::<usize>().ok().and_then(|n| items.get(n)),
                    _ => None,
                }
            };
        }
        current
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    /// Field rendered as text: strings as-is, numbers formatted, arrays of
    /// strings joined with `"; "`.
    pub fn text(&self, key: &str) -> Option<String> {
        let text = match self.record.get(key)? {
            Value::String(s) => s.trim().to_string(),
            Value::Number(n) => n.to_string(),
            Value::Array(items) => items
                .iter()
                .filter_map(Value::as_str)
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .collect::<Vec<_>>()
                .join("; "),
            _ => return None,
        };
        if text.is_empty() {
            None
        } else {
            Some(text)
        }
    }

    /// Identifier field as a string (sources use both numeric and string ids).
    pub fn id(&self, key: &str) -> Option<String> {
        match self.record.get(key)? {
            Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
            Value::Number(n) => Some(n.to_string()),
            _ => None,
        }
    }

    pub fn title(&self) -> String {
        self.text("title").unwrap_or_else(|| "Untitled".to_string())
    }

    pub fn raw(&self) -> Value {
        Value::Object(self.record.clone())
    }
}

/// Body of `GET /api/search`.
///
/// Older backends returned the per-source arrays at the top level instead
/// of under `results`; those are picked up from `legacy`.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    #[serde(default)]
    pub results: Option<Map<String, Value>>,
    #[serde(default)]
    pub current_page: Option<u32>,
    #[serde(default)]
    pub total_pages: Option<u32>,
    #[serde(default)]
    pub total_results: Option<u64>,
    #[serde(default)]
    pub errors: Vec<String>,
    #[serde(flatten)]
    pub legacy: Map<String, Value>,
}

/// Items of one source within one fetched page.
#[derive(Debug, Clone, PartialEq)]
pub struct SourceGroup {
    pub source: SourceId,
    pub items: Vec<ResultItem>,
}

/// A validated search page, grouped by source in display order.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchPage {
    pub groups: Vec<SourceGroup>,
    pub current_page: u32,
    pub total_pages: u32,
    pub total_results: u64,
    pub upstream_errors: Vec<String>,
}

impl SearchPage {
    /// Validates a response for the requested page.
    ///
    /// Returns a description of the problem when a source's results are not
    /// an array of objects. Keys mapping to the same source are concatenated
    /// in payload order; empty groups are dropped.
    pub fn from_response(response: SearchResponse, requested_page: u32) -> Result<Self, String> {
        let results = match response.results {
            Some(results) => results,
            None => response
                .legacy
                .into_iter()
                .filter(|(_, v)| v.is_array())
                .collect(),
        };

        let mut groups: Vec<SourceGroup> = Vec::new();
        for (key, value) in results {
            let source = SourceId::from_wire(&key);
            let Value::Array(entries) = value else {
                return Err(format!("results for '{}' is not an array", key));
            };
            let mut items = Vec::with_capacity(entries.len());
            for entry in entries {
                let item = ResultItem::from_value(source, entry)
                    .ok_or_else(|| format!("result in '{}' is not an object", key))?;
                items.push(item);
            }
            match groups.iter_mut().find(|g| g.source == source) {
                Some(group) => group.items.extend(items),
                None => groups.push(SourceGroup { source, items }),
            }
        }
        groups.retain(|g| !g.items.is_empty());
        groups.sort_by_key(|g| g.source);

        let item_count: usize = groups.iter().map(|g| g.items.len()).sum();
        let current_page = response.current_page.unwrap_or(requested_page).max(1);
        let total_pages = response.total_pages.unwrap_or(current_page).max(current_page);
        let total_results = response.total_results.unwrap_or(item_count as u64);

        Ok(Self {
            groups,
            current_page,
            total_pages,
            total_results,
            upstream_errors: response.errors,
        })
    }

    pub fn item_count(&self) -> usize {
        self.groups.iter().map(|g| g.items.len()).sum()
    }
}

/// A user collection as listed by `GET /api/collections`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collection {
    #[serde(deserialize_with = "id_as_string")]
    pub id: String,
    pub title: String,
}

/// Body of `POST /add_to_collection/<id>`.
#[derive(Debug, Clone, Serialize)]
pub struct AddToCollectionRequest {
    pub source: SourceId,
    pub content: Value,
}

#[derive(Debug, Clone, Deserialize)]
pub struct MessageResponse {
    pub message: String,
}

fn id_as_string<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum IdRepr {
        Int(i64),
        Str(String),
    }

    Ok(match IdRepr::deserialize(deserializer)? {
        IdRepr::Int(n) => n.to_string(),
        IdRepr::Str(s) => s,
    })
}
