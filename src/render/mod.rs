//! Per-source card and detail rendering.
//!
//! Every source gets one [`SourceRenderer`] implementation (see
//! [`sources`]); [`renderer_for`] picks it by [`SourceId`]. Renderers
//! project a heterogeneous [`ResultItem`] into the uniform [`CardView`] /
//! [`DetailView`] skeletons, which the [`html`] and [`text`] modules turn
//! into markup or terminal output.
//!
//! Missing optional fields never disappear from a skeleton: they render as
//! a literal fallback (`"N/A"`, `"Unknown"`, `"No description available"`).

pub mod html;
pub mod sources;
pub mod text;

use reqwest::Url;
use scraper::Html;
use serde::Serialize;

use crate::models::{ResultItem, SourceId};

pub const NOT_AVAILABLE: &str = "N/A";
pub const UNKNOWN: &str = "Unknown";
pub const NO_DESCRIPTION: &str = "No description available";
pub const ELLIPSIS: &str = "...";

/// Source badge shown on every card.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Badge {
    pub label: &'static str,
    pub icon: &'static str,
}

impl From<SourceId> for Badge {
    fn from(source: SourceId) -> Self {
        Self {
            label: source.label(),
            icon: source.icon(),
        }
    }
}

/// An image whose real URL is only assigned once it enters the viewport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeferredImage {
    pub data_src: String,
    pub alt: String,
}

/// Summary rendering of one item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CardView {
    pub source: SourceId,
    pub badge: Badge,
    pub title: String,
    pub synopsis: String,
    /// `None` for text sources and for museum items without an image.
    pub image: Option<DeferredImage>,
    pub link: Option<String>,
    pub item_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DetailField {
    pub label: &'static str,
    pub value: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Link {
    pub label: String,
    pub url: String,
}

/// Expanded single-item rendering for the overlay.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailView {
    pub source: SourceId,
    pub badge: Badge,
    pub title: String,
    pub image: Option<String>,
    pub fields: Vec<DetailField>,
    pub link: Option<Link>,
}

/// Source-specific projection of a [`ResultItem`].
///
/// Implementors supply the field hooks; [`render_card`](Self::render_card)
/// and [`render_detail`](Self::render_detail) assemble the skeletons.
pub trait SourceRenderer: Send + Sync {
    fn source(&self) -> SourceId;

    /// Identifier used for canonical links and detail lookups.
    fn item_id(&self, item: &ResultItem) -> Option<String>;

    /// Untruncated card text.
    fn synopsis(&self, item: &ResultItem) -> String;

    /// Thumbnail for the card.
    fn image_url(&self, _item: &ResultItem) -> Option<String> {
        None
    }

    /// Full-size image for the detail view.
    fn detail_image_url(&self, item: &ResultItem) -> Option<String> {
        self.image_url(item)
    }

    fn canonical_url(&self, item: &ResultItem) -> Option<String>;

    fn link_label(&self) -> String {
        format!("View on {}", self.source().label())
    }

    fn detail_fields(&self, item: &ResultItem) -> Vec<DetailField>;

    fn render_card(&self, item: &ResultItem, synopsis_cutoff: usize) -> CardView {
        let title = item.title();
        CardView {
            source: self.source(),
            badge: self.source().into(),
            synopsis: truncate(&self.synopsis(item), synopsis_cutoff),
            image: self.image_url(item).map(|url| DeferredImage {
                data_src: url,
                alt: title.clone(),
            }),
            link: self.canonical_url(item),
            item_id: self.item_id(item),
            title,
        }
    }

    fn render_detail(&self, item: &ResultItem) -> DetailView {
        DetailView {
            source: self.source(),
            badge: self.source().into(),
            title: item.title(),
            image: self.detail_image_url(item),
            fields: self.detail_fields(item),
            link: self.canonical_url(item).map(|url| Link {
                label: self.link_label(),
                url,
            }),
        }
    }
}

/// The renderer for a source.
pub fn renderer_for(source: SourceId) -> &'static dyn SourceRenderer {
    match source {
        SourceId::Wikipedia => &sources::Wikipedia,
        SourceId::InternetArchive => &sources::InternetArchive,
        SourceId::MetMuseum => &sources::MetMuseum,
        SourceId::Rijksmuseum => &sources::Rijksmuseum,
        SourceId::HarvardArtMuseums => &sources::HarvardArtMuseums,
        SourceId::CooperHewitt => &sources::CooperHewitt,
        SourceId::Other => &sources::Generic,
    }
}

pub fn render_card(item: &ResultItem, synopsis_cutoff: usize) -> CardView {
    renderer_for(item.source).render_card(item, synopsis_cutoff)
}

pub fn render_detail(item: &ResultItem) -> DetailView {
    renderer_for(item.source).render_detail(item)
}

/// Cut `text` to `max_chars` characters, appending [`ELLIPSIS`] when
/// anything was removed.
pub fn truncate(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((cut, _)) => format!("{}{}", &text[..cut], ELLIPSIS),
        None => text.to_string(),
    }
}

/// Visible text of an upstream HTML fragment, whitespace collapsed.
///
/// Search snippets arrive as HTML fragments (`<span class="searchmatch">`)
/// and descriptions carry arbitrary entities; both are decoded by the
/// parser, and a stray `<` that opens no tag stays literal text.
pub fn plain_text(fragment: &str) -> String {
    let parsed = Html::parse_fragment(fragment);
    let text: String = parsed.root_element().text().collect();
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// `raw` if it is an absolute `http`/`https` URL.
///
/// Payload URLs end up in `href` and image slots, where other schemes
/// (`javascript:`, `data:`) would execute or embed content.
pub fn web_url(raw: &str) -> Option<String> {
    let url = Url::parse(raw.trim()).ok()?;
    match url.scheme() {
        "http" | "https" => Some(url.into()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn truncate_long_text() {
        let text = "a".repeat(160);
        let out = truncate(&text, 150);
        assert_eq!(out, format!("{}...", "a".repeat(150)));
    }

    #[test]
    fn truncate_at_boundary_is_unchanged() {
        let text = "b".repeat(150);
        assert_eq!(truncate(&text, 150), text);
        assert_eq!(truncate("short", 150), "short");
        assert_eq!(truncate("", 10), "");
    }

    #[test]
    fn truncate_counts_characters_not_bytes() {
        let text = "Ménagerie à Versailles";
        assert_eq!(truncate(text, 8), "Ménageri...");
    }

    #[test]
    fn plain_text_strips_search_markup() {
        let snippet = r#"The <span class="searchmatch">cat</span> (Felis catus) is a &quot;domestic&quot;   species"#;
        assert_eq!(
            plain_text(snippet),
            "The cat (Felis catus) is a \"domestic\" species"
        );
    }

    #[test]
    fn plain_text_decodes_named_and_numeric_entities() {
        assert_eq!(
            plain_text("Caf&eacute; &rsquo;Nighthawks&rsquo; &#8212; oil"),
            "Café \u{2019}Nighthawks\u{2019} \u{2014} oil"
        );
        assert_eq!(plain_text("a&nbsp;&amp;&#x20AC;"), "a &\u{20AC}");
    }

    #[test]
    fn plain_text_keeps_bare_angle_brackets() {
        assert_eq!(
            plain_text("Scale: 1 < 2 inches, depth > 3"),
            "Scale: 1 < 2 inches, depth > 3"
        );
    }

    #[test]
    fn web_url_accepts_only_http() {
        assert_eq!(
            web_url("https://images.example/cat.jpg").as_deref(),
            Some("https://images.example/cat.jpg")
        );
        assert!(web_url("javascript:alert(1)").is_none());
        assert!(web_url("data:image/png;base64,AAAA").is_none());
        assert!(web_url("/relative/path.jpg").is_none());
    }

    #[test]
    fn card_skeleton_always_has_synopsis() {
        let item = ResultItem::from_value(SourceId::InternetArchive, json!({"identifier": "x"}))
            .unwrap();
        let card = render_card(&item, 100);
        assert_eq!(card.title, "Untitled");
        assert_eq!(card.synopsis, NO_DESCRIPTION);
        assert_eq!(card.badge.label, "Internet Archive");
    }

    #[test]
    fn card_synopsis_is_truncated() {
        let description = "x".repeat(300);
        let item = ResultItem::from_value(
            SourceId::InternetArchive,
            json!({"identifier": "x", "title": "T", "description": description}),
        )
        .unwrap();
        let card = render_card(&item, 100);
        assert_eq!(card.synopsis.chars().count(), 103);
        assert!(card.synopsis.ends_with(ELLIPSIS));
    }
}
