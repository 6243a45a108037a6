//! One [`SourceRenderer`] per source.
//!
//! Field names follow each upstream API's own payload (`pageid`,
//! `objectID`, `objectNumber`, ...), which the aggregator passes through
//! untouched.

use reqwest::Url;

use super::{plain_text, web_url, DetailField, SourceRenderer, NOT_AVAILABLE, NO_DESCRIPTION};
use crate::models::{ResultItem, SourceId};

/// `base` with `segments` appended as percent-encoded path segments.
fn canonical(base: &str, segments: &[&str]) -> Option<String> {
    let mut url = Url::parse(base).ok()?;
    url.path_segments_mut()
        .ok()?
        .pop_if_empty()
        .extend(segments);
    Some(url.into())
}

fn field(label: &'static str, value: Option<String>) -> DetailField {
    DetailField {
        label,
        value: value.unwrap_or_else(|| NOT_AVAILABLE.to_string()),
    }
}

fn by_artist(artist: Option<String>) -> String {
    match artist {
        Some(name) => format!("By {}", name),
        None => "Artist unknown".to_string(),
    }
}

pub struct Wikipedia;

impl SourceRenderer for Wikipedia {
    fn source(&self) -> SourceId {
        SourceId::Wikipedia
    }

    fn item_id(&self, item: &ResultItem) -> Option<String> {
        item.id("pageid")
    }

    fn synopsis(&self, item: &ResultItem) -> String {
        item.text("snippet")
            .map(|s| plain_text(&s))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| NO_DESCRIPTION.to_string())
    }

    fn canonical_url(&self, item: &ResultItem) -> Option<String> {
        let pageid = self.item_id(item)?;
        Url::parse_with_params("https://en.wikipedia.org/", &[("curid", pageid)])
            .ok()
            .map(Into::into)
    }

    fn detail_fields(&self, item: &ResultItem) -> Vec<DetailField> {
        vec![
            DetailField {
                label: "Snippet",
                value: self.synopsis(item),
            },
            field("Word count", item.text("wordcount")),
            field("Last edited", item.text("timestamp")),
        ]
    }
}

pub struct InternetArchive;

impl SourceRenderer for InternetArchive {
    fn source(&self) -> SourceId {
        SourceId::InternetArchive
    }

    fn item_id(&self, item: &ResultItem) -> Option<String> {
        item.id("identifier")
    }

    fn synopsis(&self, item: &ResultItem) -> String {
        item.text("description")
            .map(|s| plain_text(&s))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| NO_DESCRIPTION.to_string())
    }

    fn image_url(&self, item: &ResultItem) -> Option<String> {
        let id = self.item_id(item)?;
        canonical("https://archive.org/services/img/", &[id.as_str()])
    }

    fn canonical_url(&self, item: &ResultItem) -> Option<String> {
        let id = self.item_id(item)?;
        canonical("https://archive.org/details/", &[id.as_str()])
    }

    fn detail_fields(&self, item: &ResultItem) -> Vec<DetailField> {
        vec![
            field("Description", item.text("description").map(|s| plain_text(&s))),
            field("Creator", item.text("creator")),
            field("Date", item.text("date")),
            field("Media type", item.text("mediatype")),
        ]
    }
}

pub struct MetMuseum;

impl SourceRenderer for MetMuseum {
    fn source(&self) -> SourceId {
        SourceId::MetMuseum
    }

    fn item_id(&self, item: &ResultItem) -> Option<String> {
        item.id("objectID")
    }

    fn synopsis(&self, item: &ResultItem) -> String {
        by_artist(item.text("artistDisplayName"))
    }

    fn image_url(&self, item: &ResultItem) -> Option<String> {
        item.str_at("/primaryImageSmall")
            .or_else(|| item.str_at("/primaryImage"))
            .and_then(web_url)
    }

    fn detail_image_url(&self, item: &ResultItem) -> Option<String> {
        item.str_at("/primaryImage")
            .or_else(|| item.str_at("/primaryImageSmall"))
            .and_then(web_url)
    }

    fn canonical_url(&self, item: &ResultItem) -> Option<String> {
        let id = self.item_id(item)?;
        canonical("https://www.metmuseum.org/art/collection/search/", &[id.as_str()])
    }

    fn link_label(&self) -> String {
        "View on Met Museum Website".to_string()
    }

    fn detail_fields(&self, item: &ResultItem) -> Vec<DetailField> {
        vec![
            field("Artist", item.text("artistDisplayName")),
            field("Date", item.text("objectDate")),
            field("Medium", item.text("medium")),
            field("Dimensions", item.text("dimensions")),
            field("Department", item.text("department")),
        ]
    }
}

pub struct Rijksmuseum;

impl SourceRenderer for Rijksmuseum {
    fn source(&self) -> SourceId {
        SourceId::Rijksmuseum
    }

    fn item_id(&self, item: &ResultItem) -> Option<String> {
        item.id("objectNumber")
    }

    fn synopsis(&self, item: &ResultItem) -> String {
        item.text("longTitle")
            .unwrap_or_else(|| by_artist(item.text("principalOrFirstMaker")))
    }

    fn image_url(&self, item: &ResultItem) -> Option<String> {
        item.str_at("/webImage/url")
            .or_else(|| item.str_at("/headerImage/url"))
            .and_then(web_url)
    }

    fn canonical_url(&self, item: &ResultItem) -> Option<String> {
        let id = self.item_id(item)?;
        canonical("https://www.rijksmuseum.nl/en/collection/", &[id.as_str()])
    }

    fn detail_fields(&self, item: &ResultItem) -> Vec<DetailField> {
        vec![
            field("Artist", item.text("principalOrFirstMaker")),
            field("Full title", item.text("longTitle")),
            field("Object number", self.item_id(item)),
        ]
    }
}

pub struct HarvardArtMuseums;

impl SourceRenderer for HarvardArtMuseums {
    fn source(&self) -> SourceId {
        SourceId::HarvardArtMuseums
    }

    fn item_id(&self, item: &ResultItem) -> Option<String> {
        item.id("objectid").or_else(|| item.id("id"))
    }

    fn synopsis(&self, item: &ResultItem) -> String {
        item.text("description")
            .map(|s| plain_text(&s))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| by_artist(item.str_at("/people/0/name").map(str::to_string)))
    }

    fn image_url(&self, item: &ResultItem) -> Option<String> {
        item.str_at("/primaryimageurl").and_then(web_url)
    }

    fn canonical_url(&self, item: &ResultItem) -> Option<String> {
        let id = self.item_id(item)?;
        canonical("https://harvardartmuseums.org/collections/object/", &[id.as_str()])
    }

    fn detail_fields(&self, item: &ResultItem) -> Vec<DetailField> {
        vec![
            field("Artist", item.str_at("/people/0/name").map(str::to_string)),
            field("Date", item.text("dated")),
            field("Medium", item.text("medium")),
            field("Dimensions", item.text("dimensions")),
            field("Classification", item.text("classification")),
            field("Culture", item.text("culture")),
        ]
    }
}

pub struct CooperHewitt;

impl SourceRenderer for CooperHewitt {
    fn source(&self) -> SourceId {
        SourceId::CooperHewitt
    }

    fn item_id(&self, item: &ResultItem) -> Option<String> {
        item.id("id")
    }

    fn synopsis(&self, item: &ResultItem) -> String {
        item.text("description")
            .map(|s| plain_text(&s))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| NO_DESCRIPTION.to_string())
    }

    fn image_url(&self, item: &ResultItem) -> Option<String> {
        item.str_at("/images/0/n/url")
            .or_else(|| item.str_at("/images/0/b/url"))
            .and_then(web_url)
    }

    fn detail_image_url(&self, item: &ResultItem) -> Option<String> {
        item.str_at("/images/0/b/url")
            .or_else(|| item.str_at("/images/0/n/url"))
            .and_then(web_url)
    }

    fn canonical_url(&self, item: &ResultItem) -> Option<String> {
        let id = self.item_id(item)?;
        canonical("https://collection.cooperhewitt.org/objects/", &[id.as_str(), ""])
    }

    fn detail_fields(&self, item: &ResultItem) -> Vec<DetailField> {
        vec![
            field("Description", item.text("description").map(|s| plain_text(&s))),
            field("Date", item.text("date")),
            field("Medium", item.text("medium")),
            field("Type", item.text("type")),
            field("Dimensions", item.text("dimensions")),
        ]
    }
}

/// Catch-all for sources without a dedicated renderer, including generated
/// answers that carry only a title and a description.
pub struct Generic;

impl SourceRenderer for Generic {
    fn source(&self) -> SourceId {
        SourceId::Other
    }

    fn item_id(&self, item: &ResultItem) -> Option<String> {
        item.id("id")
    }

    fn synopsis(&self, item: &ResultItem) -> String {
        item.text("description")
            .or_else(|| item.text("snippet"))
            .map(|s| plain_text(&s))
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| NO_DESCRIPTION.to_string())
    }

    fn canonical_url(&self, item: &ResultItem) -> Option<String> {
        item.str_at("/url").and_then(web_url)
    }

    fn link_label(&self) -> String {
        "Open source".to_string()
    }

    fn detail_fields(&self, item: &ResultItem) -> Vec<DetailField> {
        vec![DetailField {
            label: "Description",
            value: self.synopsis(item),
        }]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::{render_card, render_detail};
    use serde_json::json;

    fn item(source: SourceId, value: serde_json::Value) -> ResultItem {
        ResultItem::from_value(source, value).unwrap()
    }

    #[test]
    fn wikipedia_link_from_pageid() {
        let card = render_card(
            &item(
                SourceId::Wikipedia,
                json!({"title": "Cat", "pageid": 6678, "snippet": "The <span>cat</span>"}),
            ),
            150,
        );
        assert_eq!(card.link.as_deref(), Some("https://en.wikipedia.org/?curid=6678"));
        assert_eq!(card.synopsis, "The cat");
        assert!(card.image.is_none());
    }

    #[test]
    fn archive_links_and_thumbnail_are_encoded() {
        let card = render_card(
            &item(
                SourceId::InternetArchive,
                json!({"title": "Cats", "identifier": "cats reel"}),
            ),
            150,
        );
        assert_eq!(
            card.link.as_deref(),
            Some("https://archive.org/details/cats%20reel")
        );
        assert_eq!(
            card.image.map(|i| i.data_src).as_deref(),
            Some("https://archive.org/services/img/cats%20reel")
        );
    }

    #[test]
    fn met_detail_falls_back_to_na() {
        let detail = render_detail(&item(
            SourceId::MetMuseum,
            json!({
                "objectID": 436535,
                "title": "Wheat Field with Cypresses",
                "artistDisplayName": "Vincent van Gogh",
                "primaryImage": "https://images.metmuseum.org/full.jpg",
                "primaryImageSmall": "https://images.metmuseum.org/small.jpg",
                "medium": ""
            }),
        ));

        assert_eq!(detail.image.as_deref(), Some("https://images.metmuseum.org/full.jpg"));
        let medium = detail.fields.iter().find(|f| f.label == "Medium").unwrap();
        assert_eq!(medium.value, NOT_AVAILABLE);
        let artist = detail.fields.iter().find(|f| f.label == "Artist").unwrap();
        assert_eq!(artist.value, "Vincent van Gogh");
        let link = detail.link.unwrap();
        assert_eq!(
            link.url,
            "https://www.metmuseum.org/art/collection/search/436535"
        );
        assert_eq!(link.label, "View on Met Museum Website");
    }

    #[test]
    fn met_card_uses_small_image_and_artist() {
        let card = render_card(
            &item(
                SourceId::MetMuseum,
                json!({"objectID": 1, "title": "Cat", "primaryImageSmall": "https://img/s.jpg"}),
            ),
            150,
        );
        assert_eq!(card.synopsis, "Artist unknown");
        assert_eq!(card.image.unwrap().data_src, "https://img/s.jpg");
    }

    #[test]
    fn rijksmuseum_reads_nested_image() {
        let card = render_card(
            &item(
                SourceId::Rijksmuseum,
                json!({
                    "objectNumber": "SK-C-5",
                    "title": "The Night Watch",
                    "longTitle": "The Night Watch, Rembrandt van Rijn, 1642",
                    "webImage": {"url": "https://lh3.example/nw.jpg"}
                }),
            ),
            150,
        );
        assert_eq!(
            card.link.as_deref(),
            Some("https://www.rijksmuseum.nl/en/collection/SK-C-5")
        );
        assert_eq!(card.image.unwrap().data_src, "https://lh3.example/nw.jpg");
    }

    #[test]
    fn harvard_artist_from_people() {
        let detail = render_detail(&item(
            SourceId::HarvardArtMuseums,
            json!({"objectid": 299843, "title": "Self-Portrait", "people": [{"name": "Max Beckmann"}]}),
        ));
        assert_eq!(detail.fields[0].value, "Max Beckmann");
        assert_eq!(
            detail.link.unwrap().url,
            "https://harvardartmuseums.org/collections/object/299843"
        );
    }

    #[test]
    fn cooper_hewitt_link_has_trailing_slash() {
        let card = render_card(
            &item(
                SourceId::CooperHewitt,
                json!({"id": "18704235", "title": "Chair", "images": [{"b": {"url": "https://img/b.jpg"}}]}),
            ),
            150,
        );
        assert_eq!(
            card.link.as_deref(),
            Some("https://collection.cooperhewitt.org/objects/18704235/")
        );
        assert_eq!(card.image.unwrap().data_src, "https://img/b.jpg");
    }

    #[test]
    fn generic_uses_description_and_url() {
        let card = render_card(
            &item(
                SourceId::Other,
                json!({"title": "OpenAI Response", "description": "Cats were revered in Egypt.", "url": "not a url"}),
            ),
            150,
        );
        assert_eq!(card.synopsis, "Cats were revered in Egypt.");
        assert!(card.link.is_none());
    }

    #[test]
    fn script_urls_are_not_linked() {
        let card = render_card(
            &item(
                SourceId::Other,
                json!({"title": "Answer", "url": "javascript:alert(document.cookie)"}),
            ),
            150,
        );
        assert!(card.link.is_none());
        assert!(render_detail(&item(
            SourceId::Other,
            json!({"title": "Answer", "url": "JavaScript:alert(1)"}),
        ))
        .link
        .is_none());
    }

    #[test]
    fn payload_images_must_be_http() {
        let card = render_card(
            &item(
                SourceId::MetMuseum,
                json!({"objectID": 1, "title": "Cat", "primaryImageSmall": "data:image/svg+xml,<svg/>"}),
            ),
            150,
        );
        assert!(card.image.is_none());

        let card = render_card(
            &item(
                SourceId::HarvardArtMuseums,
                json!({"objectid": 2, "title": "Cat", "primaryimageurl": "javascript:void(0)"}),
            ),
            150,
        );
        assert!(card.image.is_none());
    }

    #[test]
    fn generic_keeps_web_links() {
        let card = render_card(
            &item(
                SourceId::Other,
                json!({"title": "Answer", "url": "https://example.org/cats"}),
            ),
            150,
        );
        assert_eq!(card.link.as_deref(), Some("https://example.org/cats"));
    }
}
