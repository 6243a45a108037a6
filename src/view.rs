//! The rendered result area: per-source sections of cards, the
//! "no results" state, and the error notice.

use serde::Serialize;

use crate::filter::SourceFilter;
use crate::lazy_image::ImageId;
use crate::models::{ResultItem, SearchPage, SourceId};
use crate::render::{self, CardView};

/// Stable handle of a rendered card within one search session.
pub type CardId = u64;

#[derive(Debug, Clone, Serialize)]
pub struct RenderedCard {
    pub id: CardId,
    #[serde(flatten)]
    pub card: CardView,
    pub image_id: Option<ImageId>,
    pub hidden: bool,
    #[serde(skip)]
    pub item: ResultItem,
}

/// Cards of one source, under one header.
#[derive(Debug, Clone, Serialize)]
pub struct Section {
    pub source: SourceId,
    pub label: &'static str,
    pub hidden: bool,
    pub cards: Vec<RenderedCard>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ViewState {
    /// Nothing searched yet, or cleared for a new query.
    Idle,
    Results,
    NoResults,
}

/// Settings that shape how a page becomes cards.
#[derive(Debug, Clone, Copy)]
pub struct RenderSettings {
    pub synopsis_cutoff: usize,
    pub max_items_per_source: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultView {
    state: ViewState,
    notice: Option<String>,
    sections: Vec<Section>,
    #[serde(skip)]
    next_card_id: CardId,
    #[serde(skip)]
    next_image_id: u64,
}

impl Default for ResultView {
    fn default() -> Self {
        Self {
            state: ViewState::Idle,
            notice: None,
            sections: Vec::new(),
            next_card_id: 1,
            next_image_id: 1,
        }
    }
}

impl ResultView {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove every card, the notice, and the no-results marker.
    pub fn clear(&mut self) {
        *self = Self::default();
    }

    /// Merge a fetched page into the view.
    ///
    /// `replace` discards existing sections first (page 1). Each source
    /// contributes at most `max_items_per_source` cards per page; new cards
    /// take their visibility from `filter`. Returns the deferred images the
    /// page introduced.
    pub fn apply_page(
        &mut self,
        page: &SearchPage,
        replace: bool,
        settings: RenderSettings,
        filter: &SourceFilter,
    ) -> Vec<(ImageId, String)> {
        if replace {
            self.sections.clear();
        }
        self.notice = None;

        let mut new_images = Vec::new();
        for group in &page.groups {
            let hidden = !filter.is_visible(group.source);
            let section = self.section_mut(group.source);
            section.hidden = hidden;

            for item in group.items.iter().take(settings.max_items_per_source) {
                let card = render::render_card(item, settings.synopsis_cutoff);
                let image_id = card.image.as_ref().map(|image| {
                    let id = ImageId(self.next_image_id);
                    self.next_image_id += 1;
                    new_images.push((id, image.data_src.clone()));
                    id
                });
                let id = self.next_card_id;
                self.next_card_id += 1;

                self.section_mut(group.source).cards.push(RenderedCard {
                    id,
                    card,
                    image_id,
                    hidden,
                    item: item.clone(),
                });
            }
        }

        if replace && self.card_count() == 0 {
            self.state = ViewState::NoResults;
        } else if self.card_count() > 0 {
            self.state = ViewState::Results;
        }

        new_images
    }

    /// The section for `source`, inserted in display order if missing.
    fn section_mut(&mut self, source: SourceId) -> &mut Section {
        let index = match self.sections.binary_search_by_key(&source, |s| s.source) {
            Ok(index) => index,
            Err(index) => {
                self.sections.insert(
                    index,
                    Section {
                        source,
                        label: source.label(),
                        hidden: false,
                        cards: Vec::new(),
                    },
                );
                index
            }
        };
        &mut self.sections[index]
    }

    /// Hide or show every card and the header of `source`. Returns the
    /// number of cards touched.
    pub fn set_source_hidden(&mut self, source: SourceId, hidden: bool) -> usize {
        let Some(section) = self.sections.iter_mut().find(|s| s.source == source) else {
            return 0;
        };
        section.hidden = hidden;
        for card in &mut section.cards {
            card.hidden = hidden;
        }
        section.cards.len()
    }

    pub fn set_notice(&mut self, notice: impl Into<String>) {
        self.notice = Some(notice.into());
    }

    pub fn notice(&self) -> Option<&str> {
        self.notice.as_deref()
    }

    pub fn state(&self) -> ViewState {
        self.state
    }

    pub fn is_no_results(&self) -> bool {
        self.state == ViewState::NoResults
    }

    pub fn sections(&self) -> &[Section] {
        &self.sections
    }

    pub fn cards(&self) -> impl Iterator<Item = &RenderedCard> {
        self.sections.iter().flat_map(|s| s.cards.iter())
    }

    pub fn visible_cards(&self) -> impl Iterator<Item = &RenderedCard> {
        self.cards().filter(|c| !c.hidden)
    }

    pub fn card(&self, id: CardId) -> Option<&RenderedCard> {
        self.cards().find(|c| c.id == id)
    }

    pub fn card_count(&self) -> usize {
        self.sections.iter().map(|s| s.cards.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{SearchResponse, SearchPage};
    use serde_json::json;

    const SETTINGS: RenderSettings = RenderSettings {
        synopsis_cutoff: 150,
        max_items_per_source: 10,
    };

    fn page(value: serde_json::Value) -> SearchPage {
        let response: SearchResponse = serde_json::from_value(value).unwrap();
        SearchPage::from_response(response, 1).unwrap()
    }

    fn titles(n: usize, prefix: &str) -> Vec<serde_json::Value> {
        (0..n)
            .map(|i| json!({"title": format!("{} {}", prefix, i), "objectID": i}))
            .collect()
    }

    #[test]
    fn empty_first_page_is_no_results() {
        let mut view = ResultView::new();
        let filter = SourceFilter::default();
        view.apply_page(&page(json!({"results": {"wikipedia": []}})), true, SETTINGS, &filter);
        assert!(view.is_no_results());
        assert_eq!(view.card_count(), 0);
        assert!(view.sections().is_empty());
    }

    #[test]
    fn caps_items_per_source() {
        let mut view = ResultView::new();
        let filter = SourceFilter::default();
        let images = view.apply_page(
            &page(json!({"results": {"met_museum": titles(14, "Cat")}})),
            true,
            SETTINGS,
            &filter,
        );
        assert_eq!(view.card_count(), 10);
        // No primaryImageSmall in the fixtures.
        assert!(images.is_empty());
    }

    #[test]
    fn later_pages_append_in_section_order() {
        let mut view = ResultView::new();
        let filter = SourceFilter::default();
        view.apply_page(
            &page(json!({"results": {"met_museum": titles(2, "Met")}})),
            true,
            SETTINGS,
            &filter,
        );
        view.apply_page(
            &page(json!({"results": {"wikipedia": [{"title": "Cat"}], "met_museum": titles(1, "More")}})),
            false,
            SETTINGS,
            &filter,
        );

        let sources: Vec<SourceId> = view.sections().iter().map(|s| s.source).collect();
        assert_eq!(sources, vec![SourceId::Wikipedia, SourceId::MetMuseum]);
        assert_eq!(view.card_count(), 4);

        let ids: Vec<CardId> = view.sections()[1].cards.iter().map(|c| c.id).collect();
        assert_eq!(ids, vec![1, 2, 4]);
    }

    #[test]
    fn empty_later_page_keeps_results() {
        let mut view = ResultView::new();
        let filter = SourceFilter::default();
        view.apply_page(
            &page(json!({"results": {"wikipedia": [{"title": "Cat"}]}})),
            true,
            SETTINGS,
            &filter,
        );
        view.apply_page(&page(json!({"results": {}})), false, SETTINGS, &filter);
        assert_eq!(view.state(), ViewState::Results);
        assert_eq!(view.card_count(), 1);
    }

    #[test]
    fn new_cards_inherit_filter() {
        let mut view = ResultView::new();
        let mut filter = SourceFilter::default();
        filter.toggle(SourceId::Wikipedia);
        view.apply_page(
            &page(json!({"results": {"wikipedia": [{"title": "Cat"}], "met_museum": titles(1, "Met")}})),
            true,
            SETTINGS,
            &filter,
        );
        assert_eq!(view.visible_cards().count(), 1);
        assert!(view.sections()[0].hidden);
    }

    #[test]
    fn deferred_images_get_ids() {
        let mut view = ResultView::new();
        let filter = SourceFilter::default();
        let images = view.apply_page(
            &page(json!({"results": {"met_museum": [
                {"title": "A", "objectID": 1, "primaryImageSmall": "https://img/a.jpg"},
                {"title": "B", "objectID": 2}
            ]}})),
            true,
            SETTINGS,
            &filter,
        );
        assert_eq!(images, vec![(ImageId(1), "https://img/a.jpg".to_string())]);
        assert_eq!(view.card(1).unwrap().image_id, Some(ImageId(1)));
        assert_eq!(view.card(2).unwrap().image_id, None);
    }
}
