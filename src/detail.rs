//! The shared detail overlay.
//!
//! One overlay serves every card. It opens with content rendered from the
//! card's own record and can later be enriched with the full record fetched
//! through the backend.

use serde::Serialize;

use crate::models::ResultItem;
use crate::render::{self, DetailView};
use crate::view::CardId;

/// Where a pointer event landed while the overlay is open.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerTarget {
    /// The dimmed area around the content box.
    Backdrop,
    /// Anywhere inside the content box.
    Content,
    CloseControl,
}

#[derive(Debug, Default)]
pub struct DetailOverlay {
    open: Option<OpenDetail>,
}

#[derive(Debug, Clone)]
struct OpenDetail {
    card_id: Option<CardId>,
    item: ResultItem,
    view: DetailView,
    enriched: bool,
    notice: Option<String>,
}

/// What the overlay currently shows.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DetailSnapshot {
    pub card_id: Option<CardId>,
    pub view: DetailView,
    pub enriched: bool,
    pub notice: Option<String>,
}

impl DetailOverlay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Render `item` into the overlay and show it, replacing whatever was open.
    pub fn open(&mut self, card_id: Option<CardId>, item: ResultItem) -> DetailView {
        let view = render::render_detail(&item);
        self.open = Some(OpenDetail {
            card_id,
            item,
            view: view.clone(),
            enriched: false,
            notice: None,
        });
        view
    }

    pub fn close(&mut self) {
        self.open = None;
    }

    /// Apply a pointer event. Returns `true` if it closed the overlay.
    ///
    /// Clicks on the content itself never close it.
    pub fn handle_pointer(&mut self, target: PointerTarget) -> bool {
        if self.open.is_none() {
            return false;
        }
        match target {
            PointerTarget::Backdrop | PointerTarget::CloseControl => {
                self.close();
                true
            }
            PointerTarget::Content => false,
        }
    }

    pub fn is_open(&self) -> bool {
        self.open.is_some()
    }

    pub fn card_id(&self) -> Option<CardId> {
        self.open.as_ref().and_then(|o| o.card_id)
    }

    pub fn item(&self) -> Option<&ResultItem> {
        self.open.as_ref().map(|o| &o.item)
    }

    /// Replace the open content with a fuller record of the same item.
    pub fn enrich(&mut self, full: ResultItem) -> Option<DetailView> {
        let open = self.open.as_mut()?;
        let mut record = open.item.record.clone();
        record.extend(full.record);
        open.item = ResultItem::new(open.item.source, record);
        open.view = render::render_detail(&open.item);
        open.enriched = true;
        open.notice = None;
        Some(open.view.clone())
    }

    pub fn set_notice(&mut self, notice: impl Into<String>) {
        if let Some(open) = self.open.as_mut() {
            open.notice = Some(notice.into());
        }
    }

    pub fn snapshot(&self) -> Option<DetailSnapshot> {
        self.open.as_ref().map(|o| DetailSnapshot {
            card_id: o.card_id,
            view: o.view.clone(),
            enriched: o.enriched,
            notice: o.notice.clone(),
        })
    }
}
