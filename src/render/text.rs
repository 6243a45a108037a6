//! Plain-text output for terminals.

use std::fmt::Write;

use crate::detail::DetailSnapshot;
use crate::lazy_image::ImageId;
use crate::models::Collection;
use crate::session::SessionSnapshot;
use crate::view::{ResultView, ViewState};

/// Numbered listing of the visible cards, grouped under source headers.
///
/// `image_src` yields an image's URL once it has entered the viewport;
/// until then the listing shows it as deferred.
pub fn results<F>(view: &ResultView, image_src: F) -> String
where
    F: Fn(ImageId) -> Option<String>,
{
    let mut out = String::new();

    if let Some(notice) = view.notice() {
        let _ = writeln!(out, "{}", notice);
    }
    match view.state() {
        ViewState::NoResults => {
            let _ = writeln!(out, "No results.");
            return out;
        }
        ViewState::Idle if view.notice().is_none() => {
            let _ = writeln!(out, "No search yet.");
            return out;
        }
        _ => {}
    }

    for section in view.sections().iter().filter(|s| !s.hidden) {
        let _ = writeln!(out, "== {} ({}) ==", section.label, section.cards.len());
        for card in &section.cards {
            let _ = writeln!(out, "{}. {}", card.id, card.card.title);
            if !card.card.synopsis.is_empty() {
                let _ = writeln!(out, "    {}", card.card.synopsis);
            }
            if let Some(ref link) = card.card.link {
                let _ = writeln!(out, "    url: {}", link);
            }
            if let Some(id) = card.image_id {
                match image_src(id) {
                    Some(src) => {
                        let _ = writeln!(out, "    image: {}", src);
                    }
                    None => {
                        let _ = writeln!(out, "    image: (deferred)");
                    }
                }
            }
        }
        let _ = writeln!(out);
    }

    let hidden: Vec<&str> = view
        .sections()
        .iter()
        .filter(|s| s.hidden)
        .map(|s| s.label)
        .collect();
    if !hidden.is_empty() {
        let _ = writeln!(out, "hidden: {}", hidden.join(", "));
    }
    out
}

/// One-line pagination summary: `"cats" page 1 of 2 (5 results), more available`.
pub fn session_line(session: &SessionSnapshot) -> String {
    let more = if session.has_more {
        "more available"
    } else {
        "end of results"
    };
    format!(
        "\"{}\" page {} of {} ({} results), {}",
        session.query, session.current_page, session.total_pages, session.total_results, more
    )
}

pub fn detail(detail: &DetailSnapshot) -> String {
    let view = &detail.view;
    let mut out = String::new();
    let _ = writeln!(out, "{} [{}]", view.title, view.badge.label);
    if let Some(ref image) = view.image {
        let _ = writeln!(out, "  image: {}", image);
    }
    for field in &view.fields {
        let _ = writeln!(out, "  {:<14} {}", format!("{}:", field.label), field.value);
    }
    if let Some(ref link) = view.link {
        let _ = writeln!(out, "  {}: {}", link.label, link.url);
    }
    if let Some(ref notice) = detail.notice {
        let _ = writeln!(out, "  {}", notice);
    }
    out
}

pub fn history(queries: &[String]) -> String {
    if queries.is_empty() {
        return "No recent searches.\n".to_string();
    }
    let mut out = String::new();
    for (i, query) in queries.iter().enumerate() {
        let _ = writeln!(out, "{}. {}", i + 1, query);
    }
    out
}

pub fn collections(collections: &[Collection]) -> String {
    if collections.is_empty() {
        return "No collections.\n".to_string();
    }
    let mut out = format!("{:<8} {}\n", "ID", "TITLE");
    for collection in collections {
        let _ = writeln!(out, "{:<8} {}", collection.id, collection.title);
    }
    out
}
