//! HTML output via minijinja templates.
//!
//! Template names end in `.html`, so every interpolated value is
//! HTML-escaped. Deferred images are emitted with `data-src` and no `src`;
//! the document template ships a small viewport observer that assigns them.

use anyhow::{Context, Result};
use minijinja::{context, Environment};

use crate::detail::DetailSnapshot;
use crate::view::ResultView;

const CARD_TEMPLATE: &str = include_str!("templates/card.html.jinja");
const RESULTS_TEMPLATE: &str = include_str!("templates/results.html.jinja");
const DETAIL_TEMPLATE: &str = include_str!("templates/detail.html.jinja");
const DOCUMENT_TEMPLATE: &str = include_str!("templates/document.html.jinja");

pub struct HtmlRenderer {
    env: Environment<'static>,
}

impl HtmlRenderer {
    pub fn new() -> Result<Self> {
        let mut env = Environment::new();
        env.add_template("card.html", CARD_TEMPLATE)
            .context("Failed to add card template")?;
        env.add_template("results.html", RESULTS_TEMPLATE)
            .context("Failed to add results template")?;
        env.add_template("detail.html", DETAIL_TEMPLATE)
            .context("Failed to add detail template")?;
        env.add_template("document.html", DOCUMENT_TEMPLATE)
            .context("Failed to add document template")?;
        Ok(Self { env })
    }

    /// The result area: sections, cards, notice, no-results marker, and the
    /// "Load More" control.
    pub fn results(&self, view: &ResultView, load_more: bool) -> Result<String> {
        self.env
            .get_template("results.html")?
            .render(context! { view, load_more })
            .context("Failed to render results")
    }

    pub fn detail(&self, detail: &DetailSnapshot) -> Result<String> {
        self.env
            .get_template("detail.html")?
            .render(context! { detail })
            .context("Failed to render detail view")
    }

    /// A standalone page for one query's results.
    pub fn document(&self, query: &str, view: &ResultView, load_more: bool) -> Result<String> {
        self.env
            .get_template("document.html")?
            .render(context! { query, view, load_more })
            .context("Failed to render HTML document")
    }
}
