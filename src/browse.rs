//! Interactive browsing session (`hsearch browse`).
//!
//! Reads one command per line from stdin and drives a single
//! [`ResultAggregationController`]. Any line that is not a command starts a
//! new search for that text.
//!
//! ```text
//! > cats
//! > more
//! > toggle met_museum
//! > open 3
//! > enrich
//! > quit
//! ```

use anyhow::Result;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::config::Config;
use crate::controller::{FetchOutcome, ResultAggregationController, SkipReason};
use crate::indicator::LoadingIndicator;
use crate::models::SourceId;
use crate::render::text;
use crate::view::CardId;

const HELP: &str = "\
commands:
  <text>                    search for <text>
  more                      load the next page
  toggle <source>           show or hide a source
  open <n>                  open the detail view of card n
  enrich                    fetch the full record for the open detail
  close                     close the detail view
  view <n>...               scroll cards into view (loads their images)
  history                   recent searches
  collections               list collections
  add <n> <collection>      add card n to a collection
  quit
";

#[derive(Debug, Clone, PartialEq)]
pub enum BrowseCommand {
    Search(String),
    More,
    Toggle(SourceId),
    Open(CardId),
    Enrich,
    Close,
    View(Vec<CardId>),
    History,
    Collections,
    Add { card: CardId, collection: String },
    Help,
    Quit,
    Empty,
    /// A recognized command with bad arguments.
    Invalid(String),
}

impl BrowseCommand {
    pub fn parse(line: &str) -> Self {
        let line = line.trim();
        if line.is_empty() {
            return BrowseCommand::Empty;
        }
        let mut words = line.split_whitespace();
        let head = words.next().unwrap_or_default();
        let rest: Vec<&str> = words.collect();

        match (head, rest.as_slice()) {
            ("more", []) => BrowseCommand::More,
            ("enrich", []) => BrowseCommand::Enrich,
            ("close", []) => BrowseCommand::Close,
            ("history", []) => BrowseCommand::History,
            ("collections", []) => BrowseCommand::Collections,
            ("help", []) => BrowseCommand::Help,
            ("quit" | "exit", []) => BrowseCommand::Quit,
            ("toggle", [source]) => match source.parse() {
                Ok(source) => BrowseCommand::Toggle(source),
                Err(e) => BrowseCommand::Invalid(e),
            },
            ("open", [n]) => match n.parse() {
                Ok(n) => BrowseCommand::Open(n),
                Err(_) => BrowseCommand::Invalid(format!("not a card number: {}", n)),
            },
            ("view", ids) if !ids.is_empty() => {
                match ids.iter().map(|n| n.parse()).collect::<Result<Vec<CardId>, _>>() {
                    Ok(ids) => BrowseCommand::View(ids),
                    Err(_) => BrowseCommand::Invalid("usage: view <n>...".to_string()),
                }
            }
            ("add", [n, collection]) => match n.parse() {
                Ok(card) => BrowseCommand::Add {
                    card,
                    collection: collection.to_string(),
                },
                Err(_) => BrowseCommand::Invalid(format!("not a card number: {}", n)),
            },
            ("search", words) if !words.is_empty() => BrowseCommand::Search(words.join(" ")),
            _ => BrowseCommand::Search(line.to_string()),
        }
    }
}

/// Run the interactive loop until `quit` or end of input.
pub async fn run_browse(
    cfg: &Config,
    initial_query: Option<&str>,
    indicator: Box<dyn LoadingIndicator>,
) -> Result<()> {
    let controller = ResultAggregationController::from_config(cfg)?.with_indicator(indicator);

    if let Some(query) = initial_query {
        let outcome = controller.start_search(query).await;
        print!("{}", describe(&controller, &outcome));
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        match execute(&controller, BrowseCommand::parse(&line)).await? {
            Some(output) => print!("{}", output),
            None => break,
        }
    }
    Ok(())
}

/// Apply one command. Returns the text to show, or `None` to quit.
pub async fn execute(
    controller: &ResultAggregationController,
    command: BrowseCommand,
) -> Result<Option<String>> {
    let output = match command {
        BrowseCommand::Quit => return Ok(None),
        BrowseCommand::Empty => String::new(),
        BrowseCommand::Help => HELP.to_string(),
        BrowseCommand::Invalid(message) => format!("{}\n", message),
        BrowseCommand::Search(query) => {
            let outcome = controller.start_search(&query).await;
            describe(controller, &outcome)
        }
        BrowseCommand::More => {
            let outcome = controller.load_more().await;
            describe(controller, &outcome)
        }
        BrowseCommand::Toggle(source) => {
            let visible = controller.toggle_source(source);
            format!(
                "{} {}\n",
                source.label(),
                if visible { "shown" } else { "hidden" }
            )
        }
        BrowseCommand::Open(card) => match controller.open_detail(card) {
            Some(_) => controller
                .detail()
                .map(|d| text::detail(&d))
                .unwrap_or_default(),
            None => format!("no card {}\n", card),
        },
        BrowseCommand::Enrich => match controller.enrich_detail().await {
            Ok(_) => controller
                .detail()
                .map(|d| text::detail(&d))
                .unwrap_or_default(),
            Err(e) => match controller.detail() {
                Some(d) => text::detail(&d),
                None => format!("{}\n", e),
            },
        },
        BrowseCommand::Close => {
            controller.close_detail();
            String::new()
        }
        BrowseCommand::View(cards) => {
            let mut out = String::new();
            for (id, url) in controller.enter_viewport(&cards) {
                out.push_str(&format!("image {}: {}\n", id.0, url));
            }
            out
        }
        BrowseCommand::History => text::history(&controller.history()),
        BrowseCommand::Collections => match controller.collections().await {
            Ok(collections) => text::collections(&collections),
            Err(e) => format!("could not load collections: {}\n", e),
        },
        BrowseCommand::Add { card, collection } => {
            match controller.add_to_collection(card, &collection).await {
                Ok(message) => format!("{}\n", message),
                Err(e) => format!("could not add card {}: {}\n", card, e),
            }
        }
    };
    Ok(Some(output))
}

fn describe(controller: &ResultAggregationController, outcome: &FetchOutcome) -> String {
    match outcome {
        FetchOutcome::Loaded { .. } | FetchOutcome::NoResults | FetchOutcome::Failed { .. } => {
            let mut out = text::results(&controller.view(), |id| controller.image_src(id));
            if let Some(session) = controller.session().filter(|s| s.current_page > 0) {
                out.push_str(&text::session_line(&session));
                out.push('\n');
            }
            out
        }
        FetchOutcome::Skipped { reason } => match reason {
            SkipReason::InFlight => "Already loading.\n".to_string(),
            SkipReason::Exhausted => "No more results.\n".to_string(),
            SkipReason::NoSession => "Search for something first.\n".to_string(),
            SkipReason::EmptyQuery => String::new(),
            SkipReason::NotCurrentQuery | SkipReason::OutOfOrder => {
                "That page cannot be loaded now.\n".to_string()
            }
        },
        FetchOutcome::Stale => String::new(),
    }
}
