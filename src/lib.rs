//! # Heritage Search
//!
//! A client for a multi-source cultural-heritage search aggregator.
//!
//! The aggregator backend fans one query out to Wikipedia, the Internet
//! Archive, and several museum collections and returns one page of
//! results grouped by source. This crate drives that backend as a paged
//! session, renders each source's heterogeneous records into uniform cards
//! and detail views, and keeps the client-side state around them: a source
//! filter, deferred images, a detail overlay, and recent searches.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────┐   ┌─────────────────────────────┐   ┌─────────────┐
//! │  Aggregator  │──▶│ ResultAggregationController │──▶│  Renderers  │
//! │  (HTTP/JSON) │   │ session, view, filter       │   │ text / HTML │
//! └──────────────┘   │ images, detail, history     │   └─────────────┘
//!                    └──────────────┬──────────────┘
//!                                   ▼
//!                           ┌───────────────┐
//!                           │ CLI (hsearch) │
//!                           └───────────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! hsearch search "cats" --pages 2
//! hsearch search "cats" --hide wikipedia --format html > cats.html
//! hsearch browse "cats"
//! hsearch details met_museum 436535
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`config`] | TOML configuration parsing |
//! | [`models`] | Source identifiers and wire types |
//! | [`backend`] | Aggregator HTTP client |
//! | [`controller`] | Session, pagination, and state orchestration |
//! | [`session`] | Pagination state and the loading guard |
//! | [`view`] | Rendered result sections |
//! | [`render`] | Per-source card/detail rendering, text and HTML output |
//! | [`filter`] | Source visibility |
//! | [`lazy_image`] | Deferred image resolution |
//! | [`detail`] | Detail overlay |
//! | [`history`] | Recent searches |
//! | [`indicator`] | Loading indicator |
//! | [`browse`] | Interactive session |
//! | [`search_cmd`], [`collections_cmd`] | One-shot CLI commands |

pub mod backend;
pub mod browse;
pub mod collections_cmd;
pub mod config;
pub mod controller;
pub mod detail;
pub mod error;
pub mod filter;
pub mod history;
pub mod indicator;
pub mod lazy_image;
pub mod models;
pub mod render;
pub mod search_cmd;
pub mod session;
pub mod view;
